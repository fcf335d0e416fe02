//! Constraint solver interface
//!
//! A [`Solver`] decides satisfiability of a conjunction of [`Formula`]s over
//! the free inputs of a symbolic run. The built-in [`EnumerationSolver`]
//! needs no native library; a Z3-backed solver is available behind the `z3`
//! feature.

use crate::error::SolverError;
use crate::symbolic::{Atoms, Formula, Model};
use std::fmt;

/// Satisfiability verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SatResult {
    /// Satisfiable, with a witnessing assignment
    Sat(Model),
    Unsat,
    /// The solver gave up
    Unknown(String),
}

impl SatResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SatResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SatResult::Unsat)
    }
}

impl fmt::Display for SatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SatResult::Sat(model) if model.is_empty() => write!(f, "sat"),
            SatResult::Sat(model) => write!(f, "sat ({})", model),
            SatResult::Unsat => write!(f, "unsat"),
            SatResult::Unknown(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

pub trait Solver {
    /// Solver name for diagnostics
    fn name(&self) -> &'static str;

    /// Check whether all `assertions` can hold at once
    fn check(&self, assertions: &[Formula]) -> Result<SatResult, SolverError>;
}

/// Exhaustive search over the free inputs
///
/// Every free variable and every base-array cell read at a constant address
/// contributes eight bits. Searches wider than `max_free_bits` are reported as
/// `Unknown`, as are reads of the base array at a symbolic address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumerationSolver {
    pub max_free_bits: u32,
}

impl EnumerationSolver {
    pub const DEFAULT_MAX_FREE_BITS: u32 = 16;

    pub fn new() -> Self {
        Self {
            max_free_bits: Self::DEFAULT_MAX_FREE_BITS,
        }
    }

    pub fn with_max_free_bits(max_free_bits: u32) -> Self {
        Self { max_free_bits }
    }
}

impl Default for EnumerationSolver {
    fn default() -> Self {
        Self::new()
    }
}

enum Input {
    Var(String),
    Cell(String, u8),
}

impl Solver for EnumerationSolver {
    fn name(&self) -> &'static str {
        "enumeration"
    }

    fn check(&self, assertions: &[Formula]) -> Result<SatResult, SolverError> {
        let atoms = Atoms::of(assertions);

        if atoms.symbolic_reads {
            return Ok(SatResult::Unknown(
                "memory read at a symbolic address".to_string(),
            ));
        }

        let bits = atoms.len() as u64 * 8;
        if bits > u64::from(self.max_free_bits) || bits >= 64 {
            return Ok(SatResult::Unknown(format!(
                "{} free bits exceed the limit of {}",
                bits, self.max_free_bits
            )));
        }

        let inputs: Vec<Input> = atoms
            .vars
            .iter()
            .map(|v| Input::Var(v.clone()))
            .chain(atoms.cells.iter().map(|(a, i)| Input::Cell(a.clone(), *i)))
            .collect();

        for assignment in 0..(1u64 << bits) {
            let mut model = Model::new();
            for (slot, input) in inputs.iter().enumerate() {
                let value = (assignment >> (slot * 8)) as u8;
                match input {
                    Input::Var(name) => model.set_var(name.clone(), value),
                    Input::Cell(array, address) => model.set_cell(array.clone(), *address, value),
                }
            }

            if assertions.iter().all(|a| a.eval(&model)) {
                tracing::debug!(solver = self.name(), %model, "sat");
                return Ok(SatResult::Sat(model));
            }
        }

        tracing::debug!(solver = self.name(), bits, "unsat");
        Ok(SatResult::Unsat)
    }
}
