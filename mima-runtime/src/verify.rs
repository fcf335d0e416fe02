//! Postcondition checking over symbolic runs
//!
//! A postcondition is a list of [`Expectation`]s on the final accumulator and
//! memory. It holds when the solver proves the disjunction of their negations
//! unsatisfiable.

use crate::error::{Result, SolverError};
use crate::interpreter::Interpreter;
use crate::memory::Memory;
use crate::solver::{SatResult, Solver};
use crate::symbolic::{Formula, Model, Symbolic, SymbolicMemory, Term};
use std::fmt;

/// Expected final value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    Accumulator(u8),
    Memory { address: u8, value: u8 },
}

impl Expectation {
    /// Formula stating that this expectation holds for the given final state
    pub fn holds(&self, accumulator: &Term, memory: &SymbolicMemory) -> Formula {
        match *self {
            Expectation::Accumulator(value) => Formula::eq(accumulator, &Term::constant(value)),
            Expectation::Memory { address, value } => Formula::eq(
                &memory.read(&Term::constant(address)),
                &Term::constant(value),
            ),
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Accumulator(value) => write!(f, "acc = {}", value),
            Expectation::Memory { address, value } => write!(f, "mem[{}] = {}", address, value),
        }
    }
}

/// Outcome of a postcondition check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// No input violates the postcondition
    Holds,
    /// Counterexample inputs
    Violated(Model),
    Unknown(String),
}

impl Verdict {
    pub fn holds(&self) -> bool {
        matches!(self, Verdict::Holds)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Holds => write!(f, "holds"),
            Verdict::Violated(model) if model.is_empty() => write!(f, "violated"),
            Verdict::Violated(model) => write!(f, "violated ({})", model),
            Verdict::Unknown(reason) => write!(f, "unknown ({})", reason),
        }
    }
}

/// Disjunction of the negated expectations
pub fn violation(
    accumulator: &Term,
    memory: &SymbolicMemory,
    expectations: &[Expectation],
) -> Formula {
    Formula::or(
        expectations
            .iter()
            .map(|e| e.holds(accumulator, memory).negate()),
    )
}

/// Check a postcondition on one final state
pub fn check_postcondition(
    solver: &dyn Solver,
    accumulator: &Term,
    memory: &SymbolicMemory,
    expectations: &[Expectation],
) -> std::result::Result<Verdict, SolverError> {
    check_under(solver, &[], accumulator, memory, expectations)
}

/// Check a postcondition on one final state, restricted to inputs satisfying `conditions`
pub fn check_under(
    solver: &dyn Solver,
    conditions: &[Formula],
    accumulator: &Term,
    memory: &SymbolicMemory,
    expectations: &[Expectation],
) -> std::result::Result<Verdict, SolverError> {
    let mut assertions = conditions.to_vec();
    assertions.push(violation(accumulator, memory, expectations));

    let verdict = match solver.check(&assertions)? {
        SatResult::Unsat => Verdict::Holds,
        SatResult::Sat(model) => Verdict::Violated(model),
        SatResult::Unknown(reason) => Verdict::Unknown(reason),
    };
    tracing::debug!(solver = solver.name(), %verdict, "postcondition checked");
    Ok(verdict)
}

/// Check a postcondition on every path of a symbolic program
///
/// Paths whose conditions are unsatisfiable are skipped. A feasible path that
/// fails to terminate within the step budget is an error. The first violated
/// path wins; otherwise any unknown path makes the verdict unknown.
pub fn verify_program(
    solver: &dyn Solver,
    interpreter: &Interpreter<Symbolic>,
    expectations: &[Expectation],
) -> Result<Verdict> {
    let mut unknown = None;

    for path in interpreter.explore() {
        let outcome = match path.result {
            Ok(outcome) => outcome,
            Err(err) => {
                if !path.conditions.is_empty() && solver.check(&path.conditions)?.is_unsat() {
                    continue;
                }
                return Err(err);
            }
        };

        match check_under(
            solver,
            &path.conditions,
            &outcome.accumulator,
            &outcome.memory,
            expectations,
        )? {
            Verdict::Holds => {}
            Verdict::Violated(model) => return Ok(Verdict::Violated(model)),
            Verdict::Unknown(reason) => unknown = Some(reason),
        }
    }

    Ok(unknown.map_or(Verdict::Holds, Verdict::Unknown))
}
