//! Symbolic backend
//!
//! Words are bit-vector [`Term`]s, flags are [`Formula`]s and memory is an
//! array term. Runs start from all-zero memory, exactly like the concrete
//! backend; free inputs come from an initial state substituted through
//! [`Interpreter::with_initial_state`]. The accumulator and memory come back
//! as expressions over those inputs, ready to hand to a [`Solver`].
//!
//! [`Interpreter::with_initial_state`]: crate::interpreter::Interpreter::with_initial_state
//!
//! [`Solver`]: crate::solver::Solver

mod memory;
mod term;

pub use memory::SymbolicMemory;
pub use term::{
    to_smtlib, ArrayKind, ArrayTerm, Atoms, BinOp, Formula, FormulaKind, Model, Term, TermKind,
};

use crate::word::Backend;

/// Conventional name of an unconstrained initial memory
pub const MEMORY_ARRAY: &str = "memory";

/// Symbolic bit-vector terms
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Symbolic;

impl Backend for Symbolic {
    type Word = Term;
    type Memory = SymbolicMemory;

    const NAME: &'static str = "symbolic";

    fn initial_memory() -> SymbolicMemory {
        SymbolicMemory::zeroed()
    }
}
