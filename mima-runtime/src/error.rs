//! Runtime error types for MiMa

use mima_spec::MimaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Invalid program: {0}")]
    InvalidProgram(#[from] MimaError),

    #[error("Step budget exceeded: {limit} steps, pc = {pc}")]
    StepBudgetExceeded { limit: usize, pc: usize },

    #[error("Branch on undecided condition at pc {pc}")]
    SymbolicBranch { pc: usize },

    #[error("Solver error: {0}")]
    Solver(#[from] SolverError),
}

/// Failures reported by a solver back-end
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("Solver back-end failed: {0}")]
    Backend(String),

    #[error("Model rejected by assertion {0}")]
    InvalidModel(String),
}

pub type Result<T> = std::result::Result<T, RuntimeError>;
