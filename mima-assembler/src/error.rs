//! Assembler errors

use mima_spec::MimaError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssemblerError {
    #[error("Syntax error at line {line}, column {column}: {message}")]
    SyntaxError {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Unknown instruction {mnemonic} at line {line}, column {column}")]
    UnknownInstruction {
        mnemonic: String,
        line: usize,
        column: usize,
    },

    #[error("Invalid label {label} at line {line}, column {column}: labels are alphabetic")]
    InvalidLabel {
        label: String,
        line: usize,
        column: usize,
    },

    #[error("Unresolved label {label} at line {line}, column {column}")]
    UnresolvedLabel {
        label: String,
        line: usize,
        column: usize,
    },

    #[error("Program too large: {len} instructions, capacity {capacity}")]
    ProgramTooLarge { len: usize, capacity: usize },

    #[error("Invalid program: {0}")]
    Invalid(#[from] MimaError),
}

impl AssemblerError {
    /// Source position of the error, when it has one
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            AssemblerError::SyntaxError { line, column, .. }
            | AssemblerError::UnknownInstruction { line, column, .. }
            | AssemblerError::InvalidLabel { line, column, .. }
            | AssemblerError::UnresolvedLabel { line, column, .. } => Some((*line, *column)),
            AssemblerError::ProgramTooLarge { .. } | AssemblerError::Invalid(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AssemblerError>;
