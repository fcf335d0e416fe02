//! # Error Types for MiMa programs

use crate::config::ConfigError;
use crate::opcode::{Opcode, OperandKind};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MimaError {
    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    // Program image errors
    #[error("Invalid program magic: expected 0x4D494D41, got {0:#010x}")]
    InvalidMagic(u32),

    #[error("Invalid program version: expected {expected:#010x}, found {found:#010x}")]
    InvalidVersion { expected: u32, found: u32 },

    #[error("Invalid program image: {0}")]
    InvalidImage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    // Instruction errors
    #[error("Invalid opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Opcode {opcode} at index {index} is not executable")]
    ReservedOpcode { opcode: Opcode, index: usize },

    #[error("Operand mismatch at index {index}: {opcode} expects {expected:?}")]
    OperandMismatch {
        opcode: Opcode,
        index: usize,
        expected: OperandKind,
    },

    #[error("Invalid jump target at index {index}: {target} (program length {len})")]
    InvalidTarget { index: usize, target: usize, len: usize },

    #[error("Program too large: {len} instructions (capacity {capacity})")]
    ProgramTooLarge { len: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, MimaError>;
