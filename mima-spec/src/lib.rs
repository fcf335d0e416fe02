//! # MiMa Specification
//!
//! Core types of the minimal machine: an 8-bit, single-accumulator computer
//! with a tiny instruction set and an 8-bit address space.
//!
//! ## Key Features
//! - 8-bit words, two's complement for signed comparisons
//! - Single accumulator, program counter indexing the instruction list
//! - 256-cell address space, all zero at the start of a run
//! - Bounded execution: every run stops after at most `max_steps` cycles

pub mod config;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod program;

pub use config::{ConfigError, MachineConfig};
pub use error::MimaError;
pub use instruction::{wrap_word, Instruction, Operand};
pub use opcode::{Opcode, OperandKind};
pub use program::Program;

/// Word width in bits
pub const WORD_BITS: u32 = 8;

/// Number of addressable memory cells (8-bit addresses)
pub const ADDRESS_SPACE: usize = 1 << WORD_BITS;

/// Default program capacity
pub const PROGRAM_SIZE: usize = 16;

/// Default number of zero-initialised memory cells
pub const MEM_SIZE: usize = 16;

/// Default step budget
pub const MAX_STEPS: usize = 16;

/// Word value as stored in memory and the accumulator
pub type Word = u8;

/// Bit pattern the machine uses for logical "true"
pub const TRUE_WORD: Word = 0xFF;

/// Bit pattern the machine uses for logical "false"
pub const FALSE_WORD: Word = 0x00;
