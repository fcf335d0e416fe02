//! Machine state for MiMa

use crate::word::{Backend, Word};
use mima_spec::Opcode;
use std::fmt;

/// Machine state: accumulator, program counter and memory
///
/// `steps` counts executed instructions, so it never exceeds the step budget.
pub struct MachineState<B: Backend> {
    pub accumulator: B::Word,
    pub pc: usize,
    pub memory: B::Memory,
    pub steps: usize,
}

impl<B: Backend> MachineState<B> {
    pub fn new(accumulator: B::Word, memory: B::Memory) -> Self {
        Self {
            accumulator,
            pc: 0,
            memory,
            steps: 0,
        }
    }

    /// Zero accumulator over all-zero memory
    pub fn initial() -> Self {
        Self::new(B::Word::constant(0), B::initial_memory())
    }
}

impl<B: Backend> Clone for MachineState<B> {
    fn clone(&self) -> Self {
        Self {
            accumulator: self.accumulator.clone(),
            pc: self.pc,
            memory: self.memory.clone(),
            steps: self.steps,
        }
    }
}

impl<B: Backend> fmt::Debug for MachineState<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineState")
            .field("accumulator", &self.accumulator)
            .field("pc", &self.pc)
            .field("memory", &self.memory)
            .field("steps", &self.steps)
            .finish()
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// HALT executed
    Halt,
    /// Fetch outside the program
    InvalidProgramCounter { pc: usize },
    /// JMS or JIND executed; their effect is undefined
    UnresolvedSemantics { opcode: Opcode, pc: usize },
}

impl HaltReason {
    /// Normal termination
    pub fn is_halt(&self) -> bool {
        matches!(self, HaltReason::Halt)
    }
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HaltReason::Halt => write!(f, "halt"),
            HaltReason::InvalidProgramCounter { pc } => {
                write!(f, "invalid program counter {}", pc)
            }
            HaltReason::UnresolvedSemantics { opcode, pc } => {
                write!(f, "unresolved semantics of {} at pc {}", opcode, pc)
            }
        }
    }
}
