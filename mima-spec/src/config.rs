//! # Machine Configuration
//!
//! Bounds that the source machine fixes as global constants are carried here
//! explicitly, so the assembler and interpreter can be exercised under other
//! bounds as well.

use crate::{ADDRESS_SPACE, MAX_STEPS, MEM_SIZE, PROGRAM_SIZE};
use std::fmt;

/// Machine bounds used by assembly and interpretation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineConfig {
    /// Maximum number of instructions in a program
    pub program_size: usize,
    /// Size of the memory window a run reports (1-256)
    ///
    /// All 256 cells start at zero regardless of this bound.
    pub mem_size: usize,
    /// Maximum number of fetch-execute cycles per run
    pub max_steps: usize,
}

impl MachineConfig {
    /// Default configuration: 16 instructions, 16 memory cells, 16 steps
    pub const DEFAULT: Self = Self {
        program_size: PROGRAM_SIZE,
        mem_size: MEM_SIZE,
        max_steps: MAX_STEPS,
    };

    /// Create a new configuration with validation
    pub const fn new(
        program_size: usize,
        mem_size: usize,
        max_steps: usize,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            program_size,
            mem_size,
            max_steps,
        };

        if program_size == 0 {
            return Err(ConfigError::EmptyProgramSpace);
        }
        if mem_size == 0 || mem_size > ADDRESS_SPACE {
            return Err(ConfigError::InvalidMemSize);
        }
        if max_steps == 0 {
            return Err(ConfigError::ZeroStepBudget);
        }

        Ok(config)
    }

    /// Same configuration with a different step budget
    pub const fn with_max_steps(self, max_steps: usize) -> Self {
        Self { max_steps, ..self }
    }

    /// Same configuration with a different program capacity
    pub const fn with_program_size(self, program_size: usize) -> Self {
        Self {
            program_size,
            ..self
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::new(self.program_size, self.mem_size, self.max_steps).map(|_| ())
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MachineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MachineConfig {{ program: {} instructions, memory: {} cells, budget: {} steps }}",
            self.program_size, self.mem_size, self.max_steps,
        )
    }
}

/// Configuration error types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// Program capacity must be at least one instruction
    EmptyProgramSpace,
    /// Memory size must be in range [1, 256]
    InvalidMemSize,
    /// Step budget must be at least one
    ZeroStepBudget,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyProgramSpace => write!(f, "program_size must be at least 1"),
            ConfigError::InvalidMemSize => write!(f, "mem_size must be in range [1, 256]"),
            ConfigError::ZeroStepBudget => write!(f, "max_steps must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}
