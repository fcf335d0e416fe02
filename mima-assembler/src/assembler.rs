//! Main assembler logic

use crate::error::{AssemblerError, Result};
use crate::parser::parse;
use crate::resolver::{resolve, AssemblerOptions};
use mima_spec::{MachineConfig, Program};

/// Assembler bound to a machine configuration
#[derive(Debug, Clone, Copy, Default)]
pub struct Assembler {
    config: MachineConfig,
    options: AssemblerOptions,
}

impl Assembler {
    pub fn new(config: MachineConfig) -> Self {
        Self {
            config,
            options: AssemblerOptions::default(),
        }
    }

    pub fn with_options(mut self, options: AssemblerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Assemble source code into a validated program
    pub fn assemble(&self, source: &str) -> Result<Program> {
        let forms = parse(source)?;
        let program = Program::new(resolve(&forms, self.options)?);

        if program.len() > self.config.program_size {
            return Err(AssemblerError::ProgramTooLarge {
                len: program.len(),
                capacity: self.config.program_size,
            });
        }
        program.validate(&self.config)?;

        tracing::debug!(instructions = program.len(), "assembled");
        Ok(program)
    }
}

/// Assemble source code into a program for the default machine
pub fn assemble(source: &str) -> Result<Program> {
    Assembler::default().assemble(source)
}
