//! # Program Structure for MiMa
//!
//! An assembled program is an ordered instruction list. Program images add a
//! fixed header in front of a bincode payload.

use crate::config::MachineConfig;
use crate::error::{MimaError, Result};
use crate::instruction::{Instruction, Operand};
use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};
use std::ops::Index;

/// Magic number for MiMa images: "MIMA" = 0x4D494D41
pub const MAGIC: u32 = 0x4D494D41;

/// Version: v1.0 = 0x00010000
pub const VERSION: u32 = 0x00010000;

/// Program image header size in bytes
///
/// Binary format:
/// ```text
/// Offset  Size  Field
/// ──────────────────────────────────
/// 0x00    4     magic ("MIMA")
/// 0x04    4     version
/// 0x08    ..    bincode-encoded list of (opcode byte, operand)
/// ```
pub const HEADER_SIZE: usize = 8;

/// Instruction as stored in an image; the opcode stays a raw byte until
/// decoding checks it
#[derive(Serialize, Deserialize)]
struct RawInstruction {
    opcode: u8,
    operand: Operand,
}

impl RawInstruction {
    fn decode(self) -> Result<Instruction> {
        let opcode = Opcode::from_u8(self.opcode).ok_or(MimaError::InvalidOpcode(self.opcode))?;
        Ok(Instruction::new(opcode, self.operand))
    }
}

impl From<&Instruction> for RawInstruction {
    fn from(instr: &Instruction) -> Self {
        Self {
            opcode: instr.opcode.to_u8(),
            operand: instr.operand,
        }
    }
}

/// Assembled program
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Fetch the instruction at `pc`, if it is in range
    pub fn get(&self, pc: usize) -> Option<&Instruction> {
        self.instructions.get(pc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter()
    }

    /// Validate the program against machine bounds
    ///
    /// Every opcode must be executable, every operand must match its
    /// opcode, and every control transfer must land inside the program.
    pub fn validate(&self, config: &MachineConfig) -> Result<()> {
        config.validate()?;

        if self.len() > config.program_size {
            return Err(MimaError::ProgramTooLarge {
                len: self.len(),
                capacity: config.program_size,
            });
        }

        for (index, instr) in self.instructions.iter().enumerate() {
            if !instr.opcode.is_executable() {
                return Err(MimaError::ReservedOpcode {
                    opcode: instr.opcode,
                    index,
                });
            }

            if !instr.is_well_formed() {
                return Err(MimaError::OperandMismatch {
                    opcode: instr.opcode,
                    index,
                    expected: instr.opcode.operand_kind(),
                });
            }

            if let Operand::Target(target) = instr.operand {
                if target >= self.len() {
                    return Err(MimaError::InvalidTarget {
                        index,
                        target,
                        len: self.len(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Serialize to a program image
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.len() * 4);
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&VERSION.to_le_bytes());
        let raw: Vec<RawInstruction> = self.instructions.iter().map(RawInstruction::from).collect();
        bytes.extend_from_slice(&bincode::serialize(&raw)?);
        Ok(bytes)
    }

    /// Deserialize from a program image
    ///
    /// Only the image format is checked here; callers validate against their
    /// own machine bounds.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(MimaError::InvalidImage(format!(
                "expected at least {} bytes, found {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        if magic != MAGIC {
            return Err(MimaError::InvalidMagic(magic));
        }

        let version = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        if version != VERSION {
            return Err(MimaError::InvalidVersion {
                expected: VERSION,
                found: version,
            });
        }

        let raw: Vec<RawInstruction> = bincode::deserialize(&bytes[HEADER_SIZE..])?;
        let instructions = raw
            .into_iter()
            .map(RawInstruction::decode)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { instructions })
    }

    /// Check whether bytes start with the image magic
    pub fn is_image(bytes: &[u8]) -> bool {
        bytes.len() >= 4 && bytes[0..4] == MAGIC.to_le_bytes()
    }
}

impl Index<usize> for Program {
    type Output = Instruction;

    fn index(&self, index: usize) -> &Self::Output {
        &self.instructions[index]
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Self::new(instructions)
    }
}
