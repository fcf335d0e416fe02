//! MiMa Instruction Set
//!
//! An instruction is an opcode paired with at most one operand. Immediates and
//! addresses are stored already normalised to 8 bits; control transfers carry
//! a resolved instruction index.

use crate::opcode::{Opcode, OperandKind};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Instruction operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// No operand
    None,
    /// Immediate value (LDC)
    Value(u8),
    /// Memory address
    Address(u8),
    /// Resolved instruction index
    Target(usize),
}

impl Operand {
    /// Check whether this operand fits the shape an opcode expects
    pub fn fits(&self, kind: OperandKind) -> bool {
        matches!(
            (kind, self),
            (OperandKind::None, Operand::None)
                | (OperandKind::Value, Operand::Value(_))
                | (OperandKind::Address, Operand::Address(_))
                | (OperandKind::Target, Operand::Target(_))
                | (OperandKind::AddressOrTarget, Operand::Address(_))
                | (OperandKind::AddressOrTarget, Operand::Target(_))
        )
    }

    /// Memory address this operand denotes, if any
    ///
    /// A resolved target used as an address wraps into the 8-bit address
    /// space.
    pub fn address(&self) -> Option<u8> {
        match self {
            Operand::Address(a) => Some(*a),
            Operand::Target(t) => Some((*t & 0xFF) as u8),
            _ => None,
        }
    }

    /// Resolved instruction index, if any
    pub fn target(&self) -> Option<usize> {
        match self {
            Operand::Target(t) => Some(*t),
            _ => None,
        }
    }
}

/// MiMa instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    pub const fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// LDC with a signed literal, wrapped into 8 bits
    pub fn ldc(value: i64) -> Self {
        Self::new(Opcode::Ldc, Operand::Value(wrap_word(value)))
    }

    /// Instruction addressing a memory cell
    pub const fn with_address(opcode: Opcode, address: u8) -> Self {
        Self::new(opcode, Operand::Address(address))
    }

    /// Instruction transferring control to an instruction index
    pub const fn with_target(opcode: Opcode, target: usize) -> Self {
        Self::new(opcode, Operand::Target(target))
    }

    /// Instruction without operand
    pub const fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Operand::None)
    }

    pub const fn halt() -> Self {
        Self::bare(Opcode::Halt)
    }

    pub const fn nop() -> Self {
        Self::bare(Opcode::Nop)
    }

    /// Check the operand against the opcode's expected shape
    pub fn is_well_formed(&self) -> bool {
        self.operand.fits(self.opcode.operand_kind())
    }
}

/// Wrap a signed literal into an 8-bit two's complement word
#[inline]
pub fn wrap_word(value: i64) -> u8 {
    value.rem_euclid(256) as u8
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operand {
            Operand::None => write!(f, "{}", self.opcode),
            Operand::Value(v) => write!(f, "{} {}", self.opcode, v),
            Operand::Address(a) => write!(f, "{} {}", self.opcode, a),
            Operand::Target(t) => write!(f, "{} @{}", self.opcode, t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_word() {
        assert_eq!(wrap_word(0), 0);
        assert_eq!(wrap_word(-1), 0xFF);
        assert_eq!(wrap_word(-128), 0x80);
        assert_eq!(wrap_word(255), 0xFF);
        assert_eq!(wrap_word(256), 0);
        assert_eq!(wrap_word(300), 44);
        assert_eq!(wrap_word(-257), 0xFF);
    }

    #[test]
    fn test_ldc_normalises_negative_literals() {
        assert_eq!(Instruction::ldc(-1).operand, Operand::Value(0xFF));
        assert_eq!(Instruction::ldc(2).operand, Operand::Value(2));
    }

    #[test]
    fn test_well_formed() {
        assert!(Instruction::ldc(1).is_well_formed());
        assert!(Instruction::halt().is_well_formed());
        assert!(Instruction::with_address(Opcode::Stv, 0).is_well_formed());
        assert!(Instruction::with_target(Opcode::Jmn, 3).is_well_formed());
        assert!(Instruction::with_target(Opcode::Eql, 3).is_well_formed());
        assert!(Instruction::with_address(Opcode::Eql, 3).is_well_formed());

        assert!(!Instruction::with_address(Opcode::Jmp, 3).is_well_formed());
        assert!(!Instruction::with_target(Opcode::Ldv, 3).is_well_formed());
        assert!(!Instruction::bare(Opcode::Ldc).is_well_formed());
    }

    #[test]
    fn test_operand_address() {
        assert_eq!(Operand::Address(7).address(), Some(7));
        assert_eq!(Operand::Target(3).address(), Some(3));
        assert_eq!(Operand::Target(258).address(), Some(2));
        assert_eq!(Operand::Value(7).address(), None);
        assert_eq!(Operand::None.target(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Instruction::ldc(-1).to_string(), "LDC 255");
        assert_eq!(Instruction::with_target(Opcode::Jmp, 2).to_string(), "JMP @2");
        assert_eq!(Instruction::halt().to_string(), "HALT");
    }
}
