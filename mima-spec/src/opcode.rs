//! # MiMa Opcode Definitions
//!
//! Opcode values follow the classic minimal machine numbering:
//! - 0x00-0x0D: Memory / accumulator / jump operations (LDC .. JIND)
//! - 0x0E: Free slot (reserved, never executable)
//! - 0x0F-0x11: Extended no-argument operations (HALT, NOT, RAR)
//! - 0x12-0x13: Pseudo operations produced by the assembler (NOP, LABEL)

use serde::{Deserialize, Serialize};

/// Instruction opcode
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Opcode {
    // ========== Accumulator / memory (0x00-0x07) ==========
    /// LDC c: c -> Acc
    Ldc = 0x00,
    /// LDV a: <a> -> Acc
    Ldv = 0x01,
    /// STV a: Acc -> <a>
    Stv = 0x02,
    /// ADD a: Acc + <a> -> Acc
    Add = 0x03,
    /// AND a: Acc AND <a> -> Acc
    And = 0x04,
    /// OR a: Acc OR <a> -> Acc
    Or = 0x05,
    /// XOR a: Acc XOR <a> -> Acc
    Xor = 0x06,
    /// EQL a: Acc == <a> ? -1 : 0 -> Acc
    Eql = 0x07,

    // ========== Jumps (0x08-0x09) ==========
    /// JMP a: jump to a
    Jmp = 0x08,
    /// JMN a: jump to a if Acc < 0
    Jmn = 0x09,

    // ========== Indirect memory (0x0A-0x0B) ==========
    /// LDIV a: <<a>> -> Acc
    Ldiv = 0x0A,
    /// STIV a: Acc -> <<a>>
    Stiv = 0x0B,

    // ========== Unresolved control transfer (0x0C-0x0D) ==========
    /// JMS a: jump subroutine
    Jms = 0x0C,
    /// JIND a: jump indirect
    Jind = 0x0D,

    /// Unassigned slot
    Free = 0x0E,

    // ========== Extended (0x0F-0x11) ==========
    /// HALT: stop the machine
    Halt = 0x0F,
    /// NOT: one's complement(Acc) -> Acc
    Not = 0x10,
    /// RAR: rotate Acc right by one bit
    Rar = 0x11,

    // ========== Pseudo operations (0x12-0x13) ==========
    /// NOP: advance the program counter
    Nop = 0x12,
    /// Label marker, only ever present during assembly
    Label = 0x13,
}

/// Shape of the operand an opcode carries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// No operand
    None,
    /// Immediate 8-bit value
    Value,
    /// Memory address
    Address,
    /// Resolved instruction index
    Target,
    /// Memory address, or a resolved label used as one (EQL only)
    AddressOrTarget,
}

impl Opcode {
    /// Largest valid raw opcode value
    pub const MAX: u8 = 0x13;

    /// Try to convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Opcode::Ldc),
            0x01 => Some(Opcode::Ldv),
            0x02 => Some(Opcode::Stv),
            0x03 => Some(Opcode::Add),
            0x04 => Some(Opcode::And),
            0x05 => Some(Opcode::Or),
            0x06 => Some(Opcode::Xor),
            0x07 => Some(Opcode::Eql),
            0x08 => Some(Opcode::Jmp),
            0x09 => Some(Opcode::Jmn),
            0x0A => Some(Opcode::Ldiv),
            0x0B => Some(Opcode::Stiv),
            0x0C => Some(Opcode::Jms),
            0x0D => Some(Opcode::Jind),
            0x0E => Some(Opcode::Free),
            0x0F => Some(Opcode::Halt),
            0x10 => Some(Opcode::Not),
            0x11 => Some(Opcode::Rar),
            0x12 => Some(Opcode::Nop),
            0x13 => Some(Opcode::Label),
            _ => None,
        }
    }

    /// Convert to u8
    #[inline]
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Look up an opcode by its assembly mnemonic (case-sensitive)
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        match name {
            "LDC" => Some(Opcode::Ldc),
            "LDV" => Some(Opcode::Ldv),
            "STV" => Some(Opcode::Stv),
            "ADD" => Some(Opcode::Add),
            "AND" => Some(Opcode::And),
            "OR" => Some(Opcode::Or),
            "XOR" => Some(Opcode::Xor),
            "EQL" => Some(Opcode::Eql),
            "JMP" => Some(Opcode::Jmp),
            "JMN" => Some(Opcode::Jmn),
            "LDIV" => Some(Opcode::Ldiv),
            "STIV" => Some(Opcode::Stiv),
            "JMS" => Some(Opcode::Jms),
            "JIND" => Some(Opcode::Jind),
            "HALT" => Some(Opcode::Halt),
            "NOT" => Some(Opcode::Not),
            "RAR" => Some(Opcode::Rar),
            _ => None,
        }
    }

    /// Assembly mnemonic
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Ldc => "LDC",
            Opcode::Ldv => "LDV",
            Opcode::Stv => "STV",
            Opcode::Add => "ADD",
            Opcode::And => "AND",
            Opcode::Or => "OR",
            Opcode::Xor => "XOR",
            Opcode::Eql => "EQL",
            Opcode::Jmp => "JMP",
            Opcode::Jmn => "JMN",
            Opcode::Ldiv => "LDIV",
            Opcode::Stiv => "STIV",
            Opcode::Jms => "JMS",
            Opcode::Jind => "JIND",
            Opcode::Free => "FREE",
            Opcode::Halt => "HALT",
            Opcode::Not => "NOT",
            Opcode::Rar => "RAR",
            Opcode::Nop => "NOP",
            Opcode::Label => "LABEL",
        }
    }

    /// Operand shape expected by this opcode
    pub const fn operand_kind(self) -> OperandKind {
        match self {
            Opcode::Ldc => OperandKind::Value,
            Opcode::Ldv
            | Opcode::Stv
            | Opcode::Add
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Ldiv
            | Opcode::Stiv => OperandKind::Address,
            Opcode::Eql => OperandKind::AddressOrTarget,
            Opcode::Jmp | Opcode::Jmn | Opcode::Jms | Opcode::Jind => OperandKind::Target,
            Opcode::Free | Opcode::Halt | Opcode::Not | Opcode::Rar | Opcode::Nop | Opcode::Label => {
                OperandKind::None
            }
        }
    }

    /// Check if this opcode may take a label operand in assembly source
    #[inline]
    pub const fn accepts_label(self) -> bool {
        matches!(
            self,
            Opcode::Eql | Opcode::Jmp | Opcode::Jmn | Opcode::Jms | Opcode::Jind
        )
    }

    /// Check if this opcode may take a numeric operand in assembly source
    #[inline]
    pub const fn accepts_number(self) -> bool {
        matches!(
            self,
            Opcode::Ldc
                | Opcode::Ldv
                | Opcode::Stv
                | Opcode::Add
                | Opcode::And
                | Opcode::Or
                | Opcode::Xor
                | Opcode::Eql
                | Opcode::Ldiv
                | Opcode::Stiv
        )
    }

    /// Check if this opcode may appear in an executable program
    #[inline]
    pub const fn is_executable(self) -> bool {
        !matches!(self, Opcode::Free | Opcode::Label)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}
