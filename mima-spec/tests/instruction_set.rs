//! Instruction set tables, literal wrapping and program images

use mima_spec::{
    wrap_word, ConfigError, Instruction, MachineConfig, MimaError, Opcode, Operand, OperandKind,
    Program,
};
use mima_spec::program::HEADER_SIZE;
use proptest::prelude::*;

fn all_opcodes() -> impl Iterator<Item = Opcode> {
    (0..=Opcode::MAX).filter_map(Opcode::from_u8)
}

// ============================================================================
// Opcode table
// ============================================================================

#[test]
fn test_opcode_table_is_dense() {
    assert_eq!(all_opcodes().count(), Opcode::MAX as usize + 1);
    assert_eq!(Opcode::from_u8(Opcode::MAX + 1), None);
}

#[test]
fn test_mnemonics_round_trip_for_real_instructions() {
    for opcode in all_opcodes() {
        let parsed = Opcode::from_mnemonic(opcode.mnemonic());
        if matches!(opcode, Opcode::Free | Opcode::Nop | Opcode::Label) {
            assert_eq!(parsed, None, "{} is not written in source", opcode);
        } else {
            assert_eq!(parsed, Some(opcode));
        }
    }
}

#[test]
fn test_source_operands_agree_with_operand_kind() {
    for opcode in all_opcodes() {
        let kind = opcode.operand_kind();
        assert_eq!(
            opcode.accepts_label(),
            matches!(kind, OperandKind::Target | OperandKind::AddressOrTarget),
            "{}",
            opcode
        );
        assert_eq!(
            opcode.accepts_number(),
            matches!(
                kind,
                OperandKind::Value | OperandKind::Address | OperandKind::AddressOrTarget
            ),
            "{}",
            opcode
        );
    }
}

#[test]
fn test_only_free_and_label_are_not_executable() {
    let reserved: Vec<Opcode> = all_opcodes().filter(|op| !op.is_executable()).collect();
    assert_eq!(reserved, vec![Opcode::Free, Opcode::Label]);
}

// ============================================================================
// Operands
// ============================================================================

#[test]
fn test_eql_accepts_both_operand_shapes() {
    assert!(Instruction::with_address(Opcode::Eql, 3).is_well_formed());
    assert!(Instruction::with_target(Opcode::Eql, 3).is_well_formed());
    assert!(!Instruction::bare(Opcode::Eql).is_well_formed());
}

#[test]
fn test_target_as_address_wraps() {
    assert_eq!(Operand::Target(3).address(), Some(3));
    assert_eq!(Operand::Target(258).address(), Some(2));
    assert_eq!(Operand::Value(3).address(), None);
}

#[test]
fn test_instruction_display() {
    assert_eq!(Instruction::ldc(-1).to_string(), "LDC 255");
    assert_eq!(Instruction::with_address(Opcode::Stv, 4).to_string(), "STV 4");
    assert_eq!(Instruction::with_target(Opcode::Jmn, 3).to_string(), "JMN @3");
    assert_eq!(Instruction::halt().to_string(), "HALT");
}

// ============================================================================
// Images
// ============================================================================

#[test]
fn test_image_opcodes_are_checked_against_the_table() {
    let mut bytes = Program::new(vec![Instruction::ldc(7), Instruction::halt()])
        .to_bytes()
        .unwrap();
    // Opcode byte of the first instruction, after the u64 list length
    bytes[HEADER_SIZE + 8] = Opcode::MAX + 1;
    let err = Program::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, MimaError::InvalidOpcode(byte) if byte == Opcode::MAX + 1));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_bounds() {
    assert_eq!(MachineConfig::new(0, 16, 16), Err(ConfigError::EmptyProgramSpace));
    assert_eq!(MachineConfig::new(16, 0, 16), Err(ConfigError::InvalidMemSize));
    assert_eq!(MachineConfig::new(16, 257, 16), Err(ConfigError::InvalidMemSize));
    assert_eq!(MachineConfig::new(16, 16, 0), Err(ConfigError::ZeroStepBudget));
    assert_eq!(MachineConfig::new(16, 16, 16), Ok(MachineConfig::DEFAULT));
}

#[test]
fn test_invalid_config_fails_validation() {
    let config = MachineConfig {
        mem_size: 0,
        ..MachineConfig::DEFAULT
    };
    let err = Program::default().validate(&config).unwrap_err();
    assert!(matches!(err, MimaError::InvalidConfig(ConfigError::InvalidMemSize)));
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_wrap_word_is_congruent(value in -1000i64..1000) {
        let wrapped = wrap_word(value);
        prop_assert_eq!((value - wrapped as i64).rem_euclid(256), 0);
    }

    #[test]
    fn prop_signed_byte_literals_keep_their_bits(value in -128i64..=127) {
        prop_assert_eq!(wrap_word(value), value as i8 as u8);
    }

    #[test]
    fn prop_truncated_images_are_rejected(cut in 0usize..8) {
        let bytes = Program::new(vec![Instruction::halt()]).to_bytes().unwrap();
        prop_assert!(Program::from_bytes(&bytes[..cut]).is_err());
    }
}
