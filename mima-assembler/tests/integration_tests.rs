//! Integration tests for the MiMa assembler
//!
//! Tests the complete assembly workflow including:
//! - Instruction parsing for every mnemonic
//! - Label resolution
//! - Machine configuration bounds

use mima_assembler::{assemble, Assembler, AssemblerOptions};
use mima_spec::{Instruction, MachineConfig, Opcode, Operand, Program};
use proptest::prelude::*;

// ============================================================================
// Basic Assembly Tests
// ============================================================================

#[test]
fn test_assemble_empty_program() {
    let program = assemble("").unwrap();
    assert!(program.is_empty());
}

#[test]
fn test_assemble_comments_only() {
    let source = r#"
        ; This is a comment
        ; Another comment
    "#;
    assert!(assemble(source).unwrap().is_empty());
}

#[test]
fn test_scenario_a_layout() {
    let program = assemble("LDC 1\nSTV 0\nLDC 2\nHALT").unwrap();
    assert_eq!(
        program,
        Program::new(vec![
            Instruction::ldc(1),
            Instruction::with_address(Opcode::Stv, 0),
            Instruction::ldc(2),
            Instruction::halt(),
        ])
    );
}

#[test]
fn test_every_mnemonic() {
    let source = r#"
        LDC 1
        LDV 2
        STV 3
        ADD 4
        AND 5
        OR 6
        XOR 7
        EQL 8
        LDIV 9
        STIV 10
        NOT
        RAR
        target: JMP target
        JMN target
        JMS target
        JIND target
    "#;
    let config = MachineConfig::DEFAULT;
    let program = Assembler::new(config).assemble(source).unwrap();
    assert_eq!(program.len(), 16);

    let opcodes: Vec<Opcode> = program.iter().map(|i| i.opcode).collect();
    assert_eq!(
        opcodes,
        vec![
            Opcode::Ldc,
            Opcode::Ldv,
            Opcode::Stv,
            Opcode::Add,
            Opcode::And,
            Opcode::Or,
            Opcode::Xor,
            Opcode::Eql,
            Opcode::Ldiv,
            Opcode::Stiv,
            Opcode::Not,
            Opcode::Rar,
            Opcode::Jmp,
            Opcode::Jmn,
            Opcode::Jms,
            Opcode::Jind,
        ]
    );

    for instr in program.iter().skip(12) {
        assert_eq!(instr.operand, Operand::Target(12));
    }
}

#[test]
fn test_whitespace_is_insignificant() {
    let compact = assemble("LDC 1 STV 0 HALT").unwrap();
    let spread = assemble("\n\n   LDC    1\n\tSTV\n0\n\nHALT   \n\n").unwrap();
    assert_eq!(compact, spread);
}

// ============================================================================
// Label Resolution Tests
// ============================================================================

#[test]
fn test_scenario_c_layout() {
    let program = assemble("LDC 5 \n JMN label \n LDC 9 \n label: HALT").unwrap();
    assert_eq!(program.len(), 4);
    assert_eq!(program[1], Instruction::with_target(Opcode::Jmn, 3));
}

#[test]
fn test_labels_with_placeholders() {
    let assembler = Assembler::new(MachineConfig::DEFAULT).with_options(AssemblerOptions {
        label_placeholders: true,
    });
    let program = assembler
        .assemble("start: LDC 1\nJMP start")
        .unwrap();
    assert_eq!(
        program,
        Program::new(vec![
            Instruction::nop(),
            Instruction::ldc(1),
            Instruction::with_target(Opcode::Jmp, 0),
        ])
    );
}

#[test]
fn test_consecutive_labels_share_an_index() {
    let program = assemble("a: b: HALT\nJMP a\nJMP b").unwrap();
    assert_eq!(program[1], Instruction::with_target(Opcode::Jmp, 0));
    assert_eq!(program[2], Instruction::with_target(Opcode::Jmp, 0));
}

#[test]
fn test_assembled_programs_validate() {
    let program = assemble("loop: LDV 0\nJMN loop\nJMP end\nNOT\nend: HALT").unwrap();
    assert!(program.validate(&MachineConfig::DEFAULT).is_ok());
}

#[test]
fn test_image_round_trip() {
    let program = assemble("LDC -3\nSTV 1\nHALT").unwrap();
    let bytes = program.to_bytes().unwrap();
    assert_eq!(Program::from_bytes(&bytes).unwrap(), program);
}

// ============================================================================
// Property Tests
// ============================================================================

fn mnemonic_line() -> impl Strategy<Value = String> {
    prop_oneof![
        (-300i64..300).prop_map(|v| format!("LDC {}", v)),
        (0u8..16).prop_map(|a| format!("STV {}", a)),
        (0u8..16).prop_map(|a| format!("ADD {}", a)),
        Just("NOT".to_string()),
        Just("RAR".to_string()),
        Just("JMP end".to_string()),
        Just("JMN end".to_string()),
        Just("EQL end".to_string()),
    ]
}

proptest! {
    // No label survives assembly and every target lies inside the program
    #[test]
    fn test_labels_always_resolve(lines in prop::collection::vec(mnemonic_line(), 0..14)) {
        let source = format!("{}\nend: HALT", lines.join("\n"));
        let program = assemble(&source).unwrap();

        prop_assert_eq!(program.len(), lines.len() + 1);
        for instr in program.iter() {
            if let Some(target) = instr.operand.target() {
                prop_assert_eq!(target, lines.len());
            }
        }
    }

    #[test]
    fn test_ldc_literal_wraps(value in -128i64..=255) {
        let program = assemble(&format!("LDC {}", value)).unwrap();
        prop_assert_eq!(program[0].operand, Operand::Value(value.rem_euclid(256) as u8));
    }
}
