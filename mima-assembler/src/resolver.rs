//! Two-pass label resolution
//!
//! Pass 1 lays out instructions and records where every label points. Pass 2
//! replaces label operands with those indices.

use crate::error::{AssemblerError, Result};
use crate::parser::{Form, Position, RawOperand};
use mima_spec::{wrap_word, Instruction, Opcode, Operand, OperandKind};
use std::collections::HashMap;

/// Layout options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblerOptions {
    /// Emit a NOP for every label definition, so each label points at its own
    /// placeholder instead of at the instruction after it
    pub label_placeholders: bool,
}

enum Pending {
    Ready(Operand),
    Label { name: String, at: Position },
}

/// Numeric operand as an 8-bit word
fn numeric(opcode: Opcode, value: i64, at: Position) -> Operand {
    if !(-128..=255).contains(&value) {
        tracing::warn!(
            line = at.line,
            column = at.column,
            "{} operand {} wraps to {}",
            opcode,
            value,
            wrap_word(value)
        );
    }
    match opcode.operand_kind() {
        OperandKind::Value => Operand::Value(wrap_word(value)),
        _ => Operand::Address(wrap_word(value)),
    }
}

/// Resolve parsed forms into an instruction list
pub fn resolve(forms: &[Form], options: AssemblerOptions) -> Result<Vec<Instruction>> {
    // Pass 1: layout
    let mut labels: HashMap<&str, usize> = HashMap::new();
    let mut raw: Vec<(Opcode, Pending)> = Vec::with_capacity(forms.len());

    for form in forms {
        match form {
            Form::Label { name, .. } => {
                let index = raw.len();
                if let Some(previous) = labels.insert(name.as_str(), index) {
                    tracing::debug!(label = %name, previous, index, "label redefined");
                }
                if options.label_placeholders {
                    raw.push((Opcode::Nop, Pending::Ready(Operand::None)));
                }
            }
            Form::Instruction { opcode, operand, at } => {
                let pending = match operand {
                    RawOperand::None => Pending::Ready(Operand::None),
                    RawOperand::Number(value) => Pending::Ready(numeric(*opcode, *value, *at)),
                    RawOperand::Label(name) => Pending::Label {
                        name: name.clone(),
                        at: *at,
                    },
                };
                raw.push((*opcode, pending));
            }
        }
    }

    // A label after the last instruction still needs something to point at.
    if labels.values().any(|&index| index == raw.len()) {
        raw.push((Opcode::Nop, Pending::Ready(Operand::None)));
    }

    tracing::debug!(labels = labels.len(), instructions = raw.len(), "layout done");

    // Pass 2: resolve
    raw.into_iter()
        .map(|(opcode, pending)| {
            let operand = match pending {
                Pending::Ready(operand) => operand,
                Pending::Label { name, at } => match labels.get(name.as_str()) {
                    Some(&index) => Operand::Target(index),
                    None => {
                        return Err(AssemblerError::UnresolvedLabel {
                            label: name,
                            line: at.line,
                            column: at.column,
                        })
                    }
                },
            };
            Ok(Instruction::new(opcode, operand))
        })
        .collect()
}
