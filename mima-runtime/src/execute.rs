//! Instruction execution for MiMa
//!
//! One function, generic over the backend, implements the transition relation.
//! The concrete and symbolic interpreters share it unchanged.

use crate::error::{Result, RuntimeError};
use crate::memory::Memory;
use crate::state::{HaltReason, MachineState};
use crate::word::{Backend, Flag, Word};
use mima_spec::{Instruction, MimaError, Opcode, FALSE_WORD, TRUE_WORD};

/// Result of executing one instruction
#[derive(Debug, Clone)]
pub enum Transition<F> {
    /// Continue at the updated program counter
    Continue,
    /// Stop after this instruction
    Stop(HaltReason),
    /// JMN on an undecided sign: jump to `target` if `condition`, else fall through
    Branch { condition: F, target: usize },
}

fn operand_error(instr: &Instruction, pc: usize) -> RuntimeError {
    RuntimeError::InvalidProgram(MimaError::OperandMismatch {
        opcode: instr.opcode,
        index: pc,
        expected: instr.opcode.operand_kind(),
    })
}

#[inline]
fn address<W: Word>(instr: &Instruction, pc: usize) -> Result<W> {
    instr
        .operand
        .address()
        .map(W::constant)
        .ok_or_else(|| operand_error(instr, pc))
}

#[inline]
fn target(instr: &Instruction, pc: usize) -> Result<usize> {
    instr.operand.target().ok_or_else(|| operand_error(instr, pc))
}

/// Execute a single instruction against `state`
///
/// The program counter is updated for every outcome except `Branch`, which
/// leaves it at the branching instruction for the caller to resolve.
pub fn execute<B: Backend>(
    instr: &Instruction,
    state: &mut MachineState<B>,
) -> Result<Transition<<B::Word as Word>::Flag>> {
    let pc = state.pc;

    match instr.opcode {
        Opcode::Ldc => match instr.operand {
            mima_spec::Operand::Value(v) => state.accumulator = B::Word::constant(v),
            _ => return Err(operand_error(instr, pc)),
        },

        Opcode::Ldv => {
            let a = address::<B::Word>(instr, pc)?;
            state.accumulator = state.memory.read(&a);
        }

        Opcode::Stv => {
            let a = address::<B::Word>(instr, pc)?;
            state.memory = state.memory.write(&a, state.accumulator.clone());
        }

        Opcode::Add => {
            let a = address::<B::Word>(instr, pc)?;
            state.accumulator = state.accumulator.add(&state.memory.read(&a));
        }

        // OR evaluates as AND, a quirk of the source machine kept as is.
        Opcode::And | Opcode::Or => {
            let a = address::<B::Word>(instr, pc)?;
            state.accumulator = state.accumulator.and(&state.memory.read(&a));
        }

        Opcode::Xor => {
            let a = address::<B::Word>(instr, pc)?;
            state.accumulator = state.accumulator.xor(&state.memory.read(&a));
        }

        Opcode::Eql => {
            let a = address::<B::Word>(instr, pc)?;
            let equal = state.accumulator.equals(&state.memory.read(&a));
            state.accumulator = B::Word::select(
                &equal,
                &B::Word::constant(TRUE_WORD),
                &B::Word::constant(FALSE_WORD),
            );
        }

        Opcode::Jmp => {
            state.pc = target(instr, pc)?;
            return Ok(Transition::Continue);
        }

        Opcode::Jmn => {
            let target = target(instr, pc)?;
            let negative = state.accumulator.is_negative();
            match negative.as_concrete() {
                Some(true) => state.pc = target,
                Some(false) => state.pc = pc + 1,
                None => {
                    return Ok(Transition::Branch {
                        condition: negative,
                        target,
                    })
                }
            }
            return Ok(Transition::Continue);
        }

        Opcode::Ldiv => {
            let a = address::<B::Word>(instr, pc)?;
            let pointer = state.memory.read(&a);
            state.accumulator = state.memory.read(&pointer);
        }

        Opcode::Stiv => {
            let a = address::<B::Word>(instr, pc)?;
            let pointer = state.memory.read(&a);
            state.memory = state.memory.write(&pointer, state.accumulator.clone());
        }

        Opcode::Jms | Opcode::Jind => {
            target(instr, pc)?;
            state.pc = pc + 1;
            return Ok(Transition::Stop(HaltReason::UnresolvedSemantics {
                opcode: instr.opcode,
                pc,
            }));
        }

        Opcode::Halt => return Ok(Transition::Stop(HaltReason::Halt)),

        Opcode::Not => state.accumulator = state.accumulator.complement(),

        Opcode::Rar => state.accumulator = state.accumulator.rotate_right_one(),

        Opcode::Nop => {}

        Opcode::Free | Opcode::Label => {
            return Err(RuntimeError::InvalidProgram(MimaError::ReservedOpcode {
                opcode: instr.opcode,
                index: pc,
            }))
        }
    }

    state.pc = pc + 1;
    Ok(Transition::Continue)
}
