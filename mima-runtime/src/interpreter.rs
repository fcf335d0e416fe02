//! Bounded interpreter for MiMa programs
//!
//! The fetch/execute loop runs at most `max_steps` instructions. `run` follows
//! a single path and fails on a branch it cannot decide; `explore` forks at
//! such branches and returns every path with its path condition.

use crate::error::{Result, RuntimeError};
use crate::execute::{execute, Transition};
use crate::state::{HaltReason, MachineState};
use crate::word::{Backend, Flag, Word};
use mima_spec::{MachineConfig, Opcode, Program};

type FlagOf<B> = <<B as Backend>::Word as Word>::Flag;

/// Final state of a terminated run
#[derive(Debug, Clone)]
pub struct Outcome<B: Backend> {
    pub accumulator: B::Word,
    pub memory: B::Memory,
    pub pc: usize,
    pub steps: usize,
    pub halt_reason: HaltReason,
}

impl<B: Backend> Outcome<B> {
    fn from_state(state: MachineState<B>, halt_reason: HaltReason) -> Self {
        Self {
            accumulator: state.accumulator,
            memory: state.memory,
            pc: state.pc,
            steps: state.steps,
            halt_reason,
        }
    }

    /// The observable result: accumulator and memory
    pub fn into_pair(self) -> (B::Word, B::Memory) {
        (self.accumulator, self.memory)
    }
}

/// One feasible-looking path through the program
///
/// `conditions` holds the branch decisions taken along the way; the path is
/// possible exactly when all of them hold together. Paths are not checked for
/// feasibility here.
#[derive(Debug)]
pub struct Path<B: Backend> {
    pub conditions: Vec<FlagOf<B>>,
    pub result: Result<Outcome<B>>,
}

enum Stop<F> {
    Done(HaltReason),
    Branch { condition: F, target: usize },
}

/// MiMa interpreter over a chosen backend
pub struct Interpreter<B: Backend> {
    program: Program,
    config: MachineConfig,
    initial: MachineState<B>,
}

impl<B: Backend> Interpreter<B> {
    /// Validate `program` against `config` and prepare the initial state
    pub fn new(program: Program, config: MachineConfig) -> Result<Self> {
        program.validate(&config)?;
        let initial = MachineState::initial();
        Ok(Self {
            program,
            config,
            initial,
        })
    }

    /// Replace the initial accumulator and memory
    pub fn with_initial_state(mut self, accumulator: B::Word, memory: B::Memory) -> Self {
        self.initial = MachineState::new(accumulator, memory);
        self
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Run a single path to termination
    pub fn run(&self) -> Result<Outcome<B>> {
        let mut state = self.initial.clone();
        match self.advance(&mut state)? {
            Stop::Done(reason) => {
                tracing::debug!(
                    backend = B::NAME,
                    steps = state.steps,
                    pc = state.pc,
                    "run finished: {}",
                    reason
                );
                Ok(Outcome::from_state(state, reason))
            }
            Stop::Branch { .. } => Err(RuntimeError::SymbolicBranch { pc: state.pc }),
        }
    }

    /// Run every path, forking at undecided branches
    pub fn explore(&self) -> Vec<Path<B>> {
        let mut paths = Vec::new();
        let mut pending = vec![(self.initial.clone(), Vec::new())];

        while let Some((mut state, mut conditions)) = pending.pop() {
            let result = match self.advance(&mut state) {
                Ok(Stop::Done(reason)) => Ok(Outcome::from_state(state, reason)),
                Ok(Stop::Branch { condition, target }) => {
                    tracing::debug!(pc = state.pc, to = target, "forking on {}", condition);

                    let mut taken = state.clone();
                    taken.pc = target;
                    let mut taken_conditions = conditions.clone();
                    taken_conditions.push(condition.clone());
                    pending.push((taken, taken_conditions));

                    state.pc += 1;
                    conditions.push(condition.negate());
                    pending.push((state, conditions));
                    continue;
                }
                Err(err) => Err(err),
            };
            paths.push(Path { conditions, result });
        }

        tracing::debug!(backend = B::NAME, paths = paths.len(), "exploration finished");
        paths
    }

    /// Execute from `state` until it stops or reaches an undecided branch
    fn advance(&self, state: &mut MachineState<B>) -> Result<Stop<FlagOf<B>>> {
        loop {
            let instr = match self.program.get(state.pc) {
                Some(instr) => instr,
                None => {
                    tracing::warn!(
                        pc = state.pc,
                        len = self.program.len(),
                        "program counter outside program"
                    );
                    return Ok(Stop::Done(HaltReason::InvalidProgramCounter { pc: state.pc }));
                }
            };

            if state.steps >= self.config.max_steps {
                if instr.opcode == Opcode::Halt {
                    return Ok(Stop::Done(HaltReason::Halt));
                }
                return Err(RuntimeError::StepBudgetExceeded {
                    limit: self.config.max_steps,
                    pc: state.pc,
                });
            }

            tracing::trace!(
                step = state.steps,
                pc = state.pc,
                acc = %state.accumulator,
                "{}",
                instr
            );

            let transition = execute(instr, state)?;
            state.steps += 1;

            match transition {
                Transition::Continue => {}
                Transition::Stop(reason) => return Ok(Stop::Done(reason)),
                Transition::Branch { condition, target } => {
                    return Ok(Stop::Branch { condition, target })
                }
            }
        }
    }
}
