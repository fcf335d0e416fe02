//! # MiMa Runtime
//!
//! Bounded interpreter for MiMa programs over concrete or symbolic values.
//!
//! The same transition function drives both backends. Over concrete `u8`
//! words a run is an ordinary emulator; over symbolic terms the final
//! accumulator and memory come out as expressions over the initial memory,
//! and a [`Solver`] can decide postconditions about them.
//!
//! ## Features
//!
//! - **Bounded execution**: at most `max_steps` instructions per run
//! - **Two backends**: [`Concrete`] and [`Symbolic`]
//! - **Path exploration**: forks at undecided `JMN` branches
//! - **Solvers**: built-in enumeration solver, Z3 behind the `z3` feature
//!
//! ## Example
//!
//! ```rust
//! use mima_runtime::interpret;
//! use mima_spec::{Instruction, MachineConfig, Opcode, Program};
//!
//! let program = Program::new(vec![
//!     Instruction::ldc(1),
//!     Instruction::with_address(Opcode::Stv, 0),
//!     Instruction::ldc(2),
//!     Instruction::halt(),
//! ]);
//! let (acc, memory) = interpret(&program, &MachineConfig::DEFAULT).unwrap();
//! assert_eq!(acc, 2);
//! assert_eq!(memory.get(0), 1);
//! ```

pub mod error;
pub mod execute;
pub mod interpreter;
pub mod memory;
pub mod solver;
pub mod state;
pub mod symbolic;
pub mod verify;
pub mod word;
#[cfg(feature = "z3")]
pub mod z3_solver;

pub use error::{Result, RuntimeError, SolverError};
pub use interpreter::{Interpreter, Outcome, Path};
pub use memory::{ConcreteMemory, Memory};
pub use solver::{EnumerationSolver, SatResult, Solver};
pub use state::{HaltReason, MachineState};
pub use symbolic::{Formula, Model, Symbolic, SymbolicMemory, Term};
pub use verify::{check_postcondition, verify_program, Expectation, Verdict};
pub use word::{Backend, Concrete, Flag, Word};
#[cfg(feature = "z3")]
pub use z3_solver::Z3Solver;

use mima_spec::{MachineConfig, Program};

/// Run a program over concrete values from the zero state
///
/// Returns the final accumulator and memory.
pub fn interpret(program: &Program, config: &MachineConfig) -> Result<(u8, ConcreteMemory)> {
    Ok(Interpreter::<Concrete>::new(program.clone(), *config)?
        .run()?
        .into_pair())
}

/// Run a program over symbolic values
///
/// Starts from the same all-zero state as [`interpret`], so the results fold
/// to constants. Substitute free inputs through
/// [`Interpreter::with_initial_state`] to obtain open terms.
pub fn interpret_symbolic(
    program: &Program,
    config: &MachineConfig,
) -> Result<(Term, SymbolicMemory)> {
    Ok(Interpreter::<Symbolic>::new(program.clone(), *config)?
        .run()?
        .into_pair())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mima_spec::{Instruction, Opcode};

    fn scenario_a() -> Program {
        Program::new(vec![
            Instruction::ldc(1),
            Instruction::with_address(Opcode::Stv, 0),
            Instruction::ldc(2),
            Instruction::halt(),
        ])
    }

    #[test]
    fn test_interpret() {
        let (acc, mem) = interpret(&scenario_a(), &MachineConfig::DEFAULT).unwrap();
        assert_eq!(acc, 2);
        assert_eq!(mem.get(0), 1);
    }

    #[test]
    fn test_interpret_symbolic() {
        let (acc, mem) = interpret_symbolic(&scenario_a(), &MachineConfig::DEFAULT).unwrap();
        assert_eq!(acc.as_const(), Some(2));

        let verdict = check_postcondition(
            &EnumerationSolver::new(),
            &acc,
            &mem,
            &[
                Expectation::Memory { address: 0, value: 1 },
                Expectation::Accumulator(2),
            ],
        )
        .unwrap();
        assert_eq!(verdict, Verdict::Holds);
    }

    #[test]
    fn test_runs_are_independent() {
        let program = scenario_a();
        let first = interpret(&program, &MachineConfig::DEFAULT).unwrap();
        let second = interpret(&program, &MachineConfig::DEFAULT).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(Concrete::NAME, "concrete");
        assert_eq!(Symbolic::NAME, "symbolic");
    }
}
