//! Symbolic execution and postcondition checks

use mima_assembler::assemble;
use mima_runtime::symbolic::{to_smtlib, MEMORY_ARRAY};
use mima_runtime::{
    check_postcondition, interpret, interpret_symbolic, verify_program, EnumerationSolver, Expectation,
    HaltReason, Interpreter, Memory, RuntimeError, SatResult, Solver, Symbolic, SymbolicMemory,
    Term, Verdict,
};
use mima_spec::MachineConfig;

/// Interpreter whose initial memory is a free input
fn symbolic(source: &str) -> Interpreter<Symbolic> {
    Interpreter::new(assemble(source).unwrap(), MachineConfig::DEFAULT)
        .unwrap()
        .with_initial_state(Term::constant(0), SymbolicMemory::fresh(MEMORY_ARRAY))
}

#[test]
fn test_concrete_program_stays_concrete() {
    let program = assemble("LDC 1\nSTV 0\nLDC 2\nHALT").unwrap();
    let (acc, memory) = interpret_symbolic(&program, &MachineConfig::DEFAULT).unwrap();
    assert_eq!(acc.as_const(), Some(2));
    assert_eq!(memory.get(0).as_const(), Some(1));
    assert_eq!(memory.get(1).as_const(), Some(0));
}

#[test]
fn test_scenario_a_postcondition_is_unsat_to_violate() {
    let program = assemble("LDC 1\nSTV 0\nLDC 2\nHALT").unwrap();
    let (acc, memory) = interpret_symbolic(&program, &MachineConfig::DEFAULT).unwrap();

    let verdict = check_postcondition(
        &EnumerationSolver::new(),
        &acc,
        &memory,
        &[
            Expectation::Memory { address: 0, value: 1 },
            Expectation::Accumulator(2),
        ],
    )
    .unwrap();
    assert_eq!(verdict, Verdict::Holds);

    let wrong = check_postcondition(
        &EnumerationSolver::new(),
        &acc,
        &memory,
        &[Expectation::Accumulator(3)],
    )
    .unwrap();
    assert!(matches!(wrong, Verdict::Violated(_)));
}

#[test]
fn test_default_memory_matches_concrete_everywhere() {
    let program = assemble("LDV 20\nJMN end\nLDC 1\nend: HALT").unwrap();
    let (acc, memory) = interpret(&program, &MachineConfig::DEFAULT).unwrap();
    let (sym_acc, sym_memory) = interpret_symbolic(&program, &MachineConfig::DEFAULT).unwrap();
    assert_eq!(acc, 1);
    assert_eq!(sym_acc.as_const(), Some(acc));
    assert_eq!(sym_memory.get(20).as_const(), Some(memory.get(20)));

    let program = assemble("LDV 20\nHALT").unwrap();
    let (acc, memory) = interpret_symbolic(&program, &MachineConfig::DEFAULT).unwrap();
    let verdict = check_postcondition(
        &EnumerationSolver::new(),
        &acc,
        &memory,
        &[Expectation::Accumulator(0)],
    )
    .unwrap();
    assert_eq!(verdict, Verdict::Holds);
}

#[test]
fn test_free_memory_reads_stay_open() {
    let outcome = symbolic("LDV 100\nADD 100\nHALT").run().unwrap();
    assert!(outcome.accumulator.as_const().is_none());
    assert_eq!(
        outcome.accumulator.to_string(),
        "(bvadd (select memory #x64) (select memory #x64))"
    );
}

#[test]
fn test_branch_on_free_cell() {
    let interp = symbolic("LDV 100\nJMN neg\nLDC 1\nHALT\nneg: LDC 2\nHALT");
    assert!(matches!(
        interp.run(),
        Err(RuntimeError::SymbolicBranch { pc: 1 })
    ));

    let paths = interp.explore();
    assert_eq!(paths.len(), 2);
    for path in &paths {
        let outcome = path.result.as_ref().unwrap();
        assert_eq!(outcome.halt_reason, HaltReason::Halt);
        assert_eq!(path.conditions.len(), 1);

        // Each path's condition is satisfiable on its own
        let sat = EnumerationSolver::new().check(&path.conditions).unwrap();
        assert!(sat.is_sat());
    }
}

#[test]
fn test_verify_program_holds_on_all_paths() {
    // Both branches end with acc = 7
    let interp = symbolic("LDV 100\nJMN neg\nLDC 7\nHALT\nneg: LDC 7\nHALT");
    let verdict = verify_program(
        &EnumerationSolver::new(),
        &interp,
        &[Expectation::Accumulator(7)],
    )
    .unwrap();
    assert_eq!(verdict, Verdict::Holds);
}

#[test]
fn test_verify_program_finds_counterexample() {
    // Store the free cell's complement; claim it is never 0
    let interp = symbolic("LDV 100\nNOT\nSTV 3\nHALT");
    let verdict = verify_program(
        &EnumerationSolver::new(),
        &interp,
        &[Expectation::Memory { address: 3, value: 0 }],
    )
    .unwrap();
    match verdict {
        Verdict::Violated(model) => assert_ne!(model.cell("memory", 100), 0xFF),
        other => panic!("expected a counterexample, got {}", other),
    }
}

#[test]
fn test_symbolic_initial_state() {
    let program = assemble("ADD 0\nSTV 1\nHALT").unwrap();
    let interp = Interpreter::<Symbolic>::new(program, MachineConfig::DEFAULT)
        .unwrap()
        .with_initial_state(Term::var("a"), SymbolicMemory::fresh("m"));
    let outcome = interp.run().unwrap();

    let stored = outcome.memory.read(&Term::constant(1));
    assert_eq!(stored, outcome.accumulator);
    assert_eq!(stored.to_string(), "(bvadd a (select m #x00))");
}

#[test]
fn test_smtlib_script_for_path_conditions() {
    let interp = symbolic("LDV 100\nJMN end\nend: HALT");
    let paths = interp.explore();
    let script = to_smtlib(&paths[0].conditions);
    assert!(script.contains("(declare-const memory (Array (_ BitVec 8) (_ BitVec 8)))"));
    assert!(script.contains("bvslt"));
    assert!(script.ends_with("(check-sat)\n"));
}

#[test]
fn test_enumeration_gives_up_on_symbolic_addresses() {
    // LDIV through a free pointer reads memory at a symbolic address
    let interp = symbolic("LDIV 100\nHALT");
    let outcome = interp.run().unwrap();
    let result = EnumerationSolver::new()
        .check(&[mima_runtime::Formula::eq(&outcome.accumulator, &Term::constant(1))])
        .unwrap();
    assert!(matches!(result, SatResult::Unknown(_)));
}
