use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use mima_assembler::{Assembler, AssemblerOptions};
use mima_runtime::symbolic::{to_smtlib, MEMORY_ARRAY};
use mima_runtime::{
    verify_program, Concrete, EnumerationSolver, Expectation, Interpreter, Solver, Symbolic,
    SymbolicMemory, Term, Verdict,
};
use mima_spec::{wrap_word, MachineConfig, Program};

/// Assembler, bounded interpreter and postcondition checker for the MiMa machine
#[derive(Parser)]
#[command(name = "mima", version)]
struct Cli {
    #[command(flatten)]
    machine: MachineArgs,

    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct MachineArgs {
    /// Maximum number of instructions in a program
    #[arg(long, global = true, default_value_t = mima_spec::PROGRAM_SIZE)]
    program_size: usize,

    /// Number of leading memory cells reported by symbolic runs
    #[arg(long, global = true, default_value_t = mima_spec::MEM_SIZE)]
    mem_size: usize,

    /// Step budget per run
    #[arg(long, global = true, default_value_t = mima_spec::MAX_STEPS)]
    max_steps: usize,

    /// Emit a NOP for every label definition
    #[arg(long, global = true)]
    label_placeholders: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble a source file into a program image
    Assemble {
        /// Assembly source
        source: PathBuf,
        /// Destination of the image (defaults to the source with a `.mimg` extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a source file or program image
    Run {
        /// Assembly source or program image
        file: PathBuf,
        /// Run over symbolic values, forking at undecided branches
        #[arg(long)]
        symbolic: bool,
        /// Print path conditions as SMT-LIB (with --symbolic)
        #[arg(long, requires = "symbolic")]
        smt: bool,
        /// Start from unconstrained memory instead of zeros (with --symbolic)
        #[arg(long, requires = "symbolic")]
        free_memory: bool,
    },
    /// Check a postcondition on every path of a program
    Verify {
        /// Assembly source or program image
        file: PathBuf,
        /// Expected final accumulator
        #[arg(long, value_parser = parse_word)]
        acc: Option<u8>,
        /// Expected final memory cell, as ADDR=VALUE
        #[arg(long = "mem", value_parser = parse_cell)]
        cells: Vec<(u8, u8)>,
        /// Solver back-end
        #[arg(long, default_value = "enumeration")]
        solver: String,
        /// Start from unconstrained memory instead of zeros
        #[arg(long)]
        free_memory: bool,
    },
}

fn parse_word(text: &str) -> std::result::Result<u8, String> {
    let value: i64 = text
        .trim()
        .parse()
        .map_err(|e| format!("invalid number {:?}: {}", text, e))?;
    if !(-128..=255).contains(&value) {
        return Err(format!("{} does not fit in 8 bits", value));
    }
    Ok(wrap_word(value))
}

fn parse_cell(text: &str) -> std::result::Result<(u8, u8), String> {
    let (address, value) = text
        .split_once('=')
        .ok_or_else(|| format!("expected ADDR=VALUE, found {:?}", text))?;
    Ok((parse_word(address)?, parse_word(value)?))
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(path: &Path, config: &MachineConfig, options: AssemblerOptions) -> Result<Program> {
    let bytes = fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
    if Program::is_image(&bytes) {
        let program = Program::from_bytes(&bytes)
            .with_context(|| format!("invalid program image {}", path.display()))?;
        return Ok(program);
    }

    let source = String::from_utf8(bytes)
        .with_context(|| format!("{} is neither an image nor UTF-8 source", path.display()))?;
    Assembler::new(*config)
        .with_options(options)
        .assemble(&source)
        .with_context(|| format!("cannot assemble {}", path.display()))
}

fn solver(name: &str) -> Result<Box<dyn Solver>> {
    match name {
        "enumeration" => Ok(Box::new(EnumerationSolver::new())),
        #[cfg(feature = "z3")]
        "z3" => Ok(Box::new(mima_runtime::Z3Solver::new())),
        other => bail!("unknown solver {:?}", other),
    }
}

fn run_concrete(program: Program, config: MachineConfig) -> Result<()> {
    let outcome = Interpreter::<Concrete>::new(program, config)?.run()?;
    println!("halt: {}", outcome.halt_reason);
    println!("steps: {}", outcome.steps);
    println!("acc: {} ({:#04x})", outcome.accumulator, outcome.accumulator);
    for (address, value) in outcome.memory.non_zero() {
        println!("mem[{}] = {}", address, value);
    }
    Ok(())
}

fn symbolic_interpreter(
    program: Program,
    config: MachineConfig,
    free_memory: bool,
) -> Result<Interpreter<Symbolic>> {
    let interpreter = Interpreter::<Symbolic>::new(program, config)?;
    if free_memory {
        return Ok(interpreter
            .with_initial_state(Term::constant(0), SymbolicMemory::fresh(MEMORY_ARRAY)));
    }
    Ok(interpreter)
}

fn run_symbolic(
    program: Program,
    config: MachineConfig,
    smt: bool,
    free_memory: bool,
) -> Result<()> {
    let interpreter = symbolic_interpreter(program, config, free_memory)?;
    let paths = interpreter.explore();

    for (index, path) in paths.iter().enumerate() {
        println!("path {}:", index);
        if smt {
            print!("{}", to_smtlib(&path.conditions));
        } else {
            for condition in &path.conditions {
                println!("  assume {}", condition);
            }
        }

        match &path.result {
            Ok(outcome) => {
                println!("  halt: {}", outcome.halt_reason);
                println!("  acc: {}", outcome.accumulator);
                for address in 0..config.mem_size.min(mima_spec::ADDRESS_SPACE) {
                    let cell = outcome.memory.get(address as u8);
                    if cell.as_const() != Some(0) {
                        println!("  mem[{}] = {}", address, cell);
                    }
                }
            }
            Err(err) => println!("  error: {}", err),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = MachineConfig::new(
        cli.machine.program_size,
        cli.machine.mem_size,
        cli.machine.max_steps,
    )?;
    tracing::debug!(%config, "machine configuration");
    let options = AssemblerOptions {
        label_placeholders: cli.machine.label_placeholders,
    };

    match cli.command {
        Command::Assemble { source, output } => {
            let program = load(&source, &config, options)?;
            let output = output.unwrap_or_else(|| source.with_extension("mimg"));
            fs::write(&output, program.to_bytes()?)
                .with_context(|| format!("cannot write {}", output.display()))?;
            println!("{} instructions -> {}", program.len(), output.display());
            Ok(())
        }
        Command::Run {
            file,
            symbolic,
            smt,
            free_memory,
        } => {
            let program = load(&file, &config, options)?;
            if symbolic {
                run_symbolic(program, config, smt, free_memory)
            } else {
                run_concrete(program, config)
            }
        }
        Command::Verify {
            file,
            acc,
            cells,
            solver: solver_name,
            free_memory,
        } => {
            let program = load(&file, &config, options)?;
            let mut expectations: Vec<Expectation> =
                acc.map(Expectation::Accumulator).into_iter().collect();
            expectations.extend(
                cells
                    .into_iter()
                    .map(|(address, value)| Expectation::Memory { address, value }),
            );
            if expectations.is_empty() {
                bail!("nothing to verify: pass --acc and/or --mem");
            }

            let solver = solver(&solver_name)?;
            let interpreter = symbolic_interpreter(program, config, free_memory)?;
            let verdict = verify_program(solver.as_ref(), &interpreter, &expectations)?;
            println!("{}", verdict);
            match verdict {
                Verdict::Holds => Ok(()),
                Verdict::Violated(_) => bail!("postcondition violated"),
                Verdict::Unknown(reason) => bail!("postcondition undecided: {}", reason),
            }
        }
    }
}
