use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{LevelFilter, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

use impc::{Machine, MachineConfig};
use pseudo::RETURN_REGISTER;

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input source files, each lowered on its own
    #[arg(required = true, help = "The .imp files to compile")]
    files: Vec<PathBuf>,

    /// Print the parsed statement tree before lowering
    #[arg(long, help = "Dump the statement tree")]
    dump_ast: bool,

    /// Skip the instruction listing
    #[arg(long, help = "Do not print the lowered program")]
    no_dump: bool,

    /// Execute the lowered program and print register 0
    #[arg(long, help = "Run the program on the reference machine")]
    run: bool,

    /// Execute one instruction at a time, printing each with its effect
    #[arg(long, help = "Single-step the program, printing every instruction")]
    step: bool,

    #[arg(long, default_value_t = 1_000_000, help = "Step limit for --run and --step")]
    max_steps: usize,

    /// -v for debug, -vv for trace. RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    for path in &cli.files {
        compile_file(&cli, path)?;
    }
    Ok(())
}

fn compile_file(cli: &Cli, path: &Path) -> Result<()> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let stmts = parser::parse(&source)
        .with_context(|| format!("parsing {}", path.display()))?;
    info!("{}: {} top-level statements", path.display(), stmts.len());

    if cli.dump_ast {
        println!("== {} (ast) ==", path.display());
        print!("{}", parser::ast::dump(&stmts));
    }

    let program = impc::lower(&stmts)
        .with_context(|| format!("compiling {}", path.display()))?;

    if !cli.no_dump {
        println!("== {} ==", path.display());
        if !program.is_empty() {
            println!("{}", program.dump());
        }
    }

    if cli.run || cli.step {
        let config = MachineConfig {
            step_limit: cli.max_steps,
            ..MachineConfig::default()
        };
        let mut machine = Machine::new(&program, config);
        let result = if cli.step {
            println!("== {} (steps) ==", path.display());
            while let Some(line) = machine
                .step_report()
                .with_context(|| format!("stepping {}", path.display()))?
            {
                println!("{line}");
            }
            println!("registers {:?}", machine.registers());
            machine.register(RETURN_REGISTER)
        } else {
            machine
                .run()
                .with_context(|| format!("running {}", path.display()))?
        };
        info!("{} halted after {} steps", path.display(), machine.steps());
        println!("r0 = {result}");
    }
    Ok(())
}
