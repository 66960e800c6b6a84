mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use cli::build::BuildArgs;
use cli::check::CheckArgs;
use cli::run::RunArgs;

#[derive(Parser)]
#[command(
    name = "dragonc",
    version,
    about = "Dragon-Lang compiler and interpreter"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Source file, when no subcommand is given (shorthand for `run`)
    input: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Lower, optimize, and execute a program
    Run(RunArgs),
    /// Parse and type-check a program without executing it
    Check(CheckArgs),
    /// Emit a program's optimized IR without executing it
    Build(BuildArgs),
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Some(Command::Run(args)) => cli::run::cmd_run(args),
        Some(Command::Check(args)) => cli::check::cmd_check(args),
        Some(Command::Build(args)) => cli::build::cmd_build(args),
        None => match cli.input {
            Some(input) => cli::run::cmd_run(RunArgs {
                input,
                no_optimize: false,
                emit_ir: true,
            }),
            None => {
                eprintln!("usage: dragonc <path> | dragonc <run|check|build> <path>");
                std::process::exit(1);
            }
        },
    }
}
