use std::path::PathBuf;
use std::process;

use clap::Args;

use dragonc::diagnostic::render_diagnostics;

#[derive(Args)]
pub struct CheckArgs {
    /// Source file to check
    pub input: PathBuf,
}

pub fn cmd_check(args: CheckArgs) {
    let source = super::read_source_or_exit(&args.input);
    let filename = args.input.display().to_string();

    match dragonc::parse_and_check(&source) {
        Ok(_) => eprintln!("OK: {}", args.input.display()),
        Err(diagnostic) => {
            render_diagnostics(&[diagnostic], &filename, &source);
            process::exit(1);
        }
    }
}
