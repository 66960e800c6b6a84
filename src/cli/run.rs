use std::path::PathBuf;
use std::process;

use clap::Args;

use dragonc::diagnostic::render_diagnostics;

#[derive(Args)]
pub struct RunArgs {
    /// Source file to run
    pub input: PathBuf,
    /// Skip the optimizer and execute the IR straight off the generator
    #[arg(long)]
    pub no_optimize: bool,
    /// Print the IR's textual form before executing
    #[arg(long)]
    pub emit_ir: bool,
}

pub fn cmd_run(args: RunArgs) {
    let source = super::read_source_or_exit(&args.input);
    let filename = args.input.display().to_string();
    let compiled = super::compile_or_exit(&source, &filename, !args.no_optimize);

    if args.emit_ir {
        print!("{}", compiled.ir.dump());
    }

    match dragonc::interp::run(&compiled.ast, &compiled.ir) {
        Ok(Some(value)) => println!("{}", value),
        Ok(None) => {}
        Err(diagnostic) => {
            render_diagnostics(&[diagnostic], &filename, &source);
            process::exit(1);
        }
    }
}
