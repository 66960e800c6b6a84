use std::path::PathBuf;
use std::process;

use clap::Args;

#[derive(Args)]
pub struct BuildArgs {
    /// Source file to build
    pub input: PathBuf,
    /// Write the IR to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn cmd_build(args: BuildArgs) {
    let source = super::read_source_or_exit(&args.input);
    let filename = args.input.display().to_string();
    let compiled = super::compile_or_exit(&source, &filename, true);
    let dump = compiled.ir.dump();

    match args.output {
        Some(path) => {
            if let Err(e) = std::fs::write(&path, &dump) {
                eprintln!("error: cannot write '{}': {}", path.display(), e);
                process::exit(1);
            }
            eprintln!("Wrote IR -> {}", path.display());
        }
        None => print!("{}", dump),
    }
}
