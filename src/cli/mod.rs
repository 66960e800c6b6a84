pub mod build;
pub mod check;
pub mod run;

use std::path::Path;
use std::process;

use dragonc::diagnostic::render_diagnostics;
use dragonc::CompiledProgram;

/// Reads a source file, exiting with a message on any I/O error.
pub(crate) fn read_source_or_exit(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Runs the full pipeline, rendering a diagnostic and exiting on failure.
pub(crate) fn compile_or_exit(source: &str, filename: &str, optimize: bool) -> CompiledProgram {
    match dragonc::compile(source, optimize) {
        Ok(compiled) => compiled,
        Err(diagnostic) => {
            render_diagnostics(&[diagnostic], filename, source);
            process::exit(1);
        }
    }
}
