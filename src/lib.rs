pub mod ast;
pub mod diagnostic;
pub mod interp;
pub mod ir;
pub mod lexeme;
pub mod semantic;
pub mod span;
pub mod syntax;

use diagnostic::Diagnostic;
use ir::IRProgram;
use syntax::{lexer::Lexer, parser::Parser};

/// A fully compiled program: the AST (kept for the interpreter's parameter
/// bindings) paired with its lowered, optionally-optimized IR.
pub struct CompiledProgram {
    pub ast: ast::Program,
    pub ir: IRProgram,
}

/// Runs the lexer, parser, and semantic analyzer, aborting on the first
/// diagnostic any of them produces.
pub fn parse_and_check(source: &str) -> Result<ast::Program, Diagnostic> {
    let (tokens, lex_diagnostics) = Lexer::new(source, 0).tokenize();
    if let Some(d) = lex_diagnostics.into_iter().next() {
        return Err(d);
    }
    let program = Parser::new(tokens).parse_program()?;
    semantic::analyze(&program)?;
    Ok(program)
}

/// Runs the full pipeline: lex, parse, type-check, lower to IR, and
/// (unless `optimize` is false) run the three-pass optimizer once.
pub fn compile(source: &str, optimize: bool) -> Result<CompiledProgram, Diagnostic> {
    let program = parse_and_check(source)?;
    let lowered = ir::generate(&program);
    let instructions = if optimize {
        ir::optimize(lowered.instructions)
    } else {
        lowered.instructions
    };
    Ok(CompiledProgram {
        ast: program,
        ir: IRProgram::new(instructions),
    })
}
