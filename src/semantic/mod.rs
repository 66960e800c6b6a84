//! Two-pass semantic analyzer: registers every function signature first,
//! then type-checks each body in its own fresh scope. Errors are fatal —
//! the first one found aborts the analysis, matching the parser's own
//! fail-fast `Result`-based error flow.

mod expr;
mod stmt;
pub mod symbol_table;
pub mod types;

use crate::ast;
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::span::Span;
use symbol_table::SymbolTable;
pub use types::Ty;

pub(crate) struct SemanticAnalyzer {
    table: SymbolTable,
    current_function: String,
}

impl SemanticAnalyzer {
    pub(crate) fn new() -> Self {
        Self {
            table: SymbolTable::new(),
            current_function: String::new(),
        }
    }

    pub(crate) fn analyze(mut self, program: &ast::Program) -> Result<(), Diagnostic> {
        // Pass one: every function name enters the global scope with an
        // unknown return type, so forward calls and recursion resolve.
        for func in &program.functions {
            let params: Vec<_> = func.params.iter().map(|p| p.ty).collect();
            if self
                .table
                .define_func(func.name.node.clone(), params)
                .is_err()
            {
                return Err(self.error(
                    format!("function '{}' is already declared", func.name.node),
                    func.name.span,
                ));
            }
        }

        // Pass two: each function body is analyzed in isolation.
        for func in &program.functions {
            self.analyze_function(func)?;
        }
        Ok(())
    }

    fn analyze_function(&mut self, func: &ast::FunctionDecl) -> Result<(), Diagnostic> {
        self.current_function = func.name.node.clone();
        self.table.push();
        let result = self.bind_params_and_check(func);
        self.table.pop();
        result
    }

    fn bind_params_and_check(&mut self, func: &ast::FunctionDecl) -> Result<(), Diagnostic> {
        for p in &func.params {
            if self.table.define_var(p.name.clone(), p.ty).is_err() {
                return Err(self.error(
                    format!("duplicate parameter '{}'", p.name),
                    func.name.span,
                ));
            }
        }
        self.check_block(&func.body)
    }

    fn error(&self, message: String, span: Span) -> Diagnostic {
        Diagnostic::error(ErrorKind::Semantic, message, span)
    }
}

/// Entry point: type-check a whole program, aborting on the first error.
pub fn analyze(program: &ast::Program) -> Result<(), Diagnostic> {
    SemanticAnalyzer::new().analyze(program)
}
