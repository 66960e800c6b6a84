//! Recursive-descent parser: tokens → `ast::Program`.
//!
//! Grammar productions are split across this file (navigation, program,
//! function, block, param) and the sibling `stmt`/`expr` modules, all as
//! `impl Parser` blocks over the one struct defined here.

mod expr;
mod stmt;

use crate::ast::{self, Param, TypeTag};
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::lexeme::Lexeme;
use crate::span::Spanned;

pub(crate) struct Parser {
    tokens: Vec<Spanned<Lexeme>>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(tokens: Vec<Spanned<Lexeme>>) -> Self {
        Self { tokens, pos: 0 }
    }

    // ===================================================================
    // Navigation helpers
    // ===================================================================

    fn is_at_end(&self) -> bool {
        matches!(self.peek().node, Lexeme::Eof)
    }

    fn peek(&self) -> &Spanned<Lexeme> {
        &self.tokens[self.pos]
    }

    fn previous(&self) -> &Spanned<Lexeme> {
        &self.tokens[self.pos - 1]
    }

    fn advance(&mut self) -> Spanned<Lexeme> {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous().clone()
    }

    fn check_symbol(&self, sym: &str) -> bool {
        matches!(&self.peek().node, Lexeme::Symbol(s) if *s == sym)
    }

    fn check_keyword(&self, kw: &str) -> bool {
        matches!(&self.peek().node, Lexeme::Keyword(k) if *k == kw)
    }

    fn match_symbol(&mut self, sym: &str) -> bool {
        if self.check_symbol(sym) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_any_symbol(&mut self, syms: &[&str]) -> Option<&'static str> {
        if let Lexeme::Symbol(s) = self.peek().node {
            if syms.contains(&s) {
                self.advance();
                return Some(s);
            }
        }
        None
    }

    fn match_keyword(&mut self, kw: &str) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume_symbol(&mut self, sym: &str, msg: &str) -> Result<Spanned<Lexeme>, Diagnostic> {
        if self.check_symbol(sym) {
            Ok(self.advance())
        } else {
            Err(self.error(msg.to_string()))
        }
    }

    fn consume_keyword(&mut self, kw: &str, msg: &str) -> Result<Spanned<Lexeme>, Diagnostic> {
        if self.check_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(self.error(msg.to_string()))
        }
    }

    fn consume_identifier(&mut self, msg: &str) -> Result<Spanned<String>, Diagnostic> {
        if let Lexeme::Ident(name) = self.peek().node.clone() {
            let span = self.peek().span;
            self.advance();
            Ok(Spanned::new(name, span))
        } else {
            Err(self.error(msg.to_string()))
        }
    }

    fn consume_type(&mut self, msg: &str) -> Result<Spanned<TypeTag>, Diagnostic> {
        if let Lexeme::Keyword(kw) = self.peek().node {
            if let Some(ty) = TypeTag::from_keyword(kw) {
                let span = self.peek().span;
                self.advance();
                return Ok(Spanned::new(ty, span));
            }
        }
        Err(self.error(msg.to_string()))
    }

    fn checks_type_keyword(&self) -> bool {
        matches!(&self.peek().node, Lexeme::Keyword(k) if TypeTag::from_keyword(k).is_some())
    }

    fn error(&self, message: String) -> Diagnostic {
        let tok = self.peek();
        Diagnostic::error(
            ErrorKind::Parse,
            format!("{}, found {}", message, tok.node.description()),
            tok.span,
        )
    }

    // ===================================================================
    // PROGRAM
    // ===================================================================

    pub(crate) fn parse_program(mut self) -> Result<ast::Program, Diagnostic> {
        let mut functions = Vec::new();
        while !self.is_at_end() {
            functions.push(self.function_decl()?);
        }
        Ok(ast::Program { functions })
    }

    // ===================================================================
    // FUNCTIONS
    // ===================================================================

    fn function_decl(&mut self) -> Result<ast::FunctionDecl, Diagnostic> {
        self.consume_keyword("func", "expected 'func' to begin a function declaration")?;
        let name = self.consume_identifier("expected a function name")?;
        self.consume_symbol("(", "expected '(' after function name")?;

        let mut params = Vec::new();
        if !self.check_symbol(")") {
            params.push(self.param()?);
            while self.match_symbol(",") {
                params.push(self.param()?);
            }
        }
        self.consume_symbol(")", "expected ')' after parameter list")?;

        let body = self.block()?;
        Ok(ast::FunctionDecl { name, params, body })
    }

    fn param(&mut self) -> Result<Param, Diagnostic> {
        let ty = self.consume_type("expected a parameter type")?;
        let name = self.consume_identifier("expected a parameter name")?;
        Ok(Param {
            ty: ty.node,
            name: name.node,
        })
    }

    // ===================================================================
    // BLOCK
    // ===================================================================

    pub(super) fn block(&mut self) -> Result<ast::Block, Diagnostic> {
        self.consume_symbol("{", "expected '{' to open a block")?;
        let mut statements = Vec::new();
        while !self.check_symbol("}") && !self.is_at_end() {
            statements.push(self.declaration()?);
        }
        self.consume_symbol("}", "expected '}' to close a block")?;
        Ok(ast::Block { statements })
    }
}
