use super::Parser;
use crate::ast::Stmt;
use crate::diagnostic::Diagnostic;

impl Parser {
    // ===================================================================
    // DECLARATIONS / STATEMENTS
    // ===================================================================

    pub(super) fn declaration(&mut self) -> Result<Stmt, Diagnostic> {
        if self.checks_type_keyword() {
            return self.var_declaration();
        }
        self.statement()
    }

    fn var_declaration(&mut self) -> Result<Stmt, Diagnostic> {
        let ty = self.consume_type("expected a variable type")?;
        let name = self.consume_identifier("expected a variable name")?;

        let init = if self.match_symbol("=") {
            Some(self.expression()?)
        } else {
            None
        };

        self.consume_symbol(";", "expected ';' after variable declaration")?;
        Ok(Stmt::VarDecl {
            ty: ty.node,
            name,
            init,
        })
    }

    pub(super) fn statement(&mut self) -> Result<Stmt, Diagnostic> {
        if self.check_symbol("{") {
            return Ok(Stmt::Block(self.block()?));
        }
        if self.match_keyword("if") {
            return self.if_statement();
        }
        if self.match_keyword("while") {
            return self.while_statement();
        }
        if self.match_keyword("do") {
            return self.do_while_statement();
        }
        if self.match_keyword("for") {
            return self.for_statement();
        }
        if self.match_keyword("print") {
            return self.print_statement();
        }
        if self.match_keyword("read") {
            return self.read_statement();
        }
        if self.match_keyword("return") {
            return self.return_statement();
        }
        self.expr_statement()
    }

    // ===================================================================
    // IF, WHILE, DO-WHILE, FOR
    // ===================================================================

    fn if_statement(&mut self) -> Result<Stmt, Diagnostic> {
        self.consume_symbol("(", "expected '(' after 'if'")?;
        let cond = self.expression()?;
        self.consume_symbol(")", "expected ')' after if condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_keyword("else") {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    fn while_statement(&mut self) -> Result<Stmt, Diagnostic> {
        self.consume_symbol("(", "expected '(' after 'while'")?;
        let cond = self.expression()?;
        self.consume_symbol(")", "expected ')' after while condition")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { cond, body })
    }

    fn do_while_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let body = Box::new(self.statement()?);
        self.consume_keyword("while", "expected 'while' after do-body")?;
        self.consume_symbol("(", "expected '(' after 'while'")?;
        let cond = self.expression()?;
        self.consume_symbol(")", "expected ')' after do-while condition")?;
        self.consume_symbol(";", "expected ';' after do-while")?;
        Ok(Stmt::DoWhile { body, cond })
    }

    fn for_statement(&mut self) -> Result<Stmt, Diagnostic> {
        self.consume_symbol("(", "expected '(' after 'for'")?;

        let init: Option<Box<Stmt>> = if self.check_symbol(";") {
            self.advance();
            None
        } else if self.checks_type_keyword() {
            Some(Box::new(self.declaration_without_trailing_consume()?))
        } else {
            let e = self.expression()?;
            self.consume_symbol(";", "expected ';' after for-loop initializer")?;
            Some(Box::new(Stmt::ExprStmt(e)))
        };

        let cond = if self.check_symbol(";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_symbol(";", "expected ';' after for-loop condition")?;

        let update = if self.check_symbol(")") {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_symbol(")", "expected ')' after for-loop clauses")?;

        let body = Box::new(self.statement()?);
        Ok(Stmt::For {
            init,
            cond,
            update,
            body,
        })
    }

    /// `var_declaration` already consumes the trailing `;`, which is exactly
    /// what a for-loop's init clause needs too — this just names that reuse.
    fn declaration_without_trailing_consume(&mut self) -> Result<Stmt, Diagnostic> {
        self.var_declaration()
    }

    // ===================================================================
    // PRINT / READ / RETURN / EXPR-STMT
    // ===================================================================

    fn print_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let value = self.expression()?;
        self.consume_symbol(";", "expected ';' after print statement")?;
        Ok(Stmt::Print { value })
    }

    fn read_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let name = self.consume_identifier("expected a variable name after 'read'")?;
        self.consume_symbol(";", "expected ';' after read statement")?;
        Ok(Stmt::Read { name })
    }

    fn return_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let span = self.previous().span;
        let value = if self.check_symbol(";") {
            None
        } else {
            Some(self.expression()?)
        };
        self.consume_symbol(";", "expected ';' after return statement")?;
        Ok(Stmt::Return { value, span })
    }

    fn expr_statement(&mut self) -> Result<Stmt, Diagnostic> {
        let e = self.expression()?;
        self.consume_symbol(";", "expected ';' after expression statement")?;
        Ok(Stmt::ExprStmt(e))
    }
}
