use super::Parser;
use crate::ast::{BinOp, Expr, Literal, UnaryOp};
use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;

impl Parser {
    // ===================================================================
    // EXPRESSIONS (precedence hierarchy)
    // ===================================================================

    pub(super) fn expression(&mut self) -> Result<Expr, Diagnostic> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, Diagnostic> {
        let expr = self.or_expr()?;
        if self.match_symbol("=") {
            let value = self.assignment()?;
            if let Expr::VarRef { name, span } = expr {
                let full_span = span.merge(value.span());
                return Ok(Expr::Assignment {
                    name,
                    value: Box::new(value),
                    span: full_span,
                });
            }
            return Err(self.error("the left side of '=' must be a variable".to_string()));
        }
        Ok(expr)
    }

    fn or_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.and_expr()?;
        while self.match_symbol("||") {
            let right = self.and_expr()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary {
                op: BinOp::Or,
                left: Box::new(expr),
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    fn and_expr(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.equality()?;
        while self.match_symbol("&&") {
            let right = self.equality()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary {
                op: BinOp::And,
                left: Box::new(expr),
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    fn equality(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.comparison()?;
        while let Some(sym) = self.match_any_symbol(&["==", "!="]) {
            let op = if sym == "==" { BinOp::Eq } else { BinOp::Ne };
            let right = self.comparison()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.term()?;
        while let Some(sym) = self.match_any_symbol(&["<", "<=", ">", ">="]) {
            let op = match sym {
                "<" => BinOp::Lt,
                "<=" => BinOp::Le,
                ">" => BinOp::Gt,
                _ => BinOp::Ge,
            };
            let right = self.term()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    fn term(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.factor()?;
        while let Some(sym) = self.match_any_symbol(&["+", "-"]) {
            let op = if sym == "+" { BinOp::Add } else { BinOp::Sub };
            let right = self.factor()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    fn factor(&mut self) -> Result<Expr, Diagnostic> {
        let mut expr = self.unary()?;
        while let Some(sym) = self.match_any_symbol(&["*", "/", "%"]) {
            let op = match sym {
                "*" => BinOp::Mul,
                "/" => BinOp::Div,
                _ => BinOp::Mod,
            };
            let right = self.unary()?;
            let span = expr.span().merge(right.span());
            expr = Expr::Binary {
                op,
                left: Box::new(expr),
                right: Box::new(right),
                span,
            };
        }
        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, Diagnostic> {
        if let Some(sym) = self.match_any_symbol(&["!", "-"]) {
            let op_span = self.previous().span;
            let op = if sym == "!" { UnaryOp::Not } else { UnaryOp::Neg };
            let operand = self.unary()?;
            let span = op_span.merge(operand.span());
            return Ok(Expr::Unary {
                op,
                operand: Box::new(operand),
                span,
            });
        }
        self.primary()
    }

    // ===================================================================
    // PRIMARY (literals, identifiers, grouping, calls)
    // ===================================================================

    fn primary(&mut self) -> Result<Expr, Diagnostic> {
        if self.is_at_end() {
            return Err(self.error("expected an expression".to_string()));
        }

        let tok = self.peek().clone();
        match &tok.node {
            Lexeme::Int(text) => {
                self.advance();
                let value = text.parse::<i64>().map_err(|_| {
                    Diagnostic::error(
                        crate::diagnostic::ErrorKind::Parse,
                        format!("invalid integer literal '{}'", text),
                        tok.span,
                    )
                })?;
                Ok(Expr::Literal {
                    value: Literal::Int(value),
                    span: tok.span,
                })
            }
            Lexeme::Float(text) => {
                self.advance();
                let value = text.parse::<f64>().map_err(|_| {
                    Diagnostic::error(
                        crate::diagnostic::ErrorKind::Parse,
                        format!("invalid float literal '{}'", text),
                        tok.span,
                    )
                })?;
                Ok(Expr::Literal {
                    value: Literal::Float(value),
                    span: tok.span,
                })
            }
            Lexeme::Str(content) => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::String(content.clone()),
                    span: tok.span,
                })
            }
            Lexeme::Keyword("true") => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Bool(true),
                    span: tok.span,
                })
            }
            Lexeme::Keyword("false") => {
                self.advance();
                Ok(Expr::Literal {
                    value: Literal::Bool(false),
                    span: tok.span,
                })
            }
            Lexeme::Symbol("(") => {
                self.advance();
                let inner = self.expression()?;
                let close = self.consume_symbol(")", "expected ')' after expression")?;
                let span = tok.span.merge(close.span);
                Ok(Expr::Grouping {
                    inner: Box::new(inner),
                    span,
                })
            }
            Lexeme::Ident(name) => {
                self.advance();
                let name = name.clone();
                if self.match_symbol("(") {
                    let mut args = Vec::new();
                    if !self.check_symbol(")") {
                        args.push(self.expression()?);
                        while self.match_symbol(",") {
                            args.push(self.expression()?);
                        }
                    }
                    let close = self.consume_symbol(")", "expected ')' after call arguments")?;
                    let span = tok.span.merge(close.span);
                    return Ok(Expr::Call {
                        callee: name,
                        args,
                        span,
                    });
                }
                Ok(Expr::VarRef {
                    name,
                    span: tok.span,
                })
            }
            _ => Err(self.error(format!("invalid expression: '{}'", tok.node.text()))),
        }
    }
}
