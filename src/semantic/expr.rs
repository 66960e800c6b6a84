use super::symbol_table::Symbol;
use super::types::{compatible, Ty};
use super::SemanticAnalyzer;
use crate::ast::{BinOp, Expr, Literal, TypeTag, UnaryOp};
use crate::diagnostic::Diagnostic;

impl SemanticAnalyzer {
    pub(super) fn check_expr(&mut self, expr: &Expr) -> Result<Ty, Diagnostic> {
        match expr {
            Expr::Literal { value, .. } => Ok(match value {
                // Booleans are checked before numerics so a boolean literal
                // is never mistaken for an integer.
                Literal::Bool(_) => Ty::bool(),
                Literal::Int(_) => Ty::int(),
                Literal::Float(_) => Ty::float(),
                Literal::String(_) => Ty::string(),
            }),

            Expr::VarRef { name, span } => match self.table.resolve(name) {
                Some(Symbol::Variable(v)) => Ok(Ty::Scalar(v.ty)),
                Some(Symbol::Function(_)) => {
                    Err(self.error(format!("'{}' is a function, not a variable", name), *span))
                }
                None => Err(self.error(format!("undeclared variable '{}'", name), *span)),
            },

            Expr::Grouping { inner, .. } => self.check_expr(inner),

            Expr::Unary { op, operand, span } => {
                let ty = self.check_expr(operand)?;
                match op {
                    UnaryOp::Neg => {
                        if ty.is_numeric() {
                            Ok(ty)
                        } else {
                            Err(self.error(
                                format!("unary '-' requires a numeric operand, found {}", ty),
                                *span,
                            ))
                        }
                    }
                    UnaryOp::Not => {
                        if ty == Ty::bool() {
                            Ok(Ty::bool())
                        } else {
                            Err(self.error(
                                format!("unary '!' requires a bool operand, found {}", ty),
                                *span,
                            ))
                        }
                    }
                }
            }

            Expr::Binary {
                op, left, right, span,
            } => {
                let lty = self.check_expr(left)?;
                let rty = self.check_expr(right)?;
                self.check_binop(*op, lty, rty, *span)
            }

            Expr::Assignment { name, value, span } => {
                let value_ty = self.check_expr(value)?;
                let var_ty = match self.table.resolve(name) {
                    Some(Symbol::Variable(v)) => Ty::Scalar(v.ty),
                    Some(Symbol::Function(_)) => {
                        return Err(
                            self.error(format!("'{}' is a function, not a variable", name), *span)
                        )
                    }
                    None => return Err(self.error(format!("undeclared variable '{}'", name), *span)),
                };
                if !compatible(var_ty, value_ty) {
                    return Err(self.error(
                        format!("cannot assign {} to variable of type {}", value_ty, var_ty),
                        *span,
                    ));
                }
                Ok(var_ty)
            }

            Expr::Call { callee, args, span } => self.check_call(callee, args, *span),
        }
    }

    fn check_binop(&mut self, op: BinOp, lty: Ty, rty: Ty, span: crate::span::Span) -> Result<Ty, Diagnostic> {
        match op {
            BinOp::Add => {
                // String `+` bypasses the usual "string only with string"
                // rule: either side being a string makes the result a
                // string, regardless of the other operand's type.
                if lty == Ty::string() || rty == Ty::string() {
                    return Ok(Ty::string());
                }
                if lty.is_numeric() && rty.is_numeric() {
                    return Ok(wider_numeric(lty, rty));
                }
                Err(self.error(
                    format!("'+' requires numeric or string operands, found {} and {}", lty, rty),
                    span,
                ))
            }
            BinOp::Sub | BinOp::Mul | BinOp::Div => {
                if lty.is_numeric() && rty.is_numeric() {
                    Ok(wider_numeric(lty, rty))
                } else {
                    Err(self.error(
                        format!("'{}' requires numeric operands, found {} and {}", op.as_str(), lty, rty),
                        span,
                    ))
                }
            }
            BinOp::Mod => {
                if lty == Ty::int() && rty == Ty::int() {
                    Ok(Ty::int())
                } else {
                    Err(self.error(
                        format!("'%' requires int operands, found {} and {}", lty, rty),
                        span,
                    ))
                }
            }
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
                if compatible(lty, rty) || compatible(rty, lty) {
                    Ok(Ty::bool())
                } else {
                    Err(self.error(
                        format!("cannot compare {} with {}", lty, rty),
                        span,
                    ))
                }
            }
            BinOp::And | BinOp::Or => {
                if lty == Ty::bool() && rty == Ty::bool() {
                    Ok(Ty::bool())
                } else {
                    Err(self.error(
                        format!("'{}' requires bool operands, found {} and {}", op.as_str(), lty, rty),
                        span,
                    ))
                }
            }
        }
    }

    fn check_call(&mut self, callee: &str, args: &[Expr], span: crate::span::Span) -> Result<Ty, Diagnostic> {
        let (params, return_ty) = match self.table.resolve_global(callee) {
            Some(Symbol::Function(f)) => (f.params.clone(), f.return_ty),
            Some(Symbol::Variable(_)) => {
                return Err(self.error(format!("'{}' is a variable, not a function", callee), span))
            }
            None => return Err(self.error(format!("undeclared function '{}'", callee), span)),
        };

        if params.len() != args.len() {
            return Err(self.error(
                format!(
                    "function '{}' expects {} argument(s), found {}",
                    callee,
                    params.len(),
                    args.len()
                ),
                span,
            ));
        }

        for (param_ty, arg) in params.iter().zip(args) {
            let arg_ty = self.check_expr(arg)?;
            if !compatible(Ty::Scalar(*param_ty), arg_ty) {
                return Err(self.error(
                    format!(
                        "argument to '{}' expected {}, found {}",
                        callee, param_ty, arg_ty
                    ),
                    arg.span(),
                ));
            }
        }

        Ok(return_ty.unwrap_or(Ty::Void))
    }
}

fn wider_numeric(a: Ty, b: Ty) -> Ty {
    if a == Ty::Scalar(TypeTag::Float) || b == Ty::Scalar(TypeTag::Float) {
        Ty::float()
    } else {
        Ty::int()
    }
}
