use super::symbol_table::Symbol;
use super::types::{compatible, Ty};
use super::SemanticAnalyzer;
use crate::ast::{self, Stmt};
use crate::diagnostic::Diagnostic;

impl SemanticAnalyzer {
    /// Checks every statement of a block in the CURRENT scope — callers
    /// that need a fresh scope (nested blocks, for-loops) push one first.
    pub(super) fn check_block(&mut self, block: &ast::Block) -> Result<(), Diagnostic> {
        for stmt in &block.statements {
            self.check_stmt(stmt)?;
        }
        Ok(())
    }

    fn check_stmt(&mut self, stmt: &Stmt) -> Result<(), Diagnostic> {
        match stmt {
            Stmt::Block(block) => {
                self.table.push();
                let result = self.check_block(block);
                self.table.pop();
                result
            }

            Stmt::VarDecl { ty, name, init } => {
                if let Some(init_expr) = init {
                    let init_ty = self.check_expr(init_expr)?;
                    if !compatible(Ty::Scalar(*ty), init_ty) {
                        return Err(self.error(
                            format!(
                                "cannot initialize variable of type {} with {}",
                                ty, init_ty
                            ),
                            name.span,
                        ));
                    }
                }
                if self.table.define_var(name.node.clone(), *ty).is_err() {
                    return Err(self.error(
                        format!("variable '{}' is already declared in this scope", name.node),
                        name.span,
                    ));
                }
                Ok(())
            }

            Stmt::ExprStmt(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.require_bool_condition(cond)?;
                self.check_stmt(then_branch)?;
                if let Some(else_branch) = else_branch {
                    self.check_stmt(else_branch)?;
                }
                Ok(())
            }

            Stmt::While { cond, body } => {
                self.require_bool_condition(cond)?;
                self.check_stmt(body)
            }

            Stmt::DoWhile { body, cond } => {
                self.check_stmt(body)?;
                self.require_bool_condition(cond)
            }

            Stmt::For {
                init,
                cond,
                update,
                body,
            } => {
                self.table.push();
                let result = (|| {
                    if let Some(init) = init {
                        self.check_stmt(init)?;
                    }
                    if let Some(cond) = cond {
                        self.require_bool_condition(cond)?;
                    }
                    self.check_stmt(body)?;
                    if let Some(update) = update {
                        self.check_expr(update)?;
                    }
                    Ok(())
                })();
                self.table.pop();
                result
            }

            Stmt::Return { value, span } => {
                let declared = match value {
                    Some(expr) => self.check_expr(expr)?,
                    None => Ty::Void,
                };
                let current_function = self.current_function.clone();
                if let Some(existing) = self.table.set_func_return_type(&current_function, declared)
                {
                    if existing != declared {
                        return Err(self.error(
                            format!(
                                "function '{}' returns {} here, but {} elsewhere",
                                current_function, declared, existing
                            ),
                            *span,
                        ));
                    }
                }
                Ok(())
            }

            Stmt::Print { value } => {
                self.check_expr(value)?;
                Ok(())
            }

            Stmt::Read { name } => match self.table.resolve(&name.node) {
                Some(Symbol::Variable(_)) => Ok(()),
                Some(Symbol::Function(_)) => Err(self.error(
                    format!("'{}' is a function, not a variable", name.node),
                    name.span,
                )),
                None => Err(self.error(format!("undeclared variable '{}'", name.node), name.span)),
            },
        }
    }

    fn require_bool_condition(&mut self, cond: &ast::Expr) -> Result<(), Diagnostic> {
        let ty = self.check_expr(cond)?;
        if ty != Ty::bool() {
            return Err(self.error(
                format!("condition must be bool, found {}", ty),
                cond.span(),
            ));
        }
        Ok(())
    }
}
