//! Lowers a type-checked AST into the three-address-code `IRProgram`.
//!
//! Every literal is materialized into its own temporary before use — even
//! a bare `5` becomes `t0 = 5` — so the optimizer's constant-propagation
//! pass has a single uniform place to look up a temp's value. Variables,
//! by contrast, are never boxed into a temp: an expression referencing `x`
//! simply returns `Operand::Var("x")`.

use super::{Dest, IRProgram, Instruction, Operand};
use crate::ast::{self, Expr, Literal, Stmt};

struct IRGenerator {
    instructions: Vec<Instruction>,
    temp_count: u32,
    label_count: u32,
}

impl IRGenerator {
    fn new() -> Self {
        Self {
            instructions: Vec::new(),
            temp_count: 0,
            label_count: 0,
        }
    }

    fn new_temp(&mut self) -> Dest {
        let id = self.temp_count;
        self.temp_count += 1;
        Dest::Temp(id)
    }

    /// `prefix` already carries its trailing underscore (e.g. `"L_then_"`);
    /// one counter is shared across every label kind, so labels across a
    /// whole program are numbered in the order they were allocated, not
    /// per-prefix.
    fn new_label(&mut self, prefix: &str) -> String {
        let l = format!("{}{}", prefix, self.label_count);
        self.label_count += 1;
        l
    }

    fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    fn gen_program(&mut self, program: &ast::Program) {
        for func in &program.functions {
            self.gen_function(func);
        }
    }

    fn gen_function(&mut self, func: &ast::FunctionDecl) {
        self.emit(Instruction::FuncLabel(func.name.node.clone()));
        for stmt in &func.body.statements {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => {
                for s in &block.statements {
                    self.gen_stmt(s);
                }
            }

            Stmt::VarDecl { name, init, .. } => {
                if let Some(init) = init {
                    let src = self.gen_expr(init);
                    self.emit(Instruction::Assign(Dest::Var(name.node.clone()), src));
                }
            }

            Stmt::ExprStmt(expr) => {
                self.gen_expr(expr);
            }

            Stmt::If {
                cond,
                then_branch,
                else_branch,
            } => self.gen_if(cond, then_branch, else_branch.as_deref()),

            Stmt::While { cond, body } => self.gen_while(cond, body),

            Stmt::DoWhile { body, cond } => self.gen_do_while(body, cond),

            Stmt::For {
                init,
                cond,
                update,
                body,
            } => self.gen_for(init.as_deref(), cond.as_ref(), update.as_ref(), body),

            Stmt::Return { value, .. } => {
                let val = value.as_ref().map(|v| self.gen_expr(v));
                self.emit(Instruction::Return(val));
            }

            Stmt::Print { value } => {
                let val = self.gen_expr(value);
                self.emit(Instruction::Print(val));
            }

            Stmt::Read { name } => {
                self.emit(Instruction::Read(Dest::Var(name.node.clone())));
            }
        }
    }

    fn gen_if(&mut self, cond: &Expr, then_branch: &Stmt, else_branch: Option<&Stmt>) {
        let cond_val = self.gen_expr(cond);

        let then_l = self.new_label("L_then_");
        let else_l = self.new_label("L_else_");
        let end_l = self.new_label("L_end_");

        self.emit(Instruction::IfGoto(cond_val, then_l.clone()));
        self.emit(Instruction::Goto(else_l.clone()));

        self.emit(Instruction::Label(then_l));
        self.gen_stmt(then_branch);
        self.emit(Instruction::Goto(end_l.clone()));

        self.emit(Instruction::Label(else_l));
        if let Some(else_branch) = else_branch {
            self.gen_stmt(else_branch);
        }

        self.emit(Instruction::Label(end_l));
    }

    fn gen_while(&mut self, cond: &Expr, body: &Stmt) {
        let begin = self.new_label("L_while_begin_");
        let body_l = self.new_label("L_while_body_");
        let end = self.new_label("L_while_end_");

        self.emit(Instruction::Label(begin.clone()));

        let cond_val = self.gen_expr(cond);
        self.emit(Instruction::IfGoto(cond_val, body_l.clone()));
        self.emit(Instruction::Goto(end.clone()));

        self.emit(Instruction::Label(body_l));
        self.gen_stmt(body);
        self.emit(Instruction::Goto(begin));

        self.emit(Instruction::Label(end));
    }

    fn gen_do_while(&mut self, body: &Stmt, cond: &Expr) {
        let body_l = self.new_label("L_do_body_");
        let end_l = self.new_label("L_do_end_");

        self.emit(Instruction::Label(body_l.clone()));
        self.gen_stmt(body);

        let cond_val = self.gen_expr(cond);
        self.emit(Instruction::IfGoto(cond_val, body_l));

        self.emit(Instruction::Label(end_l));
    }

    fn gen_for(
        &mut self,
        init: Option<&Stmt>,
        cond: Option<&Expr>,
        update: Option<&Expr>,
        body: &Stmt,
    ) {
        if let Some(init) = init {
            self.gen_stmt(init);
        }

        let begin = self.new_label("L_for_begin_");
        let body_l = self.new_label("L_for_body_");
        let end = self.new_label("L_for_end_");

        self.emit(Instruction::Label(begin.clone()));

        match cond {
            Some(cond) => {
                let cond_val = self.gen_expr(cond);
                self.emit(Instruction::IfGoto(cond_val, body_l.clone()));
                self.emit(Instruction::Goto(end.clone()));
            }
            None => self.emit(Instruction::Goto(body_l.clone())),
        }

        self.emit(Instruction::Label(body_l));
        self.gen_stmt(body);

        if let Some(update) = update {
            self.gen_expr(update);
        }

        self.emit(Instruction::Goto(begin));
        self.emit(Instruction::Label(end));
    }

    fn gen_expr(&mut self, expr: &Expr) -> Operand {
        match expr {
            Expr::Literal { value, .. } => {
                let t = self.new_temp();
                let lit = match value {
                    Literal::Int(n) => Operand::Int(*n),
                    Literal::Float(x) => Operand::Float(*x),
                    Literal::Bool(b) => Operand::Bool(*b),
                    Literal::String(s) => Operand::Str(s.clone()),
                };
                self.emit(Instruction::Assign(t.clone(), lit));
                t.as_operand()
            }

            Expr::VarRef { name, .. } => Operand::Var(name.clone()),

            Expr::Grouping { inner, .. } => self.gen_expr(inner),

            Expr::Unary { op, operand, .. } => {
                let val = self.gen_expr(operand);
                let t = self.new_temp();
                self.emit(Instruction::UnaryOp(t.clone(), *op, val));
                t.as_operand()
            }

            Expr::Binary {
                op, left, right, ..
            } => {
                let l = self.gen_expr(left);
                let r = self.gen_expr(right);
                let t = self.new_temp();
                self.emit(Instruction::BinaryOp(t.clone(), *op, l, r));
                t.as_operand()
            }

            Expr::Assignment { name, value, .. } => {
                let val = self.gen_expr(value);
                self.emit(Instruction::Assign(Dest::Var(name.clone()), val));
                Operand::Var(name.clone())
            }

            Expr::Call { callee, args, .. } => {
                let mut arg_count = 0usize;
                for arg in args {
                    let v = self.gen_expr(arg);
                    self.emit(Instruction::Param(v));
                    arg_count += 1;
                }
                let t = self.new_temp();
                self.emit(Instruction::Call(Some(t.clone()), callee.clone(), arg_count));
                t.as_operand()
            }
        }
    }
}

/// Lowers a whole program into three-address code.
pub fn generate(program: &ast::Program) -> IRProgram {
    let mut gen = IRGenerator::new();
    gen.gen_program(program);
    IRProgram::new(gen.instructions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Block, FunctionDecl, Param, Program, TypeTag};
    use crate::span::{Span, Spanned};

    fn spanned(s: &str) -> Spanned<String> {
        Spanned::new(s.to_string(), Span::dummy())
    }

    fn int_lit(n: i64) -> Expr {
        Expr::Literal {
            value: Literal::Int(n),
            span: Span::dummy(),
        }
    }

    #[test]
    fn literal_is_materialized_into_its_own_temp() {
        let program = Program {
            functions: vec![FunctionDecl {
                name: spanned("main"),
                params: vec![],
                body: Block {
                    statements: vec![Stmt::Print { value: int_lit(5) }],
                },
            }],
        };
        let ir = generate(&program);
        let dump = ir.dump();
        assert!(dump.contains("t0 = 5"));
        assert!(dump.contains("print t0"));
    }

    #[test]
    fn if_without_else_still_emits_else_label() {
        let program = Program {
            functions: vec![FunctionDecl {
                name: spanned("main"),
                params: vec![],
                body: Block {
                    statements: vec![Stmt::If {
                        cond: int_lit(1),
                        then_branch: Box::new(Stmt::Print { value: int_lit(2) }),
                        else_branch: None,
                    }],
                },
            }],
        };
        let dump = generate(&program).dump();
        assert!(dump.contains("L_then_0:"));
        assert!(dump.contains("L_else_1:"));
        assert!(dump.contains("L_end_2:"));
    }

    #[test]
    fn var_decl_without_initializer_emits_nothing() {
        let program = Program {
            functions: vec![FunctionDecl {
                name: spanned("main"),
                params: vec![Param {
                    ty: TypeTag::Int,
                    name: "x".into(),
                }],
                body: Block {
                    statements: vec![Stmt::VarDecl {
                        ty: TypeTag::Int,
                        name: spanned("y"),
                        init: None,
                    }],
                },
            }],
        };
        let dump = generate(&program).dump();
        assert_eq!(dump.trim(), "func main:");
    }

    #[test]
    fn call_always_allocates_a_dest_temp() {
        let program = Program {
            functions: vec![FunctionDecl {
                name: spanned("main"),
                params: vec![],
                body: Block {
                    statements: vec![Stmt::ExprStmt(Expr::Call {
                        callee: "noop".into(),
                        args: vec![],
                        span: Span::dummy(),
                    })],
                },
            }],
        };
        let dump = generate(&program).dump();
        assert!(dump.contains("t0 = call noop, 0"));
    }

    /// Every `Goto`/`IfGoto` target must name a `Label` actually present in
    /// the stream, and every `Call` callee must name a `FuncLabel` actually
    /// present, across a program exercising every branching/looping form.
    #[test]
    fn every_jump_target_and_callee_resolves_to_a_real_label() {
        let program = Program {
            functions: vec![
                FunctionDecl {
                    name: spanned("helper"),
                    params: vec![],
                    body: Block {
                        statements: vec![Stmt::Return {
                            value: Some(int_lit(1)),
                            span: Span::dummy(),
                        }],
                    },
                },
                FunctionDecl {
                    name: spanned("main"),
                    params: vec![],
                    body: Block {
                        statements: vec![
                            Stmt::If {
                                cond: int_lit(1),
                                then_branch: Box::new(Stmt::Print { value: int_lit(2) }),
                                else_branch: Some(Box::new(Stmt::Print { value: int_lit(3) })),
                            },
                            Stmt::While {
                                cond: int_lit(0),
                                body: Box::new(Stmt::Print { value: int_lit(4) }),
                            },
                            Stmt::ExprStmt(Expr::Call {
                                callee: "helper".into(),
                                args: vec![],
                                span: Span::dummy(),
                            }),
                        ],
                    },
                },
            ],
        };

        let instructions = generate(&program).instructions;

        let labels: std::collections::HashSet<&str> = instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::Label(l) => Some(l.as_str()),
                _ => None,
            })
            .collect();
        let func_labels: std::collections::HashSet<&str> = instructions
            .iter()
            .filter_map(|i| match i {
                Instruction::FuncLabel(f) => Some(f.as_str()),
                _ => None,
            })
            .collect();

        for instr in &instructions {
            match instr {
                Instruction::Goto(target) => {
                    assert!(labels.contains(target.as_str()), "dangling goto {target}")
                }
                Instruction::IfGoto(_, target) => {
                    assert!(labels.contains(target.as_str()), "dangling if-goto {target}")
                }
                Instruction::Call(_, callee, _) => assert!(
                    func_labels.contains(callee.as_str()),
                    "call to undeclared function {callee}"
                ),
                _ => {}
            }
        }
    }
}
