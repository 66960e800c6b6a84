//! Three-address-code intermediate representation: a flat, ordered list of
//! instructions operating on named temporaries, variables, and literals.
//! Operands are a discriminated type rather than a re-parsed string, so the
//! optimizer and the interpreter never have to guess what a piece of text
//! means — only the textual dump (used for snapshots and `--emit-ir`) goes
//! back through a single uniform string encoding.

mod lower;
mod optimize;

pub use lower::generate;
pub use optimize::optimize;

use crate::ast::{BinOp, UnaryOp};
use std::fmt;

/// An assignable location: either a compiler-generated temporary or a
/// source-level variable.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Dest {
    Temp(u32),
    Var(String),
}

impl Dest {
    pub fn as_operand(&self) -> Operand {
        match self {
            Dest::Temp(id) => Operand::Temp(*id),
            Dest::Var(name) => Operand::Var(name.clone()),
        }
    }
}

impl fmt::Display for Dest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dest::Temp(id) => write!(f, "t{}", id),
            Dest::Var(name) => write!(f, "{}", name),
        }
    }
}

/// A value consumed by an instruction: a reference to a dest, or a literal.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Temp(u32),
    Var(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Operand {
    /// The dest this operand refers to, if it is a reference rather than a
    /// literal. Used by the optimizer's liveness passes.
    pub fn as_dest(&self) -> Option<Dest> {
        match self {
            Operand::Temp(id) => Some(Dest::Temp(*id)),
            Operand::Var(name) => Some(Dest::Var(name.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Temp(id) => write!(f, "t{}", id),
            Operand::Var(name) => write!(f, "{}", name),
            Operand::Int(n) => write!(f, "{}", n),
            Operand::Float(x) => write!(f, "{}", format_float(*x)),
            Operand::Bool(true) => write!(f, "1"),
            Operand::Bool(false) => write!(f, "0"),
            Operand::Str(s) => write!(f, "\"{}\"", s),
        }
    }
}

/// Renders a float so the text always carries a `.` — the uniform operand
/// encoding classifies "contains a dot or exponent" as float, and Rust's
/// default `Display` for a whole-number float (e.g. `3.0`) omits it.
fn format_float(x: f64) -> String {
    let s = format!("{}", x);
    if s.contains('.') || s.contains('e') || s.contains('E') || s.contains("inf") || s.contains("NaN") {
        s
    } else {
        format!("{}.0", s)
    }
}

#[derive(Clone, Debug)]
pub enum Instruction {
    Label(String),
    FuncLabel(String),
    Goto(String),
    IfGoto(Operand, String),
    Assign(Dest, Operand),
    BinaryOp(Dest, BinOp, Operand, Operand),
    UnaryOp(Dest, UnaryOp, Operand),
    Print(Operand),
    Read(Dest),
    Param(Operand),
    Call(Option<Dest>, String, usize),
    Return(Option<Operand>),
}

/// A lowered, optionally-optimized program: one flat instruction stream
/// shared by every function, each function's body bracketed by its own
/// `FuncLabel`.
#[derive(Clone, Debug, Default)]
pub struct IRProgram {
    pub instructions: Vec<Instruction>,
}

impl IRProgram {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self { instructions }
    }

    /// Renders the program in the uniform textual form used for
    /// `--emit-ir` output and IR snapshot tests.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for instr in &self.instructions {
            out.push_str(&dump_instruction(instr));
            out.push('\n');
        }
        out
    }
}

fn dump_instruction(instr: &Instruction) -> String {
    match instr {
        Instruction::Label(l) => format!("{}:", l),
        Instruction::FuncLabel(name) => format!("func {}:", name),
        Instruction::Goto(l) => format!("goto {}", l),
        Instruction::IfGoto(cond, l) => format!("if {} goto {}", cond, l),
        Instruction::Assign(d, s) => format!("{} = {}", d, s),
        Instruction::BinaryOp(d, op, l, r) => format!("{} = {} {} {}", d, l, op.as_str(), r),
        Instruction::UnaryOp(d, op, x) => format!("{} = {} {}", d, op.as_str(), x),
        Instruction::Print(v) => format!("print {}", v),
        Instruction::Read(d) => format!("read {}", d),
        Instruction::Param(v) => format!("param {}", v),
        Instruction::Call(Some(d), name, n) => format!("{} = call {}, {}", d, name, n),
        Instruction::Call(None, name, n) => format!("call {}, {}", name, n),
        Instruction::Return(Some(v)) => format!("return {}", v),
        Instruction::Return(None) => "return".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dumps_label_and_goto() {
        let prog = IRProgram::new(vec![
            Instruction::Label("L_end_0".into()),
            Instruction::Goto("L_end_0".into()),
        ]);
        assert_eq!(prog.dump(), "L_end_0:\ngoto L_end_0\n");
    }

    #[test]
    fn dumps_binary_op_with_symbol() {
        let instr = Instruction::BinaryOp(
            Dest::Temp(0),
            BinOp::Add,
            Operand::Var("x".into()),
            Operand::Int(1),
        );
        assert_eq!(dump_instruction(&instr), "t0 = x + 1");
    }

    #[test]
    fn float_operand_always_shows_a_dot() {
        assert_eq!(Operand::Float(3.0).to_string(), "3.0");
        assert_eq!(Operand::Float(3.5).to_string(), "3.5");
    }

    #[test]
    fn bool_operand_renders_as_0_or_1() {
        assert_eq!(Operand::Bool(true).to_string(), "1");
        assert_eq!(Operand::Bool(false).to_string(), "0");
    }

    #[test]
    fn call_dump_includes_dest_only_when_present() {
        let with_dest = Instruction::Call(Some(Dest::Temp(2)), "add".into(), 2);
        let without_dest = Instruction::Call(None, "log".into(), 1);
        assert_eq!(dump_instruction(&with_dest), "t2 = call add, 2");
        assert_eq!(dump_instruction(&without_dest), "call log, 1");
    }

    #[test]
    fn string_operand_is_quoted() {
        assert_eq!(Operand::Str("hi".into()).to_string(), "\"hi\"");
    }
}
