//! The tree-address-code interpreter: a stack-of-frames virtual machine
//! that executes an `IRProgram` directly, with no further lowering.

use std::collections::HashMap;
use std::io::Write;

use crate::ast;
use crate::diagnostic::{Diagnostic, ErrorKind};
use crate::ir::{Dest, IRProgram, Instruction, Operand};
use crate::span::Span;

/// A runtime value. Booleans are represented as the integers 0/1, matching
/// the IR's own boolean encoding.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            Value::Str(_) => None,
        }
    }

    fn truthy(&self) -> bool {
        match self {
            Value::Int(n) => *n != 0,
            Value::Float(x) => *x != 0.0,
            Value::Str(s) => !s.is_empty(),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{}", s),
        }
    }
}

struct Frame {
    func_name: String,
    env: HashMap<String, Value>,
    return_ip: usize,
    ret_dest: Option<String>,
}

pub struct VirtualMachine<'a> {
    instructions: &'a [Instruction],
    labels: HashMap<&'a str, usize>,
    func_labels: HashMap<&'a str, usize>,
    func_params: HashMap<String, Vec<String>>,
    frames: Vec<Frame>,
    current_func: String,
    env: HashMap<String, Value>,
    ip: usize,
    arg_stack: Vec<Value>,
    out: &'a mut dyn Write,
}

impl<'a> VirtualMachine<'a> {
    /// `func_params` maps every declared function's name to its ordered
    /// parameter names — the IR never materializes parameter bindings, so
    /// the interpreter needs this straight from the AST to bind a callee's
    /// environment on entry. `out` receives every `print`ed line; callers
    /// that don't care pass `std::io::stdout()`.
    pub fn new(
        program: &'a IRProgram,
        func_params: HashMap<String, Vec<String>>,
        out: &'a mut dyn Write,
    ) -> Self {
        let mut labels = HashMap::new();
        let mut func_labels = HashMap::new();
        for (i, instr) in program.instructions.iter().enumerate() {
            match instr {
                Instruction::Label(name) => {
                    labels.insert(name.as_str(), i);
                }
                Instruction::FuncLabel(name) => {
                    func_labels.insert(name.as_str(), i);
                }
                _ => {}
            }
        }
        Self {
            instructions: &program.instructions,
            labels,
            func_labels,
            func_params,
            frames: Vec::new(),
            current_func: String::new(),
            env: HashMap::new(),
            ip: 0,
            arg_stack: Vec::new(),
            out,
        }
    }

    fn error(&self, message: impl Into<String>) -> Diagnostic {
        Diagnostic::error(ErrorKind::Vm, message.into(), Span::dummy())
    }

    /// Resolves an operand to a runtime value. A `Temp`/`Var` operand is
    /// looked up by its textual key in the current environment; the
    /// remaining variants are themselves the value, already disambiguated
    /// by the IR generator — no re-parsing of a string encoding required.
    fn decode(&self, op: &Operand) -> Result<Value, Diagnostic> {
        match op {
            Operand::Temp(id) => self
                .env
                .get(&format!("t{}", id))
                .cloned()
                .ok_or_else(|| self.error(format!("uninitialized use of 't{}'", id))),
            Operand::Var(name) => self
                .env
                .get(name)
                .cloned()
                .ok_or_else(|| self.error(format!("uninitialized use of '{}'", name))),
            Operand::Int(n) => Ok(Value::Int(*n)),
            Operand::Float(x) => Ok(Value::Float(*x)),
            Operand::Bool(b) => Ok(Value::Int(if *b { 1 } else { 0 })),
            Operand::Str(s) => Ok(Value::Str(s.clone())),
        }
    }

    fn set(&mut self, dest: &Dest, value: Value) {
        self.env.insert(dest.to_string(), value);
    }

    /// Executes `main` to completion and returns the value (if any) its
    /// top-level `return` produced.
    pub fn run(&mut self) -> Result<Option<Value>, Diagnostic> {
        if !self.func_labels.contains_key("main") {
            return Err(self.error("no 'main' function found"));
        }

        self.current_func = "main".to_string();
        self.env = HashMap::new();
        self.ip = self.func_labels["main"] + 1;

        while self.ip < self.instructions.len() {
            let instr = &self.instructions[self.ip];

            match instr {
                Instruction::Label(_) | Instruction::FuncLabel(_) => {}

                Instruction::Assign(dest, src) => {
                    let val = self.decode(src)?;
                    self.set(dest, val);
                }

                Instruction::BinaryOp(dest, op, left, right) => {
                    let a = self.decode(left)?;
                    let b = self.decode(right)?;
                    let r = self.eval_binary(*op, a, b)?;
                    self.set(dest, r);
                }

                Instruction::UnaryOp(dest, op, operand) => {
                    let a = self.decode(operand)?;
                    let r = self.eval_unary(*op, a)?;
                    self.set(dest, r);
                }

                Instruction::Goto(target) => {
                    self.ip = self.label_index(target)?;
                    continue;
                }

                Instruction::IfGoto(cond, target) => {
                    let c = self.decode(cond)?;
                    if c.truthy() {
                        self.ip = self.label_index(target)?;
                        continue;
                    }
                }

                Instruction::Print(value) => {
                    let v = self.decode(value)?;
                    writeln!(self.out, "{}", v).map_err(|e| self.error(e.to_string()))?;
                }

                Instruction::Read(dest) => {
                    let v = self.read_value();
                    self.set(dest, v);
                }

                Instruction::Param(value) => {
                    let v = self.decode(value)?;
                    self.arg_stack.push(v);
                }

                Instruction::Call(dest, callee, arg_count) => {
                    self.exec_call(dest.as_ref(), callee, *arg_count)?;
                    continue;
                }

                Instruction::Return(value) => {
                    let rv = match value {
                        Some(v) => Some(self.decode(v)?),
                        None => None,
                    };
                    if let Some(done) = self.exec_return(rv) {
                        return Ok(done);
                    }
                    continue;
                }
            }

            self.ip += 1;
        }

        Ok(None)
    }

    fn label_index(&self, target: &str) -> Result<usize, Diagnostic> {
        self.labels
            .get(target)
            .copied()
            .ok_or_else(|| self.error(format!("unknown label '{}'", target)))
    }

    fn exec_call(
        &mut self,
        dest: Option<&Dest>,
        callee: &str,
        arg_count: usize,
    ) -> Result<(), Diagnostic> {
        let entry = *self
            .func_labels
            .get(callee)
            .ok_or_else(|| self.error(format!("function not found: '{}'", callee)))?;

        if arg_count > self.arg_stack.len() {
            return Err(self.error("not enough pending arguments for call"));
        }

        let split_at = self.arg_stack.len() - arg_count;
        let args: Vec<Value> = self.arg_stack.split_off(split_at);

        let param_names = self
            .func_params
            .get(callee)
            .cloned()
            .unwrap_or_default();
        if param_names.len() != arg_count {
            return Err(self.error(format!(
                "call to '{}' passes {} argument(s), but {} are declared",
                callee,
                arg_count,
                param_names.len()
            )));
        }

        log::trace!(
            "call {} -> {} ({} frame(s) deep)",
            self.current_func,
            callee,
            self.frames.len() + 1
        );

        let caller_env = std::mem::take(&mut self.env);
        self.frames.push(Frame {
            func_name: std::mem::replace(&mut self.current_func, callee.to_string()),
            env: caller_env,
            return_ip: self.ip + 1,
            ret_dest: dest.map(|d| d.to_string()),
        });

        let mut new_env = HashMap::new();
        for (name, val) in param_names.into_iter().zip(args) {
            new_env.insert(name, val);
        }
        self.env = new_env;
        self.ip = entry + 1;
        Ok(())
    }

    /// Returns `Some(result)` when the program has finished (a `return`
    /// from the outermost frame), `None` when execution should resume in
    /// the caller.
    fn exec_return(&mut self, rv: Option<Value>) -> Option<Option<Value>> {
        let Some(frame) = self.frames.pop() else {
            return Some(rv);
        };

        let Frame {
            func_name,
            mut env,
            return_ip,
            ret_dest,
        } = frame;

        if let (Some(dest), Some(value)) = (&ret_dest, &rv) {
            env.insert(dest.clone(), value.clone());
        }

        log::trace!(
            "return {} -> {} ({} frame(s) remaining)",
            self.current_func,
            func_name,
            self.frames.len()
        );

        self.env = env;
        self.current_func = func_name;
        self.ip = return_ip;
        None
    }

    fn read_value(&mut self) -> Value {
        self.out.flush().ok();
        let mut line = String::new();
        std::io::stdin().read_line(&mut line).ok();
        let raw = line.trim();

        let looks_float = raw.contains('.') || raw.contains('e') || raw.contains('E');
        if looks_float {
            if let Ok(x) = raw.parse::<f64>() {
                return Value::Float(x);
            }
        }
        if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
        Value::Str(raw.to_string())
    }

    fn eval_binary(&self, op: ast::BinOp, a: Value, b: Value) -> Result<Value, Diagnostic> {
        use ast::BinOp::*;

        if op == Add && (matches!(a, Value::Str(_)) || matches!(b, Value::Str(_))) {
            return Ok(Value::Str(format!("{}{}", a, b)));
        }

        let (Some(af), Some(bf)) = (a.as_f64(), b.as_f64()) else {
            return Err(self.error(format!(
                "'{}' requires numeric operands (or a string for '+')",
                op.as_str()
            )));
        };

        let r = match op {
            Add => narrow(af + bf),
            Sub => narrow(af - bf),
            Mul => narrow(af * bf),
            Div => {
                if bf == 0.0 {
                    return Err(self.error("division by zero"));
                }
                narrow(af / bf)
            }
            Mod => match (&a, &b) {
                (Value::Int(x), Value::Int(y)) => {
                    if *y == 0 {
                        return Err(self.error("division by zero"));
                    }
                    Value::Int(x % y)
                }
                _ => return Err(self.error("'%' is only defined for int operands")),
            },
            Lt => Value::Int((af < bf) as i64),
            Le => Value::Int((af <= bf) as i64),
            Gt => Value::Int((af > bf) as i64),
            Ge => Value::Int((af >= bf) as i64),
            Eq => Value::Int((af == bf) as i64),
            Ne => Value::Int((af != bf) as i64),
            // No short-circuit: both operands are already decoded above.
            And => Value::Int((a.truthy() && b.truthy()) as i64),
            Or => Value::Int((a.truthy() || b.truthy()) as i64),
        };
        Ok(r)
    }

    fn eval_unary(&self, op: ast::UnaryOp, a: Value) -> Result<Value, Diagnostic> {
        match op {
            ast::UnaryOp::Neg => match a {
                Value::Int(n) => Ok(Value::Int(-n)),
                Value::Float(x) => Ok(Value::Float(-x)),
                Value::Str(_) => Err(self.error("'-' requires a numeric operand")),
            },
            ast::UnaryOp::Not => Ok(Value::Int(if a.truthy() { 0 } else { 1 })),
        }
    }
}

fn narrow(x: f64) -> Value {
    if x.fract() == 0.0 && x.is_finite() {
        Value::Int(x as i64)
    } else {
        Value::Float(x)
    }
}

fn func_params_of(program: &ast::Program) -> HashMap<String, Vec<String>> {
    program
        .functions
        .iter()
        .map(|f| {
            (
                f.name.node.clone(),
                f.params.iter().map(|p| p.name.clone()).collect(),
            )
        })
        .collect()
}

/// Binds a callee-name → parameter-names map straight from the AST (the IR
/// itself never materializes parameter bindings) and runs `main`, printing
/// to stdout.
pub fn run(program: &ast::Program, ir: &IRProgram) -> Result<Option<Value>, Diagnostic> {
    let mut stdout = std::io::stdout();
    VirtualMachine::new(ir, func_params_of(program), &mut stdout).run()
}

/// Same as [`run`], but directs every `print`ed line to `out` instead of
/// stdout. Used by tests that need to assert on a program's output.
pub fn run_with_output(
    program: &ast::Program,
    ir: &IRProgram,
    out: &mut impl Write,
) -> Result<Option<Value>, Diagnostic> {
    VirtualMachine::new(ir, func_params_of(program), out).run()
}
