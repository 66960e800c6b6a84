//! Three fixed-order, single-sweep optimizer passes. This is deliberately
//! NOT a fixpoint loop — each pass runs exactly once, in this order, which
//! is the defined behavior rather than an approximation of one.

use super::{Dest, Instruction, Operand};
use crate::ast::{BinOp, UnaryOp};
use std::collections::HashSet;

/// Runs constant propagation/folding, then dead-temp elimination, then
/// trivial-goto removal, each exactly once.
pub fn optimize(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let instructions = constant_fold(instructions);
    let instructions = eliminate_dead_temps(instructions);
    remove_trivial_gotos(instructions)
}

/// Pass 1: substitutes known-constant operands into `BinaryOp`/`UnaryOp`,
/// and replaces an instruction with an `Assign` of the folded literal when
/// every operand it reads is itself a compile-time constant. The `consts`
/// map is reset at every label, since a label may be reached by more than
/// one predecessor (including a loop's back edge) and a single linear sweep
/// has no way to merge or verify those paths agree.
fn constant_fold(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut consts: std::collections::HashMap<Dest, Operand> = std::collections::HashMap::new();
    let mut out = Vec::with_capacity(instructions.len());

    for instr in instructions {
        match instr {
            Instruction::Assign(dest, src) => {
                let src = substitute(&src, &consts);
                if is_literal(&src) {
                    consts.insert(dest.clone(), src.clone());
                } else {
                    consts.remove(&dest);
                }
                out.push(Instruction::Assign(dest, src));
            }

            Instruction::BinaryOp(dest, op, left, right) => {
                let left = substitute(&left, &consts);
                let right = substitute(&right, &consts);

                // Preserve the division-by-zero trap's location: do not
                // fold a division whose divisor is the literal 0, so the
                // vm-error fires at VM execution time instead of here.
                let skip_fold = op == BinOp::Div && matches!(right, Operand::Int(0));

                if !skip_fold {
                    if let (Some(l), Some(r)) = (literal_value(&left), literal_value(&right)) {
                        if let Some(folded) = fold_binary(op, &l, &r) {
                            consts.insert(dest.clone(), folded.clone());
                            out.push(Instruction::Assign(dest, folded));
                            continue;
                        }
                    }
                }

                consts.remove(&dest);
                out.push(Instruction::BinaryOp(dest, op, left, right));
            }

            Instruction::UnaryOp(dest, op, operand) => {
                let operand = substitute(&operand, &consts);
                if let Some(v) = literal_value(&operand) {
                    if let Some(folded) = fold_unary(op, &v) {
                        consts.insert(dest.clone(), folded.clone());
                        out.push(Instruction::Assign(dest, folded));
                        continue;
                    }
                }
                consts.remove(&dest);
                out.push(Instruction::UnaryOp(dest, op, operand));
            }

            Instruction::IfGoto(cond, target) => {
                out.push(Instruction::IfGoto(substitute(&cond, &consts), target));
            }
            Instruction::Print(v) => out.push(Instruction::Print(substitute(&v, &consts))),
            Instruction::Param(v) => out.push(Instruction::Param(substitute(&v, &consts))),
            Instruction::Return(Some(v)) => {
                out.push(Instruction::Return(Some(substitute(&v, &consts))))
            }

            Instruction::Read(dest) => {
                consts.remove(&dest);
                out.push(Instruction::Read(dest));
            }
            Instruction::Call(dest, callee, n) => {
                if let Some(d) = &dest {
                    consts.remove(d);
                }
                out.push(Instruction::Call(dest, callee, n));
            }

            // A label is a control-flow join: a single linear sweep has no
            // way to know which predecessor (including a backward edge from
            // a loop) reached it, so every constant known so far is
            // discarded rather than risk folding a later use against a
            // value that only held on one path in.
            instr @ (Instruction::Label(_) | Instruction::FuncLabel(_)) => {
                consts.clear();
                out.push(instr);
            }

            other @ (Instruction::Goto(_) | Instruction::Return(None)) => out.push(other),
        }
    }

    out
}

/// Looks up `op` in `consts`; returns it unchanged if it is a literal or
/// isn't currently known to be constant.
fn substitute(op: &Operand, consts: &std::collections::HashMap<Dest, Operand>) -> Operand {
    match op.as_dest() {
        Some(dest) => consts.get(&dest).cloned().unwrap_or_else(|| op.clone()),
        None => op.clone(),
    }
}

fn is_literal(op: &Operand) -> bool {
    !matches!(op, Operand::Temp(_) | Operand::Var(_))
}

/// A literal value abstracted over its textual display form, for folding.
enum Lit {
    Int(i64),
    Float(f64),
    Str(String),
}

fn literal_value(op: &Operand) -> Option<Lit> {
    match op {
        Operand::Int(n) => Some(Lit::Int(*n)),
        Operand::Float(x) => Some(Lit::Float(*x)),
        Operand::Bool(b) => Some(Lit::Int(if *b { 1 } else { 0 })),
        Operand::Str(s) => Some(Lit::Str(s.clone())),
        Operand::Temp(_) | Operand::Var(_) => None,
    }
}

fn lit_as_f64(l: &Lit) -> Option<f64> {
    match l {
        Lit::Int(n) => Some(*n as f64),
        Lit::Float(x) => Some(*x),
        Lit::Str(_) => None,
    }
}

fn lit_display(l: &Lit) -> String {
    match l {
        Lit::Int(n) => n.to_string(),
        Lit::Float(x) => format!("{}", x),
        Lit::Str(s) => s.clone(),
    }
}

fn narrow(x: f64) -> Operand {
    if x.fract() == 0.0 && x.is_finite() {
        Operand::Int(x as i64)
    } else {
        Operand::Float(x)
    }
}

/// Folding semantics mirror the interpreter exactly (see `interp`): `+ - * /`
/// are all computed in `f64` and then passed through `narrow()`, exactly
/// like `eval_binary` does, so a whole-valued float result collapses to an
/// `Int` the same way at fold time as it would at runtime. `%` requires
/// both operands to be int, comparisons and logical ops yield a boolean,
/// string `+` concatenates.
fn fold_binary(op: BinOp, l: &Lit, r: &Lit) -> Option<Operand> {
    if op == BinOp::Add && (matches!(l, Lit::Str(_)) || matches!(r, Lit::Str(_))) {
        return Some(Operand::Str(format!("{}{}", lit_display(l), lit_display(r))));
    }

    match op {
        BinOp::Add | BinOp::Sub | BinOp::Mul => {
            let (lf, rf) = (lit_as_f64(l)?, lit_as_f64(r)?);
            let v = match op {
                BinOp::Add => lf + rf,
                BinOp::Sub => lf - rf,
                BinOp::Mul => lf * rf,
                _ => unreachable!(),
            };
            Some(narrow(v))
        }
        BinOp::Div => {
            let (lf, rf) = (lit_as_f64(l)?, lit_as_f64(r)?);
            if rf == 0.0 {
                None
            } else {
                Some(narrow(lf / rf))
            }
        }
        BinOp::Mod => match (l, r) {
            (Lit::Int(a), Lit::Int(b)) if *b != 0 => Some(Operand::Int(a % b)),
            _ => None,
        },
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge | BinOp::Eq | BinOp::Ne => {
            let (lf, rf) = (lit_as_f64(l)?, lit_as_f64(r)?);
            let b = match op {
                BinOp::Lt => lf < rf,
                BinOp::Le => lf <= rf,
                BinOp::Gt => lf > rf,
                BinOp::Ge => lf >= rf,
                BinOp::Eq => lf == rf,
                BinOp::Ne => lf != rf,
                _ => unreachable!(),
            };
            Some(Operand::Bool(b))
        }
        BinOp::And | BinOp::Or => {
            let (lb, rb) = (lit_as_f64(l)? != 0.0, lit_as_f64(r)? != 0.0);
            let b = match op {
                BinOp::And => lb && rb,
                BinOp::Or => lb || rb,
                _ => unreachable!(),
            };
            Some(Operand::Bool(b))
        }
    }
}

fn fold_unary(op: UnaryOp, v: &Lit) -> Option<Operand> {
    match op {
        UnaryOp::Neg => {
            let x = lit_as_f64(v)?;
            Some(if matches!(v, Lit::Int(_)) {
                Operand::Int(-(x as i64))
            } else {
                Operand::Float(-x)
            })
        }
        UnaryOp::Not => {
            let x = lit_as_f64(v)?;
            Some(Operand::Bool(x == 0.0))
        }
    }
}

/// Pass 2: drops any `Assign(dest, _)` whose dest is a temporary never read
/// anywhere else in the stream. Named variables are never removed.
fn eliminate_dead_temps(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut used: HashSet<u32> = HashSet::new();

    let note = |op: &Operand, used: &mut HashSet<u32>| {
        if let Operand::Temp(id) = op {
            used.insert(*id);
        }
    };

    for instr in &instructions {
        match instr {
            Instruction::IfGoto(v, _) | Instruction::Print(v) | Instruction::Param(v) => {
                note(v, &mut used)
            }
            Instruction::Return(Some(v)) => note(v, &mut used),
            Instruction::Assign(_, src) => note(src, &mut used),
            Instruction::BinaryOp(_, _, l, r) => {
                note(l, &mut used);
                note(r, &mut used);
            }
            Instruction::UnaryOp(_, _, x) => note(x, &mut used),
            Instruction::Call(dest, _, _) => {
                if let Some(Dest::Temp(id)) = dest {
                    used.insert(*id);
                }
            }
            _ => {}
        }
    }

    let before = instructions.len();
    let out: Vec<Instruction> = instructions
        .into_iter()
        .filter(|instr| match instr {
            Instruction::Assign(Dest::Temp(id), _) => used.contains(id),
            _ => true,
        })
        .collect();
    log::debug!("eliminate_dead_temps: removed {} dead temp(s)", before - out.len());
    out
}

/// Pass 3: drops a `Goto(L)` immediately followed by `Label(L)`.
fn remove_trivial_gotos(instructions: Vec<Instruction>) -> Vec<Instruction> {
    let mut out = Vec::with_capacity(instructions.len());
    let mut iter = instructions.into_iter().peekable();

    while let Some(instr) = iter.next() {
        if let Instruction::Goto(target) = &instr {
            if let Some(Instruction::Label(label)) = iter.peek() {
                if label == target {
                    continue;
                }
            }
        }
        out.push(instr);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_constant_arithmetic() {
        let instrs = vec![
            Instruction::Assign(Dest::Temp(0), Operand::Int(2)),
            Instruction::Assign(Dest::Temp(1), Operand::Int(3)),
            Instruction::BinaryOp(
                Dest::Temp(2),
                BinOp::Mul,
                Operand::Temp(0),
                Operand::Temp(1),
            ),
        ];
        let out = constant_fold(instrs);
        match &out[2] {
            Instruction::Assign(Dest::Temp(2), Operand::Int(6)) => {}
            other => panic!("expected folded multiply, got {:?}", other),
        }
    }

    #[test]
    fn whole_valued_float_arithmetic_narrows_to_int_like_the_vm_does() {
        // 1.5 + 1.5 == 3.0, and narrow() collapses that to an Int just like
        // eval_binary does at runtime; folding must not leave it a Float.
        let instrs = vec![
            Instruction::Assign(Dest::Temp(0), Operand::Float(1.5)),
            Instruction::Assign(Dest::Temp(1), Operand::Float(1.5)),
            Instruction::BinaryOp(
                Dest::Temp(2),
                BinOp::Add,
                Operand::Temp(0),
                Operand::Temp(1),
            ),
        ];
        let out = constant_fold(instrs);
        match &out[2] {
            Instruction::Assign(Dest::Temp(2), Operand::Int(3)) => {}
            other => panic!("expected narrowed Int(3), got {:?}", other),
        }
    }

    #[test]
    fn does_not_fold_division_by_literal_zero() {
        let instrs = vec![
            Instruction::Assign(Dest::Temp(0), Operand::Int(10)),
            Instruction::Assign(Dest::Temp(1), Operand::Int(0)),
            Instruction::BinaryOp(Dest::Temp(2), BinOp::Div, Operand::Temp(0), Operand::Temp(1)),
        ];
        let out = constant_fold(instrs);
        match &out[2] {
            Instruction::BinaryOp(Dest::Temp(2), BinOp::Div, Operand::Int(10), Operand::Int(0)) => {}
            other => panic!("expected division left unfolded to preserve the vm-error, got {:?}", other),
        }
    }

    #[test]
    fn dead_temp_elimination_preserves_variables() {
        let instrs = vec![
            Instruction::Assign(Dest::Temp(0), Operand::Int(1)),
            Instruction::Assign(Dest::Var("x".into()), Operand::Temp(0)),
        ];
        let out = eliminate_dead_temps(instrs);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn dead_temp_elimination_drops_unused_temp() {
        let instrs = vec![
            Instruction::Assign(Dest::Temp(0), Operand::Int(1)),
            Instruction::Assign(Dest::Var("x".into()), Operand::Int(2)),
        ];
        let out = eliminate_dead_temps(instrs);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn trivial_goto_removal_is_idempotent() {
        let instrs = vec![
            Instruction::Goto("L0".into()),
            Instruction::Label("L0".into()),
        ];
        let once = remove_trivial_gotos(instrs);
        assert!(once.is_empty());
        let twice = remove_trivial_gotos(once.clone());
        assert_eq!(once.len(), twice.len());
    }

    #[test]
    fn does_not_carry_a_constant_across_a_label() {
        // `x` is 0 going into the label, but the label is a loop back-edge
        // target: folding `x < 5` here using the pre-loop value of `x`
        // would make the branch a permanent, wrong, compile-time constant.
        let instrs = vec![
            Instruction::Assign(Dest::Var("x".into()), Operand::Int(0)),
            Instruction::Label("L0".into()),
            Instruction::BinaryOp(Dest::Temp(0), BinOp::Lt, Operand::Var("x".into()), Operand::Int(5)),
        ];
        let out = constant_fold(instrs);
        match &out[2] {
            Instruction::BinaryOp(Dest::Temp(0), BinOp::Lt, Operand::Var(name), Operand::Int(5))
                if name == "x" => {}
            other => panic!("expected the comparison to stay unfolded after the label, got {:?}", other),
        }
    }

    #[test]
    fn string_concatenation_folds() {
        let instrs = vec![
            Instruction::Assign(Dest::Temp(0), Operand::Str("a".into())),
            Instruction::Assign(Dest::Temp(1), Operand::Int(1)),
            Instruction::BinaryOp(
                Dest::Temp(2),
                BinOp::Add,
                Operand::Temp(0),
                Operand::Temp(1),
            ),
        ];
        let out = constant_fold(instrs);
        match &out[2] {
            Instruction::Assign(Dest::Temp(2), Operand::Str(s)) => assert_eq!(s, "a1"),
            other => panic!("expected folded concat, got {:?}", other),
        }
    }
}
