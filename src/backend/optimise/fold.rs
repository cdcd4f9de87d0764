//! Constant Folding Pass
//!
//! Replaces the right-hand side of an assignment by its value when every
//! operand is a literal: `x := 2 * 3` becomes `x := 6`.
//!
//! # Behavior
//!
//! - Arithmetic wraps like the JVM's 32-bit integer instructions
//! - Division by zero is left in place so it still traps at run time
//! - Comparisons and logical operators produce boolean literals (0 or 1)
//! - Branch conditions are not touched, so the CFG never changes

use crate::backend::ir::{BinaryOp, Instruction, Method, Operand, UnaryOp};

/// Fold constant assignments in a method
///
/// Returns true if any changes were made
pub fn fold_method(method: &mut Method) -> bool {
    let mut changed = false;

    for instr in &mut method.instructions {
        if let Instruction::Assign { rhs, .. } = instr
            && let Some(folded) = fold_expression(&**rhs)
        {
            **rhs = Instruction::SingleOperand(folded);
            changed = true;
        }
    }

    changed
}

/// Evaluate an expression whose operands are all literals
pub fn fold_expression(expr: &Instruction) -> Option<Operand> {
    match expr {
        Instruction::BinaryOp { op, lhs, rhs, ty } => {
            let value = eval_binary(*op, lhs.as_literal()?, rhs.as_literal()?)?;
            Some(Operand::Literal {
                value,
                ty: ty.clone(),
            })
        }
        Instruction::UnaryOp { op, operand, ty } => {
            let value = operand.as_literal()?;
            let value = match op {
                UnaryOp::Not => i32::from(value == 0),
                UnaryOp::Neg => value.wrapping_neg(),
            };
            Some(Operand::Literal {
                value,
                ty: ty.clone(),
            })
        }
        _ => None,
    }
}

fn eval_binary(op: BinaryOp, lhs: i32, rhs: i32) -> Option<i32> {
    let value = match op {
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div => {
            if rhs == 0 {
                return None;
            }
            lhs.wrapping_div(rhs)
        }
        BinaryOp::Lt => i32::from(lhs < rhs),
        BinaryOp::Le => i32::from(lhs <= rhs),
        BinaryOp::Gt => i32::from(lhs > rhs),
        BinaryOp::Ge => i32::from(lhs >= rhs),
        BinaryOp::Eq => i32::from(lhs == rhs),
        BinaryOp::Ne => i32::from(lhs != rhs),
        BinaryOp::And => i32::from(lhs != 0 && rhs != 0),
        BinaryOp::Or => i32::from(lhs != 0 || rhs != 0),
    };
    Some(value)
}
