//! Instruction Selection
//!
//! This module converts IR instructions to Jasmin instructions.
//!
//! # Selection rules
//!
//! - Loads, stores, returns and array accesses pick the `i` or `a` family
//!   from the variable's type
//! - `v := v + k`, `v := k + v` and `v := v - k` on an int local become
//!   `iinc` when the increment fits in a signed byte
//! - Comparisons against a literal 0 use the single-operand `if<cond>` family
//! - `&&` and `||` short-circuit through branches, in conditions and values
//! - Boolean values of comparisons are materialized as 0/1 through a
//!   taken/not-taken branch pair
//! - A value computed by a statement nobody reads is popped

use super::generator::MethodEmitter;
use super::instr::{ArithOp, ArrayKind, Cond, InvokeKind, JasminInstr, ValueKind};
use crate::backend::error::BackendResult;
use crate::backend::ir::{
    BinaryOp, CallKind, InstrId, Instruction, NewTarget, Operand, UnaryOp, VariableDescriptor,
};
use crate::common::types::Type;

/// Lower every instruction of the emitter's method, labels included
pub fn lower_method(em: &mut MethodEmitter) -> BackendResult<()> {
    let method = em.method;

    for id in method.ids() {
        for label in method.labels_at(id) {
            em.label(label)?;
        }
        lower_instruction(em, method.instr(id))?;
    }

    // Labels marking the end of the method
    let mut end_labeled = false;
    for label in method.labels_at(InstrId(method.instructions.len())) {
        em.label(label)?;
        end_labeled = true;
    }

    if method.return_type.is_void() {
        let ends_in_return = matches!(method.instructions.last(), Some(Instruction::Return { .. }));
        if !ends_in_return || end_labeled {
            em.emit(JasminInstr::Return(None))?;
        }
    }

    Ok(())
}

/// Lower a top-level IR instruction
///
/// Leaves the operand stack as it found it.
pub fn lower_instruction(em: &mut MethodEmitter, instr: &Instruction) -> BackendResult<()> {
    match instr {
        Instruction::Assign { dest, rhs, .. } => lower_assign(em, dest, rhs),

        Instruction::Call { return_type, .. } => {
            lower_value(em, instr)?;
            if !return_type.is_void() {
                em.emit(JasminInstr::Pop)?;
            }
            Ok(())
        }

        Instruction::Return { value, .. } => lower_return(em, value.as_ref()),

        Instruction::PutField {
            object,
            field,
            value,
        } => {
            let owner = class_of(em, object)?;
            let descriptor = descriptor(em, &field.ty)?;
            load_operand(em, object)?;
            load_operand(em, value)?;
            em.emit(JasminInstr::PutField {
                owner,
                name: field.name.clone(),
                descriptor,
            })
        }

        Instruction::CondBranch { cond, label } => lower_branch(em, cond, label, true),

        Instruction::Goto { label } => em.emit(JasminInstr::Goto(label.clone())),

        Instruction::GetField { .. }
        | Instruction::ArrayLength { .. }
        | Instruction::SingleOperand(_)
        | Instruction::BinaryOp { .. }
        | Instruction::UnaryOp { .. }
        | Instruction::New { .. } => {
            lower_value(em, instr)?;
            em.emit(JasminInstr::Pop)
        }
    }
}

fn lower_return(em: &mut MethodEmitter, value: Option<&Operand>) -> BackendResult<()> {
    let method = em.method;
    let return_type = &method.return_type;
    match value {
        Some(value) => {
            if return_type.is_void() {
                return Err(em.malformed("void method returns a value"));
            }
            let kind = value_kind(em, return_type)?;
            load_operand(em, value)?;
            em.emit(JasminInstr::Return(Some(kind)))
        }
        None => {
            if !return_type.is_void() {
                return Err(em.malformed(format!("missing return value of type `{}`", return_type)));
            }
            em.emit(JasminInstr::Return(None))
        }
    }
}

fn lower_assign(em: &mut MethodEmitter, dest: &Operand, rhs: &Instruction) -> BackendResult<()> {
    if let Instruction::Call {
        return_type: Type::Void,
        method,
        ..
    } = rhs
    {
        return Err(em.malformed(format!("assigning the result of void method `{}`", method)));
    }

    match dest {
        Operand::Variable {
            name, index: None, ..
        } => {
            if let Some((slot, delta)) = increment(em, name, rhs)? {
                return em.emit(JasminInstr::Iinc { slot, delta });
            }
            lower_value(em, rhs)?;
            store_variable(em, name)
        }

        // Element store: address first, then the value, then one store
        Operand::Variable {
            name,
            index: Some(index),
            ..
        } => {
            let kind = load_array(em, name)?;
            load_operand(em, index)?;
            lower_value(em, rhs)?;
            em.emit(JasminInstr::ArrayStore(kind))
        }

        Operand::Literal { .. } | Operand::This => {
            Err(em.malformed(format!("cannot assign to `{}`", dest)))
        }
    }
}

/// Slot and delta when `name := rhs` can be an `iinc`
fn increment(
    em: &MethodEmitter,
    name: &str,
    rhs: &Instruction,
) -> BackendResult<Option<(usize, i32)>> {
    let descriptor = lookup(em, name)?;
    if descriptor.ty != Type::Int32 {
        return Ok(None);
    }

    let is_dest = |op: &Operand| {
        matches!(op, Operand::Variable { name: n, index: None, .. } if n == name)
    };

    let delta = match rhs {
        Instruction::BinaryOp {
            op: BinaryOp::Add,
            lhs,
            rhs,
            ..
        } => match (lhs, rhs) {
            (var, Operand::Literal { value, .. }) if is_dest(var) => Some(*value),
            (Operand::Literal { value, .. }, var) if is_dest(var) => Some(*value),
            _ => None,
        },
        Instruction::BinaryOp {
            op: BinaryOp::Sub,
            lhs,
            rhs: Operand::Literal { value, .. },
            ..
        } if is_dest(lhs) => value.checked_neg(),
        _ => None,
    };

    Ok(delta
        .filter(|delta| (-128..=127).contains(delta))
        .map(|delta| (descriptor.slot, delta)))
}

/// Push the value of an expression
///
/// Pushes nothing for a void call.
pub fn lower_value(em: &mut MethodEmitter, expr: &Instruction) -> BackendResult<()> {
    match expr {
        Instruction::SingleOperand(operand) => load_operand(em, operand),

        Instruction::BinaryOp { op, lhs, rhs, .. } => match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div => {
                load_operand(em, lhs)?;
                load_operand(em, rhs)?;
                let arith = arith_op(em, *op)?;
                em.emit(JasminInstr::Arith(arith))
            }
            _ => materialize_condition(em, expr),
        },

        Instruction::UnaryOp { op, operand, .. } => {
            load_operand(em, operand)?;
            match op {
                UnaryOp::Not => {
                    em.emit(JasminInstr::Const(1))?;
                    em.emit(JasminInstr::Arith(ArithOp::Xor))
                }
                UnaryOp::Neg => em.emit(JasminInstr::Arith(ArithOp::Neg)),
            }
        }

        Instruction::Call {
            kind,
            receiver,
            method,
            args,
            return_type,
        } => lower_call(em, kind, receiver.as_ref(), method, args, return_type),

        Instruction::New { target, .. } => match target {
            NewTarget::Object { class } => {
                let class = em.ctx.mapper.qualify(class);
                em.emit(JasminInstr::New(class))
            }
            NewTarget::Array { element, size } => {
                load_operand(em, size)?;
                let instr = match element {
                    Type::Int32 => JasminInstr::NewArray("int"),
                    Type::Boolean => JasminInstr::NewArray("boolean"),
                    Type::ClassRef(class) => JasminInstr::ANewArray(em.ctx.mapper.qualify(class)),
                    Type::ArrayOf(_) => JasminInstr::ANewArray(descriptor(em, element)?),
                    Type::Void => return Err(em.unsupported("array of void")),
                };
                em.emit(instr)
            }
        },

        Instruction::GetField { object, field } => {
            let owner = class_of(em, object)?;
            let descriptor = descriptor(em, &field.ty)?;
            load_operand(em, object)?;
            em.emit(JasminInstr::GetField {
                owner,
                name: field.name.clone(),
                descriptor,
            })
        }

        Instruction::ArrayLength { array } => {
            load_operand(em, array)?;
            em.emit(JasminInstr::ArrayLength)
        }

        Instruction::Assign { .. }
        | Instruction::Return { .. }
        | Instruction::PutField { .. }
        | Instruction::CondBranch { .. }
        | Instruction::Goto { .. } => {
            Err(em.unsupported(format!("{} used as a value", expr.kind_name())))
        }
    }
}

fn lower_call(
    em: &mut MethodEmitter,
    kind: &CallKind,
    receiver: Option<&Operand>,
    method: &str,
    args: &[Operand],
    return_type: &Type,
) -> BackendResult<()> {
    let (invoke, owner, receiver) = match kind {
        CallKind::Static { class } => {
            let owner = if *class == em.ctx.class_name {
                class.clone()
            } else {
                em.ctx.mapper.qualify(class)
            };
            (InvokeKind::Static, owner, None)
        }
        CallKind::Virtual => {
            let receiver = receiver
                .ok_or_else(|| em.malformed(format!("virtual call to `{}` without receiver", method)))?;
            (InvokeKind::Virtual, class_of(em, receiver)?, Some(receiver))
        }
        CallKind::Special => {
            let receiver = receiver
                .ok_or_else(|| em.malformed(format!("special call to `{}` without receiver", method)))?;
            // Constructor delegation from `this` goes to the superclass
            let owner = if matches!(receiver, Operand::This) && method == "<init>" {
                em.ctx.super_class.clone()
            } else {
                class_of(em, receiver)?
            };
            (InvokeKind::Special, owner, Some(receiver))
        }
    };

    let mut arg_types = Vec::with_capacity(args.len());
    for arg in args {
        arg_types.push(operand_type(em, arg)?);
    }
    let descriptor = em
        .ctx
        .mapper
        .method_descriptor(&arg_types, return_type)
        .map_err(|e| em.unsupported(e.to_string()))?;

    if let Some(receiver) = receiver {
        load_operand(em, receiver)?;
    }
    for arg in args {
        load_operand(em, arg)?;
    }

    em.emit(JasminInstr::Invoke {
        kind: invoke,
        owner,
        name: method.to_string(),
        descriptor,
        pops: usize::from(receiver.is_some()) + args.len(),
        pushes: usize::from(!return_type.is_void()),
    })
}

/// Push 0 or 1 for a comparison or logical expression
fn materialize_condition(em: &mut MethodEmitter, expr: &Instruction) -> BackendResult<()> {
    let on_true = em.fresh_label("cmp_true");
    let end = em.fresh_label("cmp_end");
    let depth = em.depth();

    lower_branch(em, expr, &on_true, true)?;
    em.emit(JasminInstr::Const(0))?;
    em.emit(JasminInstr::Goto(end.clone()))?;
    em.label(on_true)?;
    em.set_depth(depth);
    em.emit(JasminInstr::Const(1))?;
    em.label(end)
}

/// Jump to `target` when `cond` evaluates to `jump_when`, fall through otherwise
pub fn lower_branch(
    em: &mut MethodEmitter,
    cond: &Instruction,
    target: &str,
    jump_when: bool,
) -> BackendResult<()> {
    match cond {
        Instruction::BinaryOp { op, lhs, rhs, .. } if op.is_comparison() => {
            let cond = comparison(em, *op)?;
            let cond = if jump_when { cond } else { cond.negate() };
            let label = target.to_string();

            if rhs.as_literal() == Some(0) {
                load_operand(em, lhs)?;
                em.emit(JasminInstr::If { cond, label })
            } else if lhs.as_literal() == Some(0) {
                load_operand(em, rhs)?;
                em.emit(JasminInstr::If {
                    cond: cond.swapped(),
                    label,
                })
            } else {
                load_operand(em, lhs)?;
                load_operand(em, rhs)?;
                em.emit(JasminInstr::IfICmp { cond, label })
            }
        }

        Instruction::BinaryOp {
            op: BinaryOp::And,
            lhs,
            rhs,
            ..
        } => {
            if jump_when {
                let skip = em.fresh_label("and_skip");
                branch_on_operand(em, lhs, &skip, false)?;
                branch_on_operand(em, rhs, target, true)?;
                em.label(skip)
            } else {
                branch_on_operand(em, lhs, target, false)?;
                branch_on_operand(em, rhs, target, false)
            }
        }

        Instruction::BinaryOp {
            op: BinaryOp::Or,
            lhs,
            rhs,
            ..
        } => {
            if jump_when {
                branch_on_operand(em, lhs, target, true)?;
                branch_on_operand(em, rhs, target, true)
            } else {
                let skip = em.fresh_label("or_skip");
                branch_on_operand(em, lhs, &skip, true)?;
                branch_on_operand(em, rhs, target, false)?;
                em.label(skip)
            }
        }

        Instruction::UnaryOp {
            op: UnaryOp::Not,
            operand,
            ..
        } => branch_on_operand(em, operand, target, !jump_when),

        Instruction::SingleOperand(operand) => branch_on_operand(em, operand, target, jump_when),

        _ => {
            if cond.value_type().is_void() {
                return Err(em.malformed(format!("{} used as a condition", cond.kind_name())));
            }
            lower_value(em, cond)?;
            em.emit(JasminInstr::If {
                cond: if jump_when { Cond::Ne } else { Cond::Eq },
                label: target.to_string(),
            })
        }
    }
}

fn branch_on_operand(
    em: &mut MethodEmitter,
    operand: &Operand,
    target: &str,
    jump_when: bool,
) -> BackendResult<()> {
    if let Some(value) = operand.as_literal() {
        if (value != 0) == jump_when {
            em.emit(JasminInstr::Goto(target.to_string()))?;
        }
        return Ok(());
    }

    load_operand(em, operand)?;
    em.emit(JasminInstr::If {
        cond: if jump_when { Cond::Ne } else { Cond::Eq },
        label: target.to_string(),
    })
}

/// Push the value of an operand
pub fn load_operand(em: &mut MethodEmitter, operand: &Operand) -> BackendResult<()> {
    match operand {
        Operand::Literal { value, .. } => em.emit(JasminInstr::Const(*value)),
        Operand::This => {
            if em.method.is_static {
                return Err(em.malformed("`this` used in a static method"));
            }
            em.emit(JasminInstr::Load {
                kind: ValueKind::Ref,
                slot: 0,
            })
        }
        Operand::Variable {
            name, index: None, ..
        } => load_variable(em, name),
        Operand::Variable {
            name,
            index: Some(index),
            ..
        } => {
            let kind = load_array(em, name)?;
            load_operand(em, index)?;
            em.emit(JasminInstr::ArrayLoad(kind))
        }
    }
}

fn load_variable(em: &mut MethodEmitter, name: &str) -> BackendResult<()> {
    let descriptor = lookup(em, name)?;
    let kind = value_kind(em, &descriptor.ty)?;
    em.emit(JasminInstr::Load {
        kind,
        slot: descriptor.slot,
    })
}

/// Push an array reference and return the element family of its loads and stores
fn load_array(em: &mut MethodEmitter, name: &str) -> BackendResult<ArrayKind> {
    let descriptor = lookup(em, name)?;
    let kind = match &descriptor.ty {
        Type::ArrayOf(element) => match element.as_ref() {
            Type::Int32 => ArrayKind::Int,
            Type::Boolean => ArrayKind::Byte,
            Type::ArrayOf(_) | Type::ClassRef(_) => ArrayKind::Ref,
            Type::Void => return Err(em.unsupported("array of void")),
        },
        _ => {
            return Err(em.malformed(format!("`{}` is indexed but is not an array", name)));
        }
    };
    em.emit(JasminInstr::Load {
        kind: ValueKind::Ref,
        slot: descriptor.slot,
    })?;
    Ok(kind)
}

fn store_variable(em: &mut MethodEmitter, name: &str) -> BackendResult<()> {
    let descriptor = lookup(em, name)?;
    let kind = value_kind(em, &descriptor.ty)?;
    em.emit(JasminInstr::Store {
        kind,
        slot: descriptor.slot,
    })
}

fn lookup<'a>(em: &MethodEmitter<'a>, name: &str) -> BackendResult<&'a VariableDescriptor> {
    let var_table = em.var_table;
    var_table
        .get(name)
        .ok_or_else(|| em.malformed(format!("unknown variable `{}`", name)))
}

fn value_kind(em: &MethodEmitter, ty: &Type) -> BackendResult<ValueKind> {
    match ty {
        Type::Int32 | Type::Boolean => Ok(ValueKind::Int),
        Type::ArrayOf(_) | Type::ClassRef(_) => Ok(ValueKind::Ref),
        Type::Void => Err(em.unsupported("value of type void")),
    }
}

fn descriptor(em: &MethodEmitter, ty: &Type) -> BackendResult<String> {
    em.ctx
        .mapper
        .descriptor(ty)
        .map_err(|e| em.unsupported(e.to_string()))
}

fn operand_type(em: &MethodEmitter, operand: &Operand) -> BackendResult<Type> {
    match operand {
        Operand::This => Ok(Type::class(em.ctx.class_name.clone())),
        _ => operand
            .ty()
            .cloned()
            .ok_or_else(|| em.malformed(format!("untyped operand `{}`", operand))),
    }
}

/// Internal class name of an object operand
fn class_of(em: &MethodEmitter, object: &Operand) -> BackendResult<String> {
    match object {
        Operand::This => Ok(em.ctx.class_name.clone()),
        Operand::Variable {
            ty: Type::ClassRef(class),
            index: None,
            ..
        } => {
            if *class == em.ctx.class_name {
                Ok(class.clone())
            } else {
                Ok(em.ctx.mapper.qualify(class))
            }
        }
        _ => Err(em.malformed(format!("`{}` is not an object", object))),
    }
}

fn arith_op(em: &MethodEmitter, op: BinaryOp) -> BackendResult<ArithOp> {
    match op {
        BinaryOp::Add => Ok(ArithOp::Add),
        BinaryOp::Sub => Ok(ArithOp::Sub),
        BinaryOp::Mul => Ok(ArithOp::Mul),
        BinaryOp::Div => Ok(ArithOp::Div),
        BinaryOp::Lt
        | BinaryOp::Le
        | BinaryOp::Gt
        | BinaryOp::Ge
        | BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::And
        | BinaryOp::Or => Err(em.unsupported(format!("`{}` as an arithmetic operator", op))),
    }
}

fn comparison(em: &MethodEmitter, op: BinaryOp) -> BackendResult<Cond> {
    match op {
        BinaryOp::Lt => Ok(Cond::Lt),
        BinaryOp::Le => Ok(Cond::Le),
        BinaryOp::Gt => Ok(Cond::Gt),
        BinaryOp::Ge => Ok(Cond::Ge),
        BinaryOp::Eq => Ok(Cond::Eq),
        BinaryOp::Ne => Ok(Cond::Ne),
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::And
        | BinaryOp::Or => Err(em.unsupported(format!("`{}` as a comparison", op))),
    }
}
