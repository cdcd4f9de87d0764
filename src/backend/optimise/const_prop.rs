//! Constant Propagation Passes
//!
//! Replaces reads of variables known to hold a literal by the literal.
//!
//! # Algorithm
//!
//! Block-local propagation (`propagate_block_local`), forward within each
//! straight-line region:
//! 1. Track `ConstMap: BTreeMap<String, i32>` of variables last assigned a literal
//! 2. For each instruction:
//!    - Clear the map if a label marks the instruction (control may join here)
//!    - Replace reads with known literals
//!    - Record `x := literal`, forget `x` on any other assignment
//!    - Clear the map after a branch, jump or return
//!
//! Single-assignment propagation (`propagate_single_assignments`), method-wide:
//! a local assigned exactly once, with a literal, and never indexed, holds
//! that literal wherever it can legally be read.

use crate::backend::ir::{Instruction, InstrId, Method, NewTarget, Operand, Scope};
use std::collections::{BTreeMap, BTreeSet};

/// Variable name → literal value
type ConstMap = BTreeMap<String, i32>;

/// Apply block-local constant propagation to a method
///
/// Returns true if any changes were made
pub fn propagate_block_local(method: &mut Method) -> bool {
    let mut changed = false;
    let mut constants = ConstMap::new();
    let label_targets: BTreeSet<InstrId> = method.labels.values().copied().collect();

    for (i, instr) in method.instructions.iter_mut().enumerate() {
        if label_targets.contains(&InstrId(i)) {
            constants.clear();
        }

        changed |= substitute(instr, &|name| constants.get(name).copied());

        match instr {
            Instruction::Assign {
                dest: Operand::Variable {
                    name, index: None, ..
                },
                rhs,
                ..
            } => match &**rhs {
                Instruction::SingleOperand(Operand::Literal { value, .. }) => {
                    constants.insert(name.clone(), *value);
                }
                _ => {
                    constants.remove(name.as_str());
                }
            },
            Instruction::CondBranch { .. } | Instruction::Goto { .. } | Instruction::Return { .. } => {
                constants.clear();
            }
            _ => {}
        }
    }

    changed
}

/// Propagate locals that are assigned a literal exactly once
///
/// Returns true if any changes were made
pub fn propagate_single_assignments(method: &mut Method) -> bool {
    let mut assignments: BTreeMap<&str, usize> = BTreeMap::new();
    let mut literal: BTreeMap<&str, i32> = BTreeMap::new();
    let mut indexed: BTreeSet<&str> = BTreeSet::new();

    for instr in &method.instructions {
        if let Instruction::Assign {
            dest: Operand::Variable {
                name, index: None, ..
            },
            rhs,
            ..
        } = instr
        {
            *assignments.entry(name.as_str()).or_default() += 1;
            if let Instruction::SingleOperand(Operand::Literal { value, .. }) = &**rhs {
                literal.insert(name.as_str(), *value);
            }
        }
        for operand in instr.operands() {
            if let Operand::Variable {
                name,
                index: Some(_),
                ..
            } = operand
            {
                indexed.insert(name.as_str());
            }
        }
    }

    let constants: ConstMap = literal
        .into_iter()
        .filter(|(name, _)| assignments.get(name) == Some(&1))
        .filter(|(name, _)| !indexed.contains(name))
        .filter(|(name, _)| {
            method
                .var_table
                .get(name)
                .is_some_and(|d| d.scope == Scope::Local)
        })
        .map(|(name, value)| (name.to_string(), value))
        .collect();

    if constants.is_empty() {
        return false;
    }

    let mut changed = false;
    for instr in &mut method.instructions {
        changed |= substitute(instr, &|name| constants.get(name).copied());
    }
    changed
}

/// Replace every read of a known variable in an instruction
///
/// Simple destinations are writes and stay untouched; the index of an
/// element destination is a read.
fn substitute(instr: &mut Instruction, lookup: &impl Fn(&str) -> Option<i32>) -> bool {
    match instr {
        Instruction::Assign { dest, rhs, .. } => {
            let mut changed = false;
            if let Operand::Variable {
                index: Some(index), ..
            } = dest
            {
                changed |= substitute_operand(index, lookup);
            }
            changed | substitute(rhs, lookup)
        }
        Instruction::BinaryOp { lhs, rhs, .. } => {
            substitute_operand(lhs, lookup) | substitute_operand(rhs, lookup)
        }
        Instruction::UnaryOp { operand, .. } => substitute_operand(operand, lookup),
        Instruction::Call { args, .. } => args
            .iter_mut()
            .fold(false, |changed, arg| substitute_operand(arg, lookup) | changed),
        Instruction::New {
            target: NewTarget::Array { size, .. },
            ..
        } => substitute_operand(size, lookup),
        Instruction::Return {
            value: Some(value), ..
        } => substitute_operand(value, lookup),
        Instruction::PutField { value, .. } => substitute_operand(value, lookup),
        Instruction::CondBranch { cond, .. } => substitute(cond, lookup),
        Instruction::SingleOperand(operand) => substitute_operand(operand, lookup),
        // Object operands (receivers, field owners, arrays) are never literals
        Instruction::New { .. }
        | Instruction::Return { value: None, .. }
        | Instruction::GetField { .. }
        | Instruction::Goto { .. }
        | Instruction::ArrayLength { .. } => false,
    }
}

fn substitute_operand(operand: &mut Operand, lookup: &impl Fn(&str) -> Option<i32>) -> bool {
    match operand {
        Operand::Variable {
            index: Some(index), ..
        } => substitute_operand(index, lookup),
        Operand::Variable {
            name,
            ty,
            index: None,
        } => match lookup(name) {
            Some(value) if !ty.is_reference() => {
                *operand = Operand::Literal {
                    value,
                    ty: ty.clone(),
                };
                true
            }
            _ => false,
        },
        Operand::Literal { .. } | Operand::This => false,
    }
}
