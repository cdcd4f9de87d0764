//! Method Builder
//!
//! Assembles a `Method` from an instruction list and its labels. This is
//! where the pieces an upstream lowering stage would normally provide are
//! derived:
//!
//! - the successor lists of the control-flow graph
//! - the initial descriptor table: receiver at slot 0, parameters in
//!   declaration order, then locals in order of first appearance

use super::instr::{InstrId, Instruction, Operand, THIS};
use super::method::{AccessModifier, Cfg, Method, Param, Scope, VarTable, VariableDescriptor};
use crate::backend::error::{BackendError, BackendResult};
use crate::common::types::Type;
use std::collections::BTreeMap;

/// Incremental builder for a method
#[derive(Debug)]
pub struct MethodBuilder {
    class: String,
    name: String,
    access: AccessModifier,
    is_static: bool,
    is_constructor: bool,
    params: Vec<Param>,
    return_type: Type,
    instructions: Vec<Instruction>,
    labels: BTreeMap<String, InstrId>,
    pending_labels: Vec<String>,
}

impl MethodBuilder {
    pub fn new(class: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            name: name.into(),
            access: AccessModifier::Public,
            is_static: false,
            is_constructor: false,
            params: Vec::new(),
            return_type: Type::Void,
            instructions: Vec::new(),
            labels: BTreeMap::new(),
            pending_labels: Vec::new(),
        }
    }

    pub fn access(mut self, access: AccessModifier) -> Self {
        self.access = access;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn constructor(mut self) -> Self {
        self.is_constructor = true;
        self
    }

    pub fn param(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.params.push(Param {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn returns(mut self, ty: Type) -> Self {
        self.return_type = ty;
        self
    }

    /// Attach a label to the next instruction pushed (or to the end of the method)
    pub fn label(&mut self, label: impl Into<String>) -> &mut Self {
        self.pending_labels.push(label.into());
        self
    }

    pub fn push(&mut self, instr: Instruction) -> InstrId {
        let id = InstrId(self.instructions.len());
        for label in self.pending_labels.drain(..) {
            self.labels.insert(label, id);
        }
        self.instructions.push(instr);
        id
    }

    /// Chaining form of `push` for fixtures
    pub fn with(mut self, instr: Instruction) -> Self {
        self.push(instr);
        self
    }

    pub fn build(mut self) -> BackendResult<Method> {
        let end = InstrId(self.instructions.len());
        for label in self.pending_labels.drain(..) {
            self.labels.insert(label, end);
        }

        let cfg = build_cfg(&self.name, &self.instructions, &self.labels)?;
        let var_table = build_var_table(
            &self.class,
            &self.name,
            self.is_static,
            &self.params,
            &self.instructions,
        )?;

        Ok(Method {
            name: self.name,
            access: self.access,
            is_static: self.is_static,
            is_constructor: self.is_constructor,
            params: self.params,
            return_type: self.return_type,
            var_table,
            instructions: self.instructions,
            labels: self.labels,
            cfg,
        })
    }
}

/// Build the successor lists of a method
///
/// Jumps to a label at the end of the method lead to the exit node and are
/// therefore left out, like falling off the last instruction.
pub fn build_cfg(
    method: &str,
    instructions: &[Instruction],
    labels: &BTreeMap<String, InstrId>,
) -> BackendResult<Cfg> {
    let len = instructions.len();
    let mut successors = Vec::with_capacity(len);

    for (i, instr) in instructions.iter().enumerate() {
        let mut succs = Vec::new();

        if instr.falls_through() && i + 1 < len {
            succs.push(InstrId(i + 1));
        }

        if let Some(label) = instr.branch_target() {
            let target = labels.get(label).copied().ok_or_else(|| {
                BackendError::malformed(method, format!("jump to undefined label `{}`", label))
            })?;
            if target.0 < len && !succs.contains(&target) {
                succs.push(target);
            }
        }

        successors.push(succs);
    }

    Ok(Cfg { successors })
}

/// Build the initial descriptor table of a method
pub fn build_var_table(
    class: &str,
    method: &str,
    is_static: bool,
    params: &[Param],
    instructions: &[Instruction],
) -> BackendResult<VarTable> {
    let mut table = VarTable::new();
    let mut next_slot = 0;

    if !is_static {
        table.insert(VariableDescriptor {
            name: THIS.to_string(),
            scope: Scope::Receiver,
            slot: 0,
            ty: Type::class(class),
        });
        next_slot = 1;
    }

    for param in params {
        if table.contains(&param.name) {
            return Err(BackendError::malformed(
                method,
                format!("parameter `{}` declared twice", param.name),
            ));
        }
        table.insert(VariableDescriptor {
            name: param.name.clone(),
            scope: Scope::Parameter,
            slot: next_slot,
            ty: param.ty.clone(),
        });
        next_slot += 1;
    }

    for instr in instructions {
        for operand in instr.operands() {
            declare_locals(operand, &mut table, &mut next_slot);
        }
    }

    Ok(table)
}

fn declare_locals(operand: &Operand, table: &mut VarTable, next_slot: &mut usize) {
    if let Operand::Variable { name, ty, index } = operand {
        if !table.contains(name) {
            let ty = match index {
                Some(_) => Type::array_of(ty.clone()),
                None => ty.clone(),
            };
            table.insert(VariableDescriptor {
                name: name.clone(),
                scope: Scope::Local,
                slot: *next_slot,
                ty,
            });
            *next_slot += 1;
        }
        if let Some(index) = index {
            declare_locals(index, table, next_slot);
        }
    }
}
