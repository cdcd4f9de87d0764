//! Methods, classes and variable descriptors
//!
//! A method owns a flat arena of instructions. Control flow is an index
//! graph over that arena: each instruction lists the `InstrId`s of its
//! successors, and the implicit exit node is simply never listed.

use super::instr::{InstrId, Instruction};
use crate::common::types::Type;
use std::collections::BTreeMap;
use std::fmt;

/// Where a variable comes from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scope {
    Receiver,
    Parameter,
    Local,
}

impl Scope {
    /// Receiver and parameters have fixed slots
    pub fn is_precolored(self) -> bool {
        !matches!(self, Scope::Local)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scope::Receiver => write!(f, "receiver"),
            Scope::Parameter => write!(f, "parameter"),
            Scope::Local => write!(f, "local"),
        }
    }
}

/// A variable's storage slot and type
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariableDescriptor {
    pub name: String,
    pub scope: Scope,
    pub slot: usize,
    pub ty: Type,
}

/// Descriptor table of a method, keyed by variable name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VarTable {
    entries: BTreeMap<String, VariableDescriptor>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, descriptor: VariableDescriptor) {
        self.entries.insert(descriptor.name.clone(), descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&VariableDescriptor> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.get(name).map(|d| d.slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariableDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct slots in use
    pub fn slots_used(&self) -> usize {
        self.iter().map(|d| d.slot + 1).max().unwrap_or(0)
    }
}

impl fmt::Display for VarTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_by(|a, b| a.slot.cmp(&b.slot).then_with(|| a.name.cmp(&b.name)));
        for d in rows {
            writeln!(f, "  {:>3}  {:<10} {:<9} {}", d.slot, d.name, d.scope, d.ty)?;
        }
        Ok(())
    }
}

/// Access modifier of a method or field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AccessModifier {
    Public,
    Private,
    Protected,
    #[default]
    Default,
}

impl fmt::Display for AccessModifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AccessModifier::Public => write!(f, "public"),
            AccessModifier::Private => write!(f, "private"),
            AccessModifier::Protected => write!(f, "protected"),
            AccessModifier::Default => Ok(()),
        }
    }
}

/// A method parameter
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// Successor lists of a method's instructions
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cfg {
    pub successors: Vec<Vec<InstrId>>,
}

impl Cfg {
    pub fn successors(&self, id: InstrId) -> &[InstrId] {
        self.successors.get(id.0).map_or(&[], |s| s.as_slice())
    }
}

/// A method ready for the backend
#[derive(Clone, Debug)]
pub struct Method {
    pub name: String,
    pub access: AccessModifier,
    pub is_static: bool,
    pub is_constructor: bool,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub var_table: VarTable,
    pub instructions: Vec<Instruction>,
    /// Label → instruction it marks. A label may equal `instructions.len()`,
    /// marking the end of the method.
    pub labels: BTreeMap<String, InstrId>,
    pub cfg: Cfg,
}

impl Method {
    pub fn instr(&self, id: InstrId) -> &Instruction {
        &self.instructions[id.0]
    }

    pub fn ids(&self) -> impl DoubleEndedIterator<Item = InstrId> + use<> {
        (0..self.instructions.len()).map(InstrId)
    }

    pub fn successors(&self, id: InstrId) -> &[InstrId] {
        self.cfg.successors(id)
    }

    /// Labels marking the given position, in name order
    pub fn labels_at(&self, id: InstrId) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .filter(move |(_, target)| **target == id)
            .map(|(label, _)| label.as_str())
    }

    /// Slots taken by the receiver and the parameters
    pub fn precolored_slots(&self) -> usize {
        usize::from(!self.is_static) + self.params.len()
    }
}

/// A class field
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
    pub access: AccessModifier,
}

/// One compilation unit
#[derive(Clone, Debug)]
pub struct ClassUnit {
    pub name: String,
    pub super_class: Option<String>,
    pub imports: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl ClassUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            super_class: None,
            imports: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}
