//! Java-- IR
//!
//! The intermediate representation consumed by the backend: classes,
//! methods as flat instruction arenas with index-based control flow, and
//! per-method variable descriptor tables.

pub mod builder;
pub mod instr;
pub mod method;

pub use builder::MethodBuilder;
pub use instr::{
    BinaryOp, CallKind, FieldRef, InstrId, Instruction, NewTarget, Operand, THIS, UnaryOp,
};
pub use method::{
    AccessModifier, Cfg, ClassUnit, Field, Method, Param, Scope, VarTable, VariableDescriptor,
};
