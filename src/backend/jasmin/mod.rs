//! IR to Jasmin Code Generation
//!
//! This module translates allocated IR methods into Jasmin, the textual
//! assembly language of the JVM.
//!
//! # Overview
//!
//! The code generation process:
//! 1. Map IR types to JVM descriptors (`descriptor`)
//! 2. Select stack-machine instructions for each IR instruction (`isel`)
//! 3. Track stack depth and local slots to declare exact limits, then
//!    assemble methods into a class with its default constructor (`generator`)

pub mod descriptor;
mod generator;
pub mod instr;
pub mod isel;

#[cfg(test)]
mod tests;

pub use descriptor::{DescriptorMapper, UnmappableType};
pub use generator::{
    EmitContext, JasminClass, JasminMethod, LabelGen, MethodEmitter, emit_class, emit_method,
};
pub use instr::{ArithOp, ArrayKind, Cond, InvokeKind, JasminInstr, ValueKind};
