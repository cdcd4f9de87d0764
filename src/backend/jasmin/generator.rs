//! Jasmin Generation Implementation
//!
//! This module holds the per-method emission state and assembles methods
//! into class files.
//!
//! # Overview
//!
//! The generation process:
//! 1. Select instructions for every IR instruction (see `isel`), tracking the
//!    operand stack depth and the local slots touched along the way
//! 2. Close the method with a `return` if a void method can fall off its end
//! 3. Wrap the code in `.method` with the exact `.limit stack` and
//!    `.limit locals` values
//!
//! A method that fails is reported and produces no text at all.

use super::descriptor::DescriptorMapper;
use super::instr::JasminInstr;
use super::isel;
use crate::backend::error::{BackendError, BackendResult};
use crate::backend::ir::{ClassUnit, Method, VarTable};
use std::collections::BTreeSet;
use std::fmt;

/// Class-level information shared by every method of a class
#[derive(Clone, Debug)]
pub struct EmitContext {
    pub class_name: String,
    /// Internal name of the superclass
    pub super_class: String,
    pub mapper: DescriptorMapper,
}

impl EmitContext {
    pub fn new(class: &ClassUnit) -> Self {
        let mapper = DescriptorMapper::new(&class.imports);
        Self {
            class_name: class.name.clone(),
            super_class: mapper.super_class(class.super_class.as_deref()),
            mapper,
        }
    }
}

/// Fresh label names, numbered per method
#[derive(Clone, Debug, Default)]
pub struct LabelGen {
    next: usize,
    /// Names already taken by the IR
    reserved: BTreeSet<String>,
}

impl LabelGen {
    pub fn new(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            next: 0,
            reserved: reserved.into_iter().collect(),
        }
    }

    pub fn fresh(&mut self, prefix: &str) -> String {
        loop {
            let label = format!("{}_{}", prefix, self.next);
            self.next += 1;
            if !self.reserved.contains(&label) {
                return label;
            }
        }
    }
}

/// Emission state of one method
pub struct MethodEmitter<'a> {
    pub ctx: &'a EmitContext,
    pub method: &'a Method,
    pub var_table: &'a VarTable,
    code: Vec<JasminInstr>,
    depth: usize,
    max_depth: usize,
    max_slot: Option<usize>,
    labels: LabelGen,
}

impl<'a> MethodEmitter<'a> {
    pub fn new(ctx: &'a EmitContext, method: &'a Method, var_table: &'a VarTable) -> Self {
        Self {
            ctx,
            method,
            var_table,
            code: Vec::new(),
            depth: 0,
            max_depth: 0,
            max_slot: None,
            labels: LabelGen::new(method.labels.keys().cloned()),
        }
    }

    /// Append an instruction, updating the stack depth and the slot high-water mark
    pub fn emit(&mut self, instr: JasminInstr) -> BackendResult<()> {
        let pops = instr.pops();
        if pops > self.depth {
            return Err(self.malformed(format!(
                "`{}` needs {} operand(s) but the stack holds {}",
                instr, pops, self.depth
            )));
        }
        self.depth = self.depth - pops + instr.pushes();
        self.max_depth = self.max_depth.max(self.depth);

        if let Some(slot) = instr.slot() {
            self.max_slot = Some(self.max_slot.map_or(slot, |max| max.max(slot)));
        }

        self.code.push(instr);
        Ok(())
    }

    pub fn label(&mut self, label: impl Into<String>) -> BackendResult<()> {
        self.emit(JasminInstr::Label(label.into()))
    }

    pub fn fresh_label(&mut self, prefix: &str) -> String {
        self.labels.fresh(prefix)
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Reset the depth at a join point reached by a jump
    pub fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    pub fn unsupported(&self, construct: impl Into<String>) -> BackendError {
        BackendError::unsupported(&self.method.name, construct)
    }

    pub fn malformed(&self, reason: impl Into<String>) -> BackendError {
        BackendError::malformed(&self.method.name, reason)
    }

    /// Wrap up the emitted code with its header and limits
    pub fn finish(self) -> BackendResult<JasminMethod> {
        let method = self.method;
        let params = method.params.iter().map(|p| &p.ty);
        let descriptor = self
            .ctx
            .mapper
            .method_descriptor(params, &method.return_type)
            .map_err(|e| self.unsupported(e.to_string()))?;

        let mut header = Vec::new();
        let access = method.access.to_string();
        if !access.is_empty() {
            header.push(access);
        }
        if method.is_static {
            header.push("static".to_string());
        }
        header.push(format!("{}{}", method.name, descriptor));

        let max_locals = self
            .max_slot
            .map_or(0, |slot| slot + 1)
            .max(method.precolored_slots());

        Ok(JasminMethod {
            name: method.name.clone(),
            header: header.join(" "),
            code: self.code,
            max_stack: self.max_depth,
            max_locals,
        })
    }
}

/// Emit one method with the given (allocated) descriptor table
pub fn emit_method(
    ctx: &EmitContext,
    method: &Method,
    var_table: &VarTable,
) -> BackendResult<JasminMethod> {
    let mut emitter = MethodEmitter::new(ctx, method, var_table);
    isel::lower_method(&mut emitter)?;
    let jasmin = emitter.finish()?;

    log::debug!(
        "emitted `{}`: {} instruction(s), stack {}, locals {}",
        jasmin.name,
        jasmin.code.iter().filter(|i| !i.is_label()).count(),
        jasmin.max_stack,
        jasmin.max_locals
    );
    Ok(jasmin)
}

/// A method in Jasmin form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JasminMethod {
    pub name: String,
    /// Everything after `.method`: access, `static`, name and descriptor
    pub header: String,
    pub code: Vec<JasminInstr>,
    pub max_stack: usize,
    pub max_locals: usize,
}

impl fmt::Display for JasminMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, ".method {}", self.header)?;
        writeln!(f, "    .limit stack {}", self.max_stack)?;
        writeln!(f, "    .limit locals {}", self.max_locals)?;
        for instr in &self.code {
            if instr.is_label() {
                writeln!(f, "{}", instr)?;
            } else {
                writeln!(f, "    {}", instr)?;
            }
        }
        writeln!(f, ".end method")
    }
}

/// A class in Jasmin form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JasminClass {
    pub name: String,
    pub super_class: String,
    /// (name, descriptor)
    pub fields: Vec<(String, String)>,
    pub methods: Vec<JasminMethod>,
}

impl JasminClass {
    /// Class header with fields; methods are added as they are emitted
    pub fn new(ctx: &EmitContext, class: &ClassUnit) -> BackendResult<Self> {
        let fields = class
            .fields
            .iter()
            .map(|field| {
                let descriptor = ctx
                    .mapper
                    .descriptor(&field.ty)
                    .map_err(|e| BackendError::unsupported(&class.name, e.to_string()))?;
                Ok((field.name.clone(), descriptor))
            })
            .collect::<BackendResult<Vec<_>>>()?;

        Ok(Self {
            name: class.name.clone(),
            super_class: ctx.super_class.clone(),
            fields,
            methods: Vec::new(),
        })
    }
}

impl fmt::Display for JasminClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, ".class public {}", self.name)?;
        writeln!(f, ".super {}", self.super_class)?;
        if !self.fields.is_empty() {
            writeln!(f)?;
        }
        for (name, descriptor) in &self.fields {
            writeln!(f, ".field public '{}' {}", name, descriptor)?;
        }

        // The one constructor every class gets
        writeln!(f)?;
        writeln!(f, ".method public <init>()V")?;
        writeln!(f, "    aload_0")?;
        writeln!(f, "    invokespecial {}/<init>()V", self.super_class)?;
        writeln!(f, "    return")?;
        writeln!(f, ".end method")?;

        for method in &self.methods {
            writeln!(f)?;
            write!(f, "{}", method)?;
        }
        Ok(())
    }
}

/// Emit a whole class, each method with the descriptor table it carries
///
/// Every method is attempted. When any of them fails, all errors are
/// returned and no class text is produced. Constructors in the IR are
/// skipped in favour of the default constructor.
pub fn emit_class(class: &ClassUnit) -> Result<JasminClass, Vec<BackendError>> {
    let ctx = EmitContext::new(class);
    let mut jasmin = JasminClass::new(&ctx, class).map_err(|e| vec![e])?;
    let mut errors = Vec::new();

    for method in class.methods.iter().filter(|m| !m.is_constructor) {
        match emit_method(&ctx, method, &method.var_table) {
            Ok(emitted) => jasmin.methods.push(emitted),
            Err(e) => {
                log::debug!("emission of `{}` failed: {}", method.name, e);
                errors.push(e);
            }
        }
    }

    if errors.is_empty() {
        Ok(jasmin)
    } else {
        Err(errors)
    }
}
