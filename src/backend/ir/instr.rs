//! IR instructions and operands
//!
//! This module defines the three-address instruction set handed to the
//! backend. The set is closed: liveness, the optimiser and the emitter all
//! match on it exhaustively.

use crate::common::types::Type;
use std::fmt;

/// Name of the receiver for dataflow purposes
pub const THIS: &str = "this";

/// Index of a top-level instruction in its method
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstrId(pub usize);

impl fmt::Display for InstrId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An instruction operand
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operand {
    /// Typed constant; booleans are 0 or 1
    Literal { value: i32, ty: Type },
    /// Named variable, or an element of an array variable when `index` is set.
    /// `ty` is the type of the value read, so the element type for elements.
    Variable {
        name: String,
        ty: Type,
        index: Option<Box<Operand>>,
    },
    /// The receiver of an instance method
    This,
}

impl Operand {
    pub fn int(value: i32) -> Self {
        Operand::Literal {
            value,
            ty: Type::Int32,
        }
    }

    pub fn boolean(value: bool) -> Self {
        Operand::Literal {
            value: value as i32,
            ty: Type::Boolean,
        }
    }

    pub fn var(name: impl Into<String>, ty: Type) -> Self {
        Operand::Variable {
            name: name.into(),
            ty,
            index: None,
        }
    }

    pub fn element(name: impl Into<String>, index: Operand, ty: Type) -> Self {
        Operand::Variable {
            name: name.into(),
            ty,
            index: Some(Box::new(index)),
        }
    }

    /// Name used for dataflow identity, `None` for literals
    pub fn name(&self) -> Option<&str> {
        match self {
            Operand::Literal { .. } => None,
            Operand::Variable { name, .. } => Some(name),
            Operand::This => Some(THIS),
        }
    }

    pub fn as_literal(&self) -> Option<i32> {
        match self {
            Operand::Literal { value, .. } => Some(*value),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Operand::Variable { index: Some(_), .. })
    }

    /// Type of the value this operand evaluates to (`None` for `this`)
    pub fn ty(&self) -> Option<&Type> {
        match self {
            Operand::Literal { ty, .. } | Operand::Variable { ty, .. } => Some(ty),
            Operand::This => None,
        }
    }

    /// Every variable read when this operand is evaluated
    pub fn reads<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Operand::Literal { .. } => {}
            Operand::Variable { name, index, .. } => {
                out.push(name);
                if let Some(index) = index {
                    index.reads(out);
                }
            }
            Operand::This => out.push(THIS),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Literal { value, ty } => write!(f, "{}.{}", value, ty),
            Operand::Variable {
                name,
                ty,
                index: None,
            } => write!(f, "{}.{}", name, ty),
            Operand::Variable {
                name,
                ty,
                index: Some(index),
            } => write!(f, "{}[{}].{}", name, index, ty),
            Operand::This => write!(f, "this"),
        }
    }
}

/// Binary operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    And,
    Or,
}

impl BinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq | BinaryOp::Ne
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }

    /// The comparison that holds with the operands swapped (`a < b` ⇔ `b > a`)
    pub fn swapped(self) -> BinaryOp {
        match self {
            BinaryOp::Lt => BinaryOp::Gt,
            BinaryOp::Le => BinaryOp::Ge,
            BinaryOp::Gt => BinaryOp::Lt,
            BinaryOp::Ge => BinaryOp::Le,
            other => other,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let symbol = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

/// Unary operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Not => write!(f, "!"),
            UnaryOp::Neg => write!(f, "-"),
        }
    }
}

/// A class field named by a get/put instruction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldRef {
    pub name: String,
    pub ty: Type,
}

/// Call dispatch shapes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CallKind {
    /// `invokestatic`, the owner is a class name
    Static { class: String },
    /// `invokevirtual` on the receiver operand
    Virtual,
    /// `invokespecial`, used for constructor delegation (`<init>`)
    Special,
}

/// What a `new` instruction allocates
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NewTarget {
    Object { class: String },
    Array { element: Type, size: Operand },
}

/// IR instructions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Instruction {
    /// dest := rhs
    Assign {
        dest: Operand,
        ty: Type,
        rhs: Box<Instruction>,
    },

    /// lhs op rhs
    BinaryOp {
        op: BinaryOp,
        lhs: Operand,
        rhs: Operand,
        ty: Type,
    },

    /// op operand
    UnaryOp {
        op: UnaryOp,
        operand: Operand,
        ty: Type,
    },

    /// Method call; `receiver` is `None` only for static calls
    Call {
        kind: CallKind,
        receiver: Option<Operand>,
        method: String,
        args: Vec<Operand>,
        return_type: Type,
    },

    /// Object or array allocation
    New { target: NewTarget, ty: Type },

    /// ret value
    Return { value: Option<Operand>, ty: Type },

    /// object.field := value
    PutField {
        object: Operand,
        field: FieldRef,
        value: Operand,
    },

    /// object.field
    GetField { object: Operand, field: FieldRef },

    /// if (cond) goto label
    CondBranch {
        cond: Box<Instruction>,
        label: String,
    },

    /// goto label
    Goto { label: String },

    /// arraylength(array)
    ArrayLength { array: Operand },

    /// A bare operand used as a value
    SingleOperand(Operand),
}

impl Instruction {
    pub fn assign(dest: Operand, rhs: Instruction) -> Self {
        let ty = dest.ty().cloned().unwrap_or(Type::Void);
        Instruction::Assign {
            dest,
            ty,
            rhs: Box::new(rhs),
        }
    }

    pub fn binary(op: BinaryOp, lhs: Operand, rhs: Operand) -> Self {
        let ty = if op.is_comparison() || op.is_logical() {
            Type::Boolean
        } else {
            Type::Int32
        };
        Instruction::BinaryOp { op, lhs, rhs, ty }
    }

    pub fn branch(cond: Instruction, label: impl Into<String>) -> Self {
        Instruction::CondBranch {
            cond: Box::new(cond),
            label: label.into(),
        }
    }

    pub fn goto(label: impl Into<String>) -> Self {
        Instruction::Goto {
            label: label.into(),
        }
    }

    pub fn ret(value: Option<Operand>) -> Self {
        let ty = value
            .as_ref()
            .and_then(|v| v.ty().cloned())
            .unwrap_or(Type::Void);
        Instruction::Return { value, ty }
    }

    /// Short name of the instruction kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Instruction::Assign { .. } => "assign",
            Instruction::BinaryOp { .. } => "binary operation",
            Instruction::UnaryOp { .. } => "unary operation",
            Instruction::Call { .. } => "call",
            Instruction::New { .. } => "new",
            Instruction::Return { .. } => "return",
            Instruction::PutField { .. } => "putfield",
            Instruction::GetField { .. } => "getfield",
            Instruction::CondBranch { .. } => "conditional branch",
            Instruction::Goto { .. } => "goto",
            Instruction::ArrayLength { .. } => "arraylength",
            Instruction::SingleOperand(_) => "single operand",
        }
    }

    /// Label this instruction may jump to
    pub fn branch_target(&self) -> Option<&str> {
        match self {
            Instruction::CondBranch { label, .. } | Instruction::Goto { label } => Some(label),
            _ => None,
        }
    }

    /// Whether control can continue with the next instruction
    pub fn falls_through(&self) -> bool {
        !matches!(self, Instruction::Goto { .. } | Instruction::Return { .. })
    }

    /// Type of the value the instruction leaves behind when used as an expression
    pub fn value_type(&self) -> Type {
        match self {
            Instruction::BinaryOp { ty, .. }
            | Instruction::UnaryOp { ty, .. }
            | Instruction::New { ty, .. } => ty.clone(),
            Instruction::Call { return_type, .. } => return_type.clone(),
            Instruction::GetField { field, .. } => field.ty.clone(),
            Instruction::ArrayLength { .. } => Type::Int32,
            Instruction::SingleOperand(op) => op.ty().cloned().unwrap_or(Type::Void),
            Instruction::Assign { .. }
            | Instruction::Return { .. }
            | Instruction::PutField { .. }
            | Instruction::CondBranch { .. }
            | Instruction::Goto { .. } => Type::Void,
        }
    }

    /// Every operand the instruction mentions, destination included
    pub fn operands(&self) -> Vec<&Operand> {
        match self {
            Instruction::Assign { dest, rhs, .. } => {
                let mut ops = vec![dest];
                ops.extend(rhs.operands());
                ops
            }
            Instruction::BinaryOp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::UnaryOp { operand, .. } => vec![operand],
            Instruction::Call { receiver, args, .. } => receiver.iter().chain(args).collect(),
            Instruction::New { target, .. } => match target {
                NewTarget::Object { .. } => vec![],
                NewTarget::Array { size, .. } => vec![size],
            },
            Instruction::Return { value, .. } => value.iter().collect(),
            Instruction::PutField { object, value, .. } => vec![object, value],
            Instruction::GetField { object, .. } => vec![object],
            Instruction::CondBranch { cond, .. } => cond.operands(),
            Instruction::Goto { .. } => vec![],
            Instruction::ArrayLength { array } => vec![array],
            Instruction::SingleOperand(op) => vec![op],
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Assign { dest, ty, rhs } => write!(f, "{} :=.{} {}", dest, ty, rhs),
            Instruction::BinaryOp { op, lhs, rhs, ty } => {
                write!(f, "{} {}.{} {}", lhs, op, ty, rhs)
            }
            Instruction::UnaryOp { op, operand, ty } => write!(f, "{}.{} {}", op, ty, operand),
            Instruction::Call {
                kind,
                receiver,
                method,
                args,
                return_type,
            } => {
                match kind {
                    CallKind::Static { class } => write!(f, "invokestatic({}", class)?,
                    CallKind::Virtual => write!(f, "invokevirtual(")?,
                    CallKind::Special => write!(f, "invokespecial(")?,
                }
                if let Some(receiver) = receiver {
                    write!(f, "{}", receiver)?;
                }
                write!(f, ", \"{}\"", method)?;
                for arg in args {
                    write!(f, ", {}", arg)?;
                }
                write!(f, ").{}", return_type)
            }
            Instruction::New { target, ty } => match target {
                NewTarget::Object { class } => write!(f, "new({}).{}", class, ty),
                NewTarget::Array { size, .. } => write!(f, "new(array, {}).{}", size, ty),
            },
            Instruction::Return { value: Some(v), ty } => write!(f, "ret.{} {}", ty, v),
            Instruction::Return { value: None, ty } => write!(f, "ret.{}", ty),
            Instruction::PutField {
                object,
                field,
                value,
            } => write!(
                f,
                "putfield({}, {}.{}, {}).V",
                object, field.name, field.ty, value
            ),
            Instruction::GetField { object, field } => write!(
                f,
                "getfield({}, {}.{}).{}",
                object, field.name, field.ty, field.ty
            ),
            Instruction::CondBranch { cond, label } => write!(f, "if ({}) goto {}", cond, label),
            Instruction::Goto { label } => write!(f, "goto {}", label),
            Instruction::ArrayLength { array } => write!(f, "arraylength({}).i32", array),
            Instruction::SingleOperand(op) => write!(f, "{}", op),
        }
    }
}
