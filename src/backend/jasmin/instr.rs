//! Jasmin instructions
//!
//! The subset of JVM instructions the emitter selects, with their textual
//! form and their effect on the operand stack.

use std::fmt;

/// Which family of load/store/return/array instructions a value uses
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueKind {
    /// `int` and `boolean` values (`i` prefix)
    Int,
    /// Arrays and object references (`a` prefix)
    Ref,
}

impl ValueKind {
    fn prefix(self) -> &'static str {
        match self {
            ValueKind::Int => "i",
            ValueKind::Ref => "a",
        }
    }
}

/// Element family of the array load/store instructions
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArrayKind {
    /// `int[]` (`iaload`/`iastore`)
    Int,
    /// `boolean[]`, stored as bytes (`baload`/`bastore`)
    Byte,
    /// Arrays of references (`aaload`/`aastore`)
    Ref,
}

impl ArrayKind {
    fn prefix(self) -> &'static str {
        match self {
            ArrayKind::Int => "i",
            ArrayKind::Byte => "b",
            ArrayKind::Ref => "a",
        }
    }
}

/// Integer arithmetic and bitwise operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Xor,
}

impl ArithOp {
    fn mnemonic(self) -> &'static str {
        match self {
            ArithOp::Add => "iadd",
            ArithOp::Sub => "isub",
            ArithOp::Mul => "imul",
            ArithOp::Div => "idiv",
            ArithOp::Neg => "ineg",
            ArithOp::Xor => "ixor",
        }
    }
}

/// Branch conditions of the `if<cond>` and `if_icmp<cond>` families
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cond {
    /// The condition that holds exactly when this one does not
    pub fn negate(self) -> Cond {
        match self {
            Cond::Eq => Cond::Ne,
            Cond::Ne => Cond::Eq,
            Cond::Lt => Cond::Ge,
            Cond::Le => Cond::Gt,
            Cond::Gt => Cond::Le,
            Cond::Ge => Cond::Lt,
        }
    }

    /// The condition that holds with the operands swapped
    pub fn swapped(self) -> Cond {
        match self {
            Cond::Lt => Cond::Gt,
            Cond::Le => Cond::Ge,
            Cond::Gt => Cond::Lt,
            Cond::Ge => Cond::Le,
            other => other,
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Le => "le",
            Cond::Gt => "gt",
            Cond::Ge => "ge",
        };
        write!(f, "{}", name)
    }
}

/// Method invocation opcodes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvokeKind {
    Static,
    Virtual,
    Special,
}

/// Jasmin instructions
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JasminInstr {
    /// Label definition, printed at column 0
    Label(String),

    /// Push an integer constant; the encoding is picked from the value
    Const(i32),
    Load { kind: ValueKind, slot: usize },
    Store { kind: ValueKind, slot: usize },
    Iinc { slot: usize, delta: i32 },

    Arith(ArithOp),

    ArrayLoad(ArrayKind),
    ArrayStore(ArrayKind),
    ArrayLength,
    /// `newarray <primitive>`
    NewArray(&'static str),
    /// `anewarray <class>`
    ANewArray(String),
    New(String),

    GetField {
        owner: String,
        name: String,
        descriptor: String,
    },
    PutField {
        owner: String,
        name: String,
        descriptor: String,
    },

    Invoke {
        kind: InvokeKind,
        owner: String,
        name: String,
        descriptor: String,
        /// Receiver plus arguments
        pops: usize,
        /// 1 for non-void methods
        pushes: usize,
    },

    /// `if<cond>`: compare the top of the stack with zero
    If { cond: Cond, label: String },
    /// `if_icmp<cond>`: compare the two topmost values
    IfICmp { cond: Cond, label: String },
    Goto(String),

    Return(Option<ValueKind>),
    Pop,
}

impl JasminInstr {
    /// Number of operand stack entries consumed
    pub fn pops(&self) -> usize {
        match self {
            JasminInstr::Label(_)
            | JasminInstr::Const(_)
            | JasminInstr::Load { .. }
            | JasminInstr::Iinc { .. }
            | JasminInstr::New(_)
            | JasminInstr::Goto(_)
            | JasminInstr::Return(None) => 0,
            JasminInstr::Store { .. }
            | JasminInstr::Arith(ArithOp::Neg)
            | JasminInstr::ArrayLength
            | JasminInstr::NewArray(_)
            | JasminInstr::ANewArray(_)
            | JasminInstr::GetField { .. }
            | JasminInstr::If { .. }
            | JasminInstr::Return(Some(_))
            | JasminInstr::Pop => 1,
            JasminInstr::Arith(_)
            | JasminInstr::ArrayLoad(_)
            | JasminInstr::PutField { .. }
            | JasminInstr::IfICmp { .. } => 2,
            JasminInstr::ArrayStore(_) => 3,
            JasminInstr::Invoke { pops, .. } => *pops,
        }
    }

    /// Number of operand stack entries produced
    pub fn pushes(&self) -> usize {
        match self {
            JasminInstr::Const(_)
            | JasminInstr::Load { .. }
            | JasminInstr::Arith(_)
            | JasminInstr::ArrayLoad(_)
            | JasminInstr::ArrayLength
            | JasminInstr::NewArray(_)
            | JasminInstr::ANewArray(_)
            | JasminInstr::New(_)
            | JasminInstr::GetField { .. } => 1,
            JasminInstr::Invoke { pushes, .. } => *pushes,
            JasminInstr::Label(_)
            | JasminInstr::Store { .. }
            | JasminInstr::Iinc { .. }
            | JasminInstr::ArrayStore(_)
            | JasminInstr::PutField { .. }
            | JasminInstr::If { .. }
            | JasminInstr::IfICmp { .. }
            | JasminInstr::Goto(_)
            | JasminInstr::Return(_)
            | JasminInstr::Pop => 0,
        }
    }

    /// Local variable slot read or written, if any
    pub fn slot(&self) -> Option<usize> {
        match self {
            JasminInstr::Load { slot, .. }
            | JasminInstr::Store { slot, .. }
            | JasminInstr::Iinc { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn is_label(&self) -> bool {
        matches!(self, JasminInstr::Label(_))
    }
}

/// `_n` short forms exist for slots 0 to 3
fn slot_suffix(slot: usize) -> String {
    if slot < 4 {
        format!("_{}", slot)
    } else {
        format!(" {}", slot)
    }
}

impl fmt::Display for JasminInstr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            JasminInstr::Label(label) => write!(f, "{}:", label),
            JasminInstr::Const(value) => match *value {
                -1 => write!(f, "iconst_m1"),
                0..=5 => write!(f, "iconst_{}", value),
                -128..=127 => write!(f, "bipush {}", value),
                -32768..=32767 => write!(f, "sipush {}", value),
                _ => write!(f, "ldc {}", value),
            },
            JasminInstr::Load { kind, slot } => {
                write!(f, "{}load{}", kind.prefix(), slot_suffix(*slot))
            }
            JasminInstr::Store { kind, slot } => {
                write!(f, "{}store{}", kind.prefix(), slot_suffix(*slot))
            }
            JasminInstr::Iinc { slot, delta } => write!(f, "iinc {} {}", slot, delta),
            JasminInstr::Arith(op) => write!(f, "{}", op.mnemonic()),
            JasminInstr::ArrayLoad(kind) => write!(f, "{}aload", kind.prefix()),
            JasminInstr::ArrayStore(kind) => write!(f, "{}astore", kind.prefix()),
            JasminInstr::ArrayLength => write!(f, "arraylength"),
            JasminInstr::NewArray(element) => write!(f, "newarray {}", element),
            JasminInstr::ANewArray(class) => write!(f, "anewarray {}", class),
            JasminInstr::New(class) => write!(f, "new {}", class),
            JasminInstr::GetField {
                owner,
                name,
                descriptor,
            } => write!(f, "getfield {}/{} {}", owner, name, descriptor),
            JasminInstr::PutField {
                owner,
                name,
                descriptor,
            } => write!(f, "putfield {}/{} {}", owner, name, descriptor),
            JasminInstr::Invoke {
                kind,
                owner,
                name,
                descriptor,
                ..
            } => {
                let opcode = match kind {
                    InvokeKind::Static => "invokestatic",
                    InvokeKind::Virtual => "invokevirtual",
                    InvokeKind::Special => "invokespecial",
                };
                write!(f, "{} {}/{}{}", opcode, owner, name, descriptor)
            }
            JasminInstr::If { cond, label } => write!(f, "if{} {}", cond, label),
            JasminInstr::IfICmp { cond, label } => write!(f, "if_icmp{} {}", cond, label),
            JasminInstr::Goto(label) => write!(f, "goto {}", label),
            JasminInstr::Return(None) => write!(f, "return"),
            JasminInstr::Return(Some(kind)) => write!(f, "{}return", kind.prefix()),
            JasminInstr::Pop => write!(f, "pop"),
        }
    }
}
