//! IR types
//!
//! The value types of the Java-- IR. Every operand, field, parameter and
//! variable descriptor carries one of these.

use std::fmt;

/// Type of an IR value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Type {
    Int32,
    Boolean,
    ArrayOf(Box<Type>),
    ClassRef(String),
    Void,
}

impl Type {
    pub fn array_of(element: Type) -> Self {
        Type::ArrayOf(Box::new(element))
    }

    pub fn class(name: impl Into<String>) -> Self {
        Type::ClassRef(name.into())
    }

    /// Arrays and class references live in reference slots (`aload`/`astore`)
    pub fn is_reference(&self) -> bool {
        matches!(self, Type::ArrayOf(_) | Type::ClassRef(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    /// Element type of an array, `None` for anything else
    pub fn element(&self) -> Option<&Type> {
        match self {
            Type::ArrayOf(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Type::Int32 => write!(f, "i32"),
            Type::Boolean => write!(f, "bool"),
            Type::ArrayOf(element) => write!(f, "array.{}", element),
            Type::ClassRef(name) => write!(f, "{}", name),
            Type::Void => write!(f, "V"),
        }
    }
}
