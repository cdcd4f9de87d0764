//! Backend errors
//!
//! Every failure of the backend is fatal for the method it occurs in and is
//! never retried: the algorithms are deterministic, so running them again on
//! the same input gives the same answer.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The coloring needs more registers than the configured budget
    #[error(
        "method `{method}` needs {required} extra registers but only {available} are available"
    )]
    AllocationInfeasible {
        method: String,
        required: usize,
        available: usize,
    },

    /// No emission rule exists for an instruction, operator or type
    #[error("unsupported construct in method `{method}`: {construct}")]
    UnsupportedConstruct { method: String, construct: String },

    /// The IR breaks a contract the upstream stages promise to keep
    #[error("malformed IR in method `{method}`: {reason}")]
    MalformedIr { method: String, reason: String },
}

impl BackendError {
    pub fn unsupported(method: &str, construct: impl Into<String>) -> Self {
        BackendError::UnsupportedConstruct {
            method: method.to_string(),
            construct: construct.into(),
        }
    }

    pub fn malformed(method: &str, reason: impl Into<String>) -> Self {
        BackendError::MalformedIr {
            method: method.to_string(),
            reason: reason.into(),
        }
    }

    /// Name of the method the error belongs to
    pub fn method(&self) -> &str {
        match self {
            BackendError::AllocationInfeasible { method, .. }
            | BackendError::UnsupportedConstruct { method, .. }
            | BackendError::MalformedIr { method, .. } => method,
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
