//! Compiler configuration
//!
//! The options recognised by the backend. They arrive either as the
//! string map handed over by the surrounding compiler framework
//! (`"optimize"`, `"registerAllocation"`, `"extra"`) or from the CLI.

use std::collections::HashMap;
use thiserror::Error;

pub const OPTIMIZE: &str = "optimize";
pub const REGISTER_ALLOCATION: &str = "registerAllocation";
pub const EXTRA: &str = "extra";

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("option `{key}` expects a boolean, found `{value}`")]
    NotABool { key: String, value: String },
    #[error("option `{key}` expects an integer, found `{value}`")]
    NotAnInteger { key: String, value: String },
}

/// Backend configuration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CompilerConfig {
    /// IR constant folding and block-local constant propagation
    pub optimize: bool,
    /// Register budget. `None` or a negative value keeps the upstream slots,
    /// `0` allocates without a cap, `n > 0` allocates and enforces `n`.
    pub register_allocation: Option<i32>,
    /// Method-wide constant propagation on top of `optimize`
    pub extra: bool,
}

impl CompilerConfig {
    pub fn from_map(map: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let flag = |key: &str| -> Result<bool, ConfigError> {
            match map.get(key).map(|v| v.trim()) {
                None => Ok(false),
                Some("true") => Ok(true),
                Some("false") => Ok(false),
                Some(other) => Err(ConfigError::NotABool {
                    key: key.to_string(),
                    value: other.to_string(),
                }),
            }
        };

        let register_allocation = match map.get(REGISTER_ALLOCATION) {
            None => None,
            Some(value) => Some(value.trim().parse::<i32>().map_err(|_| {
                ConfigError::NotAnInteger {
                    key: REGISTER_ALLOCATION.to_string(),
                    value: value.clone(),
                }
            })?),
        };

        Ok(Self {
            optimize: flag(OPTIMIZE)?,
            register_allocation,
            extra: flag(EXTRA)?,
        })
    }

    /// Budget to allocate against, `None` when allocation is not requested
    pub fn register_budget(&self) -> Option<usize> {
        self.register_allocation
            .and_then(|budget| usize::try_from(budget).ok())
    }
}
