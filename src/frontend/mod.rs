//! IR Text Reader
//!
//! Reads the textual form of the Java-- IR into a `ClassUnit`:
//!
//! ```text
//! Source (&str) ──lexer──▶ Vec<Spanned<Token>> ──class_parser──▶ ClassUnit
//! ```
//!
//! Method bodies are turned into instruction lists with their CFG and
//! initial descriptor table while parsing, so a jump to an undefined label
//! is reported as a syntax error pointing at the method.

pub mod lexer;
pub mod parser;
pub mod report;

#[cfg(test)]
mod tests;

use crate::backend::ir::ClassUnit;
use crate::common::span::Span;
use chumsky::error::Rich;
use chumsky::prelude::*;
use std::fmt;
use thiserror::Error;

/// A lexing or parsing failure, detached from the source lifetime
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct SyntaxError {
    pub message: String,
    pub span: Span,
    /// Token text found at the error position, `None` at end of input
    pub found: Option<String>,
    pub expected: Vec<String>,
}

impl SyntaxError {
    fn from_rich<T: fmt::Display>(error: &Rich<'_, T, Span>) -> Self {
        Self {
            message: error.to_string(),
            span: *error.span(),
            found: error.found().map(|t| t.to_string()),
            expected: error.expected().map(|e| e.to_string()).collect(),
        }
    }
}

/// Read a class from IR text
pub fn parse_class(source: &str) -> Result<ClassUnit, Vec<SyntaxError>> {
    let tokens = lexer::lexer()
        .parse(source)
        .into_result()
        .map_err(|errors| errors.iter().map(SyntaxError::from_rich).collect::<Vec<_>>())?;
    log::trace!("lexed {} token(s)", tokens.len());

    let eoi = (source.len()..source.len()).into();
    let token_stream = tokens.as_slice().map(eoi, |(t, s)| (t, s));
    let class = parser::class_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errors| errors.iter().map(SyntaxError::from_rich).collect::<Vec<_>>())?;

    log::debug!(
        "parsed class `{}`: {} field(s), {} method(s)",
        class.name,
        class.fields.len(),
        class.methods.len()
    );
    Ok(class)
}
