//! Structured error types for the parser and interpreter.
//!
//! Both taxonomies from `spec.md` §7 carry the data the `Diagnostics` sink
//! needs to format them, expressed with `thiserror` rather than hand-rolled
//! `Display` impls - the idiom the rest of this crate's surrounding
//! ecosystem (CLI error types, config errors) uses throughout.

use thiserror::Error;

use crate::token::Token;

/// A runtime error: an offending token (for line info) and a message.
/// Unwinds evaluation to the top-level `Interpreter::interpret` call, which
/// reports it and sets `had_runtime_error` (`spec.md` §7).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct RuntimeError {
    pub token: Token,
    pub message: String,
}

impl RuntimeError {
    pub fn new(token: Token, message: String) -> Self {
        RuntimeError { token, message }
    }
}

/// Internal panic-mode signal raised while parsing an expression.
///
/// This carries no data: by the time it's raised, the offending token has
/// already been reported to the `Diagnostics` sink (`spec.md` §4.3). It
/// exists purely so `?` can unwind the parser up to the `declaration`
/// boundary, where `synchronize` consumes it.
#[derive(Debug, Clone, Copy, Error)]
#[error("parse error")]
pub struct ParseError;
