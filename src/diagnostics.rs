//! The process-wide error sink (`spec.md` §2/§7).
//!
//! `Diagnostics` is the one place static and runtime errors are reported.
//! It owns the `had_error`/`had_runtime_error` flags the CLI driver reads to
//! pick an exit code, and it is the *only* thing allowed to print the exact
//! wire-format error strings `spec.md` §6 specifies - that format is a test
//! oracle, so it is written directly with `eprintln!` rather than through a
//! `tracing` layer, whose formatting is not ours to control.

use std::cell::Cell;

use crate::token::{Token, TokenKind};
use crate::RuntimeError;

/// Collects whether any static or runtime error has been observed so far.
#[derive(Debug, Default)]
pub struct Diagnostics {
    had_error: Cell<bool>,
    had_runtime_error: Cell<bool>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Diagnostics::default()
    }

    pub fn had_error(&self) -> bool {
        self.had_error.get()
    }

    pub fn had_runtime_error(&self) -> bool {
        self.had_runtime_error.get()
    }

    /// Clears the static-error flag between REPL lines so one bad line
    /// doesn't poison the rest of the session (runtime errors are never
    /// fatal to the REPL either way - `spec.md` §6/§7).
    pub fn reset_static(&self) {
        self.had_error.set(false);
    }

    /// Reports a scanner error at a raw line number (used before any token
    /// exists to attach the message to).
    pub fn error(&self, line: usize, message: &str) {
        self.report(line, "", message);
        tracing::debug!(line, message, "static error");
    }

    /// Reports a parser error at a specific token, per the `" at end"` /
    /// `" at '<lexeme>'"` location format of `spec.md` §6.
    pub fn error_at(&self, token: &Token, message: &str) {
        let location = if token.kind == TokenKind::Eof {
            " at end".to_string()
        } else {
            format!(" at '{}'", token.lexeme)
        };
        self.report(token.line, &location, message);
        tracing::debug!(line = token.line, message, "static error");
    }

    fn report(&self, line: usize, location: &str, message: &str) {
        eprintln!("[line {line}] Error{location}: {message}");
        self.had_error.set(true);
    }

    /// Reports a runtime error per the `"MSG\n[line L]"` format of
    /// `spec.md` §6.
    pub fn runtime_error(&self, error: &RuntimeError) {
        eprintln!("{}\n[line {}]", error.message, error.token.line);
        self.had_runtime_error.set(true);
        tracing::debug!(line = error.token.line, message = %error.message, "runtime error");
    }
}
