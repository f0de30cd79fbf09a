//! # sprig
//!
//! A tree-walking interpreter for a small dynamically-typed,
//! lexically-scoped, expression-oriented scripting language.
//!
//! The pipeline, leaves first:
//!
//! - [`token`] / [`lexer`]: the token contract and a hand-written scanner.
//! - [`ast`]: the `Expr`/`Stmt` sum types the parser produces.
//! - [`parser`]: a recursive-descent parser with panic-mode error recovery.
//! - [`environment`]: lexically chained name→value scopes.
//! - [`value`]: the runtime value domain and the callable contract.
//! - [`interpreter`]: the tree-walking evaluator.
//! - [`diagnostics`]: the process-wide static/runtime error sink.
//!
//! # Example
//!
//! ```rust
//! use sprig::{run, Diagnostics};
//!
//! let diagnostics = Diagnostics::new();
//! run("print 1 + 2;", &diagnostics);
//! assert!(!diagnostics.had_error());
//! assert!(!diagnostics.had_runtime_error());
//! ```

pub mod ast;
pub mod diagnostics;
pub mod environment;
mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod token;
pub mod value;

pub use diagnostics::Diagnostics;
pub use environment::Environment;
pub use error::{ParseError, RuntimeError};
pub use interpreter::Interpreter;
pub use lexer::Lexer;
pub use parser::Parser;
pub use token::{Token, TokenKind};
pub use value::Value;

/// Scans, parses, and, only if no static error was recorded, interprets
/// `source`, reusing `diagnostics` as the sink for every stage.
///
/// This is the entry point both the REPL and the file runner use
/// (`spec.md` §6): a file run calls it once over the whole file, a REPL
/// session calls it once per line against the same `Diagnostics` and a
/// session-long `Interpreter` it owns itself (see `src/bin/sprig.rs`).
pub fn run(source: &str, diagnostics: &Diagnostics) {
    let mut interpreter = Interpreter::new(diagnostics);
    run_in(source, diagnostics, &mut interpreter);
}

/// Like [`run`], but against a caller-supplied `Interpreter` so state (the
/// global environment) persists across multiple calls - what the REPL
/// needs between lines.
pub fn run_in(source: &str, diagnostics: &Diagnostics, interpreter: &mut Interpreter) {
    let tokens = Lexer::new(source, diagnostics).scan_tokens();
    let statements = Parser::new(tokens, diagnostics).parse();

    if diagnostics.had_error() {
        return;
    }

    interpreter.interpret(&statements);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program_exits_clean_with_no_output() {
        let diagnostics = Diagnostics::new();
        run("", &diagnostics);
        assert!(!diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());
    }

    #[test]
    fn static_error_skips_interpretation() {
        let diagnostics = Diagnostics::new();
        run("1+;", &diagnostics);
        assert!(diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());
    }

    #[test]
    fn repl_style_reuse_persists_globals_across_calls() {
        let diagnostics = Diagnostics::new();
        let mut interpreter = Interpreter::new(&diagnostics);
        run_in("var a = 1;", &diagnostics, &mut interpreter);
        run_in("print a;", &diagnostics, &mut interpreter);
        assert!(!diagnostics.had_error());
        assert!(!diagnostics.had_runtime_error());
    }
}
