//! The tree-walking evaluator (`spec.md` §4.6).
//!
//! `Interpreter` owns one field of real state, `environment`, which always
//! chains back to a single `globals` environment seeded with the native
//! `clock` at construction. Expression evaluation is strictly left-to-right;
//! statement execution is strictly top-to-bottom; short-circuit operators
//! never evaluate a right-hand side the left already decided (`spec.md` §5).

use std::rc::Rc;

use crate::ast::{Expr, Stmt};
use crate::diagnostics::Diagnostics;
use crate::environment::Environment;
use crate::token::TokenKind;
use crate::value::{NativeClock, UserFunction, Value};
use crate::RuntimeError;

/// Walks `Stmt`/`Expr` trees, mutating environments and producing output
/// and runtime errors.
pub struct Interpreter<'a> {
    globals: Environment,
    environment: Environment,
    diagnostics: &'a Diagnostics,
}

impl<'a> Interpreter<'a> {
    pub fn new(diagnostics: &'a Diagnostics) -> Self {
        let globals = Environment::new();
        globals.define("clock", Value::Callable(Rc::new(NativeClock)));
        Interpreter {
            environment: globals.clone(),
            globals,
            diagnostics,
        }
    }

    /// Executes a full statement list, reporting (but not propagating) the
    /// first runtime error it hits - a runtime error unwinds evaluation to
    /// here and never terminates the caller (`spec.md` §7).
    pub fn interpret(&mut self, statements: &[Stmt]) {
        for stmt in statements {
            if let Err(err) = self.execute(stmt) {
                self.diagnostics.runtime_error(&err);
                break;
            }
        }
    }

    // ---- statements ------------------------------------------------------

    fn execute(&mut self, stmt: &Stmt) -> Result<(), RuntimeError> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(())
            }
            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                println!("{value}");
                Ok(())
            }
            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                self.environment.define(&name.lexeme, value);
                Ok(())
            }
            Stmt::Block(statements) => self.execute_block(statements, Environment::with_enclosing(self.environment.clone())),
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute(then_branch)?;
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)?;
                }
                Ok(())
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.execute(body)?;
                }
                Ok(())
            }
            Stmt::Function(decl) => {
                let function = UserFunction::new(decl.clone(), self.globals.clone());
                self.environment.define(&decl.name.lexeme, Value::Callable(Rc::new(function)));
                Ok(())
            }
        }
    }

    /// Executes `statements` in `env`, then restores whatever environment
    /// was active before the call - on every exit path, including when a
    /// runtime error propagates out of the loop below (`spec.md` §5). The
    /// restore happens unconditionally before the captured result is
    /// returned, so an early error can't leak the child environment as
    /// "current".
    pub fn execute_block(&mut self, statements: &[Stmt], env: Environment) -> Result<(), RuntimeError> {
        let previous = std::mem::replace(&mut self.environment, env);
        let mut result = Ok(());
        for stmt in statements {
            result = self.execute(stmt);
            if result.is_err() {
                break;
            }
        }
        self.environment = previous;
        result
    }

    // ---- expressions -------------------------------------------------------

    fn evaluate(&mut self, expr: &Expr) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Grouping(inner) => self.evaluate(inner),
            Expr::Unary { op, right } => self.eval_unary(op, right),
            Expr::Binary { left, op, right } => self.eval_binary(left, op, right),
            Expr::Logical { left, op, right } => self.eval_logical(left, op, right),
            Expr::Variable { name } => self.environment.get(name),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;
                self.environment.assign(name, value.clone())?;
                Ok(value)
            }
            Expr::Call {
                callee,
                closing_paren,
                args,
            } => self.eval_call(callee, closing_paren, args),
        }
    }

    fn eval_unary(&mut self, op: &crate::token::Token, right: &Expr) -> Result<Value, RuntimeError> {
        let right = self.evaluate(right)?;
        match op.kind {
            TokenKind::Minus => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(RuntimeError::new(op.clone(), "Operand must be a number.".to_string())),
            },
            TokenKind::Bang => Ok(Value::Bool(!right.is_truthy())),
            _ => unreachable!("unary operator token kinds are limited to ! and - by the parser"),
        }
    }

    fn eval_binary(&mut self, left: &Expr, op: &crate::token::Token, right: &Expr) -> Result<Value, RuntimeError> {
        // Left, then right, strictly in that order (spec.md §5).
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        use TokenKind::*;
        match op.kind {
            Plus => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(RuntimeError::new(
                    op.clone(),
                    "Operands must be two numbers or two strings.".to_string(),
                )),
            },
            Minus => self.numeric_binop(op, left, right, |a, b| a - b),
            Star => self.numeric_binop(op, left, right, |a, b| a * b),
            Slash => self.numeric_binop(op, left, right, |a, b| a / b),
            Greater => self.comparison(op, left, right, |a, b| a > b),
            GreaterEqual => self.comparison(op, left, right, |a, b| a >= b),
            Less => self.comparison(op, left, right, |a, b| a < b),
            LessEqual => self.comparison(op, left, right, |a, b| a <= b),
            // Equality has no type check - spec.md §9 Open Question 2/5:
            // the reference's number-only check on == / != is a defect.
            BangEqual => Ok(Value::Bool(left != right)),
            EqualEqual => Ok(Value::Bool(left == right)),
            _ => unreachable!("binary operator token kinds are fixed by the parser"),
        }
    }

    fn numeric_binop(
        &self,
        op: &crate::token::Token,
        left: Value,
        right: Value,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(f(a, b))),
            _ => Err(RuntimeError::new(op.clone(), "Operands must be numbers.".to_string())),
        }
    }

    fn comparison(
        &self,
        op: &crate::token::Token,
        left: Value,
        right: Value,
        f: impl Fn(f64, f64) -> bool,
    ) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Bool(f(a, b))),
            _ => Err(RuntimeError::new(op.clone(), "Operands must be numbers.".to_string())),
        }
    }

    fn eval_logical(&mut self, left: &Expr, op: &crate::token::Token, right: &Expr) -> Result<Value, RuntimeError> {
        let left = self.evaluate(left)?;
        match op.kind {
            TokenKind::Or if left.is_truthy() => Ok(left),
            TokenKind::And if !left.is_truthy() => Ok(left),
            _ => self.evaluate(right),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        closing_paren: &crate::token::Token,
        arg_exprs: &[Expr],
    ) -> Result<Value, RuntimeError> {
        let callee = self.evaluate(callee)?;

        let mut args = Vec::with_capacity(arg_exprs.len());
        for arg in arg_exprs {
            args.push(self.evaluate(arg)?);
        }

        let Value::Callable(function) = callee else {
            return Err(RuntimeError::new(
                closing_paren.clone(),
                "Can only call functions and classes.".to_string(),
            ));
        };

        if args.len() != function.arity() {
            return Err(RuntimeError::new(
                closing_paren.clone(),
                format!("Expected {} arguments, but got {}.", function.arity(), args.len()),
            ));
        }

        tracing::trace!(name = function.name(), args = args.len(), "calling function");
        function.call(self, args)
    }
}
