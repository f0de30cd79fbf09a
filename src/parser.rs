//! Recursive-descent parser with panic-mode error recovery (`spec.md` §4.3).
//!
//! The grammar below is transcribed directly from the specification,
//! lowest to highest precedence. Every `consume` of a required token that
//! fails reports to the `Diagnostics` sink with the offending token's line
//! and the fixed message `spec.md` §6 names; the parser itself never
//! prints and never throws across the `declaration` boundary.

use std::rc::Rc;

use crate::ast::{Expr, FunctionDecl, Stmt};
use crate::diagnostics::Diagnostics;
use crate::token::{Token, TokenKind};
use crate::ParseError;

/// Parses a complete token stream into a list of statements.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    diagnostics: &'a Diagnostics,
}

type ParseResult<T> = Result<T, ParseError>;

impl<'a> Parser<'a> {
    pub fn new(tokens: Vec<Token>, diagnostics: &'a Diagnostics) -> Self {
        Parser {
            tokens,
            current: 0,
            diagnostics,
        }
    }

    /// `program → declaration* EOF`
    pub fn parse(mut self) -> Vec<Stmt> {
        let mut statements = Vec::new();
        while !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        tracing::trace!(count = statements.len(), "parsed statements");
        statements
    }

    // ---- declarations ----------------------------------------------------

    /// `declaration → funDecl | varDecl | statement`
    ///
    /// Catches `ParseError`, synchronizes, and yields `None` for that
    /// statement so the top-level loop simply skips it (`spec.md` §4.3).
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(&[TokenKind::Fun]) {
            self.function("function")
        } else if self.matches(&[TokenKind::Var]) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(ParseError) => {
                self.synchronize();
                None
            }
        }
    }

    /// `function → IDENTIFIER "(" parameters? ")" block`
    fn function(&mut self, kind: &str) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, &format!("Expect {kind} name."))?;
        self.consume(TokenKind::LeftParen, &format!("Expect '(' after {kind} name."))?;

        let mut params = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if params.len() >= 255 {
                    self.error_at_current("Can't have more than 255 parameters.");
                }
                params.push(self.consume(TokenKind::Identifier, "Expect parameter name.")?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        self.consume(TokenKind::RightParen, "Expect ')' after parameters.")?;

        self.consume(TokenKind::LeftBrace, &format!("Expect '{{' before {kind} body."))?;
        let body = self.block()?;

        Ok(Stmt::Function(Rc::new(FunctionDecl { name, params, body })))
    }

    /// `varDecl → "var" IDENTIFIER ( "=" expression )? ";"`
    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "Expect variable name.")?;
        let initializer = if self.matches(&[TokenKind::Equal]) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after variable declaration.")?;
        Ok(Stmt::Var { name, initializer })
    }

    // ---- statements --------------------------------------------------------

    /// `statement → exprStmt | forStmt | ifStmt | printStmt | whileStmt | block`
    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(&[TokenKind::For]) {
            return self.for_statement();
        }
        if self.matches(&[TokenKind::If]) {
            return self.if_statement();
        }
        if self.matches(&[TokenKind::Print]) {
            return self.print_statement();
        }
        if self.matches(&[TokenKind::While]) {
            return self.while_statement();
        }
        if self.matches(&[TokenKind::LeftBrace]) {
            return Ok(Stmt::Block(self.block()?));
        }
        self.expression_statement()
    }

    /// `printStmt → "print" expression ";"`
    fn print_statement(&mut self) -> ParseResult<Stmt> {
        let value = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ; after value.")?;
        Ok(Stmt::Print(value))
    }

    /// `exprStmt → expression ";"`
    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expr = self.expression()?;
        self.consume(TokenKind::Semicolon, "Expected ; after expression.")?;
        Ok(Stmt::Expression(expr))
    }

    /// `block → "{" declaration* "}"`
    fn block(&mut self) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        while !self.check(TokenKind::RightBrace) && !self.is_at_end() {
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }
        self.consume(TokenKind::RightBrace, "Expect '}' after block.")?;
        Ok(statements)
    }

    /// `ifStmt → "if" "(" expression ")" statement ( "else" statement )?`
    fn if_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after if condition.")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(&[TokenKind::Else]) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `whileStmt → "while" "(" expression ")" statement`
    fn while_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expected '(' after while.")?;
        let condition = self.expression()?;
        self.consume(TokenKind::RightParen, "Expect ')' after condition.")?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While { condition, body })
    }

    /// `forStmt → "for" "(" ( varDecl | exprStmt | ";" ) expression? ";" expression? ")" statement`
    ///
    /// Desugared at parse time into a `while` loop (`spec.md` §4.3
    /// Desugaring) so the interpreter needs no `For` variant at all.
    fn for_statement(&mut self) -> ParseResult<Stmt> {
        self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.")?;

        let initializer = if self.matches(&[TokenKind::Semicolon]) {
            None
        } else if self.matches(&[TokenKind::Var]) {
            Some(self.var_declaration()?)
        } else {
            Some(self.expression_statement()?)
        };

        let condition = if !self.check(TokenKind::Semicolon) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.")?;

        let increment = if !self.check(TokenKind::RightParen) {
            Some(self.expression()?)
        } else {
            None
        };
        self.consume(TokenKind::RightParen, "Expect ')' after for clauses.")?;

        let mut body = self.statement()?;

        if let Some(increment) = increment {
            body = Stmt::Block(vec![body, Stmt::Expression(increment)]);
        }

        let condition = condition.unwrap_or(Expr::Literal(crate::value::Value::Bool(true)));
        body = Stmt::While {
            condition,
            body: Box::new(body),
        };

        if let Some(initializer) = initializer {
            body = Stmt::Block(vec![initializer, body]);
        }

        Ok(body)
    }

    // ---- expressions --------------------------------------------------------

    /// `expression → assignment`
    fn expression(&mut self) -> ParseResult<Expr> {
        self.assignment()
    }

    /// `assignment → IDENTIFIER "=" assignment | logic_or`
    ///
    /// Parses an `or`-expression first; on seeing `=`, recursively parses
    /// the right-hand side and, only if the left-hand side parsed as a
    /// `Variable`, emits `Assign`. Any other left-hand side reports
    /// `"Invalid assignment target."` but is *not* a `ParseError` - parsing
    /// continues, yielding the right-hand side's value as the result
    /// (`spec.md` §4.3 Assignment semantics).
    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.or()?;

        if self.matches(&[TokenKind::Equal]) {
            let equals = self.previous().clone();
            let value = self.assignment()?;

            if let Expr::Variable { name } = expr {
                return Ok(Expr::Assign {
                    name,
                    value: Box::new(value),
                });
            }

            self.diagnostics.error_at(&equals, "Invalid assignment target.");
            return Ok(value);
        }

        Ok(expr)
    }

    /// `logic_or → logic_and ( "or" logic_and )*`
    fn or(&mut self) -> ParseResult<Expr> {
        let mut expr = self.and()?;
        while self.matches(&[TokenKind::Or]) {
            let op = self.previous().clone();
            let right = self.and()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// `logic_and → equality ( "and" equality )*`
    fn and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;
        while self.matches(&[TokenKind::And]) {
            let op = self.previous().clone();
            let right = self.equality()?;
            expr = Expr::Logical {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// `equality → comparison ( ( "!=" | "==" ) comparison )*`
    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_left_assoc(Self::comparison, &[TokenKind::BangEqual, TokenKind::EqualEqual])
    }

    /// `comparison → term ( ( ">" | ">=" | "<" | "<=" ) term )*`
    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_left_assoc(
            Self::term,
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
        )
    }

    /// `term → factor ( ( "-" | "+" ) factor )*`
    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_left_assoc(Self::factor, &[TokenKind::Minus, TokenKind::Plus])
    }

    /// `factor → unary ( ( "/" | "*" ) unary )*`
    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_left_assoc(Self::unary, &[TokenKind::Slash, TokenKind::Star])
    }

    /// Shared left-associative binary-operator loop used by `equality`
    /// through `factor` - they differ only in their operand rule and their
    /// operator set.
    fn binary_left_assoc(
        &mut self,
        mut operand: impl FnMut(&mut Self) -> ParseResult<Expr>,
        kinds: &[TokenKind],
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;
        while self.matches(kinds) {
            let op = self.previous().clone();
            let right = operand(self)?;
            expr = Expr::Binary {
                left: Box::new(expr),
                op,
                right: Box::new(right),
            };
        }
        Ok(expr)
    }

    /// `unary → ( "!" | "-" ) unary | call`
    fn unary(&mut self) -> ParseResult<Expr> {
        if self.matches(&[TokenKind::Bang, TokenKind::Minus]) {
            let op = self.previous().clone();
            let right = self.unary()?;
            return Ok(Expr::Unary {
                op,
                right: Box::new(right),
            });
        }
        self.call()
    }

    /// `call → primary ( "(" arguments? ")" )*`
    fn call(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            if self.matches(&[TokenKind::LeftParen]) {
                expr = self.finish_call(expr)?;
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// `arguments → expression ( "," expression )*`
    fn finish_call(&mut self, callee: Expr) -> ParseResult<Expr> {
        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            loop {
                if args.len() >= 255 {
                    self.error_at_current("Can't have more than 255 arguments.");
                }
                args.push(self.expression()?);
                if !self.matches(&[TokenKind::Comma]) {
                    break;
                }
            }
        }
        let closing_paren = self.consume(TokenKind::RightParen, "Expect ')' after arguments.")?;
        Ok(Expr::Call {
            callee: Box::new(callee),
            closing_paren,
            args,
        })
    }

    /// `primary → NUMBER | STRING | "true" | "false" | "nil" | "(" expression ")" | IDENTIFIER`
    fn primary(&mut self) -> ParseResult<Expr> {
        use crate::value::Value;

        if self.matches(&[TokenKind::False]) {
            return Ok(Expr::Literal(Value::Bool(false)));
        }
        if self.matches(&[TokenKind::True]) {
            return Ok(Expr::Literal(Value::Bool(true)));
        }
        if self.matches(&[TokenKind::Nil]) {
            return Ok(Expr::Literal(Value::Nil));
        }
        if self.matches(&[TokenKind::Number, TokenKind::String]) {
            let literal = self.previous().literal.clone().expect("scanner always attaches a literal");
            return Ok(Expr::Literal(literal));
        }
        if self.matches(&[TokenKind::Identifier]) {
            return Ok(Expr::Variable {
                name: self.previous().clone(),
            });
        }
        if self.matches(&[TokenKind::LeftParen]) {
            let expr = self.expression()?;
            self.consume(TokenKind::RightParen, "Expect ')' after expression.")?;
            return Ok(Expr::Grouping(Box::new(expr)));
        }

        Err(self.error_at_current("Expect expression."))
    }

    // ---- token stream helpers ------------------------------------------

    fn matches(&mut self, kinds: &[TokenKind]) -> bool {
        for kind in kinds {
            if self.check(*kind) {
                self.advance();
                return true;
            }
        }
        false
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current - 1]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> ParseResult<Token> {
        if self.check(kind) {
            return Ok(self.advance().clone());
        }
        Err(self.error_at_current(message))
    }

    fn error_at_current(&self, message: &str) -> ParseError {
        self.diagnostics.error_at(self.peek(), message);
        ParseError
    }

    /// Discards tokens until it has just consumed a `;`, or the next token
    /// starts a new statement (`spec.md` §4.3 Error recovery).
    fn synchronize(&mut self) {
        self.advance();
        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Semicolon {
                return;
            }
            match self.peek().kind {
                TokenKind::Class
                | TokenKind::Fun
                | TokenKind::Var
                | TokenKind::For
                | TokenKind::If
                | TokenKind::While
                | TokenKind::Print
                | TokenKind::Return => return,
                _ => {
                    self.advance();
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::lexer::Lexer;
    use crate::value::Value;

    fn parse(source: &str) -> (Vec<Stmt>, Diagnostics) {
        let diagnostics = Diagnostics::new();
        let tokens = Lexer::new(source, &diagnostics).scan_tokens();
        let statements = Parser::new(tokens, &diagnostics).parse();
        (statements, diagnostics)
    }

    #[test]
    fn parses_arithmetic_with_correct_precedence() {
        let (stmts, diagnostics) = parse("1 + 2 * 3;");
        assert!(!diagnostics.had_error());
        match &stmts[0] {
            Stmt::Expression(Expr::Binary { op, .. }) => assert_eq!(op.kind, TokenKind::Plus),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn deeply_nested_grouping_parses() {
        let (stmts, diagnostics) = parse("((((1))));");
        assert!(!diagnostics.had_error());
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn missing_expression_reports_expect_expression() {
        let (_, diagnostics) = parse("1+;");
        assert!(diagnostics.had_error());
    }

    #[test]
    fn invalid_assignment_target_recovers() {
        let (stmts, diagnostics) = parse("(a)=1;");
        assert!(diagnostics.had_error());
        // Parsing continues: we still get one expression statement out.
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn for_loop_desugars_to_a_while_with_no_for_variant() {
        let (stmts, diagnostics) = parse("for (var i = 0; i < 3; i = i + 1) print i;");
        assert!(!diagnostics.had_error());
        match &stmts[0] {
            Stmt::Block(inner) => {
                assert!(matches!(inner[0], Stmt::Var { .. }));
                assert!(matches!(inner[1], Stmt::While { .. }));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn arity_over_255_params_is_reported_but_not_fatal() {
        let params: Vec<String> = (0..300).map(|i| format!("p{i}")).collect();
        let source = format!("fun f({}) {{}}", params.join(", "));
        let (stmts, diagnostics) = parse(&source);
        assert!(diagnostics.had_error());
        assert_eq!(stmts.len(), 1);
    }

    #[test]
    fn function_declaration_parses_name_params_and_body() {
        let (stmts, diagnostics) = parse("fun add(a, b) { print a + b; }");
        assert!(!diagnostics.had_error());
        match &stmts[0] {
            Stmt::Function(decl) => {
                assert_eq!(decl.name.lexeme, "add");
                assert_eq!(decl.params.len(), 2);
                assert_eq!(decl.body.len(), 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn literal_tokens_carry_their_value_into_the_ast() {
        let (stmts, _) = parse("\"hi\";");
        match &stmts[0] {
            Stmt::Expression(Expr::Literal(Value::String(s))) => assert_eq!(s, "hi"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
