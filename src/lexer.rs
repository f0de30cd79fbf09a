//! Hand-written scanner implementing the token contract of `spec.md` §4.1.
//!
//! The specification deliberately treats the lexer's internal DFA as an
//! external collaborator - only the token kinds it must produce are
//! normative. A hand-written character-by-character scanner (rather than a
//! lexer-generator crate) is the right fit here regardless: the grammar is
//! tiny and fixed, and a generated DFA would add a dependency and a build
//! step for no real benefit over ~200 lines of straight-line code. See
//! DESIGN.md for why this crate doesn't pull in a lexer-generator
//! dependency the way the teacher repo did.

use crate::diagnostics::Diagnostics;
use crate::token::{Token, TokenKind};
use crate::value::Value;

/// Scans a complete source string into a token stream terminated by `EOF`.
pub struct Lexer<'a> {
    source: &'a [u8],
    start: usize,
    current: usize,
    line: usize,
    diagnostics: &'a Diagnostics,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, diagnostics: &'a Diagnostics) -> Self {
        Lexer {
            source: source.as_bytes(),
            start: 0,
            current: 0,
            line: 1,
            diagnostics,
        }
    }

    /// Scans the whole source and returns every token, including the
    /// trailing `EOF`.
    pub fn scan_tokens(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            self.start = self.current;
            match self.scan_token() {
                Some(token) => {
                    let is_eof = token.kind == TokenKind::Eof;
                    tokens.push(token);
                    if is_eof {
                        break;
                    }
                }
                None => continue,
            }
        }
        tracing::trace!(count = tokens.len(), "scanned tokens");
        tokens
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> u8 {
        let c = self.source[self.current];
        self.current += 1;
        c
    }

    fn peek(&self) -> u8 {
        if self.is_at_end() {
            b'\0'
        } else {
            self.source[self.current]
        }
    }

    fn peek_next(&self) -> u8 {
        if self.current + 1 >= self.source.len() {
            b'\0'
        } else {
            self.source[self.current + 1]
        }
    }

    fn matches(&mut self, expected: u8) -> bool {
        if self.is_at_end() || self.source[self.current] != expected {
            return false;
        }
        self.current += 1;
        true
    }

    fn lexeme(&self) -> String {
        String::from_utf8_lossy(&self.source[self.start..self.current]).into_owned()
    }

    fn make(&self, kind: TokenKind) -> Option<Token> {
        Some(Token::new(kind, self.lexeme(), None, self.line))
    }

    fn make_literal(&self, kind: TokenKind, literal: Value) -> Option<Token> {
        Some(Token::new(kind, self.lexeme(), Some(literal), self.line))
    }

    /// Scans exactly one token, or `None` if this call only consumed
    /// whitespace/comments and produced nothing.
    fn scan_token(&mut self) -> Option<Token> {
        if self.is_at_end() {
            return Some(Token::new(TokenKind::Eof, "", None, self.line));
        }

        let c = self.advance();
        use TokenKind::*;
        match c {
            b'(' => self.make(LeftParen),
            b')' => self.make(RightParen),
            b'{' => self.make(LeftBrace),
            b'}' => self.make(RightBrace),
            b',' => self.make(Comma),
            b'.' => self.make(Dot),
            b'-' => self.make(Minus),
            b'+' => self.make(Plus),
            b';' => self.make(Semicolon),
            b'*' => self.make(Star),
            b'!' => {
                let kind = if self.matches(b'=') { BangEqual } else { Bang };
                self.make(kind)
            }
            b'=' => {
                let kind = if self.matches(b'=') { EqualEqual } else { Equal };
                self.make(kind)
            }
            b'<' => {
                let kind = if self.matches(b'=') { LessEqual } else { Less };
                self.make(kind)
            }
            b'>' => {
                let kind = if self.matches(b'=') { GreaterEqual } else { Greater };
                self.make(kind)
            }
            b'/' => {
                if self.matches(b'/') {
                    while self.peek() != b'\n' && !self.is_at_end() {
                        self.advance();
                    }
                    None
                } else {
                    self.make(Slash)
                }
            }
            b' ' | b'\r' | b'\t' => None,
            b'\n' => {
                self.line += 1;
                None
            }
            b'"' => self.string(),
            b'0'..=b'9' => self.number(),
            c if is_alpha(c) => self.identifier(),
            _ => {
                self.diagnostics.error(self.line, "Unexpected character.");
                None
            }
        }
    }

    fn string(&mut self) -> Option<Token> {
        let start_line = self.line;
        while self.peek() != b'"' && !self.is_at_end() {
            if self.peek() == b'\n' {
                self.line += 1;
            }
            self.advance();
        }

        if self.is_at_end() {
            self.diagnostics.error(start_line, "Unterminated string.");
            return None;
        }

        // The closing quote.
        self.advance();

        let value = String::from_utf8_lossy(&self.source[self.start + 1..self.current - 1]).into_owned();
        self.make_literal(TokenKind::String, Value::String(value))
    }

    fn number(&mut self) -> Option<Token> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();
            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }
        let text = self.lexeme();
        let n: f64 = text.parse().expect("scanned number text must parse as f64");
        self.make_literal(TokenKind::Number, Value::Number(n))
    }

    fn identifier(&mut self) -> Option<Token> {
        while is_alphanumeric(self.peek()) {
            self.advance();
        }
        let text = self.lexeme();
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Identifier);
        self.make(kind)
    }
}

fn is_alpha(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_'
}

fn is_alphanumeric(c: u8) -> bool {
    is_alpha(c) || c.is_ascii_digit()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(source: &str) -> Vec<Token> {
        let diagnostics = Diagnostics::new();
        Lexer::new(source, &diagnostics).scan_tokens()
    }

    #[test]
    fn scans_single_char_tokens() {
        let tokens = scan("(){},.-+;/*");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![
                LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Minus, Plus, Semicolon,
                Slash, Star, Eof
            ]
        );
    }

    #[test]
    fn scans_two_char_operators() {
        let tokens = scan("!= == >= <= ! = > <");
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![BangEqual, EqualEqual, GreaterEqual, LessEqual, Bang, Equal, Greater, Less, Eof]
        );
    }

    #[test]
    fn line_comments_are_skipped() {
        let tokens = scan("// a whole comment\nprint 1;");
        assert_eq!(tokens[0].kind, TokenKind::Print);
        assert_eq!(tokens[0].line, 2);
    }

    #[test]
    fn strings_capture_their_contents_as_literal() {
        let tokens = scan("\"hello\"");
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].literal, Some(Value::String("hello".to_string())));
    }

    #[test]
    fn unterminated_string_reports_and_sets_had_error() {
        let diagnostics = Diagnostics::new();
        let tokens = Lexer::new("\"oops", &diagnostics).scan_tokens();
        assert!(diagnostics.had_error());
        assert_eq!(tokens, vec![Token::eof(1)]);
    }

    #[test]
    fn numbers_parse_integer_and_fractional_forms() {
        let tokens = scan("123 45.67");
        assert_eq!(tokens[0].literal, Some(Value::Number(123.0)));
        assert_eq!(tokens[1].literal, Some(Value::Number(45.67)));
    }

    #[test]
    fn identifiers_and_keywords_are_distinguished() {
        let tokens = scan("foo and bar");
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
        assert_eq!(tokens[1].kind, TokenKind::And);
        assert_eq!(tokens[2].kind, TokenKind::Identifier);
    }

    #[test]
    fn unexpected_character_reports_but_keeps_scanning() {
        let diagnostics = Diagnostics::new();
        let tokens = Lexer::new("1 @ 2", &diagnostics).scan_tokens();
        assert!(diagnostics.had_error());
        assert_eq!(tokens[0].literal, Some(Value::Number(1.0)));
        assert_eq!(tokens[1].literal, Some(Value::Number(2.0)));
    }

    #[test]
    fn line_numbers_track_newlines() {
        let tokens = scan("1\n2\n3");
        assert_eq!(tokens[0].line, 1);
        assert_eq!(tokens[1].line, 2);
        assert_eq!(tokens[2].line, 3);
    }

    #[test]
    fn every_stream_ends_in_eof() {
        let tokens = scan("");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }
}
