//! Expression tokenizer

use super::error::ExpressionCompileError;
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Literal(Value),
    Return,
    InstanceOf,
    AndAnd,
    OrOr,
    Bang,
    EqEq,
    NotEq,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Dot,
    Comma,
    LParen,
    RParen,
    Question,
    Colon,
    Semi,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token in the expression
    pub pos: usize,
}

pub(crate) struct Lexer<'a> {
    source: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
        }
    }

    /// Tokenize the whole expression, ending with `Eof`
    pub fn tokenize(mut self) -> Result<Vec<Token>, ExpressionCompileError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let done = token.kind == TokenKind::Eof;
            tokens.push(token);
            if done {
                return Ok(tokens);
            }
        }
    }

    fn error(&self, pos: usize, message: impl Into<String>) -> ExpressionCompileError {
        ExpressionCompileError::new(self.source, pos, message)
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn next_token(&mut self) -> Result<Token, ExpressionCompileError> {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let start = self.pos;
        let Some(byte) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                pos: start,
            });
        };

        let kind = match byte {
            b'\'' | b'"' => return self.string(byte),
            b'0'..=b'9' => return self.number(),
            b if b.is_ascii_alphabetic() || b == b'_' || b == b'$' => return Ok(self.word()),
            b'&' if self.peek_at(1) == Some(b'&') => self.two(TokenKind::AndAnd),
            b'|' if self.peek_at(1) == Some(b'|') => self.two(TokenKind::OrOr),
            b'=' if self.peek_at(1) == Some(b'=') => self.two(TokenKind::EqEq),
            b'!' if self.peek_at(1) == Some(b'=') => self.two(TokenKind::NotEq),
            b'<' if self.peek_at(1) == Some(b'=') => self.two(TokenKind::Le),
            b'>' if self.peek_at(1) == Some(b'=') => self.two(TokenKind::Ge),
            b'!' => self.one(TokenKind::Bang),
            b'<' => self.one(TokenKind::Lt),
            b'>' => self.one(TokenKind::Gt),
            b'+' => self.one(TokenKind::Plus),
            b'-' => self.one(TokenKind::Minus),
            b'*' => self.one(TokenKind::Star),
            b'/' => self.one(TokenKind::Slash),
            b'%' => self.one(TokenKind::Percent),
            b'.' => self.one(TokenKind::Dot),
            b',' => self.one(TokenKind::Comma),
            b'(' => self.one(TokenKind::LParen),
            b')' => self.one(TokenKind::RParen),
            b'?' => self.one(TokenKind::Question),
            b':' => self.one(TokenKind::Colon),
            b';' => self.one(TokenKind::Semi),
            _ => {
                let c = self.source[start..].chars().next().unwrap_or('?');
                return Err(self.error(start, format!("unexpected character '{}'", c)));
            }
        };

        Ok(Token { kind, pos: start })
    }

    fn one(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn two(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 2;
        kind
    }

    fn word(&mut self) -> Token {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
        {
            self.pos += 1;
        }

        let kind = match &self.source[start..self.pos] {
            "true" => TokenKind::Literal(Value::Bool(true)),
            "false" => TokenKind::Literal(Value::Bool(false)),
            "null" => TokenKind::Literal(Value::Null),
            "return" => TokenKind::Return,
            "instanceof" => TokenKind::InstanceOf,
            "and" => TokenKind::AndAnd,
            "or" => TokenKind::OrOr,
            word => TokenKind::Ident(word.to_string()),
        };
        Token { kind, pos: start }
    }

    fn number(&mut self) -> Result<Token, ExpressionCompileError> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }

        // `items.0.1` is a path, not `items` followed by `0.1`
        let after_dot = start > 0 && self.source.as_bytes()[start - 1] == b'.';
        let mut fractional = false;
        if !after_dot
            && self.peek() == Some(b'.')
            && self.peek_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            fractional = true;
            self.pos += 1;
            while self.peek().is_some_and(|b| b.is_ascii_digit()) {
                self.pos += 1;
            }
        }

        let text = &self.source[start..self.pos];
        let number = if fractional {
            text.parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .ok_or_else(|| self.error(start, format!("invalid number '{}'", text)))?
        } else {
            text.parse::<i64>()
                .map(Number::from)
                .map_err(|_| self.error(start, format!("integer '{}' out of range", text)))?
        };

        Ok(Token {
            kind: TokenKind::Literal(Value::Number(number)),
            pos: start,
        })
    }

    /// Single- and double-quoted strings are interchangeable
    fn string(&mut self, quote: u8) -> Result<Token, ExpressionCompileError> {
        let start = self.pos;
        self.pos += 1;
        let mut text = String::new();

        loop {
            let Some(byte) = self.peek() else {
                return Err(self.error(start, "unterminated string literal"));
            };
            match byte {
                b if b == quote => {
                    self.pos += 1;
                    break;
                }
                b'\\' => {
                    let escaped = self.source[self.pos + 1..].chars().next().ok_or_else(|| {
                        self.error(start, "unterminated string literal")
                    })?;
                    text.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        other => other,
                    });
                    self.pos += 1 + escaped.len_utf8();
                }
                _ => {
                    let c = self.source[self.pos..].chars().next().unwrap_or_default();
                    text.push(c);
                    self.pos += c.len_utf8();
                }
            }
        }

        Ok(Token {
            kind: TokenKind::Literal(Value::String(text)),
            pos: start,
        })
    }
}
