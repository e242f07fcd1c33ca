//! Recursive-descent expression parser
//!
//! Precedence, loosest first:
//!
//! ```text
//! sequence    a; return b
//! ternary     a ? b : c
//! or          a || b    a or b
//! and         a && b    a and b
//! equality    ==  !=
//! comparison  <  <=  >  >=
//! instanceof  a instanceof string
//! additive    +  -
//! multiply    *  /  %
//! unary       !  -
//! postfix     a.b  a.m(x)
//! ```

use super::ast::{BinaryOp, Expr, TypeName, UnaryOp};
use super::error::ExpressionCompileError;
use super::lexer::{Lexer, Token, TokenKind};
use serde_json::Value;

/// Deepest allowed nesting of parentheses, operators and calls
pub const MAX_NESTING: usize = 64;

pub(crate) fn parse(source: &str) -> Result<Expr, ExpressionCompileError> {
    let tokens = Lexer::new(source).tokenize()?;
    let mut parser = Parser {
        source,
        tokens,
        index: 0,
        nesting: 0,
    };
    parser.program()
}

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    index: usize,
    nesting: usize,
}

impl Parser<'_> {
    fn peek(&self) -> &TokenKind {
        &self.tokens[self.index].kind
    }

    fn pos(&self) -> usize {
        self.tokens[self.index].pos
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.index].clone();
        if token.kind != TokenKind::Eof {
            self.index += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek() == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<(), ExpressionCompileError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(format!("expected {}", what)))
        }
    }

    fn error(&self, message: impl Into<String>) -> ExpressionCompileError {
        ExpressionCompileError::new(self.source, self.pos(), message)
    }

    fn too_deep(&self) -> ExpressionCompileError {
        self.error(format!("expression nests deeper than {} levels", MAX_NESTING))
    }

    /// Run `f` one level deeper, failing once the limit is reached
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, ExpressionCompileError>,
    ) -> Result<T, ExpressionCompileError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.too_deep());
        }
        self.nesting += 1;
        let result = f(self);
        self.nesting -= 1;
        result
    }

    /// Height of a node built over `children`, checked against the limit
    fn grown(&self, children: usize) -> Result<usize, ExpressionCompileError> {
        if children >= MAX_NESTING {
            return Err(self.too_deep());
        }
        Ok(children + 1)
    }

    fn program(&mut self) -> Result<Expr, ExpressionCompileError> {
        if *self.peek() == TokenKind::Eof {
            return Err(self.error("empty expression"));
        }

        let mut statements = vec![self.statement()?];
        while self.eat(&TokenKind::Semi) {
            if *self.peek() == TokenKind::Eof {
                break;
            }
            statements.push(self.statement()?);
        }

        if *self.peek() != TokenKind::Eof {
            return Err(self.error("unexpected token"));
        }

        Ok(if statements.len() == 1 {
            statements.remove(0)
        } else {
            Expr::Sequence(statements)
        })
    }

    fn statement(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.eat(&TokenKind::Return);
        self.ternary()
    }

    fn ternary(&mut self) -> Result<Expr, ExpressionCompileError> {
        let condition = self.or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then = self.nested(Self::ternary)?;
        self.expect(TokenKind::Colon, "':' in conditional expression")?;
        let otherwise = self.nested(Self::ternary)?;
        Ok(Expr::Ternary {
            condition: Box::new(condition),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    fn binary_level(
        &mut self,
        operators: &[(TokenKind, BinaryOp)],
        next: fn(&mut Self) -> Result<Expr, ExpressionCompileError>,
    ) -> Result<Expr, ExpressionCompileError> {
        let mut left = next(self)?;
        let mut depth = left.depth();
        'outer: loop {
            for (kind, op) in operators {
                if self.eat(kind) {
                    let right = next(self)?;
                    depth = self.grown(depth.max(right.depth()))?;
                    left = Expr::Binary {
                        op: *op,
                        left: Box::new(left),
                        right: Box::new(right),
                    };
                    continue 'outer;
                }
            }
            return Ok(left);
        }
    }

    fn or(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.binary_level(&[(TokenKind::OrOr, BinaryOp::Or)], Self::and)
    }

    fn and(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.binary_level(&[(TokenKind::AndAnd, BinaryOp::And)], Self::equality)
    }

    fn equality(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.binary_level(
            &[
                (TokenKind::EqEq, BinaryOp::Eq),
                (TokenKind::NotEq, BinaryOp::Ne),
            ],
            Self::comparison,
        )
    }

    fn comparison(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.binary_level(
            &[
                (TokenKind::Le, BinaryOp::Le),
                (TokenKind::Ge, BinaryOp::Ge),
                (TokenKind::Lt, BinaryOp::Lt),
                (TokenKind::Gt, BinaryOp::Gt),
            ],
            Self::instance_of,
        )
    }

    fn instance_of(&mut self) -> Result<Expr, ExpressionCompileError> {
        let operand = self.additive()?;
        if !self.eat(&TokenKind::InstanceOf) {
            return Ok(operand);
        }

        let name = match self.peek().clone() {
            TokenKind::Ident(name) => name,
            TokenKind::Literal(Value::Null) => "null".to_string(),
            _ => return Err(self.error("expected type name after 'instanceof'")),
        };
        let kind = TypeName::parse(&name)
            .ok_or_else(|| self.error(format!("unknown type name '{}'", name)))?;
        self.advance();

        Ok(Expr::InstanceOf {
            operand: Box::new(operand),
            kind,
        })
    }

    fn additive(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.binary_level(
            &[
                (TokenKind::Plus, BinaryOp::Add),
                (TokenKind::Minus, BinaryOp::Sub),
            ],
            Self::multiplicative,
        )
    }

    fn multiplicative(&mut self) -> Result<Expr, ExpressionCompileError> {
        self.binary_level(
            &[
                (TokenKind::Star, BinaryOp::Mul),
                (TokenKind::Slash, BinaryOp::Div),
                (TokenKind::Percent, BinaryOp::Rem),
            ],
            Self::unary,
        )
    }

    fn unary(&mut self) -> Result<Expr, ExpressionCompileError> {
        let op = if self.eat(&TokenKind::Bang) {
            UnaryOp::Not
        } else if self.eat(&TokenKind::Minus) {
            UnaryOp::Neg
        } else {
            return self.postfix();
        };
        let operand = self.nested(Self::unary)?;
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn postfix(&mut self) -> Result<Expr, ExpressionCompileError> {
        let mut expr = self.primary()?;
        let mut depth = expr.depth();

        while self.eat(&TokenKind::Dot) {
            let pos = self.pos();
            let name = match self.peek().clone() {
                TokenKind::Ident(name) => name,
                TokenKind::Literal(Value::Number(n)) if n.is_u64() => n.to_string(),
                _ => return Err(self.error("expected property or method name after '.'")),
            };
            self.advance();

            if self.eat(&TokenKind::LParen) {
                let args = self.arguments()?;
                let widest = args.iter().map(Expr::depth).max().unwrap_or(0);
                depth = self.grown(depth.max(widest))?;
                expr = Expr::Method {
                    target: Box::new(expr),
                    name,
                    args,
                    pos,
                };
            } else {
                expr = match expr {
                    Expr::Path { mut segments, pos } => {
                        segments.push(name);
                        Expr::Path { segments, pos }
                    }
                    target => {
                        depth = self.grown(depth)?;
                        Expr::Member {
                            target: Box::new(target),
                            name,
                            pos,
                        }
                    }
                };
            }
        }

        Ok(expr)
    }

    fn arguments(&mut self) -> Result<Vec<Expr>, ExpressionCompileError> {
        let mut args = Vec::new();
        if self.eat(&TokenKind::RParen) {
            return Ok(args);
        }
        loop {
            args.push(self.nested(Self::ternary)?);
            if self.eat(&TokenKind::RParen) {
                return Ok(args);
            }
            self.expect(TokenKind::Comma, "',' or ')' in argument list")?;
        }
    }

    fn primary(&mut self) -> Result<Expr, ExpressionCompileError> {
        let token = self.advance();
        match token.kind {
            TokenKind::Literal(value) => Ok(Expr::Literal(value)),
            TokenKind::Ident(name) => {
                if *self.peek() == TokenKind::LParen {
                    return Err(ExpressionCompileError::new(
                        self.source,
                        token.pos,
                        format!("unknown function '{}'", name),
                    ));
                }
                Ok(Expr::Path {
                    segments: vec![name],
                    pos: token.pos,
                })
            }
            TokenKind::LParen => {
                let inner = self.nested(Self::ternary)?;
                self.expect(TokenKind::RParen, "')'")?;
                Ok(inner)
            }
            TokenKind::Eof => Err(ExpressionCompileError::new(
                self.source,
                token.pos,
                "unexpected end of expression",
            )),
            _ => Err(ExpressionCompileError::new(
                self.source,
                token.pos,
                "unexpected token",
            )),
        }
    }
}
