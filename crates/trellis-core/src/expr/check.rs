//! Static checks of an expression against a backing shape

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::ExpressionCompileError;
use super::methods;
use super::shape::Shape;
use std::collections::BTreeMap;

/// Names visible to an expression: the backing shape plus extra bindings
pub(crate) struct ShapeEnv<'a> {
    pub root: &'a Shape,
    pub bindings: &'a BTreeMap<String, Shape>,
    pub source: &'a str,
}

impl ShapeEnv<'_> {
    fn error(&self, pos: usize, message: String) -> ExpressionCompileError {
        ExpressionCompileError::new(self.source, pos, message)
    }

    /// Infer the result shape of `expr`, rejecting unknown properties and methods
    pub fn check(&self, expr: &Expr) -> Result<Shape, ExpressionCompileError> {
        match expr {
            Expr::Literal(value) => Ok(Shape::infer(value)),
            Expr::Path { segments, pos } => self.check_path(segments, *pos),
            Expr::Member { target, name, pos } => {
                let target = self.check(target)?;
                target.property(name).map_err(|msg| self.error(*pos, msg))
            }
            Expr::Method {
                target,
                name,
                args,
                pos,
            } => {
                let receiver = self.check(target)?;
                for arg in args {
                    self.check(arg)?;
                }
                methods::result_shape(name, &receiver, args.len()).map_err(|msg| self.error(*pos, msg))
            }
            Expr::Unary { op, operand } => {
                self.check(operand)?;
                Ok(match op {
                    UnaryOp::Not => Shape::Bool,
                    UnaryOp::Neg => Shape::Number,
                })
            }
            Expr::Binary { op, left, right } => {
                let left = self.check(left)?;
                let right = self.check(right)?;
                Ok(match op {
                    BinaryOp::Add => match (left, right) {
                        (Shape::String, _) | (_, Shape::String) => Shape::String,
                        (Shape::Number, Shape::Number) => Shape::Number,
                        _ => Shape::Any,
                    },
                    BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => Shape::Number,
                    _ => Shape::Bool,
                })
            }
            Expr::Ternary {
                condition,
                then,
                otherwise,
            } => {
                self.check(condition)?;
                let then = self.check(then)?;
                let otherwise = self.check(otherwise)?;
                Ok(if then == otherwise { then } else { Shape::Any })
            }
            Expr::InstanceOf { operand, .. } => {
                self.check(operand)?;
                Ok(Shape::Bool)
            }
            Expr::Sequence(statements) => {
                let mut last = Shape::Any;
                for statement in statements {
                    last = self.check(statement)?;
                }
                Ok(last)
            }
        }
    }

    fn check_path(&self, segments: &[String], pos: usize) -> Result<Shape, ExpressionCompileError> {
        let (root, rest) = segments
            .split_first()
            .ok_or_else(|| self.error(pos, "empty property path".to_string()))?;

        let mut shape = match self.bindings.get(root) {
            Some(bound) => bound.clone(),
            None => self
                .root
                .property(root)
                .map_err(|msg| self.error(pos, format!("{} on backing shape", msg)))?,
        };

        for segment in rest {
            shape = shape.property(segment).map_err(|msg| {
                self.error(pos, format!("{} in path '{}'", msg, segments.join(".")))
            })?;
        }
        Ok(shape)
    }
}
