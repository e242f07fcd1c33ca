//! Expression evaluation against a backing instance

use super::ast::{BinaryOp, Expr, UnaryOp};
use super::error::EvaluationError;
use super::methods;
use super::resolver::{child, PropertyResolver};
use super::value::{as_bool, as_number, compare, float_value, kind_of, loose_eq, to_text};
use serde_json::Value;
use std::cmp::Ordering;

pub(crate) fn evaluate(expr: &Expr, data: &dyn PropertyResolver) -> Result<Value, EvaluationError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Path { segments, .. } => {
            let path = segments.join(".");
            data.resolve(&path)
                .map_err(|missing| EvaluationError::PropertyNotFound { path: missing.path })
        }
        Expr::Member { target, name, .. } => {
            let target = evaluate(target, data)?;
            child(&target, name).ok_or_else(|| EvaluationError::PropertyNotFound {
                path: format!("<{}>.{}", kind_of(&target), name),
            })
        }
        Expr::Method {
            target, name, args, ..
        } => {
            let receiver = evaluate(target, data)?;
            let args = args
                .iter()
                .map(|arg| evaluate(arg, data))
                .collect::<Result<Vec<_>, _>>()?;
            methods::call(name, &receiver, &args)
        }
        Expr::Unary { op, operand } => {
            let value = evaluate(operand, data)?;
            match op {
                UnaryOp::Not => Ok(Value::Bool(!as_bool(&value)?)),
                UnaryOp::Neg => {
                    let n = as_number(&value)?;
                    match n.as_i64().and_then(i64::checked_neg) {
                        Some(i) => Ok(Value::from(i)),
                        None => float_value(-n.as_f64().unwrap_or(f64::NAN)),
                    }
                }
            }
        }
        Expr::Binary { op, left, right } => binary(*op, left, right, data),
        Expr::Ternary {
            condition,
            then,
            otherwise,
        } => {
            if as_bool(&evaluate(condition, data)?)? {
                evaluate(then, data)
            } else {
                evaluate(otherwise, data)
            }
        }
        Expr::InstanceOf { operand, kind } => {
            let value = evaluate(operand, data)?;
            Ok(Value::Bool(kind.matches(&value)))
        }
        Expr::Sequence(statements) => {
            let mut last = Value::Null;
            for statement in statements {
                last = evaluate(statement, data)?;
            }
            Ok(last)
        }
    }
}

fn binary(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    data: &dyn PropertyResolver,
) -> Result<Value, EvaluationError> {
    // Logical operators short-circuit
    match op {
        BinaryOp::And => {
            let result = as_bool(&evaluate(left, data)?)? && as_bool(&evaluate(right, data)?)?;
            return Ok(Value::Bool(result));
        }
        BinaryOp::Or => {
            let result = as_bool(&evaluate(left, data)?)? || as_bool(&evaluate(right, data)?)?;
            return Ok(Value::Bool(result));
        }
        _ => {}
    }

    let left = evaluate(left, data)?;
    let right = evaluate(right, data)?;

    match op {
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(&left, &right))),
        BinaryOp::Ne => Ok(Value::Bool(!loose_eq(&left, &right))),
        BinaryOp::Lt => Ok(Value::Bool(compare(&left, &right)? == Ordering::Less)),
        BinaryOp::Le => Ok(Value::Bool(compare(&left, &right)? != Ordering::Greater)),
        BinaryOp::Gt => Ok(Value::Bool(compare(&left, &right)? == Ordering::Greater)),
        BinaryOp::Ge => Ok(Value::Bool(compare(&left, &right)? != Ordering::Less)),
        BinaryOp::Add if left.is_string() || right.is_string() => {
            Ok(Value::String(to_text(&left) + &to_text(&right)))
        }
        _ => arithmetic(op, &left, &right),
    }
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value, EvaluationError> {
    let (a, b) = (as_number(left)?, as_number(right)?);

    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        let exact = match op {
            BinaryOp::Add => x.checked_add(y),
            BinaryOp::Sub => x.checked_sub(y),
            BinaryOp::Mul => x.checked_mul(y),
            BinaryOp::Div | BinaryOp::Rem if y == 0 => return Err(EvaluationError::DivisionByZero),
            BinaryOp::Div if x.checked_rem(y) == Some(0) => x.checked_div(y),
            BinaryOp::Rem => x.checked_rem(y),
            _ => None,
        };
        if let Some(result) = exact {
            return Ok(Value::from(result));
        }
    }

    let (x, y) = (a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN));
    let result = match op {
        BinaryOp::Add => x + y,
        BinaryOp::Sub => x - y,
        BinaryOp::Mul => x * y,
        BinaryOp::Div | BinaryOp::Rem if y == 0.0 => return Err(EvaluationError::DivisionByZero),
        BinaryOp::Div => x / y,
        // only Rem is left once logic and comparisons are handled above
        _ => x % y,
    };
    float_value(result)
}
