//! Expression syntax tree

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Expr {
    Literal(Value),
    /// Dotted property path read through the resolver, e.g. `owner.login`
    Path { segments: Vec<String>, pos: usize },
    /// Property read on a computed value, e.g. `(a ? b : c).name`
    Member {
        target: Box<Expr>,
        name: String,
        pos: usize,
    },
    Method {
        target: Box<Expr>,
        name: String,
        args: Vec<Expr>,
        pos: usize,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    InstanceOf {
        operand: Box<Expr>,
        kind: TypeName,
    },
    /// `a; return b` evaluates every statement and yields the last
    Sequence(Vec<Expr>),
}

impl Expr {
    /// Height of the tree, walked without recursion
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut pending = vec![(self, 1)];
        while let Some((expr, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            match expr {
                Expr::Literal(_) | Expr::Path { .. } => {}
                Expr::Member { target, .. } => pending.push((target.as_ref(), depth + 1)),
                Expr::Method { target, args, .. } => {
                    pending.push((target.as_ref(), depth + 1));
                    pending.extend(args.iter().map(|arg| (arg, depth + 1)));
                }
                Expr::Unary { operand, .. } | Expr::InstanceOf { operand, .. } => {
                    pending.push((operand.as_ref(), depth + 1))
                }
                Expr::Binary { left, right, .. } => {
                    pending.push((left.as_ref(), depth + 1));
                    pending.push((right.as_ref(), depth + 1));
                }
                Expr::Ternary {
                    condition,
                    then,
                    otherwise,
                } => {
                    pending.push((condition.as_ref(), depth + 1));
                    pending.push((then.as_ref(), depth + 1));
                    pending.push((otherwise.as_ref(), depth + 1));
                }
                Expr::Sequence(statements) => {
                    pending.extend(statements.iter().map(|statement| (statement, depth + 1)))
                }
            }
        }
        deepest
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum UnaryOp {
    Not,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

/// Type names accepted on the right of `instanceof`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeName {
    String,
    Number,
    Boolean,
    List,
    Object,
    Null,
}

impl TypeName {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "string" => Some(TypeName::String),
            "number" => Some(TypeName::Number),
            "bool" | "boolean" => Some(TypeName::Boolean),
            "list" | "array" => Some(TypeName::List),
            "object" | "map" => Some(TypeName::Object),
            "null" => Some(TypeName::Null),
            _ => None,
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (TypeName::String, Value::String(_))
                | (TypeName::Number, Value::Number(_))
                | (TypeName::Boolean, Value::Bool(_))
                | (TypeName::List, Value::Array(_))
                | (TypeName::Object, Value::Object(_))
                | (TypeName::Null, Value::Null)
        )
    }
}
