//! Parsed `$filter` / `$search` expressions.
//!
//! Query-option parsing lives outside this crate; the parser hands over a
//! tree of this shape, which the unbound-operation guard inspects.

use std::fmt;

use crate::path::Literal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Has,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    pub fn keyword(&self) -> &'static str {
        match self {
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Eq => "eq",
            BinaryOp::Ne => "ne",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Gt => "gt",
            BinaryOp::Ge => "ge",
            BinaryOp::Has => "has",
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::Div => "div",
            BinaryOp::Mod => "mod",
        }
    }
}

/// A function call inside an expression: a built-in such as `contains`, a
/// bound function on the current entity, or an operation the parser already
/// resolved as unbound.
#[derive(Debug, Clone, PartialEq)]
pub struct CallNode {
    pub name: String,
    pub args: Vec<FilterExpr>,
    /// Set by the parser when it resolved `name` to an unbound operation.
    pub unbound: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Literal(Literal),
    /// Property path such as `Address/City`.
    Property(Vec<String>),
    Unary {
        op: UnaryOp,
        operand: Box<FilterExpr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
    Call(CallNode),
}

impl FilterExpr {
    pub fn literal(value: Literal) -> Self {
        FilterExpr::Literal(value)
    }

    pub fn property(path: &str) -> Self {
        FilterExpr::Property(path.split('/').map(str::to_string).collect())
    }

    pub fn not(operand: FilterExpr) -> Self {
        FilterExpr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOp, left: FilterExpr, right: FilterExpr) -> Self {
        FilterExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn call(name: impl Into<String>, args: Vec<FilterExpr>) -> Self {
        FilterExpr::Call(CallNode {
            name: name.into(),
            args,
            unbound: false,
        })
    }

    /// A call the parser already resolved to an unbound operation.
    pub fn unbound_call(name: impl Into<String>, args: Vec<FilterExpr>) -> Self {
        FilterExpr::Call(CallNode {
            name: name.into(),
            args,
            unbound: true,
        })
    }

    /// Every call node in the tree, depth first, left to right.
    pub fn calls(&self) -> Vec<&CallNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(expr) = stack.pop() {
            match expr {
                FilterExpr::Literal(_) | FilterExpr::Property(_) => {}
                FilterExpr::Unary { operand, .. } => stack.push(operand),
                FilterExpr::Binary { left, right, .. } => {
                    stack.push(right);
                    stack.push(left);
                }
                FilterExpr::Call(call) => {
                    out.push(call);
                    stack.extend(call.args.iter().rev());
                }
            }
        }
        out
    }
}

impl fmt::Display for FilterExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpr::Literal(value) => write!(f, "{value}"),
            FilterExpr::Property(path) => f.write_str(&path.join("/")),
            FilterExpr::Unary {
                op: UnaryOp::Not,
                operand,
            } => write!(f, "not ({operand})"),
            FilterExpr::Unary {
                op: UnaryOp::Negate,
                operand,
            } => write!(f, "-({operand})"),
            FilterExpr::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.keyword())
            }
            FilterExpr::Call(call) => {
                let args: Vec<String> = call.args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", call.name, args.join(","))
            }
        }
    }
}
