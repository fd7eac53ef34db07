//! Tree-walking evaluator and the environment trait.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::error::{EvalError, EvalResult};
use crate::value::Value;

/// Source of identifier values during evaluation.
pub trait Environment {
    /// Look up the current value of `name`, or `None` if it is unknown.
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl Environment for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Environment for BTreeMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

impl Expr {
    /// Evaluate the expression against an environment.
    ///
    /// `and`/`or` short-circuit, so the right operand is only looked up
    /// when it can change the result.
    pub fn evaluate(&self, env: &dyn Environment) -> EvalResult<Value> {
        match self {
            Expr::Literal(v) => Ok(v.clone()),
            Expr::Identifier(name) => env
                .lookup(name)
                .ok_or_else(|| EvalError::UnknownIdentifier(name.clone())),
            Expr::Unary(op, operand) => unary(*op, operand.evaluate(env)?),
            Expr::Binary(BinaryOp::And, lhs, rhs) => {
                if !truth(BinaryOp::And, lhs.evaluate(env)?)? {
                    return Ok(Value::Boolean(false));
                }
                Ok(Value::Boolean(truth(BinaryOp::And, rhs.evaluate(env)?)?))
            }
            Expr::Binary(BinaryOp::Or, lhs, rhs) => {
                if truth(BinaryOp::Or, lhs.evaluate(env)?)? {
                    return Ok(Value::Boolean(true));
                }
                Ok(Value::Boolean(truth(BinaryOp::Or, rhs.evaluate(env)?)?))
            }
            Expr::Binary(op, lhs, rhs) => binary(*op, lhs.evaluate(env)?, rhs.evaluate(env)?),
        }
    }
}

fn truth(op: BinaryOp, value: Value) -> EvalResult<bool> {
    match value {
        Value::Boolean(b) => Ok(b),
        other => Err(EvalError::BadOperand {
            op: op.symbol(),
            operand: other.type_name(),
        }),
    }
}

fn unary(op: UnaryOp, value: Value) -> EvalResult<Value> {
    match (op, value) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Neg, Value::Integer(n)) => n.checked_neg().map(Value::Integer).ok_or(EvalError::Overflow),
        (UnaryOp::Neg, Value::Float(f)) => Ok(Value::Float(-f)),
        (op, other) => Err(EvalError::BadOperand {
            op: match op {
                UnaryOp::Not => "not",
                UnaryOp::Neg => "-",
            },
            operand: other.type_name(),
        }),
    }
}

fn mismatch(op: BinaryOp, lhs: &Value, rhs: &Value) -> EvalError {
    EvalError::TypeMismatch {
        op: op.symbol(),
        left: lhs.type_name(),
        right: rhs.type_name(),
    }
}

/// Order two values. Integers compare exactly, mixed numbers as floats.
fn compare(lhs: &Value, rhs: &Value) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ => None,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Arith {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

fn checked(op: Arith, a: i64, b: i64) -> EvalResult<i64> {
    let result = match op {
        Arith::Add => a.checked_add(b),
        Arith::Sub => a.checked_sub(b),
        Arith::Mul => a.checked_mul(b),
        Arith::Div | Arith::Rem if b == 0 => return Err(EvalError::DivisionByZero),
        Arith::Div => a.checked_div(b),
        Arith::Rem => a.checked_rem(b),
    };
    result.ok_or(EvalError::Overflow)
}

fn float(op: Arith, a: f64, b: f64) -> f64 {
    match op {
        Arith::Add => a + b,
        Arith::Sub => a - b,
        Arith::Mul => a * b,
        Arith::Div => a / b,
        Arith::Rem => a % b,
    }
}

fn arithmetic(op: BinaryOp, arith: Arith, lhs: Value, rhs: Value) -> EvalResult<Value> {
    match (&lhs, &rhs) {
        (Value::Integer(a), Value::Integer(b)) => checked(arith, *a, *b).map(Value::Integer),
        (Value::String(a), Value::String(b)) if arith == Arith::Add => {
            Ok(Value::String(format!("{a}{b}")))
        }
        _ => match (lhs.as_number(), rhs.as_number()) {
            (Some(a), Some(b)) => Ok(Value::Float(float(arith, a, b))),
            _ => Err(mismatch(op, &lhs, &rhs)),
        },
    }
}

fn binary(op: BinaryOp, lhs: Value, rhs: Value) -> EvalResult<Value> {
    match op {
        BinaryOp::Eq | BinaryOp::NotEq => {
            let equal = match compare(&lhs, &rhs) {
                Some(ordering) => ordering == Ordering::Equal,
                None => false,
            };
            Ok(Value::Boolean(equal == (op == BinaryOp::Eq)))
        }
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            if matches!(lhs, Value::Boolean(_)) || matches!(rhs, Value::Boolean(_)) {
                return Err(mismatch(op, &lhs, &rhs));
            }
            let ordering = compare(&lhs, &rhs).ok_or_else(|| mismatch(op, &lhs, &rhs))?;
            Ok(Value::Boolean(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Le => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            }))
        }
        BinaryOp::Add => arithmetic(op, Arith::Add, lhs, rhs),
        BinaryOp::Sub => arithmetic(op, Arith::Sub, lhs, rhs),
        BinaryOp::Mul => arithmetic(op, Arith::Mul, lhs, rhs),
        BinaryOp::Div => arithmetic(op, Arith::Div, lhs, rhs),
        BinaryOp::Rem => arithmetic(op, Arith::Rem, lhs, rhs),
        BinaryOp::And | BinaryOp::Or => {
            let l = truth(op, lhs)?;
            let r = truth(op, rhs)?;
            Ok(Value::Boolean(if op == BinaryOp::And { l && r } else { l || r }))
        }
    }
}
