//! Arithmetic, comparison and logic on script values.

use std::cmp::Ordering;

use im::Vector;
use quire_foundation::{Error, ErrorKind, Result, Type, Value};
use quire_language::{BinaryOp, UnaryOp};

/// Applies a strict binary operator. `and`/`or` short-circuit in the
/// compiler and only reach here with both operands evaluated.
pub(crate) fn binary(op: BinaryOp, a: Value, b: Value) -> Result<Value> {
    match op {
        BinaryOp::Add => add(a, b),
        BinaryOp::Sub => arithmetic(a, b, i64::wrapping_sub, |x, y| x - y),
        BinaryOp::Mul => arithmetic(a, b, i64::wrapping_mul, |x, y| x * y),
        BinaryOp::Div => divide(a, b, i64::wrapping_div, |x, y| x / y),
        BinaryOp::Rem => divide(a, b, i64::wrapping_rem, |x, y| x % y),
        BinaryOp::Eq => Ok(Value::Bool(equal(&a, &b))),
        BinaryOp::Ne => Ok(Value::Bool(!equal(&a, &b))),
        BinaryOp::Lt => compare(&a, &b, Ordering::is_lt),
        BinaryOp::Gt => compare(&a, &b, Ordering::is_gt),
        BinaryOp::Le => compare(&a, &b, Ordering::is_le),
        BinaryOp::Ge => compare(&a, &b, Ordering::is_ge),
        BinaryOp::And => Ok(if a.is_truthy() { b } else { a }),
        BinaryOp::Or => Ok(if a.is_truthy() { a } else { b }),
    }
}

/// Applies a unary operator.
pub(crate) fn unary(op: UnaryOp, a: Value) -> Result<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!a.is_truthy())),
        UnaryOp::Neg => match a {
            Value::Int(x) => Ok(Value::Int(x.wrapping_neg())),
            Value::Float(x) => Ok(Value::Float(-x)),
            other => Err(Error::type_mismatch(Type::Number, other.value_type())),
        },
    }
}

fn add(a: Value, b: Value) -> Result<Value> {
    match (a, b) {
        (Value::List(mut x), Value::List(y)) => {
            x.append(y);
            Ok(Value::List(x))
        }
        (a @ Value::String(_), b) | (a, b @ Value::String(_)) => {
            let left = a.to_text().unwrap_or_default();
            let right = b.to_text().unwrap_or_default();
            Ok(Value::from(format!("{left}{right}")))
        }
        (a, b) => arithmetic(a, b, i64::wrapping_add, |x, y| x + y),
    }
}

#[allow(clippy::cast_precision_loss)]
fn arithmetic(
    a: Value,
    b: Value,
    int: fn(i64, i64) -> i64,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    match (&a, &b) {
        (Value::Int(x), Value::Int(y)) => Ok(Value::Int(int(*x, *y))),
        (Value::Float(x), Value::Float(y)) => Ok(Value::Float(float(*x, *y))),
        (Value::Int(x), Value::Float(y)) => Ok(Value::Float(float(*x as f64, *y))),
        (Value::Float(x), Value::Int(y)) => Ok(Value::Float(float(*x, *y as f64))),
        (Value::Int(_) | Value::Float(_), other) | (other, _) => {
            Err(Error::type_mismatch(Type::Number, other.value_type()))
        }
    }
}

/// Integer division truncates toward zero.
fn divide(
    a: Value,
    b: Value,
    int: fn(i64, i64) -> i64,
    float: fn(f64, f64) -> f64,
) -> Result<Value> {
    match &b {
        Value::Int(0) => Err(Error::new(ErrorKind::DivisionByZero)),
        Value::Float(y) if *y == 0.0 => Err(Error::new(ErrorKind::DivisionByZero)),
        _ => arithmetic(a, b, int, float),
    }
}

fn equal(a: &Value, b: &Value) -> bool {
    match a.partial_cmp(b) {
        Some(ordering) => ordering.is_eq(),
        None => a == b,
    }
}

fn compare(a: &Value, b: &Value, pred: fn(Ordering) -> bool) -> Result<Value> {
    match (a, b) {
        (Value::List(_), _) | (_, Value::List(_)) => {
            Err(Error::type_mismatch(Type::Number, Type::List))
        }
        _ => a
            .partial_cmp(b)
            .map(|ordering| Value::Bool(pred(ordering)))
            .ok_or_else(|| Error::type_mismatch(a.value_type(), b.value_type())),
    }
}

/// Builds a list value.
pub(crate) fn list(items: Vec<Value>) -> Value {
    Value::List(items.into_iter().collect::<Vector<_>>())
}
