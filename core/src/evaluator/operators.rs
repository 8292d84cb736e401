//! Binary and unary operator implementations.
//!
//! Arithmetic always produces `Float64`, whatever the width of the operands.

use core::cmp::Ordering;

use ecow::EcoString;

use crate::parser::ast::{BinaryOp, UnaryOp};
use crate::values::Variant;

/// Numeric value of `value` for arithmetic and relational operators.
pub(super) fn to_number(value: &Variant) -> f64 {
    match value {
        Variant::Null => 0.0,
        Variant::Bool(b) => f64::from(u8::from(*b)),
        Variant::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                0.0
            } else {
                trimmed.parse().unwrap_or(f64::NAN)
            }
        }
        Variant::Object(_) | Variant::Host(_) => f64::NAN,
        number => number.as_f64().unwrap_or(f64::NAN),
    }
}

pub(super) fn eval_unary(op: UnaryOp, operand: &Variant) -> Variant {
    match op {
        UnaryOp::Neg => Variant::Float64(-to_number(operand)),
        UnaryOp::Plus => Variant::Float64(to_number(operand)),
        UnaryOp::Not => Variant::Bool(!operand.truthy()),
    }
}

pub(super) fn eval_binary(op: BinaryOp, left: &Variant, right: &Variant) -> Variant {
    match op {
        BinaryOp::Add => match (left, right) {
            (Variant::String(_), _) | (_, Variant::String(_)) => {
                let mut s = EcoString::new();
                s.push_str(&left.to_string());
                s.push_str(&right.to_string());
                Variant::String(s)
            }
            _ => Variant::Float64(to_number(left) + to_number(right)),
        },
        BinaryOp::Sub => Variant::Float64(to_number(left) - to_number(right)),
        BinaryOp::Mul => Variant::Float64(to_number(left) * to_number(right)),
        // Division by zero produces inf or NaN.
        BinaryOp::Div => Variant::Float64(to_number(left) / to_number(right)),
        BinaryOp::Rem => Variant::Float64(to_number(left) % to_number(right)),
        BinaryOp::Eq => Variant::Bool(loose_eq(left, right)),
        BinaryOp::Ne => Variant::Bool(!loose_eq(left, right)),
        BinaryOp::StrictEq => Variant::Bool(strict_eq(left, right)),
        BinaryOp::StrictNe => Variant::Bool(!strict_eq(left, right)),
        BinaryOp::Lt => Variant::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Gt => Variant::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::Le => Variant::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Ge => Variant::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
    }
}

fn compare(left: &Variant, right: &Variant) -> Option<Ordering> {
    match (left, right) {
        (Variant::String(a), Variant::String(b)) => Some(a.cmp(b)),
        _ => to_number(left).partial_cmp(&to_number(right)),
    }
}

/// `===`: same type and value. All numeric widths are one type.
pub(super) fn strict_eq(left: &Variant, right: &Variant) -> bool {
    match (left, right) {
        (Variant::Null, Variant::Null) => true,
        (Variant::Bool(a), Variant::Bool(b)) => a == b,
        (Variant::String(a), Variant::String(b)) => a == b,
        (Variant::Object(a), Variant::Object(b)) => a == b,
        (Variant::Host(a), Variant::Host(b)) => a == b,
        (a, b) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

/// `==`: numbers, booleans and numeric strings compare numerically.
pub(super) fn loose_eq(left: &Variant, right: &Variant) -> bool {
    match (left, right) {
        (Variant::Null, _) | (_, Variant::Null) => strict_eq(left, right),
        (Variant::String(_), Variant::String(_)) => strict_eq(left, right),
        (Variant::Object(_) | Variant::Host(_), _) | (_, Variant::Object(_) | Variant::Host(_)) => {
            strict_eq(left, right)
        }
        _ => to_number(left) == to_number(right),
    }
}
