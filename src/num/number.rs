//! Conversions across the three numeric node kinds.
//!
//! Reads follow C cast rules: doubles truncate toward zero when read as
//! integers, wider integers wrap when narrowed, and integers widen to `f64`
//! with the usual rounding. Rust's float-to-int casts additionally map NaN to
//! zero and saturate out-of-range values.

use crate::dom::Node;

pub fn double_to_i32(value: f64) -> i32 {
    value as i32
}

pub fn double_to_i64(value: f64) -> i64 {
    value as i64
}

impl Node<'_> {
    /// Any numeric node as `i32`; zero for other kinds.
    pub fn numeric_as_i32(&self) -> i32 {
        match self {
            Node::Int32(value) => *value,
            Node::Int64(value) => *value as i32,
            Node::Double(value) => double_to_i32(*value),
            _ => 0,
        }
    }

    /// Any numeric node as `i64`; zero for other kinds.
    pub fn numeric_as_i64(&self) -> i64 {
        match self {
            Node::Int32(value) => i64::from(*value),
            Node::Int64(value) => *value,
            Node::Double(value) => double_to_i64(*value),
            _ => 0,
        }
    }

    /// Any numeric node as `f64`; zero for other kinds.
    pub fn numeric_as_f64(&self) -> f64 {
        match self {
            Node::Int32(value) => f64::from(*value),
            Node::Int64(value) => *value as f64,
            Node::Double(value) => *value,
            _ => 0.0,
        }
    }
}
