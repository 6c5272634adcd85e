//! Typed constants and borrowed field values.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use uuid::Uuid;

/// A strongly typed constant produced by coercing a raw condition value.
///
/// Each variant maps to one scalar type of the entity catalog. Nullable and
/// non-nullable fields share the same constant representation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// Fixed-precision decimal.
    Decimal(Decimal),
    /// UTF-8 string.
    String(String),
    /// Date and time without an offset.
    DateTime(NaiveDateTime),
    /// 128-bit unique identifier.
    Uuid(Uuid),
}

/// A value borrowed out of an entity instance.
///
/// Strings are borrowed; every other scalar is copied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueRef<'a> {
    /// Boolean value.
    Bool(bool),
    /// 32-bit signed integer.
    Int32(i32),
    /// 64-bit signed integer.
    Int64(i64),
    /// 32-bit floating point.
    Float32(f32),
    /// 64-bit floating point.
    Float64(f64),
    /// Fixed-precision decimal.
    Decimal(Decimal),
    /// Borrowed UTF-8 string.
    Str(&'a str),
    /// Date and time without an offset.
    DateTime(NaiveDateTime),
    /// 128-bit unique identifier.
    Uuid(Uuid),
}

impl Value {
    /// Borrow this constant as a [`ValueRef`].
    pub fn as_value_ref(&self) -> ValueRef<'_> {
        match self {
            Value::Bool(v) => ValueRef::Bool(*v),
            Value::Int32(v) => ValueRef::Int32(*v),
            Value::Int64(v) => ValueRef::Int64(*v),
            Value::Float32(v) => ValueRef::Float32(*v),
            Value::Float64(v) => ValueRef::Float64(*v),
            Value::Decimal(v) => ValueRef::Decimal(*v),
            Value::String(v) => ValueRef::Str(v),
            Value::DateTime(v) => ValueRef::DateTime(*v),
            Value::Uuid(v) => ValueRef::Uuid(*v),
        }
    }
}

impl fmt::Display for ValueRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRef::Bool(v) => write!(f, "{v}"),
            ValueRef::Int32(v) => write!(f, "{v}"),
            ValueRef::Int64(v) => write!(f, "{v}"),
            ValueRef::Float32(v) => write!(f, "{v}"),
            ValueRef::Float64(v) => write!(f, "{v}"),
            ValueRef::Decimal(v) => write!(f, "{v}"),
            ValueRef::Str(v) => write!(f, "{v:?}"),
            ValueRef::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            ValueRef::Uuid(v) => write!(f, "{}", v.hyphenated()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_value_ref().fmt(f)
    }
}
