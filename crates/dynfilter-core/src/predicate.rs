//! Predicate expressions.
//!
//! A compiled filter is a tree of [`PredicateExpr`] nodes over resolved
//! fields and typed constants. The tree can be evaluated against an entity
//! instance, rendered for diagnostics, or walked by translation layers.

use std::any::Any;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::ScalarType;
use crate::coerce::Operands;
use crate::error::Error;
use crate::resolve::ResolvedField;
use dynfilter_proto::{QueryOperator, Value, ValueRef};

/// Binary comparison against a constant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl Comparison {
    /// Apply the comparison to a non-null field value.
    pub fn apply(&self, field: ValueRef<'_>, constant: &Value) -> bool {
        let constant = constant.as_value_ref();
        match self {
            Comparison::Eq => values_equal(field, constant),
            Comparison::Ne => !values_equal(field, constant),
            Comparison::Gt => compare_values(field, constant).is_some_and(Ordering::is_gt),
            Comparison::Ge => compare_values(field, constant).is_some_and(Ordering::is_ge),
            Comparison::Lt => compare_values(field, constant).is_some_and(Ordering::is_lt),
            Comparison::Le => compare_values(field, constant).is_some_and(Ordering::is_le),
        }
    }

    /// Operator symbol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Lt => "<",
            Comparison::Le => "<=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordinal, case-sensitive substring test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextMatch {
    /// The field begins with the needle.
    StartsWith,
    /// The field ends with the needle.
    EndsWith,
    /// The needle occurs anywhere in the field.
    Contains,
}

impl TextMatch {
    /// Apply the test to a field value.
    pub fn apply(&self, haystack: &str, needle: &str) -> bool {
        match self {
            TextMatch::StartsWith => haystack.starts_with(needle),
            TextMatch::EndsWith => haystack.ends_with(needle),
            TextMatch::Contains => haystack.contains(needle),
        }
    }

    /// Method name used when rendering.
    pub fn as_str(&self) -> &'static str {
        match self {
            TextMatch::StartsWith => "StartsWith",
            TextMatch::EndsWith => "EndsWith",
            TextMatch::Contains => "Contains",
        }
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical form of a compiled filter.
#[derive(Debug, Clone)]
pub enum PredicateExpr {
    /// Always true.
    True,
    /// The field is not null.
    NotNull(Arc<ResolvedField>),
    /// Compare the field against a constant. A null field is unequal to
    /// everything and unordered.
    Compare {
        /// Field read from the entity.
        field: Arc<ResolvedField>,
        /// Comparison applied as `field op value`.
        op: Comparison,
        /// Coerced constant.
        value: Value,
    },
    /// Substring test on a string field. A null field yields `false`.
    Text {
        /// String field read from the entity.
        field: Arc<ResolvedField>,
        /// Kind of substring test.
        op: TextMatch,
        /// Literal searched for, compared ordinally.
        needle: String,
        /// Log when a null is met here.
        warn_on_null: bool,
    },
    /// Both sides hold; the left side is evaluated first.
    And(Box<PredicateExpr>, Box<PredicateExpr>),
}

impl PredicateExpr {
    /// Join two expressions with AND, dropping identity operands.
    pub fn and(left: PredicateExpr, right: PredicateExpr) -> PredicateExpr {
        match (left, right) {
            (PredicateExpr::True, expr) | (expr, PredicateExpr::True) => expr,
            (left, right) => PredicateExpr::And(Box::new(left), Box::new(right)),
        }
    }

    /// Check if this expression is the always-true predicate.
    pub fn is_identity(&self) -> bool {
        matches!(self, PredicateExpr::True)
    }

    /// Evaluate against an entity instance.
    pub fn evaluate(&self, entity: &dyn Any) -> bool {
        match self {
            PredicateExpr::True => true,
            PredicateExpr::NotNull(field) => !field.read(entity).is_null(),
            PredicateExpr::Compare { field, op, value } => match field.read(entity).value() {
                Some(actual) => op.apply(actual, value),
                None => *op == Comparison::Ne,
            },
            PredicateExpr::Text {
                field,
                op,
                needle,
                warn_on_null,
            } => match field.read(entity).value() {
                Some(ValueRef::Str(actual)) => op.apply(actual, needle),
                Some(_) => false,
                None => {
                    if *warn_on_null {
                        warn!(
                            field = %field,
                            operator = %op,
                            "substring test reached a null field marked not null"
                        );
                    }
                    false
                }
            },
            PredicateExpr::And(left, right) => left.evaluate(entity) && right.evaluate(entity),
        }
    }

    /// Paths referenced by this expression.
    pub fn fields(&self) -> HashSet<&str> {
        let mut fields = HashSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut HashSet<&'a str>) {
        match self {
            PredicateExpr::True => {}
            PredicateExpr::NotNull(field)
            | PredicateExpr::Compare { field, .. }
            | PredicateExpr::Text { field, .. } => {
                fields.insert(field.path());
            }
            PredicateExpr::And(left, right) => {
                left.collect_fields(fields);
                right.collect_fields(fields);
            }
        }
    }

    /// Number of leaf tests in this expression.
    pub fn leaf_count(&self) -> usize {
        match self {
            PredicateExpr::True => 0,
            PredicateExpr::And(left, right) => left.leaf_count() + right.leaf_count(),
            _ => 1,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateExpr::And(..) => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for PredicateExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateExpr::True => f.write_str("true"),
            PredicateExpr::NotNull(field) => write!(f, "{field} != null"),
            PredicateExpr::Compare { field, op, value } => write!(f, "{field} {op} {value}"),
            PredicateExpr::Text {
                field, op, needle, ..
            } => write!(f, "{field}.{op}({needle:?})"),
            PredicateExpr::And(left, right) => {
                left.fmt_operand(f)?;
                f.write_str(" AND ")?;
                right.fmt_operand(f)
            }
        }
    }
}

/// Check that `operator` can be applied to the field's type.
///
/// Returns the leaf scalar type. A leaf holding an embedded entity supports
/// no operator here; the compiler settles `In` before calling this, so `In`
/// works on any resolvable path.
pub fn check_operator(field: &ResolvedField, operator: QueryOperator) -> Result<ScalarType, Error> {
    let unsupported = || Error::UnsupportedOperator {
        field: field.path().to_string(),
        operator,
        field_type: field.field_type().to_string(),
    };

    let scalar = field.scalar_type().ok_or_else(unsupported)?;
    let supported = match operator {
        QueryOperator::Equal | QueryOperator::NotEqual | QueryOperator::In => true,
        op if op.is_ordering() => scalar.is_ordered(),
        op if op.is_text_match() => scalar.is_text(),
        _ => false,
    };

    if supported {
        Ok(scalar)
    } else {
        Err(unsupported())
    }
}

/// Build the expression for one condition.
///
/// `operands` must come from coercing the condition's value for `field`.
/// Missing operands build the identity.
pub fn build_condition(
    field: Arc<ResolvedField>,
    operator: QueryOperator,
    operands: Operands,
    not_null: bool,
    warn_on_null: bool,
) -> PredicateExpr {
    let Operands { first, second } = operands;
    let Some(first) = first else {
        debug!(field = %field, operator = %operator, "no constant for condition, ignoring");
        return PredicateExpr::True;
    };

    let compare = |field: &Arc<ResolvedField>, op: Comparison, value: Value| {
        PredicateExpr::Compare {
            field: Arc::clone(field),
            op,
            value,
        }
    };

    let text = |op: TextMatch, value: Value| {
        let needle = match value {
            Value::String(s) => s,
            other => other.to_string(),
        };
        let test = PredicateExpr::Text {
            field: Arc::clone(&field),
            op,
            needle,
            warn_on_null,
        };
        if not_null {
            test
        } else {
            PredicateExpr::And(
                Box::new(PredicateExpr::NotNull(Arc::clone(&field))),
                Box::new(test),
            )
        }
    };

    match operator {
        QueryOperator::Equal => compare(&field, Comparison::Eq, first),
        QueryOperator::NotEqual => compare(&field, Comparison::Ne, first),
        QueryOperator::Greater => compare(&field, Comparison::Gt, first),
        QueryOperator::GreaterEqual => compare(&field, Comparison::Ge, first),
        QueryOperator::Less => compare(&field, Comparison::Lt, first),
        QueryOperator::LessEqual => compare(&field, Comparison::Le, first),
        QueryOperator::Between => match second {
            Some(end) => PredicateExpr::And(
                Box::new(compare(&field, Comparison::Le, end)),
                Box::new(compare(&field, Comparison::Ge, first)),
            ),
            None => PredicateExpr::True,
        },
        QueryOperator::StartsWith => text(TextMatch::StartsWith, first),
        QueryOperator::EndsWith => text(TextMatch::EndsWith, first),
        QueryOperator::Contains => text(TextMatch::Contains, first),
        QueryOperator::In => PredicateExpr::True,
    }
}

fn values_equal(a: ValueRef<'_>, b: ValueRef<'_>) -> bool {
    match (a, b) {
        (ValueRef::Bool(a), ValueRef::Bool(b)) => a == b,
        (ValueRef::Int32(a), ValueRef::Int32(b)) => a == b,
        (ValueRef::Int64(a), ValueRef::Int64(b)) => a == b,
        (ValueRef::Int32(a), ValueRef::Int64(b)) => (a as i64) == b,
        (ValueRef::Int64(a), ValueRef::Int32(b)) => a == (b as i64),
        (ValueRef::Float32(a), ValueRef::Float32(b)) => a == b,
        (ValueRef::Float64(a), ValueRef::Float64(b)) => a == b,
        (ValueRef::Float32(a), ValueRef::Float64(b)) => (a as f64) == b,
        (ValueRef::Float64(a), ValueRef::Float32(b)) => a == (b as f64),
        (ValueRef::Decimal(a), ValueRef::Decimal(b)) => a == b,
        (ValueRef::Str(a), ValueRef::Str(b)) => a == b,
        (ValueRef::DateTime(a), ValueRef::DateTime(b)) => a == b,
        (ValueRef::Uuid(a), ValueRef::Uuid(b)) => a == b,
        _ => false,
    }
}

/// Order two values, if comparable.
fn compare_values(a: ValueRef<'_>, b: ValueRef<'_>) -> Option<Ordering> {
    match (a, b) {
        (ValueRef::Int32(a), ValueRef::Int32(b)) => Some(a.cmp(&b)),
        (ValueRef::Int64(a), ValueRef::Int64(b)) => Some(a.cmp(&b)),
        (ValueRef::Int32(a), ValueRef::Int64(b)) => Some((a as i64).cmp(&b)),
        (ValueRef::Int64(a), ValueRef::Int32(b)) => Some(a.cmp(&(b as i64))),
        (ValueRef::Float32(a), ValueRef::Float32(b)) => a.partial_cmp(&b),
        (ValueRef::Float64(a), ValueRef::Float64(b)) => a.partial_cmp(&b),
        (ValueRef::Float32(a), ValueRef::Float64(b)) => (a as f64).partial_cmp(&b),
        (ValueRef::Float64(a), ValueRef::Float32(b)) => a.partial_cmp(&(b as f64)),
        (ValueRef::Decimal(a), ValueRef::Decimal(b)) => Some(a.cmp(&b)),
        (ValueRef::DateTime(a), ValueRef::DateTime(b)) => Some(a.cmp(&b)),
        _ => None,
    }
}
