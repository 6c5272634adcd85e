//! Filter conditions as supplied by callers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Separator between the two bounds of a range value (`"18|30"`).
pub const RANGE_SEPARATOR: char = '|';

/// Reserved list separator. A raw string or integer value containing it
/// produces no constant.
pub const LIST_SEPARATOR: char = ',';

/// Separator between the segments of a field path (`"Address.City"`).
pub const PATH_SEPARATOR: char = '.';

/// The only raw text that coerces to boolean `true`.
pub const TRUE_LITERAL: &str = "1";

/// Closed set of condition operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOperator {
    /// Field equals the constant.
    Equal,
    /// Field differs from the constant.
    NotEqual,
    /// Field is greater than the constant.
    Greater,
    /// Field is greater than or equal to the constant.
    GreaterEqual,
    /// Field is less than the constant.
    Less,
    /// Field is less than or equal to the constant.
    LessEqual,
    /// Field lies within an inclusive `start|end` range.
    Between,
    /// String field starts with the constant.
    StartsWith,
    /// String field ends with the constant.
    EndsWith,
    /// String field contains the constant.
    Contains,
    /// Set membership. Accepted but never filters.
    In,
}

impl QueryOperator {
    /// All operators, in declaration order.
    pub const ALL: [QueryOperator; 11] = [
        QueryOperator::Equal,
        QueryOperator::NotEqual,
        QueryOperator::Greater,
        QueryOperator::GreaterEqual,
        QueryOperator::Less,
        QueryOperator::LessEqual,
        QueryOperator::Between,
        QueryOperator::StartsWith,
        QueryOperator::EndsWith,
        QueryOperator::Contains,
        QueryOperator::In,
    ];

    /// Canonical operator name.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::Equal => "Equal",
            QueryOperator::NotEqual => "NotEqual",
            QueryOperator::Greater => "Greater",
            QueryOperator::GreaterEqual => "GreaterEqual",
            QueryOperator::Less => "Less",
            QueryOperator::LessEqual => "LessEqual",
            QueryOperator::Between => "Between",
            QueryOperator::StartsWith => "StartsWith",
            QueryOperator::EndsWith => "EndsWith",
            QueryOperator::Contains => "Contains",
            QueryOperator::In => "In",
        }
    }

    /// Check if this operator needs an ordered field type.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            QueryOperator::Greater
                | QueryOperator::GreaterEqual
                | QueryOperator::Less
                | QueryOperator::LessEqual
                | QueryOperator::Between
        )
    }

    /// Check if this operator is a substring test on a string field.
    pub fn is_text_match(&self) -> bool {
        matches!(
            self,
            QueryOperator::StartsWith | QueryOperator::EndsWith | QueryOperator::Contains
        )
    }

    /// Check if this operator takes two bounds.
    pub fn is_range(&self) -> bool {
        matches!(self, QueryOperator::Between)
    }
}

impl fmt::Display for QueryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryOperator {
    type Err = Error;

    /// Parse an operator name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        QueryOperator::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownOperator(s.to_string()))
    }
}

/// One filter clause: field path, operator, raw value and not-null hint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCondition {
    /// Dot-separated field path.
    pub field: String,
    /// Operator applied to the field.
    pub operator: QueryOperator,
    /// Raw value. Blank values make the condition a no-op.
    #[serde(default)]
    pub value: Option<String>,
    /// Caller guarantees the field is never null for this condition.
    #[serde(default)]
    pub not_null: bool,
}

impl QueryCondition {
    /// Create a new condition.
    pub fn new(field: impl Into<String>, operator: QueryOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: Some(value.into()),
            not_null: false,
        }
    }

    /// Create a condition without a value. It never contributes a filter.
    pub fn without_value(field: impl Into<String>, operator: QueryOperator) -> Self {
        Self {
            field: field.into(),
            operator,
            value: None,
            not_null: false,
        }
    }

    /// Create an `Equal` condition.
    pub fn equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::Equal, value)
    }

    /// Create a `NotEqual` condition.
    pub fn not_equal(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::NotEqual, value)
    }

    /// Create a `Greater` condition.
    pub fn greater(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::Greater, value)
    }

    /// Create a `Less` condition.
    pub fn less(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::Less, value)
    }

    /// Create a `Contains` condition.
    pub fn contains(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::Contains, value)
    }

    /// Create a `StartsWith` condition.
    pub fn starts_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::StartsWith, value)
    }

    /// Create an `EndsWith` condition.
    pub fn ends_with(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, QueryOperator::EndsWith, value)
    }

    /// Create a `Between` condition from its two bounds.
    pub fn between(
        field: impl Into<String>,
        start: impl AsRef<str>,
        end: impl AsRef<str>,
    ) -> Self {
        let value = format!("{}{}{}", start.as_ref(), RANGE_SEPARATOR, end.as_ref());
        Self::new(field, QueryOperator::Between, value)
    }

    /// Mark the field as guaranteed non-null.
    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Check if the value is missing, empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.value.as_deref().map_or(true, |v| v.trim().is_empty())
    }
}

impl fmt::Display for QueryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.operator)?;
        match &self.value {
            Some(value) => write!(f, " {value:?}")?,
            None => f.write_str(" <none>")?,
        }
        if self.not_null {
            f.write_str(" [not null]")?;
        }
        Ok(())
    }
}

/// Decode a JSON array of conditions.
pub fn conditions_from_json(json: &str) -> Result<Vec<QueryCondition>, Error> {
    serde_json::from_str(json).map_err(|e| Error::Deserialization(e.to_string()))
}

/// Encode conditions as a JSON array.
pub fn conditions_to_json(conditions: &[QueryCondition]) -> Result<String, Error> {
    serde_json::to_string(conditions).map_err(|e| Error::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_operator_from_str() {
        assert_eq!("Contains".parse::<QueryOperator>().unwrap(), QueryOperator::Contains);
        assert_eq!("greaterequal".parse::<QueryOperator>().unwrap(), QueryOperator::GreaterEqual);
        assert_eq!(" between ".parse::<QueryOperator>().unwrap(), QueryOperator::Between);
        assert!(matches!(
            "Like".parse::<QueryOperator>(),
            Err(Error::UnknownOperator(name)) if name == "Like"
        ));
    }

    #[test]
    fn test_operator_display_matches_parse() {
        for op in QueryOperator::ALL {
            assert_eq!(op.to_string().parse::<QueryOperator>().unwrap(), op);
        }
    }

    #[test]
    fn test_operator_classes() {
        assert!(QueryOperator::Between.is_ordering());
        assert!(QueryOperator::Between.is_range());
        assert!(QueryOperator::Contains.is_text_match());
        assert!(!QueryOperator::In.is_ordering());
        assert!(!QueryOperator::In.is_text_match());
    }

    #[test]
    fn test_blank_values() {
        assert!(QueryCondition::without_value("Name", QueryOperator::Equal).is_blank());
        assert!(QueryCondition::equal("Name", "").is_blank());
        assert!(QueryCondition::equal("Name", " \t\n").is_blank());
        assert!(!QueryCondition::equal("Name", " x ").is_blank());
    }

    #[test]
    fn test_between_builder() {
        let condition = QueryCondition::between("Age", "18", "30").not_null();
        assert_eq!(condition.value.as_deref(), Some("18|30"));
        assert!(condition.not_null);
    }

    #[test]
    fn test_display() {
        let condition = QueryCondition::contains("Name", "John");
        assert_eq!(condition.to_string(), "Name Contains \"John\"");

        let condition = QueryCondition::equal("Address.City", "NYC").not_null();
        assert_eq!(condition.to_string(), "Address.City Equal \"NYC\" [not null]");
    }

    #[test]
    fn test_json_shape() {
        let json = r#"[
            {"field": "Name", "operator": "Contains", "value": "John"},
            {"field": "Address.City", "operator": "Equal", "value": "NYC", "notNull": true},
            {"field": "Age", "operator": "Between"}
        ]"#;

        let conditions = conditions_from_json(json).unwrap();
        assert_eq!(conditions.len(), 3);
        assert_eq!(conditions[0], QueryCondition::contains("Name", "John"));
        assert_eq!(conditions[1], QueryCondition::equal("Address.City", "NYC").not_null());
        assert_eq!(
            conditions[2],
            QueryCondition::without_value("Age", QueryOperator::Between)
        );

        let encoded = conditions_to_json(&conditions[1..2]).unwrap();
        assert_eq!(
            encoded,
            r#"[{"field":"Address.City","operator":"Equal","value":"NYC","notNull":true}]"#
        );
    }

    #[test]
    fn test_json_rejects_unknown_operator() {
        let json = r#"[{"field": "Name", "operator": "Like", "value": "J%"}]"#;
        assert!(matches!(conditions_from_json(json), Err(Error::Deserialization(_))));
    }
}
