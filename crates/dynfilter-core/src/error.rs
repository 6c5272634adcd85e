//! Core error types.

use thiserror::Error;

use crate::catalog::ScalarType;
use dynfilter_proto::QueryOperator;

/// Errors raised while compiling filter conditions.
///
/// Every variant fails the whole compile call. Blank condition values are
/// skipped before any of these can occur.
#[derive(Debug, Error)]
pub enum Error {
    /// A path segment did not resolve against the current type or its bases.
    #[error("field not found: `{segment}` is not a member of `{entity}` (path `{path}`)")]
    FieldNotFound {
        /// Type the segment was looked up on.
        entity: String,
        /// Full path from the condition.
        path: String,
        /// The segment that failed.
        segment: String,
    },

    /// A raw value could not be parsed into the field's scalar type.
    #[error("cannot parse `{value}` as {expected} for field `{field}`: {reason}")]
    ValueParse {
        /// Field path from the condition.
        field: String,
        /// Offending raw value.
        value: String,
        /// Scalar type of the resolved field.
        expected: ScalarType,
        /// Parser message.
        reason: String,
    },

    /// The operator has no meaning for the resolved field type.
    #[error("operator {operator} is not supported on field `{field}` of type {field_type}")]
    UnsupportedOperator {
        /// Field path from the condition.
        field: String,
        /// Rejected operator.
        operator: QueryOperator,
        /// Rendered field type.
        field_type: String,
    },

    /// Protocol error while decoding conditions.
    #[error("protocol error: {0}")]
    Protocol(#[from] dynfilter_proto::Error),
}

impl Error {
    /// Field path the error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::FieldNotFound { path, .. } => Some(path),
            Error::ValueParse { field, .. } | Error::UnsupportedOperator { field, .. } => {
                Some(field)
            }
            Error::Protocol(_) => None,
        }
    }
}
