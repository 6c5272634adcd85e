//! dynfilter protocol types.
//!
//! This crate defines the vocabulary exchanged between callers (HTTP handlers,
//! RPC layers) and the `dynfilter-core` predicate compiler.
//!
//! # Modules
//!
//! - [`condition`] - Filter conditions, operators and reserved separators
//! - [`value`] - Typed constants and borrowed field values
//! - [`error`] - Protocol error types
//!
//! # Serialization
//!
//! Conditions are plain serde types. The JSON shape matches what a web
//! front end posts:
//!
//! ```ignore
//! use dynfilter_proto::conditions_from_json;
//!
//! let conditions = conditions_from_json(
//!     r#"[{"field": "Address.City", "operator": "Equal", "value": "NYC", "notNull": true}]"#,
//! )?;
//! ```

pub mod condition;
pub mod error;
pub mod value;

pub use error::Error;

// Re-export commonly used types at crate root
pub use condition::{
    conditions_from_json, conditions_to_json, QueryCondition, QueryOperator, LIST_SEPARATOR,
    PATH_SEPARATOR, RANGE_SEPARATOR, TRUE_LITERAL,
};
pub use value::{Value, ValueRef};
