//! dynfilter core - compiles string-encoded filter conditions into typed
//! predicates.
//!
//! Entity types describe their filterable properties once through the
//! [`Entity`] trait. A list of [`QueryCondition`](proto::QueryCondition)s is
//! then resolved against that description, coerced to typed constants and
//! folded into a single [`Predicate`].
//!
//! ```ignore
//! let predicate = dynfilter_core::compile::<Person>(&[
//!     QueryCondition::contains("Name", "John"),
//!     QueryCondition::equal("Address.City", "NYC").not_null(),
//! ])?;
//! let matches: Vec<&Person> = predicate.filter(&people).collect();
//! ```

pub mod cache;
pub mod catalog;
pub mod coerce;
pub mod compiler;
pub mod config;
pub mod error;
pub mod predicate;
pub mod registry;
pub mod resolve;

pub use cache::{CacheStats, ConditionFingerprint, PredicateCache};
pub use catalog::{
    Accessor, BaseDef, Entity, EntityDef, EntityDefBuilder, EntityRef, FieldDef, FieldType,
    ScalarField, ScalarType, Slot,
};
pub use coerce::{Operands, ValueParser};
pub use compiler::{compile, Predicate, QueryCompiler};
pub use config::CompilerConfig;
pub use error::Error;
pub use predicate::{Comparison, PredicateExpr, TextMatch};
pub use registry::TypeRegistry;
pub use resolve::{resolve, ResolvedField};

/// Re-export protocol types.
pub use dynfilter_proto as proto;
