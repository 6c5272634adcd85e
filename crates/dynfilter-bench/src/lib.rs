//! dynfilter Benchmark Suite
//!
//! Criterion benchmarks for the predicate compiler.
//!
//! # Benchmark Categories
//!
//! - **Compile**: Resolution, coercion and folding cost per condition list
//! - **Filter**: Evaluation of compiled predicates over generated entities
//! - **Cache**: Predicate cache hit and miss paths
//!
//! Set `RUST_LOG` to see the compiler's tracing output while benchmarking.

pub mod fixtures;
pub mod harness;

pub use fixtures::{generate_customers, Customer, Scale};
pub use harness::{init_tracing, TestContext};
