//! Benchmark harness helpers.

use std::sync::{Arc, Once};

use dynfilter_core::{CompilerConfig, QueryCompiler, TypeRegistry};

use crate::fixtures::{generate_customers, Customer, Scale};

static TRACING: Once = Once::new();

/// Install a `fmt` subscriber when `RUST_LOG` is set.
///
/// Benchmarks run silent otherwise, so logging does not skew timings.
pub fn init_tracing() {
    TRACING.call_once(|| {
        if std::env::var_os("RUST_LOG").is_some() {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .with_target(false)
                .init();
        }
    });
}

/// Compiler plus generated customers for one benchmark group.
pub struct TestContext {
    pub compiler: QueryCompiler,
    pub customers: Vec<Customer>,
}

impl TestContext {
    /// Create a context without a predicate cache.
    pub fn with_scale(scale: Scale) -> Self {
        Self::with_config(scale, CompilerConfig::default())
    }

    /// Create a context with a predicate cache of `capacity` entries.
    pub fn with_cache(scale: Scale, capacity: usize) -> Self {
        Self::with_config(scale, CompilerConfig::with_cache(capacity))
    }

    fn with_config(scale: Scale, config: CompilerConfig) -> Self {
        init_tracing();
        // Null-hint violations are not what these benchmarks measure.
        let config = config.warn_on_null_violation(false);
        Self {
            compiler: QueryCompiler::new(config).with_registry(Arc::new(TypeRegistry::new())),
            customers: generate_customers(scale.count()),
        }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::with_scale(Scale::default())
    }
}
