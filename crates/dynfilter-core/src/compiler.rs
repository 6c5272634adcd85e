//! Condition list compilation.
//!
//! [`QueryCompiler`] turns an ordered list of [`QueryCondition`]s into one
//! predicate. Each non-blank condition is resolved, type-checked, coerced and
//! built in turn, then joined to the previous ones with AND. Blank values are
//! skipped; any other problem fails the whole call.

use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

use tracing::{debug, trace};

use crate::cache::{CacheStats, ConditionFingerprint, PredicateCache};
use crate::catalog::{Entity, EntityDef};
use crate::coerce::ValueParser;
use crate::config::CompilerConfig;
use crate::error::Error;
use crate::predicate::{build_condition, check_operator, PredicateExpr};
use crate::registry::TypeRegistry;
use crate::resolve::resolve;
use dynfilter_proto::{conditions_from_json, QueryCondition, QueryOperator};

static DEFAULT_COMPILER: OnceLock<QueryCompiler> = OnceLock::new();

/// A compiled filter over entities of type `T`.
///
/// Immutable and cheap to clone; clones share the same expression.
pub struct Predicate<T> {
    expr: Arc<PredicateExpr>,
    _entity: PhantomData<fn(&T) -> bool>,
}

impl<T: Entity> Predicate<T> {
    pub(crate) fn from_expr(expr: Arc<PredicateExpr>) -> Self {
        Self {
            expr,
            _entity: PhantomData,
        }
    }

    /// Test one entity.
    pub fn matches(&self, entity: &T) -> bool {
        self.expr.evaluate(entity)
    }

    /// Keep the entities that match, in order.
    pub fn filter<'a, I>(&'a self, items: I) -> impl Iterator<Item = &'a T> + 'a
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        items.into_iter().filter(move |item| self.matches(item))
    }

    /// Convert into a plain closure.
    pub fn into_fn(self) -> impl Fn(&T) -> bool + Clone + Send + Sync + 'static {
        move |entity: &T| self.matches(entity)
    }

    /// The logical expression behind this predicate.
    pub fn expr(&self) -> &PredicateExpr {
        &self.expr
    }

    /// Check if this predicate accepts every entity.
    pub fn is_identity(&self) -> bool {
        self.expr.is_identity()
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            expr: Arc::clone(&self.expr),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.expr).finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}

/// Compiles condition lists into predicates.
#[derive(Debug)]
pub struct QueryCompiler {
    registry: Arc<TypeRegistry>,
    parser: ValueParser,
    cache: Option<PredicateCache>,
    config: CompilerConfig,
}

impl Default for QueryCompiler {
    fn default() -> Self {
        Self::new(CompilerConfig::default())
    }
}

impl QueryCompiler {
    /// Create a compiler over the process-wide type registry.
    pub fn new(config: CompilerConfig) -> Self {
        Self {
            registry: TypeRegistry::global(),
            parser: ValueParser::with_datetime_formats(config.datetime_formats.clone()),
            cache: config.cache_capacity.map(PredicateCache::new),
            config,
        }
    }

    /// Use a dedicated type registry.
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The process-wide compiler with default configuration.
    pub fn global() -> &'static QueryCompiler {
        DEFAULT_COMPILER.get_or_init(QueryCompiler::default)
    }

    /// The type registry used for path resolution.
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// The configuration this compiler was built with.
    pub fn config(&self) -> &CompilerConfig {
        &self.config
    }

    /// Compile conditions into a predicate over `T`.
    pub fn compile<T: Entity>(&self, conditions: &[QueryCondition]) -> Result<Predicate<T>, Error> {
        let entity = self.registry.entity::<T>();
        let expr = self.compile_expr(&entity, conditions)?;
        Ok(Predicate::from_expr(expr))
    }

    /// Compile a JSON array of conditions into a predicate over `T`.
    pub fn compile_json<T: Entity>(&self, json: &str) -> Result<Predicate<T>, Error> {
        let conditions = conditions_from_json(json)?;
        self.compile(&conditions)
    }

    /// Compile conditions against an entity definition.
    ///
    /// Cached results are keyed by the identity of `entity`, so a definition
    /// never reuses a predicate compiled against another one.
    pub fn compile_expr(
        &self,
        entity: &Arc<EntityDef>,
        conditions: &[QueryCondition],
    ) -> Result<Arc<PredicateExpr>, Error> {
        let fingerprint = self
            .cache
            .as_ref()
            .map(|_| ConditionFingerprint::new(entity, conditions));

        if let (Some(cache), Some(fp)) = (&self.cache, &fingerprint) {
            if let Some(expr) = cache.get(fp) {
                trace!(entity = entity.name(), "predicate cache hit");
                return Ok(expr);
            }
        }

        let mut expr = PredicateExpr::True;
        let mut contributing = 0usize;
        for condition in conditions.iter().filter(|c| !c.is_blank()) {
            let built = self.build_one(entity, condition)?;
            trace!(condition = %condition, predicate = %built, "built condition");
            expr = PredicateExpr::and(expr, built);
            contributing += 1;
        }

        debug!(
            entity = entity.name(),
            contributing,
            skipped = conditions.len() - contributing,
            "compiled predicate"
        );

        let expr = Arc::new(expr);
        if let (Some(cache), Some(fp)) = (&self.cache, fingerprint) {
            cache.insert(fp, Arc::clone(&expr));
        }
        Ok(expr)
    }

    fn build_one(
        &self,
        entity: &Arc<EntityDef>,
        condition: &QueryCondition,
    ) -> Result<PredicateExpr, Error> {
        let field = resolve(&self.registry, entity, &condition.field)?;

        if condition.operator == QueryOperator::In {
            debug!(field = %condition.field, "set membership builds no predicate");
            return Ok(PredicateExpr::True);
        }

        let scalar = check_operator(&field, condition.operator)?;
        let raw = condition.value.as_deref().unwrap_or_default();
        let operands = self
            .parser
            .coerce(&condition.field, raw, scalar, condition.operator)?;

        Ok(build_condition(
            Arc::new(field),
            condition.operator,
            operands,
            condition.not_null,
            self.config.warn_on_null_violation,
        ))
    }

    /// Predicate cache statistics, if caching is enabled.
    pub fn cache_stats(&self) -> Option<&CacheStats> {
        self.cache.as_ref().map(PredicateCache::stats)
    }

    /// Number of cached predicates.
    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, PredicateCache::len)
    }

    /// Drop every cached predicate.
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }
}

/// Compile conditions into a predicate over `T` with the default compiler.
pub fn compile<T: Entity>(conditions: &[QueryCondition]) -> Result<Predicate<T>, Error> {
    QueryCompiler::global().compile(conditions)
}
