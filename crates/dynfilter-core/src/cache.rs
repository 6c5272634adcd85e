//! Predicate cache.
//!
//! Memoises compiled expressions so that repeated condition lists skip path
//! resolution and value coercion.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::catalog::EntityDef;
use crate::predicate::PredicateExpr;
use dynfilter_proto::QueryCondition;

/// Cache key for a condition list.
///
/// Built from the entity definition and the non-blank conditions in input
/// order, values included: two lists differing only in blank conditions share
/// a fingerprint. Definitions compare by identity, so two definitions of the
/// same Rust type never share entries. The key holds its definition alive,
/// which keeps that identity from being reused.
#[derive(Clone)]
pub struct ConditionFingerprint {
    entity: Arc<EntityDef>,
    conditions: Vec<QueryCondition>,
}

impl ConditionFingerprint {
    /// Create a fingerprint for `conditions` on the definition `entity`.
    pub fn new(entity: &Arc<EntityDef>, conditions: &[QueryCondition]) -> Self {
        Self {
            entity: Arc::clone(entity),
            conditions: conditions
                .iter()
                .filter(|c| !c.is_blank())
                .cloned()
                .collect(),
        }
    }

    /// Number of conditions that take part in the fingerprint.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Check if no condition takes part in the fingerprint.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl PartialEq for ConditionFingerprint {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.entity, &other.entity) && self.conditions == other.conditions
    }
}

impl Eq for ConditionFingerprint {}

impl Hash for ConditionFingerprint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.entity).hash(state);
        self.conditions.hash(state);
    }
}

impl fmt::Debug for ConditionFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionFingerprint")
            .field("entity", &self.entity.name())
            .field("conditions", &self.conditions)
            .finish()
    }
}

/// Cached expression with its hit counter.
#[derive(Debug)]
pub struct CachedPredicate {
    /// The compiled expression.
    pub expr: Arc<PredicateExpr>,
    /// Number of cache hits for this entry.
    pub hit_count: AtomicU64,
}

impl CachedPredicate {
    /// Create a new cache entry.
    pub fn new(expr: Arc<PredicateExpr>) -> Self {
        Self {
            expr,
            hit_count: AtomicU64::new(0),
        }
    }

    /// Increment the hit count and return the new value.
    pub fn record_hit(&self) -> u64 {
        self.hit_count.fetch_add(1, AtomicOrdering::Relaxed) + 1
    }

    /// Get the current hit count.
    pub fn hits(&self) -> u64 {
        self.hit_count.load(AtomicOrdering::Relaxed)
    }
}

/// Cache statistics.
#[derive(Debug, Default)]
pub struct CacheStats {
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CacheStats {
    /// Get hit count.
    pub fn hits(&self) -> u64 {
        self.hits.load(AtomicOrdering::Relaxed)
    }

    /// Get miss count.
    pub fn misses(&self) -> u64 {
        self.misses.load(AtomicOrdering::Relaxed)
    }

    /// Get eviction count.
    pub fn evictions(&self) -> u64 {
        self.evictions.load(AtomicOrdering::Relaxed)
    }

    /// Calculate hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total > 0.0 {
            hits / total
        } else {
            0.0
        }
    }
}

/// Bounded predicate cache with least-hit eviction.
#[derive(Debug)]
pub struct PredicateCache {
    cache: RwLock<HashMap<ConditionFingerprint, CachedPredicate>>,
    max_entries: usize,
    stats: CacheStats,
}

impl PredicateCache {
    /// Create a cache holding at most `max_entries` predicates.
    pub fn new(max_entries: usize) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            max_entries,
            stats: CacheStats::default(),
        }
    }

    /// Get a cached expression.
    pub fn get(&self, fingerprint: &ConditionFingerprint) -> Option<Arc<PredicateExpr>> {
        let guard = self.cache.read();
        match guard.get(fingerprint) {
            Some(cached) => {
                cached.record_hit();
                self.stats.hits.fetch_add(1, AtomicOrdering::Relaxed);
                Some(Arc::clone(&cached.expr))
            }
            None => {
                self.stats.misses.fetch_add(1, AtomicOrdering::Relaxed);
                None
            }
        }
    }

    /// Insert an expression.
    ///
    /// If the cache is full, evicts the entry with the fewest hits.
    pub fn insert(&self, fingerprint: ConditionFingerprint, expr: Arc<PredicateExpr>) {
        if self.max_entries == 0 {
            return;
        }

        let mut guard = self.cache.write();
        if guard.len() >= self.max_entries && !guard.contains_key(&fingerprint) {
            self.evict_least_hit(&mut guard);
        }
        guard.insert(fingerprint, CachedPredicate::new(expr));
    }

    fn evict_least_hit(&self, cache: &mut HashMap<ConditionFingerprint, CachedPredicate>) {
        let evict_key = cache
            .iter()
            .min_by_key(|(_, v)| v.hits())
            .map(|(k, _)| k.clone());

        if let Some(key) = evict_key {
            cache.remove(&key);
            self.stats.evictions.fetch_add(1, AtomicOrdering::Relaxed);
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Get the current number of cached entries.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.cache.write().clear();
    }
}
