//! Per-type metadata cache.
//!
//! The registry maps a Rust type to its [`EntityDef`]. Definitions are built
//! on first use and never change afterwards.

use std::any::TypeId;
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use crate::catalog::{Entity, EntityDef, EntityRef};

static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();

/// Cache of entity definitions keyed by type identity.
///
/// Concurrent first access may describe the same type more than once; the
/// first inserted definition is kept and every caller gets that one.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<TypeId, Arc<EntityDef>>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            types: DashMap::new(),
        }
    }

    /// The process-wide registry.
    pub fn global() -> Arc<TypeRegistry> {
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(TypeRegistry::new())))
    }

    /// Get the definition of `E`, describing it on first use.
    pub fn entity<E: Entity>(&self) -> Arc<EntityDef> {
        self.resolve_ref(&EntityRef::of::<E>())
    }

    /// Get the definition behind an entity reference, describing it on first use.
    pub fn resolve_ref(&self, entity: &EntityRef) -> Arc<EntityDef> {
        if let Some(existing) = self.types.get(&entity.type_id()) {
            return Arc::clone(existing.value());
        }

        // Described outside the map lock; a racing insert wins.
        let described = entity.describe();
        debug_assert_eq!(described.type_id(), entity.type_id());
        debug!(
            entity = described.name(),
            fields = described.fields().len(),
            "described entity type"
        );

        let def = Arc::new(described);
        Arc::clone(self.types.entry(entity.type_id()).or_insert(def).value())
    }

    /// Register a definition ahead of first use.
    ///
    /// Returns the definition now cached for its type, which is the existing
    /// one if the type was already registered.
    pub fn register(&self, def: EntityDef) -> Arc<EntityDef> {
        let type_id = def.type_id();
        Arc::clone(self.types.entry(type_id).or_insert_with(|| Arc::new(def)).value())
    }

    /// Check if `E` has been described.
    pub fn contains<E: Entity>(&self) -> bool {
        self.types.contains_key(&TypeId::of::<E>())
    }

    /// Number of described types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if no type has been described yet.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
