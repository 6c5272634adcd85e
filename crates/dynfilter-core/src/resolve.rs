//! Field path resolution.
//!
//! A path such as `"Owner.Address.City"` is resolved one segment at a time.
//! Each segment is matched, ignoring case, against the properties declared on
//! the current type; on a miss the search moves to that type's base, then the
//! base's base, before failing. The next segment continues from the type of
//! the property just found.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::catalog::{Accessor, EntityDef, FieldDef, FieldType, ScalarType, Slot};
use crate::error::Error;
use crate::registry::TypeRegistry;
use dynfilter_proto::PATH_SEPARATOR;

/// A type-checked accessor chain from an entity root to one property.
#[derive(Debug, Clone)]
pub struct ResolvedField {
    path: String,
    steps: Vec<Accessor>,
    field_type: FieldType,
}

impl ResolvedField {
    /// The path as written in the condition.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Type of the leaf property.
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    /// Scalar type of the leaf, if it is a scalar.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        self.field_type.scalar_type()
    }

    /// Number of accessors applied, base-type projections included.
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Read the leaf from an entity instance.
    ///
    /// A null object anywhere along the chain reads as `Slot::Null`.
    pub fn read<'a>(&self, entity: &'a dyn Any) -> Slot<'a> {
        let mut slot = Slot::Object(entity);
        for step in &self.steps {
            slot = match slot {
                Slot::Object(object) => step.read(object),
                _ => return Slot::Null,
            };
        }
        slot
    }
}

impl fmt::Display for ResolvedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// Resolve a dot-separated path against an entity definition.
pub fn resolve(
    registry: &TypeRegistry,
    root: &Arc<EntityDef>,
    path: &str,
) -> Result<ResolvedField, Error> {
    let mut current = Arc::clone(root);
    let mut steps = Vec::new();
    let mut leaf: Option<FieldType> = None;

    for segment in path.split(PATH_SEPARATOR) {
        if let Some(parent) = &leaf {
            current = match parent.entity() {
                Some(entity) => registry.resolve_ref(entity),
                None => {
                    return Err(Error::FieldNotFound {
                        entity: parent.to_string(),
                        path: path.to_string(),
                        segment: segment.to_string(),
                    })
                }
            };
        }

        let (field, upcasts) =
            find_declared(registry, &current, segment).ok_or_else(|| Error::FieldNotFound {
                entity: current.name().to_string(),
                path: path.to_string(),
                segment: segment.to_string(),
            })?;

        steps.extend(upcasts);
        steps.push(field.accessor);
        leaf = Some(field.field_type);
    }

    // `split` always yields at least one segment, so a leaf was found.
    let field_type = leaf.ok_or_else(|| Error::FieldNotFound {
        entity: root.name().to_string(),
        path: path.to_string(),
        segment: String::new(),
    })?;

    Ok(ResolvedField {
        path: path.to_string(),
        steps,
        field_type,
    })
}

/// Search `entity`, then each base type in turn, for a declared property.
///
/// Returns the property and the upcasts needed to reach its declaring type.
fn find_declared(
    registry: &TypeRegistry,
    entity: &Arc<EntityDef>,
    segment: &str,
) -> Option<(FieldDef, Vec<Accessor>)> {
    let mut level = Arc::clone(entity);
    let mut upcasts = Vec::new();

    loop {
        if let Some(field) = level.declared_field(segment) {
            return Some((field.clone(), upcasts));
        }
        let base = level.base()?.clone();
        upcasts.push(base.upcast);
        level = registry.resolve_ref(&base.entity);
    }
}
