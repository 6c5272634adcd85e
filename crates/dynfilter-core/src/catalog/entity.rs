//! Entity definitions.

use std::any::TypeId;
use std::collections::HashMap;
use std::marker::PhantomData;

use super::access::{Accessor, Slot};
use super::field::FieldDef;
use super::scalar::ScalarField;
use super::types::{EntityRef, FieldType};

/// A Rust type whose properties can be filtered by path.
///
/// `describe` lists the properties declared directly on the type; fields of
/// a base type are reached through [`EntityDefBuilder::extends`].
pub trait Entity: std::any::Any + Send + Sync {
    /// Describe this type's declared properties.
    fn describe() -> EntityDef;
}

/// Link from an entity to the base type it extends.
#[derive(Debug, Clone)]
pub struct BaseDef {
    /// The base entity type.
    pub entity: EntityRef,
    /// Projects an instance of the derived type onto its base value.
    pub upcast: Accessor,
}

/// An entity definition: the properties declared on one Rust type.
#[derive(Debug, Clone)]
pub struct EntityDef {
    name: String,
    type_id: TypeId,
    fields: Vec<FieldDef>,
    /// Lower-cased field name to index in `fields`.
    lookup: HashMap<String, usize>,
    base: Option<BaseDef>,
}

impl EntityDef {
    /// Start describing the entity type `T`.
    pub fn builder<T: Entity>(name: impl Into<String>) -> EntityDefBuilder<T> {
        EntityDefBuilder {
            name: name.into(),
            fields: Vec::new(),
            base: None,
            _entity: PhantomData,
        }
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type identity of the described Rust type.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Properties declared directly on this type, in declaration order.
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// The base type this entity extends, if any.
    pub fn base(&self) -> Option<&BaseDef> {
        self.base.as_ref()
    }

    /// Look up a property declared directly on this type, ignoring case.
    ///
    /// Properties of base types are not searched.
    pub fn declared_field(&self, name: &str) -> Option<&FieldDef> {
        self.lookup
            .get(&name.to_lowercase())
            .map(|&index| &self.fields[index])
    }

    /// Check if this definition describes `T`.
    pub fn describes<T: Entity>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }
}

/// Builder for [`EntityDef`], typed on the described entity.
pub struct EntityDefBuilder<T> {
    name: String,
    fields: Vec<FieldDef>,
    base: Option<BaseDef>,
    _entity: PhantomData<fn(&T)>,
}

impl<T: Entity> EntityDefBuilder<T> {
    /// Declare a scalar property.
    ///
    /// The scalar type and nullability follow the Rust type returned by `get`
    /// (`Option<_>` is nullable).
    pub fn field<V, F>(self, name: impl Into<String>, get: F) -> Self
    where
        V: ScalarField + 'static,
        F: for<'a> Fn(&'a T) -> &'a V + Send + Sync + 'static,
    {
        let accessor = Accessor::new(move |entity| match entity.downcast_ref::<T>() {
            Some(e) => get(e).value_ref().map_or(Slot::Null, Slot::Value),
            None => Slot::Null,
        });
        self.with_field(FieldDef::new(name, V::field_type(), accessor))
    }

    /// Declare an embedded entity property that is always present.
    pub fn embedded<N, F>(self, name: impl Into<String>, get: F) -> Self
    where
        N: Entity,
        F: for<'a> Fn(&'a T) -> &'a N + Send + Sync + 'static,
    {
        let accessor = Accessor::new(move |entity| match entity.downcast_ref::<T>() {
            Some(e) => Slot::Object(get(e)),
            None => Slot::Null,
        });
        self.with_field(FieldDef::new(
            name,
            FieldType::Embedded(EntityRef::of::<N>()),
            accessor,
        ))
    }

    /// Declare a nullable embedded entity property.
    pub fn optional_embedded<N, F>(self, name: impl Into<String>, get: F) -> Self
    where
        N: Entity,
        F: for<'a> Fn(&'a T) -> Option<&'a N> + Send + Sync + 'static,
    {
        let accessor = Accessor::new(move |entity| {
            match entity.downcast_ref::<T>().and_then(|e| get(e)) {
                Some(nested) => Slot::Object(nested),
                None => Slot::Null,
            }
        });
        self.with_field(FieldDef::new(
            name,
            FieldType::OptionalEmbedded(EntityRef::of::<N>()),
            accessor,
        ))
    }

    /// Declare the base type this entity extends.
    ///
    /// Lookups that miss on this type continue on `B`.
    pub fn extends<B, F>(mut self, get: F) -> Self
    where
        B: Entity,
        F: for<'a> Fn(&'a T) -> &'a B + Send + Sync + 'static,
    {
        let upcast = Accessor::new(move |entity| match entity.downcast_ref::<T>() {
            Some(e) => Slot::Object(get(e)),
            None => Slot::Null,
        });
        self.base = Some(BaseDef {
            entity: EntityRef::of::<B>(),
            upcast,
        });
        self
    }

    /// Add a prepared property definition.
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    /// Finish the definition.
    ///
    /// When two declared names differ only in case, the first one wins.
    pub fn build(self) -> EntityDef {
        let mut lookup = HashMap::with_capacity(self.fields.len());
        for (index, field) in self.fields.iter().enumerate() {
            let key = field.name.to_lowercase();
            if lookup.contains_key(&key) {
                tracing::warn!(
                    entity = %self.name,
                    field = %field.name,
                    "duplicate property name ignored"
                );
                continue;
            }
            lookup.insert(key, index);
        }

        EntityDef {
            name: self.name,
            type_id: TypeId::of::<T>(),
            fields: self.fields,
            lookup,
            base: self.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ScalarType;
    use dynfilter_proto::ValueRef;

    struct Audited {
        created_by: Option<String>,
    }

    struct User {
        audit: Audited,
        name: String,
        age: i32,
    }

    impl Entity for Audited {
        fn describe() -> EntityDef {
            EntityDef::builder::<Audited>("Audited")
                .field("CreatedBy", |a| &a.created_by)
                .build()
        }
    }

    impl Entity for User {
        fn describe() -> EntityDef {
            EntityDef::builder::<User>("User")
                .extends(|u| &u.audit)
                .field("Name", |u| &u.name)
                .field("Age", |u| &u.age)
                .build()
        }
    }

    fn sample_user() -> User {
        User {
            audit: Audited { created_by: None },
            name: "Alice".into(),
            age: 30,
        }
    }

    #[test]
    fn test_entity_builder() {
        let entity = User::describe();

        assert_eq!(entity.name(), "User");
        assert!(entity.describes::<User>());
        assert_eq!(entity.fields().len(), 2);
        assert_eq!(
            entity.fields()[1].field_type,
            FieldType::Scalar(ScalarType::Int32)
        );
        assert_eq!(entity.base().unwrap().entity, EntityRef::of::<Audited>());
    }

    #[test]
    fn test_declared_field_ignores_case() {
        let entity = User::describe();

        assert!(entity.declared_field("name").is_some());
        assert!(entity.declared_field("AGE").is_some());
        assert!(entity.declared_field("nonexistent").is_none());
    }

    #[test]
    fn test_declared_field_excludes_base_fields() {
        let entity = User::describe();
        assert!(entity.declared_field("CreatedBy").is_none());

        let base = entity.base().unwrap().entity.describe();
        assert!(base.declared_field("createdby").is_some());
    }

    #[test]
    fn test_accessors_read_values() {
        let entity = User::describe();
        let user = sample_user();

        let name = entity.declared_field("Name").unwrap();
        assert_eq!(name.accessor.read(&user).value(), Some(ValueRef::Str("Alice")));

        let upcast = &entity.base().unwrap().upcast;
        let audit = match upcast.read(&user) {
            Slot::Object(audit) => audit,
            other => panic!("Expected Object, got {other:?}"),
        };
        let created_by = Audited::describe();
        let created_by = created_by.declared_field("CreatedBy").unwrap();
        assert!(created_by.accessor.read(audit).is_null());
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let entity = EntityDef::builder::<User>("User")
            .field("Name", |u| &u.name)
            .field("NAME", |u| &u.age)
            .build();

        assert_eq!(entity.fields().len(), 2);
        assert_eq!(
            entity.declared_field("name").unwrap().field_type,
            FieldType::Scalar(ScalarType::String)
        );
    }
}
