//! Core type definitions for the catalog.

use std::any::{self, TypeId};
use std::fmt;

use super::entity::{Entity, EntityDef};

/// Scalar data types a filter condition can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    /// UTF-8 string.
    String,
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit floating point.
    Float32,
    /// 64-bit floating point.
    Float64,
    /// Fixed-precision decimal.
    Decimal,
    /// Boolean value.
    Bool,
    /// Date and time.
    DateTime,
    /// UUID (128-bit identifier).
    Uuid,
}

impl ScalarType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ScalarType::Int32
                | ScalarType::Int64
                | ScalarType::Float32
                | ScalarType::Float64
                | ScalarType::Decimal
        )
    }

    /// Check if this type is a string type.
    pub fn is_text(&self) -> bool {
        matches!(self, ScalarType::String)
    }

    /// Check if values of this type have a total order usable by
    /// `Greater`/`Less`/`Between`.
    pub fn is_ordered(&self) -> bool {
        self.is_numeric() || matches!(self, ScalarType::DateTime)
    }

    /// Check if a raw value containing the list separator is withheld from
    /// parsing for this type.
    pub fn is_list_guarded(&self) -> bool {
        matches!(self, ScalarType::String | ScalarType::Int32 | ScalarType::Int64)
    }

    /// Lower-case type name used in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "string",
            ScalarType::Int32 => "int32",
            ScalarType::Int64 => "int64",
            ScalarType::Float32 => "float32",
            ScalarType::Float64 => "float64",
            ScalarType::Decimal => "decimal",
            ScalarType::Bool => "bool",
            ScalarType::DateTime => "datetime",
            ScalarType::Uuid => "uuid",
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reference to another entity type, described on demand.
#[derive(Clone, Copy)]
pub struct EntityRef {
    type_id: TypeId,
    type_name: &'static str,
    describe: fn() -> EntityDef,
}

impl EntityRef {
    /// Reference the entity type `E`.
    pub fn of<E: Entity>() -> Self {
        Self {
            type_id: TypeId::of::<E>(),
            type_name: any::type_name::<E>(),
            describe: E::describe,
        }
    }

    /// Type identity of the referenced entity.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Unqualified Rust type name of the referenced entity.
    pub fn short_name(&self) -> &'static str {
        let base = self.type_name.split('<').next().unwrap_or(self.type_name);
        base.rsplit("::").next().unwrap_or(base)
    }

    /// Build the referenced entity's description.
    pub fn describe(&self) -> EntityDef {
        (self.describe)()
    }
}

impl PartialEq for EntityRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for EntityRef {}

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EntityRef").field(&self.type_name).finish()
    }
}

/// Field types - a scalar or an embedded entity, each optionally nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// A scalar value.
    Scalar(ScalarType),
    /// An optional scalar value (nullable).
    OptionalScalar(ScalarType),
    /// An embedded entity (nested object).
    Embedded(EntityRef),
    /// An optional embedded entity.
    OptionalEmbedded(EntityRef),
}

impl FieldType {
    /// Get the inner scalar type if this is a scalar-based type.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            FieldType::Scalar(s) | FieldType::OptionalScalar(s) => Some(*s),
            _ => None,
        }
    }

    /// Get the referenced entity if this is an embedded type.
    pub fn entity(&self) -> Option<&EntityRef> {
        match self {
            FieldType::Embedded(e) | FieldType::OptionalEmbedded(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Scalar(s) => write!(f, "{s}"),
            FieldType::OptionalScalar(s) => write!(f, "{s}?"),
            FieldType::Embedded(e) => write!(f, "entity {}", e.short_name()),
            FieldType::OptionalEmbedded(e) => write!(f, "entity {}?", e.short_name()),
        }
    }
}
