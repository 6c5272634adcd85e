//! Property definitions for entities.

use super::access::Accessor;
use super::types::FieldType;

/// A property declared directly on an entity type.
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Property name as declared.
    pub name: String,
    /// Property data type.
    pub field_type: FieldType,
    /// Reads the property from an instance of the declaring type.
    pub accessor: Accessor,
}

impl FieldDef {
    /// Create a new property definition.
    pub fn new(name: impl Into<String>, field_type: FieldType, accessor: Accessor) -> Self {
        Self {
            name: name.into(),
            field_type,
            accessor,
        }
    }
}
