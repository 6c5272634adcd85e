//! Entity catalog.
//!
//! The catalog describes, per Rust type, the properties that filter
//! conditions can address: their names, scalar types and accessors. It takes
//! the place of runtime reflection; each type describes itself once through
//! [`Entity::describe`].

mod access;
mod entity;
mod field;
mod scalar;
mod types;

pub use access::{Accessor, Slot};
pub use entity::{BaseDef, Entity, EntityDef, EntityDefBuilder};
pub use field::FieldDef;
pub use scalar::ScalarField;
pub use types::{EntityRef, FieldType, ScalarType};
