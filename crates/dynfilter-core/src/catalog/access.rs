//! Type-erased property accessors.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use dynfilter_proto::ValueRef;

/// The result of reading one property from an entity instance.
#[derive(Clone, Copy)]
pub enum Slot<'a> {
    /// The property (or an object on the way to it) is null.
    Null,
    /// A scalar value.
    Value(ValueRef<'a>),
    /// An embedded entity, to be read further by the next accessor.
    Object(&'a dyn Any),
}

impl<'a> Slot<'a> {
    /// Get the scalar value, if this slot holds one.
    pub fn value(self) -> Option<ValueRef<'a>> {
        match self {
            Slot::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this slot is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Null)
    }
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Null => f.write_str("Null"),
            Slot::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Slot::Object(_) => f.write_str("Object(..)"),
        }
    }
}

type AccessorFn = dyn for<'a> Fn(&'a dyn Any) -> Slot<'a> + Send + Sync;

/// Reads one property (or one base-type projection) from an erased entity.
///
/// An accessor handed an instance of the wrong type reads `Slot::Null`.
#[derive(Clone)]
pub struct Accessor(Arc<AccessorFn>);

impl Accessor {
    /// Wrap a reader function.
    pub fn new<F>(read: F) -> Self
    where
        F: for<'a> Fn(&'a dyn Any) -> Slot<'a> + Send + Sync + 'static,
    {
        Self(Arc::new(read))
    }

    /// Read from an entity instance.
    pub fn read<'a>(&self, entity: &'a dyn Any) -> Slot<'a> {
        (self.0)(entity)
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Accessor(..)")
    }
}
