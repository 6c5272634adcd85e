//! Mapping from Rust field types to catalog scalar types.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{FieldType, ScalarType};
use dynfilter_proto::ValueRef;

/// A Rust type that can back a filterable scalar property.
///
/// `Option<T>` marks the property nullable.
pub trait ScalarField {
    /// Scalar type of the property.
    const SCALAR: ScalarType;
    /// Whether the property can hold null.
    const NULLABLE: bool;

    /// Borrow the current value; `None` means null.
    fn value_ref(&self) -> Option<ValueRef<'_>>;

    /// Catalog field type for this Rust type.
    fn field_type() -> FieldType {
        if Self::NULLABLE {
            FieldType::OptionalScalar(Self::SCALAR)
        } else {
            FieldType::Scalar(Self::SCALAR)
        }
    }
}

macro_rules! copy_scalar_field {
    ($ty:ty, $scalar:ident) => {
        impl ScalarField for $ty {
            const SCALAR: ScalarType = ScalarType::$scalar;
            const NULLABLE: bool = false;

            fn value_ref(&self) -> Option<ValueRef<'_>> {
                Some(ValueRef::$scalar(*self))
            }
        }

        impl ScalarField for Option<$ty> {
            const SCALAR: ScalarType = ScalarType::$scalar;
            const NULLABLE: bool = true;

            fn value_ref(&self) -> Option<ValueRef<'_>> {
                self.map(ValueRef::$scalar)
            }
        }
    };
}

copy_scalar_field!(i32, Int32);
copy_scalar_field!(i64, Int64);
copy_scalar_field!(f32, Float32);
copy_scalar_field!(f64, Float64);
copy_scalar_field!(Decimal, Decimal);
copy_scalar_field!(bool, Bool);
copy_scalar_field!(NaiveDateTime, DateTime);
copy_scalar_field!(Uuid, Uuid);

impl ScalarField for String {
    const SCALAR: ScalarType = ScalarType::String;
    const NULLABLE: bool = false;

    fn value_ref(&self) -> Option<ValueRef<'_>> {
        Some(ValueRef::Str(self))
    }
}

impl ScalarField for Option<String> {
    const SCALAR: ScalarType = ScalarType::String;
    const NULLABLE: bool = true;

    fn value_ref(&self) -> Option<ValueRef<'_>> {
        self.as_deref().map(ValueRef::Str)
    }
}

// UTC timestamps compare as their naive UTC wall time.
impl ScalarField for DateTime<Utc> {
    const SCALAR: ScalarType = ScalarType::DateTime;
    const NULLABLE: bool = false;

    fn value_ref(&self) -> Option<ValueRef<'_>> {
        Some(ValueRef::DateTime(self.naive_utc()))
    }
}

impl ScalarField for Option<DateTime<Utc>> {
    const SCALAR: ScalarType = ScalarType::DateTime;
    const NULLABLE: bool = true;

    fn value_ref(&self) -> Option<ValueRef<'_>> {
        self.as_ref().map(|dt| ValueRef::DateTime(dt.naive_utc()))
    }
}
