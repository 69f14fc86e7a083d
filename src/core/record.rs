//! Record contract: how a Rust struct exposes its tagged fields.
//!
//! Structs are normally declared through [`record!`](crate::record), which
//! generates the [`Record`] impl from `#[sql = "..."]` field tags:
//!
//! ```
//! use tagorm::{record, Ref};
//!
//! record! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Order {
//!         #[sql = "pkey:id"]
//!         pub id: i64,
//!         #[sql = "title;unique"]
//!         pub title: String,
//!     }
//! }
//!
//! record! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct OrderItem {
//!         #[sql = "pkey:id"]
//!         pub id: i64,
//!         #[sql = "fkey:order_id"]
//!         pub order: Option<Ref<Order>>,
//!         #[sql = "position;position"]
//!         pub position: i64,
//!     }
//! }
//! ```

use std::fmt;
use std::marker::PhantomData;
use chrono::NaiveDateTime;
use super::error::{OrmError, Result};
use crate::schema::{ref_target, RefTarget};
use super::value::Value;

/// Primitive kind of a record field, before tags are applied.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Boolean,
    Integer,
    BigInt,
    Text,
    Float,
    Timestamp,
    /// Reference to another record; resolves the referenced table and column.
    Reference(fn() -> Result<RefTarget>),
    /// A type with no column mapping. Such fields are skipped.
    Unsupported(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub name: &'static str,
    pub tag: Option<&'static str>,
    pub kind: FieldKind,
}

/// A struct that maps onto one table.
pub trait Record: Default + Clone {
    const TYPE_NAME: &'static str;

    /// Overrides the table name. Invalid names fall back to the type name.
    fn custom_table_name() -> Option<String> {
        None
    }

    /// Fields in declaration order.
    fn fields() -> Vec<FieldDef>;

    fn value(&self, field: &str) -> Option<Value>;

    fn set_value(&mut self, field: &str, value: Value) -> Result<()>;
}

/// Identity-only handle to a row of `T`.
///
/// Materialized results carry these stubs instead of fetching the referenced
/// row.
pub struct Ref<T> {
    pub id: i64,
    marker: PhantomData<fn() -> T>,
}

impl<T> Ref<T> {
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self {
            id,
            marker: PhantomData,
        }
    }
}

impl<T> Clone for Ref<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Ref<T> {}

impl<T> PartialEq for Ref<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Ref<T> {}

impl<T> Default for Ref<T> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<T> fmt::Debug for Ref<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ref({})", self.id)
    }
}

/// Conversion between a field type and [`Value`].
pub trait SqlField: Sized {
    fn kind() -> FieldKind;

    fn to_value(&self) -> Value;

    fn from_value(field: &str, value: Value) -> Result<Self>;
}

fn mismatch(field: &str, expected: &'static str) -> OrmError {
    OrmError::TypeMismatch {
        field: field.to_string(),
        expected,
    }
}

impl SqlField for bool {
    fn kind() -> FieldKind {
        FieldKind::Boolean
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Boolean(b) => Ok(b),
            Value::Null => Ok(false),
            _ => Err(mismatch(field, "boolean")),
        }
    }
}

impl SqlField for i64 {
    fn kind() -> FieldKind {
        FieldKind::BigInt
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Ok(i),
            Value::Null => Ok(0),
            _ => Err(mismatch(field, "integer")),
        }
    }
}

impl SqlField for i32 {
    fn kind() -> FieldKind {
        FieldKind::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Self::try_from(i).map_err(|_| mismatch(field, "32-bit integer")),
            Value::Null => Ok(0),
            _ => Err(mismatch(field, "32-bit integer")),
        }
    }
}

impl SqlField for u32 {
    fn kind() -> FieldKind {
        FieldKind::Integer
    }

    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Integer(i) => Self::try_from(i).map_err(|_| mismatch(field, "unsigned integer")),
            Value::Null => Ok(0),
            _ => Err(mismatch(field, "unsigned integer")),
        }
    }
}

impl SqlField for String {
    fn kind() -> FieldKind {
        FieldKind::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Ok(Self::new()),
            _ => Err(mismatch(field, "text")),
        }
    }
}

impl SqlField for f64 {
    fn kind() -> FieldKind {
        FieldKind::Float
    }

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Real(r) => Ok(r),
            Value::Integer(i) => Ok(i as Self),
            Value::Null => Ok(0.0),
            _ => Err(mismatch(field, "float")),
        }
    }
}

impl SqlField for f32 {
    fn kind() -> FieldKind {
        FieldKind::Float
    }

    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        f64::from_value(field, value).map(|r| r as Self)
    }
}

impl SqlField for NaiveDateTime {
    fn kind() -> FieldKind {
        FieldKind::Timestamp
    }

    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Timestamp(t) => Ok(t),
            Value::Null => Ok(Self::default()),
            _ => Err(mismatch(field, "timestamp")),
        }
    }
}

// Nullable scalars: `None` is stored as NULL.
macro_rules! nullable_field {
    ($($ty:ty),*) => {
        $(
            impl SqlField for Option<$ty> {
                fn kind() -> FieldKind {
                    <$ty as SqlField>::kind()
                }

                fn to_value(&self) -> Value {
                    self.as_ref().map_or(Value::Null, |v| v.to_value())
                }

                fn from_value(field: &str, value: Value) -> Result<Self> {
                    if value.is_null() {
                        return Ok(None);
                    }
                    <$ty as SqlField>::from_value(field, value).map(Some)
                }
            }
        )*
    };
}

nullable_field!(bool, i64, i32, u32, String, f64, f32, NaiveDateTime);

impl<T: Record> SqlField for Option<Ref<T>> {
    fn kind() -> FieldKind {
        FieldKind::Reference(ref_target::<T>)
    }

    fn to_value(&self) -> Value {
        self.map_or(Value::Null, |r| Value::Integer(r.id))
    }

    fn from_value(field: &str, value: Value) -> Result<Self> {
        match value {
            Value::Null | Value::Integer(0) => Ok(None),
            Value::Integer(id) => Ok(Some(Ref::new(id))),
            _ => Err(mismatch(field, "reference id")),
        }
    }
}

impl<T: 'static> SqlField for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::Unsupported(std::any::type_name::<Self>())
    }

    fn to_value(&self) -> Value {
        Value::Null
    }

    fn from_value(_field: &str, _value: Value) -> Result<Self> {
        Ok(Self::new())
    }
}

/// Declares a struct together with its [`Record`] impl.
///
/// Fields carry their tag as `#[sql = "..."]`; untagged fields stay out of the
/// table. A leading `#![table = "..."]` supplies a custom table name.
///
/// Field doc comments are kept but must come before the `sql` tag. Other field
/// attributes are not accepted.
#[macro_export]
macro_rules! record {
    (@tag) => { None };
    (@tag $tag:literal) => { Some($tag) };
    (@table) => { None };
    (@table $table:literal) => { Some(::std::string::String::from($table)) };
    (
        $(#![table = $table:literal])?
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[doc = $fdoc:literal])*
                $(#[sql = $tag:literal])?
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[doc = $fdoc])* $fvis $field: $ty, )*
        }

        impl $crate::Record for $name {
            const TYPE_NAME: &'static str = stringify!($name);

            fn custom_table_name() -> ::std::option::Option<::std::string::String> {
                $crate::record!(@table $($table)?)
            }

            fn fields() -> ::std::vec::Vec<$crate::FieldDef> {
                vec![
                    $(
                        $crate::FieldDef {
                            name: stringify!($field),
                            tag: $crate::record!(@tag $($tag)?),
                            kind: <$ty as $crate::SqlField>::kind(),
                        },
                    )*
                ]
            }

            fn value(&self, field: &str) -> ::std::option::Option<$crate::Value> {
                match field {
                    $( stringify!($field) => Some($crate::SqlField::to_value(&self.$field)), )*
                    _ => None,
                }
            }

            fn set_value(&mut self, field: &str, value: $crate::Value) -> $crate::Result<()> {
                match field {
                    $(
                        stringify!($field) => {
                            self.$field = <$ty as $crate::SqlField>::from_value(field, value)?;
                            Ok(())
                        }
                    )*
                    _ => Err($crate::OrmError::UnknownField(field.to_string())),
                }
            }
        }
    };
}
