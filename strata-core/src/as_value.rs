use crate::{Error, Flag, Model, Record, Result, Value, convert, truncate_long};
use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use std::any;
use time::{Date, Duration, PrimitiveDateTime, Time};

/// Conversion between native Rust types and the dynamically typed [`Value`].
///
/// `as_value` wraps the native value in its canonical variant,
/// `try_from_value` accepts the canonical variant plus the storage spellings
/// executors commonly return (numbers as strings, flags, decimals).
///
/// # Examples
/// ```rust
/// use strata_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert!(matches!(v, Value::Int(42)));
/// let n: i32 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Convert this value into its owned [`Value`] representation.
    fn as_value(self) -> Value;
    /// Attempt to convert a dynamic [`Value`] into `Self`.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

fn mismatch<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {} `{}` to {}",
        value.kind(),
        truncate_long(&value.to_string()),
        any::type_name::<T>(),
    ))
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(value.into())
    }
}

impl AsValue for bool {
    fn as_value(self) -> Value {
        Value::Boolean(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Boolean(v) => Ok(v),
            Value::Int(v) => Ok(v != 0),
            Value::Flag(v) => Ok(v.is_yes()),
            Value::Varchar(ref v) => match v.as_str() {
                "true" | "1" | "Y" => Ok(true),
                "false" | "0" | "N" => Ok(false),
                _ => Err(mismatch::<Self>(&value)),
            },
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

macro_rules! impl_as_value_integer {
    ($($source:ty),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Value {
                    Value::Int(self as _)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    let v = match value {
                        Value::Int(v) => v,
                        Value::Boolean(v) => v as i64,
                        Value::Decimal(v) if v.fract().is_zero() => {
                            v.to_i64().ok_or_else(|| mismatch::<Self>(&value))?
                        }
                        Value::Varchar(ref v) => v
                            .trim()
                            .parse::<i64>()
                            .map_err(|_| mismatch::<Self>(&value))?,
                        _ => return Err(mismatch::<Self>(&value)),
                    };
                    <$source>::try_from(v).map_err(|_| {
                        Error::msg(format!(
                            "Value {v} is out of range for {}",
                            any::type_name::<Self>(),
                        ))
                    })
                }
            }
        )+
    };
}
impl_as_value_integer!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_as_value_float {
    ($($source:ty),+ $(,)?) => {
        $(
            impl AsValue for $source {
                fn as_value(self) -> Value {
                    Value::Float(self as _)
                }
                fn try_from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Float(v) => Ok(v as _),
                        Value::Int(v) => Ok(v as _),
                        Value::Decimal(v) => v.to_f64().map(|v| v as _).ok_or_else(|| mismatch::<Self>(&value)),
                        Value::Varchar(ref v) => fast_float::parse::<$source, _>(v.trim())
                            .map_err(|_| mismatch::<Self>(&value)),
                        _ => Err(mismatch::<Self>(&value)),
                    }
                }
            }
        )+
    };
}
impl_as_value_float!(f32, f64);

impl AsValue for String {
    fn as_value(self) -> Value {
        Value::Varchar(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Varchar(v) => Ok(v),
            Value::Flag(v) => Ok(v.as_str().into()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Decimal {
    fn as_value(self) -> Value {
        Value::Decimal(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Decimal(v) => Ok(v),
            Value::Int(v) => Ok(v.into()),
            Value::Float(v) => Decimal::from_f64(v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Varchar(ref v) => v.trim().parse().map_err(|_| mismatch::<Self>(&value)),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Flag {
    fn as_value(self) -> Value {
        Value::Flag(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Flag(v) => Ok(v),
            Value::Varchar(ref v) => Flag::from_canonical(v).ok_or_else(|| mismatch::<Self>(&value)),
            Value::Boolean(v) => Ok(v.into()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

macro_rules! impl_as_value_temporal {
    ($source:ty, $variant:path, $from_sql:path) => {
        impl AsValue for $source {
            fn as_value(self) -> Value {
                $variant(self)
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $variant(v) => Ok(v),
                    Value::Varchar(ref v) => {
                        $from_sql(v)?.ok_or_else(|| mismatch::<Self>(&value))
                    }
                    _ => Err(mismatch::<Self>(&value)),
                }
            }
        }
    };
}
impl_as_value_temporal!(Date, Value::Date, convert::date_from_sql);
impl_as_value_temporal!(Time, Value::Time, convert::time_from_sql);
impl_as_value_temporal!(PrimitiveDateTime, Value::Timestamp, convert::datetime_from_sql);

impl AsValue for Duration {
    fn as_value(self) -> Value {
        Value::Interval(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Interval(v) => Ok(v),
            Value::Varchar(ref v) => convert::interval_from_sql(v),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for serde_json::Value {
    fn as_value(self) -> Value {
        Value::Json(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Json(v) => Ok(v),
            v => Ok(v.to_json()),
        }
    }
}

impl AsValue for Model {
    fn as_value(self) -> Value {
        Value::Child(Box::new(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Child(v) => Ok(*v),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Vec<Model> {
    fn as_value(self) -> Value {
        Value::Children(self)
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Children(v) => Ok(v),
            Value::Child(v) => Ok(vec![*v]),
            Value::Null => Ok(Vec::new()),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl AsValue for Record {
    fn as_value(self) -> Value {
        Value::Record(Box::new(self))
    }
    fn try_from_value(value: Value) -> Result<Self> {
        match value {
            Value::Record(v) => Ok(*v),
            _ => Err(mismatch::<Self>(&value)),
        }
    }
}

impl<T: AsValue> AsValue for Option<T> {
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => Value::Null,
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            Ok(None)
        } else {
            T::try_from_value(value).map(Some)
        }
    }
}
