use crate::{Model, Record, convert, separated_by};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map, Number};
use std::fmt::{self, Display, Formatter};
use time::{Date, Duration, PrimitiveDateTime, Time};

/// Canonical two-letter yes/no flag, stored as `Y` or `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Yes,
    No,
}

impl Flag {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Flag::Yes => "Y",
            Flag::No => "N",
        }
    }
    pub const fn is_yes(&self) -> bool {
        matches!(self, Flag::Yes)
    }
    /// Parses the canonical spelling only.
    pub fn from_canonical(value: &str) -> Option<Flag> {
        match value {
            "Y" => Some(Flag::Yes),
            "N" => Some(Flag::No),
            _ => None,
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        if value { Flag::Yes } else { Flag::No }
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dynamically typed attribute value.
///
/// Members of a [`Model`] hold the casted form, records exchanged with the
/// executor hold whatever storage produced. `SqlNull` only appears in storage
/// projections: it asks the executor to write an explicit NULL, unlike an
/// absent field (leave untouched) or an empty `Varchar`.
#[derive(Default, Debug, Clone)]
pub enum Value {
    #[default]
    Null,
    SqlNull,
    Boolean(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Varchar(String),
    Flag(Flag),
    Date(Date),
    Time(Time),
    Timestamp(PrimitiveDateTime),
    Interval(Duration),
    /// Opaque passthrough value.
    Json(serde_json::Value),
    /// One owned child model.
    Child(Box<Model>),
    /// Ordered owned child models.
    Children(Vec<Model>),
    /// Nested projection of a child model.
    Record(Box<Record>),
    List(Vec<Value>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(l), Self::Boolean(r)) => l == r,
            (Self::Int(l), Self::Int(r)) => l == r,
            (Self::Float(l), Self::Float(r)) => l == r,
            (Self::Decimal(l), Self::Decimal(r)) => l == r,
            (Self::Varchar(l), Self::Varchar(r)) => l == r,
            (Self::Flag(l), Self::Flag(r)) => l == r,
            (Self::Date(l), Self::Date(r)) => l == r,
            (Self::Time(l), Self::Time(r)) => l == r,
            (Self::Timestamp(l), Self::Timestamp(r)) => l == r,
            (Self::Interval(l), Self::Interval(r)) => l == r,
            (Self::Json(l), Self::Json(r)) => l == r,
            (Self::Child(l), Self::Child(r)) => l == r,
            (Self::Children(l), Self::Children(r)) => l == r,
            (Self::Record(l), Self::Record(r)) => l == r,
            (Self::List(l), Self::List(r)) => l == r,
            _ => core::mem::discriminant(self) == core::mem::discriminant(other),
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::SqlNull)
    }

    /// Scalars are the values a string cast accepts.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Boolean(..)
                | Value::Int(..)
                | Value::Float(..)
                | Value::Decimal(..)
                | Value::Varchar(..)
                | Value::Flag(..)
        )
    }

    /// Loose emptiness: null, false, zero, `""`, `"0"` or an empty collection.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null | Value::SqlNull => true,
            Value::Boolean(v) => !v,
            Value::Int(v) => *v == 0,
            Value::Float(v) => *v == 0.0,
            Value::Decimal(v) => v.is_zero(),
            Value::Varchar(v) => v.is_empty() || v == "0",
            Value::Flag(v) => !v.is_yes(),
            Value::Children(v) => v.is_empty(),
            Value::List(v) => v.is_empty(),
            Value::Record(v) => v.is_empty(),
            Value::Json(v) => v.is_null(),
            _ => false,
        }
    }

    /// Truthiness used by the boolean and flag casts.
    pub fn is_truthy(&self) -> bool {
        !self.is_empty()
    }

    /// Name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::SqlNull => "sql null",
            Value::Boolean(..) => "boolean",
            Value::Int(..) => "integer",
            Value::Float(..) => "float",
            Value::Decimal(..) => "decimal",
            Value::Varchar(..) => "string",
            Value::Flag(..) => "flag",
            Value::Date(..) => "date",
            Value::Time(..) => "time",
            Value::Timestamp(..) => "timestamp",
            Value::Interval(..) => "interval",
            Value::Json(..) => "json",
            Value::Child(..) => "child model",
            Value::Children(..) => "child models",
            Value::Record(..) => "record",
            Value::List(..) => "list",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Varchar(v) => Some(v),
            Value::Flag(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// JSON rendering. Child models are represented by their key reference,
    /// expanding them is up to [`Model::raw_object`] in iterated mode.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null | Value::SqlNull => Json::Null,
            Value::Boolean(v) => Json::Bool(*v),
            Value::Int(v) => Json::Number((*v).into()),
            Value::Float(v) => Number::from_f64(*v).map_or(Json::Null, Json::Number),
            Value::Decimal(v) => match v.to_i64() {
                Some(i) if v.fract().is_zero() => Json::Number(i.into()),
                _ => Json::String(v.to_string()),
            },
            Value::Varchar(v) => Json::String(v.clone()),
            Value::Flag(v) => Json::String(v.as_str().into()),
            Value::Date(..) | Value::Time(..) | Value::Timestamp(..) | Value::Interval(..) => {
                Json::String(self.to_string())
            }
            Value::Json(v) => v.clone(),
            Value::Child(v) => v.key_reference(),
            Value::Children(v) => Json::Array(v.iter().map(Model::key_reference).collect()),
            Value::Record(v) => Json::Object(
                v.iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect::<Map<_, _>>(),
            ),
            Value::List(v) => Json::Array(v.iter().map(Value::to_json).collect()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::SqlNull => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Decimal(v) => write!(f, "{v}"),
            Value::Varchar(v) => write!(f, "{v:?}"),
            Value::Flag(v) => write!(f, "{v}"),
            Value::Date(v) => match convert::date_to_sql(*v) {
                Ok(v) => f.write_str(&v),
                Err(..) => write!(f, "{v}"),
            },
            Value::Time(v) => match convert::time_to_sql(*v) {
                Ok(v) => f.write_str(&v),
                Err(..) => write!(f, "{v}"),
            },
            Value::Timestamp(v) => match convert::datetime_to_sql(*v) {
                Ok(v) => f.write_str(&v),
                Err(..) => write!(f, "{v}"),
            },
            Value::Interval(v) => f.write_str(&convert::interval_to_sql(*v)),
            Value::Json(v) => write!(f, "{v}"),
            Value::Child(v) => write!(f, "{}#{}", v.schema().table(), v.key_reference()),
            Value::Children(v) => {
                let mut out = String::from("[");
                separated_by(
                    &mut out,
                    v,
                    |out, v| out.push_str(&v.key_reference().to_string()),
                    ", ",
                );
                out.push(']');
                f.write_str(&out)
            }
            Value::Record(v) => write!(f, "{{{v}}}"),
            Value::List(v) => {
                let mut out = String::from("[");
                separated_by(&mut out, v, |out, v| out.push_str(&v.to_string()), ", ");
                out.push(']');
                f.write_str(&out)
            }
        }
    }
}
