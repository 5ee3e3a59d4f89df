use crate::{DataType, Flag, ModelError, Result, Value, truncate_long};
use atoi::FromRadix10SignedChecked;
use rust_decimal::prelude::ToPrimitive;

/// Family a declared type resolves to, deciding how values are casted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Boolean,
    Integer,
    Float,
    /// Boolean stored as a canonical `Y`/`N` flag.
    Flag,
    /// Strings and the temporal types, which are stored as strings.
    String,
    Model,
    Opaque,
}

const BOOLEAN: &[&str] = &["bool", "boolean"];
const INTEGER: &[&str] = &[
    "int", "integer", "tinyint", "smallint", "mediumint", "bigint", "serial", "decimal",
    "numeric", "dec", "fixed",
];
const FLOAT: &[&str] = &["float", "double", "real", "double precision"];
const FLAG: &[&str] = &["flag", "yesno", "enum('y','n')", "enum('n','y')"];
const STRING: &[&str] = &[
    "string",
    "char",
    "varchar",
    "text",
    "tinytext",
    "mediumtext",
    "longtext",
    "enum",
    "set",
    "json",
    "date",
    "time",
    "datetime",
    "timestamp",
    "year",
    "interval",
];
const OPAQUE: &[&str] = &["object", "opaque"];

impl TypeFamily {
    /// Resolves a declared type, failing with `InvalidParameter` when no family matches.
    pub fn resolve(data_type: &DataType) -> Result<Self> {
        let name = match data_type {
            DataType::Model(..) => return Ok(TypeFamily::Model),
            DataType::Opaque => return Ok(TypeFamily::Opaque),
            DataType::Sql(name) => name,
        };
        let full = name.trim().to_ascii_lowercase().replace(' ', "");
        if FLAG.contains(&full.as_str()) {
            return Ok(TypeFamily::Flag);
        }
        let base = name.split('(').next().unwrap_or_default().to_ascii_lowercase();
        let base = base.trim().trim_end_matches("unsigned").trim();
        let families = [
            (BOOLEAN, TypeFamily::Boolean),
            (INTEGER, TypeFamily::Integer),
            (FLOAT, TypeFamily::Float),
            (FLAG, TypeFamily::Flag),
            (STRING, TypeFamily::String),
            (OPAQUE, TypeFamily::Opaque),
        ];
        families
            .into_iter()
            .find_map(|(names, family)| names.contains(&base).then_some(family))
            .ok_or_else(|| ModelError::invalid_parameter(format!("Unknown data type `{name}`")))
    }
}

/// Casts `value` to the family of `data_type`.
///
/// A nullable attribute keeps null (and the null sentinel) as [`Value::Null`].
/// Casting is idempotent: a value already of the right family comes back equal.
pub fn cast(value: Value, data_type: &DataType, nullable: bool) -> Result<Value> {
    if nullable && value.is_null() {
        return Ok(Value::Null);
    }
    Ok(match TypeFamily::resolve(data_type)? {
        TypeFamily::Boolean => Value::Boolean(value.is_truthy()),
        TypeFamily::Integer => Value::Int(to_int(&value)?),
        TypeFamily::Float => Value::Float(to_float(&value)?),
        TypeFamily::String => Value::Varchar(to_string(&value)?),
        TypeFamily::Flag => Value::Flag(to_flag(&value)),
        TypeFamily::Model | TypeFamily::Opaque => value,
    })
}

fn rejected(value: &Value, family: &str) -> crate::Error {
    ModelError::invalid_value(format!(
        "Cannot cast {} `{}` to {family}",
        value.kind(),
        truncate_long(&value.to_string())
    ))
}

/// Integer interpretation: leading integer of strings, truncation of fractional numbers.
pub fn to_int(value: &Value) -> Result<i64> {
    Ok(match value {
        Value::Null | Value::SqlNull => 0,
        Value::Boolean(v) => *v as i64,
        Value::Int(v) => *v,
        Value::Float(v) => *v as i64,
        Value::Decimal(v) => v
            .trunc()
            .to_i64()
            .unwrap_or(if v.is_sign_negative() { i64::MIN } else { i64::MAX }),
        Value::Flag(v) => v.is_yes() as i64,
        Value::Varchar(v) => {
            let trimmed = v.trim_start();
            let (parsed, used) = i64::from_radix_10_signed_checked(trimmed.as_bytes());
            match parsed {
                Some(v) => v,
                None if used > 0 => {
                    if trimmed.starts_with('-') {
                        i64::MIN
                    } else {
                        i64::MAX
                    }
                }
                None => 0,
            }
        }
        _ => return Err(rejected(value, "integer")),
    })
}

/// Whether a string is a complete decimal or scientific number.
pub fn is_numeric(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty()
        && !value
            .chars()
            .any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E')
        && fast_float::parse::<f64, _>(value).is_ok()
}

/// Float interpretation, numeric input only.
pub fn to_float(value: &Value) -> Result<f64> {
    match value {
        Value::Int(v) => Ok(*v as f64),
        Value::Float(v) => Ok(*v),
        Value::Decimal(v) => v.to_f64().ok_or_else(|| rejected(value, "float")),
        Value::Varchar(v) if is_numeric(v) => {
            fast_float::parse::<f64, _>(v.trim()).map_err(|_| rejected(value, "float"))
        }
        _ => Err(rejected(value, "float")),
    }
}

/// String interpretation, scalar input only. Null reads as the empty string.
pub fn to_string(value: &Value) -> Result<String> {
    Ok(match value {
        Value::Null | Value::SqlNull => String::new(),
        Value::Boolean(v) => if *v { "1" } else { "" }.into(),
        Value::Int(v) => itoa::Buffer::new().format(*v).to_owned(),
        Value::Float(v) if v.is_finite() => {
            let mut buffer = ryu::Buffer::new();
            let text = buffer.format_finite(*v);
            text.strip_suffix(".0").unwrap_or(text).to_owned()
        }
        Value::Decimal(v) => v.to_string(),
        Value::Varchar(v) => v.clone(),
        Value::Flag(v) => v.as_str().into(),
        _ => return Err(rejected(value, "string")),
    })
}

/// Flag interpretation: canonical flags, `"true"`/`"false"`, otherwise truthiness.
pub fn to_flag(value: &Value) -> Flag {
    match value {
        Value::Flag(v) => *v,
        Value::Varchar(v) => match v.as_str() {
            "true" => Flag::Yes,
            "false" => Flag::No,
            v => Flag::from_canonical(v).unwrap_or_else(|| value.is_truthy().into()),
        },
        _ => value.is_truthy().into(),
    }
}
