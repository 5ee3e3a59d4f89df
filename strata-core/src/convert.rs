//! Conversions between typed temporal / boolean values and their storage strings.
//!
//! Storage keeps dates as `YYYY-MM-DD`, times as `HH:MM:SS`, timestamps as
//! `YYYY-MM-DD HH:MM:SS`, intervals as `[-]H:MM:SS` and booleans as `Y`/`N`
//! flags. The `*_getter` / `*_setter` functions plug these conversions into a
//! schema's accessor table.

use crate::{Context, Error, Flag, Model, Result, Value};
use time::{
    Date, Duration, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};

const DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME: &[BorrowedFormatItem<'static>] = format_description!("[hour]:[minute]:[second]");
const DATETIME: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Storage value standing for "no date".
fn is_zero_date(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.starts_with("0000-00-00")
}

pub fn date_to_sql(value: Date) -> Result<String> {
    value
        .format(DATE)
        .with_context(|| format!("While formatting the date {value}"))
}

pub fn date_from_sql(value: &str) -> Result<Option<Date>> {
    if is_zero_date(value) {
        return Ok(None);
    }
    let value = value.trim();
    // Timestamps are accepted, the time part is dropped
    let value = value.get(..10).unwrap_or(value);
    Date::parse(value, DATE)
        .map(Some)
        .with_context(|| format!("Cannot parse `{value}` as a date"))
}

pub fn time_to_sql(value: Time) -> Result<String> {
    value
        .format(TIME)
        .with_context(|| format!("While formatting the time {value}"))
}

pub fn time_from_sql(value: &str) -> Result<Option<Time>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    Time::parse(value, TIME)
        .map(Some)
        .with_context(|| format!("Cannot parse `{value}` as a time"))
}

pub fn datetime_to_sql(value: PrimitiveDateTime) -> Result<String> {
    value
        .format(DATETIME)
        .with_context(|| format!("While formatting the timestamp {value}"))
}

pub fn datetime_from_sql(value: &str) -> Result<Option<PrimitiveDateTime>> {
    if is_zero_date(value) {
        return Ok(None);
    }
    let value = value.trim();
    if value.len() == 10 {
        return Ok(date_from_sql(value)?.map(|v| v.midnight()));
    }
    PrimitiveDateTime::parse(value, DATETIME)
        .map(Some)
        .with_context(|| format!("Cannot parse `{value}` as a timestamp"))
}

pub fn interval_to_sql(value: Duration) -> String {
    let sign = if value.is_negative() { "-" } else { "" };
    let seconds = value.whole_seconds().unsigned_abs();
    format!(
        "{sign}{}:{:02}:{:02}",
        seconds / 3600,
        (seconds / 60) % 60,
        seconds % 60
    )
}

pub fn interval_from_sql(value: &str) -> Result<Duration> {
    let context = || format!("Cannot parse `{value}` as an interval");
    let trimmed = value.trim();
    let (negative, unsigned) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed),
    };
    let parts = unsigned
        .split(':')
        .map(|v| v.parse::<i64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(context)?;
    let [hours, minutes, seconds] = parts[..] else {
        return Err(Error::msg(context()));
    };
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(Error::msg(context()));
    }
    let Some(total) = hours
        .checked_mul(3600)
        .and_then(|v| v.checked_add(minutes * 60 + seconds))
    else {
        return Err(Error::msg(context()));
    };
    let result = Duration::seconds(total);
    Ok(if negative { -result } else { result })
}

pub fn flag_to_bool(value: Flag) -> bool {
    value.is_yes()
}

pub fn bool_to_flag(value: bool) -> Flag {
    value.into()
}

fn stored_str<'a>(stored: &'a Value) -> Option<&'a str> {
    match stored {
        Value::Varchar(v) => Some(v),
        _ => None,
    }
}

/// Collapses a typed date (or the date part of a timestamp) into its storage string.
pub fn date_setter(value: Value, _model: &Model) -> Result<Value> {
    Ok(match value {
        Value::Date(v) => Value::Varchar(date_to_sql(v)?),
        Value::Timestamp(v) => Value::Varchar(date_to_sql(v.date())?),
        v => v,
    })
}

/// Reads the stored string back as [`Value::Date`], zero dates give the default.
pub fn date_getter(stored: &Value, default: &Value) -> Result<Value> {
    Ok(match stored_str(stored).map(date_from_sql).transpose()?.flatten() {
        Some(v) => Value::Date(v),
        None => default.clone(),
    })
}

pub fn datetime_setter(value: Value, _model: &Model) -> Result<Value> {
    Ok(match value {
        Value::Timestamp(v) => Value::Varchar(datetime_to_sql(v)?),
        Value::Date(v) => Value::Varchar(datetime_to_sql(v.midnight())?),
        v => v,
    })
}

pub fn datetime_getter(stored: &Value, default: &Value) -> Result<Value> {
    Ok(
        match stored_str(stored).map(datetime_from_sql).transpose()?.flatten() {
            Some(v) => Value::Timestamp(v),
            None => default.clone(),
        },
    )
}

pub fn time_setter(value: Value, _model: &Model) -> Result<Value> {
    Ok(match value {
        Value::Time(v) => Value::Varchar(time_to_sql(v)?),
        Value::Timestamp(v) => Value::Varchar(time_to_sql(v.time())?),
        v => v,
    })
}

pub fn time_getter(stored: &Value, default: &Value) -> Result<Value> {
    Ok(match stored_str(stored).map(time_from_sql).transpose()?.flatten() {
        Some(v) => Value::Time(v),
        None => default.clone(),
    })
}

pub fn interval_setter(value: Value, _model: &Model) -> Result<Value> {
    Ok(match value {
        Value::Interval(v) => Value::Varchar(interval_to_sql(v)),
        v => v,
    })
}

pub fn interval_getter(stored: &Value, default: &Value) -> Result<Value> {
    Ok(match stored_str(stored) {
        Some(v) if !v.trim().is_empty() => Value::Interval(interval_from_sql(v)?),
        _ => default.clone(),
    })
}

/// Presents a stored flag as a boolean.
pub fn flag_getter(stored: &Value, default: &Value) -> Result<Value> {
    Ok(match stored {
        Value::Flag(v) => Value::Boolean(flag_to_bool(*v)),
        _ => default.clone(),
    })
}
