use std::borrow::Cow;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Number, Value};

use crate::database::{TimeFormats, ValueKind};

/// A value read out of a fact, typed according to the catalog.
///
/// Reads never fail: a value that cannot be coerced to the requested kind is
/// kept in its raw shape, and comparisons against it evaluate to unknown.
#[derive(Debug, Clone, PartialEq)]
pub enum FactValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Time(DateTime<Utc>),
    Other(Value),
}

impl FactValue {
    /// Untyped conversion preserving the JSON shape.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FactValue::Null,
            Value::Bool(b) => FactValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FactValue::Int(i),
                None => n.as_f64().map(FactValue::Float).unwrap_or_else(|| FactValue::Other(value.clone())),
            },
            Value::String(s) => FactValue::String(s.clone()),
            other => FactValue::Other(other.clone()),
        }
    }

    /// Typed read used by both predicate evaluation and projection.
    pub fn read(value: Option<&Value>, kind: ValueKind) -> Self {
        let Some(value) = value else {
            return FactValue::Null;
        };

        match (kind, value) {
            (ValueKind::Numeric, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => FactValue::Float(f),
                _ => FactValue::String(s.clone()),
            },
            (ValueKind::Time, Value::String(s)) => TimeFormats::parse(s)
                .map(FactValue::Time)
                .unwrap_or_else(|| FactValue::String(s.clone())),
            _ => FactValue::from_json(value),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FactValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FactValue::Int(i) => Some(*i as f64),
            FactValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            FactValue::Time(t) => Some(*t),
            _ => None,
        }
    }

    /// Text form used by string comparisons. Composite values have none.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            FactValue::String(s) => Some(Cow::Borrowed(s.as_str())),
            FactValue::Int(i) => Some(Cow::Owned(i.to_string())),
            FactValue::Float(f) => Some(Cow::Owned(f.to_string())),
            FactValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            FactValue::Time(t) => Some(Cow::Owned(t.to_rfc3339_opts(SecondsFormat::Secs, true))),
            FactValue::Null | FactValue::Other(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FactValue::Null => Value::Null,
            FactValue::Bool(b) => Value::Bool(*b),
            FactValue::Int(i) => Value::Number((*i).into()),
            FactValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            FactValue::String(s) => Value::String(s.clone()),
            FactValue::Time(t) => Value::String(t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            FactValue::Other(v) => v.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_numeric_read_coerces_numeric_strings() {
        assert_eq!(FactValue::read(Some(&json!("7.5")), ValueKind::Numeric), FactValue::Float(7.5));
        assert_eq!(FactValue::read(Some(&json!(8)), ValueKind::Numeric), FactValue::Int(8));
        assert_eq!(FactValue::read(Some(&json!("high")), ValueKind::Numeric), FactValue::String("high".into()));
        assert_eq!(FactValue::read(Some(&json!("high")), ValueKind::Numeric).as_f64(), None);
    }

    #[test]
    fn test_time_read() {
        let value = FactValue::read(Some(&json!("2024-01-02")), ValueKind::Time);
        assert_eq!(value.as_time(), Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_absent_is_null() {
        assert!(FactValue::read(None, ValueKind::String).is_null());
        assert!(FactValue::read(Some(&json!(null)), ValueKind::Numeric).is_null());
    }

    #[test]
    fn test_text_of_composites_is_none() {
        assert!(FactValue::from_json(&json!({"a": 1})).as_text().is_none());
        assert_eq!(FactValue::from_json(&json!(12)).as_text().unwrap(), "12");
    }

    #[test]
    fn test_to_json_renders_time_as_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        assert_eq!(FactValue::Time(ts).to_json(), json!("2024-05-06T07:08:09Z"));
    }
}
