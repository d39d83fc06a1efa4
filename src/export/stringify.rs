use chrono::SecondsFormat;

use crate::database::FactValue;

/// Text rendering of projected values for tabular output.
pub struct Stringify;

impl Stringify {
    /// Absent is empty; times are RFC 3339 UTC; floats carry six decimals;
    /// anything composite is rendered as compact JSON. Integers keep their
    /// integer text, so a stored `6` exports as `6` and a stored `6.0` as
    /// `6.000000`.
    pub fn value(value: &FactValue) -> String {
        match value {
            FactValue::Null => String::new(),
            FactValue::Bool(b) => b.to_string(),
            FactValue::Int(i) => i.to_string(),
            FactValue::Float(f) => format!("{:.6}", f),
            FactValue::String(s) => s.clone(),
            FactValue::Time(t) => t.to_rfc3339_opts(SecondsFormat::Secs, true),
            FactValue::Other(v) => v.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};
    use serde_json::json;

    use super::*;
    use crate::database::ValueKind;

    #[test]
    fn test_stringify() {
        assert_eq!(Stringify::value(&FactValue::Null), "");
        assert_eq!(Stringify::value(&FactValue::Bool(true)), "true");
        assert_eq!(Stringify::value(&FactValue::Int(42)), "42");
        assert_eq!(Stringify::value(&FactValue::Float(7.25)), "7.250000");
        assert_eq!(Stringify::value(&FactValue::String("mmol/L".into())), "mmol/L");
        assert_eq!(Stringify::value(&FactValue::Other(json!({"a": [1, 2]}))), r#"{"a":[1,2]}"#);
    }

    #[test]
    fn test_numeric_text_follows_stored_shape() {
        let int = FactValue::read(Some(&json!(6)), ValueKind::Numeric);
        let float = FactValue::read(Some(&json!(6.0)), ValueKind::Numeric);

        assert_eq!(Stringify::value(&int), "6");
        assert_eq!(Stringify::value(&float), "6.000000");
    }

    #[test]
    fn test_times_are_utc() {
        let local = FixedOffset::east_opt(3600).unwrap().with_ymd_and_hms(2024, 1, 1, 11, 0, 0).unwrap();
        let value = FactValue::Time(local.with_timezone(&Utc));

        assert_eq!(Stringify::value(&value), "2024-01-01T10:00:00Z");
    }
}
