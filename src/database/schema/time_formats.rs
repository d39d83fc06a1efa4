use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Accepted textual time layouts, tried in order.
///
/// Values without an offset are read as UTC.
pub struct TimeFormats;

impl TimeFormats {
    const DATE_TIME_LAYOUTS: [&'static str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ];
    const DATE_LAYOUT: &'static str = "%Y-%m-%d";

    pub fn parse(text: &str) -> Option<DateTime<Utc>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
            return Some(ts.with_timezone(&Utc));
        }

        for layout in Self::DATE_TIME_LAYOUTS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, layout) {
                return Some(naive.and_utc());
            }
        }

        NaiveDate::parse_from_str(text, Self::DATE_LAYOUT)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_full_timestamp() {
        let ts = TimeFormats::parse("2024-03-01T10:30:00Z").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());

        let ts = TimeFormats::parse("2024-03-01T12:30:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_minute_precision() {
        let ts = TimeFormats::parse("2024-03-01 10:30").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_date_only() {
        let ts = TimeFormats::parse(" 2024-03-01 ").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(TimeFormats::parse("yesterday").is_none());
        assert!(TimeFormats::parse("2024-13-01").is_none());
        assert!(TimeFormats::parse("").is_none());
    }
}
