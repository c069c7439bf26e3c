//! Shared types used across the codebase

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Current time at millisecond precision, matching the stored form.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render in the stored timestamp form.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Fixed-width RFC 3339 timestamps (`2024-05-01T12:00:00.000Z`).
///
/// Stored documents compare timestamps as text, so every value must have the
/// same width for lexical and chronological order to agree.
pub mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_timestamp(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Stamped {
        #[serde(with = "timestamp")]
        at: DateTime<Utc>,
    }

    #[test]
    fn timestamps_have_fixed_width() {
        let whole = Stamped { at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() };
        let json = serde_json::to_string(&whole).unwrap();
        assert_eq!(json, r#"{"at":"2024-05-01T12:00:00.000Z"}"#);
        assert_eq!(serde_json::from_str::<Stamped>(&json).unwrap(), whole);
    }

    #[test]
    fn now_has_millisecond_precision() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000_000, 0);
    }
}
