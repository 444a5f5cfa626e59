//! Serialization utilities for common data types
//!
//! This module provides reusable serde serialization and deserialization
//! utilities for values that are persisted outside the process.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Custom serialization module for timestamps as ISO-8601 strings
///
/// Serializes a `DateTime<Utc>` with millisecond precision and a `Z`
/// suffix (`2024-01-01T00:00:00.000Z`). Deserialization accepts any
/// RFC 3339 timestamp and normalizes it to UTC.
///
/// # Usage
/// ```rust
/// use adfin_common::iso8601_millis;
/// use chrono::{DateTime, Utc};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "iso8601_millis")]
///     expires_at: DateTime<Utc>,
/// }
/// ```
pub mod iso8601_millis {
    use super::{DateTime, Deserialize, Deserializer, SecondsFormat, Serializer, Utc};

    /// Serde serialization result type
    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a timestamp as an ISO-8601 string with milliseconds
    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_str(&timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Deserialize an RFC 3339 string into a UTC timestamp
    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for serialization utilities

    use chrono::TimeZone;
    use serde::Serialize;

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestStruct {
        #[serde(with = "iso8601_millis")]
        at: DateTime<Utc>,
    }

    /// Tests the `toISOString`-compatible output shape
    #[test]
    fn test_serialize_uses_millis_and_z() {
        let at = Utc.with_ymd_and_hms(2024, 11, 4, 12, 5, 51).unwrap()
            + chrono::Duration::milliseconds(966);
        let json = serde_json::to_string(&TestStruct { at }).unwrap();
        assert_eq!(json, r#"{"at":"2024-11-04T12:05:51.966Z"}"#);
    }

    /// Tests that offsets are normalized to UTC
    #[test]
    fn test_deserialize_accepts_offsets() {
        let parsed: TestStruct =
            serde_json::from_str(r#"{"at":"2024-11-04T13:05:51+01:00"}"#).unwrap();
        assert_eq!(parsed.at, Utc.with_ymd_and_hms(2024, 11, 4, 12, 5, 51).unwrap());
    }

    /// Tests that garbage is rejected rather than defaulted
    #[test]
    fn test_deserialize_rejects_garbage() {
        let result: Result<TestStruct, _> = serde_json::from_str(r#"{"at":"yesterday"}"#);
        assert!(result.is_err());
    }

    /// Tests that a millisecond-precision value survives a round trip
    #[test]
    fn test_round_trip() {
        let original = TestStruct {
            at: Utc.with_ymd_and_hms(2030, 1, 2, 3, 4, 5).unwrap()
                + chrono::Duration::milliseconds(6),
        };
        let json = serde_json::to_string(&original).unwrap();
        let back: TestStruct = serde_json::from_str(&json).unwrap();
        assert_eq!(original, back);
    }
}
