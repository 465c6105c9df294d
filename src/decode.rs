//! Response decoding and the daemon's date formats.
//!
//! The daemon is not consistent about timestamps: most fields carry its
//! fixed `2021-03-11T21:15:35.123456789Z` pattern, while some (image and
//! swarm metadata among them) arrive as ISO-8601 with fractional seconds
//! and an offset. A single response can mix both, so the strategy is chosen
//! per field with serde `with`-modules rather than per decoder.

use crate::error::{Error, Result};
use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;

/// Parses a complete JSON payload into a typed result.
///
/// # Errors
///
/// Returns [`Error::Decode`] carrying the raw body and the target type
/// name; daemons occasionally return bodies that do not match the declared
/// success schema, and the raw bytes are the only way to see what actually
/// came back.
pub fn decode_json<T: DeserializeOwned>(body: &Bytes) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::Decode {
        target: std::any::type_name::<T>(),
        body: body.clone(),
        message: e.to_string(),
    })
}

/// The daemon's primary timestamp pattern, UTC with a literal `Z` and up to
/// nanosecond fraction.
const DAEMON_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.fZ";

/// Parses a daemon timestamp, trying the primary fixed pattern first and
/// the ISO-8601 fallback second.
#[must_use]
pub fn parse_daemon_date(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, DAEMON_FORMAT)
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.with_timezone(&Utc)))
        .ok()
}

/// Serde strategy for the daemon's fixed-pattern timestamps.
///
/// ```ignore
/// #[serde(with = "stevedore::decode::daemon_time")]
/// pub created: DateTime<Utc>,
/// ```
pub mod daemon_time {
    use super::{DateTime, NaiveDateTime, Utc, DAEMON_FORMAT};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Deserializes a fixed-pattern daemon timestamp.
    ///
    /// # Errors
    ///
    /// Fails when the string does not match the daemon pattern.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&value, DAEMON_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }

    /// Serializes in the daemon pattern with nanosecond fraction.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string())
    }

    /// The same strategy for optional fields.
    pub mod opt {
        use super::{DateTime, NaiveDateTime, Utc, DAEMON_FORMAT};
        use serde::{Deserialize, Deserializer, Serializer};

        /// Deserializes an optional fixed-pattern daemon timestamp.
        ///
        /// # Errors
        ///
        /// Fails when a present string does not match the daemon pattern.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let value = Option::<String>::deserialize(deserializer)?;
            value
                .map(|s| {
                    NaiveDateTime::parse_from_str(&s, DAEMON_FORMAT)
                        .map(|naive| naive.and_utc())
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }

        /// Serializes an optional timestamp in the daemon pattern.
        ///
        /// # Errors
        ///
        /// Propagates serializer failures.
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer
                    .serialize_some(&dt.format("%Y-%m-%dT%H:%M:%S%.9fZ").to_string()),
                None => serializer.serialize_none(),
            }
        }
    }
}

/// Serde strategy for the ISO-8601-with-fractional-seconds fallback format
/// some daemon components use.
pub mod iso8601_time {
    use super::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// Deserializes an ISO-8601 timestamp with offset.
    ///
    /// # Errors
    ///
    /// Fails when the string is not valid RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let value = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&value)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }

    /// Serializes as RFC 3339 with microsecond fraction.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
    }

    /// The same strategy for optional fields.
    pub mod opt {
        use super::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer};

        /// Deserializes an optional ISO-8601 timestamp.
        ///
        /// # Errors
        ///
        /// Fails when a present string is not valid RFC 3339.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<DateTime<Utc>>, D::Error> {
            let value = Option::<String>::deserialize(deserializer)?;
            value
                .map(|s| {
                    DateTime::parse_from_rfc3339(&s)
                        .map(|dt| dt.with_timezone(&Utc))
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }

        /// Serializes an optional timestamp as RFC 3339.
        ///
        /// # Errors
        ///
        /// Propagates serializer failures.
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match value {
                Some(dt) => serializer
                    .serialize_some(&dt.to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
                None => serializer.serialize_none(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde::Deserialize;

    #[test]
    fn decodes_a_json_object() {
        #[derive(Deserialize)]
        struct Version {
            #[serde(rename = "ApiVersion")]
            api_version: String,
        }
        let body = Bytes::from_static(b"{\"ApiVersion\":\"1.41\"}");
        let version: Version = decode_json(&body).unwrap();
        assert_eq!(version.api_version, "1.41");
    }

    #[test]
    fn decode_failure_preserves_body_and_target() {
        let body = Bytes::from_static(b"{\"message\":\"conflict\"}");
        let err = decode_json::<Vec<String>>(&body).unwrap_err();
        match err {
            Error::Decode {
                target,
                body: raw,
                ..
            } => {
                assert!(target.contains("Vec<"), "{target}");
                assert_eq!(raw, body);
            }
            other => panic!("expected decode error, got {other}"),
        }
    }

    #[test]
    fn parses_daemon_pattern_with_nanoseconds() {
        let parsed = parse_daemon_date("2021-03-11T21:15:35.123456789Z").unwrap();
        assert_eq!(parsed.nanosecond(), 123_456_789);
    }

    #[test]
    fn parses_daemon_pattern_with_eight_digit_fraction() {
        // Older daemon components emit eight fractional digits.
        assert!(parse_daemon_date("2018-04-02T09:03:11.12345678Z").is_some());
    }

    #[test]
    fn parses_daemon_pattern_without_fraction() {
        assert!(parse_daemon_date("0001-01-01T00:00:00Z").is_some());
    }

    #[test]
    fn falls_back_to_iso8601_with_offset() {
        let parsed = parse_daemon_date("2021-03-11T22:15:35.123+01:00").unwrap();
        assert_eq!(parsed.hour(), 21);
    }

    #[test]
    fn rejects_unrecognized_dates() {
        assert!(parse_daemon_date("last tuesday").is_none());
    }

    #[test]
    fn daemon_time_strategy_round_trips_through_serde() {
        #[derive(Deserialize, serde::Serialize)]
        struct Stamped {
            #[serde(with = "daemon_time")]
            at: DateTime<Utc>,
        }
        let decoded: Stamped =
            serde_json::from_str("{\"at\":\"2021-03-11T21:15:35.123456789Z\"}").unwrap();
        let encoded = serde_json::to_string(&decoded).unwrap();
        assert_eq!(encoded, "{\"at\":\"2021-03-11T21:15:35.123456789Z\"}");
    }

    #[test]
    fn optional_strategies_accept_null_and_missing() {
        #[derive(Deserialize)]
        struct Stamped {
            #[serde(with = "iso8601_time::opt", default)]
            at: Option<DateTime<Utc>>,
        }
        let none: Stamped = serde_json::from_str("{\"at\":null}").unwrap();
        assert!(none.at.is_none());
        let missing: Stamped = serde_json::from_str("{}").unwrap();
        assert!(missing.at.is_none());
        let some: Stamped =
            serde_json::from_str("{\"at\":\"2021-03-11T21:15:35.000000001+00:00\"}").unwrap();
        assert!(some.at.is_some());
    }
}
