//! # Temporal Types — UTC-Only Timestamps
//!
//! `Timestamp` is the type of the proof `created` field. It renders as
//! ISO 8601 with seconds precision and a `Z` suffix (`2021-06-01T12:00:00Z`),
//! never with milliseconds and never with a numeric offset.
//!
//! Sign and verify calls run independently, often on different machines;
//! a single rendering rule is what lets the verifier recompute a byte-equal
//! canonical proof.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO 8601 string, rejecting non-UTC offsets.
/// - [`Timestamp::from_epoch_millis()`] — from a JavaScript-style epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(DateTime<Utc>);

/// A caller-supplied proof date, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// Milliseconds since the Unix epoch.
    EpochMillis(i64),
    /// An RFC 3339 string, any offset.
    Text(String),
}

impl Timestamp {
    /// Current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// From a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse an RFC 3339 string that carries the `Z` suffix.
    ///
    /// Explicit offsets, even `+00:00`, are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTimestamp`] if the string is not
    /// RFC 3339 or does not end in `Z`.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        if !s.ends_with('Z') {
            return Err(ValidationError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        Self::parse_lenient(s)
    }

    /// Parse an RFC 3339 string with any offset, converting to UTC.
    pub fn parse_lenient(s: &str) -> Result<Self, ValidationError> {
        let dt = DateTime::parse_from_rfc3339(s).map_err(|e| {
            ValidationError::InvalidTimestamp(format!("invalid RFC 3339 timestamp {s:?}: {e}"))
        })?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// From Unix epoch seconds.
    pub fn from_epoch_secs(secs: i64) -> Result<Self, ValidationError> {
        let dt = DateTime::from_timestamp(secs, 0).ok_or_else(|| {
            ValidationError::InvalidTimestamp(format!("invalid Unix timestamp: {secs}"))
        })?;
        Ok(Self(dt))
    }

    /// From Unix epoch milliseconds; the sub-second part is discarded.
    pub fn from_epoch_millis(millis: i64) -> Result<Self, ValidationError> {
        let dt = DateTime::from_timestamp_millis(millis).ok_or_else(|| {
            ValidationError::InvalidTimestamp(format!("invalid Unix timestamp (ms): {millis}"))
        })?;
        Ok(Self(truncate_to_seconds(dt)))
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// Unix epoch seconds.
    pub fn epoch_secs(&self) -> i64 {
        self.0.timestamp()
    }

    /// Render as `YYYY-MM-DDTHH:MM:SSZ`.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

impl Serialize for Timestamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_lenient(&s).map_err(serde::de::Error::custom)
    }
}

impl TryFrom<&DateInput> for Timestamp {
    type Error = ValidationError;

    fn try_from(input: &DateInput) -> Result<Self, Self::Error> {
        match input {
            DateInput::EpochMillis(ms) => Self::from_epoch_millis(*ms),
            DateInput::Text(s) => Self::parse_lenient(s),
        }
    }
}

/// Format a proof date the W3C way: absent input means now.
///
/// Numbers are epoch milliseconds, strings are RFC 3339 with any offset.
/// The result always has the form `YYYY-MM-DDTHH:MM:SSZ`.
pub fn w3c_date(date: Option<&DateInput>) -> Result<String, ValidationError> {
    let ts = match date {
        Some(input) => Timestamp::try_from(input)?,
        None => Timestamp::now(),
    };
    Ok(ts.to_iso8601())
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn now_has_no_subseconds() {
        assert_eq!(Timestamp::now().as_datetime().nanosecond(), 0);
    }

    #[test]
    fn from_utc_truncates() {
        let dt = Utc.with_ymd_and_hms(2021, 6, 1, 12, 30, 45).unwrap();
        let ts = Timestamp::from_utc(dt.with_nanosecond(123_456_789).unwrap());
        assert_eq!(ts.to_iso8601(), "2021-06-01T12:30:45Z");
    }

    #[test]
    fn parse_strict_rejects_offsets() {
        assert!(Timestamp::parse("2021-06-01T12:00:00Z").is_ok());
        assert!(Timestamp::parse("2021-06-01T12:00:00+00:00").is_err());
        assert!(Timestamp::parse("2021-06-01T17:00:00+05:00").is_err());
        assert!(Timestamp::parse("not-a-date").is_err());
        assert!(Timestamp::parse("").is_err());
    }

    #[test]
    fn parse_drops_milliseconds() {
        let ts = Timestamp::parse("2021-06-01T12:00:00.987Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2021-06-01T12:00:00Z");
    }

    #[test]
    fn parse_lenient_converts_offset() {
        let ts = Timestamp::parse_lenient("2021-06-01T17:00:00+05:00").unwrap();
        assert_eq!(ts.to_iso8601(), "2021-06-01T12:00:00Z");
    }

    #[test]
    fn epoch_millis_truncates() {
        // 2021-01-01T00:00:00.999Z
        let ts = Timestamp::from_epoch_millis(1_609_459_200_999).unwrap();
        assert_eq!(ts.to_iso8601(), "2021-01-01T00:00:00Z");
        assert_eq!(ts.epoch_secs(), 1_609_459_200);
    }

    #[test]
    fn epoch_secs_roundtrip() {
        let ts = Timestamp::parse("2021-06-01T12:00:00Z").unwrap();
        assert_eq!(Timestamp::from_epoch_secs(ts.epoch_secs()).unwrap(), ts);
    }

    #[test]
    fn w3c_date_from_number_and_string() {
        let from_ms = w3c_date(Some(&DateInput::EpochMillis(1_609_459_200_000))).unwrap();
        assert_eq!(from_ms, "2021-01-01T00:00:00Z");

        let from_text =
            w3c_date(Some(&DateInput::Text("2021-01-01T01:00:00.500+01:00".into()))).unwrap();
        assert_eq!(from_text, "2021-01-01T00:00:00Z");
    }

    #[test]
    fn w3c_date_defaults_to_now_format() {
        let s = w3c_date(None).unwrap();
        assert_eq!(s.len(), "2021-01-01T00:00:00Z".len());
        assert!(s.ends_with('Z'));
        assert!(!s.contains('.'));
    }

    #[test]
    fn serde_uses_iso8601_string() {
        let ts = Timestamp::parse("2021-06-01T12:00:00Z").unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, r#""2021-06-01T12:00:00Z""#);
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn date_input_untagged() {
        let n: DateInput = serde_json::from_str("1609459200000").unwrap();
        assert_eq!(n, DateInput::EpochMillis(1_609_459_200_000));
        let s: DateInput = serde_json::from_str(r#""2021-01-01T00:00:00Z""#).unwrap();
        assert_eq!(s, DateInput::Text("2021-01-01T00:00:00Z".into()));
    }
}
