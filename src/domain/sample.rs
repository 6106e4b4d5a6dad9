// Sample domain model - One telemetry reading as it arrives on the wire
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single telemetry reading.
///
/// Numeric fields stay `None` when the source omitted them; defaulting to 0
/// happens only when a reading is projected for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
}

impl Sample {
    pub fn new(
        timestamp: DateTime<Utc>,
        speed: Option<f64>,
        temperature: Option<f64>,
        pressure: Option<f64>,
    ) -> Self {
        Self {
            timestamp,
            speed,
            temperature,
            pressure,
        }
    }
}

/// Timestamps arrive either as RFC 3339 strings or as epoch milliseconds.
mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimestamp {
        Text(String),
        Millis(f64),
    }

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(&text)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| D::Error::custom(format!("invalid timestamp {text:?}: {e}"))),
            RawTimestamp::Millis(ms) if ms.is_finite() => DateTime::from_timestamp_millis(ms as i64)
                .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {ms}"))),
            RawTimestamp::Millis(ms) => Err(D::Error::custom(format!("invalid timestamp: {ms}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_server_frame() {
        let frame = r#"{"timestamp":"2025-03-01T10:15:30.123456789+01:00","speed":101.5,"temperature":20.46,"pressure":100.47}"#;
        let sample: Sample = serde_json::from_str(frame).unwrap();

        assert_eq!(
            sample.timestamp,
            Utc.with_ymd_and_hms(2025, 3, 1, 9, 15, 30).unwrap()
                + chrono::Duration::nanoseconds(123_456_789)
        );
        assert_eq!(sample.speed, Some(101.5));
        assert_eq!(sample.temperature, Some(20.46));
        assert_eq!(sample.pressure, Some(100.47));
    }

    #[test]
    fn test_missing_fields_stay_absent() {
        let sample: Sample =
            serde_json::from_str(r#"{"timestamp":1700000000000,"speed":null,"extra":"ignored"}"#).unwrap();

        assert_eq!(sample.timestamp, Utc.timestamp_millis_opt(1_700_000_000_000).unwrap());
        assert_eq!(sample.speed, None);
        assert_eq!(sample.temperature, None);
        assert_eq!(sample.pressure, None);
    }

    #[test]
    fn test_rejects_bad_timestamps() {
        assert!(serde_json::from_str::<Sample>(r#"{"speed":1}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"timestamp":"yesterday"}"#).is_err());
        assert!(serde_json::from_str::<Sample>(r#"{"timestamp":true}"#).is_err());
    }

    #[test]
    fn test_rejects_non_numeric_metric() {
        let frame = r#"{"timestamp":1700000000000,"speed":"fast"}"#;
        assert!(serde_json::from_str::<Sample>(frame).is_err());
    }

    #[test]
    fn test_serialized_sample_parses_back() {
        let sample = Sample::new(
            Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap(),
            Some(100.0),
            None,
            Some(99.9),
        );
        let json = serde_json::to_string(&sample).unwrap();

        assert!(!json.contains("temperature"));
        assert_eq!(serde_json::from_str::<Sample>(&json).unwrap(), sample);
    }
}
