//! Parsing of the monitor payload and the provider's timestamp strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::error::PipelineError;
use crate::monitor::MonitorResponse;

/// Offset formats tried after RFC 3339. The provider writes `+0100`, which
/// RFC 3339 parsing rejects.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Formats without an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Deserializes a validated JSON body into a [`MonitorResponse`].
///
/// # Errors
///
/// Returns [`PipelineError::MalformedPayload`] naming the serde failure when a
/// required field is missing or has the wrong type.
pub fn parse_monitor(payload: &Value) -> Result<MonitorResponse, PipelineError> {
    MonitorResponse::deserialize(payload).map_err(|e| PipelineError::MalformedPayload(e.to_string()))
}

/// Parses a timestamp string into an absolute UTC time.
///
/// `column` is only used to label the error.
pub fn parse_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>, PipelineError> {
    let raw_trimmed = raw.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw_trimmed) {
        return Ok(ts.with_timezone(&Utc));
    }

    for fmt in OFFSET_FORMATS {
        if let Ok(ts) = DateTime::parse_from_str(raw_trimmed, fmt) {
            return Ok(ts.with_timezone(&Utc));
        }
    }

    for fmt in NAIVE_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw_trimmed, fmt) {
            return Ok(ts.and_utc());
        }
    }

    Err(PipelineError::MalformedTimestamp {
        column: column.to_string(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_provider_offset_format() {
        let ts = parse_timestamp("TimePlanned", "2024-03-05T14:02:11.000+0100").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 13, 2, 11).unwrap());
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_timestamp("TimeReal", "2024-03-05T14:02:11+01:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 13, 2, 11).unwrap());

        let zulu = parse_timestamp("TimeReal", "2024-03-05T13:02:11Z").unwrap();
        assert_eq!(zulu, ts);
    }

    #[test]
    fn test_parse_naive_is_utc() {
        let ts = parse_timestamp("API_ServerTime", "2024-03-05T13:02:11").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 3, 5, 13, 2, 11).unwrap());
    }

    #[test]
    fn test_parse_garbage_names_column_and_value() {
        let err = parse_timestamp("TimeReal", "in 3 minutes").unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedTimestamp {
                column: "TimeReal".to_string(),
                value: "in 3 minutes".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_monitor_missing_server_time() {
        let payload = json!({"message": {}, "data": {"monitors": []}});
        let err = parse_monitor(&payload).unwrap_err();
        match err {
            PipelineError::MalformedPayload(msg) => assert!(msg.contains("serverTime")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_monitor_wrong_shape() {
        let err = parse_monitor(&json!({"success": true})).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedPayload(_)));
    }

    #[test]
    fn test_parse_monitor_minimal() {
        let payload = json!({
            "message": {"value": "OK", "messageCode": 1, "serverTime": "2024-03-05T14:02:11.000+0100"},
            "data": {"monitors": []}
        });
        let parsed = parse_monitor(&payload).unwrap();
        assert_eq!(parsed.message.server_time, "2024-03-05T14:02:11.000+0100");
        assert_eq!(parsed.message.message_code, Some(1));
        assert!(parsed.data.monitors.is_empty());
    }
}
