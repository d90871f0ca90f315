//! Reduces a monitor payload to one row per stop: the next departure.

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::PipelineError;
use crate::monitor::MonitorResponse;
use crate::parser::{parse_monitor, parse_timestamp};
use crate::table::{ColumnSchema, FlatRow, FlatTable, SERVER_TIME, TIME_PLANNED, TIME_REAL};

/// Flattens a validated monitor payload into a [`FlatTable`].
///
/// Each stop contributes the first departure of its first line. Stops
/// without a line or without a departure are skipped with a warning. Row
/// order follows the payload's monitor order.
///
/// # Errors
///
/// - [`PipelineError::MalformedPayload`] if the payload is not a monitor response.
/// - [`PipelineError::MalformedTimestamp`] if any timestamp fails to parse; no
///   partial table is returned.
pub fn flatten(schema: &ColumnSchema, payload: &Value) -> Result<FlatTable, PipelineError> {
    let response = parse_monitor(payload)?;
    flatten_response(schema, &response)
}

/// [`flatten`] for an already-deserialized response.
pub fn flatten_response(
    schema: &ColumnSchema,
    response: &MonitorResponse,
) -> Result<FlatTable, PipelineError> {
    let server_time = parse_timestamp(schema.name(SERVER_TIME), &response.message.server_time)?;

    let monitors = &response.data.monitors;
    let mut rows = Vec::with_capacity(monitors.len());

    for (index, monitor) in monitors.iter().enumerate() {
        let properties = &monitor.location_stop.properties;

        let Some((line, departure)) = monitor.next_departure() else {
            warn!(
                index,
                stop_name = %properties.title,
                rbl = %properties.attributes.rbl,
                has_line = monitor.first_line.is_some(),
                "Stop has no upcoming departure, skipping"
            );
            continue;
        };

        let times = &departure.departure_time;
        let time_planned = optional_timestamp(schema.name(TIME_PLANNED), &times.time_planned)?;
        let time_real = optional_timestamp(schema.name(TIME_REAL), &times.time_real)?;

        rows.push(FlatRow {
            server_time,
            stop_name: properties.title.clone(),
            stop_id: properties.attributes.rbl.to_string(),
            line_id: line.line_id.to_string(),
            direction: line.richtungs_id.to_string(),
            time_planned,
            time_real,
        });
    }

    debug!(
        monitors = monitors.len(),
        rows = rows.len(),
        "Monitor payload flattened"
    );

    Ok(FlatTable::new(schema.clone(), rows))
}

/// A missing, null or blank departure time is absent, not malformed.
fn optional_timestamp(
    column: &str,
    raw: &Option<String>,
) -> Result<Option<DateTime<Utc>>, PipelineError> {
    raw.as_deref()
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_timestamp(column, raw))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn stop(title: &str, rbl: i64, line_id: i64, direction: &str, planned: Value, real: Value) -> Value {
        json!({
            "locationStop": {"properties": {"title": title, "attributes": {"rbl": rbl}}},
            "lines": [{
                "lineId": line_id,
                "richtungsId": direction,
                "departures": {"departure": [
                    {"departureTime": {"timePlanned": planned, "timeReal": real, "countdown": 3}}
                ]}
            }]
        })
    }

    fn payload(monitors: Vec<Value>) -> Value {
        json!({
            "message": {"value": "OK", "messageCode": 1, "serverTime": "2024-03-05T14:02:11.000+0100"},
            "data": {"monitors": monitors}
        })
    }

    #[test]
    fn test_single_stop_fills_all_fields() {
        let body = payload(vec![stop(
            "Schwedenplatz",
            4205,
            101,
            "1",
            json!("2024-03-05T14:05:00.000+0100"),
            json!("2024-03-05T14:06:30.000+0100"),
        )]);

        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.len(), 1);

        let row = &table.rows()[0];
        assert_eq!(row.server_time, Utc.with_ymd_and_hms(2024, 3, 5, 13, 2, 11).unwrap());
        assert_eq!(row.stop_name, "Schwedenplatz");
        assert_eq!(row.stop_id, "4205");
        assert_eq!(row.line_id, "101");
        assert_eq!(row.direction, "1");
        assert_eq!(
            row.time_planned,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 13, 5, 0).unwrap())
        );
        assert_eq!(
            row.time_real,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 13, 6, 30).unwrap())
        );
    }

    #[test]
    fn test_rows_follow_monitor_order() {
        let body = payload(vec![
            stop("C", 3, 1, "1", json!(null), json!(null)),
            stop("A", 1, 1, "2", json!(null), json!(null)),
            stop("B", 2, 1, "1", json!(null), json!(null)),
        ]);

        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        let names: Vec<_> = table.rows().iter().map(|r| r.stop_name.as_str()).collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_server_time_shared_across_rows() {
        let body = payload(vec![
            stop("A", 1, 1, "1", json!(null), json!(null)),
            stop("B", 2, 1, "1", json!(null), json!(null)),
        ]);
        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.rows()[0].server_time, table.rows()[1].server_time);
    }

    #[test]
    fn test_null_and_missing_times_are_absent() {
        let mut body = payload(vec![stop(
            "Praterstern",
            4210,
            2,
            "2",
            json!("2024-03-05T14:05:00.000+0100"),
            json!(null),
        )]);
        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert!(table.rows()[0].time_planned.is_some());
        assert_eq!(table.rows()[0].time_real, None);

        body["data"]["monitors"][0]["lines"][0]["departures"]["departure"][0]["departureTime"] =
            json!({});
        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.rows()[0].time_planned, None);
        assert_eq!(table.rows()[0].time_real, None);
    }

    #[test]
    fn test_only_first_line_and_departure_used() {
        let body = payload(vec![json!({
            "locationStop": {"properties": {"title": "Karlsplatz", "attributes": {"rbl": "147"}}},
            "lines": [
                {"lineId": "U1", "richtungsId": 1, "departures": {"departure": [
                    {"departureTime": {"timePlanned": "2024-03-05T14:03:00.000+0100"}},
                    {"departureTime": {"timePlanned": "2024-03-05T14:08:00.000+0100"}}
                ]}},
                {"lineId": "U4", "richtungsId": 2, "departures": {"departure": [
                    {"departureTime": {"timePlanned": "2024-03-05T14:04:00.000+0100"}}
                ]}}
            ]
        })]);

        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row.line_id, "U1");
        assert_eq!(row.direction, "1");
        assert_eq!(
            row.time_planned,
            Some(Utc.with_ymd_and_hms(2024, 3, 5, 13, 3, 0).unwrap())
        );
    }

    #[test]
    fn test_stops_without_departures_are_skipped() {
        let body = payload(vec![
            json!({
                "locationStop": {"properties": {"title": "NoLines", "attributes": {"rbl": 1}}},
                "lines": []
            }),
            json!({
                "locationStop": {"properties": {"title": "NoDepartures", "attributes": {"rbl": 2}}},
                "lines": [{"lineId": 5, "richtungsId": "1", "departures": {"departure": []}}]
            }),
            stop("Kept", 3, 5, "1", json!(null), json!(null)),
        ]);

        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].stop_name, "Kept");
    }

    #[test]
    fn test_bad_timestamp_fails_whole_batch() {
        let body = payload(vec![
            stop("A", 1, 1, "1", json!("2024-03-05T14:05:00.000+0100"), json!(null)),
            stop("B", 2, 1, "1", json!(null), json!("later")),
        ]);

        let schema =
            ColumnSchema::new(vec!["ts", "name", "rbl", "line", "dir", "planned", "real"]).unwrap();
        let err = flatten(&schema, &body).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedTimestamp {
                column: "real".to_string(),
                value: "later".to_string()
            }
        );
    }

    #[test]
    fn test_bad_server_time_names_server_column() {
        let mut body = payload(vec![]);
        body["message"]["serverTime"] = json!("yesterday");
        let err = flatten(&ColumnSchema::default(), &body).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MalformedTimestamp { ref column, .. } if column == "API_ServerTime"
        ));
    }

    #[test]
    fn test_missing_rbl_is_malformed_payload() {
        let body = payload(vec![json!({
            "locationStop": {"properties": {"title": "X", "attributes": {}}},
            "lines": []
        })]);
        let err = flatten(&ColumnSchema::default(), &body).unwrap_err();
        match err {
            PipelineError::MalformedPayload(msg) => assert!(msg.contains("rbl")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_flatten_is_repeatable() {
        let body = payload(vec![
            stop("A", 1, 1, "1", json!("2024-03-05T14:05:00.000+0100"), json!(null)),
            stop("B", 2, 7, "2", json!(null), json!("2024-03-05T14:06:00.000+0100")),
        ]);
        let first = flatten(&ColumnSchema::default(), &body).unwrap();
        let second = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_later_line_without_direction_still_yields_row() {
        let body = payload(vec![json!({
            "locationStop": {"properties": {"title": "Schwedenplatz", "attributes": {"rbl": 4205}}},
            "lines": [
                {"lineId": 1, "richtungsId": "1", "departures": {"departure": [
                    {"departureTime": {"timePlanned": "2024-03-05T14:05:00.000+0100"}},
                    {"foo": 1}
                ]}},
                {"lineId": 2, "departures": {"departure": []}}
            ]
        })]);

        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].line_id, "1");
        assert_eq!(table.rows()[0].direction, "1");
    }

    #[test]
    fn test_blank_departure_times_are_absent() {
        let body = payload(vec![stop("A", 1, 1, "1", json!(""), json!("  "))]);
        let table = flatten(&ColumnSchema::default(), &body).unwrap();
        assert_eq!(table.rows()[0].time_planned, None);
        assert_eq!(table.rows()[0].time_real, None);
    }

    #[test]
    fn test_blank_server_time_is_malformed() {
        let mut body = payload(vec![]);
        body["message"]["serverTime"] = json!("");
        let err = flatten(&ColumnSchema::default(), &body).unwrap_err();
        assert_eq!(
            err,
            PipelineError::MalformedTimestamp {
                column: "API_ServerTime".to_string(),
                value: String::new()
            }
        );
    }
}
