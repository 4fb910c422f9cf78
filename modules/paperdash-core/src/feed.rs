//! Feed normalization: raw snapshot strings into typed collections.
//!
//! Every extractor degrades instead of failing: undecodable JSON yields an
//! empty collection, unparsable timestamps become the Unix epoch, missing
//! fields keep their record defaults. A dashboard must always render
//! something.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tracing::{error, warn};

use crate::condition::WeatherCondition;
use crate::error::Result;
use crate::time::parse_iso_to_local;
use crate::types::{CalendarEvent, CurrentConditions, ForecastPoint};

/// Extract calendar events from the aggregated calendar feed.
///
/// The feed is an object with one member per upstream calendar, each holding
/// an `events` array. Output is stable-sorted ascending by start, so events
/// sharing an instant keep their feed order.
pub fn extract_events<Tz: TimeZone>(raw: &str, tz: &Tz) -> Vec<CalendarEvent> {
    let mut events = Vec::new();
    let Some(root) = decode_feed(raw) else {
        return events;
    };
    let Some(calendars) = root.as_object() else {
        return events;
    };
    for calendar in calendars.values() {
        let Some(entries) = calendar.get("events").and_then(Value::as_array) else {
            continue;
        };
        for entry in entries {
            let start_raw = entry.get("start").and_then(Value::as_str).unwrap_or("");
            let end_raw = entry.get("end").and_then(Value::as_str).unwrap_or("");
            events.push(CalendarEvent {
                // A pure date with no time-of-day marks an all-day event.
                is_all_day: start_raw.len() <= 10,
                start: instant_or_epoch(start_raw, tz),
                end: instant_or_epoch(end_raw, tz),
                summary: entry
                    .get("summary")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                location: entry
                    .get("location")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            });
        }
    }
    events.sort_by_key(|event| event.start);
    events
}

/// Extract forecast points from an hourly or daily forecast feed.
///
/// Points without a parsable `datetime` keep the epoch instant; the layout
/// engine's strictly-after-now slicing drops them naturally.
pub fn extract_forecast<Tz: TimeZone>(raw: &str, tz: &Tz) -> Vec<ForecastPoint> {
    let mut points = Vec::new();
    let Some(root) = decode_feed(raw) else {
        return points;
    };
    for entry in wrapped_array(&root) {
        points.push(ForecastPoint {
            time: entry
                .get("datetime")
                .and_then(Value::as_str)
                .map(|s| instant_or_epoch(s, tz))
                .unwrap_or(DateTime::UNIX_EPOCH),
            temperature: entry.get("temperature").and_then(Value::as_f64),
            temperature_low: entry.get("templow").and_then(Value::as_f64),
            precipitation: entry.get("precipitation_probability").and_then(Value::as_f64),
            condition: entry
                .get("condition")
                .and_then(Value::as_str)
                .map(WeatherCondition::parse)
                .unwrap_or_default(),
        });
    }
    points.sort_by_key(|point| point.time);
    points
}

/// Extract task subjects, preserving feed order.
pub fn extract_tasks(raw: &str) -> Vec<String> {
    let mut tasks = Vec::new();
    let Some(root) = decode_feed(raw) else {
        return tasks;
    };
    for entry in wrapped_array(&root) {
        if let Some(subject) = entry.get("subject").and_then(Value::as_str) {
            tasks.push(subject.to_string());
        }
    }
    tasks
}

/// Extract the current-conditions observation record.
pub fn extract_current(raw: &str) -> CurrentConditions {
    let Some(root) = decode_feed(raw) else {
        return CurrentConditions::default();
    };
    CurrentConditions {
        temperature: root.get("temperature").and_then(Value::as_f64),
        temperature_low: root.get("templow").and_then(Value::as_f64),
        temperature_high: root.get("temphigh").and_then(Value::as_f64),
        precipitation: root.get("precipitation").and_then(Value::as_f64),
        sun_elevation: root.get("sun_elevation").and_then(Value::as_f64),
        condition: root
            .get("condition")
            .and_then(Value::as_str)
            .map(WeatherCondition::parse)
            .unwrap_or_default(),
        summary: root
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    }
}

// Decode a raw feed string, wrapping bare top-level arrays in `{"d": ...}`
// so every feed traverses as an object. Degenerate input (a cleared sensor
// holds "" or "-") short-circuits without touching the parser.
fn decode_feed(raw: &str) -> Option<Value> {
    if raw.len() <= 1 {
        return None;
    }
    let decoded: Result<Value> = if raw.trim_start().starts_with('[') {
        serde_json::from_str(&format!("{{\"d\":{raw}}}")).map_err(Into::into)
    } else {
        serde_json::from_str(raw).map_err(Into::into)
    };
    match decoded {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "Undecodable feed payload, rendering without it");
            None
        }
    }
}

// The elements of a feed that arrived as a bare array, or an empty slice.
fn wrapped_array(root: &Value) -> std::slice::Iter<'_, Value> {
    root.get("d")
        .and_then(Value::as_array)
        .map(|entries| entries.iter())
        .unwrap_or_default()
}

fn instant_or_epoch<Tz: TimeZone>(raw: &str, tz: &Tz) -> DateTime<Utc> {
    match parse_iso_to_local(raw, tz) {
        Ok(instant) => instant,
        Err(e) => {
            error!(input = raw, error = %e, "Failed to parse feed timestamp");
            DateTime::UNIX_EPOCH
        }
    }
}
