//! Typed lookups over the free-form account metadata map.
//!
//! Every extractor returns `None` for a missing key or a value of the wrong
//! shape. Unknown shapes are never an error.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Provider metadata attached to an account record.
pub type Metadata = BTreeMap<String, Value>;

/// Keys consulted for the last credential refresh time, in priority order.
pub const LAST_REFRESH_KEYS: [&str; 4] =
    ["last_refresh", "lastRefresh", "last_refreshed_at", "lastRefreshedAt"];

const NAIVE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Read the `"email"` key when it holds a string.
pub fn extract_email(meta: &Metadata) -> Option<&str> {
    meta.get("email").and_then(Value::as_str)
}

/// Read the last refresh time using the first key whose value parses.
pub fn extract_last_refresh(meta: &Metadata) -> Option<DateTime<Utc>> {
    LAST_REFRESH_KEYS.iter().filter_map(|key| meta.get(*key)).find_map(parse_refresh_value)
}

fn parse_refresh_value(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => parse_refresh_str(s.trim()),
        Value::Number(n) => {
            let secs = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            unix_seconds(secs)
        },
        _ => None,
    }
}

fn parse_refresh_str(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, NAIVE_LAYOUT) {
        return Some(naive.and_utc());
    }
    s.parse::<i64>().ok().and_then(unix_seconds)
}

fn unix_seconds(secs: i64) -> Option<DateTime<Utc>> {
    if secs <= 0 {
        return None;
    }
    DateTime::from_timestamp(secs, 0)
}
