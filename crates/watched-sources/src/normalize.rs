use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use watched_models::{MediaKind, Platform, WatchedItem};

const DEFAULT_TITLE: &str = "Unknown Show";
const DEFAULT_YEAR: i32 = 2023;
const DEFAULT_SHOW_ID: &str = "unknown";
const DEFAULT_SEASON: u32 = 1;
const DEFAULT_EPISODE: &str = "1";
const SHOW_URL_BASE: &str = "https://serializd.com/show";

/// Convert raw show/episode records into watched items, stamping defaults with
/// the current time
pub fn normalize(records: &[Value]) -> Vec<WatchedItem> {
    normalize_at(records, Utc::now())
}

/// Convert raw records into watched items.
///
/// Entries that are not JSON objects are skipped. Every other entry yields
/// exactly one item, in input order.
pub fn normalize_at(records: &[Value], now: DateTime<Utc>) -> Vec<WatchedItem> {
    records
        .iter()
        .filter_map(Value::as_object)
        .enumerate()
        .map(|(index, record)| normalize_record(record, index, now))
        .collect()
}

fn normalize_record(record: &Map<String, Value>, index: usize, now: DateTime<Utc>) -> WatchedItem {
    let title = text_field(record, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let url = match record.get("url") {
        Some(Value::String(url)) => url.clone(),
        _ => {
            let show_id = text_field(record, "show_id").unwrap_or_else(|| DEFAULT_SHOW_ID.to_string());
            format!("{}/{}", SHOW_URL_BASE, show_id)
        }
    };

    let watched_date = record
        .get("watchedDate")
        .and_then(Value::as_str)
        .and_then(parse_watched_date)
        .unwrap_or(now);

    WatchedItem {
        id: item_id(&title, index, now),
        year: integer_field(record, "year")
            .and_then(|y| i32::try_from(y).ok())
            .unwrap_or(DEFAULT_YEAR),
        kind: MediaKind::Series,
        platform: Platform::Serializd,
        watched_date,
        url,
        season: integer_field(record, "season")
            .and_then(|s| u32::try_from(s).ok())
            .unwrap_or(DEFAULT_SEASON),
        episode: text_field(record, "episode").unwrap_or_else(|| DEFAULT_EPISODE.to_string()),
        rating: rating_field(record),
        title,
    }
}

/// `serializd-<unix seconds>-<title hash>-<position>`; unique within one run only
fn item_id(title: &str, index: usize, now: DateTime<Utc>) -> String {
    let mut hasher = DefaultHasher::new();
    title.hash(&mut hasher);
    format!("{}-{}-{:016x}-{}", Platform::Serializd.as_str(), now.timestamp(), hasher.finish(), index)
}

/// Strings as-is, numbers as their decimal text
fn text_field(record: &Map<String, Value>, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integers, floats (truncated) and numeric strings
fn integer_field(record: &Map<String, Value>, key: &str) -> Option<i64> {
    match record.get(key)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(truncate)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(truncate))
        }
        _ => None,
    }
}

fn truncate(value: f64) -> Option<i64> {
    if value.is_finite() && value.abs() < i64::MAX as f64 {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

/// A rating only counts when it is a non-zero number
fn rating_field(record: &Map<String, Value>) -> Option<f64> {
    let rating = match record.get("rating")? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    (rating != 0.0 && rating.is_finite()).then_some(rating)
}

/// Accepts RFC 3339, naive date-times (taken as UTC) and plain dates
fn parse_watched_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }
    let naive = raw.trim_end_matches('Z');
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(date) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(date.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|date| date.and_utc())
}
