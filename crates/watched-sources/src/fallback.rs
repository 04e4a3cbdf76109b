use std::path::Path;
use chrono::{DateTime, Duration, Utc};
use serde_json::{json, Value};
use tracing::{info, warn};
use watched_models::watched_item::format_utc_millis;
use crate::error::SourceError;

/// (title, season, episode, slug, rating), most recent first
const SAMPLE_EPISODES: [(&str, u32, &str, &str, f64); 7] = [
    ("Demon Slayer", 3, "4", "demon-slayer", 3.5),
    ("Demon Slayer", 3, "3", "demon-slayer", 3.5),
    ("Demon Slayer", 3, "2", "demon-slayer", 3.5),
    ("Demon Slayer", 3, "1", "demon-slayer", 3.5),
    ("Demon Slayer", 2, "7", "demon-slayer", 5.0),
    ("Batman The Animated Series", 1, "1", "batman-the-animated-series", 4.0),
    ("Batman The Animated Series", 1, "2", "batman-the-animated-series", 4.0),
];

/// Built-in sample records: two shows, one episode per day going back a week
pub fn builtin_records(now: DateTime<Utc>) -> Vec<Value> {
    SAMPLE_EPISODES
        .iter()
        .enumerate()
        .map(|(i, (title, season, episode, slug, rating))| {
            let watched = now - Duration::days(i as i64 + 1);
            json!({
                "title": title,
                "season": season,
                "episode": episode,
                "watchedDate": format_utc_millis(&watched),
                "url": format!("https://serializd.com/show/{}", slug),
                "rating": rating,
            })
        })
        .collect()
}

/// Read a JSON array of raw records from disk
pub fn read_fallback_file(path: &Path) -> Result<Vec<Value>, SourceError> {
    let content = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let value: Value = serde_json::from_str(&content).map_err(|source| SourceError::Decode {
        path: path.display().to_string(),
        source,
    })?;

    match value {
        Value::Array(records) => Ok(records),
        other => Err(SourceError::Shape(format!(
            "{} holds a JSON {} instead of an array",
            path.display(),
            json_kind(&other)
        ))),
    }
}

/// Records to use when nothing could be fetched: the configured file when it
/// can be read, otherwise the built-in samples
pub fn load_fallback(path: Option<&Path>, now: DateTime<Utc>) -> Vec<Value> {
    if let Some(path) = path {
        match read_fallback_file(path) {
            Ok(records) => {
                info!("Loaded {} fallback records from {}", records.len(), path.display());
                return records;
            }
            Err(e) => warn!("Ignoring fallback file: {}", e),
        }
    }
    builtin_records(now)
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_builtin_records_cover_two_shows() {
        let records = builtin_records(fixed_now());
        assert_eq!(records.len(), 7);

        let titles: BTreeSet<&str> = records.iter().filter_map(|r| r["title"].as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains("Demon Slayer"));
        assert!(titles.contains("Batman The Animated Series"));
    }

    #[test]
    fn test_builtin_records_step_back_one_day_each() {
        let records = builtin_records(fixed_now());
        assert_eq!(records[0]["watchedDate"], "2024-03-09T12:00:00.000Z");
        assert_eq!(records[6]["watchedDate"], "2024-03-03T12:00:00.000Z");
        assert_eq!(records[4]["rating"], 5.0);
    }

    #[test]
    fn test_fallback_file_replaces_builtin() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"[{{"title": "The Bear", "season": 2, "episode": "10"}}]"#).unwrap();

        let records = load_fallback(Some(file.path()), fixed_now());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["title"], "The Bear");
    }

    #[test]
    fn test_non_array_fallback_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"title": "The Bear"}}"#).unwrap();

        assert!(matches!(read_fallback_file(file.path()), Err(SourceError::Shape(_))));
        assert_eq!(load_fallback(Some(file.path()), fixed_now()).len(), 7);
    }

    #[test]
    fn test_missing_fallback_file_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let records = load_fallback(Some(&dir.path().join("missing.json")), fixed_now());
        assert_eq!(records, builtin_records(fixed_now()));
    }
}
