use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use crate::media::{MediaKind, Platform};

/// Canonical record for one watched episode or show entry.
///
/// Every item printed by the CLI has this exact shape, whether it came from a
/// live Serializd response or from fallback data.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedItem {
    pub id: String,
    pub title: String,
    pub year: i32,
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub platform: Platform,
    #[serde(serialize_with = "serialize_utc_millis")]
    pub watched_date: DateTime<Utc>,
    pub url: String,
    pub season: u32,
    pub episode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
}

/// Render a timestamp as `2024-01-15T00:00:00.000Z`
pub fn format_utc_millis(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_utc_millis<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_utc_millis(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{json, Value};

    fn sample_item(rating: Option<f64>) -> WatchedItem {
        WatchedItem {
            id: "serializd-1705276800-0".to_string(),
            title: "The Bear".to_string(),
            year: 2023,
            kind: MediaKind::Series,
            platform: Platform::Serializd,
            watched_date: Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
            url: "https://serializd.com/show/the-bear".to_string(),
            season: 2,
            episode: "10".to_string(),
            rating,
        }
    }

    #[test]
    fn test_serializes_camel_case_fields() {
        let value = serde_json::to_value(sample_item(Some(4.5))).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "serializd-1705276800-0",
                "title": "The Bear",
                "year": 2023,
                "type": "series",
                "platform": "serializd",
                "watchedDate": "2024-01-15T00:00:00.000Z",
                "url": "https://serializd.com/show/the-bear",
                "season": 2,
                "episode": "10",
                "rating": 4.5
            })
        );
    }

    #[test]
    fn test_missing_rating_is_omitted_not_null() {
        let value = serde_json::to_value(sample_item(None)).unwrap();
        let object = value.as_object().unwrap();
        assert!(!object.contains_key("rating"));
        assert_eq!(object.len(), 9);
    }

    #[test]
    fn test_printed_item_reads_back() {
        let item = sample_item(Some(3.5));
        let text = serde_json::to_string(&item).unwrap();
        let parsed: WatchedItem = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, item);
        let raw: Value = serde_json::from_str(&text).unwrap();
        assert!(raw["watchedDate"].as_str().unwrap().ends_with('Z'));
    }
}
