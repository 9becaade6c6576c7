//! Postcard records as they are stored.
//!
//! Records are kept close to their stored JSON shape. Fields are read
//! leniently (numbers where strings are expected, a bare string for `tags`)
//! because the store performs no schema validation, and fields this crate does
//! not know about are carried through untouched.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{PostboxError, Result};

/// Direction of a postcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Received,
    Sent,
}

impl CardType {
    /// Canonical wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Sent => "sent",
        }
    }

    /// Parse a stored label. Accepts the canonical names and the labels used
    /// by the collection's original data entry form.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "received" | "Received" | "收到" => Some(Self::Received),
            "sent" | "Sent" | "寄出" => Some(Self::Sent),
            _ => None,
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CardType {
    type Err = PostboxError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_label(s).ok_or_else(|| PostboxError::InvalidCardType(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for CardType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        label.parse().map_err(serde::de::Error::custom)
    }
}

/// One postcard entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Postcard {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Raw type label. Use [`Postcard::card_type`] for the parsed value.
    #[serde(
        rename = "type",
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,

    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub person: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub send_date: Option<String>,

    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub receive_date: Option<String>,

    /// Fields not modelled here (photos, links, ...), preserved as stored.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Postcard {
    /// Parsed direction, `None` when the label is missing or unrecognised.
    pub fn card_type(&self) -> Option<CardType> {
        self.kind.as_deref().and_then(CardType::from_label)
    }

    pub fn is_received(&self) -> bool {
        self.card_type() == Some(CardType::Received)
    }

    /// Parse a JSON document holding either one record or a list of records.
    pub fn parse_many(json: &str) -> Result<Vec<Postcard>> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value_many(value))
    }

    /// Same as [`Postcard::parse_many`] for an already parsed value.
    /// `null` yields an empty list. Items that are not JSON objects are skipped.
    pub fn from_value_many(value: Value) -> Vec<Postcard> {
        list_items(value)
            .into_iter()
            .filter_map(Self::from_item)
            .collect()
    }

    /// Read-side view of stored items. The items themselves are left as they are.
    pub fn from_items(items: &[Value]) -> Vec<Postcard> {
        items
            .iter()
            .filter(|item| item.is_object())
            .filter_map(|item| Self::from_item(item.clone()))
            .collect()
    }

    fn from_item(item: Value) -> Option<Postcard> {
        if !item.is_object() {
            return None;
        }
        serde_json::from_value(item).ok()
    }
}

/// Split a document into list items: `null` is empty, an array is its
/// elements, anything else is a single item. Items are not inspected.
pub fn list_items(value: Value) -> Vec<Value> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        other => vec![other],
    }
}

/// Parse a JSON document into raw list items.
pub fn parse_items(json: &str) -> Result<Vec<Value>> {
    Ok(list_items(serde_json::from_str(json)?))
}

/// Treat an empty string the same as an absent field.
pub(crate) fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Parse an ISO-like date string into milliseconds since the Unix epoch.
///
/// Values without an offset are read as UTC. Returns `None` for anything
/// that does not parse.
pub fn parse_instant(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.timestamp_millis());
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d %H:%M",
    ];
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d"];
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis());
        }
    }

    None
}

fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

fn lenient_tags<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) if !s.is_empty() => vec![s],
        _ => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_full_record() {
        let card: Postcard = serde_json::from_value(json!({
            "id": "CN-1024",
            "type": "收到",
            "country": "日本",
            "platform": "Postcrossing",
            "tags": ["cat", "sea"],
            "note": "Lovely stamp",
            "person": "Aiko",
            "sendDate": "2024-01-01",
            "receiveDate": "2024-01-10",
            "image": "https://img.example/1.jpg"
        }))
        .unwrap();

        assert_eq!(card.id.as_deref(), Some("CN-1024"));
        assert_eq!(card.card_type(), Some(CardType::Received));
        assert_eq!(card.tags, vec!["cat", "sea"]);
        assert_eq!(card.extra["image"], "https://img.example/1.jpg");
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let original = json!({"id": "A1", "type": "sent", "photo": {"w": 10}});
        let card: Postcard = serde_json::from_value(original.clone()).unwrap();
        assert_eq!(serde_json::to_value(&card).unwrap(), original);
    }

    #[test]
    fn test_lenient_fields() {
        let card: Postcard = serde_json::from_value(json!({
            "id": 42,
            "type": null,
            "tags": "single",
            "region": ["not", "a", "string"]
        }))
        .unwrap();

        assert_eq!(card.id.as_deref(), Some("42"));
        assert_eq!(card.kind, None);
        assert_eq!(card.tags, vec!["single"]);
        assert_eq!(card.region, None);
    }

    #[test]
    fn test_card_type_labels() {
        assert_eq!("received".parse::<CardType>().unwrap(), CardType::Received);
        assert_eq!("寄出".parse::<CardType>().unwrap(), CardType::Sent);
        assert!("lost".parse::<CardType>().is_err());

        let unknown = Postcard {
            kind: Some("lost".into()),
            ..Default::default()
        };
        assert_eq!(unknown.card_type(), None);
        assert!(!unknown.is_received());
    }

    #[test]
    fn test_parse_many_accepts_single_and_list() {
        assert_eq!(Postcard::parse_many(r#"{"id":"A"}"#).unwrap().len(), 1);
        assert_eq!(
            Postcard::parse_many(r#"[{"id":"A"},{"id":"B"}]"#)
                .unwrap()
                .len(),
            2
        );
        assert!(Postcard::parse_many("null").unwrap().is_empty());
        assert!(Postcard::parse_many("not json").is_err());
    }

    #[test]
    fn test_non_object_items_are_skipped_when_reading() {
        let records = Postcard::parse_many(r#"[{"id":"A"}, 7, "x", null, {"id":"B"}]"#).unwrap();
        let ids: Vec<_> = records.iter().map(|c| c.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("A"), Some("B")]);
    }

    #[test]
    fn test_list_items_keep_stored_shape() {
        let stored = json!({"id": 42, "tags": [], "note": null, "region": {"p": "x"}});
        let items = list_items(json!([stored.clone(), 7]));
        assert_eq!(items, vec![stored.clone(), json!(7)]);
        assert_eq!(list_items(stored.clone()), vec![stored]);
        assert!(list_items(Value::Null).is_empty());

        let records = Postcard::from_items(&items);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id.as_deref(), Some("42"));
        assert_eq!(items[0]["id"], 42, "Reading must not touch the stored items");

        assert_eq!(parse_items(r#"{"id":"A"}"#).unwrap().len(), 1);
        assert!(parse_items("{oops").is_err());
    }

    #[test]
    fn test_parse_instant_formats() {
        let day = parse_instant("2024-01-10").unwrap();
        assert_eq!(parse_instant("2024/01/10"), Some(day));
        assert_eq!(parse_instant("2024-01-10T00:00:00Z"), Some(day));
        assert_eq!(parse_instant("2024-01-10 00:00:00"), Some(day));
        assert_eq!(parse_instant("2024-01-10T08:00:00+08:00"), Some(day));
        assert_eq!(parse_instant(""), None);
        assert_eq!(parse_instant("someday"), None);
    }
}
