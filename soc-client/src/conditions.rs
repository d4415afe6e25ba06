//! Filter state to backend match conditions.
//!
//! The backend ANDs every condition in the list, so several keywords become
//! several conditions. Nothing here tries to express OR.

use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use soc_vocab::{api_severity, api_status, keyword_api_field};
use std::fmt;

/// Filter value meaning "no filter".
pub const ALL: &str = "all";

/// One `{field: value}` match constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct Condition {
    pub field: String,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.field, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SingleEntry;

        impl<'de> Visitor<'de> for SingleEntry {
            type Value = Condition;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object with exactly one field")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Condition, A::Error> {
                let Some((field, value)) = map.next_entry::<String, Value>()? else {
                    return Err(de::Error::invalid_length(0, &self));
                };
                if map.next_key::<String>()?.is_some() {
                    return Err(de::Error::invalid_length(2, &self));
                }
                Ok(Condition { field, value })
            }
        }

        deserializer.deserialize_map(SingleEntry)
    }
}

/// A search term. Bare strings search titles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Keyword {
    Title(String),
    Field { name: String, value: String },
}

impl Keyword {
    pub fn field(name: impl Into<String>, value: impl Into<String>) -> Self {
        Keyword::Field {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parses `field=value`; anything without `=` is a title search.
    pub fn parse(text: &str) -> Self {
        match text.split_once('=') {
            Some((name, value)) if !name.trim().is_empty() => {
                Keyword::field(name.trim(), value.trim())
            }
            _ => Keyword::Title(text.trim().to_string()),
        }
    }

    pub fn api_field(&self) -> String {
        match self {
            Keyword::Title(_) => keyword_api_field("title"),
            Keyword::Field { name, .. } => keyword_api_field(name),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Keyword::Title(value) | Keyword::Field { value, .. } => value,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawKeyword {
    Legacy(String),
    Structured { field: String, value: Value },
}

/// Accepts either a list of title strings or a list of `{field, value}`
/// objects; the first entry decides which. Entries of the other shape,
/// malformed entries and empty, zero or `false` values are dropped.
pub fn normalize_keywords(raw: &Value) -> Vec<Keyword> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };
    let legacy = items.first().is_some_and(Value::is_string);

    items
        .iter()
        .filter_map(|item| serde_json::from_value::<RawKeyword>(item.clone()).ok())
        .filter_map(|kw| match kw {
            RawKeyword::Legacy(text) if legacy => Some(Keyword::Title(text.trim().to_string())),
            RawKeyword::Structured { field, value } if !legacy && !field.is_empty() => {
                let value = match value {
                    Value::String(s) => s.trim().to_string(),
                    Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
                    Value::Bool(true) => "true".to_string(),
                    _ => return None,
                };
                Some(Keyword::field(field, value))
            }
            _ => None,
        })
        .filter(|kw| !kw.value().is_empty())
        .collect()
}

/// Loosely typed filter state as held by a list view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryFilter {
    pub keywords: Vec<Keyword>,
    pub status: Option<String>,
    pub severity: Option<String>,
    pub verification_state: Option<String>,
    pub auto_close: Option<String>,
}

fn active(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != ALL)
}

/// Order is fixed: status, keywords, severity, auto-close, verification.
pub fn build_conditions(filter: &QueryFilter) -> Vec<Condition> {
    let mut conditions = Vec::new();

    if let Some(status) = active(filter.status.as_deref()) {
        conditions.push(Condition::new("handle_status", api_status(status)));
    }

    for keyword in &filter.keywords {
        let value = keyword.value().trim();
        if value.is_empty() {
            continue;
        }
        conditions.push(Condition::new(keyword.api_field(), value));
    }

    if let Some(severity) = active(filter.severity.as_deref()) {
        conditions.push(Condition::new("severity", api_severity(severity)));
    }

    if let Some(auto_close) = active(filter.auto_close.as_deref()) {
        let value = match auto_close.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(auto_close.to_string()),
        };
        conditions.push(Condition::new("is_auto_closed", value));
    }

    if let Some(state) = active(filter.verification_state.as_deref()) {
        conditions.push(Condition::new("verification_state", state));
    }

    conditions
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn keywords_become_separate_and_conditions() {
        let filter = QueryFilter {
            keywords: normalize_keywords(&json!([
                {"field": "title", "value": "sql"},
                {"field": "title", "value": "inject"}
            ])),
            status: Some("open".into()),
            ..QueryFilter::default()
        };

        let conditions = build_conditions(&filter);
        assert_eq!(
            serde_json::to_value(&conditions).expect("serialize"),
            json!([{"handle_status": "Open"}, {"title": "sql"}, {"title": "inject"}])
        );
    }

    #[test]
    fn legacy_string_keywords_search_titles() {
        let keywords = normalize_keywords(&json!(["  brute force ", "", "admin"]));
        assert_eq!(
            keywords,
            vec![
                Keyword::Title("brute force".into()),
                Keyword::Title("admin".into())
            ]
        );
    }

    #[test]
    fn structured_keywords_map_field_names() {
        let keywords = normalize_keywords(&json!([
            {"field": "id", "value": 42},
            {"field": "creator", "value": " alice "},
            {"field": "actor", "value": ""},
            {"field": "", "value": "x"},
            {"value": "orphan"},
            null
        ]));
        let conditions = build_conditions(&QueryFilter {
            keywords,
            ..QueryFilter::default()
        });
        assert_eq!(
            conditions,
            vec![
                Condition::new("alert_id", "42"),
                Condition::new("creator", "alice")
            ]
        );
    }

    #[test]
    fn first_entry_decides_the_keyword_shape() {
        let legacy = normalize_keywords(&json!(["sql", {"field": "id", "value": "7"}]));
        assert_eq!(legacy, vec![Keyword::Title("sql".into())]);

        let structured = normalize_keywords(&json!([{"field": "id", "value": "7"}, "sql"]));
        assert_eq!(structured, vec![Keyword::field("id", "7")]);
    }

    #[test]
    fn falsy_structured_values_are_dropped() {
        let keywords = normalize_keywords(&json!([
            {"field": "id", "value": 0},
            {"field": "id", "value": false},
            {"field": "id", "value": true},
            {"field": "id", "value": 0.5}
        ]));
        assert_eq!(
            keywords,
            vec![Keyword::field("id", "true"), Keyword::field("id", "0.5")]
        );
    }

    #[test]
    fn non_array_keywords_are_ignored() {
        assert!(normalize_keywords(&json!("sql")).is_empty());
        assert!(normalize_keywords(&Value::Null).is_empty());
    }

    #[test]
    fn all_and_blank_filters_are_skipped() {
        let filter = QueryFilter {
            keywords: vec![Keyword::Title("   ".into())],
            status: Some("all".into()),
            severity: Some("".into()),
            verification_state: Some("all".into()),
            auto_close: None,
        };
        assert!(build_conditions(&filter).is_empty());
    }

    #[test]
    fn full_filter_keeps_stable_order() {
        let filter = QueryFilter {
            keywords: vec![Keyword::parse("actor=bob"), Keyword::parse("ransomware")],
            status: Some("closed".into()),
            severity: Some("fatal".into()),
            verification_state: Some("true_positive".into()),
            auto_close: Some("True".into()),
        };
        assert_eq!(
            serde_json::to_value(build_conditions(&filter)).expect("serialize"),
            json!([
                {"handle_status": "Closed"},
                {"actor": "bob"},
                {"title": "ransomware"},
                {"severity": "Fatal"},
                {"is_auto_closed": true},
                {"verification_state": "true_positive"}
            ])
        );
    }

    #[test]
    fn unknown_status_and_severity_pass_through() {
        let filter = QueryFilter {
            status: Some("pending".into()),
            severity: Some("urgent".into()),
            auto_close: Some("manual".into()),
            ..QueryFilter::default()
        };
        assert_eq!(
            build_conditions(&filter),
            vec![
                Condition::new("handle_status", "pending"),
                Condition::new("severity", "urgent"),
                Condition::new("is_auto_closed", "manual"),
            ]
        );
    }

    #[test]
    fn condition_deserializes_from_single_entry_object() {
        let parsed: Vec<Condition> =
            serde_json::from_value(json!([{"title": "sql"}])).expect("deserialize");
        assert_eq!(parsed, vec![Condition::new("title", "sql")]);

        assert!(serde_json::from_value::<Condition>(json!({})).is_err());
        assert!(serde_json::from_value::<Condition>(json!({"a": 1, "b": 2})).is_err());
    }

    #[test]
    fn keyword_parse_splits_on_first_equals() {
        assert_eq!(Keyword::parse("id=a=b"), Keyword::field("id", "a=b"));
        assert_eq!(Keyword::parse("=x"), Keyword::Title("=x".into()));
        assert_eq!(Keyword::parse(" phishing "), Keyword::Title("phishing".into()));
    }
}
