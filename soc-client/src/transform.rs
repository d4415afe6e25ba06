//! Backend records to display records.

use crate::time::{calculate_ttr_at, TimeInput};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use soc_vocab::{client_severity, client_status, HandleStatus, Severity};

/// Ordered list of keys; the first one present (and not null) wins.
#[derive(Clone, Copy, Debug)]
pub struct FieldChain(pub &'static [&'static str]);

pub const CREATE_TIME: FieldChain = FieldChain(&["create_time", "createTime"]);
pub const VERIFICATION_STATE: FieldChain =
    FieldChain(&["verification_state", "ai_verification_state", "verificationState"]);

impl FieldChain {
    pub fn extract<'a>(&self, raw: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .filter_map(|key| raw.get(*key))
            .find(|value| !value.is_null())
    }
}

/// Runs each strategy in order and keeps the first value produced.
pub fn first_present<T>(strategies: &[&dyn Fn() -> Option<T>]) -> Option<T> {
    strategies.iter().find_map(|strategy| strategy())
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordView {
    pub id: Value,
    #[serde(rename = "createTime")]
    pub create_time: Value,
    pub title: Value,
    #[serde(rename = "riskLevel")]
    pub risk_level: String,
    pub status: String,
    pub owner: Value,
    pub actor: Value,
    pub severity: Value,
    pub handle_status: Value,
    pub update_time: Value,
    pub close_time: Value,
    pub arrive_time: Value,
    pub labels: Value,
    pub close_reason: Value,
    pub is_auto_closed: Value,
    pub close_comment: Value,
    pub creator: Value,
    #[serde(rename = "responseTime")]
    pub response_time: String,
    pub extend_properties: Value,
    pub description: Value,
    pub verification_state: Value,
}

fn field(raw: &Value, key: &str) -> Value {
    raw.get(key).cloned().unwrap_or(Value::Null)
}

fn non_empty_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub fn transform_record(raw: &Value) -> RecordView {
    transform_record_at(raw, Utc::now())
}

/// Total over any JSON input; missing fields come out as `null` or the
/// documented defaults.
pub fn transform_record_at(raw: &Value, now: DateTime<Utc>) -> RecordView {
    let created = CREATE_TIME.extract(raw).cloned().unwrap_or(Value::Null);
    let severity = non_empty_str(raw, "severity");
    let handle_status = non_empty_str(raw, "handle_status");

    let risk_level = first_present::<String>(&[
        &|| severity.and_then(Severity::from_api).map(|s| s.as_client().to_string()),
        &|| severity.map(client_severity),
        &|| Some(Severity::Medium.as_client().to_string()),
    ])
    .unwrap_or_default();

    let status = first_present::<String>(&[
        &|| handle_status.and_then(HandleStatus::from_api).map(|s| s.as_client().to_string()),
        &|| handle_status.map(client_status),
        &|| Some(HandleStatus::Open.as_client().to_string()),
    ])
    .unwrap_or_default();

    let response_time = calculate_ttr_at(
        TimeInput::from_json(Some(&created)),
        TimeInput::from_json(raw.get("close_time")),
        handle_status,
        now,
    );

    RecordView {
        id: field(raw, "id"),
        create_time: created,
        title: field(raw, "title"),
        risk_level,
        status,
        owner: field(raw, "creator"),
        actor: field(raw, "actor"),
        severity: field(raw, "severity"),
        handle_status: field(raw, "handle_status"),
        update_time: field(raw, "update_time"),
        close_time: field(raw, "close_time"),
        arrive_time: field(raw, "arrive_time"),
        labels: field(raw, "labels"),
        close_reason: field(raw, "close_reason"),
        is_auto_closed: field(raw, "is_auto_closed"),
        close_comment: field(raw, "close_comment"),
        creator: field(raw, "creator"),
        response_time,
        extend_properties: field(raw, "extend_properties"),
        description: field(raw, "description"),
        verification_state: VERIFICATION_STATE
            .extract(raw)
            .cloned()
            .unwrap_or(Value::Null),
    }
}

/// One page of transformed records plus the backend's total count.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordPage {
    pub data: Vec<RecordView>,
    pub total: u64,
}

impl RecordPage {
    pub fn from_response(response: &Value) -> Self {
        Self::from_response_at(response, Utc::now())
    }

    pub fn from_response_at(response: &Value, now: DateTime<Utc>) -> Self {
        let data = response
            .get("data")
            .and_then(Value::as_array)
            .map(|records| {
                records
                    .iter()
                    .map(|raw| transform_record_at(raw, now))
                    .collect()
            })
            .unwrap_or_default();
        let total = response.get("total").and_then(Value::as_u64).unwrap_or(0);
        Self { data, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-01-01T06:00:00Z")
            .expect("rfc3339")
            .with_timezone(&Utc)
    }

    #[test]
    fn closed_record_maps_labels_and_ttr() {
        let raw = json!({
            "id": "a-1",
            "create_time": "2024-01-01T00:00:00Z",
            "close_time": "2024-01-01T02:30:00Z",
            "title": "SQL injection",
            "severity": "High",
            "handle_status": "Closed",
            "creator": "alice",
            "actor": "10.0.0.7",
            "ai_verification_state": "true_positive"
        });
        let view = transform_record_at(&raw, now());

        assert_eq!(view.id, json!("a-1"));
        assert_eq!(view.risk_level, "high");
        assert_eq!(view.status, "closed");
        assert_eq!(view.owner, json!("alice"));
        assert_eq!(view.creator, json!("alice"));
        assert_eq!(view.severity, json!("High"));
        assert_eq!(view.response_time, "2h 30m");
        assert_eq!(view.verification_state, json!("true_positive"));
    }

    #[test]
    fn open_record_measures_until_now() {
        let raw = json!({"createTime": "2024-01-01T00:00:00Z", "handle_status": "Open"});
        let view = transform_record_at(&raw, now());
        assert_eq!(view.create_time, json!("2024-01-01T00:00:00Z"));
        assert_eq!(view.response_time, "6h");
    }

    #[test]
    fn empty_record_uses_defaults() {
        let view = transform_record_at(&json!({}), now());
        assert_eq!(view.risk_level, "medium");
        assert_eq!(view.status, "open");
        assert_eq!(view.response_time, "-");
        assert_eq!(view.id, Value::Null);

        let view = transform_record_at(&json!("not an object"), now());
        assert_eq!(view.risk_level, "medium");
    }

    #[test]
    fn unknown_labels_are_lowercased() {
        let raw = json!({"severity": "URGENT", "handle_status": "Pending"});
        let view = transform_record_at(&raw, now());
        assert_eq!(view.risk_level, "urgent");
        assert_eq!(view.status, "pending");
    }

    #[test]
    fn field_chain_prefers_earlier_keys_and_skips_nulls() {
        let raw = json!({"create_time": null, "createTime": "b"});
        assert_eq!(CREATE_TIME.extract(&raw), Some(&json!("b")));

        let raw = json!({"verificationState": "x", "verification_state": "y"});
        assert_eq!(VERIFICATION_STATE.extract(&raw), Some(&json!("y")));

        assert_eq!(CREATE_TIME.extract(&json!({})), None);
    }

    #[test]
    fn first_present_runs_in_order() {
        let picked = first_present::<u8>(&[&|| None, &|| Some(2), &|| Some(3)]);
        assert_eq!(picked, Some(2));
        assert_eq!(first_present::<u8>(&[]), None);
    }

    #[test]
    fn serializes_with_display_field_names() {
        let view = transform_record_at(&json!({"create_time": "2024-01-01T00:00:00Z"}), now());
        let body = serde_json::to_value(view).expect("serialize");
        assert_eq!(body["createTime"], json!("2024-01-01T00:00:00Z"));
        assert_eq!(body["riskLevel"], json!("medium"));
        assert_eq!(body["responseTime"], json!("6h"));
    }

    #[test]
    fn page_from_response() {
        let response = json!({
            "data": [{"id": 1, "severity": "Tips"}, {"id": 2}],
            "total": 42
        });
        let page = RecordPage::from_response_at(&response, now());
        assert_eq!(page.total, 42);
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].risk_level, "tips");

        let empty = RecordPage::from_response(&json!({"message": "ok"}));
        assert!(empty.data.is_empty());
        assert_eq!(empty.total, 0);
    }
}
