use super::{with_workspace, workspace_query};
use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::query::RecordQuery;
use crate::time::format_date_time_with_offset;
use crate::transform::RecordPage;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};
use soc_vocab::{
    api_severity, api_status, close_reason_label, validate_alert_draft, AlertDraft, HandleStatus,
    Severity,
};

pub async fn list_alerts(client: &ApiClient, query: &RecordQuery) -> Result<RecordPage> {
    let body = client.post("/alerts", &query.to_request()).await?;
    Ok(RecordPage::from_response(&body))
}

pub async fn get_alert(client: &ApiClient, id: &str, workspace: Option<&str>) -> Result<Value> {
    client
        .get(&format!("/alerts/{id}"), &workspace_query(workspace))
        .await
}

/// Comments and timeline attached to an alert.
pub async fn get_alert_comments_extension(
    client: &ApiClient,
    id: &str,
    workspace: Option<&str>,
) -> Result<Value> {
    let mut query = vec![("action", "comments_extension")];
    query.extend(workspace_query(workspace));
    client.get(&format!("/alerts/{id}"), &query).await
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// The `data` object sent when creating or editing an alert. Client labels
/// are mapped to wire labels and the creation time falls back to now.
pub fn alert_payload(draft: &AlertDraft) -> Value {
    let create_time = non_empty(&draft.create_time)
        .and_then(|t| format_date_time_with_offset(t))
        .or_else(|| format_date_time_with_offset(Utc::now()));
    let severity = non_empty(&draft.risk_level)
        .map(api_severity)
        .unwrap_or_else(|| Severity::Medium.as_api().to_string());
    let handle_status = non_empty(&draft.status)
        .map(api_status)
        .unwrap_or_else(|| HandleStatus::Open.as_api().to_string());

    json!({
        "title": draft.title,
        "create_time": create_time,
        "severity": severity,
        "handle_status": handle_status,
        "owner": draft.owner,
        "rule_name": draft.rule_name.clone().unwrap_or_default(),
        "description": draft.description,
    })
}

pub async fn create_alert(
    client: &ApiClient,
    draft: &AlertDraft,
    workspace: Option<&str>,
) -> Result<Value> {
    validate_alert_draft(draft).map_err(ClientError::InvalidRequest)?;
    let body = with_workspace(
        json!({"action": "create", "data": alert_payload(draft)}),
        workspace,
    );
    client.post("/alerts/create", &body).await
}

pub async fn update_alert(
    client: &ApiClient,
    id: &str,
    draft: &AlertDraft,
    workspace: Option<&str>,
) -> Result<Value> {
    let body = with_workspace(
        json!({"action": "update", "data": alert_payload(draft)}),
        workspace,
    );
    client.put(&format!("/alerts/{id}"), &body).await
}

pub async fn close_alert(
    client: &ApiClient,
    id: &str,
    category: &str,
    notes: Option<&str>,
    workspace: Option<&str>,
) -> Result<Value> {
    let body = with_workspace(
        json!({
            "action": "close",
            "data": {
                "close_reason": close_reason_label(category),
                "close_comment": notes.unwrap_or_default(),
            }
        }),
        workspace,
    );
    client.put(&format!("/alerts/{id}"), &body).await
}

pub async fn batch_close_alerts(
    client: &ApiClient,
    ids: &[String],
    category: &str,
    comment: Option<&str>,
    workspace: Option<&str>,
) -> Result<Value> {
    if ids.is_empty() {
        return Err(ClientError::InvalidRequest("no alerts selected".into()));
    }
    let body = with_workspace(
        json!({
            "batch_ids": ids,
            "data_object": {
                "handle_status": HandleStatus::Closed.as_api(),
                "close_reason": close_reason_label(category),
                "close_comment": comment.unwrap_or_default(),
            }
        }),
        workspace,
    );
    client.put("/alerts", &body).await
}

pub async fn open_alert(client: &ApiClient, id: &str, workspace: Option<&str>) -> Result<Value> {
    let body = with_workspace(
        json!({
            "action": "update",
            "data": {"handle_status": HandleStatus::Open.as_api()}
        }),
        workspace,
    );
    client.put(&format!("/alerts/{id}"), &body).await
}

pub async fn delete_alerts(
    client: &ApiClient,
    ids: &[String],
    workspace: Option<&str>,
) -> Result<Value> {
    if ids.is_empty() {
        return Err(ClientError::InvalidRequest("no alerts selected".into()));
    }
    client
        .delete("/alerts", &workspace_query(workspace), &json!({"batch_ids": ids}))
        .await
}

/// Alert counts grouped by source since `start`.
pub async fn alert_count_by_source(client: &ApiClient, start: DateTime<Utc>) -> Result<Value> {
    let start_date = start.to_rfc3339_opts(SecondsFormat::Secs, true);
    client
        .get("/stats/alerts", &[("start_date", start_date.as_str())])
        .await
}
