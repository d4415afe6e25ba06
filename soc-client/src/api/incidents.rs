use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::query::RecordQuery;
use crate::transform::RecordPage;
use serde_json::{json, Value};
use soc_vocab::{close_reason_label, HandleStatus};

pub async fn list_incidents(client: &ApiClient, query: &RecordQuery) -> Result<RecordPage> {
    let body = client.post("/incidents", &query.to_request()).await?;
    Ok(RecordPage::from_response(&body))
}

pub async fn get_incident(client: &ApiClient, id: &str) -> Result<Value> {
    client.get(&format!("/incidents/{id}"), &[]).await
}

pub async fn create_incident(client: &ApiClient, incident: &Value) -> Result<Value> {
    client.post("/incidents/create", incident).await
}

pub async fn update_incident(client: &ApiClient, id: &str, changes: &Value) -> Result<Value> {
    client
        .put(&format!("/incidents/{id}/update"), changes)
        .await
}

pub async fn batch_close_incidents(
    client: &ApiClient,
    ids: &[String],
    category: &str,
    comment: Option<&str>,
) -> Result<Value> {
    if ids.is_empty() {
        return Err(ClientError::InvalidRequest("no incidents selected".into()));
    }
    let body = json!({
        "batch_ids": ids,
        "data_object": {
            "handle_status": HandleStatus::Closed.as_api(),
            "close_reason": close_reason_label(category),
            "close_comment": comment.unwrap_or_default(),
        }
    });
    client.post("/incidents/batch-close", &body).await
}

/// Alerts and assets linked to an incident.
pub async fn incident_relations(client: &ApiClient, id: &str) -> Result<Value> {
    client
        .get(&format!("/incidents/{id}/relations"), &[])
        .await
}

pub async fn incident_graph(client: &ApiClient, id: &str) -> Result<Value> {
    client.get(&format!("/incidents/{id}/graph"), &[]).await
}
