use crate::error::Result;
use crate::http::ApiClient;
use serde_json::Value;

pub async fn list_vulnerabilities(client: &ApiClient, params: &Value) -> Result<Value> {
    client.post("/vulnerabilities", params).await
}

pub async fn vulnerability_trend(client: &ApiClient, params: &[(&str, &str)]) -> Result<Value> {
    client.get("/vulnerabilities/trend", params).await
}

pub async fn vulnerability_department_distribution(
    client: &ApiClient,
    params: &[(&str, &str)],
) -> Result<Value> {
    client
        .get("/vulnerabilities/department-distribution", params)
        .await
}

pub async fn get_vulnerability(client: &ApiClient, id: &str) -> Result<Value> {
    client.get(&format!("/vulnerabilities/{id}"), &[]).await
}

pub async fn batch_operate_vulnerabilities(client: &ApiClient, params: &Value) -> Result<Value> {
    client.post("/vulnerabilities/batch-operate", params).await
}

/// Report file contents, as returned by the backend.
pub async fn export_vulnerability_report(client: &ApiClient, params: &Value) -> Result<Vec<u8>> {
    client.post_bytes("/vulnerabilities/export", params).await
}
