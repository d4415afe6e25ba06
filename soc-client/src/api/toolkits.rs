use crate::error::Result;
use crate::http::ApiClient;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One toolkit execution as submitted by an analyst.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolkitRun {
    pub title: String,
    pub app_id: String,
    pub app_type: String,
    #[serde(default)]
    pub params: Map<String, Value>,
}

pub async fn list_toolkits(client: &ApiClient) -> Result<Value> {
    client.get("/toolkits", &[]).await
}

pub async fn toolkit_records(client: &ApiClient, alert_id: Option<&str>) -> Result<Value> {
    let query: Vec<(&str, &str)> = alert_id.map(|id| vec![("alert_id", id)]).unwrap_or_default();
    client.get("/toolkits/records", &query).await
}

pub fn run_body(alert_id: Option<&str>, run: &ToolkitRun) -> Result<Value> {
    let mut body = serde_json::to_value(run)?;
    if let (Some(map), Some(id)) = (body.as_object_mut(), alert_id) {
        map.insert("alert_id".into(), Value::String(id.to_string()));
    }
    Ok(body)
}

pub async fn execute_toolkit(
    client: &ApiClient,
    alert_id: Option<&str>,
    run: &ToolkitRun,
) -> Result<Value> {
    let body = run_body(alert_id, run)?;
    client.post("/toolkits/records", &body).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn run_body_attaches_alert_id() {
        let mut params = Map::new();
        params.insert("ip".into(), json!("10.0.0.7"));
        let run = ToolkitRun {
            title: "Block IP".into(),
            app_id: "fw-1".into(),
            app_type: "firewall".into(),
            params,
        };

        let body = run_body(Some("a-9"), &run).expect("body");
        assert_eq!(body["alert_id"], "a-9");
        assert_eq!(body["params"]["ip"], "10.0.0.7");

        let body = run_body(None, &run).expect("body");
        assert!(body.get("alert_id").is_none());
    }
}
