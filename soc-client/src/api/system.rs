use crate::error::Result;
use crate::http::ApiClient;
use serde_json::Value;

/// Logged-in user name, platform version and similar.
pub async fn system_info(client: &ApiClient) -> Result<Value> {
    client.get("/system/info", &[]).await
}

/// Suggested assistant prompts for a console route, e.g. `/alerts`.
pub async fn ai_prompts(client: &ApiClient, route: &str, lang: &str) -> Result<Value> {
    client
        .get("/ai/prompt", &[("route", route), ("lang", lang)])
        .await
}
