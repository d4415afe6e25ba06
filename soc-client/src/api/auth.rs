use crate::error::Result;
use crate::http::ApiClient;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

fn access_token(body: &Value) -> Option<String> {
    body.get("access_token")
        .or_else(|| body.get("data").and_then(|d| d.get("access_token")))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Logs in and keeps the returned access token for later calls.
pub async fn login(client: &ApiClient, credentials: &Credentials) -> Result<Value> {
    let body = client.post("/login", credentials).await?;
    match access_token(&body) {
        Some(token) => client.set_token(Some(token)),
        None => tracing::warn!("login response carried no access token"),
    }
    Ok(body)
}

/// The local session is cleared whether or not the backend call succeeds.
pub async fn logout(client: &ApiClient) -> Result<Value> {
    let result = client.send(client.request(Method::POST, "/logout")).await;
    client.clear_session();
    result
}

pub async fn refresh_token(client: &ApiClient) -> Result<Value> {
    let body = client.send(client.request(Method::POST, "/refresh")).await?;
    if let Some(token) = access_token(&body) {
        client.set_token(Some(token));
    }
    Ok(body)
}

pub async fn update_password(client: &ApiClient, old: &str, new: &str) -> Result<Value> {
    client
        .put("/user/password", &json!({"old_pwd": old, "new_pwd": new}))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_read_from_top_level_or_data() {
        assert_eq!(
            access_token(&json!({"access_token": "a"})).as_deref(),
            Some("a")
        );
        assert_eq!(
            access_token(&json!({"data": {"access_token": "b"}})).as_deref(),
            Some("b")
        );
        assert_eq!(access_token(&json!({"access_token": ""})), None);
        assert_eq!(access_token(&json!({})), None);
    }
}
