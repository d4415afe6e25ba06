//! Security Agent chat against the external assistant endpoint.
//!
//! The endpoint is not the SOC backend: it has its own key, and its
//! failures never touch the backend session.

use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use crate::stream::{event_stream, read_event_stream};
use futures::stream::{Stream, StreamExt};
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub alert_id: Option<String>,
    pub message: String,
}

impl ChatMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            alert_id: None,
            message: message.into(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseMode {
    Blocking,
    Streaming,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Blocking => "blocking",
            ResponseMode::Streaming => "streaming",
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    inputs: Map<String, Value>,
    query: &'a str,
    response_mode: &'static str,
    user: &'a str,
}

/// Checks config and input, then builds the request. Nothing is sent.
pub fn prepare_chat(
    client: &ApiClient,
    message: &ChatMessage,
    mode: ResponseMode,
) -> Result<RequestBuilder> {
    let config = client.config();
    let endpoint = config.require_chat_endpoint()?;

    let query = message.message.trim();
    if query.is_empty() {
        return Err(ClientError::InvalidRequest("Message content is required".into()));
    }

    let body = ChatRequest {
        inputs: Map::new(),
        query,
        response_mode: mode.as_str(),
        user: &config.ai_chat_user,
    };
    tracing::debug!(
        alert_id = message.alert_id.as_deref().unwrap_or("-"),
        mode = mode.as_str(),
        "sending security agent message"
    );

    let mut request = client.http().post(endpoint).json(&body);
    if mode == ResponseMode::Blocking {
        request = request.timeout(config.timeout());
    }
    if let Some(key) = config.ai_chat_key.as_deref() {
        request = request.bearer_auth(key);
    }
    Ok(request)
}

async fn dispatch(request: RequestBuilder) -> Result<Response> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().await.unwrap_or_default();
    let message = if text.trim().is_empty() {
        format!("External AI chat API responded with {}", status.as_u16())
    } else {
        text
    };
    tracing::error!(status = status.as_u16(), %message, "security agent call failed");
    Err(ClientError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Single blocking answer. Non-JSON responses come back as `{"raw": text}`.
pub async fn send_message(client: &ApiClient, message: &ChatMessage) -> Result<Value> {
    let request = prepare_chat(client, message, ResponseMode::Blocking)?;
    let response = dispatch(request).await?;

    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if is_json {
        return Ok(response.json::<Value>().await?);
    }
    let text = response.text().await?;
    Ok(json!({ "raw": text }))
}

/// Streamed answer as a lazy sequence of events, ended by the server
/// closing the body. Dropping the stream closes the connection.
pub async fn stream_message(
    client: &ApiClient,
    message: &ChatMessage,
) -> Result<impl Stream<Item = Result<Value>>> {
    let request = prepare_chat(client, message, ResponseMode::Streaming)?;
    let response = dispatch(request).await?;
    Ok(event_stream(response.bytes_stream()).map(|event| event.map_err(ClientError::from)))
}

/// Callback form of [`stream_message`]; returns the last event received.
pub async fn stream_message_with<F>(
    client: &ApiClient,
    message: &ChatMessage,
    on_event: F,
) -> Result<Option<Value>>
where
    F: FnMut(&Value),
{
    let request = prepare_chat(client, message, ResponseMode::Streaming)?;
    let response = dispatch(request).await?;
    Ok(read_event_stream(response.bytes_stream(), on_event).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    fn client(chat_api: Option<&str>) -> ApiClient {
        ApiClient::new(ClientConfig {
            ai_chat_api: chat_api.map(str::to_string),
            ai_chat_key: Some("k".into()),
            ..ClientConfig::default()
        })
        .expect("client")
    }

    #[test]
    fn missing_endpoint_is_a_config_error() {
        let err = prepare_chat(&client(None), &ChatMessage::new("hi"), ResponseMode::Blocking)
            .expect_err("no endpoint");
        assert!(matches!(err, ClientError::Config(_)));
    }

    #[test]
    fn blank_message_is_rejected() {
        let err = prepare_chat(
            &client(Some("http://chat.local/v1")),
            &ChatMessage::new("   "),
            ResponseMode::Streaming,
        )
        .expect_err("blank");
        assert!(matches!(
            err,
            ClientError::InvalidRequest(ref msg) if msg == "Message content is required"
        ));
    }

    #[test]
    fn request_body_and_auth() {
        let request = prepare_chat(
            &client(Some("http://chat.local/v1")),
            &ChatMessage::new("  what is 10.0.0.7?  "),
            ResponseMode::Streaming,
        )
        .expect("prepared")
        .build()
        .expect("request");

        assert_eq!(request.headers()["authorization"], "Bearer k");
        assert_eq!(request.timeout(), None);
        let body: Value = serde_json::from_slice(
            request.body().and_then(|b| b.as_bytes()).expect("buffered body"),
        )
        .expect("json");
        assert_eq!(
            body,
            json!({
                "inputs": {},
                "query": "what is 10.0.0.7?",
                "response_mode": "streaming",
                "user": "soc-console"
            })
        );
    }
}
