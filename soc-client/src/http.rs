//! Backend transport: request building and central response handling.

use crate::config::ClientConfig;
use crate::context::ClientContext;
use crate::error::{ClientError, Result};
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::multipart::Form;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

/// Invoked after the backend rejects the session, once the token is gone.
pub type UnauthorizedHook = Arc<dyn Fn() + Send + Sync>;

/// Builds a request against the context's backend with its session headers.
pub fn build_request(
    ctx: &ClientContext,
    http: &reqwest::Client,
    method: Method,
    path: &str,
    timeout: Duration,
) -> RequestBuilder {
    let url = ctx.endpoint(path);
    tracing::debug!(%method, %url, "dispatching request");

    let mut request = http
        .request(method, url)
        .header(ACCEPT_LANGUAGE, ctx.locale.as_str())
        .timeout(timeout);
    if let Some(token) = ctx.token.as_deref().filter(|t| !t.is_empty()) {
        request = request.bearer_auth(token);
    }
    request
}

/// Failure message carried in an error body, if any.
pub fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    ["message", "error_message", "detail"]
        .iter()
        .filter_map(|key| parsed.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.is_empty())
        .map(str::to_string)
}

/// Rejects `{code, message}` envelopes whose code is set and not 200.
pub fn check_envelope(body: &Value) -> Result<()> {
    let Some(code) = body.get("code").and_then(Value::as_i64) else {
        return Ok(());
    };
    if code == 0 || code == 200 {
        return Ok(());
    }
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("Error")
        .to_string();
    tracing::error!(code, %message, "backend rejected request");
    Err(ClientError::Api { code, message })
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
    context: Arc<RwLock<ClientContext>>,
    on_unauthorized: Option<UnauthorizedHook>,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout())
            .build()?;
        let context = ClientContext::init(&config);
        Ok(Self {
            http,
            config,
            context: Arc::new(RwLock::new(context)),
            on_unauthorized: None,
        })
    }

    pub fn with_unauthorized_hook(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_unauthorized = Some(Arc::new(hook));
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Snapshot of the current session.
    pub fn context(&self) -> ClientContext {
        self.read_context().clone()
    }

    pub fn set_token(&self, token: Option<String>) {
        self.write_context().token = token;
    }

    pub fn set_locale(&self, locale: impl Into<String>) {
        self.write_context().locale = locale.into();
    }

    pub fn clear_session(&self) {
        self.write_context().clear();
    }

    fn read_context(&self) -> RwLockReadGuard<'_, ClientContext> {
        self.context.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_context(&self) -> RwLockWriteGuard<'_, ClientContext> {
        self.context.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        build_request(&self.read_context(), &self.http, method, path, self.config.timeout())
    }

    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        self.send(self.request(Method::GET, path).query(query)).await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: &B,
    ) -> Result<Value> {
        self.send(self.request(Method::DELETE, path).query(query).json(body))
            .await
    }

    /// POST returning the raw body, for file downloads.
    pub async fn post_bytes<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Vec<u8>> {
        let response = self.request(Method::POST, path).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await?;
            return Err(self.reject(status, &text));
        }
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        query: &[(&str, &str)],
        form: Form,
    ) -> Result<Value> {
        self.send(self.request(Method::POST, path).query(query).multipart(form))
            .await
    }

    pub async fn send(&self, request: RequestBuilder) -> Result<Value> {
        let response = request.send().await?;
        self.interpret(response).await
    }

    async fn interpret(&self, response: Response) -> Result<Value> {
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(self.reject(status, &text));
        }
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        let body: Value = serde_json::from_str(&text)?;
        check_envelope(&body)?;
        Ok(body)
    }

    fn reject(&self, status: StatusCode, body: &str) -> ClientError {
        let code = status.as_u16();
        if matches!(code, 401 | 422) {
            if self.config.enable_auth {
                self.clear_session();
                if let Some(hook) = &self.on_unauthorized {
                    hook();
                }
            }
            tracing::warn!(status = code, "session rejected by backend");
            return ClientError::Unauthorized { status: code };
        }

        let message = error_message(body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "request failed".into());
        match code {
            403 => tracing::error!(status = code, "forbidden: access denied"),
            404 => {
                tracing::error!(status = code, "not found: the requested resource was not found")
            }
            500 => tracing::error!(status = code, "server error: internal server error"),
            _ => tracing::error!(status = code, %message, "request failed"),
        }
        ClientError::Http {
            status: code,
            message,
        }
    }
}
