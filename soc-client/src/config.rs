use crate::error::ClientError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_LOCALE: &str = "zh-CN";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CHAT_USER: &str = "soc-console";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// When false, 401/422 responses are returned without tearing down the
    /// session.
    pub enable_auth: bool,
    pub api_base_url: String,
    pub locale: String,
    pub timeout_secs: u64,
    pub ai_chat_api: Option<String>,
    pub ai_chat_key: Option<String>,
    pub ai_chat_user: String,
    /// Bearer token to start the session with.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            enable_auth: true,
            api_base_url: DEFAULT_API_BASE_URL.into(),
            locale: DEFAULT_LOCALE.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            ai_chat_api: None,
            ai_chat_key: None,
            ai_chat_user: DEFAULT_CHAT_USER.into(),
            token: None,
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            enable_auth: get("SOC_ENABLE_AUTH").map_or(true, |v| v != "false"),
            api_base_url: get("SOC_API_BASE_URL").unwrap_or_else(|| DEFAULT_API_BASE_URL.into()),
            locale: get("SOC_LOCALE").unwrap_or_else(|| DEFAULT_LOCALE.into()),
            timeout_secs: get("SOC_TIMEOUT_SECS")
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ai_chat_api: get("SOC_AI_CHAT_API"),
            ai_chat_key: get("SOC_AI_CHAT_KEY"),
            ai_chat_user: get("SOC_AI_CHAT_USER").unwrap_or_else(|| DEFAULT_CHAT_USER.into()),
            token: get("SOC_TOKEN"),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn require_chat_endpoint(&self) -> Result<&str, ClientError> {
        self.ai_chat_api.as_deref().ok_or_else(|| {
            ClientError::Config(
                "Security Agent chat endpoint is not configured; set SOC_AI_CHAT_API".into(),
            )
        })
    }
}
