use crate::config::ClientConfig;
use serde::{Deserialize, Serialize};

/// Session state threaded into every request: who we are, which language
/// we want answers in, and where the backend lives.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientContext {
    pub token: Option<String>,
    pub locale: String,
    pub base_url: String,
}

impl ClientContext {
    pub fn init(config: &ClientConfig) -> Self {
        Self {
            token: config.token.clone(),
            locale: config.locale.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Drops the session. Locale and base URL survive a logout.
    pub fn clear(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn endpoint(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
