//! Errors raised by network-facing calls.

/// Failures of a backend or chat call. Malformed record data never ends up
/// here; the pure layers degrade to defaults instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required setting is missing. Raised before any request is sent.
    #[error("configuration error: {0}")]
    Config(String),

    /// Caller input rejected before any request is sent.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The backend refused the session (401 or 422).
    #[error("unauthorized (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// A 2xx response whose envelope carried a failure code.
    #[error("backend error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Unauthorized { status } | ClientError::Http { status, .. } => {
                Some(*status)
            }
            ClientError::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
