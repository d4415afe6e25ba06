use serde::{Deserialize, Serialize};

/// Lifecycle state of an alert or incident.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleStatus {
    Open,
    /// Shown as "pending" in some views.
    Block,
    Closed,
}

impl HandleStatus {
    pub const ALL: [HandleStatus; 3] = [
        HandleStatus::Open,
        HandleStatus::Block,
        HandleStatus::Closed,
    ];

    pub fn as_api(&self) -> &'static str {
        match self {
            HandleStatus::Open => "Open",
            HandleStatus::Block => "Block",
            HandleStatus::Closed => "Closed",
        }
    }

    pub fn as_client(&self) -> &'static str {
        match self {
            HandleStatus::Open => "open",
            HandleStatus::Block => "block",
            HandleStatus::Closed => "closed",
        }
    }

    pub fn from_api(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_api() == value)
    }

    pub fn from_client(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_client() == value)
    }

    pub fn is_closed_label(value: &str) -> bool {
        value.trim().eq_ignore_ascii_case(HandleStatus::Closed.as_api())
    }
}

pub fn api_status(value: &str) -> String {
    HandleStatus::from_client(value)
        .map(|s| s.as_api().to_string())
        .unwrap_or_else(|| value.to_string())
}

pub fn client_status(value: &str) -> String {
    HandleStatus::from_api(value)
        .map(|s| s.as_client().to_string())
        .unwrap_or_else(|| value.to_lowercase())
}

/// Category picked in the close dialog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CloseReason {
    FalsePositive,
    Resolved,
    Repeated,
    Other,
}

impl CloseReason {
    pub const ALL: [CloseReason; 4] = [
        CloseReason::FalsePositive,
        CloseReason::Resolved,
        CloseReason::Repeated,
        CloseReason::Other,
    ];

    pub fn category(&self) -> &'static str {
        match self {
            CloseReason::FalsePositive => "falsePositive",
            CloseReason::Resolved => "resolved",
            CloseReason::Repeated => "repeated",
            CloseReason::Other => "other",
        }
    }

    pub fn as_api(&self) -> &'static str {
        match self {
            CloseReason::FalsePositive => "False detection",
            CloseReason::Resolved => "Resolved",
            CloseReason::Repeated => "Repeated",
            CloseReason::Other => "Other",
        }
    }

    pub fn from_category(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.category() == value)
    }
}

/// Close-dialog category to the backend close reason. Free text passes
/// through; an empty category becomes `Other`.
pub fn close_reason_label(category: &str) -> String {
    if category.trim().is_empty() {
        return CloseReason::Other.as_api().to_string();
    }
    CloseReason::from_category(category)
        .map(|r| r.as_api().to_string())
        .unwrap_or_else(|| category.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_labels_roundtrip_both_ways() {
        for status in HandleStatus::ALL {
            assert_eq!(client_status(&api_status(status.as_client())), status.as_client());
            assert_eq!(api_status(&client_status(status.as_api())), status.as_api());
        }
    }

    #[test]
    fn unknown_status_falls_back() {
        assert_eq!(api_status("pending"), "pending");
        assert_eq!(client_status("Pending"), "pending");
    }

    #[test]
    fn closed_label_ignores_case() {
        assert!(HandleStatus::is_closed_label("Closed"));
        assert!(HandleStatus::is_closed_label("closed "));
        assert!(!HandleStatus::is_closed_label("Open"));
    }

    #[test]
    fn close_reason_categories() {
        assert_eq!(close_reason_label("falsePositive"), "False detection");
        assert_eq!(close_reason_label("resolved"), "Resolved");
        assert_eq!(close_reason_label("repeated"), "Repeated");
        assert_eq!(close_reason_label("other"), "Other");
        assert_eq!(close_reason_label("duplicate ticket"), "duplicate ticket");
        assert_eq!(close_reason_label("  "), "Other");
    }
}
