mod severity;
mod status;

pub use severity::{
    api_severity, client_severity, number_to_severity, severity_to_number, Severity,
};
pub use status::{api_status, client_status, close_reason_label, CloseReason, HandleStatus};

use serde::{Deserialize, Serialize};

/// Maps a search field chosen in the UI to the backend column it filters.
pub fn keyword_api_field(field: &str) -> String {
    match field {
        "title" => "title".into(),
        "id" => "alert_id".into(),
        "creator" => "creator".into(),
        "actor" => "actor".into(),
        other => other.to_string(),
    }
}

/// Alert fields as entered in the create/edit form, using client labels.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertDraft {
    pub title: String,
    pub risk_level: Option<String>,
    pub status: Option<String>,
    pub owner: Option<String>,
    pub description: Option<String>,
    pub rule_name: Option<String>,
    pub create_time: Option<String>,
}

pub fn validate_alert_draft(draft: &AlertDraft) -> Result<(), String> {
    if draft.title.trim().is_empty() {
        return Err("title is required".into());
    }
    if let Some(level) = draft.risk_level.as_deref() {
        if Severity::from_client(level).is_none() {
            return Err(format!("invalid risk level '{level}'"));
        }
    }
    if let Some(status) = draft.status.as_deref() {
        if HandleStatus::from_client(status).is_none() {
            return Err(format!("invalid status '{status}'"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_fields_map_to_columns() {
        assert_eq!(keyword_api_field("id"), "alert_id");
        assert_eq!(keyword_api_field("title"), "title");
        assert_eq!(keyword_api_field("rule_name"), "rule_name");
    }

    #[test]
    fn validates_alert_draft() {
        let draft = AlertDraft {
            title: "SQL injection on db01".into(),
            risk_level: Some("high".into()),
            status: Some("open".into()),
            ..AlertDraft::default()
        };
        assert!(validate_alert_draft(&draft).is_ok());
    }

    #[test]
    fn rejects_blank_title_and_unknown_labels() {
        let blank = AlertDraft {
            title: "   ".into(),
            ..AlertDraft::default()
        };
        assert_eq!(validate_alert_draft(&blank), Err("title is required".into()));

        let bad_level = AlertDraft {
            title: "t".into(),
            risk_level: Some("High".into()),
            ..AlertDraft::default()
        };
        assert!(validate_alert_draft(&bad_level).is_err());

        let bad_status = AlertDraft {
            title: "t".into(),
            status: Some("pending".into()),
            ..AlertDraft::default()
        };
        assert!(validate_alert_draft(&bad_status).is_err());
    }

    #[test]
    fn draft_reads_partial_form_json() {
        let draft: AlertDraft = serde_json::from_value(serde_json::json!({
            "title": "Port scan",
            "risk_level": "low"
        }))
        .expect("deserialize");
        assert_eq!(draft.risk_level.as_deref(), Some("low"));
        assert_eq!(draft.status, None);
        assert!(validate_alert_draft(&draft).is_ok());
    }
}
