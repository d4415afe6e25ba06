use super::workspace_query;
use crate::error::{ClientError, Result};
use crate::http::ApiClient;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

/// A comment on an alert or incident. Only one attachment is sent.
#[derive(Clone, Debug, PartialEq)]
pub struct CommentRequest {
    pub event_id: String,
    pub comment: String,
    pub workspace: Option<String>,
    pub comment_type: Option<String>,
    pub attachment: Option<Attachment>,
}

impl CommentRequest {
    pub fn new(event_id: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            comment: comment.into(),
            workspace: None,
            comment_type: Some("comment".into()),
            attachment: None,
        }
    }

    pub fn json_body(&self) -> Value {
        let mut body = json!({"event_id": self.event_id, "comment": self.comment});
        if let Some(map) = body.as_object_mut() {
            if let Some(ws) = self.workspace.as_deref().filter(|w| !w.is_empty()) {
                map.insert("workspace".into(), json!(ws));
            }
            if let Some(kind) = self.comment_type.as_deref().filter(|k| !k.is_empty()) {
                map.insert("comment_type".into(), json!(kind));
            }
        }
        body
    }

    fn form(&self, attachment: &Attachment) -> Result<Form> {
        let mut form = Form::new()
            .text("event_id", self.event_id.clone())
            .text("comment", self.comment.clone());
        if let Some(ws) = self.workspace.clone().filter(|w| !w.is_empty()) {
            form = form.text("workspace", ws);
        }
        if let Some(kind) = self.comment_type.clone().filter(|k| !k.is_empty()) {
            form = form.text("comment_type", kind);
        }

        let mut part =
            Part::bytes(attachment.bytes.clone()).file_name(attachment.file_name.clone());
        if let Some(mime) = attachment.mime.as_deref() {
            part = part.mime_str(mime)?;
        }
        Ok(form.part("file", part))
    }
}

pub async fn post_comment(client: &ApiClient, request: &CommentRequest) -> Result<Value> {
    if request.event_id.trim().is_empty() {
        return Err(ClientError::InvalidRequest("event id is required".into()));
    }
    let query = workspace_query(request.workspace.as_deref());

    match &request.attachment {
        Some(attachment) => {
            let form = request.form(attachment)?;
            client.post_multipart("/comments", &query, form).await
        }
        None => {
            let body = request.json_body();
            client
                .send(
                    client
                        .request(reqwest::Method::POST, "/comments")
                        .query(&query)
                        .json(&body),
                )
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_body_includes_optional_fields_only_when_set() {
        let plain = CommentRequest {
            comment_type: None,
            ..CommentRequest::new("42", "looks benign")
        };
        assert_eq!(
            plain.json_body(),
            json!({"event_id": "42", "comment": "looks benign"})
        );

        let full = CommentRequest {
            workspace: Some("asm".into()),
            ..CommentRequest::new("42", "escalating")
        };
        assert_eq!(
            full.json_body(),
            json!({
                "event_id": "42",
                "comment": "escalating",
                "workspace": "asm",
                "comment_type": "comment"
            })
        );
    }

    #[test]
    fn bad_mime_is_rejected() {
        let request = CommentRequest::new("1", "x");
        let attachment = Attachment {
            file_name: "a.txt".into(),
            bytes: b"hi".to_vec(),
            mime: Some("not a mime".into()),
        };
        assert!(request.form(&attachment).is_err());
    }
}
