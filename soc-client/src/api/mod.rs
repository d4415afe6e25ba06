//! Thin wrappers over the backend routes, one module per resource.

pub mod agent;
pub mod alerts;
pub mod auth;
pub mod comments;
pub mod incidents;
pub mod system;
pub mod toolkits;
pub mod vulnerabilities;

use serde_json::Value;

/// Partition tag for attack-surface-management records.
pub const ASM_WORKSPACE: &str = "asm";

pub(crate) fn workspace_query(workspace: Option<&str>) -> Vec<(&str, &str)> {
    workspace
        .filter(|w| !w.is_empty())
        .map(|w| vec![("workspace", w)])
        .unwrap_or_default()
}

/// Adds `workspace` to an object body when one is given.
pub(crate) fn with_workspace(mut body: Value, workspace: Option<&str>) -> Value {
    if let (Some(map), Some(ws)) = (body.as_object_mut(), workspace.filter(|w| !w.is_empty())) {
        map.insert("workspace".into(), Value::String(ws.to_string()));
    }
    body
}
