use crate::conditions::{build_conditions, Condition, QueryFilter};
use crate::time::{format_with_offset_in, TimeInput};
use chrono::{Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 1-based page selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u32,
    pub page_size: u32,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
        }
    }
}

impl Page {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    pub fn limit(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u32 {
        (self.page.max(1) - 1).saturating_mul(self.page_size)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimeRange {
    pub start: TimeInput,
    pub end: TimeInput,
}

impl TimeRange {
    pub fn new(start: impl Into<TimeInput>, end: impl Into<TimeInput>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }
}

/// Body of a `list` call against `/alerts` or `/incidents`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub action: String,
    pub limit: u32,
    pub offset: u32,
    pub conditions: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<String>,
}

/// What a list view asks for, before it is turned into a request body.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordQuery {
    pub filter: QueryFilter,
    pub page: Page,
    pub range: Option<TimeRange>,
    pub risk_mode: Option<String>,
    pub workspace: Option<String>,
}

impl RecordQuery {
    pub fn to_request(&self) -> QueryRequest {
        self.to_request_in(&Local)
    }

    /// Time bounds are rendered in `zone` and only sent when both parse.
    pub fn to_request_in<Tz>(&self, zone: &Tz) -> QueryRequest
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let bounds = self.range.as_ref().and_then(|range| {
            let start = format_with_offset_in(range.start.clone(), zone)?;
            let end = format_with_offset_in(range.end.clone(), zone)?;
            Some((start, end))
        });
        let (start_time, end_time) = bounds.unzip();

        QueryRequest {
            action: "list".into(),
            limit: self.page.limit(),
            offset: self.page.offset(),
            conditions: build_conditions(&self.filter),
            start_time,
            end_time,
            risk_mode: self.risk_mode.clone().filter(|m| !m.is_empty()),
            workspace: self.workspace.clone().filter(|w| !w.is_empty()),
        }
    }
}
