//! Client library for the SOC console backend: query building, record
//! normalization, transport, and the Security Agent chat stream.

pub mod api;
pub mod conditions;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod query;
pub mod stream;
pub mod time;
pub mod transform;

pub use conditions::{build_conditions, normalize_keywords, Condition, Keyword, QueryFilter};
pub use config::ClientConfig;
pub use context::ClientContext;
pub use error::ClientError;
pub use http::ApiClient;
pub use query::{Page, QueryRequest, RecordQuery, TimeRange};
pub use time::{calculate_ttr, format_date_time_with_offset, parse_to_date, TimeInput};
pub use transform::{transform_record, RecordPage, RecordView};
