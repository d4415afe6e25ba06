//! Timestamp normalization.
//!
//! The backend mixes several timestamp shapes (ISO-8601 with and without an
//! offset, `YYYY-MM-DD HH:mm:ss` in UTC, epoch seconds or milliseconds) and
//! expects `YYYY-MM-DDTHH:mm:ss.fffZ±HHMM` back. The `Z` in that wire format
//! is a literal that sits next to the real local offset; it does not mean UTC.

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;
use soc_vocab::HandleStatus;
use std::fmt::Display;
use std::sync::LazyLock;

/// Epoch values above this are milliseconds, at or below it seconds.
pub const EPOCH_MILLIS_THRESHOLD: f64 = 1e10;

pub const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ%z";
const DISPLAY_DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";
const DISPLAY_DATE: &str = "%Y-%m-%d";
const DISPLAY_TIME: &str = "%H:%M:%S";

/// Rendered in place of a timestamp that is missing or unparseable.
pub const MISSING: &str = "-";

static REDUNDANT_UTC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Z\+00:?00$").expect("static regex"));
static ZONED_WIRE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Z([+-]\d{2}):?(\d{2})$").expect("static regex"));
static SPACE_SEPARATED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2})\s+(\d{2}:\d{2}:\d{2}(?:\.\d+)?)(?:\s+UTC)?$")
        .expect("static regex")
});
static HAS_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"T\d{2}:\d{2}:\d{2}").expect("static regex"));
static HAS_ZONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:Z|[+-]\d{2}:?\d{2})$").expect("static regex"));

/// Anything a caller may hand over as a point in time.
#[derive(Clone, Debug, PartialEq)]
pub enum TimeInput {
    Instant(DateTime<Utc>),
    Text(String),
    Epoch(f64),
    Missing,
}

impl TimeInput {
    /// Reads a JSON field: strings are text, numbers are epochs, anything
    /// else is missing.
    pub fn from_json(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(s)) => TimeInput::Text(s.clone()),
            Some(Value::Number(n)) => n
                .as_f64()
                .map(TimeInput::Epoch)
                .unwrap_or(TimeInput::Missing),
            _ => TimeInput::Missing,
        }
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for TimeInput {
    fn from(value: DateTime<Tz>) -> Self {
        TimeInput::Instant(value.with_timezone(&Utc))
    }
}

impl From<&str> for TimeInput {
    fn from(value: &str) -> Self {
        TimeInput::Text(value.to_string())
    }
}

impl From<String> for TimeInput {
    fn from(value: String) -> Self {
        TimeInput::Text(value)
    }
}

impl From<i64> for TimeInput {
    fn from(value: i64) -> Self {
        TimeInput::Epoch(value as f64)
    }
}

impl From<f64> for TimeInput {
    fn from(value: f64) -> Self {
        TimeInput::Epoch(value)
    }
}

impl<T: Into<TimeInput>> From<Option<T>> for TimeInput {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(TimeInput::Missing)
    }
}

/// Resolves any supported input to an instant. Never fails loudly:
/// unparseable input is logged and yields `None`.
pub fn parse_to_date(input: impl Into<TimeInput>) -> Option<DateTime<Utc>> {
    match input.into() {
        TimeInput::Instant(at) => Some(at),
        TimeInput::Epoch(value) => {
            let parsed = from_epoch(value);
            if parsed.is_none() {
                tracing::warn!(value, "epoch timestamp out of range");
            }
            parsed
        }
        TimeInput::Text(text) => {
            let trimmed = text.trim();
            if is_blank(trimmed) {
                return None;
            }
            let parsed = parse_native(&normalize_text(trimmed)).or_else(|| parse_native(trimmed));
            if parsed.is_none() {
                tracing::warn!(value = %text, "unparseable timestamp");
            }
            parsed
        }
        TimeInput::Missing => None,
    }
}

fn is_blank(text: &str) -> bool {
    text.is_empty() || text == "null" || text == "undefined"
}

fn from_epoch(value: f64) -> Option<DateTime<Utc>> {
    if !value.is_finite() {
        return None;
    }
    let millis = if value > EPOCH_MILLIS_THRESHOLD {
        value
    } else {
        value * 1000.0
    };
    DateTime::from_timestamp_millis(millis.trunc() as i64)
}

fn normalize_text(text: &str) -> String {
    let text = REDUNDANT_UTC.replace(text, "Z");
    let text = ZONED_WIRE.replace(&text, "${1}:${2}");

    if let Some(caps) = SPACE_SEPARATED.captures(&text) {
        return format!("{}T{}Z", &caps[1], &caps[2]);
    }
    if HAS_TIME.is_match(&text) && !HAS_ZONE.is_match(&text) {
        return format!("{text}Z");
    }
    text.into_owned()
}

fn parse_native(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(at) = DateTime::<FixedOffset>::parse_from_str(text, format) {
            return Some(at.with_timezone(&Utc));
        }
    }
    // Zoneless date-times, with or without seconds, are UTC.
    let naive = text.strip_suffix('Z').unwrap_or(text);
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(at) = NaiveDateTime::parse_from_str(naive, format) {
            return Some(Utc.from_utc_datetime(&at));
        }
    }
    // Bare dates are midnight UTC.
    if let Ok(date) = NaiveDate::parse_from_str(text, DISPLAY_DATE) {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| Utc.from_utc_datetime(&midnight));
    }
    DateTime::parse_from_rfc2822(text)
        .ok()
        .map(|at| at.with_timezone(&Utc))
}

/// Renders in the host's local zone using the backend wire format.
pub fn format_date_time_with_offset(input: impl Into<TimeInput>) -> Option<String> {
    format_with_offset_in(input, &Local)
}

pub fn format_with_offset_in<Tz>(input: impl Into<TimeInput>, zone: &Tz) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    parse_to_date(input).map(|at| at.with_timezone(zone).format(WIRE_FORMAT).to_string())
}

pub fn format_date_time(input: impl Into<TimeInput>) -> String {
    format_date_time_in(input, &Local)
}

pub fn format_date_time_in<Tz>(input: impl Into<TimeInput>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    display_in(input, zone, DISPLAY_DATE_TIME)
}

pub fn format_date(input: impl Into<TimeInput>) -> String {
    format_date_in(input, &Local)
}

pub fn format_date_in<Tz>(input: impl Into<TimeInput>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    display_in(input, zone, DISPLAY_DATE)
}

pub fn format_time(input: impl Into<TimeInput>) -> String {
    format_time_in(input, &Local)
}

pub fn format_time_in<Tz>(input: impl Into<TimeInput>, zone: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    display_in(input, zone, DISPLAY_TIME)
}

fn display_in<Tz>(input: impl Into<TimeInput>, zone: &Tz, pattern: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    parse_to_date(input)
        .map(|at| at.with_timezone(zone).format(pattern).to_string())
        .unwrap_or_else(|| MISSING.to_string())
}

/// Time to resolve, measured against the current clock.
pub fn calculate_ttr(
    create_time: impl Into<TimeInput>,
    close_time: impl Into<TimeInput>,
    status: Option<&str>,
) -> String {
    calculate_ttr_at(create_time, close_time, status, Utc::now())
}

/// Closed records measure creation to close; everything else (including a
/// closed record without a usable close time) measures creation to `now`.
pub fn calculate_ttr_at(
    create_time: impl Into<TimeInput>,
    close_time: impl Into<TimeInput>,
    status: Option<&str>,
    now: DateTime<Utc>,
) -> String {
    let Some(created) = parse_to_date(create_time) else {
        return MISSING.to_string();
    };

    let closed = status.is_some_and(HandleStatus::is_closed_label);
    let end = if closed {
        parse_to_date(close_time).unwrap_or(now)
    } else {
        now
    };

    format_duration((end - created).num_seconds())
}

/// `1d 2h 5m`-style rendering. Zero units are left out and seconds appear
/// only when nothing larger does.
pub fn format_duration(total_seconds: i64) -> String {
    if total_seconds <= 0 {
        return "0s".into();
    }

    let days = total_seconds / 86_400;
    let hours = total_seconds % 86_400 / 3_600;
    let minutes = total_seconds % 3_600 / 60;
    let seconds = total_seconds % 60;

    let mut parts = Vec::new();
    for (amount, unit) in [(days, "d"), (hours, "h"), (minutes, "m")] {
        if amount > 0 {
            parts.push(format!("{amount}{unit}"));
        }
    }
    if parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}
