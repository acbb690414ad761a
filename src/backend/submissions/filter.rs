//! List Filters
//!
//! Query-string filters for `GET /api/submissions`. Date-only bounds compare
//! against the stored collection day; full timestamps compare against the
//! collection instant in UTC.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Deserialize;

use crate::backend::error::BackendError;

/// Most rows a single list call returns
pub const LIST_LIMIT: i64 = 1000;

/// Raw query string of the list endpoint
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub area: Option<String>,
    pub outlet_name: Option<String>,
    pub has_geo: Option<String>,
}

/// One end of a time range
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeBound {
    /// Calendar day, `YYYY-MM-DD`
    Day(String),
    /// Instant, stored-format UTC timestamp
    Instant(String),
}

impl TimeBound {
    fn parse(field: &str, raw: &str) -> Result<Self, BackendError> {
        let raw = raw.trim();
        if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Ok(TimeBound::Day(day.format("%Y-%m-%d").to_string()));
        }
        DateTime::parse_from_rfc3339(raw)
            .map(|t| TimeBound::Instant(utc_key(&t.with_timezone(&Utc))))
            .map_err(|_| {
                BackendError::bad_request(format!(
                    "Invalid '{}': expected YYYY-MM-DD or an RFC 3339 timestamp",
                    field
                ))
            })
    }
}

/// Sortable text form of an instant, as stored in `collected_at_utc`
pub fn utc_key(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Validated filters
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmissionFilter {
    pub from: Option<TimeBound>,
    pub to: Option<TimeBound>,
    pub area: Option<String>,
    pub outlet_name: Option<String>,
    pub has_geo: Option<bool>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<ListParams> for SubmissionFilter {
    type Error = BackendError;

    fn try_from(params: ListParams) -> Result<Self, Self::Error> {
        let from = non_empty(params.from)
            .map(|raw| TimeBound::parse("from", &raw))
            .transpose()?;
        let to = non_empty(params.to)
            .map(|raw| TimeBound::parse("to", &raw))
            .transpose()?;

        // Anything but true/false means no geo filter.
        let has_geo = match params.has_geo.as_deref() {
            Some("true") => Some(true),
            Some("false") => Some(false),
            _ => None,
        };

        Ok(Self {
            from,
            to,
            area: non_empty(params.area),
            outlet_name: non_empty(params.outlet_name),
            has_geo,
        })
    }
}
