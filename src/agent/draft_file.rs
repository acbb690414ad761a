//! Reading submission drafts from disk.

use anyhow::{Context, Result};
use chrono::Local;
use serde_json::Value;
use std::path::Path;

use price_survey::shared::SubmissionDraft;

/// Load a camelCase JSON draft; a missing `collectedAt` means now, local time
pub fn load(path: &Path) -> Result<SubmissionDraft> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid submission in {}", path.display()))
}

fn parse(text: &str) -> Result<SubmissionDraft> {
    let mut value: Value = serde_json::from_str(text)?;
    if let Some(object) = value.as_object_mut() {
        object
            .entry("collectedAt")
            .or_insert_with(|| Value::String(Local::now().fixed_offset().to_rfc3339()));
    }
    Ok(serde_json::from_value(value)?)
}
