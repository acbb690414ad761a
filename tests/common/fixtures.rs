//! Submission and configuration fixtures

use chrono::{DateTime, FixedOffset, TimeZone};
use std::path::Path;
use std::time::Duration;

use price_survey::client::config::Config;
use price_survey::shared::{AppConfig, ProductLine, ProductName, SubmissionDraft};

/// A time in West Africa Time (UTC+1)
pub fn lagos_time(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
}

/// A valid draft for `outlet`, collected on 16 Oct 2026 at 09:00 WAT
pub fn sample_draft(outlet: &str) -> SubmissionDraft {
    SubmissionDraft::new(
        "Ngozi Eze",
        outlet,
        "Ikeja",
        vec![
            ProductLine::new(ProductName::Sbc40cl, 150.0, 200.0),
            ProductLine::new(ProductName::Bigi40cl, 90.0, 120.0),
        ],
    )
    .with_phone("08031234567")
    .with_collected_at(lagos_time(2026, 10, 16, 9))
}

/// camelCase JSON body of a valid submission
pub fn sample_body(outlet: &str) -> serde_json::Value {
    serde_json::to_value(sample_draft(outlet)).unwrap()
}

/// Agent configuration for tests: no settle delay, queue under `dir`
pub fn agent_config(server_url: &str, dir: &Path) -> Config {
    Config::with_builder(
        AppConfig::builder()
            .server_url(server_url)
            .max_retries(3)
            .settle_delay(Duration::from_millis(20))
            .queue_path(dir.join("queue.db")),
    )
    .unwrap()
}
