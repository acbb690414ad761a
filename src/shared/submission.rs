//! Submission Data Structures
//!
//! The payload a field agent authors for one outlet visit, plus the rules
//! that decide whether it is acceptable. These types travel unchanged
//! between the agent, the local queue and the server.
//!
//! # Wire Format
//!
//! All types serialize with camelCase field names:
//!
//! ```json
//! {
//!   "customerName": "Ada",
//!   "outletName": "Mama Put",
//!   "area": "Ikeja",
//!   "items": [{ "productName": "SBC 40cl", "buyPrice": 150, "sellPrice": 200 }],
//!   "geo": { "lat": 6.6, "lng": 3.35, "accuracy": 12.0 },
//!   "collectedAt": "2026-10-16T09:30:00+01:00"
//! }
//! ```

use chrono::{DateTime, FixedOffset, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::shared::error::{SharedError, ValidationIssue};

/// Minimum length for names and areas (after trimming)
const MIN_NAME_LEN: usize = 2;

/// Products covered by the survey
///
/// The set is closed; anything else is rejected at deserialization time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductName {
    #[serde(rename = "SBC 40cl")]
    Sbc40cl,
    #[serde(rename = "NBC 40cl")]
    Nbc40cl,
    #[serde(rename = "RC Cola 40cl")]
    RcCola40cl,
    #[serde(rename = "Pop Cola 40cl")]
    PopCola40cl,
    #[serde(rename = "Bigi 40cl")]
    Bigi40cl,
}

impl ProductName {
    /// Every product, in catalogue order
    pub const ALL: [ProductName; 5] = [
        ProductName::Sbc40cl,
        ProductName::Nbc40cl,
        ProductName::RcCola40cl,
        ProductName::PopCola40cl,
        ProductName::Bigi40cl,
    ];

    /// Display name, identical to the wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductName::Sbc40cl => "SBC 40cl",
            ProductName::Nbc40cl => "NBC 40cl",
            ProductName::RcCola40cl => "RC Cola 40cl",
            ProductName::PopCola40cl => "Pop Cola 40cl",
            ProductName::Bigi40cl => "Bigi 40cl",
        }
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One priced product at an outlet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductLine {
    pub product_name: ProductName,
    pub buy_price: f64,
    pub sell_price: f64,
}

impl ProductLine {
    pub fn new(product_name: ProductName, buy_price: f64, sell_price: f64) -> Self {
        Self {
            product_name,
            buy_price,
            sell_price,
        }
    }
}

/// A geolocation fix captured on the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoFix {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub accuracy: Option<f64>,
}

/// The user-authored survey payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDraft {
    pub customer_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub outlet_name: String,
    pub area: String,
    pub items: Vec<ProductLine>,
    #[serde(default)]
    pub geo: Option<GeoFix>,
    /// Collection time, carrying the agent's local UTC offset
    pub collected_at: DateTime<FixedOffset>,
}

impl SubmissionDraft {
    /// Create a draft collected now, in the device's local timezone
    pub fn new(
        customer_name: impl Into<String>,
        outlet_name: impl Into<String>,
        area: impl Into<String>,
        items: Vec<ProductLine>,
    ) -> Self {
        Self {
            customer_name: customer_name.into(),
            customer_phone: None,
            outlet_name: outlet_name.into(),
            area: area.into(),
            items,
            geo: None,
            collected_at: Local::now().fixed_offset(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.customer_phone = Some(phone.into());
        self
    }

    pub fn with_geo(mut self, geo: GeoFix) -> Self {
        self.geo = Some(geo);
        self
    }

    pub fn with_collected_at(mut self, collected_at: DateTime<FixedOffset>) -> Self {
        self.collected_at = collected_at;
        self
    }

    /// Calendar day of collection (`YYYY-MM-DD`) in the offset the draft was
    /// collected in. This is the key the server deduplicates on together
    /// with the outlet name.
    pub fn collection_day(&self) -> String {
        self.collected_at.date_naive().format("%Y-%m-%d").to_string()
    }

    /// Trim free-text fields and fold an empty phone number into `None`.
    pub fn normalized(mut self) -> Self {
        self.customer_name = self.customer_name.trim().to_string();
        self.outlet_name = self.outlet_name.trim().to_string();
        self.area = self.area.trim().to_string();
        self.customer_phone = self
            .customer_phone
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        self
    }

    /// Check every field, collecting all problems rather than stopping at the first.
    pub fn validate(&self) -> Result<(), SharedError> {
        let mut issues = Vec::new();

        check_min_len(&mut issues, "customerName", "Customer name", &self.customer_name);
        check_min_len(&mut issues, "outletName", "Outlet name", &self.outlet_name);
        check_min_len(&mut issues, "area", "Area", &self.area);

        if let Some(phone) = self.customer_phone.as_deref() {
            let phone = phone.trim();
            if !phone.is_empty() && !is_valid_phone(phone) {
                issues.push(ValidationIssue::new("customerPhone", "Invalid phone number"));
            }
        }

        if self.items.is_empty() {
            issues.push(ValidationIssue::new(
                "items",
                "At least one product must be selected",
            ));
        }
        for (i, item) in self.items.iter().enumerate() {
            if !(item.buy_price.is_finite() && item.buy_price > 0.0) {
                issues.push(ValidationIssue::new(
                    format!("items.{}.buyPrice", i),
                    "Buy price must be greater than 0",
                ));
            }
            if !(item.sell_price.is_finite() && item.sell_price > 0.0) {
                issues.push(ValidationIssue::new(
                    format!("items.{}.sellPrice", i),
                    "Sell price must be greater than 0",
                ));
            }
        }

        if let Some(geo) = &self.geo {
            if !(-90.0..=90.0).contains(&geo.lat) {
                issues.push(ValidationIssue::new("geo.lat", "Latitude out of range"));
            }
            if !(-180.0..=180.0).contains(&geo.lng) {
                issues.push(ValidationIssue::new("geo.lng", "Longitude out of range"));
            }
            if let Some(accuracy) = geo.accuracy {
                if !(accuracy.is_finite() && accuracy >= 0.0) {
                    issues.push(ValidationIssue::new(
                        "geo.accuracy",
                        "Accuracy must be a non-negative number",
                    ));
                }
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(SharedError::invalid(issues))
        }
    }
}

fn check_min_len(issues: &mut Vec<ValidationIssue>, field: &str, label: &str, value: &str) {
    if value.trim().chars().count() < MIN_NAME_LEN {
        issues.push(ValidationIssue::new(
            field,
            format!("{} must be at least {} characters", label, MIN_NAME_LEN),
        ));
    }
}

/// Local mobile format: a leading zero followed by ten digits, e.g. `07034528756`.
fn is_valid_phone(phone: &str) -> bool {
    phone.len() == 11 && phone.starts_with('0') && phone.chars().all(|c| c.is_ascii_digit())
}
