//! Geolocation Capability
//!
//! Location fixes come from the host platform. The offline layer only needs
//! a single-shot request that yields a fix or a tagged reason, so platform
//! backends implement [`LocationProvider`] and callers await it like any
//! other async call.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::shared::GeoFix;

/// Why no fix could be obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Location access denied by user")]
    PermissionDenied,
    #[error("Location information unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Geolocation is not supported")]
    Unsupported,
}

/// Source of location fixes
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<GeoFix, GeoError>;
}

/// Always answers with the same fix (manual entry, tests)
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub GeoFix);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<GeoFix, GeoError> {
        Ok(self.0)
    }
}

/// Platform without a location service
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocation;

#[async_trait]
impl LocationProvider for NoLocation {
    async fn current_position(&self) -> Result<GeoFix, GeoError> {
        Err(GeoError::Unsupported)
    }
}

/// Request one fix, giving up after `timeout`
pub async fn acquire_position(
    provider: &dyn LocationProvider,
    timeout: Duration,
) -> Result<GeoFix, GeoError> {
    match tokio::time::timeout(timeout, provider.current_position()).await {
        Ok(result) => result,
        Err(_) => Err(GeoError::Timeout),
    }
}
