//! Location and address-search collaborators.
//!
//! Both only ever move the map viewport. Neither adds a boundary vertex.

use async_trait::async_trait;
use farm_map_boundary_models::GeoPoint;
use thiserror::Error;

/// Why the device position could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    /// The operator did not grant location access.
    #[error("Location permission denied")]
    PermissionDenied,

    /// No fix could be obtained.
    #[error("Location unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// Why an address search failed (as opposed to finding nothing).
#[derive(Debug, Error)]
pub enum SearchError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

/// Source of the device's current position.
#[async_trait]
pub trait LocationService: Send + Sync {
    /// Returns the current position.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError`] if no position is available.
    async fn current_position(&self) -> Result<GeoPoint, LocationError>;
}

/// Free-text address lookup.
#[async_trait]
pub trait AddressSearch: Send + Sync {
    /// Resolves `text` to a position, or `None` if nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError`] if the lookup itself failed.
    async fn search_address(&self, text: &str) -> Result<Option<GeoPoint>, SearchError>;
}

/// A [`LocationService`] that always reports the same answer.
///
/// For hosts that already know the position (last-known fix, manual
/// entry) and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLocation(pub Result<GeoPoint, LocationError>);

#[async_trait]
impl LocationService for FixedLocation {
    async fn current_position(&self) -> Result<GeoPoint, LocationError> {
        self.0.clone()
    }
}
