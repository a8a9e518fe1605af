#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Persistence and lookup collaborators for farm boundary capture.
//!
//! The capture flow only ever talks to the outside world through the
//! traits defined here:
//!
//! 1. [`PersistenceGateway`]: create/update/delete/list farm records.
//!    [`rest::RestGateway`] talks JSON over HTTP; [`memory::InMemoryGateway`]
//!    keeps records in process.
//! 2. [`services::LocationService`]: the device's current position.
//! 3. [`services::AddressSearch`]: free-text address lookup, with
//!    [`nominatim::NominatimSearch`] as the `OpenStreetMap` implementation.
//!
//! No retry policy lives here. A failed call is reported once and the
//! caller decides what to do.

pub mod config;
pub mod memory;
pub mod nominatim;
pub mod rest;
pub mod services;

use async_trait::async_trait;
use farm_map_boundary_models::{FarmRecord, FarmUpdate, NewFarm};
use thiserror::Error;

pub use config::GatewayConfig;

/// Errors from farm store operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("Farm store returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No farm with this ID.
    #[error("Farm {id} not found")]
    NotFound {
        /// The requested farm ID.
        id: String,
    },

    /// The store cannot be reached right now.
    #[error("Farm store unavailable: {message}")]
    Unavailable {
        /// Description of the outage.
        message: String,
    },

    /// Gateway configuration is missing or malformed.
    #[error("Invalid gateway configuration: {message}")]
    InvalidConfig {
        /// Description of the problem.
        message: String,
    },
}

/// Remote storage for farm records.
///
/// Boundaries are immutable once created; [`Self::update`] only touches
/// name, area, and unit. Concurrent writers are not reconciled: the last
/// write wins.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Stores a new farm and returns it with its assigned ID.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the store rejects or cannot be reached.
    async fn create(&self, farm: &NewFarm) -> Result<FarmRecord, GatewayError>;

    /// Applies a partial update and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown ID, or another
    /// [`GatewayError`] on failure.
    async fn update(&self, id: &str, update: &FarmUpdate) -> Result<FarmRecord, GatewayError>;

    /// Deletes a farm.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown ID, or another
    /// [`GatewayError`] on failure.
    async fn delete(&self, id: &str) -> Result<(), GatewayError>;

    /// Lists every farm belonging to `owner_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] if the store cannot be reached.
    async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<FarmRecord>, GatewayError>;

    /// Fetches one farm.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::NotFound`] for an unknown ID, or another
    /// [`GatewayError`] on failure.
    async fn get_by_id(&self, id: &str) -> Result<FarmRecord, GatewayError>;
}
