//! Capture session settings.
//!
//! Every field has a default (see `config/session.toml`), so a host only
//! needs to write the keys it wants to change.

use std::path::Path;

use farm_map_boundary_models::{AreaUnit, MapViewport};
use farm_map_geometry::RingClosure;
use farm_map_geometry::validate::MIN_VERTICES;
use serde::{Deserialize, Serialize};

/// The shipped defaults, as TOML.
pub const DEFAULT_CONFIG: &str = include_str!("../config/session.toml");

/// Errors loading a [`SessionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading the config file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Settings for a [`crate::BoundarySession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Whether the persisted ring repeats its first position.
    pub ring_closure: RingClosure,
    /// Unit the review step starts in.
    pub default_unit: AreaUnit,
    /// Vertices required before review. Values below 3 are raised to 3.
    pub min_vertices: usize,
    /// Viewport used when no device position is available.
    pub default_viewport: MapViewport,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ring_closure: RingClosure::Open,
            default_unit: AreaUnit::Acre,
            min_vertices: MIN_VERTICES,
            default_viewport: MapViewport::default(),
        }
    }
}

impl SessionConfig {
    /// Parses settings from TOML; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] if the TOML is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::de::from_str(toml_str)?)
    }

    /// Reads settings from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        log::debug!("Loading session config from {}", path.display());
        Self::from_toml(&contents)
    }
}
