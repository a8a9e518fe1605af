//! Farm store endpoint configuration.
//!
//! Defaults come from the embedded `config/gateway.toml`. Environment
//! variables override them:
//!
//! | Variable | Description |
//! |---|---|
//! | `FARM_MAP_API_URL` | Base URL of the farm store API |
//! | `FARM_MAP_API_TOKEN` | Bearer token sent with every request |
//! | `FARM_MAP_API_TIMEOUT_SECS` | Per-request timeout in seconds |

use std::time::Duration;

use serde::Deserialize;

use crate::GatewayError;

const DEFAULT_CONFIG: &str = include_str!("../config/gateway.toml");

/// Where the farm store lives and how to call it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayConfig {
    /// Base URL, e.g. `"https://api.example.com/v1"`. `/farms` is appended.
    pub base_url: String,
    /// Bearer token, if the store requires one.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_timeout_secs() -> u64 {
    30
}

impl GatewayConfig {
    /// Parses a TOML configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the TOML is malformed or
    /// the base URL is not an `http(s)` URL.
    pub fn from_toml(toml_str: &str) -> Result<Self, GatewayError> {
        let config: Self =
            toml::de::from_str(toml_str).map_err(|e| GatewayError::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads the embedded defaults and applies environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfig`] if the resulting
    /// configuration is invalid.
    pub fn from_env() -> Result<Self, GatewayError> {
        let config = Self::from_toml(DEFAULT_CONFIG)?.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Applies `FARM_MAP_API_*` overrides looked up through `lookup`.
    ///
    /// Unparseable timeouts are ignored with a warning.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FARM_MAP_API_URL") {
            self.base_url = url;
        }
        if let Some(token) = lookup("FARM_MAP_API_TOKEN") {
            self.auth_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(raw) = lookup("FARM_MAP_API_TIMEOUT_SECS") {
            match raw.parse() {
                Ok(secs) => self.timeout_secs = secs,
                Err(e) => log::warn!("Ignoring FARM_MAP_API_TIMEOUT_SECS={raw:?}: {e}"),
            }
        }
        self
    }

    /// Per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validate(&self) -> Result<(), GatewayError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(GatewayError::InvalidConfig {
                message: format!("base_url must be an http(s) URL, got {:?}", self.base_url),
            });
        }
        if self.timeout_secs == 0 {
            return Err(GatewayError::InvalidConfig {
                message: "timeout_secs must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}
