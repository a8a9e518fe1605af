//! Nominatim / `OpenStreetMap` address search.
//!
//! The public instance allows at most **1 request per second**; a search
//! box fires one request per submitted query, which stays well within that.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use async_trait::async_trait;
use farm_map_boundary_models::GeoPoint;

use crate::services::{AddressSearch, SearchError};

/// Public Nominatim search endpoint.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

/// [`AddressSearch`] backed by a Nominatim free-form query.
#[derive(Debug, Clone)]
pub struct NominatimSearch {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimSearch {
    /// Creates a search client against `base_url`.
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl AddressSearch for NominatimSearch {
    async fn search_address(&self, text: &str) -> Result<Option<GeoPoint>, SearchError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("q", text), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SearchError::RateLimited);
        }

        let body: serde_json::Value = resp.json().await?;
        let result = parse_response(&body)?;
        if result.is_none() {
            log::debug!("No Nominatim match for {text:?}");
        }
        Ok(result)
    }
}

/// Parses a Nominatim `jsonv2` response into the first match.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeoPoint>, SearchError> {
    let results = body.as_array().ok_or_else(|| SearchError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| SearchError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| SearchError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    GeoPoint::new(lat, lon)
        .map(Some)
        .map_err(|e| SearchError::Parse {
            message: e.to_string(),
        })
}
