#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Farm boundary and farm record types.
//!
//! These types describe a farm's captured boundary (a sequence of
//! [`GeoPoint`]s), the land-area units it can be expressed in, and the
//! records exchanged with the remote farm store. They carry no behavior
//! beyond validation and small conversions; area math lives in
//! `farm_map_geometry`.

use geojson::Feature;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    /// Latitude in degrees, `-90..=90`.
    pub latitude: f64,
    /// Longitude in degrees, `-180..=180`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCoordinateError`] if the latitude is outside
    /// `-90..=90` or the longitude is outside `-180..=180`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinateError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinateError::Latitude { value: latitude });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinateError::Longitude { value: longitude });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the point as a `[lon, lat]` position, the `GeoJSON` axis order.
    #[must_use]
    pub const fn to_lon_lat(self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// Error returned when a coordinate falls outside the WGS84 range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidCoordinateError {
    /// Latitude outside `-90..=90` (or not finite).
    Latitude {
        /// The rejected value.
        value: f64,
    },
    /// Longitude outside `-180..=180` (or not finite).
    Longitude {
        /// The rejected value.
        value: f64,
    },
}

impl std::fmt::Display for InvalidCoordinateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Latitude { value } => {
                write!(f, "invalid latitude {value}: expected -90 to 90")
            }
            Self::Longitude { value } => {
                write!(f, "invalid longitude {value}: expected -180 to 180")
            }
        }
    }
}

impl std::error::Error for InvalidCoordinateError {}

/// Land-area unit an area can be displayed and persisted in.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AreaUnit {
    /// International acre (4046.86 m²).
    #[default]
    Acre,
    /// Hectare (10 000 m²).
    Hectare,
}

impl AreaUnit {
    /// Returns the other unit; the review step's unit switch.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Acre => Self::Hectare,
            Self::Hectare => Self::Acre,
        }
    }

    /// Short display symbol (`"ac"` or `"ha"`).
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Acre => "ac",
            Self::Hectare => "ha",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Acre, Self::Hectare]
    }
}

/// Rounds an area value to two decimal places, half away from zero.
///
/// Persisted `areaValue`s always go through this.
#[must_use]
pub fn round_area(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// A farm as stored by the remote farm store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmRecord {
    /// Store-assigned identifier.
    pub id: String,
    /// Owner (operator account) identifier.
    pub owner_id: String,
    /// Farm name as entered by the operator.
    pub name: String,
    /// Area value in [`Self::unit`], rounded to 2 decimals.
    pub area_value: f64,
    /// Unit of [`Self::area_value`].
    pub unit: AreaUnit,
    /// Polygon `Feature` of the captured boundary. Immutable after creation.
    pub boundary: Feature,
}

impl FarmRecord {
    /// Merges a partial update into this record.
    ///
    /// Only name, area, and unit are mutable; the boundary is left as is.
    pub fn apply(&mut self, update: &FarmUpdate) {
        if let Some(name) = &update.name {
            self.name.clone_from(name);
        }
        if let Some(area_value) = update.area_value {
            self.area_value = area_value;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
    }
}

/// Create payload for a new farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFarm {
    /// Owner identifier.
    pub owner_id: String,
    /// Farm name.
    pub name: String,
    /// Area value, rounded to 2 decimals.
    pub area_value: f64,
    /// Unit of the area value.
    pub unit: AreaUnit,
    /// Polygon `Feature` of the captured boundary.
    pub boundary: Feature,
}

/// Partial update for an existing farm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FarmUpdate {
    /// New name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New area value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_value: Option<f64>,
    /// New unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<AreaUnit>,
}

impl FarmUpdate {
    /// Sets the new name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the new area value, rounded to 2 decimals.
    #[must_use]
    pub fn with_area(mut self, area_value: f64) -> Self {
        self.area_value = Some(round_area(area_value));
        self
    }

    /// Sets the new unit.
    #[must_use]
    pub const fn with_unit(mut self, unit: AreaUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Whether the update changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.area_value.is_none() && self.unit.is_none()
    }
}

/// What the map surface should show: a centre and a zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapViewport {
    /// Viewport centre.
    pub center: GeoPoint,
    /// Web-map zoom level.
    pub zoom: f64,
}

impl MapViewport {
    /// Zoom used when centring on a single known position (field scale).
    pub const FIELD_ZOOM: f64 = 16.0;

    /// A viewport centred on `center` at field zoom.
    #[must_use]
    pub const fn centered_on(center: GeoPoint) -> Self {
        Self {
            center,
            zoom: Self::FIELD_ZOOM,
        }
    }
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: GeoPoint {
                latitude: 0.0,
                longitude: 0.0,
            },
            zoom: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn geo_point_rejects_out_of_range() {
        assert!(GeoPoint::new(45.0, 90.0).is_ok());
        assert!(GeoPoint::new(90.0, -180.0).is_ok());
        assert_eq!(
            GeoPoint::new(91.0, 0.0),
            Err(InvalidCoordinateError::Latitude { value: 91.0 })
        );
        assert_eq!(
            GeoPoint::new(0.0, 180.5),
            Err(InvalidCoordinateError::Longitude { value: 180.5 })
        );
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn area_unit_string_forms() {
        for unit in AreaUnit::all() {
            let parsed = AreaUnit::from_str(unit.as_ref()).unwrap();
            assert_eq!(parsed, *unit);
            assert_eq!(parsed.toggled().toggled(), parsed);
        }
        assert_eq!(AreaUnit::Acre.to_string(), "acre");
        assert_eq!(
            serde_json::to_value(AreaUnit::Hectare).unwrap(),
            serde_json::json!("hectare")
        );
    }

    #[test]
    fn round_area_two_decimals() {
        assert!((round_area(1.234_9) - 1.23).abs() < 1e-12);
        assert!((round_area(1.005_1) - 1.01).abs() < 1e-12);
        assert!((round_area(0.0) - 0.0).abs() < 1e-12);
        assert!((round_area(2.5) - 2.5).abs() < 1e-12);
    }

    #[test]
    fn farm_update_skips_unset_fields() {
        let update = FarmUpdate::default().with_area(7.456_2);
        assert!(!update.is_empty());
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "areaValue": 7.46 })
        );
        assert!(FarmUpdate::default().is_empty());
    }

    #[test]
    fn apply_leaves_boundary_untouched() {
        let boundary = Feature {
            bbox: None,
            geometry: None,
            id: None,
            properties: None,
            foreign_members: None,
        };
        let mut record = FarmRecord {
            id: "farm-1".to_string(),
            owner_id: "owner-1".to_string(),
            name: "North Field".to_string(),
            area_value: 2.5,
            unit: AreaUnit::Acre,
            boundary: boundary.clone(),
        };

        record.apply(
            &FarmUpdate::default()
                .with_name("South Field")
                .with_unit(AreaUnit::Hectare),
        );

        assert_eq!(record.name, "South Field");
        assert_eq!(record.unit, AreaUnit::Hectare);
        assert!((record.area_value - 2.5).abs() < f64::EPSILON);
        assert_eq!(record.boundary, boundary);
    }
}
