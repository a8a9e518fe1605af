//! Area shown on the review step.
//!
//! The displayed value starts out derived from the boundary's square
//! meters. Switching units converts the displayed number directly through
//! the acre/hectare factor, so a value the operator typed in survives a
//! unit switch. Once typed in, the value is flagged as overridden and
//! stays authoritative until the boundary is measured again.

use farm_map_boundary_models::{AreaUnit, GeoPoint};
use farm_map_geometry::{area, units};
use serde::Serialize;

/// A typed-in area that is negative or not a number.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("Invalid area value {value}: must be a finite, non-negative number")]
pub struct InvalidAreaError {
    /// The rejected value.
    pub value: f64,
}

/// Area of the draft boundary in the unit currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaMeasurement {
    square_meters: f64,
    unit: AreaUnit,
    display_value: f64,
    overridden: bool,
}

impl AreaMeasurement {
    /// Measures a boundary and expresses it in `unit`.
    #[must_use]
    pub fn from_boundary(points: &[GeoPoint], unit: AreaUnit) -> Self {
        Self::from_square_meters(area::compute(points), unit)
    }

    #[must_use]
    pub fn from_square_meters(square_meters: f64, unit: AreaUnit) -> Self {
        Self {
            square_meters,
            unit,
            display_value: units::from_square_meters(square_meters, unit),
            overridden: false,
        }
    }

    /// Area computed from the boundary, ignoring any typed-in value.
    #[must_use]
    pub const fn square_meters(&self) -> f64 {
        self.square_meters
    }

    /// The area the draft stands for: the typed-in value when overridden,
    /// otherwise the computed one.
    #[must_use]
    pub fn effective_square_meters(&self) -> f64 {
        if self.overridden {
            units::to_square_meters(self.display_value, self.unit)
        } else {
            self.square_meters
        }
    }

    #[must_use]
    pub const fn unit(&self) -> AreaUnit {
        self.unit
    }

    /// The number shown to the operator, unrounded.
    #[must_use]
    pub const fn display_value(&self) -> f64 {
        self.display_value
    }

    /// Whether the operator typed the displayed value in.
    #[must_use]
    pub const fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// Switches the displayed unit, converting the shown number.
    pub fn change_unit(&mut self, unit: AreaUnit) {
        if unit == self.unit {
            return;
        }
        self.display_value = units::convert(self.display_value, self.unit, unit);
        self.unit = unit;
    }

    /// Replaces the displayed number with an operator-entered value.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAreaError`] if `value` is negative or not finite.
    pub fn edit(&mut self, value: f64) -> Result<(), InvalidAreaError> {
        if !value.is_finite() || value < 0.0 {
            return Err(InvalidAreaError { value });
        }
        self.display_value = value;
        self.overridden = true;
        Ok(())
    }

    /// The value sent to the farm store, rounded to 2 decimals.
    #[must_use]
    pub fn persisted_value(&self) -> f64 {
        units::persisted_value(self.display_value)
    }

    /// The value as shown, e.g. `"2.50 ac"`.
    #[must_use]
    pub fn display_text(&self) -> String {
        units::format_area(self.display_value, self.unit)
    }
}
