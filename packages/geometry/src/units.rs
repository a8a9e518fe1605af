//! Acre and hectare conversions.
//!
//! Hectares are always derived through the acre factor so that a value
//! toggled acre → hectare → acre comes back unchanged, and a value
//! computed from square meters agrees with one toggled from acres.

use farm_map_boundary_models::{AreaUnit, round_area};

/// Square meters in one acre.
pub const SQUARE_METERS_PER_ACRE: f64 = 4046.86;

/// Hectares in one acre.
pub const HECTARES_PER_ACRE: f64 = 0.404_686;

#[must_use]
pub fn square_meters_to_acres(square_meters: f64) -> f64 {
    square_meters / SQUARE_METERS_PER_ACRE
}

#[must_use]
pub fn acres_to_hectares(acres: f64) -> f64 {
    acres * HECTARES_PER_ACRE
}

#[must_use]
pub fn hectares_to_acres(hectares: f64) -> f64 {
    hectares / HECTARES_PER_ACRE
}

/// Expresses a square-meter area in `unit`.
#[must_use]
pub fn from_square_meters(square_meters: f64, unit: AreaUnit) -> f64 {
    let acres = square_meters_to_acres(square_meters);
    match unit {
        AreaUnit::Acre => acres,
        AreaUnit::Hectare => acres_to_hectares(acres),
    }
}

/// Square meters covered by `value` in `unit`.
#[must_use]
pub fn to_square_meters(value: f64, unit: AreaUnit) -> f64 {
    let acres = match unit {
        AreaUnit::Acre => value,
        AreaUnit::Hectare => hectares_to_acres(value),
    };
    acres * SQUARE_METERS_PER_ACRE
}

/// Re-expresses `value` from one unit in another.
///
/// This converts the number itself; it never goes back to a boundary.
#[must_use]
pub fn convert(value: f64, from: AreaUnit, to: AreaUnit) -> f64 {
    match (from, to) {
        (AreaUnit::Acre, AreaUnit::Hectare) => acres_to_hectares(value),
        (AreaUnit::Hectare, AreaUnit::Acre) => hectares_to_acres(value),
        (AreaUnit::Acre, AreaUnit::Acre) | (AreaUnit::Hectare, AreaUnit::Hectare) => value,
    }
}

/// The value sent to the farm store: rounded to 2 decimals.
#[must_use]
pub fn persisted_value(value: f64) -> f64 {
    round_area(value)
}

/// Formats an area for display, e.g. `"2.50 ac"`.
#[must_use]
pub fn format_area(value: f64, unit: AreaUnit) -> String {
    format!("{value:.2} {}", unit.symbol())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_acre_of_square_meters() {
        assert!((square_meters_to_acres(4046.86) - 1.0).abs() < 1e-12);
        assert!((from_square_meters(4046.86, AreaUnit::Hectare) - 0.404_686).abs() < 1e-12);
        assert!((from_square_meters(10_000.0, AreaUnit::Hectare) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn to_square_meters_inverts_from_square_meters() {
        for unit in AreaUnit::all() {
            let value = from_square_meters(12_345.6, *unit);
            assert!((to_square_meters(value, *unit) - 12_345.6).abs() < 1e-6);
        }
    }

    #[test]
    fn hectare_acre_roundtrip_is_stable() {
        for x in [1e-6, 0.01, 1.0, 2.5, 17.333, 1234.5, 9.9e6] {
            let back = hectares_to_acres(acres_to_hectares(x));
            assert!((back - x).abs() / x < 1e-9, "{x} came back as {back}");
        }
    }

    #[test]
    fn toggling_acre_to_hectare_and_back() {
        let hectares = convert(2.50, AreaUnit::Acre, AreaUnit::Hectare);
        assert!((hectares - 1.01).abs() < 0.01, "got {hectares}");
        assert!((hectares - 2.50 * 0.404_686).abs() < 1e-12);

        let acres = convert(hectares, AreaUnit::Hectare, AreaUnit::Acre);
        assert!((acres - 2.50).abs() < 0.01, "got {acres}");
    }

    #[test]
    fn same_unit_is_identity() {
        assert!((convert(3.7, AreaUnit::Acre, AreaUnit::Acre) - 3.7).abs() < f64::EPSILON);
        assert!((convert(3.7, AreaUnit::Hectare, AreaUnit::Hectare) - 3.7).abs() < f64::EPSILON);
    }

    #[test]
    fn display_formatting() {
        assert_eq!(format_area(2.5, AreaUnit::Acre), "2.50 ac");
        assert_eq!(format_area(1.011_715, AreaUnit::Hectare), "1.01 ha");
        assert!((persisted_value(1.011_715) - 1.01).abs() < 1e-12);
    }
}
