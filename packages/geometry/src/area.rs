//! Spherical area estimate for a captured boundary.
//!
//! Sums `(lon_j - lon_i) * (2 + sin(lat_i) + sin(lat_j))` over every edge
//! of the ring (closing edge included) and scales by `R² / 2`. This is the
//! same closed-curve approximation common web-map tooling uses; it is not
//! an ellipsoidal geodesic area.
//!
//! Known limits: accuracy drops for very large polygons and near the
//! poles, and rings crossing the antimeridian are not unwrapped.

use farm_map_boundary_models::GeoPoint;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Estimates the area enclosed by `points`, in square meters.
///
/// The ring is closed implicitly (last point back to first). Fewer than
/// three points yield `0.0`. Winding order does not matter, and
/// consecutive duplicate points add nothing.
#[must_use]
pub fn compute(points: &[GeoPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let sum: f64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(a, b)| {
            let (lat_a, lon_a) = (a.latitude.to_radians(), a.longitude.to_radians());
            let (lat_b, lon_b) = (b.latitude.to_radians(), b.longitude.to_radians());
            (lon_b - lon_a) * (2.0 + lat_a.sin() + lat_b.sin())
        })
        .sum();

    sum.abs() * EARTH_RADIUS_METERS * EARTH_RADIUS_METERS / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).unwrap()
    }

    /// Degrees of arc spanning `meters` along a great circle.
    fn degrees_for(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_METERS).to_degrees()
    }

    fn field() -> Vec<GeoPoint> {
        vec![
            point(40.0, -90.0),
            point(40.0005, -89.999),
            point(40.0012, -89.9985),
            point(40.001, -90.0008),
            point(40.0004, -90.0006),
        ]
    }

    fn assert_relative_eq(a: f64, b: f64, tolerance: f64) {
        let scale = a.abs().max(b.abs()).max(f64::MIN_POSITIVE);
        assert!(
            (a - b).abs() / scale <= tolerance,
            "{a} and {b} differ by more than {tolerance} relative"
        );
    }

    #[test]
    fn fewer_than_three_points_is_zero() {
        assert!(compute(&[]).abs() < f64::EPSILON);
        assert!(compute(&[point(1.0, 1.0)]).abs() < f64::EPSILON);
        assert!(compute(&[point(1.0, 1.0), point(1.001, 1.002)]).abs() < f64::EPSILON);
    }

    #[test]
    fn equatorial_square_is_about_one_acre() {
        let d = degrees_for(63.6);
        let square = [point(0.0, 0.0), point(0.0, d), point(d, d), point(d, 0.0)];

        let area = compute(&square);

        assert!(
            (area - 4046.86).abs() / 4046.86 < 0.02,
            "expected ~4046.86 m², got {area}"
        );
    }

    /// Boundaries of different shapes, hemispheres, and vertex counts.
    fn shapes() -> Vec<Vec<GeoPoint>> {
        let d = degrees_for(63.6);
        let mut with_duplicates = field();
        with_duplicates.insert(1, with_duplicates[1]);
        with_duplicates.insert(4, with_duplicates[4]);

        vec![
            field(),
            vec![point(0.0, 0.0), point(0.0, d), point(d, d), point(d, 0.0)],
            vec![point(52.1, 5.1), point(52.1015, 5.1004), point(52.1003, 5.1021)],
            // L-shaped, concave at the fourth vertex.
            vec![
                point(-1.292, 36.821),
                point(-1.292, 36.823),
                point(-1.291, 36.823),
                point(-1.291, 36.822),
                point(-1.290, 36.822),
                point(-1.290, 36.821),
            ],
            vec![
                point(-33.8688, 151.2093),
                point(-33.8681, 151.2110),
                point(-33.8669, 151.2104),
                point(-33.8672, 151.2088),
            ],
            with_duplicates,
        ]
    }

    #[test]
    fn invariant_under_rotation() {
        for shape in shapes() {
            let base = compute(&shape);
            assert!(base > 0.0);
            let mut rotated = shape.clone();
            for _ in 0..rotated.len() {
                rotated.rotate_left(1);
                assert_relative_eq(compute(&rotated), base, 1e-6);
            }
        }
    }

    #[test]
    fn invariant_under_reversal() {
        for shape in shapes() {
            let mut reversed = shape.clone();
            reversed.reverse();
            assert_relative_eq(compute(&reversed), compute(&shape), 1e-6);
        }
    }

    #[test]
    fn consecutive_duplicates_add_nothing() {
        let mut doubled = field();
        doubled.insert(2, doubled[2]);
        doubled.push(doubled[doubled.len() - 1]);
        assert_relative_eq(compute(&doubled), compute(&field()), 1e-9);
    }

    #[test]
    fn explicit_closing_point_changes_nothing() {
        let mut closed = field();
        closed.push(closed[0]);
        assert_relative_eq(compute(&closed), compute(&field()), 1e-9);
    }

    #[test]
    fn collinear_points_have_no_area() {
        let line = [point(10.0, 10.0), point(10.0, 10.001), point(10.0, 10.002)];
        assert!(compute(&line) < 1e-6);
    }

    /// A symmetric bow-tie's two lobes wind in opposite directions and
    /// cancel out, so the estimate is ~0 even though the operator traced
    /// two squares' worth of land. Self-intersection is not detected.
    #[test]
    fn self_intersecting_bowtie_cancels_out() {
        let d = degrees_for(63.6);
        let bowtie = [point(0.0, 0.0), point(d, d), point(0.0, d), point(d, 0.0)];
        assert!(compute(&bowtie) < 1e-3);
    }
}
