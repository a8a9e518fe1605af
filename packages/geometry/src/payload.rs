//! `GeoJSON` payloads for captured boundaries.
//!
//! The farm store receives the boundary as a `Feature` wrapping a single
//! `Polygon` ring of `[lon, lat]` positions. By default the ring is sent
//! open, exactly as captured (no repeated first position); stores that
//! validate against RFC 7946 can be fed a closed ring instead via
//! [`RingClosure::Closed`].

use farm_map_boundary_models::{GeoPoint, MapViewport};
use geo::{BoundingRect, LineString, MultiPoint, Point, Polygon, Rect};
use geojson::{Feature, Geometry, Value};
use serde::{Deserialize, Serialize};

/// Whether the persisted polygon ring repeats its first position at the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingClosure {
    /// Positions exactly as captured.
    #[default]
    Open,
    /// First position repeated as the last (RFC 7946 linear ring).
    Closed,
}

/// Builds the polygon `Feature` for a boundary.
///
/// Callers validate the vertex count first; this does not.
#[must_use]
pub fn polygon_feature(points: &[GeoPoint], closure: RingClosure) -> Feature {
    let value = match closure {
        RingClosure::Open => Value::Polygon(vec![
            points.iter().map(|p| p.to_lon_lat().to_vec()).collect(),
        ]),
        RingClosure::Closed => Value::from(&to_polygon(points)),
    };

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

/// Converts a boundary to a [`geo::Polygon`]. `geo` closes the exterior
/// ring.
#[must_use]
pub fn to_polygon(points: &[GeoPoint]) -> Polygon<f64> {
    let exterior: LineString<f64> = points
        .iter()
        .map(|p| (p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();
    Polygon::new(exterior, vec![])
}

/// Reads the exterior ring of a stored boundary back into points.
///
/// `closure` is how the ring was written. For [`RingClosure::Closed`] the
/// repeated first position is dropped; an open ring is read back as is,
/// including a last tap that landed on the first. Returns `None` for
/// anything that is not a `Polygon` with valid positions.
#[must_use]
pub fn ring_points(feature: &Feature, closure: RingClosure) -> Option<Vec<GeoPoint>> {
    let geometry = feature.geometry.as_ref()?;
    let Value::Polygon(rings) = &geometry.value else {
        log::debug!("Boundary feature is not a Polygon");
        return None;
    };
    let ring = rings.first()?;

    let mut points = ring
        .iter()
        .map(|position| match position.as_slice() {
            [lon, lat, ..] => GeoPoint::new(*lat, *lon).ok(),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    if closure == RingClosure::Closed && points.len() > 1 && points.first() == points.last() {
        points.pop();
    }

    Some(points)
}

/// Bounding rectangle of a boundary in lon/lat degrees.
#[must_use]
pub fn boundary_bounds(points: &[GeoPoint]) -> Option<Rect<f64>> {
    let multi: MultiPoint<f64> = points
        .iter()
        .map(|p| Point::new(p.longitude, p.latitude))
        .collect::<Vec<_>>()
        .into();
    multi.bounding_rect()
}

/// A viewport framing the whole boundary, or `fallback` when there are no
/// points.
#[must_use]
pub fn fit_viewport(points: &[GeoPoint], fallback: MapViewport) -> MapViewport {
    let Some(rect) = boundary_bounds(points) else {
        return fallback;
    };

    let center = rect.center();
    let span = rect.width().max(rect.height());
    let zoom = if span > 0.0 {
        ((360.0 / span).log2() - 1.0).clamp(2.0, MapViewport::FIELD_ZOOM + 2.0)
    } else {
        MapViewport::FIELD_ZOOM
    };

    MapViewport {
        center: GeoPoint {
            latitude: center.y,
            longitude: center.x,
        },
        zoom,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(latitude: f64, longitude: f64) -> GeoPoint {
        GeoPoint::new(latitude, longitude).unwrap()
    }

    fn pentagon() -> Vec<GeoPoint> {
        vec![
            point(-1.2921, 36.8219),
            point(-1.2915, 36.8230),
            point(-1.2905, 36.8228),
            point(-1.2902, 36.8215),
            point(-1.2912, 36.8210),
        ]
    }

    fn ring_of(feature: &Feature) -> Vec<Vec<f64>> {
        let json = serde_json::to_value(feature).unwrap();
        assert_eq!(json["type"], "Feature");
        assert_eq!(json["geometry"]["type"], "Polygon");
        serde_json::from_value(json["geometry"]["coordinates"][0].clone()).unwrap()
    }

    #[test]
    fn open_ring_has_exactly_the_captured_pairs() {
        let points = pentagon();
        let ring = ring_of(&polygon_feature(&points, RingClosure::Open));

        assert_eq!(ring.len(), 5);
        for (position, p) in ring.iter().zip(&points) {
            assert_eq!(position, &vec![p.longitude, p.latitude]);
        }
        assert_ne!(ring.first(), ring.last());
    }

    #[test]
    fn closed_ring_repeats_first_position() {
        let points = pentagon();
        let ring = ring_of(&polygon_feature(&points, RingClosure::Closed));

        assert_eq!(ring.len(), 6);
        assert_eq!(ring.first(), ring.last());
        assert_eq!(ring[0], vec![36.8219, -1.2921]);
    }

    #[test]
    fn ring_points_reads_back_either_closure() {
        let points = pentagon();
        for closure in [RingClosure::Open, RingClosure::Closed] {
            let feature = polygon_feature(&points, closure);
            assert_eq!(ring_points(&feature, closure), Some(points.clone()));
        }
    }

    #[test]
    fn open_ring_keeps_last_tap_on_first_vertex() {
        let mut points = pentagon();
        points.truncate(3);
        points.push(points[0]);

        let feature = polygon_feature(&points, RingClosure::Open);
        assert_eq!(ring_points(&feature, RingClosure::Open), Some(points));
    }

    #[test]
    fn ring_points_rejects_non_polygons() {
        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(vec![36.8, -1.29]))),
            id: None,
            properties: None,
            foreign_members: None,
        };
        assert_eq!(ring_points(&feature, RingClosure::Open), None);
    }

    #[test]
    fn fit_viewport_centers_on_bounds() {
        let viewport = fit_viewport(&pentagon(), MapViewport::default());

        assert!((viewport.center.latitude - (-1.29115)).abs() < 1e-9);
        assert!((viewport.center.longitude - 36.822).abs() < 1e-9);
        assert!(viewport.zoom > 10.0);
    }

    #[test]
    fn fit_viewport_falls_back_when_empty() {
        let fallback = MapViewport::default();
        assert_eq!(fit_viewport(&[], fallback), fallback);

        let single = fit_viewport(&[point(5.0, 5.0)], fallback);
        assert!((single.zoom - MapViewport::FIELD_ZOOM).abs() < f64::EPSILON);
    }
}
