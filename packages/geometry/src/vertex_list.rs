//! Ordered list of boundary vertices.
//!
//! Points are kept in tap order, which is also the boundary's edge order.
//! Undo is a pop; nothing is deduplicated or reordered.

use farm_map_boundary_models::GeoPoint;

/// The in-progress boundary: tapped points in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexList {
    points: Vec<GeoPoint>,
}

impl VertexList {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Appends a vertex at the end of the boundary.
    pub fn append(&mut self, point: GeoPoint) {
        self.points.push(point);
    }

    /// Removes and returns the most recently appended vertex.
    ///
    /// Returns `None` (and does nothing) when the list is empty.
    pub fn remove_last(&mut self) -> Option<GeoPoint> {
        self.points.pop()
    }

    /// Removes every vertex.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no vertex has been captured yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The vertices in edge order.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.points
    }

    /// First vertex, where the ring implicitly closes.
    #[must_use]
    pub fn first(&self) -> Option<&GeoPoint> {
        self.points.first()
    }

    /// Most recent vertex.
    #[must_use]
    pub fn last(&self) -> Option<&GeoPoint> {
        self.points.last()
    }

    /// Iterates the vertices in edge order.
    pub fn iter(&self) -> std::slice::Iter<'_, GeoPoint> {
        self.points.iter()
    }
}

impl From<Vec<GeoPoint>> for VertexList {
    fn from(points: Vec<GeoPoint>) -> Self {
        Self { points }
    }
}

impl<'a> IntoIterator for &'a VertexList {
    type Item = &'a GeoPoint;
    type IntoIter = std::slice::Iter<'a, GeoPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
