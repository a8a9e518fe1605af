//! Gate for leaving the capture step and for saving.

use farm_map_boundary_models::GeoPoint;

/// Smallest vertex count that encloses an area.
pub const MIN_VERTICES: usize = 3;

/// A boundary or draft that cannot move forward yet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Not enough points to enclose an area.
    #[error("A farm boundary needs at least {required} points, got {actual}")]
    TooFewVertices {
        /// Minimum number of points.
        required: usize,
        /// Points captured so far.
        actual: usize,
    },

    /// The farm name is empty or whitespace.
    #[error("Farm name must not be blank")]
    BlankName,
}

/// Checks a boundary before the capture → review transition and on save.
///
/// Only the vertex count is checked. Self-intersecting rings pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryValidator {
    min_vertices: usize,
}

impl BoundaryValidator {
    /// Creates a validator requiring `min_vertices` points, never fewer
    /// than [`MIN_VERTICES`].
    #[must_use]
    pub fn new(min_vertices: usize) -> Self {
        Self {
            min_vertices: min_vertices.max(MIN_VERTICES),
        }
    }

    /// The effective minimum.
    #[must_use]
    pub const fn min_vertices(&self) -> usize {
        self.min_vertices
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::TooFewVertices`] if `points` is shorter
    /// than the minimum.
    pub const fn check(&self, points: &[GeoPoint]) -> Result<(), ValidationError> {
        if points.len() < self.min_vertices {
            return Err(ValidationError::TooFewVertices {
                required: self.min_vertices,
                actual: points.len(),
            });
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::BlankName`] if `name` is empty after
    /// trimming.
    pub fn check_name(name: &str) -> Result<(), ValidationError> {
        if name.trim().is_empty() {
            return Err(ValidationError::BlankName);
        }
        Ok(())
    }
}

impl Default for BoundaryValidator {
    fn default() -> Self {
        Self::new(MIN_VERTICES)
    }
}
