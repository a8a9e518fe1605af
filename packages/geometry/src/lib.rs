#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geometry for farm boundary capture.
//!
//! * [`vertex_list`]: the ordered, stack-like list of tapped points.
//! * [`area`]: closed-curve spherical area estimate in square meters.
//! * [`units`]: acre/hectare conversion.
//! * [`validate`]: the minimum-vertex gate and name check.
//! * [`payload`]: `GeoJSON` polygon payloads and viewport framing.
//!
//! Everything here is pure and synchronous. None of the functions fail on
//! an undersized boundary: area comes back as zero and the validator is
//! what rejects it.

pub mod area;
pub mod payload;
pub mod units;
pub mod validate;
pub mod vertex_list;

pub use payload::RingClosure;
pub use validate::{BoundaryValidator, ValidationError};
pub use vertex_list::VertexList;
