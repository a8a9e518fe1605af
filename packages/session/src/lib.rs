#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Farm boundary capture session.
//!
//! A [`BoundarySession`] is the handle the map and review screens share
//! while an operator outlines a farm. It owns the tapped vertices, the
//! derived [`AreaMeasurement`], the chosen unit, and the farm name, and
//! walks through `Idle → Capturing → Reviewing → Persisting → Committed`.
//! Nothing is written to the farm store before an explicit save.

pub mod config;
pub mod measurement;
pub mod session;

pub use config::{ConfigError, SessionConfig};
pub use measurement::{AreaMeasurement, InvalidAreaError};
pub use session::{BoundarySession, FarmBoundaryDraft, SessionError, SessionState, reconcile};
