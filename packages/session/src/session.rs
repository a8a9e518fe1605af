//! The capture → review → save state machine.
//!
//! ```text
//! Idle ──begin_capture──▶ Capturing ──proceed──▶ Reviewing ──begin_save──▶ Persisting
//!                          ▲  add_vertex/undo      │  edit_name/edit_area/    │
//!                          └────back_to_capture────┘  change_unit             │
//!                                                  ▲                          │
//!                                                  └──── failure ─────────────┤
//!                                                                success ─────▶ Committed
//! ```
//!
//! `cancel` from `Idle`, `Capturing` or `Reviewing` discards the draft.
//! Only one save can be in flight: `begin_save` while `Persisting` fails
//! with [`SessionError::SaveInFlight`].
//!
//! If the host drops a session mid-save, the request may still land on
//! the store. Keep the [`NewFarm`] from `begin_save` and pass it to
//! [`reconcile`] on the next entry to look for it.

use farm_map_boundary_models::{
    AreaUnit, FarmRecord, GeoPoint, InvalidCoordinateError, MapViewport, NewFarm,
};
use farm_map_gateway::services::{AddressSearch, LocationService, SearchError};
use farm_map_gateway::{GatewayError, PersistenceGateway};
use farm_map_geometry::payload::{fit_viewport, polygon_feature};
use farm_map_geometry::{BoundaryValidator, ValidationError, VertexList, area};
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::measurement::{AreaMeasurement, InvalidAreaError};

/// Where a [`BoundarySession`] is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SessionState {
    /// Created, nothing captured yet.
    Idle,
    /// Map taps add vertices.
    Capturing,
    /// Boundary measured; name, area, and unit are editable.
    Reviewing,
    /// A save request is in flight.
    Persisting,
    /// Saved. The session is finished.
    Committed,
    /// Discarded by the operator. The session is finished.
    Cancelled,
}

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation is not allowed in the current state.
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        /// What was attempted.
        action: &'static str,
        /// State at the time.
        state: SessionState,
    },

    /// Too few vertices, or a blank name.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A tapped coordinate is outside the WGS84 range.
    #[error(transparent)]
    Coordinate(#[from] InvalidCoordinateError),

    /// A typed-in area is negative or not a number.
    #[error(transparent)]
    InvalidArea(#[from] InvalidAreaError),

    /// A save is already in flight.
    #[error("A save is already in progress")]
    SaveInFlight,

    /// The farm store rejected the save. The session is back in review
    /// with the boundary unchanged; see [`BoundarySession::last_error`].
    #[error("Failed to save farm boundary: {message}")]
    SaveFailed {
        /// The gateway error, rendered.
        message: String,
    },

    /// Address search found nothing.
    #[error("No match for address {query:?}")]
    AddressNotFound {
        /// The search text.
        query: String,
    },

    /// Address search failed.
    #[error("Address search failed: {0}")]
    Search(#[from] SearchError),
}

/// The farm being outlined, owned by its session until saved or discarded.
#[derive(Debug, Clone, PartialEq)]
pub struct FarmBoundaryDraft {
    /// Owner the farm will be saved under.
    pub owner_ref: String,
    /// Farm name as entered on the review step.
    pub name: String,
    /// Captured vertices.
    pub vertices: VertexList,
    /// Measurement, present from the review step on.
    pub area: Option<AreaMeasurement>,
}

impl FarmBoundaryDraft {
    fn new(owner_ref: String) -> Self {
        Self {
            owner_ref,
            name: String::new(),
            vertices: VertexList::new(),
            area: None,
        }
    }

    fn discard(&mut self) {
        self.name.clear();
        self.vertices.clear();
        self.area = None;
    }
}

/// One boundary capture flow, passed by handle between the map and review
/// screens.
#[derive(Debug)]
pub struct BoundarySession {
    config: SessionConfig,
    validator: BoundaryValidator,
    state: SessionState,
    draft: FarmBoundaryDraft,
    viewport: MapViewport,
    current_location: Option<GeoPoint>,
    last_error: Option<GatewayError>,
    committed: Option<FarmRecord>,
}

impl BoundarySession {
    /// Creates an idle session for `owner_ref`.
    #[must_use]
    pub fn new(owner_ref: impl Into<String>, config: SessionConfig) -> Self {
        Self {
            validator: BoundaryValidator::new(config.min_vertices),
            viewport: config.default_viewport,
            config,
            state: SessionState::Idle,
            draft: FarmBoundaryDraft::new(owner_ref.into()),
            current_location: None,
            last_error: None,
            committed: None,
        }
    }

    /// Starts from a last-known viewport instead of the configured default.
    #[must_use]
    pub fn with_viewport(mut self, viewport: MapViewport) -> Self {
        self.viewport = viewport;
        self
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn draft(&self) -> &FarmBoundaryDraft {
        &self.draft
    }

    /// Captured vertices in edge order.
    #[must_use]
    pub fn vertices(&self) -> &[GeoPoint] {
        self.draft.vertices.points()
    }

    /// The review-step measurement, once the boundary has been measured.
    #[must_use]
    pub const fn area(&self) -> Option<&AreaMeasurement> {
        self.draft.area.as_ref()
    }

    /// Area of the vertices captured so far, for the live overlay label.
    #[must_use]
    pub fn live_area_square_meters(&self) -> f64 {
        area::compute(self.vertices())
    }

    #[must_use]
    pub const fn viewport(&self) -> MapViewport {
        self.viewport
    }

    /// The device position for the "you are here" marker. Never part of
    /// the boundary.
    #[must_use]
    pub const fn current_location(&self) -> Option<GeoPoint> {
        self.current_location
    }

    /// The error from the most recent failed save, if any.
    #[must_use]
    pub const fn last_error(&self) -> Option<&GatewayError> {
        self.last_error.as_ref()
    }

    /// The saved record once the session is committed.
    #[must_use]
    pub const fn committed(&self) -> Option<&FarmRecord> {
        self.committed.as_ref()
    }

    fn require(&self, expected: SessionState, action: &'static str) -> Result<(), SessionError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                state: self.state,
            })
        }
    }

    fn transition(&mut self, to: SessionState) {
        log::debug!("Boundary session {} -> {to}", self.state);
        self.state = to;
    }

    /// Enters the capture step, centring the map on the device position.
    ///
    /// A missing position is not an error: the map keeps its current
    /// (default or last-known) viewport and capture goes ahead.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] unless the session is
    /// `Idle`.
    pub async fn begin_capture<L>(&mut self, location: &L) -> Result<(), SessionError>
    where
        L: LocationService + ?Sized,
    {
        self.require(SessionState::Idle, "begin capture")?;

        match location.current_position().await {
            Ok(position) => {
                self.current_location = Some(position);
                self.viewport = MapViewport::centered_on(position);
            }
            Err(e) => {
                log::warn!("Location unavailable, keeping default viewport: {e}");
            }
        }

        self.transition(SessionState::Capturing);
        Ok(())
    }

    /// Recentres the map on a searched address. Never adds a vertex.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::AddressNotFound`] if nothing matched,
    /// [`SessionError::Search`] if the search failed, or
    /// [`SessionError::InvalidTransition`] outside `Idle`/`Capturing`.
    pub async fn recenter<S>(&mut self, search: &S, text: &str) -> Result<MapViewport, SessionError>
    where
        S: AddressSearch + ?Sized,
    {
        if !matches!(self.state, SessionState::Idle | SessionState::Capturing) {
            return Err(SessionError::InvalidTransition {
                action: "search for an address",
                state: self.state,
            });
        }

        let position = search
            .search_address(text)
            .await?
            .ok_or_else(|| SessionError::AddressNotFound {
                query: text.to_string(),
            })?;

        self.viewport = MapViewport::centered_on(position);
        Ok(self.viewport)
    }

    /// Appends a tapped point. Returns the new vertex count.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Coordinate`] for an out-of-range point or
    /// [`SessionError::InvalidTransition`] outside `Capturing`.
    pub fn add_vertex(&mut self, point: GeoPoint) -> Result<usize, SessionError> {
        self.require(SessionState::Capturing, "add a vertex")?;
        let point = GeoPoint::new(point.latitude, point.longitude)?;
        self.draft.vertices.append(point);
        Ok(self.draft.vertices.len())
    }

    /// Removes the most recent vertex, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `Capturing`.
    pub fn undo(&mut self) -> Result<Option<GeoPoint>, SessionError> {
        self.require(SessionState::Capturing, "undo a vertex")?;
        Ok(self.draft.vertices.remove_last())
    }

    /// Removes every vertex.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `Capturing`.
    pub fn clear_vertices(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Capturing, "clear vertices")?;
        self.draft.vertices.clear();
        Ok(())
    }

    /// Leaves capture for review, measuring the boundary.
    ///
    /// The measurement keeps the unit chosen on an earlier review, and any
    /// typed-in area is dropped because the boundary is measured afresh.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] with too few vertices, or
    /// [`SessionError::InvalidTransition`] outside `Capturing`.
    pub fn proceed(&mut self) -> Result<&AreaMeasurement, SessionError> {
        self.require(SessionState::Capturing, "proceed to review")?;
        self.validator.check(self.vertices())?;

        let unit = self
            .draft
            .area
            .map_or(self.config.default_unit, |a| a.unit());
        let measurement = AreaMeasurement::from_boundary(self.vertices(), unit);
        log::info!(
            "Measured boundary of {} vertices: {:.1} m² ({})",
            self.draft.vertices.len(),
            measurement.square_meters(),
            measurement.display_text()
        );

        self.viewport = fit_viewport(self.vertices(), self.viewport);
        self.transition(SessionState::Reviewing);
        Ok(self.draft.area.insert(measurement))
    }

    /// Goes back from review to keep editing the vertices.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `Reviewing`.
    pub fn back_to_capture(&mut self) -> Result<(), SessionError> {
        self.require(SessionState::Reviewing, "return to capture")?;
        self.transition(SessionState::Capturing);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `Reviewing`.
    pub fn edit_name(&mut self, name: impl Into<String>) -> Result<(), SessionError> {
        self.require(SessionState::Reviewing, "edit the name")?;
        self.draft.name = name.into();
        Ok(())
    }

    /// Overrides the displayed area with an operator-entered value.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidArea`] for a negative or non-finite
    /// value, or [`SessionError::InvalidTransition`] outside `Reviewing`.
    pub fn edit_area(&mut self, value: f64) -> Result<(), SessionError> {
        self.require(SessionState::Reviewing, "edit the area")?;
        self.measurement_mut("edit the area")?.edit(value)?;
        Ok(())
    }

    /// Shows the area in `unit`, converting the displayed number.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `Reviewing`.
    pub fn change_unit(&mut self, unit: AreaUnit) -> Result<(), SessionError> {
        self.require(SessionState::Reviewing, "change the unit")?;
        self.measurement_mut("change the unit")?.change_unit(unit);
        Ok(())
    }

    /// Switches between acres and hectares and returns the new unit.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] outside `Reviewing`.
    pub fn toggle_unit(&mut self) -> Result<AreaUnit, SessionError> {
        self.require(SessionState::Reviewing, "change the unit")?;
        let measurement = self.measurement_mut("change the unit")?;
        let unit = measurement.unit().toggled();
        measurement.change_unit(unit);
        Ok(unit)
    }

    fn measurement_mut(
        &mut self,
        action: &'static str,
    ) -> Result<&mut AreaMeasurement, SessionError> {
        let state = self.state;
        self.draft
            .area
            .as_mut()
            .ok_or(SessionError::InvalidTransition { action, state })
    }

    /// Moves to `Persisting` and returns the create request to send.
    ///
    /// The host sends it and reports back through [`Self::complete_save`];
    /// [`Self::save`] does both.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SaveInFlight`] while a save is pending,
    /// [`SessionError::Validation`] for too few vertices or a blank name,
    /// or [`SessionError::InvalidTransition`] outside `Reviewing`.
    pub fn begin_save(&mut self) -> Result<NewFarm, SessionError> {
        if self.state == SessionState::Persisting {
            return Err(SessionError::SaveInFlight);
        }
        self.require(SessionState::Reviewing, "save")?;
        self.validator.check(self.vertices())?;
        BoundaryValidator::check_name(&self.draft.name)?;

        let measurement = self.measurement_mut("save")?;
        let (area_value, unit) = (measurement.persisted_value(), measurement.unit());
        log::info!(
            "Saving farm boundary of {:.1} m² as {area_value} {}{}",
            measurement.effective_square_meters(),
            unit.symbol(),
            if measurement.is_overridden() { " (entered)" } else { "" }
        );

        let request = NewFarm {
            owner_id: self.draft.owner_ref.clone(),
            name: self.draft.name.trim().to_string(),
            area_value,
            unit,
            boundary: polygon_feature(self.vertices(), self.config.ring_closure),
        };

        self.last_error = None;
        self.transition(SessionState::Persisting);
        Ok(request)
    }

    /// Finishes a save started with [`Self::begin_save`].
    ///
    /// On success the session is committed and the draft discarded. On
    /// failure it returns to `Reviewing` with the boundary untouched and
    /// the error kept in [`Self::last_error`].
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SaveFailed`] if `result` is an error, or
    /// [`SessionError::InvalidTransition`] outside `Persisting`.
    pub fn complete_save(
        &mut self,
        result: Result<FarmRecord, GatewayError>,
    ) -> Result<&FarmRecord, SessionError> {
        self.require(SessionState::Persisting, "complete a save")?;

        match result {
            Ok(record) => {
                log::info!("Saved farm {} ({:?})", record.id, record.name);
                self.draft.discard();
                self.transition(SessionState::Committed);
                Ok(self.committed.insert(record))
            }
            Err(e) => {
                log::warn!("Saving farm boundary failed: {e}");
                let message = e.to_string();
                self.last_error = Some(e);
                self.transition(SessionState::Reviewing);
                Err(SessionError::SaveFailed { message })
            }
        }
    }

    /// Saves the draft through `gateway`.
    ///
    /// # Errors
    ///
    /// See [`Self::begin_save`] and [`Self::complete_save`].
    pub async fn save<G>(&mut self, gateway: &G) -> Result<&FarmRecord, SessionError>
    where
        G: PersistenceGateway + ?Sized,
    {
        let request = self.begin_save()?;
        let result = gateway.create(&request).await;
        self.complete_save(result)
    }

    /// Discards the draft. Nothing has been persisted.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::InvalidTransition`] while `Persisting` or
    /// once the session is finished.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Idle | SessionState::Capturing | SessionState::Reviewing => {
                self.draft.discard();
                self.transition(SessionState::Cancelled);
                Ok(())
            }
            SessionState::Persisting | SessionState::Committed | SessionState::Cancelled => {
                Err(SessionError::InvalidTransition {
                    action: "cancel",
                    state: self.state,
                })
            }
        }
    }
}

/// Looks for a farm that a torn-down session may have saved.
///
/// `request` is the [`NewFarm`] returned by `begin_save`. A stored farm
/// matches when it has the same owner, name, and boundary geometry, so an
/// older farm that only shares the name is not mistaken for the pending
/// save.
///
/// # Errors
///
/// Returns [`GatewayError`] if the owner's farms cannot be listed.
pub async fn reconcile<G>(
    gateway: &G,
    request: &NewFarm,
) -> Result<Option<FarmRecord>, GatewayError>
where
    G: PersistenceGateway + ?Sized,
{
    let name = request.name.trim();
    let geometry = request.boundary.geometry.as_ref().map(|g| &g.value);
    let found = gateway
        .list_by_owner(&request.owner_id)
        .await?
        .into_iter()
        .find(|r| {
            r.name == name && r.boundary.geometry.as_ref().map(|g| &g.value) == geometry
        });

    match &found {
        Some(record) => log::info!("Reconciled unfinished save to farm {}", record.id),
        None => log::debug!("No stored farm matches unfinished save of {name:?}"),
    }
    Ok(found)
}
