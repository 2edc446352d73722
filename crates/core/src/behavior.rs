//! Fire-behavior collaborator interface.
//!
//! The core never models fuel, weather, or terrain itself. It consumes the
//! three directional spread distances (heading, backing, flanking) and a
//! heading angle that a fire-behavior model supplies for a point and a time
//! interval, and builds elliptical fire shapes from them. Anything that can
//! answer that query (a Rothermel-style spread model, a lookup table, a test
//! stub) plugs in through [`FireBehavior`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Point;

/// Directional spread distances for one point over one time interval.
///
/// Distances are in the simulation's planar length unit; `heading_degrees` is
/// the compass-free heading of the fire's travel direction, in degrees
/// counter-clockwise from the +x axis. Values must satisfy the fire-shape
/// construction invariants (`heading > 0`, `flanking > 0`, `backing >= 0`,
/// `flanking <= (heading + backing) / 2`) or shape construction rejects them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadDistances {
    /// Spread distance along the direction of travel.
    pub heading: f64,
    /// Spread distance directly opposite the direction of travel.
    pub backing: f64,
    /// Spread distance perpendicular to the direction of travel.
    pub flanking: f64,
    /// Direction of travel, degrees counter-clockwise from the +x axis.
    pub heading_degrees: f64,
}

/// A fire-behavior or spatial collaborator failed or returned out-of-domain
/// values.
///
/// Collaborator failures are never substituted with defaults, since silent
/// substitution would corrupt the physical model; the message travels up
/// to the caller intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorError {
    message: String,
}

impl CollaboratorError {
    /// Wrap a collaborator failure message.
    pub fn new(message: impl Into<String>) -> Self {
        CollaboratorError {
            message: message.into(),
        }
    }
}

impl fmt::Display for CollaboratorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fire-behavior collaborator failed: {}", self.message)
    }
}

impl std::error::Error for CollaboratorError {}

/// External fire-behavior model queried once per boundary point per step.
///
/// Implementations must be total over the domain of points the perimeter can
/// produce. `Send + Sync` is required because the per-boundary-point spawn
/// phase of a growth step runs as a parallel map.
pub trait FireBehavior: Send + Sync {
    /// Spread distances at `origin`, for the interval starting `elapsed` time
    /// units after ignition and lasting `duration`.
    ///
    /// # Errors
    ///
    /// Returns [`CollaboratorError`] when the model cannot answer for this
    /// point and interval; the growth step surfaces it without retrying.
    fn compute_shape(
        &self,
        origin: Point,
        elapsed: f64,
        duration: f64,
    ) -> Result<SpreadDistances, CollaboratorError>;
}

/// The simplest collaborator: identical spread everywhere, always.
///
/// Models a uniform fuel bed under steady wind. Useful as a baseline and in
/// tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformSpread {
    distances: SpreadDistances,
}

impl UniformSpread {
    /// A uniform collaborator answering every query with `distances`.
    #[must_use]
    pub fn new(distances: SpreadDistances) -> Self {
        UniformSpread { distances }
    }
}

impl FireBehavior for UniformSpread {
    fn compute_shape(
        &self,
        _origin: Point,
        _elapsed: f64,
        _duration: f64,
    ) -> Result<SpreadDistances, CollaboratorError> {
        Ok(self.distances)
    }
}
