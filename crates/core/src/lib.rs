//! Fire Perimeter Growth Core Library
//!
//! Simulates the growth of a wildfire perimeter over discrete time steps with
//! an elliptical-wavelet (Huygens principle) propagation model: every boundary
//! point of the current perimeter spawns its own elliptical fire shape each
//! step, and the next perimeter is the outer envelope of all spawned ellipses,
//! with interior (engulfed) points discarded.
//!
//! ## Scope
//!
//! The crate is the geometric and algorithmic core only:
//! - Rotated-ellipse geometry (containment, parametric perimeter sampling,
//!   Ramanujan perimeter length)
//! - Fire-shape parameterization from heading/backing/flanking distances and
//!   beta-angle spread queries
//! - Perimeter orchestration: ignition, per-step growth, envelope thinning
//!   (all-pairs or spatial-tile)
//!
//! Fire behavior itself (rate of spread, length-to-width ratio as functions of
//! fuel, weather, and terrain) is an external collaborator behind the
//! [`FireBehavior`] trait; rendering, configuration parsing, and persistence
//! are host concerns.

// Geometry primitives shared by all fire shapes
pub mod geometry;

// Fire-behavior collaborator interface
pub mod behavior;

// Elliptical fire shape and its derived spread quantities
pub mod shape;

// Spatial-tile dedup grid
pub mod tile;

// Perimeter growth state machine
pub mod perimeter;

// Re-export core types
pub use behavior::{CollaboratorError, FireBehavior, SpreadDistances, UniformSpread};
pub use geometry::{Ellipse, Point, Vec2};
pub use perimeter::{
    BoundaryPoint, FirePerimeter, GrowthError, GrowthPhase, InvalidConfigError, PerimeterConfig,
    ShapeId,
};
pub use shape::{FireShape, InvalidShapeError};
pub use tile::{CellMark, SpatialTile};
