//! Fire perimeter growth by elliptical-wavelet propagation.
//!
//! Discretized Huygens' principle: every boundary point of the current
//! perimeter spawns its own elliptical fire shape each step, and the next
//! perimeter is the outer envelope of all spawned ellipses. Interior
//! (engulfed) points are burned-over, not boundary, and are discarded by two
//! filters:
//!
//! 1. **Survival**: a freshly sampled candidate is dropped when the *parent*
//!    shape of the boundary point that spawned it already reached past it.
//! 2. **Thinning**: the pooled candidates are tested all-pairs; a candidate
//!    inside any other candidate's freshly spawned ellipse is dropped. An
//!    O(n²) pass, acceptable for boundaries in the low thousands; the
//!    spatial-tile variant trades boundary resolution for O(1) dedup when the
//!    perimeter is denser.
//!
//! Each step is a pure computation over an immutable snapshot: the spawn
//! phase is a parallel map over the boundary, thinning runs once on the fully
//! assembled candidate pool (the natural synchronization point), and the
//! surviving set replaces the boundary wholesale.
//!
//! # References
//!
//! - Anderson, D.H., Catchpole, E.A., De Mestre, N.J., Parkes, T. (1982).
//!   "Modelling the spread of grass fires." Journal of the Australian
//!   Mathematical Society, Series B, 23(4), 451-466.
//! - Richards, G.D. (1990). "An elliptical growth model of forest fire fronts
//!   and its numerical solution." International Journal for Numerical Methods
//!   in Engineering, 30(6), 1163-1179.
//! - Knight, I., Coleman, J. (1993). "A fire perimeter expansion algorithm
//!   based on Huygens' wavelet propagation." International Journal of
//!   Wildland Fire, 3(2), 73-84.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info, warn};

use crate::behavior::{CollaboratorError, FireBehavior};
use crate::geometry::Point;
use crate::shape::{FireShape, InvalidShapeError};
use crate::tile::{CellMark, SpatialTile};

/// Index of a fire shape in the arena of shapes spawned in one step.
///
/// Boundary points reference the shape that spawned them by id rather than by
/// pointer; a shape's lifetime is scoped to one growth step and ids keep the
/// provenance relation free of ownership cycles.
pub type ShapeId = usize;

/// One point on the fire perimeter, with the id of the shape that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundaryPoint {
    /// Position in the shared planar coordinate system.
    pub position: Point,
    /// Arena id of the spawning shape in the step that produced this point.
    pub parent: ShapeId,
}

/// Lifecycle of a perimeter.
///
/// `Unignited -> Ignited -> Growing (self-loop per step) -> Stalled`.
/// `Stalled` is terminal: growth produced zero surviving boundary points and
/// the fire has self-extinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPhase {
    /// No ignition yet.
    Unignited,
    /// Ignition boundary recorded; no growth step taken.
    Ignited,
    /// At least one growth step completed.
    Growing,
    /// A growth step produced zero surviving boundary points.
    Stalled,
}

/// Tunable parameters for perimeter growth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerimeterConfig {
    /// Time units covered by one growth step.
    pub step_duration: f64,
    /// Parametric sampling increment around each spawned ellipse, degrees.
    /// The default of 30 yields 12 sample points per ellipse.
    pub arc_increment_degrees: f64,
    /// Containment epsilon in `[0, 1)`, shared by every containment test so
    /// perimeter points are not spuriously marked as contained by the very
    /// ellipse that generated them.
    pub containment_buffer: f64,
    /// Cell side length for the spatial-tile dedup variant.
    pub tile_cell_size: f64,
}

impl Default for PerimeterConfig {
    fn default() -> Self {
        PerimeterConfig {
            step_duration: 1.0,
            arc_increment_degrees: 30.0,
            containment_buffer: 1e-8,
            tile_cell_size: 16.0,
        }
    }
}

impl PerimeterConfig {
    /// Number of boundary points sampled per spawned ellipse.
    pub fn samples_per_shape(&self) -> usize {
        (360.0 / self.arc_increment_degrees).ceil() as usize
    }

    /// Check every field against its domain.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfigError`] naming the first out-of-domain field.
    pub fn validate(&self) -> Result<(), InvalidConfigError> {
        if self.step_duration <= 0.0 || !self.step_duration.is_finite() {
            return Err(InvalidConfigError::new("step_duration", self.step_duration));
        }
        if self.arc_increment_degrees <= 0.0 || self.arc_increment_degrees > 360.0 {
            return Err(InvalidConfigError::new(
                "arc_increment_degrees",
                self.arc_increment_degrees,
            ));
        }
        if !(0.0..1.0).contains(&self.containment_buffer) {
            return Err(InvalidConfigError::new(
                "containment_buffer",
                self.containment_buffer,
            ));
        }
        if self.tile_cell_size <= 0.0 || !self.tile_cell_size.is_finite() {
            return Err(InvalidConfigError::new("tile_cell_size", self.tile_cell_size));
        }
        Ok(())
    }
}

/// A configuration field was outside its domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvalidConfigError {
    field: &'static str,
    value: f64,
}

impl InvalidConfigError {
    fn new(field: &'static str, value: f64) -> Self {
        InvalidConfigError { field, value }
    }
}

impl fmt::Display for InvalidConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid perimeter configuration: {} = {}",
            self.field, self.value
        )
    }
}

impl std::error::Error for InvalidConfigError {}

/// Errors surfaced by ignition and growth.
///
/// Every failure is either a genuine physical terminal condition (the fire
/// died out) or a caller/collaborator contract violation; none is retried or
/// masked by the core.
#[derive(Debug, Clone, PartialEq)]
pub enum GrowthError {
    /// The fire-behavior collaborator returned distances violating the
    /// fire-shape construction invariants.
    InvalidShape(InvalidShapeError),
    /// The fire-behavior collaborator failed outright.
    Collaborator(CollaboratorError),
    /// Growth produced zero surviving boundary points at `step`; the
    /// perimeter is terminally stalled.
    Stalled {
        /// Step at which the fire self-extinguished.
        step: u32,
    },
    /// Growth was requested before ignition.
    NotIgnited,
}

impl fmt::Display for GrowthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthError::InvalidShape(e) => write!(f, "fire-behavior output rejected: {e}"),
            GrowthError::Collaborator(e) => write!(f, "{e}"),
            GrowthError::Stalled { step } => write!(
                f,
                "perimeter stalled at step {step}: no spawned point survived thinning"
            ),
            GrowthError::NotIgnited => write!(f, "perimeter has not been ignited"),
        }
    }
}

impl std::error::Error for GrowthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrowthError::InvalidShape(e) => Some(e),
            GrowthError::Collaborator(e) => Some(e),
            GrowthError::Stalled { .. } | GrowthError::NotIgnited => None,
        }
    }
}

impl From<InvalidShapeError> for GrowthError {
    fn from(e: InvalidShapeError) -> Self {
        GrowthError::InvalidShape(e)
    }
}

impl From<CollaboratorError> for GrowthError {
    fn from(e: CollaboratorError) -> Self {
        GrowthError::Collaborator(e)
    }
}

/// Boundary snapshot after a completed step: the points, the arena of shapes
/// that spawned them, and the step counter. Replaced wholesale each step.
#[derive(Debug, Clone, Default)]
struct Snapshot {
    boundary: Vec<BoundaryPoint>,
    shapes: Vec<FireShape>,
    step: u32,
}

#[derive(Debug, Clone, Default)]
struct IgnitionRecord {
    time: f64,
    boundary: Vec<BoundaryPoint>,
    shape: Option<FireShape>,
}

/// Orchestrates ignition, per-step growth, and boundary thinning.
///
/// Owns the current and ignition state; queries `B` for fire behavior once
/// per boundary point per step.
pub struct FirePerimeter<B: FireBehavior> {
    behavior: B,
    config: PerimeterConfig,
    phase: GrowthPhase,
    tile: SpatialTile,
    current: Snapshot,
    ignition: IgnitionRecord,
}

impl<B: FireBehavior> FirePerimeter<B> {
    /// Create an unignited perimeter driven by `behavior`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfigError`] when `config` fails validation.
    pub fn new(behavior: B, config: PerimeterConfig) -> Result<Self, InvalidConfigError> {
        config.validate()?;
        Ok(FirePerimeter {
            behavior,
            tile: SpatialTile::new(config.tile_cell_size),
            config,
            phase: GrowthPhase::Unignited,
            current: Snapshot::default(),
            ignition: IgnitionRecord::default(),
        })
    }

    /// Start a new fire at `(x, y)` using conditions from `start_time`.
    ///
    /// Builds the ignition shape from one collaborator query, samples its
    /// boundary at even parametric increments, and records the result as both
    /// the ignition boundary and the current boundary. Deterministic given the
    /// same collaborator response. Re-ignition resets all perimeter state.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::Collaborator`] or [`GrowthError::InvalidShape`]
    /// when the collaborator fails or returns out-of-domain distances for the
    /// ignition point.
    pub fn ignite(
        &mut self,
        x: f64,
        y: f64,
        start_time: f64,
    ) -> Result<&[BoundaryPoint], GrowthError> {
        let origin = Point::new(x, y);
        let duration = self.config.step_duration;
        let spread = self.behavior.compute_shape(origin, 0.0, duration)?;
        let shape = FireShape::new(origin, spread, duration)?;
        let boundary: Vec<BoundaryPoint> =
            sample_boundary(&shape, self.config.arc_increment_degrees)
                .map(|position| BoundaryPoint {
                    position,
                    parent: 0,
                })
                .collect();
        info!(x, y, start_time, points = boundary.len(), "perimeter ignited");
        self.ignition = IgnitionRecord {
            time: start_time,
            boundary: boundary.clone(),
            shape: Some(shape),
        };
        self.current = Snapshot {
            boundary,
            shapes: vec![shape],
            step: 0,
        };
        self.phase = GrowthPhase::Ignited;
        Ok(&self.current.boundary)
    }

    /// Advance the perimeter by one time step with all-pairs envelope
    /// thinning.
    ///
    /// # Errors
    ///
    /// Returns [`GrowthError::NotIgnited`] before ignition,
    /// [`GrowthError::Stalled`] when no spawned point survives (terminal;
    /// repeated calls keep returning it), and collaborator/shape errors from
    /// the spawn phase. On a non-stall error the previous boundary is
    /// retained untouched.
    pub fn grow_step(&mut self) -> Result<&[BoundaryPoint], GrowthError> {
        self.ensure_growable()?;
        let step = self.current.step + 1;
        let (shapes, candidates) = self.spawn()?;
        let buffer = self.config.containment_buffer;
        // A candidate survives unless some other candidate's freshly spawned
        // ellipse already reached past it.
        let boundary: Vec<BoundaryPoint> = candidates
            .iter()
            .filter(|candidate| {
                !shapes.iter().enumerate().any(|(id, shape)| {
                    id != candidate.parent && shape.contains_point(candidate.position, buffer)
                })
            })
            .copied()
            .collect();
        self.commit(step, shapes, candidates.len(), boundary)
    }

    /// Advance the perimeter by one time step, deduplicating candidates by
    /// spatial-tile first-mark instead of pairwise thinning.
    ///
    /// The cheaper path when perimeter density is high; within a cell of the
    /// configured size, only the first spawned candidate survives. The tile is
    /// cleared at the start of every step.
    ///
    /// # Errors
    ///
    /// As [`FirePerimeter::grow_step`].
    pub fn grow_step_tiled(&mut self) -> Result<&[BoundaryPoint], GrowthError> {
        self.ensure_growable()?;
        let step = self.current.step + 1;
        let (shapes, candidates) = self.spawn()?;
        self.tile.clear();
        let tile = &mut self.tile;
        let boundary: Vec<BoundaryPoint> = candidates
            .iter()
            .filter(|candidate| {
                tile.mark_cell(candidate.position.x, candidate.position.y) == CellMark::First
            })
            .copied()
            .collect();
        self.commit(step, shapes, candidates.len(), boundary)
    }

    /// Spawn phase shared by both growth variants: one collaborator query and
    /// one sampled ellipse per boundary point (parallel map), candidates
    /// pre-filtered by the parent survival test.
    fn spawn(&self) -> Result<(Vec<FireShape>, Vec<BoundaryPoint>), GrowthError> {
        let elapsed = self.current_elapsed();
        let duration = self.config.step_duration;
        let buffer = self.config.containment_buffer;
        let arc = self.config.arc_increment_degrees;

        let per_point: Vec<(FireShape, Vec<Point>)> = self
            .current
            .boundary
            .par_iter()
            .map(|bp| -> Result<(FireShape, Vec<Point>), GrowthError> {
                let spread = self.behavior.compute_shape(bp.position, elapsed, duration)?;
                let shape = FireShape::new(bp.position, spread, duration)?;
                let parent = &self.current.shapes[bp.parent];
                let survivors = sample_boundary(&shape, arc)
                    .filter(|p| !parent.contains_point(*p, buffer))
                    .collect();
                Ok((shape, survivors))
            })
            .collect::<Result<_, _>>()?;

        let mut shapes = Vec::with_capacity(per_point.len());
        let mut candidates = Vec::new();
        for (shape, points) in per_point {
            let parent = shapes.len();
            shapes.push(shape);
            candidates.extend(
                points
                    .into_iter()
                    .map(|position| BoundaryPoint { position, parent }),
            );
        }
        Ok((shapes, candidates))
    }

    fn ensure_growable(&self) -> Result<(), GrowthError> {
        match self.phase {
            GrowthPhase::Unignited => Err(GrowthError::NotIgnited),
            GrowthPhase::Stalled => Err(GrowthError::Stalled {
                step: self.current.step + 1,
            }),
            GrowthPhase::Ignited | GrowthPhase::Growing => Ok(()),
        }
    }

    /// Install the surviving set as the new boundary, or transition to
    /// `Stalled` when it is empty. The stalled perimeter keeps its last live
    /// boundary so callers can inspect the final fire edge.
    fn commit(
        &mut self,
        step: u32,
        shapes: Vec<FireShape>,
        candidates: usize,
        boundary: Vec<BoundaryPoint>,
    ) -> Result<&[BoundaryPoint], GrowthError> {
        if boundary.is_empty() {
            self.phase = GrowthPhase::Stalled;
            warn!(step, candidates, "perimeter stalled: no spawned point survived");
            return Err(GrowthError::Stalled { step });
        }
        debug!(
            step,
            candidates,
            surviving = boundary.len(),
            "growth step complete"
        );
        self.current = Snapshot {
            boundary,
            shapes,
            step,
        };
        self.phase = GrowthPhase::Growing;
        Ok(&self.current.boundary)
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> GrowthPhase {
        self.phase
    }

    /// The configuration the perimeter was built with.
    pub fn config(&self) -> PerimeterConfig {
        self.config
    }

    /// Boundary points after the most recent completed step.
    pub fn current_boundary(&self) -> &[BoundaryPoint] {
        &self.current.boundary
    }

    /// Completed growth steps; 0 until the first successful `grow_step`.
    pub fn current_step(&self) -> u32 {
        self.current.step
    }

    /// Simulation time elapsed since ignition.
    pub fn current_elapsed(&self) -> f64 {
        f64::from(self.current.step) * self.config.step_duration
    }

    /// Ignition time plus elapsed time.
    pub fn current_time(&self) -> f64 {
        self.ignition.time + self.current_elapsed()
    }

    /// User-space time the fire was ignited at.
    pub fn ignition_time(&self) -> f64 {
        self.ignition.time
    }

    /// Boundary points sampled from the ignition shape.
    pub fn ignition_boundary(&self) -> &[BoundaryPoint] {
        &self.ignition.boundary
    }

    /// The ignition fire shape, if ignited.
    pub fn ignition_shape(&self) -> Option<&FireShape> {
        self.ignition.shape.as_ref()
    }

    /// Look up a parent shape of the current boundary by arena id.
    pub fn shape(&self, id: ShapeId) -> Option<&FireShape> {
        self.current.shapes.get(id)
    }
}

/// Sample the shape's perimeter at even parametric increments, sweeping a
/// full revolution: `ceil(360 / arc)` points starting at the head vertex.
fn sample_boundary(shape: &FireShape, arc_increment_degrees: f64) -> impl Iterator<Item = Point> + '_ {
    let samples = (360.0 / arc_increment_degrees).ceil() as usize;
    (0..samples)
        .map(move |i| shape.perimeter_point_at((arc_increment_degrees * i as f64).to_radians()))
}
