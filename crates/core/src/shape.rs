//! Elliptical fire shape derived from directional spread distances.
//!
//! A fire shape is the idealized spread envelope from one ignition point over
//! one time interval: an ellipse whose major axis lies along the heading
//! direction, with the ignition point at the rear focus region. It is
//! parameterized by the heading, backing, and flanking distances a
//! fire-behavior model supplies:
//!
//! ```text
//! length = heading + backing        a = length / 2
//! b      = flanking                 c = √(a² − b²)
//! e      = c / a                    center = ignition + (a − backing)·û
//! ```
//!
//! where `û` is the unit vector along the heading. The beta-angle queries use
//! the focus-chord property of the ellipse to report spread distance at any
//! azimuth off the heading.
//!
//! # References
//!
//! - Anderson, H.E. (1983). "Predicting wind-driven wild land fire size and
//!   shape." USDA Forest Service Research Paper INT-305.
//! - Finney, M.A. (1998). "FARSITE: Fire Area Simulator, model development
//!   and evaluation." USDA Forest Service Research Paper RMRS-RP-4.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::behavior::SpreadDistances;
use crate::geometry::{distance, project, Ellipse, Point};

/// Construction-time invariant violation for a fire shape.
///
/// A degenerate shape cannot propagate and is rejected at the boundary, never
/// silently clamped. Fatal to the shape, not to the perimeter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidShapeError {
    /// Heading or flanking distance was zero or negative.
    NonPositiveDistance {
        /// Offending heading distance.
        heading: f64,
        /// Offending flanking distance.
        flanking: f64,
    },
    /// Backing distance was negative.
    NegativeBacking {
        /// Offending backing distance.
        backing: f64,
    },
    /// Flanking distance exceeded the semi-major axis, which would make the
    /// eccentricity imaginary.
    FlankExceedsSemiMajor {
        /// Offending flanking distance.
        flanking: f64,
        /// Semi-major axis implied by heading + backing.
        semi_major: f64,
    },
    /// The time interval covered by the distances was zero or negative.
    NonPositiveDuration {
        /// Offending duration.
        duration: f64,
    },
}

impl fmt::Display for InvalidShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidShapeError::NonPositiveDistance { heading, flanking } => write!(
                f,
                "fire shape requires positive heading and flanking distances \
                 (heading={heading}, flanking={flanking})"
            ),
            InvalidShapeError::NegativeBacking { backing } => {
                write!(f, "fire shape requires non-negative backing distance (backing={backing})")
            }
            InvalidShapeError::FlankExceedsSemiMajor {
                flanking,
                semi_major,
            } => write!(
                f,
                "flanking distance {flanking} exceeds semi-major axis {semi_major}"
            ),
            InvalidShapeError::NonPositiveDuration { duration } => {
                write!(f, "fire shape requires a positive duration (duration={duration})")
            }
        }
    }
}

impl std::error::Error for InvalidShapeError {}

/// Elliptical spread envelope from one ignition point over one interval.
///
/// Pure value object: every derived scalar is fixed at construction and the
/// shape never references other shapes. Provenance between shapes and the
/// boundary points they spawn is tracked by id in the perimeter, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FireShape {
    ignition: Point,
    spread: SpreadDistances,
    duration: f64,
    ellipse: Ellipse,
    focal_distance: f64,
    eccentricity: f64,
    head_point: Point,
    back_point: Point,
}

impl FireShape {
    /// Build a fire shape at `ignition` from collaborator-supplied spread
    /// distances covering `duration` time units.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidShapeError`] when `spread.heading <= 0`,
    /// `spread.flanking <= 0`, `spread.backing < 0`, `duration <= 0`, or the
    /// flanking distance exceeds the semi-major axis `(heading + backing) / 2`.
    pub fn new(
        ignition: Point,
        spread: SpreadDistances,
        duration: f64,
    ) -> Result<Self, InvalidShapeError> {
        if spread.heading <= 0.0 || spread.flanking <= 0.0 {
            return Err(InvalidShapeError::NonPositiveDistance {
                heading: spread.heading,
                flanking: spread.flanking,
            });
        }
        if spread.backing < 0.0 {
            return Err(InvalidShapeError::NegativeBacking {
                backing: spread.backing,
            });
        }
        if duration <= 0.0 {
            return Err(InvalidShapeError::NonPositiveDuration { duration });
        }

        let semi_major = (spread.heading + spread.backing) / 2.0;
        let semi_minor = spread.flanking;
        if semi_minor > semi_major {
            return Err(InvalidShapeError::FlankExceedsSemiMajor {
                flanking: semi_minor,
                semi_major,
            });
        }

        let heading_radians = spread.heading_degrees.to_radians();
        let focal_distance = (semi_major * semi_major - semi_minor * semi_minor).sqrt();
        let center = project(ignition, heading_radians, semi_major - spread.backing);
        let head_point = project(ignition, heading_radians, spread.heading);
        let back_point = project(ignition, heading_radians, -spread.backing);

        Ok(FireShape {
            ignition,
            spread,
            duration,
            ellipse: Ellipse::new(center, semi_major, semi_minor, heading_radians),
            focal_distance,
            eccentricity: focal_distance / semi_major,
            head_point,
            back_point,
        })
    }

    /// Build a fire shape from a head spread rate and length-to-width ratio.
    ///
    /// The eccentricity follows from the ratio, the backing rate from the
    /// focus-chord relation `back = head·(1−e)/(1+e)`, and the distances from
    /// rate × duration. The result is focus-consistent: its beta-distance at
    /// 180° equals its backing distance.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidShapeError`] when the derived distances violate the
    /// construction invariants (e.g. `head_rate <= 0`, `length_to_width < 1`).
    pub fn from_head_rate(
        ignition: Point,
        head_rate: f64,
        length_to_width: f64,
        heading_degrees: f64,
        duration: f64,
    ) -> Result<Self, InvalidShapeError> {
        let x = length_to_width * length_to_width - 1.0;
        let eccentricity = if x > 0.0 { x.sqrt() / length_to_width } else { 0.0 };
        let back_rate = head_rate * (1.0 - eccentricity) / (1.0 + eccentricity);
        let length = duration * (head_rate + back_rate);
        let width = length / length_to_width;
        FireShape::new(
            ignition,
            SpreadDistances {
                heading: head_rate * duration,
                backing: back_rate * duration,
                flanking: width / 2.0,
                heading_degrees,
            },
            duration,
        )
    }

    /// Ignition point the distances were computed for.
    pub fn ignition(&self) -> Point {
        self.ignition
    }

    /// The spread distances this shape was built from.
    pub fn spread(&self) -> SpreadDistances {
        self.spread
    }

    /// Time interval the spread distances cover.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// The underlying rotated ellipse.
    pub fn ellipse(&self) -> Ellipse {
        self.ellipse
    }

    /// Ellipse center (offset `a − backing` from ignition along the heading).
    pub fn center(&self) -> Point {
        self.ellipse.center()
    }

    /// Semi-major axis `a = (heading + backing) / 2`.
    pub fn semi_major(&self) -> f64 {
        self.ellipse.semi_major()
    }

    /// Semi-minor axis `b` (the flanking distance).
    pub fn semi_minor(&self) -> f64 {
        self.ellipse.semi_minor()
    }

    /// Distance from center to either focus, `c = √(a² − b²)`.
    pub fn focal_distance(&self) -> f64 {
        self.focal_distance
    }

    /// Eccentricity `e = c/a`, always in `[0, 1)` for a valid shape.
    pub fn eccentricity(&self) -> f64 {
        self.eccentricity
    }

    /// Total length along the major axis, heading + backing.
    pub fn length(&self) -> f64 {
        self.spread.heading + self.spread.backing
    }

    /// Total width across the minor axis, twice the flanking distance.
    pub fn width(&self) -> f64 {
        2.0 * self.spread.flanking
    }

    /// Length-to-width ratio of the spread envelope.
    pub fn length_to_width_ratio(&self) -> f64 {
        self.length() / self.width()
    }

    /// Heading direction in degrees counter-clockwise from the +x axis.
    pub fn heading_degrees(&self) -> f64 {
        self.spread.heading_degrees
    }

    /// Heading direction in radians.
    pub fn heading_radians(&self) -> f64 {
        self.spread.heading_degrees.to_radians()
    }

    /// Vertex on the major axis in the heading direction.
    pub fn head_point(&self) -> Point {
        self.head_point
    }

    /// Vertex on the major axis opposite the heading direction.
    pub fn back_point(&self) -> Point {
        self.back_point
    }

    /// Heading distance reached over the construction interval.
    pub fn head_distance(&self) -> f64 {
        self.spread.heading
    }

    /// Backing distance reached over the construction interval.
    pub fn back_distance(&self) -> f64 {
        self.spread.backing
    }

    /// Flanking distance reached over the construction interval.
    pub fn flank_distance(&self) -> f64 {
        self.spread.flanking
    }

    /// Heading spread rate, distance per time unit.
    pub fn head_rate(&self) -> f64 {
        self.spread.heading / self.duration
    }

    /// Backing spread rate, distance per time unit.
    pub fn back_rate(&self) -> f64 {
        self.spread.backing / self.duration
    }

    /// Flanking spread rate, distance per time unit.
    pub fn flank_rate(&self) -> f64 {
        self.spread.flanking / self.duration
    }

    /// Fraction of the heading distance reached at azimuth `beta_degrees` off
    /// the heading direction, per the focus-chord property:
    ///
    /// ```text
    /// f(β) = (1 − e) / (1 − e·cos β)        f(0) = 1
    /// ```
    ///
    /// The ellipse is symmetric about the heading axis, so only the magnitude
    /// of the azimuth matters.
    pub fn beta_factor(&self, beta_degrees: f64) -> f64 {
        if beta_degrees == 0.0 {
            return 1.0;
        }
        let e = self.eccentricity;
        (1.0 - e) / (1.0 - e * beta_degrees.to_radians().cos())
    }

    /// Distance from ignition to the perimeter at azimuth `beta_degrees` off
    /// the heading direction.
    pub fn beta_distance(&self, beta_degrees: f64) -> f64 {
        self.beta_factor(beta_degrees) * self.spread.heading
    }

    /// Spread rate at azimuth `beta_degrees`, distance per time unit.
    pub fn beta_rate(&self, beta_degrees: f64) -> f64 {
        self.beta_distance(beta_degrees) / self.duration
    }

    /// Angle (radians) at the ignition focus subtended by `point` and the head
    /// point, via the law of cosines on the (ignition, head, point) triangle.
    ///
    /// Classifies an arbitrary point's direction relative to the fire's
    /// heading: 0 along the heading, π directly behind. Returns 0 when `point`
    /// coincides with the ignition focus (the direction is undefined there).
    /// The cosine is clamped to `[-1, 1]` against roundoff in the distance
    /// round trip.
    pub fn beta_angle(&self, point: Point) -> f64 {
        let to_point = distance(self.ignition, point);
        let to_head = distance(self.ignition, self.head_point);
        if to_point == 0.0 || to_head == 0.0 {
            return 0.0;
        }
        let head_to_point = distance(self.head_point, point);
        let cos = (to_head * to_head + to_point * to_point - head_to_point * head_to_point)
            / (2.0 * to_head * to_point);
        cos.clamp(-1.0, 1.0).acos()
    }

    /// Containment test against the underlying ellipse; see
    /// [`Ellipse::contains_point`].
    pub fn contains_point(&self, point: Point, buffer: f64) -> bool {
        self.ellipse.contains_point(point, buffer)
    }

    /// Perimeter point at parametric angle `theta`; see
    /// [`Ellipse::perimeter_point_at`].
    #[must_use]
    pub fn perimeter_point_at(&self, theta: f64) -> Point {
        self.ellipse.perimeter_point_at(theta)
    }

    /// Perimeter length of the spread envelope.
    pub fn perimeter(&self) -> f64 {
        self.ellipse.perimeter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn reference_spread() -> SpreadDistances {
        SpreadDistances {
            heading: 100.0,
            backing: 20.0,
            flanking: 50.0,
            heading_degrees: 45.0,
        }
    }

    #[test]
    fn derived_quantities() {
        let shape = FireShape::new(Point::new(0.0, 0.0), reference_spread(), 1.0).unwrap();
        assert_relative_eq!(shape.length(), 120.0);
        assert_relative_eq!(shape.width(), 100.0);
        assert_relative_eq!(shape.semi_major(), 60.0);
        assert_relative_eq!(shape.semi_minor(), 50.0);
        assert_relative_eq!(shape.focal_distance(), 1100.0_f64.sqrt());
        assert_relative_eq!(shape.eccentricity(), 1100.0_f64.sqrt() / 60.0);
        assert_relative_eq!(shape.length_to_width_ratio(), 1.2);

        // Center offset a − backing = 40 along the 45° heading.
        let offset = 40.0 / 2.0_f64.sqrt();
        assert_relative_eq!(shape.center().x, offset, epsilon = 1e-12);
        assert_relative_eq!(shape.center().y, offset, epsilon = 1e-12);

        // Major-axis vertices sit at +heading and −backing along the heading.
        let head = 100.0 / 2.0_f64.sqrt();
        assert_relative_eq!(shape.head_point().x, head, epsilon = 1e-12);
        assert_relative_eq!(shape.head_point().y, head, epsilon = 1e-12);
        let back = -20.0 / 2.0_f64.sqrt();
        assert_relative_eq!(shape.back_point().x, back, epsilon = 1e-12);
        assert_relative_eq!(shape.back_point().y, back, epsilon = 1e-12);
    }

    #[test]
    fn eccentricity_stays_in_unit_interval() {
        let cases = [
            (100.0, 20.0, 50.0),
            (10.0, 0.0, 5.0),
            (1.0, 1.0, 1.0), // circle: e == 0
            (500.0, 5.0, 10.0),
        ];
        for (heading, backing, flanking) in cases {
            let shape = FireShape::new(
                Point::new(0.0, 0.0),
                SpreadDistances {
                    heading,
                    backing,
                    flanking,
                    heading_degrees: 0.0,
                },
                1.0,
            )
            .unwrap();
            let e = shape.eccentricity();
            assert!((0.0..1.0).contains(&e), "e={e} out of [0,1)");
            assert_relative_eq!(shape.beta_factor(0.0), 1.0);
        }
    }

    #[test]
    fn degenerate_shapes_are_rejected() {
        let ign = Point::new(0.0, 0.0);
        let base = reference_spread();

        let zero_heading = SpreadDistances {
            heading: 0.0,
            ..base
        };
        assert!(matches!(
            FireShape::new(ign, zero_heading, 1.0),
            Err(InvalidShapeError::NonPositiveDistance { .. })
        ));

        let zero_flank = SpreadDistances {
            flanking: 0.0,
            ..base
        };
        assert!(matches!(
            FireShape::new(ign, zero_flank, 1.0),
            Err(InvalidShapeError::NonPositiveDistance { .. })
        ));

        let negative_backing = SpreadDistances {
            backing: -1.0,
            ..base
        };
        assert!(matches!(
            FireShape::new(ign, negative_backing, 1.0),
            Err(InvalidShapeError::NegativeBacking { .. })
        ));

        let wide_flank = SpreadDistances {
            flanking: 61.0,
            ..base
        };
        assert!(matches!(
            FireShape::new(ign, wide_flank, 1.0),
            Err(InvalidShapeError::FlankExceedsSemiMajor { .. })
        ));

        assert!(matches!(
            FireShape::new(ign, base, 0.0),
            Err(InvalidShapeError::NonPositiveDuration { .. })
        ));
    }

    #[test]
    fn focus_consistent_shape_backs_out_its_backing_distance() {
        // A 100×50 envelope with ignition at the rear focus: head and backing
        // distances follow from a ± c.
        let a = 50.0;
        let c = 1875.0_f64.sqrt();
        let shape = FireShape::new(
            Point::new(0.0, 0.0),
            SpreadDistances {
                heading: a + c,
                backing: a - c,
                flanking: 25.0,
                heading_degrees: 0.0,
            },
            1.0,
        )
        .unwrap();
        assert_relative_eq!(shape.eccentricity(), 3.0_f64.sqrt() / 2.0, epsilon = 1e-12);
        // Focus-chord relation at 180° recovers the backing distance.
        assert_relative_eq!(shape.beta_distance(180.0), a - c, epsilon = 1e-9);
        // The ignition focus sits at distance c from the center.
        assert_relative_eq!(shape.center().x, c, epsilon = 1e-12);
    }

    #[test]
    fn from_head_rate_matches_distance_construction() {
        // Same scenario as above, expressed as rate + length-to-width ratio.
        let head_rate = 50.0 + 1875.0_f64.sqrt();
        let by_rate =
            FireShape::from_head_rate(Point::new(0.0, 0.0), head_rate, 2.0, 45.0, 1.0).unwrap();
        assert_relative_eq!(by_rate.head_distance(), head_rate, epsilon = 1e-9);
        assert_relative_eq!(by_rate.back_distance(), 50.0 - 1875.0_f64.sqrt(), epsilon = 1e-9);
        assert_relative_eq!(by_rate.flank_distance(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(by_rate.length_to_width_ratio(), 2.0, epsilon = 1e-9);
        assert_relative_eq!(by_rate.head_rate(), head_rate, epsilon = 1e-9);
    }

    #[test]
    fn beta_angle_classifies_directions() {
        let shape = FireShape::new(Point::new(0.0, 0.0), reference_spread(), 1.0).unwrap();
        assert_relative_eq!(shape.beta_angle(shape.head_point()), 0.0, epsilon = 1e-9);
        assert_relative_eq!(shape.beta_angle(shape.back_point()), PI, epsilon = 1e-9);
        // Perpendicular to the 45° heading.
        let side = Point::new(-1.0, 1.0);
        assert_relative_eq!(shape.beta_angle(side), PI / 2.0, epsilon = 1e-9);
        // Undefined at the ignition focus itself.
        assert_relative_eq!(shape.beta_angle(Point::new(0.0, 0.0)), 0.0);
    }

    #[test]
    fn sampled_boundary_points_belong_to_the_shape() {
        let shape = FireShape::new(Point::new(5.0, -3.0), reference_spread(), 1.0).unwrap();
        for i in 0..12 {
            let theta = f64::from(i * 30).to_radians();
            let p = shape.perimeter_point_at(theta);
            assert!(shape.contains_point(p, 0.0));
        }
    }

    #[test]
    fn rates_scale_with_duration() {
        let shape = FireShape::new(Point::new(0.0, 0.0), reference_spread(), 4.0).unwrap();
        assert_relative_eq!(shape.head_rate(), 25.0);
        assert_relative_eq!(shape.back_rate(), 5.0);
        assert_relative_eq!(shape.flank_rate(), 12.5);
        assert_relative_eq!(shape.beta_rate(0.0), 25.0);
    }
}
