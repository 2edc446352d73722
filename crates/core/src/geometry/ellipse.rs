//! Rotated-ellipse value type with containment and perimeter sampling.
//!
//! All fire shapes in the wavelet model reduce to this type: an ellipse with
//! its major axis rotated `angle` radians counter-clockwise from the +x axis.
//! That single angle convention is fixed here and used everywhere else in the
//! crate; heading directions expressed in degrees are converted once, at the
//! system boundary.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use super::point::Point;

/// Roundoff allowance in the containment test so that points produced by
/// [`Ellipse::perimeter_point_at`] still count as contained at `buffer = 0`
/// after the trig round trip. Well below any meaningful containment buffer.
const CONTAINMENT_SLACK: f64 = 1e-12;

/// An ellipse with center, semi-axes, and major-axis rotation.
///
/// Immutable once constructed. Invariants (enforced by [`Ellipse::new`] in
/// debug builds, guaranteed by the validated `FireShape` constructor in the
/// normal code path):
///
/// - `semi_major > 0`
/// - `semi_minor > 0`
/// - `semi_minor <= semi_major`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ellipse {
    center: Point,
    semi_major: f64,
    semi_minor: f64,
    angle: f64,
}

impl Ellipse {
    /// Create an ellipse from its center, semi-axes, and rotation (radians,
    /// counter-clockwise from the +x axis).
    #[must_use]
    pub fn new(center: Point, semi_major: f64, semi_minor: f64, angle: f64) -> Self {
        debug_assert!(semi_major > 0.0 && semi_minor > 0.0);
        debug_assert!(semi_minor <= semi_major);
        Ellipse {
            center,
            semi_major,
            semi_minor,
            angle,
        }
    }

    /// Center point.
    pub fn center(&self) -> Point {
        self.center
    }

    /// Semi-major axis length.
    pub fn semi_major(&self) -> f64 {
        self.semi_major
    }

    /// Semi-minor axis length.
    pub fn semi_minor(&self) -> f64 {
        self.semi_minor
    }

    /// Major-axis rotation in radians, counter-clockwise from the +x axis.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Returns true if `point` lies within the ellipse boundary by at least
    /// the `buffer` amount.
    ///
    /// The point is transformed into the ellipse's local unrotated frame and
    /// tested against the normalized quadratic form:
    ///
    /// ```text
    /// (x'/a)² + (y'/b)² <= 1 - buffer
    /// ```
    ///
    /// `buffer` must be in `[0, 1)` and shrinks the effective boundary inward,
    /// so that perimeter points generated from this very ellipse are not
    /// reported as contained due to floating-point roundoff in the trig round
    /// trip. With `buffer == 0`, points exactly on the boundary count as
    /// contained.
    pub fn contains_point(&self, point: Point, buffer: f64) -> bool {
        debug_assert!((0.0..1.0).contains(&buffer));
        let (sin_a, cos_a) = self.angle.sin_cos();
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        // Inverse rotation into the unrotated frame.
        let local_x = (cos_a * dx + sin_a * dy) / self.semi_major;
        let local_y = (-sin_a * dx + cos_a * dy) / self.semi_minor;
        local_x * local_x + local_y * local_y <= 1.0 - buffer + CONTAINMENT_SLACK
    }

    /// The perimeter point at parametric angle `theta` (radians).
    ///
    /// `theta` sweeps the standard rotated-ellipse parametric form:
    ///
    /// ```text
    /// x = a·cosθ·cosφ − b·sinθ·sinφ + cx
    /// y = a·cosθ·sinφ + b·sinθ·cosφ + cy
    /// ```
    ///
    /// where `φ` is the ellipse rotation. `theta` is NOT the polar angle from
    /// the center (the two differ on a non-circular ellipse); callers sampling
    /// the boundary sweep the parameter uniformly, not true angular position.
    #[must_use]
    pub fn perimeter_point_at(&self, theta: f64) -> Point {
        let (sin_t, cos_t) = theta.sin_cos();
        let (sin_a, cos_a) = self.angle.sin_cos();
        let x = self.semi_major * cos_t * cos_a - self.semi_minor * sin_t * sin_a + self.center.x;
        let y = self.semi_major * cos_t * sin_a + self.semi_minor * sin_t * cos_a + self.center.y;
        Point::new(x, y)
    }

    /// Perimeter length via Ramanujan's second approximation.
    ///
    /// ```text
    /// m = (a−b)/(a+b)
    /// P ≈ π(a+b)·(1 + m²/4 + m⁴/64)
    /// ```
    ///
    /// Accurate to a few parts per million for fire-shape eccentricities; the
    /// exact closed form is an elliptic integral and deliberately avoided.
    ///
    /// # References
    /// - Ramanujan, S. (1914). "Modular equations and approximations to π."
    ///   Quarterly Journal of Mathematics, 45, 350-372.
    pub fn perimeter(&self) -> f64 {
        let m = (self.semi_major - self.semi_minor) / (self.semi_major + self.semi_minor);
        let k = 1.0 + m * m / 4.0 + m.powi(4) / 64.0;
        PI * (self.semi_major + self.semi_minor) * k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::point::rotate_about;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, TAU};

    #[test]
    fn axis_vertices_of_unrotated_ellipse() {
        let e = Ellipse::new(Point::new(3.0, -2.0), 5.0, 2.0, 0.0);
        let cases = [
            (0.0, Point::new(8.0, -2.0)),
            (FRAC_PI_2, Point::new(3.0, 0.0)),
            (PI, Point::new(-2.0, -2.0)),
            (3.0 * FRAC_PI_2, Point::new(3.0, -4.0)),
        ];
        for (theta, expected) in cases {
            let p = e.perimeter_point_at(theta);
            assert_relative_eq!(p.x, expected.x, epsilon = 1e-12);
            assert_relative_eq!(p.y, expected.y, epsilon = 1e-12);
        }
    }

    #[test]
    fn boundary_points_belong_to_their_own_ellipse() {
        let e = Ellipse::new(Point::new(10.0, 20.0), 60.0, 50.0, 0.7);
        for i in 0..360 {
            let theta = f64::from(i).to_radians();
            let p = e.perimeter_point_at(theta);
            assert!(
                e.contains_point(p, 0.0),
                "perimeter point at theta={theta} escaped its own boundary"
            );
        }
    }

    #[test]
    fn buffer_excludes_boundary_points() {
        let e = Ellipse::new(Point::new(0.0, 0.0), 4.0, 2.0, 0.0);
        let p = e.perimeter_point_at(0.3);
        assert!(e.contains_point(p, 0.0));
        assert!(!e.contains_point(p, 1e-6));
        // A clearly interior point survives the buffer.
        assert!(e.contains_point(Point::new(0.5, 0.5), 1e-6));
    }

    #[test]
    fn containment_is_rotation_invariant() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let center = Point::new(-4.0, 7.5);
        for _ in 0..200 {
            let a = rng.random_range(1.0..50.0);
            let b = rng.random_range(0.1..1.0) * a;
            let angle = rng.random_range(0.0..TAU);
            let extra = rng.random_range(0.0..TAU);
            let base = Ellipse::new(center, a, b, angle);
            let rotated = Ellipse::new(center, a, b, angle + extra);
            let query = Point::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0));
            let rotated_query = rotate_about(query, center, extra);
            assert_eq!(
                base.contains_point(query, 0.0),
                rotated.contains_point(rotated_query, 0.0),
                "rotation by {extra} changed containment of {query:?}"
            );
        }
    }

    #[test]
    fn perimeter_of_circle_matches_closed_form() {
        let e = Ellipse::new(Point::new(0.0, 0.0), 7.0, 7.0, 0.0);
        assert_relative_eq!(e.perimeter(), TAU * 7.0, epsilon = 1e-9);
    }

    #[test]
    fn perimeter_approximation_close_to_numeric_arc_length() {
        let e = Ellipse::new(Point::new(0.0, 0.0), 60.0, 50.0, 0.0);
        // Numeric arc length by fine polyline sampling.
        let n = 100_000;
        let mut length = 0.0;
        let mut prev = e.perimeter_point_at(0.0);
        for i in 1..=n {
            let theta = TAU * f64::from(i) / f64::from(n);
            let p = e.perimeter_point_at(theta);
            length += crate::geometry::point::distance(prev, p);
            prev = p;
        }
        assert_relative_eq!(e.perimeter(), length, max_relative = 1e-5);
    }
}
