//! Planar point and vector aliases with rotation helpers.

use nalgebra::{Point2, Rotation2, Vector2};

/// 2D point type for ignition locations, ellipse centers, and boundary points.
///
/// This is a simple alias for `nalgebra::Point2<f64>`, used throughout the
/// simulation. `f64` is deliberate: the containment buffer (default 1e-8) sits
/// below `f32` epsilon, and perimeter growth compounds trigonometric round
/// trips across many steps.
pub type Point = Point2<f64>;

/// 2D vector type for offsets and directions.
pub type Vec2 = Vector2<f64>;

/// Rotate `point` around `pivot` by `radians` (counter-clockwise).
#[must_use]
pub fn rotate_about(point: Point, pivot: Point, radians: f64) -> Point {
    pivot + Rotation2::new(radians) * (point - pivot)
}

/// The point reached by travelling `distance` from `origin` at `radians`
/// (counter-clockwise from the +x axis).
#[must_use]
pub fn project(origin: Point, radians: f64, distance: f64) -> Point {
    origin + Vec2::new(radians.cos(), radians.sin()) * distance
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    nalgebra::distance(&a, &b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn rotate_quarter_turn() {
        let p = rotate_about(Point::new(1.0, 0.0), Point::new(0.0, 0.0), FRAC_PI_2);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn rotate_about_offset_pivot() {
        let p = rotate_about(Point::new(2.0, 1.0), Point::new(1.0, 1.0), PI);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn project_along_axes() {
        let east = project(Point::new(1.0, 2.0), 0.0, 3.0);
        assert_relative_eq!(east.x, 4.0);
        assert_relative_eq!(east.y, 2.0);

        let north = project(Point::new(0.0, 0.0), FRAC_PI_2, 5.0);
        assert_relative_eq!(north.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(north.y, 5.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_relative_eq!(distance(a, b), 5.0);
        assert_relative_eq!(distance(b, a), 5.0);
    }
}
