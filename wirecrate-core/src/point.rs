//! Point types and related functionality

use nalgebra::{Point2, Point3, Vector3};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 2D point with double precision coordinates, used for in-plane profiles
pub type Point2d = Point2<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// Check that every coordinate of a point is finite
pub fn is_finite_point(point: &Point3d) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}
