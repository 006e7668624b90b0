//! Mathematical structs and functions.

use cgmath::{Point2, Vector2};
pub use util::*;

mod util;

/// A 2D point. `x` is the longitude and `y` the latitude, both in degrees.
pub type Point2d = Point2<f64>;

/// A 2D vector, in metres when produced by [to_local].
pub type Vector2d = Vector2<f64>;

/// The radius of the earth used by the flat-earth approximation, in m.
pub const EARTH_RADIUS: f64 = 6_371_000.0; // m
