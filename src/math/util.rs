use super::{Point2d, Vector2d, EARTH_RADIUS};
use cgmath::prelude::*;

/// Projects a point into a local planar coordinate system centred on `origin`,
/// using an equirectangular approximation.
///
/// # Returns
/// The offset from `origin` to `point`, in metres east (x) and north (y).
pub fn to_local(point: Point2d, origin: Point2d) -> Vector2d {
    let scale_x = origin.y.to_radians().cos();
    Vector2d::new(
        (point.x - origin.x).to_radians() * EARTH_RADIUS * scale_x,
        (point.y - origin.y).to_radians() * EARTH_RADIUS,
    )
}

/// The inverse of [to_local]: offsets `origin` by a vector in metres.
pub fn from_local(origin: Point2d, offset: Vector2d) -> Point2d {
    let scale_x = origin.y.to_radians().cos().max(1e-9);
    Point2d::new(
        origin.x + (offset.x / (EARTH_RADIUS * scale_x)).to_degrees(),
        origin.y + (offset.y / EARTH_RADIUS).to_degrees(),
    )
}

/// The approximate distance between two points in m.
pub fn distance(a: Point2d, b: Point2d) -> f64 {
    to_local(b, a).magnitude()
}

/// Linearly interpolates between two points.
pub fn lerp(a: Point2d, b: Point2d, t: f64) -> Point2d {
    a + (b - a) * t
}

/// Projects a point onto the line segment from `a` to `b`, clamping to the ends.
///
/// # Returns
/// A tuple containing the fraction `t` in `[0, 1]` along the segment,
/// the projected point, and the distance in m from `point` to the projection.
pub fn project_onto_segment(point: Point2d, a: Point2d, b: Point2d) -> (f64, Point2d, f64) {
    let ab = to_local(b, a);
    let ap = to_local(point, a);
    let len2 = ab.magnitude2();
    let t = if len2 > 0.0 {
        (ap.dot(ab) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dist = (ap - ab * t).magnitude();
    (t, lerp(a, b, t), dist)
}
