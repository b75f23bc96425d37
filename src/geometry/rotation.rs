use nalgebra::{Point3, Vector3};

/// Rotate `v` in the xy-plane by `angle` radians, leaving z untouched.
///
/// Follows the sensor convention `x' = cos·x + sin·y`, `y' = -sin·x + cos·y`,
/// so `rotate(a, &rotate(-a, &v)) == v`.
#[inline]
pub fn rotate(angle: f64, v: &Vector3<f64>) -> Vector3<f64> {
    let (sin, cos) = angle.sin_cos();
    Vector3::new(cos * v.x + sin * v.y, -sin * v.x + cos * v.y, v.z)
}

/// Planar yaw of a reference point as seen from the sensor, `atan2(-y, x)`.
#[inline]
pub fn reference_yaw(point: &Point3<f64>) -> f64 {
    (-point.y).atan2(point.x)
}
