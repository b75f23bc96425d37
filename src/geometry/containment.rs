use nalgebra::{Point3, Vector2};

use crate::geometry::oriented_box::OrientedBox;

/// Check whether `point` lies inside `bbox`.
///
/// The point must sit strictly between the lowest and highest corner, and its
/// planar projection must fall inside the quadrilateral spanned by the edges
/// 0→1 and 0→3. Degenerate boxes (zero determinant) never contain a point.
pub fn point_in_box(point: &Point3<f64>, bbox: &OrientedBox) -> bool {
    let (low, high) = bbox.z_range();
    if !(point.z > low && point.z < high) {
        return false;
    }

    let origin = bbox.corner(0);
    let v = planar(point, origin);
    let edge_a = planar(bbox.corner(1), origin);
    let edge_b = planar(bbox.corner(3), origin);

    beyond_point(&v, &edge_a, &edge_b) && beyond_point(&v, &edge_b, &edge_a)
}

/// Intersect the ray from the origin along `v` with the far side of the
/// parallelogram (the line through `along` parallel to `across`). The point is
/// on the inner side when that intersection lies beyond it (`t > 1`) on the
/// positive side of the ray (`s > 0`).
fn beyond_point(v: &Vector2<f64>, along: &Vector2<f64>, across: &Vector2<f64>) -> bool {
    let det = cross(v, across);
    if det == 0.0 || !det.is_finite() {
        return false;
    }
    let t = cross(along, across) / det;
    let s = cross(along, v) / det;
    t > 1.0 && s > 0.0
}

#[inline]
fn planar(p: &Point3<f64>, origin: &Point3<f64>) -> Vector2<f64> {
    Vector2::new(p.x - origin.x, p.y - origin.y)
}

#[inline]
fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}
