//! Point-relative box encoding used by the range-image detection model.

use nalgebra::{Point3, Vector3};
use ndarray::Array2;

use crate::geometry::containment::point_in_box;
use crate::geometry::oriented_box::{OrientedBox, planar_distance};
use crate::geometry::rotation::{reference_yaw, rotate};

/// Number of channels in a per-cell regression target.
pub const TARGET_CHANNELS: usize = 8;

/// Per-cell regression target.
///
/// Channel order as produced by the model:
/// `[occupancy, u0.x, u0.y, u0.z, u6.x, u6.y, u6.z, shear]` where `u0`/`u6`
/// are the offsets from the cell's reference point to corners 0 and 6, rotated
/// into the reference point's yaw frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegressionTarget {
    /// 1 when the reference point lies inside a box, 0 otherwise
    pub occupancy: f64,
    /// Rotated offset from the reference point to corner 0
    pub to_front: Vector3<f64>,
    /// Rotated offset from the reference point to corner 6
    pub to_back: Vector3<f64>,
    /// `asin(|edge_12| / |edge_02|)`
    pub shear: f64,
}

impl Default for RegressionTarget {
    fn default() -> Self {
        Self::empty()
    }
}

impl RegressionTarget {
    /// Target of a point that belongs to no box.
    pub fn empty() -> Self {
        Self {
            occupancy: 0.0,
            to_front: Vector3::zeros(),
            to_back: Vector3::zeros(),
            shear: 0.0,
        }
    }

    #[inline]
    pub fn is_occupied(&self) -> bool {
        self.occupancy > 0.0
    }

    pub fn from_channels(values: &[f64; TARGET_CHANNELS]) -> Self {
        Self {
            occupancy: values[0],
            to_front: Vector3::new(values[1], values[2], values[3]),
            to_back: Vector3::new(values[4], values[5], values[6]),
            shear: values[7],
        }
    }

    pub fn to_channels(&self) -> [f64; TARGET_CHANNELS] {
        [
            self.occupancy,
            self.to_front.x,
            self.to_front.y,
            self.to_front.z,
            self.to_back.x,
            self.to_back.y,
            self.to_back.z,
            self.shear,
        ]
    }
}

/// Reconstruct a box from a reference point and its regression target.
///
/// The yaw frame is recovered from the reference point itself.
pub fn decode(reference: &Point3<f64>, target: &RegressionTarget) -> OrientedBox {
    decode_with_yaw(reference, reference_yaw(reference), target)
}

/// Reconstruct a box from a reference point, its yaw and a regression target.
///
/// Corners 0 and 6 come straight from the target; corner 2 takes corner 6's
/// planar position at corner 0's height; corner 1 follows from the shear
/// angle; the rest are parallelogram completions. The result is only a true
/// cuboid when the target is self-consistent; nothing is validated.
pub fn decode_with_yaw(
    reference: &Point3<f64>,
    yaw: f64,
    target: &RegressionTarget,
) -> OrientedBox {
    let c0 = *reference - rotate(yaw, &target.to_front);
    let c6 = *reference - rotate(yaw, &target.to_back);
    let c2 = Point3::new(c6.x, c6.y, c0.z);

    let phi = target.shear;
    let edge = rotate(phi, &(c2 - c0)) * phi.cos();
    let c1 = Point3::new(c0.x + edge.x, c0.y + edge.y, c0.z);

    let c3 = c0 + (c2 - c1);
    let c4 = c0 + (c6 - c2);
    let c5 = c1 + (c4 - c0);
    let c7 = c4 + (c6 - c5);

    OrientedBox::new([c0, c1, c2, c3, c4, c5, c6, c7])
}

/// Index of the first box in `boxes` containing `point`.
pub fn containing_box(point: &Point3<f64>, boxes: &[OrientedBox]) -> Option<usize> {
    boxes.iter().position(|b| point_in_box(point, b))
}

/// Encode `point` against the first box that contains it, or return the empty
/// target when none does.
pub fn encode(point: &Point3<f64>, boxes: &[OrientedBox]) -> RegressionTarget {
    match containing_box(point, boxes) {
        Some(index) => encode_in(point, &boxes[index]),
        None => RegressionTarget::empty(),
    }
}

/// Encode a batch of points into an `N x 8` target matrix.
pub fn encode_points(points: &[Point3<f64>], boxes: &[OrientedBox]) -> Array2<f64> {
    let mut targets = Array2::zeros((points.len(), TARGET_CHANNELS));
    for (mut row, point) in targets.rows_mut().into_iter().zip(points) {
        for (dst, value) in row.iter_mut().zip(encode(point, boxes).to_channels()) {
            *dst = value;
        }
    }
    targets
}

fn encode_in(point: &Point3<f64>, bbox: &OrientedBox) -> RegressionTarget {
    let yaw = reference_yaw(point);
    RegressionTarget {
        occupancy: 1.0,
        to_front: rotate(-yaw, &(point - bbox.corner(0))),
        to_back: rotate(-yaw, &(point - bbox.corner(6))),
        shear: shear_angle(bbox),
    }
}

/// Shear angle of a box, `asin(|edge_12| / |edge_02|)`.
///
/// The ratio is clamped to `[-1, 1]`; a zero-length or non-finite diagonal
/// gives `0`.
fn shear_angle(bbox: &OrientedBox) -> f64 {
    let edge = planar_distance(bbox.corner(1), bbox.corner(2));
    let diagonal = planar_distance(bbox.corner(0), bbox.corner(2));
    let ratio = edge / diagonal;
    if diagonal == 0.0 || !ratio.is_finite() {
        return 0.0;
    }
    ratio.clamp(-1.0, 1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn car() -> OrientedBox {
        OrientedBox::from_pose(Point3::new(12.0, 4.0, -0.8), 4.5, 1.9, 1.6, 0.6)
    }

    #[test]
    fn test_decode_recovers_all_corners() {
        let bbox = car();
        let point = Point3::new(12.3, 3.8, -0.5);
        let target = encode(&point, &[bbox]);
        assert!(target.is_occupied());

        let decoded = decode(&point, &target);
        for (a, b) in decoded.corners().iter().zip(bbox.corners()) {
            assert!((a - b).norm() < 1e-9, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_decoded_box_is_parallelogram() {
        let target = RegressionTarget::from_channels(&[1.0, 0.4, -1.1, 0.3, -2.0, 1.2, -1.0, 0.7]);
        let b = decode(&Point3::new(5.0, 5.0, 0.0), &target);
        let c = b.corners();
        assert_eq!(c[3], c[0] + (c[2] - c[1]));
        assert_eq!(c[4], c[0] + (c[6] - c[2]));
        assert_eq!(c[5], c[1] + (c[4] - c[0]));
        assert_eq!(c[7], c[4] + (c[6] - c[5]));
        assert_eq!(c[1].z, c[0].z);
        assert_eq!(c[2].z, c[0].z);
    }

    #[test]
    fn test_encode_outside_is_empty() {
        let target = encode(&Point3::new(0.0, 0.0, 0.0), &[car()]);
        assert_eq!(target, RegressionTarget::empty());
        assert!(!target.is_occupied());
    }

    #[test]
    fn test_first_containing_box_wins() {
        let a = car();
        let b = OrientedBox::from_pose(Point3::new(12.0, 4.0, -0.8), 10.0, 10.0, 3.0, 0.0);
        let point = Point3::new(12.0, 4.0, -0.8);
        assert_eq!(containing_box(&point, &[a, b]), Some(0));
        assert_eq!(containing_box(&point, &[b, a]), Some(0));
        assert_eq!(containing_box(&Point3::new(15.5, 4.0, -0.8), &[a, b]), Some(1));
    }

    #[test]
    fn test_encode_points_rows() {
        let points = [Point3::new(12.0, 4.0, -0.8), Point3::new(-5.0, 0.0, 0.0)];
        let targets = encode_points(&points, &[car()]);
        assert_eq!(targets.dim(), (2, TARGET_CHANNELS));
        assert_eq!(targets[[0, 0]], 1.0);
        assert!(targets.row(1).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_shear_angle_degenerate() {
        let collapsed = OrientedBox::from_pose(Point3::new(1.0, 1.0, 0.0), 0.0, 0.0, 1.0, 0.0);
        assert_eq!(shear_angle(&collapsed), 0.0);

        let bbox = car();
        let expected = (4.5 / 4.5_f64.hypot(1.9)).asin();
        assert!((shear_angle(&bbox) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_channels_roundtrip() {
        let values = [1.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
        assert_eq!(RegressionTarget::from_channels(&values).to_channels(), values);
    }
}
