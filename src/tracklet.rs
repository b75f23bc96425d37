//! Conversion of tracked boxes into tracklet poses for an external writer.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::OrientedBox;

/// Object class label carried by a tracklet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObjectClass {
    #[default]
    Car,
    Pedestrian,
}

impl ObjectClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Car => "Car",
            Self::Pedestrian => "Pedestrian",
        }
    }
}

/// Box dimensions: length along 0→3, width along 0→1, height along 0→4.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub length: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxSize {
    pub fn new(length: f64, width: f64, height: f64) -> Self {
        Self {
            length,
            width,
            height,
        }
    }

    /// Measure a box.
    pub fn of(bbox: &OrientedBox) -> Self {
        Self::new(bbox.length(), bbox.width(), bbox.height())
    }
}

/// One frame's pose of a tracked object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackletPose {
    pub class: ObjectClass,
    pub frame: u32,
    pub size: BoxSize,
    /// `(c0 + c6) / 2`
    pub center: [f64; 3],
    /// Roll, pitch, yaw; only yaw is ever non-zero
    pub rotation: [f64; 3],
}

impl TrackletPose {
    /// Describe `bbox` as a tracklet pose.
    ///
    /// `fixed_size` overrides the measured dimensions; `no_rotation` forces a
    /// zero yaw.
    pub fn from_box(
        bbox: &OrientedBox,
        frame: u32,
        class: ObjectClass,
        fixed_size: Option<BoxSize>,
        no_rotation: bool,
    ) -> Self {
        let size = fixed_size.unwrap_or_else(|| BoxSize::of(bbox));
        let center = bbox.center();
        let yaw = if no_rotation { 0.0 } else { box_yaw(bbox) };
        Self {
            class,
            frame,
            size,
            center: [center.x, center.y, center.z],
            rotation: [0.0, 0.0, yaw],
        }
    }

    #[inline]
    pub fn yaw(&self) -> f64 {
        self.rotation[2]
    }
}

/// Yaw of the planar 0→1 edge.
///
/// Once normalised, an edge with `|x| < 1e-4` maps to `±π` by the sign of its
/// y-component; a zero-length edge has yaw 0.
pub fn box_yaw(bbox: &OrientedBox) -> f64 {
    let (c0, c1) = (bbox.corner(0), bbox.corner(1));
    let (dx, dy) = (c1.x - c0.x, c1.y - c0.y);
    let norm = dx.hypot(dy);
    if norm == 0.0 || !norm.is_finite() {
        return 0.0;
    }
    let (nx, ny) = (dx / norm, dy / norm);
    if nx.abs() < 1e-4 {
        if ny > 0.0 { PI } else { -PI }
    } else {
        ny.atan2(nx)
    }
}

/// Average the poses of one frame into a single pose.
///
/// Class and frame are taken from the first pose; `None` for an empty slice.
pub fn merge_poses(poses: &[TrackletPose]) -> Option<TrackletPose> {
    let first = poses.first()?;
    let n = poses.len() as f64;

    let mut size = BoxSize::new(0.0, 0.0, 0.0);
    let mut center = [0.0; 3];
    let mut rotation = [0.0; 3];
    for pose in poses {
        size.length += pose.size.length;
        size.width += pose.size.width;
        size.height += pose.size.height;
        for k in 0..3 {
            center[k] += pose.center[k];
            rotation[k] += pose.rotation[k];
        }
    }

    Some(TrackletPose {
        class: first.class,
        frame: first.frame,
        size: BoxSize::new(size.length / n, size.width / n, size.height / n),
        center: center.map(|v| v / n),
        rotation: rotation.map(|v| v / n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_pose_from_box() {
        let center = Point3::new(8.0, -2.0, 0.4);
        let bbox = OrientedBox::from_pose(center, 4.2, 1.8, 1.5, FRAC_PI_2 + 0.3);
        let pose = TrackletPose::from_box(&bbox, 7, ObjectClass::Car, None, false);
        assert_eq!(pose.frame, 7);
        assert!((pose.size.length - 4.2).abs() < 1e-9);
        assert!((pose.size.width - 1.8).abs() < 1e-9);
        assert!((pose.size.height - 1.5).abs() < 1e-9);
        assert!((pose.center[0] - 8.0).abs() < 1e-9);
        assert!((pose.center[1] + 2.0).abs() < 1e-9);
        assert!((pose.center[2] - 0.4).abs() < 1e-9);
        // the 0→1 edge points a quarter turn behind the box heading
        assert!((pose.yaw() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_fixed_size_and_no_rotation() {
        let bbox = OrientedBox::from_pose(Point3::new(0.0, 0.0, 0.0), 4.0, 2.0, 1.0, 1.0);
        let fixed = BoxSize::new(4.5, 1.9, 1.6);
        let pose = TrackletPose::from_box(&bbox, 0, ObjectClass::Pedestrian, Some(fixed), true);
        assert_eq!(pose.size, fixed);
        assert_eq!(pose.yaw(), 0.0);
        assert_eq!(pose.class.label(), "Pedestrian");
    }

    #[test]
    fn test_vertical_edge_falls_back_to_pi() {
        // yaw 0 puts the 0→1 edge along -y
        let bbox = OrientedBox::from_pose(Point3::new(0.0, 0.0, 0.0), 4.0, 2.0, 1.0, 0.0);
        assert_eq!(box_yaw(&bbox), -PI);
        let flipped = OrientedBox::from_pose(Point3::new(0.0, 0.0, 0.0), 4.0, 2.0, 1.0, PI);
        assert_eq!(box_yaw(&flipped), PI);
    }

    #[test]
    fn test_merge_poses() {
        assert!(merge_poses(&[]).is_none());

        let a = TrackletPose {
            class: ObjectClass::Car,
            frame: 3,
            size: BoxSize::new(4.0, 2.0, 1.0),
            center: [0.0, 0.0, 0.0],
            rotation: [0.0, 0.0, 0.2],
        };
        let b = TrackletPose {
            frame: 9,
            size: BoxSize::new(5.0, 1.0, 2.0),
            center: [2.0, 4.0, 1.0],
            rotation: [0.0, 0.0, 0.4],
            ..a.clone()
        };
        let merged = merge_poses(&[a, b]).unwrap();
        assert_eq!(merged.frame, 3);
        assert_eq!(merged.size, BoxSize::new(4.5, 1.5, 1.5));
        assert_eq!(merged.center, [1.0, 2.0, 0.5]);
        assert!((merged.yaw() - 0.3).abs() < 1e-12);
    }
}
