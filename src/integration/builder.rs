//! Builder for creating oriented boxes from a pose description.

use nalgebra::Point3;

use crate::geometry::OrientedBox;

/// Builder for creating `OrientedBox` values from center, size and yaw.
#[derive(Debug, Clone, Default)]
pub struct OrientedBoxBuilder {
    cx: f64,
    cy: f64,
    cz: f64,
    length: f64,
    width: f64,
    height: f64,
    yaw: f64,
}

impl OrientedBoxBuilder {
    /// Create a new box builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the box center.
    pub fn center(mut self, x: f64, y: f64, z: f64) -> Self {
        self.cx = x;
        self.cy = y;
        self.cz = z;
        self
    }

    /// Set the box dimensions (length, width, height).
    pub fn size(mut self, length: f64, width: f64, height: f64) -> Self {
        self.length = length;
        self.width = width;
        self.height = height;
        self
    }

    /// Place the box so that its tracking anchor lands on `(x, y)`.
    ///
    /// Uses the current width and yaw, so call it after [`size`](Self::size)
    /// and [`yaw`](Self::yaw).
    pub fn anchor(mut self, x: f64, y: f64, z: f64) -> Self {
        let (sin, cos) = self.yaw.sin_cos();
        let half = self.width / 2.0;
        self.cx = x - sin * half;
        self.cy = y + cos * half;
        self.cz = z;
        self
    }

    /// Set the yaw angle (counter-clockwise about +z).
    pub fn yaw(mut self, yaw: f64) -> Self {
        self.yaw = yaw;
        self
    }

    /// Build the final `OrientedBox`.
    pub fn build(self) -> OrientedBox {
        OrientedBox::from_pose(
            Point3::new(self.cx, self.cy, self.cz),
            self.length,
            self.width,
            self.height,
            self.yaw,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_box_builder() {
        let bbox = OrientedBoxBuilder::new()
            .center(1.0, 2.0, 0.5)
            .size(4.0, 2.0, 1.5)
            .build();

        assert!((bbox.length() - 4.0).abs() < 1e-12);
        assert_eq!(bbox.center(), Point3::new(1.0, 2.0, 0.5));
    }

    #[test]
    fn test_anchor_placement() {
        let bbox = OrientedBoxBuilder::new()
            .size(4.0, 2.0, 1.5)
            .yaw(0.7)
            .anchor(3.0, -1.0, 0.0)
            .build();

        let anchor = bbox.tracking_anchor();
        assert!((anchor.x - 3.0).abs() < 1e-9);
        assert!((anchor.y + 1.0).abs() < 1e-9);
    }
}
