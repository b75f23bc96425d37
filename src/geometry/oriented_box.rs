use nalgebra::{Point2, Point3, Vector2};

/// Number of corners in an [`OrientedBox`].
pub const CORNER_COUNT: usize = 8;

/// Oriented 3D bounding box stored as its eight corners.
///
/// Corner ordering:
/// - 0..=3 form the front rectangle, 4..=7 the back rectangle
/// - (0,1),(1,2),(2,3),(3,0) and (4,5),(5,6),(6,7),(7,4) are the end faces
/// - (0,4),(1,5),(2,6),(3,7) are the connecting edges
///
/// Corner 6 is diagonally opposite corner 0. Boxes built with
/// [`OrientedBox::from_pose`] keep the length along 0→3, the width along 0→1
/// and the height along 0→4.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBox {
    corners: [Point3<f64>; CORNER_COUNT],
}

impl OrientedBox {
    /// Create a box from its corners in the canonical order.
    #[inline]
    pub fn new(corners: [Point3<f64>; CORNER_COUNT]) -> Self {
        Self { corners }
    }

    /// Create an upright box from its center, dimensions and yaw (counter-clockwise
    /// about +z).
    pub fn from_pose(center: Point3<f64>, length: f64, width: f64, height: f64, yaw: f64) -> Self {
        let (hl, hw, hh) = (length / 2.0, width / 2.0, height / 2.0);
        let local = [
            (-hl, hw, -hh),
            (-hl, -hw, -hh),
            (hl, -hw, -hh),
            (hl, hw, -hh),
            (-hl, hw, hh),
            (-hl, -hw, hh),
            (hl, -hw, hh),
            (hl, hw, hh),
        ];
        let (sin, cos) = yaw.sin_cos();
        let corners = local.map(|(x, y, z)| {
            Point3::new(
                center.x + cos * x - sin * y,
                center.y + sin * x + cos * y,
                center.z + z,
            )
        });
        Self { corners }
    }

    /// Create a box from its 24 flattened corner coordinates.
    pub fn from_flat(values: &[f64; CORNER_COUNT * 3]) -> Self {
        let corners = std::array::from_fn(|i| {
            Point3::new(values[3 * i], values[3 * i + 1], values[3 * i + 2])
        });
        Self { corners }
    }

    #[inline]
    pub fn corners(&self) -> &[Point3<f64>; CORNER_COUNT] {
        &self.corners
    }

    /// Get a single corner. Panics if `index >= 8`.
    #[inline]
    pub fn corner(&self, index: usize) -> &Point3<f64> {
        &self.corners[index]
    }

    /// Flatten to `[x0, y0, z0, x1, ...]`.
    pub fn flatten(&self) -> [f64; CORNER_COUNT * 3] {
        let mut flat = [0.0; CORNER_COUNT * 3];
        for (chunk, corner) in flat.chunks_exact_mut(3).zip(self.corners.iter()) {
            chunk.copy_from_slice(&[corner.x, corner.y, corner.z]);
        }
        flat
    }

    /// Euclidean distance between two boxes over all 24 corner coordinates.
    pub fn distance(&self, other: &OrientedBox) -> f64 {
        self.corners
            .iter()
            .zip(other.corners.iter())
            .map(|(a, b)| (a - b).norm_squared())
            .sum::<f64>()
            .sqrt()
    }

    /// Shift every corner in the xy-plane by `offset`; heights are unchanged.
    pub fn translated_planar(&self, offset: &Vector2<f64>) -> Self {
        let corners = self
            .corners
            .map(|c| Point3::new(c.x + offset.x, c.y + offset.y, c.z));
        Self { corners }
    }

    /// Planar position proxy used for velocity estimation: the midpoint of
    /// corners 1 and 2.
    ///
    /// Seeding, matching and velocity computation all go through this one
    /// function so the anchor stays consistent across a track.
    #[inline]
    pub fn tracking_anchor(&self) -> Point2<f64> {
        let (a, b) = (&self.corners[1], &self.corners[2]);
        Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }

    /// Midpoint of the diagonal between corners 0 and 6.
    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.corners[0], &self.corners[6])
    }

    /// Planar length of the 0→3 edge.
    pub fn length(&self) -> f64 {
        planar_distance(&self.corners[0], &self.corners[3])
    }

    /// Planar length of the 0→1 edge.
    pub fn width(&self) -> f64 {
        planar_distance(&self.corners[0], &self.corners[1])
    }

    /// Height offset between the back and front faces at corner 0.
    pub fn height(&self) -> f64 {
        self.corners[4].z - self.corners[0].z
    }

    /// Lowest and highest corner z.
    pub fn z_range(&self) -> (f64, f64) {
        self.corners
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), c| {
                (low.min(c.z), high.max(c.z))
            })
    }

    pub fn is_finite(&self) -> bool {
        self.corners
            .iter()
            .all(|c| c.x.is_finite() && c.y.is_finite() && c.z.is_finite())
    }
}

#[inline]
pub(crate) fn planar_distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> OrientedBox {
        OrientedBox::from_pose(Point3::new(10.0, -3.0, 0.5), 4.0, 2.0, 1.5, 0.4)
    }

    #[test]
    fn test_from_pose_dimensions() {
        let b = sample();
        assert!((b.length() - 4.0).abs() < 1e-9);
        assert!((b.width() - 2.0).abs() < 1e-9);
        assert!((b.height() - 1.5).abs() < 1e-9);
        let center = b.center();
        assert!((center - Point3::new(10.0, -3.0, 0.5)).norm() < 1e-9);
    }

    #[test]
    fn test_parallelogram_identities() {
        let b = sample();
        let c = b.corners();
        assert!(((c[0] - c[1]) - (c[3] - c[2])).norm() < 1e-9);
        assert!(((c[4] - c[0]) - (c[6] - c[2])).norm() < 1e-9);
        assert!(((c[5] - c[1]) - (c[4] - c[0])).norm() < 1e-9);
        assert!(((c[7] - c[4]) - (c[6] - c[5])).norm() < 1e-9);
    }

    #[test]
    fn test_flatten_roundtrip() {
        let b = sample();
        assert_eq!(OrientedBox::from_flat(&b.flatten()), b);
        assert_eq!(b.flatten()[3], b.corner(1).x);
    }

    #[test]
    fn test_distance() {
        let b = sample();
        assert_eq!(b.distance(&b), 0.0);
        // every corner moves by 1 in x: sqrt(8 * 1)
        let moved = b.translated_planar(&Vector2::new(1.0, 0.0));
        assert!((b.distance(&moved) - 8.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_translation_keeps_heights() {
        let b = sample();
        let moved = b.translated_planar(&Vector2::new(2.0, -1.0));
        for (a, m) in b.corners().iter().zip(moved.corners().iter()) {
            assert_eq!(a.z, m.z);
            assert!((m.x - a.x - 2.0).abs() < 1e-12);
            assert!((m.y - a.y + 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_tracking_anchor() {
        let b = OrientedBox::from_pose(Point3::new(5.0, 1.0, 0.0), 4.0, 2.0, 1.0, 0.0);
        // corners 1 and 2 sit on the y = center.y - width / 2 edge
        assert_eq!(b.tracking_anchor(), Point2::new(5.0, 0.0));
    }

    #[test]
    fn test_z_range_and_finite() {
        let b = sample();
        let (low, high) = b.z_range();
        assert!((low + 0.25).abs() < 1e-9);
        assert!((high - 1.25).abs() < 1e-9);
        assert!(b.is_finite());

        let mut flat = b.flatten();
        flat[5] = f64::NAN;
        assert!(!OrientedBox::from_flat(&flat).is_finite());
    }
}
