//! Decoding of per-cell model outputs into candidate boxes.

use nalgebra::Point3;
use ndarray::{Array3, s};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{
    OrientedBox, RegressionTarget, TARGET_CHANNELS, decode_with_yaw, reference_yaw,
};

/// Grid rows of the reference range-image projection.
pub const GRID_ROWS: usize = 64;
/// Grid columns of the reference range-image projection.
pub const GRID_COLS: usize = 256;

/// A grid cell together with the LiDAR point projected into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectedCell {
    pub row: usize,
    pub col: usize,
    pub point: Point3<f64>,
    /// Planar yaw of `point`, `atan2(-y, x)`
    pub yaw: f64,
}

impl ProjectedCell {
    pub fn new(row: usize, col: usize, point: Point3<f64>) -> Self {
        Self {
            row,
            col,
            point,
            yaw: reference_yaw(&point),
        }
    }
}

/// One projected LiDAR sweep: the model input grid and the occupied cells.
#[derive(Debug, Clone)]
pub struct ProjectedFrame {
    /// `[rows, cols, 2]` input tensor
    pub grid: Array3<f32>,
    pub cells: Vec<ProjectedCell>,
}

impl ProjectedFrame {
    pub fn new(grid: Array3<f32>, cells: Vec<ProjectedCell>) -> Self {
        Self { grid, cells }
    }
}

/// Turns model outputs into candidate boxes for every cell above `seg_thres`.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    seg_thres: f32,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl FrameDecoder {
    pub fn new(seg_thres: f32) -> Self {
        Self { seg_thres }
    }

    pub fn seg_thres(&self) -> f32 {
        self.seg_thres
    }

    /// Decode every projected cell whose occupancy exceeds the threshold.
    ///
    /// Cells outside the output grid are skipped.
    pub fn decode(
        &self,
        outputs: &Array3<f32>,
        cells: &[ProjectedCell],
    ) -> Result<Vec<OrientedBox>> {
        let (rows, cols, channels) = outputs.dim();
        if channels < TARGET_CHANNELS {
            return Err(Error::GridShape {
                expected: [rows, cols, TARGET_CHANNELS],
                got: [rows, cols, channels],
            });
        }

        let mut boxes = Vec::new();
        for cell in cells {
            if cell.row >= rows || cell.col >= cols {
                warn!(
                    row = cell.row,
                    col = cell.col,
                    rows,
                    cols,
                    "projected cell outside the output grid"
                );
                continue;
            }
            let lane = outputs.slice(s![cell.row, cell.col, ..TARGET_CHANNELS]);
            let occupancy = lane[0];
            if occupancy.is_nan() || occupancy <= self.seg_thres {
                continue;
            }
            let mut values = [0.0; TARGET_CHANNELS];
            for (dst, &v) in values.iter_mut().zip(lane.iter()) {
                *dst = f64::from(v);
            }
            let target = RegressionTarget::from_channels(&values);
            boxes.push(decode_with_yaw(&cell.point, cell.yaw, &target));
        }

        debug!(cells = cells.len(), candidates = boxes.len(), "decoded frame");
        Ok(boxes)
    }
}
