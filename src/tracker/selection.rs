//! Choice among several acceptable candidates in one frame.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::geometry::OrientedBox;

/// Policy used when more than one candidate is available in a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Take the first candidate in input order
    #[default]
    First,
    /// Take the candidate whose tracking anchor is closest to the dead-reckoned
    /// anchor; falls back to the first candidate before any motion is known
    NearestToPrediction,
}

impl SelectionPolicy {
    /// Index of the chosen candidate, `None` only when `candidates` is empty.
    pub fn select(
        &self,
        candidates: &[OrientedBox],
        predicted: Option<Point2<f64>>,
    ) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        match (self, predicted) {
            (Self::NearestToPrediction, Some(target)) => candidates
                .iter()
                .map(|c| (c.tracking_anchor() - target).norm())
                .enumerate()
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i),
            _ => Some(0),
        }
    }
}
