//! Greedy density-based clustering of raw box proposals.

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{Error, Result};
use crate::geometry::OrientedBox;

/// Configuration for the [`GreedyDensityClusterer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// Skip clustering and pass raw proposals through
    pub enabled: bool,
    /// Two boxes closer than this are neighbours
    pub cluster_dist: f64,
    /// Boxes within this distance of an emitted representative are suppressed
    pub min_dist: f64,
    /// Minimum neighbour count (self included) for a box to become a representative
    pub neighbor_threshold: usize,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cluster_dist: 0.1,
            min_dist: 1.5,
            neighbor_threshold: 3,
        }
    }
}

impl ClusterConfig {
    /// Reject negative or non-finite distances.
    ///
    /// `min_dist < cluster_dist` is accepted but logged: it can leave several
    /// representatives for one object.
    pub fn validate(&self) -> Result<()> {
        if !self.cluster_dist.is_finite() || self.cluster_dist < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "cluster_dist must be a non-negative number, got {}",
                self.cluster_dist
            )));
        }
        if !self.min_dist.is_finite() || self.min_dist < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "min_dist must be a non-negative number, got {}",
                self.min_dist
            )));
        }
        if self.min_dist < self.cluster_dist {
            warn!(
                min_dist = self.min_dist,
                cluster_dist = self.cluster_dist,
                "min_dist is smaller than cluster_dist; duplicate clusters may survive"
            );
        }
        Ok(())
    }
}

/// Compute the symmetric `N x N` matrix of box distances over flattened corners.
pub fn pairwise_distances(boxes: &[OrientedBox]) -> Array2<f64> {
    let n = boxes.len();
    let mut dists = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = boxes[i].distance(&boxes[j]);
            dists[[i, j]] = d;
            dists[[j, i]] = d;
        }
    }
    dists
}

/// Non-maximum suppression driven by local density instead of a score.
///
/// Repeatedly emits the proposal with the most neighbours, then drops every
/// proposal within `min_dist` of it, until no remaining proposal has at least
/// `neighbor_threshold` neighbours.
#[derive(Debug, Clone, Default)]
pub struct GreedyDensityClusterer {
    config: ClusterConfig,
}

impl GreedyDensityClusterer {
    pub fn new(config: ClusterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Reduce `boxes` to representatives, in emission order (densest first).
    pub fn cluster(&self, boxes: &[OrientedBox]) -> Vec<OrientedBox> {
        let dists = pairwise_distances(boxes);
        let mut remaining: Vec<usize> = (0..boxes.len()).collect();
        let mut representatives = Vec::new();

        while !remaining.is_empty() {
            let counts = self.neighbor_counts(&dists, &remaining);

            // first index wins ties
            let (best, count) = counts
                .iter()
                .copied()
                .enumerate()
                .fold((0, 0), |acc, (i, c)| if c > acc.1 { (i, c) } else { acc });
            if count < self.config.neighbor_threshold {
                break;
            }

            let chosen = remaining[best];
            trace!(index = chosen, neighbors = count, "emitting cluster representative");
            representatives.push(boxes[chosen]);

            let min_dist = self.config.min_dist;
            remaining.retain(|&j| j != chosen && dists[[chosen, j]] > min_dist);
        }

        debug!(
            proposals = boxes.len(),
            representatives = representatives.len(),
            "clustered box proposals"
        );
        representatives
    }

    fn neighbor_counts(&self, dists: &Array2<f64>, remaining: &[usize]) -> Vec<usize> {
        remaining
            .iter()
            .map(|&i| {
                remaining
                    .iter()
                    .filter(|&&j| dists[[i, j]] < self.config.cluster_dist)
                    .count()
            })
            .collect()
    }
}
