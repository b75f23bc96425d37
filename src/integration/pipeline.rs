//! TrackerPipeline for combining the regression model with clustering and tracking.

use thiserror::Error;
use tracing::debug;

use crate::clustering::GreedyDensityClusterer;
use crate::config::PipelineConfig;
use crate::error::Error as CrateError;
use crate::geometry::{OrientedBox, TARGET_CHANNELS};
use crate::tracker::VelocityGatedTracker;

use super::{FrameDecoder, ProjectedFrame, RegressionSource};

/// Failure of one pipeline frame.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("regression source failed: {0}")]
    Source(E),
    #[error(transparent)]
    Decode(#[from] CrateError),
}

/// Everything produced while processing one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameOutput {
    /// Boxes decoded from cells above the occupancy threshold
    pub candidates: Vec<OrientedBox>,
    /// Cluster representatives (the raw candidates when clustering is off)
    pub representatives: Vec<OrientedBox>,
    /// The tracked box for this frame, if any
    pub tracked: Option<OrientedBox>,
}

/// Bundles a `RegressionSource` with decoding, clustering and the
/// velocity-gated tracker for end-to-end single-object tracking.
pub struct TrackerPipeline<S: RegressionSource> {
    source: S,
    decoder: FrameDecoder,
    clusterer: GreedyDensityClusterer,
    tracker: VelocityGatedTracker,
}

impl<S: RegressionSource> TrackerPipeline<S> {
    /// Create a new pipeline with the given source and configuration.
    pub fn new(source: S, config: PipelineConfig) -> Self {
        Self {
            source,
            decoder: FrameDecoder::new(config.seg_thres),
            clusterer: GreedyDensityClusterer::new(config.cluster),
            tracker: VelocityGatedTracker::new(config.tracker),
        }
    }

    /// Create a new pipeline with the default configuration.
    pub fn with_default_config(source: S) -> Self {
        Self::new(source, PipelineConfig::default())
    }

    /// Process a single frame.
    ///
    /// Runs the model on the frame grid, decodes occupied cells, clusters the
    /// candidates and feeds the result to the tracker.
    ///
    /// # Arguments
    /// * `frame` - Projected grid and the cells with their LiDAR points
    /// * `timestamp` - Frame time in seconds
    pub fn process_frame(
        &mut self,
        frame: &ProjectedFrame,
        timestamp: f64,
    ) -> Result<FrameOutput, PipelineError<S::Error>> {
        let outputs = self.source.infer(&frame.grid).map_err(PipelineError::Source)?;

        let (rows, cols, _) = frame.grid.dim();
        let (out_rows, out_cols, channels) = outputs.dim();
        if (rows, cols) != (out_rows, out_cols) {
            return Err(CrateError::GridShape {
                expected: [rows, cols, TARGET_CHANNELS],
                got: [out_rows, out_cols, channels],
            }
            .into());
        }

        let candidates = self.decoder.decode(&outputs, &frame.cells)?;
        let representatives = if self.clusterer.config().enabled {
            self.clusterer.cluster(&candidates)
        } else {
            candidates.clone()
        };
        let tracked = self.tracker.step(&representatives, timestamp);
        debug!(
            timestamp,
            candidates = candidates.len(),
            representatives = representatives.len(),
            tracked = tracked.is_some(),
            "processed frame"
        );

        Ok(FrameOutput {
            candidates,
            representatives,
            tracked,
        })
    }

    /// Get a reference to the underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Get a mutable reference to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &VelocityGatedTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut VelocityGatedTracker {
        &mut self.tracker
    }
}
