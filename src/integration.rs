//! Integration module connecting a range-image regression model with
//! clustering and tracking.
//!
//! This module provides the model trait, the decoding of per-cell outputs into
//! candidate boxes and a pipeline bundling everything per frame.

mod builder;
mod decoder;
mod pipeline;
mod source;

pub use builder::OrientedBoxBuilder;
pub use decoder::{FrameDecoder, GRID_COLS, GRID_ROWS, ProjectedCell, ProjectedFrame};
pub use pipeline::{FrameOutput, PipelineError, TrackerPipeline};
pub use source::RegressionSource;

#[cfg(feature = "burn-backend")]
mod burn_backend;

#[cfg(feature = "burn-backend")]
pub use burn_backend::{BurnModel, BurnRegressor, BurnRegressorError};
