//! Density-peak clustering and velocity-gated single-object tracking of 3D box
//! proposals decoded from a LiDAR range-image model.
//!
//! Data flow per frame:
//! model outputs → [`geometry::decode`] → candidate boxes →
//! [`GreedyDensityClusterer`] → representatives → [`VelocityGatedTracker`] →
//! zero or one tracked box → [`tracklet::TrackletPose`].

pub mod clustering;
pub mod config;
pub mod error;
pub mod geometry;
pub mod integration;
pub mod tracker;
pub mod tracklet;

pub use clustering::{ClusterConfig, GreedyDensityClusterer};
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use geometry::{OrientedBox, RegressionTarget};
pub use integration::{
    FrameDecoder, FrameOutput, OrientedBoxBuilder, PipelineError, ProjectedCell, ProjectedFrame,
    RegressionSource, TrackerPipeline,
};
pub use tracker::{SelectionPolicy, TrackPhase, TrackerConfig, VelocityGatedTracker};
pub use tracklet::{BoxSize, ObjectClass, TrackletPose};
