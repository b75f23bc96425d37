//! Pipeline configuration loaded from YAML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::clustering::ClusterConfig;
use crate::error::{Error, Result};
use crate::tracker::TrackerConfig;

/// Configuration for a full decode → cluster → track pipeline.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Occupancy threshold above which a grid cell is decoded into a box
    pub seg_thres: f32,
    pub cluster: ClusterConfig,
    pub tracker: TrackerConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seg_thres: 0.5,
            cluster: ClusterConfig::default(),
            tracker: TrackerConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.seg_thres) {
            return Err(Error::InvalidConfig(format!(
                "seg_thres must lie in [0, 1], got {}",
                self.seg_thres
            )));
        }
        self.cluster.validate()?;
        self.tracker.validate()
    }
}
