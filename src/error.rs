use thiserror::Error;

/// Errors raised at the configuration and model boundaries.
///
/// Geometry, clustering and tracking are total and never produce one.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("model output shape mismatch: expected {expected:?}, got {got:?}")]
    GridShape { expected: [usize; 3], got: [usize; 3] },
}

pub type Result<T> = std::result::Result<T, Error>;
