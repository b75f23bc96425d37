//! Burn inference backend for the range-image regression model.
//!
//! This module provides a `BurnRegressor` that implements `RegressionSource`
//! for running models built with the Burn framework.
//!
//! # Example
//!
//! ```ignore
//! use lidar_boxtrack::integration::{BurnModel, BurnRegressor};
//! use burn::backend::NdArray;
//!
//! // Implement BurnModel for your network
//! struct MyRangeNet { /* ... */ }
//!
//! impl BurnModel<NdArray> for MyRangeNet {
//!     fn forward(&self, input: burn::tensor::Tensor<NdArray, 4>) -> burn::tensor::Tensor<NdArray, 4> {
//!         // Run inference
//!     }
//! }
//!
//! let model = MyRangeNet::load("model.bin");
//! let regressor = BurnRegressor::new(model, Default::default());
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use ndarray::Array3;
use thiserror::Error;

use super::{GRID_COLS, GRID_ROWS, RegressionSource};
use crate::geometry::TARGET_CHANNELS;

/// Error type for Burn inference failures.
#[derive(Debug, Clone, Error)]
pub enum BurnRegressorError {
    /// Input grid has invalid dimensions.
    #[error("invalid input dimensions: expected {expected:?}, got {got:?}")]
    InvalidInputDimensions {
        expected: (usize, usize, usize),
        got: (usize, usize, usize),
    },
    /// Model output could not be read back.
    #[error("inference error: {0}")]
    InferenceError(String),
}

/// Trait for Burn-based range-image models.
///
/// Implement this trait for your specific model architecture.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run forward pass on the input tensor.
    ///
    /// # Arguments
    /// * `input` - Input tensor of shape [batch, rows, cols, 2]
    ///
    /// # Returns
    /// Output tensor of shape [batch, rows, cols, 8].
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 4>;

    /// Get the expected input size (rows, cols, channels).
    fn input_size(&self) -> (usize, usize, usize) {
        (GRID_ROWS, GRID_COLS, 2)
    }
}

/// Burn-based regressor implementing `RegressionSource`.
pub struct BurnRegressor<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
}

impl<B: Backend, M: BurnModel<B>> BurnRegressor<B, M> {
    /// Create a new Burn regressor with the given model and device.
    pub fn new(model: M, device: B::Device) -> Self {
        Self { model, device }
    }

    /// Convert a projected grid to a `[1, rows, cols, channels]` tensor.
    pub fn preprocess(&self, grid: &Array3<f32>) -> Result<Tensor<B, 4>, BurnRegressorError> {
        let (rows, cols, channels) = self.model.input_size();
        if grid.dim() != (rows, cols, channels) {
            return Err(BurnRegressorError::InvalidInputDimensions {
                expected: (rows, cols, channels),
                got: grid.dim(),
            });
        }

        let data: Vec<f32> = grid.iter().copied().collect();
        let tensor = Tensor::<B, 1>::from_floats(data.as_slice(), &self.device)
            .reshape([1, rows, cols, channels]);
        Ok(tensor)
    }

    /// Convert the model output back to a `[rows, cols, 8]` array.
    fn postprocess(&self, output: Tensor<B, 4>) -> Result<Array3<f32>, BurnRegressorError> {
        let [batch, rows, cols, channels] = output.dims();
        if batch != 1 || channels < TARGET_CHANNELS {
            return Err(BurnRegressorError::InferenceError(format!(
                "unexpected output shape [{batch}, {rows}, {cols}, {channels}]"
            )));
        }
        let values = output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| BurnRegressorError::InferenceError(format!("{e:?}")))?;
        Array3::from_shape_vec((rows, cols, channels), values)
            .map_err(|e| BurnRegressorError::InferenceError(e.to_string()))
    }
}

impl<B: Backend, M: BurnModel<B>> RegressionSource for BurnRegressor<B, M> {
    type Error = BurnRegressorError;

    fn infer(&mut self, grid: &Array3<f32>) -> Result<Array3<f32>, Self::Error> {
        let tensor = self.preprocess(grid)?;
        let output = self.model.forward(tensor);
        self.postprocess(output)
    }
}
