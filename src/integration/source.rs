//! Trait for the range-image regression model.

use ndarray::Array3;

/// Trait for detection model backends.
///
/// Implement this trait to connect any range-image model to the tracker.
///
/// # Example
///
/// ```ignore
/// use lidar_boxtrack::RegressionSource;
/// use ndarray::Array3;
///
/// struct MyModel {
///     // Your model here
/// }
///
/// impl RegressionSource for MyModel {
///     type Error = std::io::Error;
///
///     fn infer(&mut self, grid: &Array3<f32>) -> Result<Array3<f32>, Self::Error> {
///         let (rows, cols, _) = grid.dim();
///         Ok(Array3::zeros((rows, cols, 8)))
///     }
/// }
/// ```
pub trait RegressionSource {
    /// Error type for inference failures.
    type Error;

    /// Run the model on one projected grid.
    ///
    /// # Arguments
    /// * `grid` - Input tensor of shape `[rows, cols, 2]` (range, height)
    ///
    /// # Returns
    /// Per-cell outputs of shape `[rows, cols, 8]`, channel 0 being occupancy.
    fn infer(&mut self, grid: &Array3<f32>) -> Result<Array3<f32>, Self::Error>;
}
