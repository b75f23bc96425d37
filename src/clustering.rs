//! Density-peak suppression of duplicated box proposals.

mod greedy_density;

pub use greedy_density::{ClusterConfig, GreedyDensityClusterer, pairwise_distances};
