//! Feedforward neural networks for driver agents.
//!
//! Implements layered, fully connected, biased networks with:
//! - Dense weight matrices (one bias row per layer)
//! - Saturating activation functions
//! - Flat weight vectors for loading genotypes

mod activation;
mod layer;
mod network;

pub use activation::{sigmoid, Activation};
pub use layer::NeuralLayer;
pub use network::NeuralNetwork;

/// Errors raised when a network is built or fed with mismatched data
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid topology {0:?}: need at least two non-zero layer sizes")]
    InvalidTopology(Vec<usize>),
    #[error("weight count mismatch: expected {expected}, got {found}")]
    WeightCountMismatch { expected: usize, found: usize },
    #[error("input count mismatch: expected {expected}, got {found}")]
    InputCountMismatch { expected: usize, found: usize },
}
