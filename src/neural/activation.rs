//! Activation functions.

use serde::{Deserialize, Serialize};

/// Inputs beyond this magnitude saturate instead of calling `exp`
const SATURATION: f64 = 10.0;

/// Logistic sigmoid clamped to exactly 0 or 1 outside `[-10, 10]`
#[inline]
pub fn sigmoid(x: f64) -> f64 {
    if x > SATURATION {
        1.0
    } else if x < -SATURATION {
        0.0
    } else {
        1.0 / (1.0 + (-x).exp())
    }
}

/// Activation applied to each output unit of a layer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    /// Saturating logistic sigmoid, output in `[0, 1]`
    #[default]
    Sigmoid,
    /// Hyperbolic tangent, output in `[-1, 1]`
    Tanh,
}

impl Activation {
    #[inline]
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Sigmoid => sigmoid(x),
            Activation::Tanh => x.tanh(),
        }
    }
}
