//! A single fully connected, biased layer.

use super::{Activation, NetworkError};
use ndarray::{s, Array1, Array2, ArrayView1};

/// Dense layer mapping `neuron_count` inputs to `output_count` outputs.
///
/// The weight matrix has one row per input neuron plus a final bias row,
/// which is always multiplied by an implicit input of `1.0`.
#[derive(Clone, Debug)]
pub struct NeuralLayer {
    neuron_count: usize,
    output_count: usize,
    weights: Array2<f64>,
    activation: Activation,
}

impl NeuralLayer {
    /// Create a layer with all weights set to zero
    pub fn new(neuron_count: usize, output_count: usize) -> Self {
        Self {
            neuron_count,
            output_count,
            weights: Array2::zeros((neuron_count + 1, output_count)),
            activation: Activation::default(),
        }
    }

    #[inline]
    pub fn neuron_count(&self) -> usize {
        self.neuron_count
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_count
    }

    /// Number of weights including the bias row
    #[inline]
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &Array2<f64> {
        &self.weights
    }

    pub fn activation(&self) -> Activation {
        self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    /// Load weights row by row: first neuron's outgoing weights first, bias row last
    pub fn set_weights(&mut self, flat: &[f64]) -> Result<(), NetworkError> {
        if flat.len() != self.weight_count() {
            return Err(NetworkError::WeightCountMismatch {
                expected: self.weight_count(),
                found: flat.len(),
            });
        }

        // Logical iteration order of an Array2 is row-major
        for (w, &value) in self.weights.iter_mut().zip(flat) {
            *w = value;
        }

        Ok(())
    }

    /// Forward pass through this layer
    pub fn process_inputs(&self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.neuron_count {
            return Err(NetworkError::InputCountMismatch {
                expected: self.neuron_count,
                found: inputs.len(),
            });
        }

        let mut biased = Array1::<f64>::ones(self.neuron_count + 1);
        biased
            .slice_mut(s![..self.neuron_count])
            .assign(&ArrayView1::from(inputs));

        let mut sums = biased.dot(&self.weights);
        let activation = self.activation;
        sums.mapv_inplace(|x| activation.apply(x));

        Ok(sums.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_initialized_shape() {
        let layer = NeuralLayer::new(3, 2);
        assert_eq!(layer.weights().dim(), (4, 2));
        assert_eq!(layer.weight_count(), 8);
        assert!(layer.weights().iter().all(|&w| w == 0.0));
        assert_eq!(layer.activation(), Activation::Sigmoid);
    }

    #[test]
    fn test_set_weights_row_major() {
        let mut layer = NeuralLayer::new(2, 2);
        layer
            .set_weights(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0])
            .unwrap();

        let w = layer.weights();
        assert_eq!(w[[0, 0]], 1.0);
        assert_eq!(w[[0, 1]], 2.0);
        assert_eq!(w[[1, 0]], 3.0);
        assert_eq!(w[[1, 1]], 4.0);
        // Bias row last
        assert_eq!(w[[2, 0]], 5.0);
        assert_eq!(w[[2, 1]], 6.0);
    }

    #[test]
    fn test_set_weights_length_mismatch() {
        let mut layer = NeuralLayer::new(2, 2);
        let err = layer.set_weights(&[1.0; 5]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::WeightCountMismatch {
                expected: 6,
                found: 5
            }
        );
    }

    #[test]
    fn test_process_inputs_length_mismatch() {
        let layer = NeuralLayer::new(3, 1);
        assert!(matches!(
            layer.process_inputs(&[0.0, 1.0]),
            Err(NetworkError::InputCountMismatch { expected: 3, found: 2 })
        ));
    }

    #[test]
    fn test_bias_only_output() {
        let mut layer = NeuralLayer::new(2, 1);
        // Input weights zero, bias weight large -> saturates to 1
        layer.set_weights(&[0.0, 0.0, 20.0]).unwrap();

        let out = layer.process_inputs(&[123.0, -7.0]).unwrap();
        assert_eq!(out, vec![1.0]);
    }

    #[test]
    fn test_weighted_sum() {
        let mut layer = NeuralLayer::new(2, 1);
        layer.set_activation(Activation::Tanh);
        layer.set_weights(&[0.5, -0.25, 0.1]).unwrap();

        let out = layer.process_inputs(&[2.0, 4.0]).unwrap();
        let expected = (2.0 * 0.5 + 4.0 * -0.25 + 0.1f64).tanh();
        assert!((out[0] - expected).abs() < 1e-12);
    }
}
