//! Network structure and forward propagation.

use super::{Activation, NetworkError, NeuralLayer};

/// Layered feedforward network with a fixed topology
#[derive(Clone, Debug)]
pub struct NeuralNetwork {
    /// Neuron count of every layer, inputs first, outputs last
    topology: Vec<usize>,
    /// One layer per pair of adjacent topology entries
    layers: Vec<NeuralLayer>,
    /// Total weights across all layers, biases included
    weight_count: usize,
}

impl NeuralNetwork {
    /// Build a zero-weight network, e.g. `[5, 4, 4, 3, 2]`
    pub fn new(topology: &[usize]) -> Result<Self, NetworkError> {
        if topology.len() < 2 || topology.contains(&0) {
            return Err(NetworkError::InvalidTopology(topology.to_vec()));
        }

        let layers: Vec<NeuralLayer> = topology
            .windows(2)
            .map(|pair| NeuralLayer::new(pair[0], pair[1]))
            .collect();
        let weight_count = layers.iter().map(NeuralLayer::weight_count).sum();

        Ok(Self {
            topology: topology.to_vec(),
            layers,
            weight_count,
        })
    }

    /// Weight count a network of this topology needs, without building it
    pub fn weight_count_for(topology: &[usize]) -> usize {
        topology
            .windows(2)
            .map(|pair| (pair[0] + 1) * pair[1])
            .sum()
    }

    #[inline]
    pub fn weight_count(&self) -> usize {
        self.weight_count
    }

    pub fn topology(&self) -> &[usize] {
        &self.topology
    }

    pub fn layers(&self) -> &[NeuralLayer] {
        &self.layers
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.topology[0]
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.topology[self.topology.len() - 1]
    }

    /// Use the same activation on every layer
    pub fn set_activation(&mut self, activation: Activation) {
        for layer in &mut self.layers {
            layer.set_activation(activation);
        }
    }

    /// Load a flat weight vector, layer 0 consuming the first slice
    pub fn set_weights(&mut self, flat: &[f64]) -> Result<(), NetworkError> {
        if flat.len() != self.weight_count {
            return Err(NetworkError::WeightCountMismatch {
                expected: self.weight_count,
                found: flat.len(),
            });
        }

        let mut offset = 0;
        for layer in &mut self.layers {
            let count = layer.weight_count();
            layer.set_weights(&flat[offset..offset + count])?;
            offset += count;
        }

        Ok(())
    }

    /// Current weights flattened in the order `set_weights` expects
    pub fn weights(&self) -> Vec<f64> {
        self.layers
            .iter()
            .flat_map(|layer| layer.weights().iter().copied())
            .collect()
    }

    /// Perform a forward pass through every layer
    pub fn process_inputs(&self, inputs: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if inputs.len() != self.input_count() {
            return Err(NetworkError::InputCountMismatch {
                expected: self.input_count(),
                found: inputs.len(),
            });
        }

        let mut activation = inputs.to_vec();
        for layer in &self.layers {
            activation = layer.process_inputs(&activation)?;
        }

        Ok(activation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_topology_weight_count() {
        let net = NeuralNetwork::new(&[5, 4, 4, 3, 2]).unwrap();
        assert_eq!(net.layers().len(), 4);
        // (5+1)*4 + (4+1)*4 + (4+1)*3 + (3+1)*2
        assert_eq!(net.weight_count(), 67);
        assert_eq!(NeuralNetwork::weight_count_for(&[5, 4, 4, 3, 2]), 67);
    }

    #[test]
    fn test_invalid_topology() {
        assert!(matches!(
            NeuralNetwork::new(&[3]),
            Err(NetworkError::InvalidTopology(_))
        ));
        assert!(matches!(
            NeuralNetwork::new(&[]),
            Err(NetworkError::InvalidTopology(_))
        ));
        assert!(matches!(
            NeuralNetwork::new(&[3, 0, 2]),
            Err(NetworkError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_zero_weights_give_half() {
        let net = NeuralNetwork::new(&[2, 2, 1]).unwrap();
        for (x, y) in [(0.0, 0.0), (1.0, -3.0), (250.0, 17.5)] {
            assert_eq!(net.process_inputs(&[x, y]).unwrap(), vec![0.5]);
        }
    }

    #[test]
    fn test_single_layer_identity_weight() {
        let mut net = NeuralNetwork::new(&[1, 1]).unwrap();
        net.set_weights(&[1.0, 0.0]).unwrap();
        assert_eq!(net.process_inputs(&[0.0]).unwrap(), vec![0.5]);
    }

    #[test]
    fn test_set_weights_slices_in_order() {
        let mut net = NeuralNetwork::new(&[2, 2, 1]).unwrap();
        let flat: Vec<f64> = (0..net.weight_count()).map(|i| i as f64).collect();
        net.set_weights(&flat).unwrap();

        // First layer takes 0..6, second 6..9
        assert_eq!(net.layers()[0].weights()[[0, 0]], 0.0);
        assert_eq!(net.layers()[0].weights()[[2, 1]], 5.0);
        assert_eq!(net.layers()[1].weights()[[0, 0]], 6.0);
        assert_eq!(net.layers()[1].weights()[[2, 0]], 8.0);
        assert_eq!(net.weights(), flat);
    }

    #[test]
    fn test_set_weights_mismatch_leaves_weights() {
        let mut net = NeuralNetwork::new(&[2, 1]).unwrap();
        net.set_weights(&[0.1, 0.2, 0.3]).unwrap();

        let err = net.set_weights(&[1.0; 4]).unwrap_err();
        assert_eq!(
            err,
            NetworkError::WeightCountMismatch {
                expected: 3,
                found: 4
            }
        );
        assert_eq!(net.weights(), vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_input_mismatch() {
        let net = NeuralNetwork::new(&[5, 4, 2]).unwrap();
        assert!(matches!(
            net.process_inputs(&[0.0; 4]),
            Err(NetworkError::InputCountMismatch { expected: 5, found: 4 })
        ));
    }

    #[test]
    fn test_outputs_in_unit_interval() {
        let mut net = NeuralNetwork::new(&[5, 4, 4, 3, 2]).unwrap();
        let flat: Vec<f64> = (0..net.weight_count())
            .map(|i| ((i * 37) % 11) as f64 - 5.0)
            .collect();
        net.set_weights(&flat).unwrap();

        let out = net.process_inputs(&[250.0, 12.0, 3.5, 80.0, 0.0]).unwrap();
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|&x| (0.0..=1.0).contains(&x)));
    }
}
