//! Driver agent: a genotype decoded into a neural network.

use crate::genetics::Genotype;
use crate::neural::{Activation, NetworkError, NeuralNetwork};

/// Number of distance sensors feeding the network
pub const SENSOR_COUNT: usize = 5;

/// Network outputs: engine force and steering direction
pub const ACTION_COUNT: usize = 2;

/// Default driver topology, sensors in and actions out
pub const DRIVER_TOPOLOGY: [usize; 5] = [SENSOR_COUNT, 4, 4, 3, ACTION_COUNT];

/// Decision produced for one simulation tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DriverAction {
    /// Throttle in `[0, 1]`
    pub engine_force: f64,
    /// Steering in `[0, 1]`, 0.5 meaning straight ahead
    pub direction: f64,
}

impl DriverAction {
    pub fn to_array(self) -> [f64; ACTION_COUNT] {
        [self.engine_force, self.direction]
    }
}

/// Agent driving a car with a network loaded from its bound genotype.
///
/// The network holds its own copy of the weights, so the genotype may be
/// modified freely; the agent only picks up changes on `update_knowledge`.
#[derive(Debug)]
pub struct DriverAgent<'g> {
    network: NeuralNetwork,
    genotype: &'g mut Genotype,
}

impl<'g> DriverAgent<'g> {
    /// Create an agent with the default `[5, 4, 4, 3, 2]` network
    pub fn new(genotype: &'g mut Genotype) -> Result<Self, NetworkError> {
        Self::with_topology(&DRIVER_TOPOLOGY, genotype)
    }

    /// Create an agent whose network has the given hidden layers between sensors and actions
    pub fn with_hidden_layers(
        hidden_layers: &[usize],
        genotype: &'g mut Genotype,
    ) -> Result<Self, NetworkError> {
        Self::with_topology(&driver_topology(hidden_layers), genotype)
    }

    fn with_topology(topology: &[usize], genotype: &'g mut Genotype) -> Result<Self, NetworkError> {
        if topology.first() != Some(&SENSOR_COUNT) || topology.last() != Some(&ACTION_COUNT) {
            return Err(NetworkError::InvalidTopology(topology.to_vec()));
        }

        let mut network = NeuralNetwork::new(topology)?;
        network.set_weights(genotype.weights())?;

        Ok(Self { network, genotype })
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.network.set_activation(activation);
    }

    /// Turn sensor readings into an action
    pub fn think(&self, sensor_values: &[f64]) -> Result<DriverAction, NetworkError> {
        let outputs = self.network.process_inputs(sensor_values)?;
        Ok(DriverAction {
            engine_force: outputs[0],
            direction: outputs[1],
        })
    }

    /// Bind a new genotype and reload the network from a copy of its weights.
    ///
    /// On a length mismatch neither the network nor the binding change.
    pub fn update_knowledge(&mut self, genotype: &'g mut Genotype) -> Result<(), NetworkError> {
        self.network.set_weights(genotype.weights())?;
        self.genotype = genotype;
        Ok(())
    }

    pub fn genotype(&self) -> &Genotype {
        &*self.genotype
    }

    pub fn genotype_mut(&mut self) -> &mut Genotype {
        &mut *self.genotype
    }

    pub fn network(&self) -> &NeuralNetwork {
        &self.network
    }
}

/// Full topology for the given hidden layers
pub fn driver_topology(hidden_layers: &[usize]) -> Vec<usize> {
    let mut topology = Vec::with_capacity(hidden_layers.len() + 2);
    topology.push(SENSOR_COUNT);
    topology.extend_from_slice(hidden_layers);
    topology.push(ACTION_COUNT);
    topology
}

/// Genotype length required by a driver with the given hidden layers
pub fn driver_weight_count(hidden_layers: &[usize]) -> usize {
    NeuralNetwork::weight_count_for(&driver_topology(hidden_layers))
}
