//! Configuration system for evodrive runs.
//!
//! Supports YAML configuration files with sensible defaults.

use crate::evolution::{
    DEFAULT_CROSS_SWAP_PROBABILITY, DEFAULT_INITIAL_WEIGHT_MAX, DEFAULT_INITIAL_WEIGHT_MIN,
    DEFAULT_MUTATION_AMOUNT, DEFAULT_MUTATION_PERCENTAGE, DEFAULT_MUTATION_PROBABILITY,
    DEFAULT_SURVIVAL_GENOTYPE,
};
use crate::genetics::{is_valid_range, MutationConfig};
use crate::neural::Activation;
use crate::track::TrackConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub evolution: EvolutionConfig,
    #[serde(default)]
    pub neural: NeuralConfig,
    #[serde(default)]
    pub track: TrackConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub results: ResultsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// What fitness calculation does when every evaluation is zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroEvaluationPolicy {
    /// Give every genotype fitness 1.0, so each is selected once
    #[default]
    UniformFitness,
    /// Refuse to evolve the generation
    Fail,
}

/// Genetic algorithm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Genotypes per generation (one car each)
    pub population_size: usize,
    /// Lower bound (inclusive) of initial weights
    pub initial_weight_min: f64,
    /// Upper bound (exclusive) of initial weights
    pub initial_weight_max: f64,
    /// Probability of swapping a weight during crossover
    pub cross_swap_probability: f64,
    /// Probability of mutating each weight
    pub mutation_probability: f64,
    /// Maximum magnitude of a weight mutation
    pub mutation_amount: f64,
    /// Probability that a new genotype is mutated at all
    pub mutation_percentage: f64,
    /// Best genotypes carried over unchanged
    pub survival_count: usize,
    /// Policy when the mean evaluation is zero
    #[serde(default)]
    pub zero_evaluation: ZeroEvaluationPolicy,
}

/// Driver network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeuralConfig {
    /// Hidden layer sizes between the 5 sensors and the 2 actions
    pub hidden_layers: Vec<usize>,
    /// Activation of every layer
    #[serde(default)]
    pub activation: Activation,
}

/// Generational loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Stop once this generation is reached
    pub max_generations: u32,
    /// Random seed (random if absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Results file configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Directory holding one sub-directory per track
    pub directory: String,
    /// Track identifier; its file stem names the results files
    pub track: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Generations between progress reports
    pub summary_interval: u32,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            initial_weight_min: DEFAULT_INITIAL_WEIGHT_MIN,
            initial_weight_max: DEFAULT_INITIAL_WEIGHT_MAX,
            cross_swap_probability: DEFAULT_CROSS_SWAP_PROBABILITY,
            mutation_probability: DEFAULT_MUTATION_PROBABILITY,
            mutation_amount: DEFAULT_MUTATION_AMOUNT,
            mutation_percentage: DEFAULT_MUTATION_PERCENTAGE,
            survival_count: DEFAULT_SURVIVAL_GENOTYPE,
            zero_evaluation: ZeroEvaluationPolicy::default(),
        }
    }
}

impl EvolutionConfig {
    pub fn mutation(&self) -> MutationConfig {
        MutationConfig {
            probability: self.mutation_probability,
            amount: self.mutation_amount,
            percentage: self.mutation_percentage,
        }
    }
}

impl Default for NeuralConfig {
    fn default() -> Self {
        Self {
            hidden_layers: vec![4, 4, 3],
            activation: Activation::Sigmoid,
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            max_generations: 500,
            seed: None,
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            directory: "results".to_string(),
            track: "tracks/circuit01.yaml".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            summary_interval: 10,
        }
    }
}

/// Errors raised while loading or validating a configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let evo = &self.evolution;
        if evo.population_size < 2 {
            return Err(invalid("population_size must be at least 2"));
        }
        if evo.survival_count > evo.population_size {
            return Err(invalid("survival_count cannot exceed population_size"));
        }
        if !is_valid_range(evo.initial_weight_min, evo.initial_weight_max) {
            return Err(invalid(
                "initial weight range must be finite with initial_weight_min <= initial_weight_max",
            ));
        }
        for (name, p) in [
            ("cross_swap_probability", evo.cross_swap_probability),
            ("mutation_probability", evo.mutation_probability),
            ("mutation_percentage", evo.mutation_percentage),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid(&format!("{} must be in [0, 1]", name)));
            }
        }
        if !evo.mutation_amount.is_finite() || evo.mutation_amount < 0.0 {
            return Err(invalid("mutation_amount must be a non-negative number"));
        }
        if self.neural.hidden_layers.contains(&0) {
            return Err(invalid("hidden layer sizes must be > 0"));
        }
        self.track.validate().map_err(|msg| invalid(&msg))?;
        Ok(())
    }
}

fn invalid(msg: &str) -> ConfigError {
    ConfigError::Invalid(msg.to_string())
}
