//! Genetics module - genotypes, crossover, mutation and selection.

pub mod crossover;
pub mod genotype;
pub mod mutation;
pub mod selection;

pub use crossover::complete_crossover;
pub use genotype::{by_fitness_descending, is_valid_range, Genotype};
pub use mutation::{mutate_all_but_best_n, mutate_genotype, MutationConfig};
pub use selection::{remainder_stochastic_sampling, IntermediatePopulation};

/// Errors raised by genotype operations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeneticError {
    #[error("invalid weight range: minimum {min} exceeds maximum {max}")]
    InvalidRange { min: f64, max: f64 },
    #[error("weight index {index} out of bounds for genotype of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },
}
