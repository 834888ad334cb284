//! Genotype: a fixed-length weight vector plus its scores.

use super::GeneticError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

/// Whether uniform draws from `[min, max)` are possible: finite bounds, `min <= max`,
/// and a width that does not overflow
pub fn is_valid_range(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min <= max && (max - min).is_finite()
}

/// Weight vector evaluated by the simulation and scored by the genetic algorithm
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Genotype {
    /// Raw episode score, written by the simulation
    pub evaluation: f64,
    /// Evaluation relative to the population mean, written by fitness calculation
    pub fitness: f64,
    weights: Vec<f64>,
}

impl Genotype {
    /// Create a genotype with the given weights, evaluation and fitness at zero
    pub fn new(weights: Vec<f64>) -> Self {
        Self {
            evaluation: 0.0,
            fitness: 0.0,
            weights,
        }
    }

    /// Create a genotype of `length` zero weights
    pub fn zeroed(length: usize) -> Self {
        Self::new(vec![0.0; length])
    }

    /// Create a genotype with weights drawn uniformly from `[min, max)`
    pub fn generate_random<R: Rng + ?Sized>(
        length: usize,
        min: f64,
        max: f64,
        rng: &mut R,
    ) -> Result<Self, GeneticError> {
        let mut genotype = Self::zeroed(length);
        genotype.set_random_weights(min, max, rng)?;
        Ok(genotype)
    }

    /// Overwrite every weight with a uniform draw from `[min, max)`
    pub fn set_random_weights<R: Rng + ?Sized>(
        &mut self,
        min: f64,
        max: f64,
        rng: &mut R,
    ) -> Result<(), GeneticError> {
        if !is_valid_range(min, max) {
            return Err(GeneticError::InvalidRange { min, max });
        }

        if min == max {
            self.weights.fill(min);
        } else {
            for w in &mut self.weights {
                *w = rng.gen_range(min..max);
            }
        }

        Ok(())
    }

    #[inline]
    pub fn weight_count(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Mutable view of the weights; the length itself cannot change
    pub fn weights_mut(&mut self) -> &mut [f64] {
        &mut self.weights
    }

    /// Owned snapshot of the weights
    pub fn weight_copy(&self) -> Vec<f64> {
        self.weights.clone()
    }

    pub fn get(&self, index: usize) -> Result<f64, GeneticError> {
        self.weights
            .get(index)
            .copied()
            .ok_or(GeneticError::IndexOutOfBounds {
                index,
                len: self.weights.len(),
            })
    }

    pub fn set(&mut self, index: usize, value: f64) -> Result<(), GeneticError> {
        let len = self.weights.len();
        let slot = self
            .weights
            .get_mut(index)
            .ok_or(GeneticError::IndexOutOfBounds { index, len })?;
        *slot = value;
        Ok(())
    }
}

impl Index<usize> for Genotype {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.weights[index]
    }
}

impl IndexMut<usize> for Genotype {
    fn index_mut(&mut self, index: usize) -> &mut f64 {
        &mut self.weights[index]
    }
}

/// Comparator putting larger fitness first.
///
/// Use with a stable sort so genotypes of equal fitness keep their relative order.
pub fn by_fitness_descending(a: &Genotype, b: &Genotype) -> Ordering {
    b.fitness.total_cmp(&a.fitness)
}
