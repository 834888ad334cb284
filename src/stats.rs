//! Per-generation statistics.

use crate::genetics::Genotype;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Summary of one evaluated generation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationSummary {
    /// Generation number, starting at 1
    pub generation: u32,
    /// Mean fitness across the population
    pub average_fitness: f64,
    /// Fitness of the best-evaluated genotype
    pub best_fitness: f64,
    /// Mean evaluation across the population
    pub average_evaluation: f64,
    /// Highest evaluation in the population
    pub best_evaluation: f64,
    /// Weights of the best-evaluated genotype
    pub best_weights: Vec<f64>,
}

impl GenerationSummary {
    /// Summarize a scored population; `None` if it is empty.
    ///
    /// The best genotype is the first one holding the highest evaluation.
    pub fn from_population(generation: u32, population: &[Genotype]) -> Option<Self> {
        let first = population.first()?;

        let mut best = first;
        let mut fitness_sum = 0.0;
        let mut evaluation_sum = 0.0;
        for genotype in population {
            fitness_sum += genotype.fitness;
            evaluation_sum += genotype.evaluation;
            if genotype.evaluation > best.evaluation {
                best = genotype;
            }
        }

        let count = population.len() as f64;
        Some(Self {
            generation,
            average_fitness: fitness_sum / count,
            best_fitness: best.fitness,
            average_evaluation: evaluation_sum / count,
            best_evaluation: best.evaluation,
            best_weights: best.weight_copy(),
        })
    }
}

/// Whitespace separated results line: generation, averages, bests, then the best weights
impl fmt::Display for GenerationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.generation,
            self.average_fitness,
            self.best_fitness,
            self.average_evaluation,
            self.best_evaluation
        )?;
        for w in &self.best_weights {
            write!(f, " {}", w)?;
        }
        Ok(())
    }
}

/// Historical summaries of a run
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SummaryHistory {
    /// All recorded summaries, oldest first
    pub summaries: Vec<GenerationSummary>,
}

impl SummaryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, summary: GenerationSummary) {
        self.summaries.push(summary);
    }

    pub fn latest(&self) -> Option<&GenerationSummary> {
        self.summaries.last()
    }

    /// Best summary of the whole run by evaluation
    pub fn champion(&self) -> Option<&GenerationSummary> {
        self.summaries
            .iter()
            .max_by(|a, b| a.best_evaluation.total_cmp(&b.best_evaluation))
    }

    /// Save history to a JSON file
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
    }

    /// Load history from a JSON file
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> std::io::Result<Self> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
