//! Generational loop: fitness, selection, recombination and mutation.

use crate::config::{EvolutionConfig, ZeroEvaluationPolicy};
use crate::genetics::{
    by_fitness_descending, complete_crossover, mutate_all_but_best_n,
    remainder_stochastic_sampling, GeneticError, Genotype, IntermediatePopulation,
};
use crate::results::ResultsSink;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Lower bound of initial population weights
pub const DEFAULT_INITIAL_WEIGHT_MIN: f64 = -1.0;
/// Upper bound of initial population weights
pub const DEFAULT_INITIAL_WEIGHT_MAX: f64 = 1.0;
/// Probability of a weight being swapped during crossover
pub const DEFAULT_CROSS_SWAP_PROBABILITY: f64 = 0.6;
/// Probability of a weight being mutated
pub const DEFAULT_MUTATION_PROBABILITY: f64 = 0.3;
/// Maximum amount by which a weight is mutated
pub const DEFAULT_MUTATION_AMOUNT: f64 = 2.0;
/// Share of new genotypes that are mutated
pub const DEFAULT_MUTATION_PERCENTAGE: f64 = 1.0;
/// Genotypes passed to the next generation without recombination
pub const DEFAULT_SURVIVAL_GENOTYPE: usize = 1;

/// Whether the population can currently be read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EvolutionState {
    Idle,
    Evolving,
}

/// Errors that abort an evolution step
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvolutionError {
    #[error("intermediate population has {size} members, at least 2 are required")]
    InsufficientPopulation { size: usize },
    #[error("average evaluation is zero, fitness is undefined")]
    ZeroAverageEvaluation,
    #[error("genotype {index} has invalid evaluation {value}")]
    InvalidEvaluation { index: usize, value: f64 },
    #[error(transparent)]
    Genetic(#[from] GeneticError),
}

/// Fitness statistics of the generation that was just evolved
#[derive(Clone, Debug, PartialEq)]
pub struct EvolutionOutcome {
    /// Generation the statistics belong to
    pub generation: u32,
    pub average_evaluation: f64,
    pub best_evaluation: f64,
    pub best_fitness: f64,
    /// Size of the selection pool
    pub intermediate_size: usize,
}

/// Genetic algorithm owning a fixed-size population of genotypes.
///
/// The population is moved out while `evolution` runs, so any read during
/// that window sees an empty slice, and a failed step puts it back untouched.
pub struct GeneticAlgorithm {
    config: EvolutionConfig,
    population: Vec<Genotype>,
    population_size: usize,
    generation_count: u32,
    state: EvolutionState,
    sink: Option<Box<dyn ResultsSink + Send>>,
    rng: ChaCha8Rng,
    seed: u64,
}

impl GeneticAlgorithm {
    /// Create a population of zero-weight genotypes with default parameters
    pub fn new(weight_count: usize, population_size: usize) -> Self {
        let config = EvolutionConfig {
            population_size,
            ..EvolutionConfig::default()
        };
        let seed = rand::thread_rng().gen();
        Self::with_config(weight_count, config, seed)
    }

    /// Create a population using the given parameters and random seed
    pub fn with_config(weight_count: usize, config: EvolutionConfig, seed: u64) -> Self {
        let population_size = config.population_size;
        let population = (0..population_size)
            .map(|_| Genotype::zeroed(weight_count))
            .collect();

        Self {
            config,
            population,
            population_size,
            generation_count: 1,
            state: EvolutionState::Idle,
            sink: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Receive a summary of every generation before it is replaced
    pub fn set_results_sink(&mut self, sink: Box<dyn ResultsSink + Send>) {
        self.sink = Some(sink);
    }

    /// Set every weight to a random value in the configured initial range
    pub fn initialize_population(&mut self) -> Result<(), GeneticError> {
        let (min, max) = (self.config.initial_weight_min, self.config.initial_weight_max);
        for genotype in &mut self.population {
            genotype.set_random_weights(min, max, &mut self.rng)?;
        }
        Ok(())
    }

    /// Current population, empty while evolution is in progress
    pub fn current_population(&self) -> &[Genotype] {
        match self.state {
            EvolutionState::Idle => &self.population,
            EvolutionState::Evolving => &[],
        }
    }

    /// Mutable access for writing evaluations, empty while evolution is in progress
    pub fn population_mut(&mut self) -> &mut [Genotype] {
        match self.state {
            EvolutionState::Idle => &mut self.population,
            EvolutionState::Evolving => Default::default(),
        }
    }

    #[inline]
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    #[inline]
    pub fn generation_count(&self) -> u32 {
        self.generation_count
    }

    #[inline]
    pub fn state(&self) -> EvolutionState {
        self.state
    }

    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Replace the current population with an evolved one.
    ///
    /// Consumes the evaluations written onto the current genotypes. On error the
    /// previous population is restored in its original order with its weights and
    /// fitness unchanged, and nothing is written to the results sink.
    pub fn evolution(&mut self) -> Result<EvolutionOutcome, EvolutionError> {
        self.state = EvolutionState::Evolving;
        let mut population = std::mem::take(&mut self.population);
        let previous_fitness: Vec<f64> = population.iter().map(|g| g.fitness).collect();

        let result = self.evolve_population(&mut population);

        match result {
            Ok((next, outcome)) => {
                self.population = next;
                self.generation_count += 1;
                self.state = EvolutionState::Idle;
                log::debug!(
                    "Generation {} evolved: avg_eval={:.3} best_eval={:.3} pool={}",
                    outcome.generation,
                    outcome.average_evaluation,
                    outcome.best_evaluation,
                    outcome.intermediate_size
                );
                Ok(outcome)
            }
            Err(e) => {
                for (genotype, fitness) in population.iter_mut().zip(previous_fitness) {
                    genotype.fitness = fitness;
                }
                self.population = population;
                self.state = EvolutionState::Idle;
                Err(e)
            }
        }
    }

    /// Everything fallible runs against a ranking of indices; `population` is only
    /// drained once the offspring exist.
    fn evolve_population(
        &mut self,
        population: &mut Vec<Genotype>,
    ) -> Result<(Vec<Genotype>, EvolutionOutcome), EvolutionError> {
        let average_evaluation = self.fitness_calculation(population)?;

        let mut ranking: Vec<usize> = (0..population.len()).collect();
        ranking.sort_by(|&a, &b| by_fitness_descending(&population[a], &population[b]));

        let intermediate = remainder_stochastic_sampling(
            ranking.iter().map(|&idx| &population[idx]),
            &mut self.rng,
        );
        let offspring = self.recombination(population, &ranking, &intermediate)?;

        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = sink.write_generation_summary(self.generation_count, population) {
                log::warn!("Results write failed for generation {}: {}", self.generation_count, e);
            }
        }

        let outcome = EvolutionOutcome {
            generation: self.generation_count,
            average_evaluation,
            best_evaluation: population
                .iter()
                .map(|g| g.evaluation)
                .fold(f64::NEG_INFINITY, f64::max),
            best_fitness: ranking.first().map_or(0.0, |&idx| population[idx].fitness),
            intermediate_size: intermediate.len(),
        };

        // Elites move over as the same instances
        let survivors = self.config.survival_count.min(population.len());
        let mut slots: Vec<Option<Genotype>> = population.drain(..).map(Some).collect();
        let mut next: Vec<Genotype> = ranking[..survivors]
            .iter()
            .filter_map(|&idx| slots[idx].take())
            .collect();
        next.extend(offspring);

        let mutation = self.config.mutation();
        mutate_all_but_best_n(&mut next, survivors, &mutation, &mut self.rng);

        Ok((next, outcome))
    }

    /// Set `fitness = evaluation / average evaluation`, returning the average
    pub fn fitness_calculation(&self, population: &mut [Genotype]) -> Result<f64, EvolutionError> {
        if population.is_empty() {
            return Err(EvolutionError::InsufficientPopulation { size: 0 });
        }
        for (index, genotype) in population.iter().enumerate() {
            if !genotype.evaluation.is_finite() || genotype.evaluation < 0.0 {
                return Err(EvolutionError::InvalidEvaluation {
                    index,
                    value: genotype.evaluation,
                });
            }
        }

        let total: f64 = population.iter().map(|g| g.evaluation).sum();
        let average = total / population.len() as f64;

        if average == 0.0 {
            match self.config.zero_evaluation {
                ZeroEvaluationPolicy::UniformFitness => {
                    log::warn!(
                        "Generation {}: every evaluation is zero, using uniform fitness",
                        self.generation_count
                    );
                    for genotype in population.iter_mut() {
                        genotype.fitness = 1.0;
                    }
                }
                ZeroEvaluationPolicy::Fail => return Err(EvolutionError::ZeroAverageEvaluation),
            }
        } else {
            for genotype in population.iter_mut() {
                genotype.fitness = genotype.evaluation / average;
            }
        }

        Ok(average)
    }

    /// Produce `population_size - survival_count` offspring from the selection pool.
    ///
    /// Pool members index into `ranking`, which orders `population` by descending fitness.
    fn recombination(
        &mut self,
        population: &[Genotype],
        ranking: &[usize],
        intermediate: &IntermediatePopulation,
    ) -> Result<Vec<Genotype>, EvolutionError> {
        let pool = &intermediate.members;
        if pool.len() < 2 {
            return Err(EvolutionError::InsufficientPopulation { size: pool.len() });
        }

        let wanted = self
            .population_size
            .saturating_sub(self.config.survival_count.min(population.len()));
        let mut offspring = Vec::with_capacity(wanted + 1);

        while offspring.len() < wanted {
            // Second index drawn from the remaining slots so it never equals the first
            let first = self.rng.gen_range(0..pool.len());
            let mut second = self.rng.gen_range(0..pool.len() - 1);
            if second >= first {
                second += 1;
            }

            let (child1, child2) = complete_crossover(
                &population[ranking[pool[first]]],
                &population[ranking[pool[second]]],
                self.config.cross_swap_probability,
                &mut self.rng,
            );

            offspring.push(child1);
            if offspring.len() < wanted {
                offspring.push(child2);
            }
        }

        Ok(offspring)
    }
}
