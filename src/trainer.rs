//! Generational training loop: run every agent on the track, then evolve.

use crate::agent::{driver_weight_count, DriverAgent};
use crate::config::{Config, ConfigError};
use crate::episode::{AliveCounter, CounterError, GenerationComplete};
use crate::evolution::{EvolutionError, GeneticAlgorithm};
use crate::genetics::{GeneticError, Genotype};
use crate::neural::{Activation, NetworkError};
use crate::results::{FileResultsSink, ResultsError, ResultsSink};
use crate::track::Environment;
use rand::Rng;
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Receiver;

/// Errors that stop training
#[derive(Debug, thiserror::Error)]
pub enum TrainerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("network error: {0}")]
    Network(#[from] NetworkError),
    #[error("genetic error: {0}")]
    Genetic(#[from] GeneticError),
    #[error("evolution error: {0}")]
    Evolution(#[from] EvolutionError),
    #[error("alive counter error: {0}")]
    Counter(#[from] CounterError),
    #[error("results error: {0}")]
    Results(#[from] ResultsError),
    #[error("no completion signal for episode {0}")]
    SignalLost(u64),
}

/// What happened during one generation
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationReport {
    pub generation: u32,
    pub average_evaluation: f64,
    pub best_evaluation: f64,
    pub best_fitness: f64,
    /// Agents that crashed instead of timing out
    pub crashes: usize,
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Gen:{:4} | AvgEval:{:8.2} | BestEval:{:8.2} | BestFit:{:.3} | Crashes:{}",
            self.generation,
            self.average_evaluation,
            self.best_evaluation,
            self.best_fitness,
            self.crashes
        )
    }
}

/// How a single episode ended
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeResult {
    pub evaluation: f64,
    pub crashed: bool,
}

/// Drive one agent until it crashes or times out
pub fn drive<E: Environment>(
    environment: &E,
    agent: &DriverAgent<'_>,
) -> Result<EpisodeResult, NetworkError> {
    let mut vehicle = environment.spawn();
    let crashed = loop {
        let Some(readings) = environment.sense(&vehicle) else {
            break true;
        };
        if environment.timed_out(&vehicle) {
            break false;
        }
        let action = agent.think(&readings)?;
        environment.advance(&mut vehicle, action);
    };

    Ok(EpisodeResult {
        evaluation: environment.evaluate(&vehicle),
        crashed,
    })
}

/// Owns the genetic algorithm and the environment its agents drive in
pub struct Trainer<E: Environment> {
    ga: GeneticAlgorithm,
    environment: E,
    hidden_layers: Vec<usize>,
    activation: Activation,
    counter: AliveCounter,
    complete_rx: Receiver<GenerationComplete>,
    max_generations: u32,
    summary_interval: u32,
    champion: Option<Genotype>,
}

impl<E: Environment> Trainer<E> {
    /// Build a trainer with a randomly initialized population
    pub fn new(config: &Config, environment: E) -> Result<Self, TrainerError> {
        config.validate()?;

        let hidden_layers = config.neural.hidden_layers.clone();
        let weight_count = driver_weight_count(&hidden_layers);
        let seed = config
            .training
            .seed
            .unwrap_or_else(|| rand::thread_rng().gen());

        let mut ga = GeneticAlgorithm::with_config(weight_count, config.evolution.clone(), seed);
        ga.initialize_population()?;
        let (counter, complete_rx) = AliveCounter::new();

        log::info!(
            "Trainer ready: {} genotypes of {} weights, seed {}",
            ga.population_size(),
            weight_count,
            seed
        );

        Ok(Self {
            ga,
            environment,
            hidden_layers,
            activation: config.neural.activation,
            counter,
            complete_rx,
            max_generations: config.training.max_generations,
            summary_interval: config.logging.summary_interval.max(1),
            champion: None,
        })
    }

    pub fn set_results_sink(&mut self, sink: Box<dyn ResultsSink + Send>) {
        self.ga.set_results_sink(sink);
    }

    /// Append generation summaries to a fresh run file, returning its path
    pub fn write_results_to<P: AsRef<Path>>(
        &mut self,
        directory: P,
        track: &str,
    ) -> Result<PathBuf, TrainerError> {
        let sink = FileResultsSink::create(directory, track)?;
        let path = sink.path().to_path_buf();
        self.ga.set_results_sink(Box::new(sink));
        Ok(path)
    }

    pub fn genetic_algorithm(&self) -> &GeneticAlgorithm {
        &self.ga
    }

    pub fn environment(&self) -> &E {
        &self.environment
    }

    /// Best genotype evaluated so far, with its evaluation
    pub fn champion(&self) -> Option<&Genotype> {
        self.champion.as_ref()
    }

    /// Whether the configured generation limit has been reached
    pub fn finished(&self) -> bool {
        self.ga.generation_count() > self.max_generations
    }

    /// Evaluate the current population on the track, then evolve it
    pub fn run_generation(&mut self) -> Result<GenerationReport, TrainerError> {
        let generation = self.ga.generation_count();
        let crashes = self.run_episode()?;
        self.update_champion();

        let outcome = self.ga.evolution()?;
        let report = GenerationReport {
            generation,
            average_evaluation: outcome.average_evaluation,
            best_evaluation: outcome.best_evaluation,
            best_fitness: outcome.best_fitness,
            crashes,
        };

        if generation == 1 || generation % self.summary_interval == 0 {
            log::info!("{}", report);
        } else {
            log::debug!("{}", report);
        }
        Ok(report)
    }

    /// Run up to `generations` generations, stopping at the configured limit
    pub fn run(&mut self, generations: u32) -> Result<Vec<GenerationReport>, TrainerError> {
        let mut reports = Vec::with_capacity(generations as usize);
        for _ in 0..generations {
            if self.finished() {
                log::info!("Reached generation limit {}", self.max_generations);
                break;
            }
            reports.push(self.run_generation()?);
        }
        Ok(reports)
    }

    /// Drive every agent in parallel and write its evaluation back, returning the crash count
    fn run_episode(&mut self) -> Result<usize, TrainerError> {
        let environment = &self.environment;
        let counter = &self.counter;
        let hidden_layers = &self.hidden_layers;
        let activation = self.activation;

        let mut agents = self
            .ga
            .population_mut()
            .iter_mut()
            .map(|genotype| {
                let mut agent = DriverAgent::with_hidden_layers(hidden_layers, genotype)?;
                agent.set_activation(activation);
                Ok(agent)
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;

        let episode = counter.restart(agents.len());
        let crashes = agents
            .par_iter_mut()
            .map(|agent| -> Result<usize, TrainerError> {
                let result = drive(environment, agent)?;
                agent.genotype_mut().evaluation = result.evaluation;
                counter.record_death()?;
                Ok(usize::from(result.crashed))
            })
            .try_reduce(|| 0, |a, b| Ok(a + b))?;
        drop(agents);

        self.await_completion(episode)?;
        Ok(crashes)
    }

    fn await_completion(&self, episode: u64) -> Result<(), TrainerError> {
        // Every death has been recorded, so the signal is already queued
        while let Ok(signal) = self.complete_rx.try_recv() {
            if signal.episode == episode {
                return Ok(());
            }
        }
        Err(TrainerError::SignalLost(episode))
    }

    fn update_champion(&mut self) {
        let best = self
            .ga
            .current_population()
            .iter()
            .reduce(|best, g| if g.evaluation > best.evaluation { g } else { best });

        if let Some(best) = best {
            let improved = self
                .champion
                .as_ref()
                .map_or(true, |champion| best.evaluation > champion.evaluation);
            if improved {
                self.champion = Some(best.clone());
            }
        }
    }
}
