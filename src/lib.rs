//! # evodrive
//!
//! Neuroevolution of autonomous driving agents: fixed-topology feed-forward
//! networks whose weights are evolved by a genetic algorithm.
//!
//! ## Features
//!
//! - **Genetic algorithm**: remainder stochastic sampling, uniform crossover, elitism
//! - **Parallel**: every agent of a generation drives concurrently via Rayon
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use evodrive::{CircuitTrack, Config, Trainer};
//!
//! let config = Config::default();
//! let track = CircuitTrack::new(config.track.clone());
//! let mut trainer = Trainer::new(&config, track).unwrap();
//!
//! for report in trainer.run(50).unwrap() {
//!     println!("{}", report);
//! }
//! ```
//!
//! ## Driving the algorithm directly
//!
//! ```rust
//! use evodrive::{DriverAgent, GeneticAlgorithm, driver_weight_count};
//!
//! let mut ga = GeneticAlgorithm::new(driver_weight_count(&[4, 4, 3]), 10);
//! ga.initialize_population().unwrap();
//!
//! for (i, genotype) in ga.population_mut().iter_mut().enumerate() {
//!     let mut agent = DriverAgent::new(genotype).unwrap();
//!     let action = agent.think(&[120.0, 80.0, 150.0, 80.0, 120.0]).unwrap();
//!     agent.genotype_mut().evaluation = action.engine_force + i as f64;
//! }
//!
//! ga.evolution().unwrap();
//! assert_eq!(ga.generation_count(), 2);
//! ```

pub mod agent;
pub mod config;
pub mod episode;
pub mod evolution;
pub mod genetics;
pub mod neural;
pub mod results;
pub mod stats;
pub mod track;
pub mod trainer;

// Re-export main types
pub use agent::{driver_weight_count, DriverAction, DriverAgent};
pub use config::Config;
pub use evolution::GeneticAlgorithm;
pub use genetics::Genotype;
pub use neural::NeuralNetwork;
pub use track::{CircuitTrack, Environment};
pub use trainer::{GenerationReport, Trainer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Train on the default circuit for a number of generations and time it
pub fn benchmark(
    generations: u32,
    population: usize,
) -> Result<BenchmarkResult, trainer::TrainerError> {
    use std::time::Instant;

    let mut config = Config::default();
    config.evolution.population_size = population;
    config.training.max_generations = generations;

    let track = CircuitTrack::new(config.track.clone());
    let mut trainer = Trainer::new(&config, track)?;

    let start = Instant::now();
    let reports = trainer.run(generations)?;
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        generations: reports.len() as u32,
        population,
        elapsed_secs: elapsed.as_secs_f64(),
        generations_per_second: reports.len() as f64 / elapsed.as_secs_f64(),
        best_evaluation: reports
            .iter()
            .map(|r| r.best_evaluation)
            .fold(0.0, f64::max),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub generations: u32,
    pub population: usize,
    pub elapsed_secs: f64,
    pub generations_per_second: f64,
    pub best_evaluation: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Generations: {}", self.generations)?;
        writeln!(f, "Population: {}", self.population)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} generations/s", self.generations_per_second)?;
        writeln!(f, "Best evaluation: {:.2}", self.best_evaluation)?;
        Ok(())
    }
}
