//! evodrive - CLI Entry Point
//!
//! Evolves neural-network drivers on a circuit track.

use clap::{Parser, Subcommand};
use evodrive::results::FileResultsSink;
use evodrive::stats::SummaryHistory;
use evodrive::{benchmark, CircuitTrack, Config, Trainer};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "evodrive")]
#[command(version)]
#[command(about = "Neuroevolution of driving agents with a genetic algorithm")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train a population of drivers
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Number of generations to evolve
        #[arg(short, long)]
        generations: Option<u32>,

        /// Output directory for results files
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (minimal output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of generations
        #[arg(short, long, default_value = "20")]
        generations: u32,

        /// Population size
        #[arg(short, long, default_value = "50")]
        population: usize,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            generations,
            output,
            seed,
            quiet,
        } => run_training(config, generations, output, seed, quiet),

        Commands::Benchmark {
            generations,
            population,
        } => {
            init_logging("info");
            run_benchmark(generations, population)
        }

        Commands::Init { output } => {
            init_logging("info");
            generate_config(output)
        }
    }
}

/// `RUST_LOG` takes precedence over the configured level
fn init_logging(default_level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn run_training(
    config_path: PathBuf,
    generations: Option<u32>,
    output: Option<PathBuf>,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    // Load or create config
    let mut config = if config_path.exists() {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    init_logging(if quiet { "warn" } else { config.logging.log_level.as_str() });
    if config_path.exists() {
        log::info!("Loaded config from {:?}", config_path);
    } else {
        log::info!("Using default configuration");
    }

    if seed.is_some() {
        config.training.seed = seed;
    }
    if let Some(dir) = output {
        config.results.directory = dir.to_string_lossy().to_string();
    }
    let generations = generations.unwrap_or(config.training.max_generations);

    let track = CircuitTrack::new(config.track.clone());
    let mut trainer = Trainer::new(&config, track)?;

    let results = FileResultsSink::create(&config.results.directory, &config.results.track)?;
    let results_path = results.path().to_path_buf();
    let history = Arc::new(Mutex::new(SummaryHistory::new()));
    trainer.set_results_sink(Box::new((results, Arc::clone(&history))));

    println!("Starting training");
    println!("  Population: {}", config.evolution.population_size);
    println!("  Hidden layers: {:?}", config.neural.hidden_layers);
    println!("  Generations: {}", generations);
    println!("  Seed: {}", trainer.genetic_algorithm().seed());
    println!();

    let start = Instant::now();
    let reports = trainer.run(generations)?;
    let elapsed = start.elapsed();

    println!();
    println!("=== Training Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Generations: {}", reports.len());
    if let Some(last) = reports.last() {
        println!("Last generation: {}", last);
    }
    if let Some(champion) = trainer.champion() {
        println!("Best evaluation: {:.2}", champion.evaluation);
    }
    println!("Results: {:?}", results_path);

    // Save summary history alongside the results file
    let history_path = results_path.with_extension("json");
    let history = history.lock().map_err(|_| "summary history lock poisoned")?;
    history.save_json(&history_path)?;
    if let Some(champion) = history.champion() {
        println!("Champion: generation {}", champion.generation);
    }
    println!("History: {:?}", history_path);

    Ok(())
}

fn run_benchmark(generations: u32, population: usize) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== evodrive Benchmark ===");
    println!("Generations: {}", generations);
    println!("Population: {}", population);
    println!();

    let result = benchmark(generations, population)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
