//! Integration tests for evodrive

use evodrive::config::ZeroEvaluationPolicy;
use evodrive::evolution::{EvolutionError, EvolutionState};
use evodrive::genetics::{by_fitness_descending, remainder_stochastic_sampling};
use evodrive::stats::SummaryHistory;
use evodrive::{
    driver_weight_count, CircuitTrack, Config, DriverAgent, Environment, GeneticAlgorithm,
    Genotype, NeuralNetwork, Trainer,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::sync::{Arc, Mutex};

#[test]
fn test_zero_network_outputs_half() {
    let mut network = NeuralNetwork::new(&[2, 2, 1]).unwrap();
    network.set_weights(&vec![0.0; network.weight_count()]).unwrap();

    for (x, y) in [(0.0, 0.0), (1.0, -1.0), (250.0, 3.0), (-40.0, 1e6)] {
        assert_eq!(network.process_inputs(&[x, y]).unwrap(), vec![0.5]);
    }
}

#[test]
fn test_initial_weights_in_range() {
    let mut ga = GeneticAlgorithm::new(3, 4);
    ga.initialize_population().unwrap();

    let weights: Vec<f64> = ga
        .current_population()
        .iter()
        .flat_map(|g| g.weights().to_vec())
        .collect();
    assert_eq!(weights.len(), 12);
    assert!(weights.iter().all(|w| (-1.0..1.0).contains(w)));
}

#[test]
fn test_equal_evaluations_select_each_once() {
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let ga = GeneticAlgorithm::new(3, 4);
    let mut population: Vec<Genotype> = (0..4)
        .map(|_| Genotype::generate_random(3, -1.0, 1.0, &mut rng).unwrap())
        .collect();
    for g in &mut population {
        g.evaluation = 1.0;
    }

    ga.fitness_calculation(&mut population).unwrap();
    assert!(population.iter().all(|g| g.fitness == 1.0));

    population.sort_by(by_fitness_descending);
    let pool = remainder_stochastic_sampling(&population, &mut rng);
    assert_eq!(pool.len(), 4);
    assert_eq!(pool.guaranteed, 4);
    assert_eq!(pool.members, vec![0, 1, 2, 3]);
}

#[test]
fn test_single_input_identity_weight() {
    let mut network = NeuralNetwork::new(&[1, 1]).unwrap();
    network.set_weights(&[1.0, 0.0]).unwrap();
    assert_eq!(network.process_inputs(&[0.0]).unwrap(), vec![0.5]);
}

#[test]
fn test_manual_generation_loop() {
    let weight_count = driver_weight_count(&[4, 4, 3]);
    let mut config = Config::default();
    config.evolution.population_size = 10;
    let mut ga = GeneticAlgorithm::with_config(weight_count, config.evolution, 17);
    ga.initialize_population().unwrap();

    let history = Arc::new(Mutex::new(SummaryHistory::new()));
    ga.set_results_sink(Box::new(Arc::clone(&history)));

    let sensors = [120.0, 80.0, 150.0, 80.0, 120.0];
    for generation in 1..=5u32 {
        assert_eq!(ga.generation_count(), generation);

        for genotype in ga.population_mut() {
            let mut agent = DriverAgent::new(genotype).unwrap();
            let action = agent.think(&sensors).unwrap();
            agent.genotype_mut().evaluation = action.engine_force * 100.0;
        }

        // The first best genotype of the generation must survive unchanged
        let best = ga
            .current_population()
            .iter()
            .reduce(|best, g| if g.evaluation > best.evaluation { g } else { best })
            .map(|g| g.weight_copy())
            .unwrap();

        let outcome = ga.evolution().unwrap();
        assert_eq!(outcome.generation, generation);
        assert_eq!(ga.state(), EvolutionState::Idle);

        let population = ga.current_population();
        assert_eq!(population.len(), 10);
        assert!(population.iter().all(|g| g.weight_count() == weight_count));
        assert_eq!(population[0].weights(), best.as_slice());
    }

    let history = history.lock().unwrap();
    assert_eq!(history.summaries.len(), 5);
    assert!(history.summaries.iter().all(|s| s.best_weights.len() == weight_count));
}

#[test]
fn test_failed_evolution_keeps_population() {
    let mut config = Config::default();
    config.evolution.population_size = 3;
    config.evolution.zero_evaluation = ZeroEvaluationPolicy::Fail;
    let mut ga = GeneticAlgorithm::with_config(4, config.evolution, 5);
    ga.initialize_population().unwrap();
    let before: Vec<Vec<f64>> = ga.current_population().iter().map(|g| g.weight_copy()).collect();

    assert_eq!(ga.evolution(), Err(EvolutionError::ZeroAverageEvaluation));

    let after: Vec<Vec<f64>> = ga.current_population().iter().map(|g| g.weight_copy()).collect();
    assert_eq!(before, after);
    assert_eq!(ga.generation_count(), 1);
    assert_eq!(ga.state(), EvolutionState::Idle);
}

#[test]
fn test_trainer_on_circuit() {
    let mut config = Config::default();
    config.evolution.population_size = 16;
    config.training.seed = Some(314);
    config.track.max_ticks = 600;

    let track = CircuitTrack::new(config.track.clone());
    let mut trainer = Trainer::new(&config, track).unwrap();
    let reports = trainer.run(4).unwrap();

    assert_eq!(reports.len(), 4);
    assert_eq!(trainer.genetic_algorithm().generation_count(), 5);
    for report in &reports {
        assert!(report.average_evaluation >= 0.0);
        assert!(report.best_evaluation >= report.average_evaluation);
        assert!(report.crashes <= 16);
    }

    // The champion replays to the evaluation it was credited with
    let mut champion = trainer.champion().unwrap().clone();
    let credited = champion.evaluation;
    let agent = DriverAgent::new(&mut champion).unwrap();
    let replay = evodrive::trainer::drive(trainer.environment(), &agent).unwrap();
    assert_eq!(replay.evaluation, credited);
}

#[test]
fn test_track_sensors_feed_agent() {
    let track = CircuitTrack::new(Default::default());
    let car = track.spawn();
    let readings = track.sense(&car).unwrap();

    let mut genotype = Genotype::zeroed(driver_weight_count(&[4, 4, 3]));
    let agent = DriverAgent::new(&mut genotype).unwrap();
    let action = agent.think(&readings).unwrap();
    assert_eq!(action.engine_force, 0.5);
    assert_eq!(action.direction, 0.5);
}

#[test]
fn test_config_file_drives_training() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");

    let mut config = Config::default();
    config.evolution.population_size = 6;
    config.neural.hidden_layers = vec![3];
    config.training.seed = Some(2);
    config.training.max_generations = 2;
    config.track.max_ticks = 200;
    config.save(&path).unwrap();

    let loaded = Config::from_file(&path).unwrap();
    let track = CircuitTrack::new(loaded.track.clone());
    let mut trainer = Trainer::new(&loaded, track).unwrap();
    let results = trainer.write_results_to(dir.path().join("results"), "tracks/ring.yaml").unwrap();

    assert_eq!(trainer.run(10).unwrap().len(), 2);
    let lines = std::fs::read_to_string(results).unwrap();
    let first = lines.lines().next().unwrap();
    // generation, 4 statistics, then 5*3+3 + 3*2+2 = 26 weights
    assert_eq!(first.split_whitespace().count(), 1 + 4 + 26);
}
