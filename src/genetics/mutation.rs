//! Genotype weight mutations.

use super::Genotype;
use rand::Rng;

/// Configuration for mutation operations
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MutationConfig {
    /// Probability of mutating each weight
    pub probability: f64,
    /// Maximum magnitude of a weight perturbation
    pub amount: f64,
    /// Probability that a genotype is mutated at all
    pub percentage: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            probability: 0.3,
            amount: 2.0,
            percentage: 1.0,
        }
    }
}

/// Perturb each weight with probability `config.probability` by a delta in `[-amount, amount]`
pub fn mutate_genotype<R: Rng + ?Sized>(genotype: &mut Genotype, config: &MutationConfig, rng: &mut R) {
    let amount = config.amount.abs();
    for w in genotype.weights_mut() {
        if rng.gen::<f64>() < config.probability {
            *w += rng.gen_range(-amount..=amount);
        }
    }
}

/// Mutate every genotype except the first `n`, each with probability `config.percentage`.
///
/// Returns how many genotypes were mutated.
pub fn mutate_all_but_best_n<R: Rng + ?Sized>(
    population: &mut [Genotype],
    n: usize,
    config: &MutationConfig,
    rng: &mut R,
) -> usize {
    let mut mutated = 0;
    for genotype in population.iter_mut().skip(n) {
        if rng.gen::<f64>() < config.percentage {
            mutate_genotype(genotype, config, rng);
            mutated += 1;
        }
    }
    mutated
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_weight_mutation() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut g = Genotype::zeroed(100);

        let config = MutationConfig {
            probability: 1.0,
            amount: 0.1,
            percentage: 1.0,
        };
        mutate_genotype(&mut g, &config, &mut rng);

        assert_eq!(g.weight_count(), 100);
        assert!(g.weights().iter().all(|&w| (-0.1..=0.1).contains(&w)));
        assert!(g.weights().iter().any(|&w| w != 0.0), "Weights should change after mutation");
    }

    #[test]
    fn test_zero_probability_is_noop() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut g = Genotype::new(vec![0.5; 20]);

        let config = MutationConfig {
            probability: 0.0,
            ..MutationConfig::default()
        };
        mutate_genotype(&mut g, &config, &mut rng);

        assert_eq!(g.weights(), &[0.5; 20]);
    }

    #[test]
    fn test_delta_bounded_by_amount() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let original = Genotype::new(vec![1.0; 200]);
        let mut g = original.clone();

        mutate_genotype(&mut g, &MutationConfig::default(), &mut rng);

        for (a, b) in g.weights().iter().zip(original.weights()) {
            assert!((a - b).abs() <= 2.0);
        }
    }

    #[test]
    fn test_elite_untouched() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut population: Vec<Genotype> = (0..5).map(|_| Genotype::zeroed(30)).collect();
        let config = MutationConfig {
            probability: 1.0,
            amount: 1.0,
            percentage: 1.0,
        };

        let mutated = mutate_all_but_best_n(&mut population, 2, &config, &mut rng);

        assert_eq!(mutated, 3);
        assert!(population[0].weights().iter().all(|&w| w == 0.0));
        assert!(population[1].weights().iter().all(|&w| w == 0.0));
        for g in &population[2..] {
            assert!(g.weights().iter().any(|&w| w != 0.0));
            assert_eq!(g.weight_count(), 30);
        }
    }
}
