//! Complete (uniform) crossover between two genotypes.

use super::Genotype;
use rand::Rng;

/// Produce two offspring by swapping each weight with probability `swap_probability`.
///
/// Offspring weights are always copied verbatim from one parent, never blended.
/// Both offspring start with zero evaluation and fitness.
pub fn complete_crossover<R: Rng + ?Sized>(
    parent1: &Genotype,
    parent2: &Genotype,
    swap_probability: f64,
    rng: &mut R,
) -> (Genotype, Genotype) {
    debug_assert_eq!(parent1.weight_count(), parent2.weight_count());

    let (weights1, weights2): (Vec<f64>, Vec<f64>) = parent1
        .weights()
        .iter()
        .zip(parent2.weights())
        .map(|(&w1, &w2)| {
            if rng.gen::<f64>() < swap_probability {
                (w2, w1)
            } else {
                (w1, w2)
            }
        })
        .unzip();

    (Genotype::new(weights1), Genotype::new(weights2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn parents() -> (Genotype, Genotype) {
        let p1 = Genotype::new((0..50).map(|i| i as f64).collect());
        let p2 = Genotype::new((0..50).map(|i| -(i as f64) - 1000.0).collect());
        (p1, p2)
    }

    #[test]
    fn test_offspring_weights_come_from_parents() {
        let (p1, p2) = parents();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let (c1, c2) = complete_crossover(&p1, &p2, 0.6, &mut rng);

        assert_eq!(c1.weight_count(), 50);
        assert_eq!(c2.weight_count(), 50);
        for i in 0..50 {
            if c1[i] == p1[i] {
                assert_eq!(c2[i], p2[i]);
            } else {
                assert_eq!(c1[i], p2[i]);
                assert_eq!(c2[i], p1[i]);
            }
        }
    }

    #[test]
    fn test_no_swap_copies_parents() {
        let (p1, p2) = parents();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let (c1, c2) = complete_crossover(&p1, &p2, 0.0, &mut rng);
        assert_eq!(c1.weights(), p1.weights());
        assert_eq!(c2.weights(), p2.weights());
    }

    #[test]
    fn test_always_swap_exchanges_parents() {
        let (p1, p2) = parents();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let (c1, c2) = complete_crossover(&p1, &p2, 1.0, &mut rng);
        assert_eq!(c1.weights(), p2.weights());
        assert_eq!(c2.weights(), p1.weights());
    }

    #[test]
    fn test_offspring_scores_reset() {
        let (mut p1, mut p2) = parents();
        p1.evaluation = 10.0;
        p2.fitness = 3.0;
        let mut rng = ChaCha8Rng::seed_from_u64(5);

        let (c1, c2) = complete_crossover(&p1, &p2, 0.6, &mut rng);
        assert_eq!((c1.evaluation, c1.fitness), (0.0, 0.0));
        assert_eq!((c2.evaluation, c2.fitness), (0.0, 0.0));
    }
}
