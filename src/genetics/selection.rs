//! Remainder stochastic sampling.

use super::Genotype;
use rand::Rng;

/// Parent pool produced by selection, as indices into the sorted population
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IntermediatePopulation {
    /// Indices, possibly repeated; a genotype may be picked several times
    pub members: Vec<usize>,
    /// How many members came from the deterministic first pass
    pub guaranteed: usize,
}

impl IntermediatePopulation {
    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Build the intermediate population from genotypes in descending fitness order.
///
/// First pass: every genotype with `fitness >= 1` contributes `floor(fitness)` copies,
/// stopping at the first genotype below 1. Second pass: every genotype contributes one
/// more copy with probability equal to the fractional part of its fitness. Members are
/// positions in the iteration order.
pub fn remainder_stochastic_sampling<'a, I, R>(sorted: I, rng: &mut R) -> IntermediatePopulation
where
    I: IntoIterator<Item = &'a Genotype>,
    I::IntoIter: Clone,
    R: Rng + ?Sized,
{
    let sorted = sorted.into_iter();
    let mut members = Vec::with_capacity(sorted.size_hint().0);

    for (idx, genotype) in sorted.clone().enumerate() {
        if genotype.fitness < 1.0 {
            break;
        }
        let copies = genotype.fitness.floor() as usize;
        members.extend(std::iter::repeat(idx).take(copies));
    }
    let guaranteed = members.len();

    for (idx, genotype) in sorted.enumerate() {
        let remainder = genotype.fitness - genotype.fitness.floor();
        if rng.gen::<f64>() < remainder {
            members.push(idx);
        }
    }

    IntermediatePopulation {
        members,
        guaranteed,
    }
}
