use super::array::{DoubleArrayGenome, IntegerArrayGenome};
use rand::seq::SliceRandom;
use rand::{Rng, RngCore};

/// Fills a freshly factored genome with random genetic material
pub trait GenomeRandomizer<G>: Send + Sync {
    fn randomize(&self, rng: &mut dyn RngCore, genome: &mut G);
}

/// Uniform integers in `[low, high]`
#[derive(Debug, Clone, Copy)]
pub struct IntegerRangeRandomizer {
    low: i64,
    high: i64,
}

impl IntegerRangeRandomizer {
    pub fn new(low: i64, high: i64) -> Self {
        Self {
            low: low.min(high),
            high: low.max(high),
        }
    }
}

impl GenomeRandomizer<IntegerArrayGenome> for IntegerRangeRandomizer {
    fn randomize(&self, rng: &mut dyn RngCore, genome: &mut IntegerArrayGenome) {
        for allele in genome.alleles_mut() {
            *allele = rng.gen_range(self.low..=self.high);
        }
    }
}

/// A shuffled permutation of `0..size`
#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationRandomizer;

impl GenomeRandomizer<IntegerArrayGenome> for PermutationRandomizer {
    fn randomize(&self, rng: &mut dyn RngCore, genome: &mut IntegerArrayGenome) {
        let alleles = genome.alleles_mut();
        for (i, allele) in alleles.iter_mut().enumerate() {
            *allele = i as i64;
        }
        alleles.shuffle(rng);
    }
}

/// Uniform reals in `[low, high)`
#[derive(Debug, Clone, Copy)]
pub struct RealRangeRandomizer {
    low: f64,
    high: f64,
}

impl RealRangeRandomizer {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl GenomeRandomizer<DoubleArrayGenome> for RealRangeRandomizer {
    fn randomize(&self, rng: &mut dyn RngCore, genome: &mut DoubleArrayGenome) {
        let span = self.high - self.low;
        for allele in genome.alleles_mut() {
            *allele = self.low + rng.gen::<f64>() * span;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::ArrayGenome;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_permutation_randomizer_yields_permutation() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut genome = IntegerArrayGenome::new(12);
        PermutationRandomizer.randomize(&mut rng, &mut genome);

        let mut sorted = genome.alleles().to_vec();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..12).collect::<Vec<i64>>());
    }

    #[test]
    fn test_range_randomizers_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut ints = IntegerArrayGenome::new(50);
        IntegerRangeRandomizer::new(-3, 3).randomize(&mut rng, &mut ints);
        assert!(ints.alleles().iter().all(|v| (-3..=3).contains(v)));

        let mut reals = DoubleArrayGenome::new(50);
        RealRangeRandomizer::new(1.0, 2.0).randomize(&mut rng, &mut reals);
        assert!(reals.alleles().iter().all(|v| (1.0..2.0).contains(v)));
    }
}
