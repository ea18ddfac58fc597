//! Two-point crossover operators for array genomes.

use super::operator::{parent_window, EvolutionaryOperator, FactorySlot, OperatorContext};
use crate::error::{GeneticError, Result};
use crate::genome::{ArrayGenome, Genome, IntegerArrayGenome};
use rand::{Rng, RngCore};
use std::collections::HashSet;

/// Draws the inclusive cut region `[cut1, cut1 + cut_length]`
fn cut_points(rng: &mut dyn RngCore, length: usize, cut_length: usize) -> Result<(usize, usize)> {
    if cut_length >= length {
        return Err(GeneticError::Configuration(format!(
            "Cut length {} must be shorter than the genome length {}",
            cut_length, length
        )));
    }
    let cut1 = rng.gen_range(0..length - cut_length);
    Ok((cut1, cut1 + cut_length))
}

fn matching_sizes<G: Genome>(mother: &G, father: &G) -> Result<usize> {
    if mother.size() != father.size() {
        return Err(GeneticError::SizeMismatch {
            expected: mother.size(),
            actual: father.size(),
        });
    }
    Ok(mother.size())
}

/// Two-point crossover that allows repeated values.
///
/// Inside the cut region the first offspring takes the father's alleles and the
/// second the mother's; outside it the roles swap. The mother is the parent at
/// `parent_index` and the father the one after it.
pub struct Splice<G: Genome> {
    cut_length: usize,
    factory: FactorySlot<G>,
}

impl<G: Genome> Splice<G> {
    pub fn new(cut_length: usize) -> Self {
        Self {
            cut_length,
            factory: FactorySlot::empty(),
        }
    }

    pub fn cut_length(&self) -> usize {
        self.cut_length
    }
}

impl<G: ArrayGenome> EvolutionaryOperator<G> for Splice<G> {
    fn name(&self) -> &'static str {
        "splice"
    }

    fn parents_needed(&self) -> usize {
        2
    }

    fn offspring_produced(&self) -> usize {
        2
    }

    fn init(&mut self, context: &OperatorContext<G>) -> Result<()> {
        self.factory.set(context);
        Ok(())
    }

    fn perform_operation(
        &self,
        rng: &mut dyn RngCore,
        parents: &[G],
        parent_index: usize,
        offspring: &mut Vec<G>,
    ) -> Result<()> {
        let pair = parent_window(parents, parent_index, 2)?;
        let (mother, father) = (&pair[0], &pair[1]);
        let length = matching_sizes(mother, father)?;

        let mut first = self.factory.factor(self.name(), length)?;
        let mut second = self.factory.factor(self.name(), length)?;
        let (cut1, cut2) = cut_points(rng, length, self.cut_length)?;

        for i in 0..length {
            if (cut1..=cut2).contains(&i) {
                first.copy_allele(father, i, i);
                second.copy_allele(mother, i, i);
            } else {
                first.copy_allele(mother, i, i);
                second.copy_allele(father, i, i);
            }
        }

        offspring.push(first);
        offspring.push(second);
        Ok(())
    }
}

/// Two-point crossover for permutation genomes.
///
/// The cut region is copied as in [`Splice`]. Every other position is filled
/// with the first value of the mother (first offspring) or father (second
/// offspring) that the offspring does not hold yet, so permutation parents
/// always produce permutations.
pub struct SpliceNoRepeat {
    cut_length: usize,
    factory: FactorySlot<IntegerArrayGenome>,
}

impl SpliceNoRepeat {
    pub fn new(cut_length: usize) -> Self {
        Self {
            cut_length,
            factory: FactorySlot::empty(),
        }
    }

    pub fn cut_length(&self) -> usize {
        self.cut_length
    }

    /// First value of `source` not yet taken; marks it taken
    fn get_not_taken(source: &IntegerArrayGenome, taken: &mut HashSet<i64>) -> Result<i64> {
        source
            .iter()
            .copied()
            .find(|value| taken.insert(*value))
            .ok_or(GeneticError::ExhaustedValues)
    }
}

impl EvolutionaryOperator<IntegerArrayGenome> for SpliceNoRepeat {
    fn name(&self) -> &'static str {
        "splice-no-repeat"
    }

    fn parents_needed(&self) -> usize {
        2
    }

    fn offspring_produced(&self) -> usize {
        2
    }

    fn init(&mut self, context: &OperatorContext<IntegerArrayGenome>) -> Result<()> {
        self.factory.set(context);
        Ok(())
    }

    fn perform_operation(
        &self,
        rng: &mut dyn RngCore,
        parents: &[IntegerArrayGenome],
        parent_index: usize,
        offspring: &mut Vec<IntegerArrayGenome>,
    ) -> Result<()> {
        let pair = parent_window(parents, parent_index, 2)?;
        let (mother, father) = (&pair[0], &pair[1]);
        let length = matching_sizes(mother, father)?;

        let mut first = self.factory.factor(self.name(), length)?;
        let mut second = self.factory.factor(self.name(), length)?;
        let (cut1, cut2) = cut_points(rng, length, self.cut_length)?;

        let mut taken1 = HashSet::with_capacity(length);
        let mut taken2 = HashSet::with_capacity(length);

        for i in cut1..=cut2 {
            first.copy_allele(father, i, i);
            second.copy_allele(mother, i, i);
            taken1.insert(father.get(i));
            taken2.insert(mother.get(i));
        }

        for i in (0..cut1).chain(cut2 + 1..length) {
            first.set(i, Self::get_not_taken(mother, &mut taken1)?);
            second.set(i, Self::get_not_taken(father, &mut taken2)?);
        }

        offspring.push(first);
        offspring.push(second);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{IntegerArrayGenomeFactory, PermutationRandomizer, GenomeRandomizer};
    use crate::types::{ObjectiveSense, PopulationId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn context(size: usize) -> OperatorContext<IntegerArrayGenome> {
        OperatorContext {
            population: PopulationId::next(),
            factory: Arc::new(IntegerArrayGenomeFactory::new(size)),
            sense: ObjectiveSense::Maximize,
        }
    }

    #[test]
    fn test_splice_offspring_are_complementary() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut splice: Splice<IntegerArrayGenome> = Splice::new(3);
        splice.init(&context(8)).unwrap();

        let mother = IntegerArrayGenome::from_alleles((0..8).collect());
        let father = IntegerArrayGenome::from_alleles((100..108).collect());
        let parents = vec![mother.clone(), father.clone()];

        for _ in 0..50 {
            let mut offspring = Vec::new();
            splice.perform_operation(&mut rng, &parents, 0, &mut offspring).unwrap();
            assert_eq!(offspring.len(), 2);

            let mut from_father = 0;
            for i in 0..8 {
                let (a, b) = (offspring[0].get(i), offspring[1].get(i));
                assert!(
                    (a == mother.get(i) && b == father.get(i))
                        || (a == father.get(i) && b == mother.get(i))
                );
                if a == father.get(i) {
                    from_father += 1;
                }
            }
            // Inclusive region of cut_length + 1 positions
            assert_eq!(from_father, 4);
        }
    }

    #[test]
    fn test_splice_requires_init() {
        let mut rng = StdRng::seed_from_u64(1);
        let splice: Splice<IntegerArrayGenome> = Splice::new(1);
        let parents = vec![IntegerArrayGenome::new(4), IntegerArrayGenome::new(4)];
        let mut offspring = Vec::new();
        let result = splice.perform_operation(&mut rng, &parents, 0, &mut offspring);
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_splice_rejects_missing_father() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut splice: Splice<IntegerArrayGenome> = Splice::new(1);
        splice.init(&context(4)).unwrap();
        let parents = vec![IntegerArrayGenome::new(4)];
        let mut offspring = Vec::new();
        let result = splice.perform_operation(&mut rng, &parents, 0, &mut offspring);
        assert!(matches!(
            result,
            Err(GeneticError::InsufficientParents { needed: 2, available: 1 })
        ));
    }

    #[test]
    fn test_splice_no_repeat_preserves_permutations() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut operator = SpliceNoRepeat::new(3);
        operator.init(&context(10)).unwrap();

        for _ in 0..50 {
            let mut mother = IntegerArrayGenome::new(10);
            let mut father = IntegerArrayGenome::new(10);
            PermutationRandomizer.randomize(&mut rng, &mut mother);
            PermutationRandomizer.randomize(&mut rng, &mut father);

            let mut offspring = Vec::new();
            operator
                .perform_operation(&mut rng, &[mother, father], 0, &mut offspring)
                .unwrap();

            for child in &offspring {
                let mut values: Vec<i64> = child.iter().copied().collect();
                values.sort_unstable();
                assert_eq!(values, (0..10).collect::<Vec<i64>>());
            }
        }
    }

    #[test]
    fn test_splice_no_repeat_exhausts_on_non_permutations() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut operator = SpliceNoRepeat::new(1);
        operator.init(&context(4)).unwrap();

        let mother = IntegerArrayGenome::from_alleles(vec![1, 1, 1, 1]);
        let father = IntegerArrayGenome::from_alleles(vec![2, 2, 2, 2]);
        let mut offspring = Vec::new();
        let result = operator.perform_operation(&mut rng, &[mother, father], 0, &mut offspring);
        assert!(matches!(result, Err(GeneticError::ExhaustedValues)));
    }
}
