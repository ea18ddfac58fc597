//! Single-parent mutation operators.

use super::operator::{parent_window, EvolutionaryOperator, FactorySlot, OperatorContext};
use crate::error::Result;
use crate::genome::{ArrayGenome, DoubleArrayGenome, Genome};
use rand::{Rng, RngCore};

/// Scales every allele by a factor drawn uniformly from `[1 - amount, 1 + amount]`
pub struct MutatePerturb {
    amount: f64,
    factory: FactorySlot<DoubleArrayGenome>,
}

impl MutatePerturb {
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            factory: FactorySlot::empty(),
        }
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }
}

impl EvolutionaryOperator<DoubleArrayGenome> for MutatePerturb {
    fn name(&self) -> &'static str {
        "perturb"
    }

    fn parents_needed(&self) -> usize {
        1
    }

    fn offspring_produced(&self) -> usize {
        1
    }

    fn init(&mut self, context: &OperatorContext<DoubleArrayGenome>) -> Result<()> {
        self.factory.set(context);
        Ok(())
    }

    fn perform_operation(
        &self,
        rng: &mut dyn RngCore,
        parents: &[DoubleArrayGenome],
        parent_index: usize,
        offspring: &mut Vec<DoubleArrayGenome>,
    ) -> Result<()> {
        let parent = &parent_window(parents, parent_index, 1)?[0];
        let mut child = self.factory.factor(self.name(), parent.size())?;

        for (i, &value) in parent.iter().enumerate() {
            let factor = self.amount - rng.gen::<f64>() * self.amount * 2.0;
            child.set(i, value + value * factor);
        }

        offspring.push(child);
        Ok(())
    }
}

/// Copies the parent and swaps two distinct positions
pub struct MutateShuffle<G: Genome> {
    factory: FactorySlot<G>,
}

impl<G: Genome> MutateShuffle<G> {
    pub fn new() -> Self {
        Self {
            factory: FactorySlot::empty(),
        }
    }
}

impl<G: Genome> Default for MutateShuffle<G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: ArrayGenome> EvolutionaryOperator<G> for MutateShuffle<G> {
    fn name(&self) -> &'static str {
        "shuffle"
    }

    fn parents_needed(&self) -> usize {
        1
    }

    fn offspring_produced(&self) -> usize {
        1
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
        let parent = &parent_window(parents, parent_index, 1)?[0];
        let length = parent.size();
        let mut child = self.factory.factor(self.name(), length)?;
        child.copy_from(parent)?;

        if length > 1 {
            let i = rng.gen_range(0..length);
            let mut j = rng.gen_range(0..length - 1);
            if j >= i {
                j += 1;
            }
            child.swap(i, j);
        }

        offspring.push(child);
        Ok(())
    }
}
