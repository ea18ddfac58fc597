//! The contract shared by crossover and mutation operators.

use crate::error::{GeneticError, Result};
use crate::genome::{Genome, GenomeFactory};
use crate::types::{ObjectiveSense, PopulationId};
use rand::RngCore;
use std::sync::Arc;

/// What an operator may learn about the population that owns it
pub struct OperatorContext<G: Genome> {
    pub population: PopulationId,
    pub factory: Arc<dyn GenomeFactory<G>>,
    pub sense: ObjectiveSense,
}

impl<G: Genome> Clone for OperatorContext<G> {
    fn clone(&self) -> Self {
        Self {
            population: self.population,
            factory: Arc::clone(&self.factory),
            sense: self.sense,
        }
    }
}

/// Transforms parent genomes into offspring.
///
/// Operators read `parents_needed()` genomes starting at `parent_index` and
/// append exactly `offspring_produced()` new genomes to `offspring`. Parents are
/// never modified.
pub trait EvolutionaryOperator<G: Genome>: Send + Sync {
    fn name(&self) -> &'static str;

    fn parents_needed(&self) -> usize;

    fn offspring_produced(&self) -> usize;

    /// Called once before the first operation
    fn init(&mut self, context: &OperatorContext<G>) -> Result<()>;

    fn perform_operation(
        &self,
        rng: &mut dyn RngCore,
        parents: &[G],
        parent_index: usize,
        offspring: &mut Vec<G>,
    ) -> Result<()>;
}

/// Factory slot filled in by `init`
pub(crate) struct FactorySlot<G: Genome>(Option<Arc<dyn GenomeFactory<G>>>);

impl<G: Genome> FactorySlot<G> {
    pub(crate) fn empty() -> Self {
        FactorySlot(None)
    }

    pub(crate) fn set(&mut self, context: &OperatorContext<G>) {
        self.0 = Some(Arc::clone(&context.factory));
    }

    /// A fresh genome, checked against the expected length
    pub(crate) fn factor(&self, operator: &str, expected_size: usize) -> Result<G> {
        let factory = self.0.as_ref().ok_or_else(|| {
            GeneticError::Configuration(format!("{} used before init", operator))
        })?;
        let genome = factory.factor();
        if genome.size() != expected_size {
            return Err(GeneticError::SizeMismatch {
                expected: expected_size,
                actual: genome.size(),
            });
        }
        Ok(genome)
    }
}

/// The `count` parents starting at `parent_index`
pub(crate) fn parent_window<G>(parents: &[G], parent_index: usize, count: usize) -> Result<&[G]> {
    let available = parents.len().saturating_sub(parent_index);
    if available < count {
        return Err(GeneticError::InsufficientParents {
            needed: count,
            available,
        });
    }
    Ok(&parents[parent_index..parent_index + count])
}
