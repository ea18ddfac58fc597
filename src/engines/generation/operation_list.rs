//! An ordered breeding pipeline of probabilistic operator stages.

use super::operator::{EvolutionaryOperator, OperatorContext};
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use log::trace;
use rand::{Rng, RngCore};

struct Stage<G: Genome> {
    probability: f64,
    operator: Box<dyn EvolutionaryOperator<G>>,
}

/// Stages run in order on the pool produced by the previous stage.
///
/// The first stage receives the selected parents. Each stage consumes its input
/// in chunks of its `parents_needed()`; a chunk is transformed with the stage's
/// probability and passed through as copies otherwise. A crossover stage
/// followed by a mutation stage is the usual shape.
pub struct OperationList<G: Genome> {
    stages: Vec<Stage<G>>,
}

impl<G: Genome> Default for OperationList<G> {
    fn default() -> Self {
        Self { stages: Vec::new() }
    }
}

impl<G: Genome> OperationList<G> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<O: EvolutionaryOperator<G> + 'static>(&mut self, probability: f64, operator: O) -> Result<()> {
        self.add_boxed(probability, Box::new(operator))
    }

    pub fn add_boxed(&mut self, probability: f64, operator: Box<dyn EvolutionaryOperator<G>>) -> Result<()> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(GeneticError::Configuration(format!(
                "Probability for {} must be in [0, 1], got {}",
                operator.name(),
                probability
            )));
        }
        if operator.parents_needed() == 0 {
            return Err(GeneticError::Configuration(format!(
                "{} needs at least one parent",
                operator.name()
            )));
        }
        self.stages.push(Stage {
            probability,
            operator,
        });
        Ok(())
    }

    pub fn with<O: EvolutionaryOperator<G> + 'static>(mut self, probability: f64, operator: O) -> Result<Self> {
        self.add(probability, operator)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Operator names in stage order
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.operator.name()).collect()
    }

    /// Parents selected per breeding event
    pub fn parents_needed(&self) -> usize {
        self.stages
            .first()
            .map_or(1, |stage| stage.operator.parents_needed())
    }

    /// Offspring per breeding event when every stage fires
    pub fn expected_offspring(&self) -> usize {
        self.stages.iter().fold(self.parents_needed(), |count, stage| {
            count / stage.operator.parents_needed() * stage.operator.offspring_produced()
        })
    }

    pub fn init(&mut self, context: &OperatorContext<G>) -> Result<()> {
        for stage in &mut self.stages {
            stage.operator.init(context)?;
        }
        if !self.is_empty() && self.expected_offspring() == 0 {
            return Err(GeneticError::Configuration(format!(
                "Operation list [{}] produces no offspring",
                self.names().join(", ")
            )));
        }
        Ok(())
    }

    /// Runs every stage over `parents` and returns the final pool
    pub fn perform(&self, rng: &mut dyn RngCore, parents: &[G]) -> Result<Vec<G>> {
        let mut pool = parents.to_vec();

        for stage in &self.stages {
            let needed = stage.operator.parents_needed();
            if pool.len() % needed != 0 {
                return Err(GeneticError::Configuration(format!(
                    "{} takes {} parents but the pipeline hands it {}",
                    stage.operator.name(),
                    needed,
                    pool.len()
                )));
            }

            let mut next = Vec::with_capacity(pool.len());
            for index in (0..pool.len()).step_by(needed) {
                if rng.gen::<f64>() < stage.probability {
                    stage.operator.perform_operation(rng, &pool, index, &mut next)?;
                } else {
                    next.extend_from_slice(&pool[index..index + needed]);
                }
            }
            trace!("{} turned {} genomes into {}", stage.operator.name(), pool.len(), next.len());
            pool = next;
        }

        Ok(pool)
    }
}
