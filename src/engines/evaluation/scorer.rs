//! Parallel fitness evaluation.
//!
//! Scoring is the only phase of a generation that runs on more than one
//! thread. Every genome is scored by its own task on a bounded rayon pool;
//! tasks touch disjoint genomes and share only the read-only scorer and
//! adjusters, and the call returns after every task has finished.

use super::adjuster::ScoreAdjuster;
use super::decoder::GenomeScorer;
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::Population;
use log::{debug, warn};
use rayon::prelude::*;
use serde::Serialize;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// What happened to a single genome during scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreOutcome {
    Scored,
    /// The decoder produced no phenotype
    Undecodable,
    /// The score function returned an error or panicked
    Failed,
}

/// Per-generation tally of scoring outcomes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScoringReport {
    pub scored: usize,
    pub undecodable: usize,
    pub failed: usize,
}

impl ScoringReport {
    pub fn total(&self) -> usize {
        self.scored + self.undecodable + self.failed
    }

    fn record(mut self, outcome: ScoreOutcome) -> Self {
        match outcome {
            ScoreOutcome::Scored => self.scored += 1,
            ScoreOutcome::Undecodable => self.undecodable += 1,
            ScoreOutcome::Failed => self.failed += 1,
        }
        self
    }
}

pub struct ParallelScorer<G> {
    scorer: Arc<dyn GenomeScorer<G>>,
    adjusters: Vec<Box<dyn ScoreAdjuster<G>>>,
    pool: rayon::ThreadPool,
}

impl<G: Genome> ParallelScorer<G> {
    /// Builds a scorer with its own pool of `threads` workers (0 lets rayon pick)
    pub fn new(scorer: Arc<dyn GenomeScorer<G>>, threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("evoforge-score-{}", i))
            .build()
            .map_err(|e| GeneticError::Configuration(format!("Failed to build scoring pool: {}", e)))?;

        Ok(Self {
            scorer,
            adjusters: Vec::new(),
            pool,
        })
    }

    pub fn with_adjuster<A: ScoreAdjuster<G> + 'static>(mut self, adjuster: A) -> Self {
        self.adjusters.push(Box::new(adjuster));
        self
    }

    pub fn add_adjuster(&mut self, adjuster: Box<dyn ScoreAdjuster<G>>) {
        self.adjusters.push(adjuster);
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Scores one genome, writing raw and adjusted score back onto it.
    ///
    /// Decode failures, score errors and panics in the score function or an
    /// adjuster leave both scores NaN.
    pub fn score_genome(&self, genome: &mut G) -> ScoreOutcome {
        let result = panic::catch_unwind(AssertUnwindSafe(|| -> anyhow::Result<Option<(f64, f64)>> {
            let scored = self.scorer.score_genome(&*genome)?;
            Ok(scored.map(|raw| {
                let adjusted = self
                    .adjusters
                    .iter()
                    .fold(raw, |adjusted, adjuster| adjuster.adjust(&*genome, raw, adjusted));
                (raw, adjusted)
            }))
        }));

        match result {
            Ok(Ok(Some((raw, adjusted)))) => {
                genome.meta_mut().set_scores(raw, adjusted);
                if raw.is_nan() {
                    ScoreOutcome::Failed
                } else {
                    ScoreOutcome::Scored
                }
            }
            Ok(Ok(None)) => {
                genome.meta_mut().clear_scores();
                ScoreOutcome::Undecodable
            }
            Ok(Err(e)) => {
                warn!("Score function failed: {:#}", e);
                genome.meta_mut().clear_scores();
                ScoreOutcome::Failed
            }
            Err(_) => {
                warn!("Scoring panicked; genome left unscored");
                genome.meta_mut().clear_scores();
                ScoreOutcome::Failed
            }
        }
    }

    /// Scores every genome of the population and waits for all tasks
    pub fn score_population(&self, population: &mut Population<G>) -> ScoringReport {
        let mut targets = population.genomes_mut();
        let outcomes: Vec<ScoreOutcome> = self.pool.install(|| {
            targets
                .par_iter_mut()
                .map(|genome| self.score_genome(genome))
                .collect()
        });

        let report = outcomes
            .into_iter()
            .fold(ScoringReport::default(), ScoringReport::record);
        debug!(
            "Scored {} genomes ({} undecodable, {} failed)",
            report.total(),
            report.undecodable,
            report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engines::evaluation::DirectScorer;
    use crate::genome::{IntegerArrayGenome, IntegerArrayGenomeFactory};
    use crate::population::Species;
    use crate::types::{ObjectiveSense, SpeciesId};

    fn population(alleles: Vec<Vec<i64>>) -> Population<IntegerArrayGenome> {
        let members: Vec<_> = alleles.into_iter().map(IntegerArrayGenome::from_alleles).collect();
        let mut pop = Population::new(
            members.len(),
            Arc::new(IntegerArrayGenomeFactory::new(2)),
            ObjectiveSense::Maximize,
        );
        pop.add_species(Species::with_members(SpeciesId(0), members));
        pop
    }

    #[test]
    fn test_failures_become_nan_without_aborting() {
        let scorer = ParallelScorer::new(
            Arc::new(DirectScorer::new(|g: &IntegerArrayGenome| -> anyhow::Result<f64> {
                if g.get(0) < 0 {
                    anyhow::bail!("negative allele");
                }
                Ok(g.iter().sum::<i64>() as f64)
            })),
            2,
        )
        .unwrap();

        let mut pop = population(vec![vec![1, 2], vec![-1, 5], vec![3, 4]]);
        let report = scorer.score_population(&mut pop);

        assert_eq!(report, ScoringReport { scored: 2, undecodable: 0, failed: 1 });
        let scores: Vec<f64> = pop.genomes().map(|g| g.score()).collect();
        assert_eq!(scores[0], 3.0);
        assert!(scores[1].is_nan());
        assert_eq!(scores[2], 7.0);
    }

    #[test]
    fn test_panics_are_isolated() {
        let scorer = ParallelScorer::new(
            Arc::new(DirectScorer::new(|g: &IntegerArrayGenome| -> anyhow::Result<f64> {
                if g.get(0) == 0 {
                    panic!("boom");
                }
                Ok(1.0)
            })),
            1,
        )
        .unwrap();

        let mut genome = IntegerArrayGenome::new(2);
        assert_eq!(scorer.score_genome(&mut genome), ScoreOutcome::Failed);
        assert!(genome.score().is_nan());
        assert!(genome.adjusted_score().is_nan());
    }
}
