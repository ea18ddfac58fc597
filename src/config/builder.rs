//! Wiring an [`EvolutionaryAlgorithm`] from an [`AppConfig`].

use super::evolution::Representation;
use super::manager::AppConfig;
use super::operators::{CrossoverKind, MutationKind};
use super::selection::SelectionMethod;
use super::speciation::SpeciationMethod;
use crate::engines::evaluation::{ComplexityAdjustedScore, GenomeScorer, ParallelScorer};
use crate::engines::generation::{
    EndIterations, EvolutionaryAlgorithm, EvolutionaryOperator, LogProgressCallback,
    MutatePerturb, MutateShuffle, NoImprovement, OperationList, SelectionOperator, Splice,
    SpliceNoRepeat, TargetScore, TournamentSelection, TruncationSelection,
};
use crate::engines::validation::{PermutationConstraint, RuleHolder};
use crate::error::{GeneticError, Result};
use crate::genome::{
    Allele, AlleleGenome, ArrayGenomeFactory, DoubleArrayGenome, GenomeRandomizer,
    IntegerArrayGenome, IntegerRangeRandomizer, PermutationRandomizer, RealRangeRandomizer,
};
use crate::population::{EuclideanDistance, Population, SingleSpeciation, Speciation, ThresholdSpeciation};
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;

/// Offsets the population-initialisation stream from the engine's stream
const INIT_SEED_OFFSET: u64 = 0x9E37_79B9_7F4A_7C15;

pub struct EngineBuilder {
    config: AppConfig,
}

impl EngineBuilder {
    pub fn new(config: AppConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Engine over integer genomes (`integer` or `permutation` representation)
    pub fn build_integer(
        &self,
        scorer: Arc<dyn GenomeScorer<IntegerArrayGenome>>,
    ) -> Result<EvolutionaryAlgorithm<IntegerArrayGenome>> {
        let evolution = &self.config.evolution;
        self.expect_representation(<i64 as Allele>::REPRESENTATION)?;

        let randomizer: Box<dyn GenomeRandomizer<IntegerArrayGenome>> = match evolution.representation {
            Representation::Permutation => Box::new(PermutationRandomizer),
            _ => Box::new(IntegerRangeRandomizer::new(
                evolution.initial_low.round() as i64,
                evolution.initial_high.round() as i64,
            )),
        };

        let ops = &self.config.operators;
        let crossover: Option<Box<dyn EvolutionaryOperator<IntegerArrayGenome>>> = match ops.crossover {
            CrossoverKind::None => None,
            CrossoverKind::Splice => Some(Box::new(Splice::<IntegerArrayGenome>::new(ops.cut_length))),
            CrossoverKind::SpliceNoRepeat => Some(Box::new(SpliceNoRepeat::new(ops.cut_length))),
        };
        let mutation: Option<Box<dyn EvolutionaryOperator<IntegerArrayGenome>>> = match ops.mutation {
            MutationKind::None => None,
            MutationKind::Shuffle => Some(Box::new(MutateShuffle::<IntegerArrayGenome>::new())),
            MutationKind::Perturb => {
                return Err(GeneticError::RepresentationMismatch {
                    expected: "real-array".to_string(),
                    actual: "integer-array".to_string(),
                })
            }
        };

        let mut rules = RuleHolder::new();
        if evolution.representation == Representation::Permutation {
            rules.add_constraint_rule(Box::new(PermutationConstraint));
        }

        self.assemble(scorer, randomizer.as_ref(), crossover, mutation, rules)
    }

    /// Engine over real genomes (`real` representation)
    pub fn build_real(
        &self,
        scorer: Arc<dyn GenomeScorer<DoubleArrayGenome>>,
    ) -> Result<EvolutionaryAlgorithm<DoubleArrayGenome>> {
        let evolution = &self.config.evolution;
        self.expect_representation(<f64 as Allele>::REPRESENTATION)?;

        let randomizer = RealRangeRandomizer::new(evolution.initial_low, evolution.initial_high);

        let ops = &self.config.operators;
        let crossover: Option<Box<dyn EvolutionaryOperator<DoubleArrayGenome>>> = match ops.crossover {
            CrossoverKind::None => None,
            CrossoverKind::Splice => Some(Box::new(Splice::<DoubleArrayGenome>::new(ops.cut_length))),
            CrossoverKind::SpliceNoRepeat => {
                return Err(GeneticError::RepresentationMismatch {
                    expected: "integer-array".to_string(),
                    actual: "real-array".to_string(),
                })
            }
        };
        let mutation: Option<Box<dyn EvolutionaryOperator<DoubleArrayGenome>>> = match ops.mutation {
            MutationKind::None => None,
            MutationKind::Shuffle => Some(Box::new(MutateShuffle::<DoubleArrayGenome>::new())),
            MutationKind::Perturb => Some(Box::new(MutatePerturb::new(ops.perturb_amount))),
        };

        self.assemble(scorer, &randomizer, crossover, mutation, RuleHolder::new())
    }

    fn expect_representation(&self, actual: &str) -> Result<()> {
        let expected = self.config.evolution.representation.genome_representation();
        if expected != actual {
            return Err(GeneticError::RepresentationMismatch {
                expected: expected.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }

    fn assemble<T: Allele>(
        &self,
        scorer: Arc<dyn GenomeScorer<AlleleGenome<T>>>,
        randomizer: &dyn GenomeRandomizer<AlleleGenome<T>>,
        crossover: Option<Box<dyn EvolutionaryOperator<AlleleGenome<T>>>>,
        mutation: Option<Box<dyn EvolutionaryOperator<AlleleGenome<T>>>>,
        rules: RuleHolder<AlleleGenome<T>>,
    ) -> Result<EvolutionaryAlgorithm<AlleleGenome<T>>> {
        let config = &self.config;
        let evolution = &config.evolution;
        let seed = evolution.seed;

        let mut population = Population::new(
            evolution.population_size,
            Arc::new(ArrayGenomeFactory::<T>::new(evolution.genome_length)),
            evolution.sense,
        );
        let mut init_rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ INIT_SEED_OFFSET),
            None => StdRng::from_entropy(),
        };
        population.initialize(&mut init_rng, randomizer)?;

        let mut scorer = ParallelScorer::new(scorer, config.scoring.threads)?;
        if config.scoring.complexity_penalty {
            scorer = scorer.with_adjuster(ComplexityAdjustedScore {
                threshold: config.scoring.complexity_threshold,
                full_threshold: config.scoring.complexity_full_threshold,
                penalty: config.scoring.penalty,
                full_penalty: config.scoring.full_penalty,
                sense: evolution.sense,
            });
        }

        let selection: Box<dyn SelectionOperator<AlleleGenome<T>>> = match config.selection.method {
            SelectionMethod::Truncation => {
                Box::new(TruncationSelection::new(config.selection.truncation_percent)?)
            }
            SelectionMethod::Tournament => {
                Box::new(TournamentSelection::new(config.selection.tournament_rounds)?)
            }
        };

        let ops = &config.operators;
        let mut operations = OperationList::new();
        if let Some(crossover) = crossover {
            operations.add_boxed(ops.crossover_probability, crossover)?;
        }
        if let Some(mutation) = mutation {
            operations.add_boxed(ops.mutation_probability, mutation)?;
        }

        let speciation: Box<dyn Speciation<AlleleGenome<T>>> = match config.speciation.method {
            SpeciationMethod::Single => Box::new(SingleSpeciation),
            SpeciationMethod::Threshold => Box::new(
                ThresholdSpeciation::new(
                    EuclideanDistance,
                    config.speciation.compatibility_threshold,
                    config.speciation.max_species,
                )
                .with_min_species_size(config.speciation.min_species_size),
            ),
        };

        let mut engine = EvolutionaryAlgorithm::new(population, scorer, selection, operations)?
            .with_boxed_speciation(speciation)
            .with_rules(rules)
            .with_elite_rate(evolution.elite_rate)
            .with_max_operation_retries(evolution.max_operation_retries)
            .with_max_gens_no_improvement(evolution.max_gens_no_improvement)
            .with_progress_callback(LogProgressCallback::default());
        if let Some(seed) = seed {
            engine = engine.with_seed(seed);
        }

        let stop = &config.stop;
        if stop.max_iterations > 0 {
            engine = engine.with_stop_strategy(EndIterations::new(stop.max_iterations));
        }
        if stop.max_without_improvement > 0 {
            engine = engine.with_stop_strategy(NoImprovement::new(stop.max_without_improvement, evolution.sense));
        }
        if let Some(target) = stop.target_score {
            engine = engine.with_stop_strategy(TargetScore::new(target, evolution.sense));
        }

        info!(
            "Built {} engine: {} genomes of length {}, {} scoring threads",
            evolution.representation.genome_representation(),
            evolution.population_size,
            evolution.genome_length,
            config.scoring.threads
        );
        Ok(engine)
    }
}
