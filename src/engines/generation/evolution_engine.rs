//! The generation loop.
//!
//! One call to [`EvolutionaryAlgorithm::iteration`] runs a full cycle:
//! scoring, speciating, selecting, reproducing, validating and replacing.
//! Only scoring is parallel. Every other phase runs on the calling thread and
//! draws from the engine's single seeded RNG, so a fixed seed reproduces a run.
//!
//! The new membership is scored during replacement, so the best genome reflects
//! the offspring of the generation that just finished. The next scoring phase
//! reuses those scores.

use super::allocation::{allocate_offspring, SpeciesAllocation};
use super::operation_list::OperationList;
use super::operator::OperatorContext;
use super::progress::ProgressCallback;
use super::selection::SelectionOperator;
use super::stats::GenerationStats;
use super::stop::{StopSignal, StopStrategy};
use crate::engines::evaluation::{ParallelScorer, ScoringReport};
use crate::engines::validation::RuleHolder;
use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::{Population, SingleSpeciation, Speciation, Species};
use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fmt;
use std::sync::Arc;

/// Where the engine is within a generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvolutionPhase {
    Idle,
    Scoring,
    Speciating,
    Selecting,
    Reproducing,
    Validating,
    Replacing,
    Done,
}

impl fmt::Display for EvolutionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EvolutionPhase::Idle => "idle",
            EvolutionPhase::Scoring => "scoring",
            EvolutionPhase::Speciating => "speciating",
            EvolutionPhase::Selecting => "selecting",
            EvolutionPhase::Reproducing => "reproducing",
            EvolutionPhase::Validating => "validating",
            EvolutionPhase::Replacing => "replacing",
            EvolutionPhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Offspring bred from one set of selected parents
struct Brood<G> {
    parents: Vec<usize>,
    offspring: Vec<G>,
}

pub struct EvolutionaryAlgorithm<G: Genome> {
    population: Population<G>,
    scorer: ParallelScorer<G>,
    speciation: Box<dyn Speciation<G>>,
    selection: Box<dyn SelectionOperator<G>>,
    operations: OperationList<G>,
    rules: RuleHolder<G>,
    stop_strategies: Vec<Box<dyn StopStrategy>>,
    stop_signal: StopSignal,
    callback: Option<Box<dyn ProgressCallback>>,
    rng: StdRng,
    phase: EvolutionPhase,
    iteration: usize,
    elite_rate: f64,
    max_operation_retries: usize,
    max_gens_no_improvement: usize,
    last_stats: Option<GenerationStats>,
    /// Scores written during the previous replacement, reused by the next scoring phase
    pending_scoring: Option<ScoringReport>,
}

impl<G: Genome> EvolutionaryAlgorithm<G> {
    /// Wires an engine around an initialized population.
    ///
    /// Operators are initialized here; speciation defaults to a single species
    /// and the RNG to an entropy seed until configured otherwise.
    pub fn new(
        population: Population<G>,
        scorer: ParallelScorer<G>,
        selection: Box<dyn SelectionOperator<G>>,
        mut operations: OperationList<G>,
    ) -> Result<Self> {
        if operations.is_empty() {
            return Err(GeneticError::Configuration(
                "At least one evolutionary operator is required".to_string(),
            ));
        }
        let context = OperatorContext {
            population: population.id(),
            factory: Arc::clone(population.factory()),
            sense: population.sense(),
        };
        operations.init(&context)?;

        Ok(Self {
            population,
            scorer,
            speciation: Box::new(SingleSpeciation),
            selection,
            operations,
            rules: RuleHolder::new(),
            stop_strategies: Vec::new(),
            stop_signal: StopSignal::new(),
            callback: None,
            rng: StdRng::from_entropy(),
            phase: EvolutionPhase::Idle,
            iteration: 0,
            elite_rate: 0.0,
            max_operation_retries: 5,
            max_gens_no_improvement: 0,
            last_stats: None,
            pending_scoring: None,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn with_speciation<S: Speciation<G> + 'static>(mut self, speciation: S) -> Self {
        self.speciation = Box::new(speciation);
        self
    }

    pub fn with_boxed_speciation(mut self, speciation: Box<dyn Speciation<G>>) -> Self {
        self.speciation = speciation;
        self
    }

    pub fn with_rules(mut self, rules: RuleHolder<G>) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_stop_strategy<S: StopStrategy + 'static>(mut self, strategy: S) -> Self {
        self.stop_strategies.push(Box::new(strategy));
        self
    }

    /// Replaces the engine's cancellation flag with a shared one
    pub fn with_stop_signal(mut self, signal: StopSignal) -> Self {
        self.stop_signal = signal;
        self
    }

    pub fn with_progress_callback<C: ProgressCallback + 'static>(mut self, callback: C) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// Fraction of each species' slots kept for its best current members
    pub fn with_elite_rate(mut self, elite_rate: f64) -> Self {
        self.elite_rate = elite_rate.clamp(0.0, 1.0);
        self
    }

    /// Failed breeding attempts per slot before a parent copy is used instead
    pub fn with_max_operation_retries(mut self, retries: usize) -> Self {
        self.max_operation_retries = retries;
        self
    }

    /// Stagnant generations after which a species stops receiving slots (0 disables)
    pub fn with_max_gens_no_improvement(mut self, generations: usize) -> Self {
        self.max_gens_no_improvement = generations;
        self
    }

    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    pub fn best_genome(&self) -> Option<&G> {
        self.population.best_genome()
    }

    pub fn phase(&self) -> EvolutionPhase {
        self.phase
    }

    /// Number of generations started so far
    pub fn current_iteration(&self) -> usize {
        self.iteration
    }

    pub fn last_stats(&self) -> Option<&GenerationStats> {
        self.last_stats.as_ref()
    }

    /// A handle that cancels this engine from another thread
    pub fn stop_signal(&self) -> StopSignal {
        self.stop_signal.clone()
    }

    pub fn is_training_done(&self) -> bool {
        self.phase == EvolutionPhase::Done
    }

    pub fn finish_training(&mut self) {
        if self.phase != EvolutionPhase::Done {
            info!("Training finished after {} generations", self.iteration);
            self.enter(EvolutionPhase::Done);
        }
    }

    /// Runs `count` generations, stopping early once training is done
    pub fn iterations(&mut self, count: usize) -> Result<()> {
        for _ in 0..count {
            if self.is_training_done() {
                break;
            }
            self.iteration()?;
        }
        Ok(())
    }

    /// Runs generations until a stop strategy or the stop signal ends training
    pub fn run(&mut self) -> Result<()> {
        if self.stop_strategies.is_empty() {
            return Err(GeneticError::Configuration(
                "run() needs at least one stop strategy".to_string(),
            ));
        }
        while !self.is_training_done() {
            self.iteration()?;
        }
        Ok(())
    }

    /// Runs exactly one generation
    pub fn iteration(&mut self) -> Result<()> {
        if self.is_training_done() {
            debug!("Training is done; iteration ignored");
            return Ok(());
        }
        if self.population.genome_count() == 0 {
            return Err(GeneticError::EmptyPopulation);
        }

        self.iteration += 1;
        if let Some(callback) = self.callback.as_mut() {
            callback.on_generation_start(self.iteration);
        }

        self.enter(EvolutionPhase::Scoring);
        let scoring = match self.pending_scoring.take() {
            Some(report) => report,
            None => self.scorer.score_population(&mut self.population),
        };
        self.population.update_best_genome();
        let mut stats = self.scoring_stats(scoring);

        if self.stop_signal.is_stopped() {
            info!("Stop requested; ending after scoring generation {}", self.iteration);
            self.complete(stats);
            self.enter(EvolutionPhase::Done);
            return Ok(());
        }

        self.enter(EvolutionPhase::Speciating);
        self.speciation.perform_speciation(&mut self.population)?;
        stats.species_count = self.population.species().len();

        self.enter(EvolutionPhase::Selecting);
        let allocation = allocate_offspring(
            &self.population,
            self.elite_rate,
            self.max_gens_no_improvement,
        );
        let selections = self.select_parents(&allocation)?;

        self.enter(EvolutionPhase::Reproducing);
        let broods = self.reproduce(&selections)?;

        self.enter(EvolutionPhase::Validating);
        let next = self.validate(&allocation, broods, &mut stats)?;

        self.enter(EvolutionPhase::Replacing);
        self.replace(next);
        self.pending_scoring = Some(self.scorer.score_population(&mut self.population));
        if self.population.update_best_genome() {
            if let Some(best) = self.population.best_genome() {
                stats.best_score = best.score();
                stats.best_adjusted_score = best.adjusted_score();
            }
        }
        stats.genome_count = self.population.genome_count();

        let done = self.poll_stop_strategies(&stats);
        self.complete(stats);
        self.enter(if done {
            EvolutionPhase::Done
        } else {
            EvolutionPhase::Idle
        });
        Ok(())
    }

    fn enter(&mut self, phase: EvolutionPhase) {
        trace!("Generation {}: {} -> {}", self.iteration, self.phase, phase);
        self.phase = phase;
    }

    fn scoring_stats(&self, scoring: ScoringReport) -> GenerationStats {
        let scores: Vec<f64> = self
            .population
            .genomes()
            .map(|g| g.score())
            .filter(|s| s.is_finite())
            .collect();
        let mean_score = if scores.is_empty() {
            f64::NAN
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };
        let (best_score, best_adjusted_score) = self
            .population
            .best_genome()
            .map_or((f64::NAN, f64::NAN), |g| (g.score(), g.adjusted_score()));

        GenerationStats {
            iteration: self.iteration,
            best_score,
            best_adjusted_score,
            mean_score,
            species_count: self.population.species().len(),
            genome_count: self.population.genome_count(),
            scoring,
            invalid_offspring: 0,
            fallbacks: 0,
        }
    }

    /// Pre-selects parents for every planned breeding event, per species
    fn select_parents(&mut self, allocation: &[SpeciesAllocation]) -> Result<Vec<Vec<Vec<usize>>>> {
        let needed = self.operations.parents_needed();
        let per_event = self.operations.expected_offspring().max(1);
        let mut plan = Vec::with_capacity(allocation.len());

        for (species, slots) in self.population.species().iter().zip(allocation) {
            let breeding = slots.offspring();
            if breeding == 0 {
                plan.push(Vec::new());
                continue;
            }
            if species.len() < needed {
                return Err(GeneticError::InsufficientParents {
                    needed,
                    available: species.len(),
                });
            }

            let events = (breeding + per_event - 1) / per_event;
            let mut species_plan = Vec::with_capacity(events);
            for _ in 0..events {
                species_plan.push(pick_parents(
                    self.selection.as_ref(),
                    &mut self.rng,
                    species,
                    needed,
                )?);
            }
            plan.push(species_plan);
        }
        Ok(plan)
    }

    fn reproduce(&mut self, plan: &[Vec<Vec<usize>>]) -> Result<Vec<Vec<Brood<G>>>> {
        let mut broods = Vec::with_capacity(plan.len());
        for (species, events) in self.population.species().iter().zip(plan) {
            let mut species_broods = Vec::with_capacity(events.len());
            for parents in events {
                let offspring = breed(&self.operations, &mut self.rng, species, parents)?;
                species_broods.push(Brood {
                    parents: parents.clone(),
                    offspring,
                });
            }
            broods.push(species_broods);
        }
        Ok(broods)
    }

    /// Rewrites and validates offspring, filling each species' slots.
    ///
    /// A breeding event with no valid offspring is retried with fresh parents up
    /// to `max_operation_retries` times; after that the slot gets a copy of the
    /// event's first parent.
    fn validate(
        &mut self,
        allocation: &[SpeciesAllocation],
        broods: Vec<Vec<Brood<G>>>,
        stats: &mut GenerationStats,
    ) -> Result<Vec<Vec<G>>> {
        let needed = self.operations.parents_needed();
        let mut next = Vec::with_capacity(allocation.len());

        for ((species, slots), species_broods) in
            self.population.species().iter().zip(allocation).zip(broods)
        {
            let mut members: Vec<G> = species.members().iter().take(slots.elites).cloned().collect();
            let mut pending = species_broods.into_iter();
            let mut failed_attempts = 0;

            while members.len() < slots.share {
                let brood = match pending.next() {
                    Some(brood) => brood,
                    None => {
                        let parents = pick_parents(self.selection.as_ref(), &mut self.rng, species, needed)?;
                        let offspring = breed(&self.operations, &mut self.rng, species, &parents)?;
                        Brood { parents, offspring }
                    }
                };

                let mut accepted = 0;
                for mut child in brood.offspring {
                    if members.len() >= slots.share {
                        break;
                    }
                    self.rules.rewrite(&mut child);
                    if self.rules.is_valid(&child) {
                        members.push(child);
                        accepted += 1;
                    } else {
                        stats.invalid_offspring += 1;
                        trace!("Rejected invalid offspring in {}", species.id());
                    }
                }

                if accepted > 0 {
                    failed_attempts = 0;
                    continue;
                }
                failed_attempts += 1;
                if failed_attempts > self.max_operation_retries {
                    let first = brood.parents.first().copied().unwrap_or(0);
                    warn!(
                        "No valid offspring in {} after {} retries; copying a parent",
                        species.id(),
                        self.max_operation_retries
                    );
                    members.push(species.members()[first].clone());
                    stats.fallbacks += 1;
                    failed_attempts = 0;
                }
            }
            next.push(members);
        }
        Ok(next)
    }

    /// Installs the new membership with cleared scores; the caller rescores it
    fn replace(&mut self, next: Vec<Vec<G>>) {
        let id = self.population.id();
        for (species, mut members) in self.population.species_vec_mut().iter_mut().zip(next) {
            for genome in &mut members {
                genome.meta_mut().clear_scores();
                genome.meta_mut().set_population(Some(id));
            }
            species.set_offspring_count(members.len());
            species.replace_members(members);
        }
        let removed = self.population.remove_empty_species();
        if removed > 0 {
            debug!("Dropped {} species without slots", removed);
        }
    }

    fn poll_stop_strategies(&mut self, stats: &GenerationStats) -> bool {
        let mut stop = self.stop_signal.is_stopped();
        for strategy in &mut self.stop_strategies {
            stop |= strategy.should_stop(stats);
        }
        stop
    }

    fn complete(&mut self, stats: GenerationStats) {
        info!(
            "Generation {}: best {:.6} (adjusted {:.6}), {} species, {} invalid, {} fallbacks",
            stats.iteration,
            stats.best_score,
            stats.best_adjusted_score,
            stats.species_count,
            stats.invalid_offspring,
            stats.fallbacks
        );
        if let Some(callback) = self.callback.as_mut() {
            callback.on_generation_complete(&stats);
        }
        self.last_stats = Some(stats);
    }
}

fn pick_parents<G: Genome>(
    selection: &dyn SelectionOperator<G>,
    rng: &mut StdRng,
    species: &Species<G>,
    count: usize,
) -> Result<Vec<usize>> {
    (0..count)
        .map(|_| {
            let index = selection.perform_selection(rng, species)?;
            if index >= species.len() {
                return Err(GeneticError::SelectionOutOfBounds {
                    index,
                    size: species.len(),
                });
            }
            Ok(index)
        })
        .collect()
}

fn breed<G: Genome>(
    operations: &OperationList<G>,
    rng: &mut StdRng,
    species: &Species<G>,
    parents: &[usize],
) -> Result<Vec<G>> {
    let genomes: Vec<G> = parents
        .iter()
        .map(|&index| species.members()[index].clone())
        .collect();
    operations.perform(rng, &genomes)
}
