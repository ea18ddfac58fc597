//! Population and species management.
//!
//! The [`Population`] exclusively owns every genome (through its species) and
//! stamps each one with its [`PopulationId`]; genomes never hold a reference back.

pub mod speciation;
pub mod species;

pub use speciation::{EuclideanDistance, GenomeDistance, SingleSpeciation, Speciation, ThresholdSpeciation};
pub use species::Species;

use crate::error::{GeneticError, Result};
use crate::genome::{Genome, GenomeComparator, GenomeFactory, GenomeRandomizer};
use crate::types::{ObjectiveSense, PopulationId, SpeciesId};
use rand::RngCore;
use std::fmt;
use std::sync::Arc;

pub struct Population<G: Genome> {
    id: PopulationId,
    species: Vec<Species<G>>,
    factory: Arc<dyn GenomeFactory<G>>,
    sense: ObjectiveSense,
    best_genome: Option<G>,
    population_size: usize,
    next_species_id: usize,
}

impl<G: Genome> fmt::Debug for Population<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Population")
            .field("id", &self.id)
            .field("species", &self.species.len())
            .field("genomes", &self.genome_count())
            .field("sense", &self.sense)
            .field("population_size", &self.population_size)
            .finish()
    }
}

impl<G: Genome> Population<G> {
    pub fn new(
        population_size: usize,
        factory: Arc<dyn GenomeFactory<G>>,
        sense: ObjectiveSense,
    ) -> Self {
        Self {
            id: PopulationId::next(),
            species: Vec::new(),
            factory,
            sense,
            best_genome: None,
            population_size,
            next_species_id: 0,
        }
    }

    /// Replaces all species with a single species of freshly factored, randomized genomes
    pub fn initialize(&mut self, rng: &mut dyn RngCore, randomizer: &dyn GenomeRandomizer<G>) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::EmptyPopulation);
        }

        let members = (0..self.population_size)
            .map(|_| {
                let mut genome = self.factory.factor();
                randomizer.randomize(rng, &mut genome);
                genome
            })
            .collect();

        self.species.clear();
        self.best_genome = None;
        let id = self.allocate_species_id();
        self.add_species(Species::with_members(id, members));
        Ok(())
    }

    pub fn id(&self) -> PopulationId {
        self.id
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn comparator(&self) -> GenomeComparator {
        GenomeComparator::new(self.sense)
    }

    pub fn factory(&self) -> &Arc<dyn GenomeFactory<G>> {
        &self.factory
    }

    /// Configured number of genomes at the start and end of every generation
    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn species(&self) -> &[Species<G>] {
        &self.species
    }

    pub fn species_mut(&mut self) -> &mut [Species<G>] {
        &mut self.species
    }

    pub fn species_by_id(&self, id: SpeciesId) -> Option<&Species<G>> {
        self.species.iter().find(|s| s.id() == id)
    }

    pub fn allocate_species_id(&mut self) -> SpeciesId {
        let id = SpeciesId(self.next_species_id);
        self.next_species_id += 1;
        id
    }

    /// Adds a species and stamps its members with this population's handle
    pub fn add_species(&mut self, mut species: Species<G>) -> SpeciesId {
        for genome in species.members_mut() {
            genome.meta_mut().set_population(Some(self.id));
        }
        if species.id().0 >= self.next_species_id {
            self.next_species_id = species.id().0 + 1;
        }
        let id = species.id();
        self.species.push(species);
        id
    }

    pub fn remove_species(&mut self, id: SpeciesId) -> Option<Species<G>> {
        let index = self.species.iter().position(|s| s.id() == id)?;
        Some(self.species.remove(index))
    }

    /// Drops species left without members; returns how many were removed
    pub fn remove_empty_species(&mut self) -> usize {
        let before = self.species.len();
        self.species.retain(|s| !s.is_empty());
        before - self.species.len()
    }

    pub fn genome_count(&self) -> usize {
        self.species.iter().map(Species::len).sum()
    }

    pub fn genomes(&self) -> impl Iterator<Item = &G> {
        self.species.iter().flat_map(|s| s.members().iter())
    }

    /// Mutable references to every genome, in species order
    pub fn genomes_mut(&mut self) -> Vec<&mut G> {
        self.species
            .iter_mut()
            .flat_map(|s| s.members_mut().iter_mut())
            .collect()
    }

    /// Moves every genome out of its species; the emptied species shells keep their leaders
    pub(crate) fn take_all_genomes(&mut self) -> Vec<G> {
        self.species
            .iter_mut()
            .flat_map(|s| s.take_members())
            .collect()
    }

    pub(crate) fn species_vec_mut(&mut self) -> &mut Vec<Species<G>> {
        &mut self.species
    }

    pub fn owns(&self, genome: &G) -> bool {
        genome.population() == Some(self.id)
    }

    pub fn best_genome(&self) -> Option<&G> {
        self.best_genome.as_ref()
    }

    pub fn set_best_genome(&mut self, genome: G) {
        self.best_genome = Some(genome);
    }

    /// Replaces the best genome if any scored member beats it. Returns true on improvement.
    pub fn update_best_genome(&mut self) -> bool {
        let comparator = self.comparator();
        let candidate = self
            .genomes()
            .filter(|g| g.meta().is_scored())
            .min_by(|a, b| comparator.compare(*a, *b))
            .cloned();

        let improved = match (&candidate, &self.best_genome) {
            (Some(candidate), Some(best)) => comparator.is_better_than(candidate, best),
            (Some(_), None) => true,
            _ => false,
        };
        if improved {
            self.best_genome = candidate;
        }
        improved
    }
}
