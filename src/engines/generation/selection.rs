//! Choosing parents from a species.
//!
//! Species members are ordered best-first after speciation, so both operators
//! work on member indices: a lower index is a fitter genome.

use crate::error::{GeneticError, Result};
use crate::genome::Genome;
use crate::population::Species;
use rand::{Rng, RngCore};

pub trait SelectionOperator<G>: Send + Sync {
    /// Index of a member chosen for reproduction
    fn perform_selection(&self, rng: &mut dyn RngCore, species: &Species<G>) -> Result<usize>;

    /// Index of a member chosen for removal
    fn perform_anti_selection(&self, rng: &mut dyn RngCore, species: &Species<G>) -> Result<usize>;
}

fn non_empty<G: Genome>(species: &Species<G>) -> Result<usize> {
    match species.members().len() {
        0 => Err(GeneticError::SelectionOutOfBounds { index: 0, size: 0 }),
        n => Ok(n),
    }
}

/// Picks uniformly among the top `percent` of the species
#[derive(Debug, Clone, Copy)]
pub struct TruncationSelection {
    percent: f64,
}

impl TruncationSelection {
    pub fn new(percent: f64) -> Result<Self> {
        if !(percent > 0.0 && percent <= 1.0) {
            return Err(GeneticError::Configuration(format!(
                "Truncation percent must be in (0, 1], got {}",
                percent
            )));
        }
        Ok(Self { percent })
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Number of members eligible for selection; at least the leader
    pub fn top_count(&self, size: usize) -> usize {
        ((size as f64 * self.percent).floor() as usize).max(1)
    }
}

impl<G: Genome> SelectionOperator<G> for TruncationSelection {
    fn perform_selection(&self, rng: &mut dyn RngCore, species: &Species<G>) -> Result<usize> {
        let size = non_empty(species)?;
        let top = self.top_count(size).min(size);
        Ok(rng.gen_range(0..top))
    }

    /// Mirrors a selection from the bottom of the ranking
    fn perform_anti_selection(&self, rng: &mut dyn RngCore, species: &Species<G>) -> Result<usize> {
        let size = non_empty(species)?;
        let selected = self.perform_selection(rng, species)?;
        // mirror index of `selected`; `selected < size` keeps it in 0..size
        Ok(size - 1 - selected)
    }
}

/// Best (or worst) of `rounds` uniformly drawn members
#[derive(Debug, Clone, Copy)]
pub struct TournamentSelection {
    rounds: usize,
}

impl TournamentSelection {
    pub fn new(rounds: usize) -> Result<Self> {
        if rounds == 0 {
            return Err(GeneticError::Configuration(
                "Tournament needs at least one round".to_string(),
            ));
        }
        Ok(Self { rounds })
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    fn contest(&self, rng: &mut dyn RngCore, size: usize, worst: bool) -> usize {
        let mut winner = rng.gen_range(0..size);
        for _ in 1..self.rounds {
            let challenger = rng.gen_range(0..size);
            let wins = if worst { challenger > winner } else { challenger < winner };
            if wins {
                winner = challenger;
            }
        }
        winner
    }
}

impl<G: Genome> SelectionOperator<G> for TournamentSelection {
    fn perform_selection(&self, rng: &mut dyn RngCore, species: &Species<G>) -> Result<usize> {
        let size = non_empty(species)?;
        Ok(self.contest(rng, size, false))
    }

    fn perform_anti_selection(&self, rng: &mut dyn RngCore, species: &Species<G>) -> Result<usize> {
        let size = non_empty(species)?;
        Ok(self.contest(rng, size, true))
    }
}
