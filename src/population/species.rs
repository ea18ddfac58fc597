use crate::genome::{Genome, GenomeComparator};
use crate::types::SpeciesId;

/// A group of related genomes bred together.
///
/// After [`Species::update_after_scoring`] members are ordered best-first, so
/// index 0 is the leader; selection operators rely on that ordering.
#[derive(Debug, Clone)]
pub struct Species<G> {
    id: SpeciesId,
    members: Vec<G>,
    leader: Option<G>,
    best_score: f64,
    age: usize,
    gens_no_improvement: usize,
    offspring_count: usize,
}

impl<G: Genome> Species<G> {
    pub fn new(id: SpeciesId) -> Self {
        Self {
            id,
            members: Vec::new(),
            leader: None,
            best_score: f64::NAN,
            age: 0,
            gens_no_improvement: 0,
            offspring_count: 0,
        }
    }

    pub fn with_members(id: SpeciesId, members: Vec<G>) -> Self {
        let mut species = Self::new(id);
        species.members = members;
        species
    }

    pub fn id(&self) -> SpeciesId {
        self.id
    }

    pub fn members(&self) -> &[G] {
        &self.members
    }

    /// Mutable access to members; a slice so membership can only change through `add`/`remove`
    pub fn members_mut(&mut self) -> &mut [G] {
        &mut self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn add(&mut self, genome: G) {
        self.members.push(genome);
    }

    pub fn remove(&mut self, index: usize) -> Option<G> {
        if index < self.members.len() {
            Some(self.members.remove(index))
        } else {
            None
        }
    }

    pub(crate) fn take_members(&mut self) -> Vec<G> {
        std::mem::take(&mut self.members)
    }

    pub(crate) fn replace_members(&mut self, members: Vec<G>) {
        self.members = members;
    }

    pub fn leader(&self) -> Option<&G> {
        self.leader.as_ref()
    }

    pub fn set_leader(&mut self, leader: G) {
        self.leader = Some(leader);
    }

    /// Best score recorded at the last update; NaN before the first one
    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    /// Best score among the current members, NaN when none is scored
    pub fn calculate_best_score(&self, comparator: &GenomeComparator) -> f64 {
        self.members
            .iter()
            .map(|g| comparator.value(g))
            .min_by(|a, b| comparator.compare_scores(*a, *b))
            .unwrap_or(f64::NAN)
    }

    /// Mean adjusted score over scored members, NaN when none is scored
    pub fn mean_adjusted_score(&self) -> f64 {
        let scores: Vec<f64> = self
            .members
            .iter()
            .map(|g| g.adjusted_score())
            .filter(|s| s.is_finite())
            .collect();
        if scores.is_empty() {
            return f64::NAN;
        }
        scores.iter().sum::<f64>() / scores.len() as f64
    }

    pub fn sort_members(&mut self, comparator: &GenomeComparator) {
        self.members.sort_by(|a, b| comparator.compare(a, b));
    }

    pub fn age(&self) -> usize {
        self.age
    }

    pub fn gens_no_improvement(&self) -> usize {
        self.gens_no_improvement
    }

    pub fn offspring_count(&self) -> usize {
        self.offspring_count
    }

    pub(crate) fn set_offspring_count(&mut self, count: usize) {
        self.offspring_count = count;
    }

    /// Sorts members, refreshes leader and best score, and ages the species.
    pub fn update_after_scoring(&mut self, comparator: &GenomeComparator) {
        self.sort_members(comparator);
        let best = self.calculate_best_score(comparator);

        if comparator.sense().is_better(best, self.best_score) {
            self.best_score = best;
            self.gens_no_improvement = 0;
        } else {
            self.gens_no_improvement += 1;
        }

        if let Some(first) = self.members.first() {
            self.leader = Some(first.clone());
        }
        self.age += 1;
    }
}
