//! Splitting the next generation's slots between species.

use crate::genome::Genome;
use crate::population::Population;
use log::debug;

/// Slots granted to one species for the next generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesAllocation {
    /// Total members the species will have
    pub share: usize,
    /// Best current members carried over unchanged
    pub elites: usize,
}

impl SpeciesAllocation {
    /// Slots that must be filled by breeding
    pub fn offspring(&self) -> usize {
        self.share - self.elites
    }
}

/// Allocates exactly `population.population_size()` slots across species.
///
/// Shares are proportional to each species' mean adjusted score, oriented so
/// that larger is better and shifted to stay positive. Species stagnant for
/// more than `max_gens_no_improvement` generations (0 disables the check) get
/// nothing unless they hold the best leader. Unscored species get nothing
/// unless no species is scored, in which case slots are split evenly.
pub fn allocate_offspring<G: Genome>(
    population: &Population<G>,
    elite_rate: f64,
    max_gens_no_improvement: usize,
) -> Vec<SpeciesAllocation> {
    let species = population.species();
    if species.is_empty() {
        return Vec::new();
    }
    let sense = population.sense();
    let comparator = population.comparator();

    let best_species = species
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.leader().map(|leader| (i, leader)))
        .min_by(|a, b| comparator.compare(a.1, b.1))
        .map(|(i, _)| i);

    let eligible: Vec<bool> = species
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let stagnant = max_gens_no_improvement > 0 && s.gens_no_improvement() > max_gens_no_improvement;
            !stagnant || Some(i) == best_species
        })
        .collect();

    let values: Vec<f64> = species
        .iter()
        .zip(&eligible)
        .map(|(s, &ok)| if ok { sense.orient(s.mean_adjusted_score()) } else { f64::NAN })
        .collect();

    let weights = shifted_weights(&values, &eligible);
    let shares = largest_remainder(&weights, population.population_size());

    species
        .iter()
        .zip(shares)
        .map(|(s, share)| {
            let elites = elite_count(share, s.len(), elite_rate);
            debug!("{}: {} slots, {} elites", s.id(), share, elites);
            SpeciesAllocation { share, elites }
        })
        .collect()
}

/// Positive weights from oriented values; NaN values weigh nothing
fn shifted_weights(values: &[f64], eligible: &[bool]) -> Vec<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return eligible.iter().map(|&ok| if ok { 1.0 } else { 0.0 }).collect();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = if max > min {
        (max - min) / values.len() as f64
    } else {
        1.0
    };

    values
        .iter()
        .map(|v| if v.is_finite() { v - min + spread } else { 0.0 })
        .collect()
}

/// Integer shares summing to `total`, proportional to `weights`.
/// Leftover slots go to the largest fractional parts, earlier index first on ties.
fn largest_remainder(weights: &[f64], total: usize) -> Vec<usize> {
    let sum: f64 = weights.iter().sum();
    if weights.is_empty() || sum <= 0.0 {
        return vec![0; weights.len()];
    }

    let quotas: Vec<f64> = weights.iter().map(|w| w / sum * total as f64).collect();
    let mut shares: Vec<usize> = quotas.iter().map(|q| q.floor() as usize).collect();

    let assigned: usize = shares.iter().sum();
    let mut order: Vec<usize> = (0..weights.len()).filter(|&i| weights[i] > 0.0).collect();
    order.sort_by(|&a, &b| {
        let fa = quotas[a] - quotas[a].floor();
        let fb = quotas[b] - quotas[b].floor();
        fb.total_cmp(&fa).then(a.cmp(&b))
    });
    for &i in order.iter().cycle().take(total.saturating_sub(assigned)) {
        shares[i] += 1;
    }
    shares
}

fn elite_count(share: usize, members: usize, elite_rate: f64) -> usize {
    if share == 0 || elite_rate <= 0.0 {
        return 0;
    }
    let elites = ((share as f64 * elite_rate).floor() as usize).max(1);
    elites.min(share).min(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{GenomeComparator, IntegerArrayGenome, IntegerArrayGenomeFactory};
    use crate::population::Species;
    use crate::types::ObjectiveSense;
    use std::sync::Arc;

    fn scored_species(id: usize, scores: &[f64], sense: ObjectiveSense) -> Species<IntegerArrayGenome> {
        let members = scores
            .iter()
            .map(|&s| {
                let mut g = IntegerArrayGenome::new(1);
                g.meta_mut().set_scores(s, s);
                g
            })
            .collect();
        let mut species = Species::with_members(crate::types::SpeciesId(id), members);
        species.update_after_scoring(&GenomeComparator::new(sense));
        species
    }

    fn population(size: usize, sense: ObjectiveSense, species: Vec<Species<IntegerArrayGenome>>) -> Population<IntegerArrayGenome> {
        let mut pop = Population::new(size, Arc::new(IntegerArrayGenomeFactory::new(1)), sense);
        for s in species {
            pop.add_species(s);
        }
        pop
    }

    #[test]
    fn test_shares_sum_to_population_size() {
        let sense = ObjectiveSense::Maximize;
        let pop = population(
            10,
            sense,
            vec![
                scored_species(0, &[5.0, 4.0, 3.0], sense),
                scored_species(1, &[1.0, 1.0, 1.0, 1.0], sense),
                scored_species(2, &[2.0, 3.0, 2.0], sense),
            ],
        );

        let allocation = allocate_offspring(&pop, 0.0, 0);
        assert_eq!(allocation.iter().map(|a| a.share).sum::<usize>(), 10);
        assert!(allocation[0].share > allocation[1].share);
    }

    #[test]
    fn test_minimize_favours_low_scores() {
        let sense = ObjectiveSense::Minimize;
        let pop = population(
            8,
            sense,
            vec![
                scored_species(0, &[10.0, 12.0], sense),
                scored_species(1, &[1.0, 2.0], sense),
            ],
        );
        let allocation = allocate_offspring(&pop, 0.0, 0);
        assert!(allocation[1].share > allocation[0].share);
        assert_eq!(allocation[0].share + allocation[1].share, 8);
    }

    #[test]
    fn test_unscored_species_get_nothing() {
        let sense = ObjectiveSense::Maximize;
        let pop = population(
            6,
            sense,
            vec![
                scored_species(0, &[f64::NAN, f64::NAN], sense),
                scored_species(1, &[1.0, 2.0], sense),
            ],
        );
        let allocation = allocate_offspring(&pop, 0.0, 0);
        assert_eq!(allocation[0].share, 0);
        assert_eq!(allocation[1].share, 6);
    }

    #[test]
    fn test_all_unscored_split_evenly() {
        let sense = ObjectiveSense::Maximize;
        let pop = population(
            5,
            sense,
            vec![
                scored_species(0, &[f64::NAN], sense),
                scored_species(1, &[f64::NAN], sense),
            ],
        );
        let allocation = allocate_offspring(&pop, 0.0, 0);
        assert_eq!(allocation[0].share, 3);
        assert_eq!(allocation[1].share, 2);
    }

    #[test]
    fn test_elites_keep_at_least_the_leader() {
        assert_eq!(elite_count(5, 5, 0.1), 1);
        assert_eq!(elite_count(10, 10, 0.3), 3);
        assert_eq!(elite_count(10, 2, 0.5), 2);
        assert_eq!(elite_count(0, 4, 0.5), 0);
        assert_eq!(elite_count(4, 4, 0.0), 0);
    }

    #[test]
    fn test_largest_remainder_is_exact() {
        let shares = largest_remainder(&[1.0, 1.0, 1.0], 10);
        assert_eq!(shares, vec![4, 3, 3]);
        assert_eq!(largest_remainder(&[0.0, 2.0], 3), vec![0, 3]);
    }
}
