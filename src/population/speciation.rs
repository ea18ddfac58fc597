//! Grouping genomes into species.
//!
//! Speciation runs once per generation after scoring and before selection. It
//! regroups every genome, drops empty species and refreshes each species'
//! ordering, leader and best score.

use super::{Population, Species};
use crate::error::Result;
use crate::genome::{AlleleGenome, Allele, Genome, GenomeComparator};
use log::debug;

/// Regroups a population's genomes into species
pub trait Speciation<G: Genome>: Send {
    fn perform_speciation(&mut self, population: &mut Population<G>) -> Result<()>;
}

/// Distance between two genomes, used to decide species membership
pub trait GenomeDistance<G>: Send + Sync {
    fn distance(&self, a: &G, b: &G) -> f64;
}

/// Euclidean distance over allele values; genomes of different length are infinitely apart
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl<T: Allele> GenomeDistance<AlleleGenome<T>> for EuclideanDistance {
    fn distance(&self, a: &AlleleGenome<T>, b: &AlleleGenome<T>) -> f64 {
        if a.size() != b.size() {
            return f64::INFINITY;
        }
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| {
                let d = x.to_f64() - y.to_f64();
                d * d
            })
            .sum::<f64>()
            .sqrt()
    }
}

/// Sorts every species, refreshes leaders and drops empty species
fn finish_speciation<G: Genome>(population: &mut Population<G>, comparator: &GenomeComparator) {
    let removed = population.remove_empty_species();
    if removed > 0 {
        debug!("Removed {} empty species", removed);
    }
    for species in population.species_mut() {
        species.update_after_scoring(comparator);
    }
}

/// Keeps the whole population in one species
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleSpeciation;

impl<G: Genome> Speciation<G> for SingleSpeciation {
    fn perform_speciation(&mut self, population: &mut Population<G>) -> Result<()> {
        let comparator = population.comparator();
        let genomes = population.take_all_genomes();

        let species = population.species_vec_mut();
        if species.len() > 1 {
            species.truncate(1);
        }
        if species.is_empty() {
            let id = population.allocate_species_id();
            population.add_species(Species::new(id));
        }
        population.species_vec_mut()[0].replace_members(genomes);

        finish_speciation(population, &comparator);
        Ok(())
    }
}

/// Assigns each genome to the species with the closest leader within a
/// compatibility threshold, founding a new species otherwise.
///
/// When `max_species` is reached, genomes join the closest species regardless of
/// the threshold. Species smaller than `min_species_size` are folded into the
/// nearest species that is large enough, so every species can supply the
/// parents a crossover needs.
#[derive(Debug, Clone)]
pub struct ThresholdSpeciation<D> {
    distance: D,
    compatibility_threshold: f64,
    max_species: usize,
    min_species_size: usize,
}

impl<D> ThresholdSpeciation<D> {
    pub fn new(distance: D, compatibility_threshold: f64, max_species: usize) -> Self {
        Self {
            distance,
            compatibility_threshold,
            max_species: max_species.max(1),
            min_species_size: 2,
        }
    }

    pub fn with_min_species_size(mut self, min_species_size: usize) -> Self {
        self.min_species_size = min_species_size;
        self
    }
}

impl<D> ThresholdSpeciation<D> {
    /// Index and distance of the closest leader among `candidates`
    fn closest<G>(&self, genome: &G, species: &[Species<G>], candidates: &[usize]) -> Option<(usize, f64)>
    where
        G: Genome,
        D: GenomeDistance<G>,
    {
        candidates
            .iter()
            .filter_map(|&i| species[i].leader().map(|leader| (i, self.distance.distance(genome, leader))))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, best_d)) if best_d <= d => best,
                _ => Some((i, d)),
            })
    }
}

impl<G, D> Speciation<G> for ThresholdSpeciation<D>
where
    G: Genome,
    D: GenomeDistance<G> + Send,
{
    fn perform_speciation(&mut self, population: &mut Population<G>) -> Result<()> {
        let comparator = population.comparator();
        let mut genomes = population.take_all_genomes();
        // Best genomes found species first, so leaders start strong
        genomes.sort_by(|a, b| comparator.compare(a, b));

        // Shells without a leader (the initial species) cannot attract members
        population.species_vec_mut().retain(|s| s.leader().is_some());

        for genome in genomes {
            let all: Vec<usize> = (0..population.species().len()).collect();
            let closest = self.closest(&genome, population.species(), &all);

            let target = match closest {
                Some((index, d)) if d <= self.compatibility_threshold => Some(index),
                Some((index, _)) if population.species().len() >= self.max_species => Some(index),
                _ => None,
            };

            match target {
                Some(index) => population.species_mut()[index].add(genome),
                None => {
                    let id = population.allocate_species_id();
                    let mut species = Species::new(id);
                    species.set_leader(genome.clone());
                    species.add(genome);
                    population.add_species(species);
                }
            }
        }

        self.merge_small_species(population);
        finish_speciation(population, &comparator);
        debug!("Speciation produced {} species", population.species().len());
        Ok(())
    }
}

impl<D> ThresholdSpeciation<D> {
    fn merge_small_species<G>(&self, population: &mut Population<G>)
    where
        G: Genome,
        D: GenomeDistance<G>,
    {
        let species = population.species_vec_mut();
        let large: Vec<usize> = (0..species.len())
            .filter(|&i| species[i].len() >= self.min_species_size)
            .collect();
        if large.is_empty() {
            return;
        }

        for i in 0..species.len() {
            if species[i].is_empty() || species[i].len() >= self.min_species_size {
                continue;
            }
            for genome in species[i].take_members() {
                if let Some((target, _)) = self.closest(&genome, species.as_slice(), &large) {
                    species[target].add(genome);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::{IntegerArrayGenome, IntegerArrayGenomeFactory};
    use crate::types::ObjectiveSense;
    use std::sync::Arc;

    fn genome(alleles: Vec<i64>, score: f64) -> IntegerArrayGenome {
        let mut g = IntegerArrayGenome::from_alleles(alleles);
        g.meta_mut().set_scores(score, score);
        g
    }

    fn population_of(genomes: Vec<IntegerArrayGenome>) -> Population<IntegerArrayGenome> {
        let mut pop = Population::new(
            genomes.len(),
            Arc::new(IntegerArrayGenomeFactory::new(2)),
            ObjectiveSense::Maximize,
        );
        let id = pop.allocate_species_id();
        pop.add_species(Species::with_members(id, genomes));
        pop
    }

    #[test]
    fn test_euclidean_distance() {
        let a = IntegerArrayGenome::from_alleles(vec![0, 0]);
        let b = IntegerArrayGenome::from_alleles(vec![3, 4]);
        assert_eq!(EuclideanDistance.distance(&a, &b), 5.0);
        assert!(EuclideanDistance
            .distance(&a, &IntegerArrayGenome::new(3))
            .is_infinite());
    }

    #[test]
    fn test_single_speciation_merges_everything() {
        let mut pop = population_of(vec![genome(vec![0, 0], 1.0), genome(vec![9, 9], 2.0)]);
        let id = pop.allocate_species_id();
        pop.add_species(Species::with_members(id, vec![genome(vec![5, 5], 3.0)]));

        SingleSpeciation.perform_speciation(&mut pop).unwrap();

        assert_eq!(pop.species().len(), 1);
        assert_eq!(pop.genome_count(), 3);
        assert_eq!(pop.species()[0].leader().unwrap().score(), 3.0);
    }

    #[test]
    fn test_threshold_speciation_splits_distant_clusters() {
        let mut pop = population_of(vec![
            genome(vec![0, 0], 1.0),
            genome(vec![100, 100], 2.0),
            genome(vec![1, 0], 3.0),
            genome(vec![100, 101], 4.0),
        ]);

        ThresholdSpeciation::new(EuclideanDistance, 10.0, 8)
            .perform_speciation(&mut pop)
            .unwrap();

        assert_eq!(pop.species().len(), 2);
        assert_eq!(pop.genome_count(), 4);
        for species in pop.species() {
            assert_eq!(species.len(), 2);
        }
    }

    #[test]
    fn test_threshold_speciation_folds_singletons() {
        let mut pop = population_of(vec![
            genome(vec![0, 0], 1.0),
            genome(vec![1, 1], 2.0),
            genome(vec![50, 50], 3.0),
        ]);

        ThresholdSpeciation::new(EuclideanDistance, 5.0, 8)
            .perform_speciation(&mut pop)
            .unwrap();

        assert_eq!(pop.species().len(), 1);
        assert_eq!(pop.genome_count(), 3);
    }

    #[test]
    fn test_threshold_speciation_respects_max_species() {
        let mut pop = population_of(vec![
            genome(vec![0, 0], 1.0),
            genome(vec![0, 1], 1.0),
            genome(vec![50, 50], 2.0),
            genome(vec![50, 51], 2.0),
            genome(vec![99, 99], 3.0),
            genome(vec![99, 98], 3.0),
        ]);

        ThresholdSpeciation::new(EuclideanDistance, 5.0, 2)
            .perform_speciation(&mut pop)
            .unwrap();

        assert_eq!(pop.species().len(), 2);
        assert_eq!(pop.genome_count(), 6);
    }
}
