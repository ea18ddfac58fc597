//! Genome representations and the plumbing every representation shares.
//!
//! A genome is the encoded form of a candidate solution plus its fitness. The
//! engine never looks inside a genome except through the [`Genome`] trait (and
//! [`ArrayGenome`] for position-wise operators), so crossover and mutation
//! operators are written once per representation family.
//!
//! Fitness lives in [`GenomeMeta`]. The raw score may be written by the scoring
//! step only, and the adjusted score by the score-adjustment step only; both
//! setters are crate-private.

pub mod array;
pub mod comparator;
pub mod factory;
pub mod program;
pub mod randomizer;

pub use array::{Allele, AlleleGenome, ArrayGenome, DoubleArrayGenome, IntegerArrayGenome};
pub use comparator::GenomeComparator;
pub use factory::{
    ArrayGenomeFactory, DoubleArrayGenomeFactory, GenomeFactory, IntegerArrayGenomeFactory,
    ProgramGenomeFactory,
};
pub use program::{Opcode, ProgramGenome, ProgramNode};
pub use randomizer::{
    GenomeRandomizer, IntegerRangeRandomizer, PermutationRandomizer, RealRangeRandomizer,
};

use crate::error::Result;
use crate::types::PopulationId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fitness bookkeeping carried by every genome
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GenomeMeta {
    score: f64,
    adjusted_score: f64,
    population: Option<PopulationId>,
}

impl Default for GenomeMeta {
    fn default() -> Self {
        Self {
            score: f64::NAN,
            adjusted_score: f64::NAN,
            population: None,
        }
    }
}

impl GenomeMeta {
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn adjusted_score(&self) -> f64 {
        self.adjusted_score
    }

    pub fn population(&self) -> Option<PopulationId> {
        self.population
    }

    /// A genome is unscored until the scoring step writes a non-NaN score
    pub fn is_scored(&self) -> bool {
        !self.score.is_nan()
    }

    /// Copies score, adjusted score and population handle from another genome
    pub fn copy_from(&mut self, other: &GenomeMeta) {
        *self = *other;
    }

    pub(crate) fn set_scores(&mut self, score: f64, adjusted_score: f64) {
        self.score = score;
        self.adjusted_score = adjusted_score;
    }

    pub(crate) fn clear_scores(&mut self) {
        self.score = f64::NAN;
        self.adjusted_score = f64::NAN;
    }

    pub(crate) fn set_population(&mut self, population: Option<PopulationId>) {
        self.population = population;
    }
}

/// Common interface of all genome representations
pub trait Genome: Clone + fmt::Debug + Send + Sync + 'static {
    /// Short name of the representation, used in mismatch errors
    fn representation(&self) -> &'static str;

    /// Number of alleles (array genomes) or nodes (program genomes)
    fn size(&self) -> usize;

    fn meta(&self) -> &GenomeMeta;

    fn meta_mut(&mut self) -> &mut GenomeMeta;

    /// Deep-copies genetic material, score and adjusted score from `source`.
    fn copy_from(&mut self, source: &Self) -> Result<()>;

    fn score(&self) -> f64 {
        self.meta().score()
    }

    fn adjusted_score(&self) -> f64 {
        self.meta().adjusted_score()
    }

    fn population(&self) -> Option<PopulationId> {
        self.meta().population()
    }
}
