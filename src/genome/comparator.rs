use super::Genome;
use crate::types::ObjectiveSense;
use std::cmp::Ordering;

/// Orders genomes best-first under an objective sense.
///
/// NaN scores (failed or not yet scored) always sort after every other score,
/// whichever way the objective points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeComparator {
    sense: ObjectiveSense,
    use_adjusted: bool,
}

impl GenomeComparator {
    /// Compares on the adjusted score, which is what ranking uses
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            sense,
            use_adjusted: true,
        }
    }

    /// Compares on the raw score
    pub fn raw(sense: ObjectiveSense) -> Self {
        Self {
            sense,
            use_adjusted: false,
        }
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    pub fn value<G: Genome>(&self, genome: &G) -> f64 {
        if self.use_adjusted {
            genome.adjusted_score()
        } else {
            genome.score()
        }
    }

    /// `Less` when `a` ranks ahead of `b`
    pub fn compare<G: Genome>(&self, a: &G, b: &G) -> Ordering {
        self.compare_scores(self.value(a), self.value(b))
    }

    pub fn compare_scores(&self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self.sense {
                ObjectiveSense::Minimize => a.total_cmp(&b),
                ObjectiveSense::Maximize => b.total_cmp(&a),
            },
        }
    }

    pub fn is_better_than<G: Genome>(&self, a: &G, b: &G) -> bool {
        self.compare(a, b) == Ordering::Less
    }

    /// The better of two genomes; ties go to `a`
    pub fn best_of<'a, G: Genome>(&self, a: &'a G, b: &'a G) -> &'a G {
        if self.is_better_than(b, a) {
            b
        } else {
            a
        }
    }
}
