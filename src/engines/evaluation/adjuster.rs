use crate::genome::Genome;
use crate::types::ObjectiveSense;
use serde::{Deserialize, Serialize};

/// Turns a raw score into the adjusted score used for ranking.
///
/// Adjusters run in their configured order; each receives the raw score and the
/// adjusted value produced so far.
pub trait ScoreAdjuster<G>: Send + Sync {
    fn adjust(&self, genome: &G, raw_score: f64, adjusted_score: f64) -> f64;
}

/// Penalizes genomes larger than `threshold`.
///
/// The penalty fraction grows linearly from `penalty` at `threshold` to
/// `full_penalty` at `full_threshold` and stays there beyond it. The adjusted
/// score moves by `|score| * fraction` in the worsening direction of the
/// objective sense.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplexityAdjustedScore {
    pub threshold: usize,
    pub full_threshold: usize,
    pub penalty: f64,
    pub full_penalty: f64,
    pub sense: ObjectiveSense,
}

impl ComplexityAdjustedScore {
    pub fn new(sense: ObjectiveSense) -> Self {
        Self {
            threshold: 10,
            full_threshold: 50,
            penalty: 0.2,
            full_penalty: 2.0,
            sense,
        }
    }

    /// Penalty fraction for a genome of `size`; zero at or below the threshold
    pub fn penalty_fraction(&self, size: usize) -> f64 {
        if size <= self.threshold {
            return 0.0;
        }
        let over = (size - self.threshold) as f64;
        let range = self.full_threshold.saturating_sub(self.threshold) as f64;
        let ratio = if range > 0.0 { (over / range).min(1.0) } else { 1.0 };
        self.penalty + (self.full_penalty - self.penalty) * ratio
    }
}

impl<G: Genome> ScoreAdjuster<G> for ComplexityAdjustedScore {
    fn adjust(&self, genome: &G, _raw_score: f64, adjusted_score: f64) -> f64 {
        let fraction = self.penalty_fraction(genome.size());
        if fraction == 0.0 || !adjusted_score.is_finite() {
            return adjusted_score;
        }
        let amount = adjusted_score.abs() * fraction;
        match self.sense {
            ObjectiveSense::Minimize => adjusted_score + amount,
            ObjectiveSense::Maximize => adjusted_score - amount,
        }
    }
}
