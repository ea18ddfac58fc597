use crate::engines::evaluation::ScoringReport;
use serde::Serialize;

/// Summary of one completed generation
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationStats {
    /// 1-based generation number
    pub iteration: usize,
    /// Raw score of the best genome found so far
    pub best_score: f64,
    pub best_adjusted_score: f64,
    /// Mean raw score over this generation's scored genomes
    pub mean_score: f64,
    pub species_count: usize,
    pub genome_count: usize,
    pub scoring: ScoringReport,
    /// Offspring rejected by constraint rules
    pub invalid_offspring: usize,
    /// Slots filled with a parent copy after retries ran out
    pub fallbacks: usize,
}
