pub mod adjuster;
pub mod decoder;
pub mod scorer;

pub use adjuster::{ComplexityAdjustedScore, ScoreAdjuster};
pub use decoder::{DecodingScorer, DirectScorer, GenomeScorer, PhenotypeDecoder, ScoreFunction};
pub use scorer::{ParallelScorer, ScoreOutcome, ScoringReport};
