//! Contracts for the collaborators that turn a genome into a fitness value.
//!
//! A [`PhenotypeDecoder`] builds the evaluable form of a genome and a
//! [`ScoreFunction`] measures it. Both are shared read-only by every scoring
//! worker, so they must be `Send + Sync` and must not rely on interior state
//! that depends on evaluation order.

/// Decodes a genome into the phenotype a score function understands.
///
/// Returning `None` means the genome has no usable phenotype; the genome is left
/// unscored (NaN) and ranks below every scored genome.
pub trait PhenotypeDecoder<G>: Send + Sync {
    type Phenotype;

    fn decode(&self, genome: &G) -> Option<Self::Phenotype>;
}

/// Fitness of a phenotype. Errors are absorbed by the scorer and become NaN.
pub trait ScoreFunction<P: ?Sized>: Send + Sync {
    fn score(&self, phenotype: &P) -> anyhow::Result<f64>;
}

impl<P: ?Sized, F> ScoreFunction<P> for F
where
    F: Fn(&P) -> anyhow::Result<f64> + Send + Sync,
{
    fn score(&self, phenotype: &P) -> anyhow::Result<f64> {
        self(phenotype)
    }
}

/// Object-safe scoring entry point used by the parallel scorer
pub trait GenomeScorer<G>: Send + Sync {
    /// `Ok(None)` when the genome does not decode
    fn score_genome(&self, genome: &G) -> anyhow::Result<Option<f64>>;
}

/// Decodes each genome and scores the resulting phenotype
pub struct DecodingScorer<D, S> {
    decoder: D,
    score_function: S,
}

impl<D, S> DecodingScorer<D, S> {
    pub fn new(decoder: D, score_function: S) -> Self {
        Self {
            decoder,
            score_function,
        }
    }
}

impl<G, D, S> GenomeScorer<G> for DecodingScorer<D, S>
where
    D: PhenotypeDecoder<G>,
    S: ScoreFunction<D::Phenotype>,
{
    fn score_genome(&self, genome: &G) -> anyhow::Result<Option<f64>> {
        match self.decoder.decode(genome) {
            Some(phenotype) => self.score_function.score(&phenotype).map(Some),
            None => Ok(None),
        }
    }
}

/// Scores the genome itself, for problems where the genome is its own phenotype
pub struct DirectScorer<S> {
    score_function: S,
}

impl<S> DirectScorer<S> {
    pub fn new(score_function: S) -> Self {
        Self { score_function }
    }
}

impl<G, S> GenomeScorer<G> for DirectScorer<S>
where
    S: ScoreFunction<G>,
{
    fn score_genome(&self, genome: &G) -> anyhow::Result<Option<f64>> {
        self.score_function.score(genome).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::IntegerArrayGenome;

    struct SumDecoder;

    impl PhenotypeDecoder<IntegerArrayGenome> for SumDecoder {
        type Phenotype = i64;

        fn decode(&self, genome: &IntegerArrayGenome) -> Option<i64> {
            let sum: i64 = genome.iter().sum();
            (sum >= 0).then_some(sum)
        }
    }

    #[test]
    fn test_decoding_scorer_passes_phenotype_through() {
        let scorer = DecodingScorer::new(SumDecoder, |sum: &i64| -> anyhow::Result<f64> {
            Ok(*sum as f64 * 2.0)
        });

        let genome = IntegerArrayGenome::from_alleles(vec![1, 2, 3]);
        assert_eq!(scorer.score_genome(&genome).unwrap(), Some(12.0));

        let negative = IntegerArrayGenome::from_alleles(vec![-5, 1]);
        assert_eq!(scorer.score_genome(&negative).unwrap(), None);
    }

    #[test]
    fn test_direct_scorer_reports_errors() {
        let scorer = DirectScorer::new(|_: &IntegerArrayGenome| -> anyhow::Result<f64> {
            anyhow::bail!("model diverged")
        });
        let genome = IntegerArrayGenome::new(2);
        assert!(scorer.score_genome(&genome).is_err());
    }
}
