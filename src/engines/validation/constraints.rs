use super::rules::ConstraintRule;
use crate::genome::{Allele, AlleleGenome, ArrayGenome, ProgramGenome};

/// Accepts integer genomes holding each value of `0..len` exactly once
#[derive(Debug, Clone, Copy, Default)]
pub struct PermutationConstraint;

impl ConstraintRule<AlleleGenome<i64>> for PermutationConstraint {
    fn is_valid(&self, genome: &AlleleGenome<i64>) -> bool {
        let len = genome.alleles().len();
        let mut seen = vec![false; len];
        for &value in genome.alleles() {
            match usize::try_from(value) {
                Ok(index) if index < len && !seen[index] => seen[index] = true,
                _ => return false,
            }
        }
        true
    }
}

/// Accepts array genomes whose alleles all lie in `[low, high]`
#[derive(Debug, Clone, Copy)]
pub struct AlleleRangeConstraint {
    pub low: f64,
    pub high: f64,
}

impl AlleleRangeConstraint {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

impl<T: Allele> ConstraintRule<AlleleGenome<T>> for AlleleRangeConstraint {
    fn is_valid(&self, genome: &AlleleGenome<T>) -> bool {
        genome
            .iter()
            .map(|allele| allele.to_f64())
            .all(|v| v >= self.low && v <= self.high)
    }
}

/// Rejects program trees with too many nodes or too deep a nesting
#[derive(Debug, Clone, Copy)]
pub struct MaxProgramSize {
    pub max_nodes: usize,
    pub max_depth: Option<usize>,
}

impl MaxProgramSize {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            max_nodes,
            max_depth: None,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl ConstraintRule<ProgramGenome> for MaxProgramSize {
    fn is_valid(&self, genome: &ProgramGenome) -> bool {
        let root = genome.root();
        root.node_count() <= self.max_nodes
            && self.max_depth.map_or(true, |max| root.depth() <= max)
    }
}
