use super::array::{Allele, AlleleGenome};
use super::program::{ProgramGenome, ProgramNode};
use super::Genome;
use crate::error::Result;
use crate::types::Value;
use std::marker::PhantomData;

/// Produces blank genomes of one configured representation
pub trait GenomeFactory<G: Genome>: Send + Sync {
    /// A new zero-initialised genome. Every call yields the same length.
    fn factor(&self) -> G;

    /// A new genome holding a deep copy of `source`
    fn factor_copy(&self, source: &G) -> Result<G> {
        let mut genome = self.factor();
        genome.copy_from(source)?;
        Ok(genome)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArrayGenomeFactory<T> {
    size: usize,
    _allele: PhantomData<fn() -> T>,
}

pub type IntegerArrayGenomeFactory = ArrayGenomeFactory<i64>;
pub type DoubleArrayGenomeFactory = ArrayGenomeFactory<f64>;

impl<T: Allele> ArrayGenomeFactory<T> {
    pub fn new(size: usize) -> Self {
        Self {
            size,
            _allele: PhantomData,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }
}

impl<T: Allele> GenomeFactory<AlleleGenome<T>> for ArrayGenomeFactory<T> {
    fn factor(&self) -> AlleleGenome<T> {
        AlleleGenome::new(self.size)
    }
}

/// Factors single-constant programs (`0`)
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgramGenomeFactory;

impl GenomeFactory<ProgramGenome> for ProgramGenomeFactory {
    fn factor(&self) -> ProgramGenome {
        ProgramGenome::new(ProgramNode::Const(Value::Integer(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genome::ArrayGenome;

    #[test]
    fn test_factor_same_length_every_call() {
        let factory = IntegerArrayGenomeFactory::new(6);
        let a = factory.factor();
        let b = factory.factor();
        assert_eq!(a.size(), 6);
        assert_eq!(b.size(), 6);
        assert!(a.alleles().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_factor_copy() {
        let factory = DoubleArrayGenomeFactory::new(3);
        let source = AlleleGenome::from_alleles(vec![0.5, 1.5, 2.5]);
        let copy = factory.factor_copy(&source).unwrap();
        assert_eq!(copy.alleles(), source.alleles());
    }
}
