use super::{Genome, GenomeMeta};
use crate::error::{GeneticError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar stored at one position of an array genome
pub trait Allele: Copy + PartialEq + Default + fmt::Debug + Send + Sync + 'static {
    const REPRESENTATION: &'static str;

    fn to_f64(self) -> f64;
}

impl Allele for i64 {
    const REPRESENTATION: &'static str = "integer-array";

    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Allele for f64 {
    const REPRESENTATION: &'static str = "real-array";

    fn to_f64(self) -> f64 {
        self
    }
}

/// Position-wise access needed by splice crossover and swap mutations
pub trait ArrayGenome: Genome {
    type Allele: Allele;

    fn alleles(&self) -> &[Self::Allele];

    /// Copies the allele at `src_index` in `source` into `dst_index` of `self`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    fn copy_allele(&mut self, source: &Self, src_index: usize, dst_index: usize);

    /// Exchanges two alleles in place.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    fn swap(&mut self, i: usize, j: usize);
}

/// Fixed-length array genome. The length is chosen at construction and never changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlleleGenome<T> {
    alleles: Vec<T>,
    meta: GenomeMeta,
}

pub type IntegerArrayGenome = AlleleGenome<i64>;
pub type DoubleArrayGenome = AlleleGenome<f64>;

impl<T: Allele> AlleleGenome<T> {
    /// Zero-initialised genome of `size` alleles
    pub fn new(size: usize) -> Self {
        Self {
            alleles: vec![T::default(); size],
            meta: GenomeMeta::default(),
        }
    }

    pub fn from_alleles(alleles: Vec<T>) -> Self {
        Self {
            alleles,
            meta: GenomeMeta::default(),
        }
    }

    /// Mutable view of the alleles; a slice so the length stays fixed
    pub fn alleles_mut(&mut self) -> &mut [T] {
        &mut self.alleles
    }

    pub fn get(&self, index: usize) -> T {
        self.alleles[index]
    }

    pub fn set(&mut self, index: usize, value: T) {
        self.alleles[index] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.alleles.iter()
    }
}

impl<T: Allele> Genome for AlleleGenome<T> {
    fn representation(&self) -> &'static str {
        T::REPRESENTATION
    }

    fn size(&self) -> usize {
        self.alleles.len()
    }

    fn meta(&self) -> &GenomeMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut GenomeMeta {
        &mut self.meta
    }

    fn copy_from(&mut self, source: &Self) -> Result<()> {
        if source.alleles.len() != self.alleles.len() {
            return Err(GeneticError::SizeMismatch {
                expected: self.alleles.len(),
                actual: source.alleles.len(),
            });
        }
        self.alleles.copy_from_slice(&source.alleles);
        self.meta.copy_from(&source.meta);
        Ok(())
    }
}

impl<T: Allele> ArrayGenome for AlleleGenome<T> {
    type Allele = T;

    fn alleles(&self) -> &[T] {
        &self.alleles
    }

    fn copy_allele(&mut self, source: &Self, src_index: usize, dst_index: usize) {
        self.alleles[dst_index] = source.alleles[src_index];
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.alleles.swap(i, j);
    }
}
