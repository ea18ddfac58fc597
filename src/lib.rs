//! Evolutionary-computation engine: genomes, species-based populations,
//! selection and genetic operators, parallel fitness scoring and post-operator
//! rewrite/constraint rules, driven one generation at a time by
//! [`EvolutionaryAlgorithm`](engines::generation::EvolutionaryAlgorithm).

pub mod config;
pub mod engines;
pub mod error;
pub mod genome;
pub mod population;
pub mod types;

pub use error::{GeneticError, Result};
pub use types::{ObjectiveSense, PopulationId, SpeciesId, Value};
