use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{GeneticError, Result};
use crate::types::ObjectiveSense;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Kind of array genome the population is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Integers drawn from the initial range
    Integer,
    /// Shuffled orderings of `0..genome_length`
    Permutation,
    /// Reals drawn from the initial range
    Real,
}

impl Representation {
    /// Name of the genome representation this config produces
    pub fn genome_representation(self) -> &'static str {
        match self {
            Representation::Integer | Representation::Permutation => "integer-array",
            Representation::Real => "real-array",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    pub population_size: usize,
    pub genome_length: usize,
    pub representation: Representation,
    pub sense: ObjectiveSense,
    pub seed: Option<u64>,
    pub elite_rate: f64,
    pub max_operation_retries: usize,
    /// Species stagnant this long stop breeding; 0 disables
    pub max_gens_no_improvement: usize,
    pub initial_low: f64,
    pub initial_high: f64,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            genome_length: 10,
            representation: Representation::Integer,
            sense: ObjectiveSense::Maximize,
            seed: None,
            elite_rate: 0.1,
            max_operation_retries: 5,
            max_gens_no_improvement: 15,
            initial_low: 0.0,
            initial_high: 10.0,
        }
    }
}

impl ConfigSection for EvolutionConfig {
    fn section_name() -> &'static str {
        "evolution"
    }

    fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(GeneticError::Configuration(
                "Population size must be at least 2".to_string(),
            ));
        }
        if self.genome_length == 0 {
            return Err(GeneticError::Configuration(
                "Genome length must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.elite_rate) {
            return Err(GeneticError::Configuration(
                "Elite rate must be between 0 and 1".to_string(),
            ));
        }
        if !(self.initial_low <= self.initial_high) {
            return Err(GeneticError::Configuration(format!(
                "Initial range is empty: [{}, {}]",
                self.initial_low, self.initial_high
            )));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Evolution".to_string(),
            fields: vec![
                FieldManifest::new("population_size", "integer", json!(100), "Genomes per generation")
                    .range(2.0, 100000.0),
                FieldManifest::new("genome_length", "integer", json!(10), "Alleles per genome")
                    .range(1.0, 100000.0),
                FieldManifest::new(
                    "representation",
                    "enum",
                    json!("integer"),
                    "integer, permutation or real",
                ),
                FieldManifest::new("sense", "enum", json!("maximize"), "minimize or maximize"),
                FieldManifest::new("seed", "integer", json!(null), "RNG seed; random when unset"),
                FieldManifest::new("elite_rate", "float", json!(0.1), "Share of each species kept unchanged")
                    .range(0.0, 1.0),
                FieldManifest::new(
                    "max_operation_retries",
                    "integer",
                    json!(5),
                    "Breeding retries before a parent copy fills the slot",
                ),
                FieldManifest::new(
                    "max_gens_no_improvement",
                    "integer",
                    json!(15),
                    "Stagnant generations before a species stops breeding (0 disables)",
                ),
                FieldManifest::new("initial_low", "float", json!(0.0), "Lower bound of initial alleles"),
                FieldManifest::new("initial_high", "float", json!(10.0), "Upper bound of initial alleles"),
            ],
        }
    }
}
