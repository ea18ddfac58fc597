use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{GeneticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    None,
    Splice,
    SpliceNoRepeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    None,
    Perturb,
    Shuffle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperatorConfig {
    pub crossover: CrossoverKind,
    pub crossover_probability: f64,
    pub cut_length: usize,
    pub mutation: MutationKind,
    pub mutation_probability: f64,
    pub perturb_amount: f64,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            crossover: CrossoverKind::Splice,
            crossover_probability: 0.9,
            cut_length: 3,
            mutation: MutationKind::Shuffle,
            mutation_probability: 0.1,
            perturb_amount: 0.1,
        }
    }
}

impl ConfigSection for OperatorConfig {
    fn section_name() -> &'static str {
        "operators"
    }

    fn validate(&self) -> Result<()> {
        if self.crossover == CrossoverKind::None && self.mutation == MutationKind::None {
            return Err(GeneticError::Configuration(
                "At least one of crossover and mutation must be enabled".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.crossover_probability) {
            return Err(GeneticError::Configuration(
                "Crossover probability must be between 0 and 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.mutation_probability) {
            return Err(GeneticError::Configuration(
                "Mutation probability must be between 0 and 1".to_string(),
            ));
        }
        if !(self.perturb_amount >= 0.0) {
            return Err(GeneticError::Configuration(
                "Perturb amount must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Operators".to_string(),
            fields: vec![
                FieldManifest::new("crossover", "enum", json!("splice"), "none, splice or splice_no_repeat"),
                FieldManifest::new("crossover_probability", "float", json!(0.9), "Chance a parent pair is recombined")
                    .range(0.0, 1.0),
                FieldManifest::new("cut_length", "integer", json!(3), "Length of the spliced region"),
                FieldManifest::new("mutation", "enum", json!("shuffle"), "none, perturb or shuffle"),
                FieldManifest::new("mutation_probability", "float", json!(0.1), "Chance an offspring is mutated")
                    .range(0.0, 1.0),
                FieldManifest::new("perturb_amount", "float", json!(0.1), "Relative perturbation range")
                    .range(0.0, 10.0),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_disabled_operators() {
        assert!(OperatorConfig::default().validate().is_ok());
        let config = OperatorConfig {
            crossover: CrossoverKind::None,
            mutation: MutationKind::None,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
