use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{GeneticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Scoring workers; 0 uses one per core
    pub threads: usize,
    pub complexity_penalty: bool,
    pub complexity_threshold: usize,
    pub complexity_full_threshold: usize,
    pub penalty: f64,
    pub full_penalty: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            threads: 0,
            complexity_penalty: false,
            complexity_threshold: 10,
            complexity_full_threshold: 50,
            penalty: 0.2,
            full_penalty: 2.0,
        }
    }
}

impl ConfigSection for ScoringConfig {
    fn section_name() -> &'static str {
        "scoring"
    }

    fn validate(&self) -> Result<()> {
        if self.complexity_full_threshold < self.complexity_threshold {
            return Err(GeneticError::Configuration(
                "Full complexity threshold must not be below the complexity threshold".to_string(),
            ));
        }
        if !(self.penalty >= 0.0 && self.full_penalty >= 0.0) {
            return Err(GeneticError::Configuration(
                "Complexity penalties must not be negative".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Scoring".to_string(),
            fields: vec![
                FieldManifest::new("threads", "integer", json!(0), "Scoring workers (0 = one per core)"),
                FieldManifest::new("complexity_penalty", "bool", json!(false), "Penalize oversized genomes"),
                FieldManifest::new("complexity_threshold", "integer", json!(10), "Size where the penalty starts"),
                FieldManifest::new(
                    "complexity_full_threshold",
                    "integer",
                    json!(50),
                    "Size where the full penalty applies",
                ),
                FieldManifest::new("penalty", "float", json!(0.2), "Penalty fraction at the threshold"),
                FieldManifest::new("full_penalty", "float", json!(2.0), "Penalty fraction at full complexity"),
            ],
        }
    }
}
