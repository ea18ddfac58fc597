use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{GeneticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeciationMethod {
    Single,
    Threshold,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeciationConfig {
    pub method: SpeciationMethod,
    pub compatibility_threshold: f64,
    pub max_species: usize,
    pub min_species_size: usize,
}

impl Default for SpeciationConfig {
    fn default() -> Self {
        Self {
            method: SpeciationMethod::Single,
            compatibility_threshold: 5.0,
            max_species: 10,
            min_species_size: 2,
        }
    }
}

impl ConfigSection for SpeciationConfig {
    fn section_name() -> &'static str {
        "speciation"
    }

    fn validate(&self) -> Result<()> {
        if !(self.compatibility_threshold >= 0.0) {
            return Err(GeneticError::Configuration(
                "Compatibility threshold must not be negative".to_string(),
            ));
        }
        if self.max_species == 0 {
            return Err(GeneticError::Configuration(
                "Max species must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Speciation".to_string(),
            fields: vec![
                FieldManifest::new("method", "enum", json!("single"), "single or threshold"),
                FieldManifest::new(
                    "compatibility_threshold",
                    "float",
                    json!(5.0),
                    "Largest distance to a species leader for membership",
                ),
                FieldManifest::new("max_species", "integer", json!(10), "Upper bound on species count")
                    .range(1.0, 10000.0),
                FieldManifest::new(
                    "min_species_size",
                    "integer",
                    json!(2),
                    "Smaller species are merged into their nearest neighbour",
                ),
            ],
        }
    }
}
