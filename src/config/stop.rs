use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{GeneticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StopConfig {
    /// 0 means no generation limit
    pub max_iterations: usize,
    /// 0 disables the check
    pub max_without_improvement: usize,
    pub target_score: Option<f64>,
}

impl Default for StopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            max_without_improvement: 0,
            target_score: None,
        }
    }
}

impl ConfigSection for StopConfig {
    fn section_name() -> &'static str {
        "stop"
    }

    fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 && self.max_without_improvement == 0 && self.target_score.is_none() {
            return Err(GeneticError::Configuration(
                "At least one stop condition is required".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Stop".to_string(),
            fields: vec![
                FieldManifest::new("max_iterations", "integer", json!(100), "Generation limit (0 = none)"),
                FieldManifest::new(
                    "max_without_improvement",
                    "integer",
                    json!(0),
                    "Stop after this many generations without a better genome (0 = off)",
                ),
                FieldManifest::new("target_score", "float", json!(null), "Stop once this score is reached"),
            ],
        }
    }
}
