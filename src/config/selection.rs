use super::traits::{ConfigManifest, ConfigSection, FieldManifest};
use crate::error::{GeneticError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMethod {
    Truncation,
    Tournament,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub method: SelectionMethod,
    pub truncation_percent: f64,
    pub tournament_rounds: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            method: SelectionMethod::Truncation,
            truncation_percent: 0.3,
            tournament_rounds: 4,
        }
    }
}

impl ConfigSection for SelectionConfig {
    fn section_name() -> &'static str {
        "selection"
    }

    fn validate(&self) -> Result<()> {
        if !(self.truncation_percent > 0.0 && self.truncation_percent <= 1.0) {
            return Err(GeneticError::Configuration(
                "Truncation percent must be in (0, 1]".to_string(),
            ));
        }
        if self.tournament_rounds == 0 {
            return Err(GeneticError::Configuration(
                "Tournament rounds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Selection".to_string(),
            fields: vec![
                FieldManifest::new("method", "enum", json!("truncation"), "truncation or tournament"),
                FieldManifest::new(
                    "truncation_percent",
                    "float",
                    json!(0.3),
                    "Top share of a species eligible as parents",
                )
                .range(0.0, 1.0),
                FieldManifest::new("tournament_rounds", "integer", json!(4), "Competitors per tournament")
                    .range(1.0, 1000.0),
            ],
        }
    }
}
