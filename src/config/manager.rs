use super::{
    evolution::EvolutionConfig,
    operators::{CrossoverKind, OperatorConfig},
    scoring::ScoringConfig,
    selection::SelectionConfig, speciation::SpeciationConfig, stop::StopConfig,
    traits::{ConfigManifest, ConfigSection},
};
use crate::error::{GeneticError, Result};
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Prefix of environment overrides, e.g. `EVOFORGE__EVOLUTION__POPULATION_SIZE=40`
pub const ENV_PREFIX: &str = "EVOFORGE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub selection: SelectionConfig,
    pub operators: OperatorConfig,
    pub speciation: SpeciationConfig,
    pub scoring: ScoringConfig,
    pub stop: StopConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.evolution.validate()?;
        self.selection.validate()?;
        self.operators.validate()?;
        self.speciation.validate()?;
        self.scoring.validate()?;
        self.stop.validate()?;
        if self.operators.crossover != CrossoverKind::None
            && self.operators.cut_length >= self.evolution.genome_length
        {
            return Err(GeneticError::Configuration(format!(
                "Cut length {} must be shorter than the genome length {}",
                self.operators.cut_length, self.evolution.genome_length
            )));
        }
        Ok(())
    }

    pub fn manifests(&self) -> Vec<ConfigManifest> {
        vec![
            self.evolution.to_manifest(),
            self.selection.to_manifest(),
            self.operators.to_manifest(),
            self.speciation.to_manifest(),
            self.scoring.to_manifest(),
            self.stop.to_manifest(),
        ]
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Loads a TOML or JSON file (by extension), then applies `EVOFORGE__*` overrides
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        info!("Loading config from {}", path.display());
        let builder = config::Config::builder()
            .add_source(File::from(path))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        self.apply(builder)
    }

    /// Loads config text without environment overrides
    pub fn load_from_str(&self, contents: &str, format: FileFormat) -> Result<()> {
        let builder = config::Config::builder().add_source(File::from_str(contents, format));
        self.apply(builder)
    }

    fn apply(&self, builder: ConfigBuilder<DefaultState>) -> Result<()> {
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        debug!("Loaded config: {:?}", config);
        *self.write() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_str = toml::to_string_pretty(&*self.read())?;
        std::fs::write(path, toml_str)?;
        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.read().clone()
    }

    /// Applies `f` and keeps the result only if it validates
    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.write();
        let mut updated = config.clone();
        f(&mut updated);
        updated.validate()?;
        *config = updated;
        Ok(())
    }

    fn read(&self) -> RwLockReadGuard<'_, AppConfig> {
        self.config.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, AppConfig> {
        self.config.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
