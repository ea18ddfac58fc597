use thiserror::Error;

#[derive(Error, Debug)]
pub enum GeneticError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Representation mismatch: expected {expected}, got {actual}")]
    RepresentationMismatch { expected: String, actual: String },

    #[error("Genome size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("Operator needs {needed} parents but the species only has {available} members")]
    InsufficientParents { needed: usize, available: usize },

    #[error("Selection index {index} out of bounds for species of size {size}")]
    SelectionOutOfBounds { index: usize, size: usize },

    #[error("Ran out of integers to select")]
    ExhaustedValues,

    #[error("Population is empty")]
    EmptyPopulation,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("Serde error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GeneticError>;
