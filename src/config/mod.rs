pub mod builder;
pub mod evolution;
pub mod manager;
pub mod operators;
pub mod scoring;
pub mod selection;
pub mod speciation;
pub mod stop;
pub mod traits;

pub use builder::EngineBuilder;
pub use evolution::{EvolutionConfig, Representation};
pub use manager::{AppConfig, ConfigManager, ENV_PREFIX};
pub use operators::{CrossoverKind, MutationKind, OperatorConfig};
pub use scoring::ScoringConfig;
pub use selection::{SelectionConfig, SelectionMethod};
pub use speciation::{SpeciationConfig, SpeciationMethod};
pub use stop::StopConfig;
pub use traits::{ConfigManifest, ConfigSection, FieldManifest};
