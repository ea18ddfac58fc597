pub mod allocation;
pub mod crossover;
pub mod evolution_engine;
pub mod mutation;
pub mod operation_list;
pub mod operator;
pub mod progress;
pub mod selection;
pub mod stats;
pub mod stop;

pub use allocation::{allocate_offspring, SpeciesAllocation};
pub use crossover::{Splice, SpliceNoRepeat};
pub use evolution_engine::{EvolutionPhase, EvolutionaryAlgorithm};
pub use mutation::{MutatePerturb, MutateShuffle};
pub use operation_list::OperationList;
pub use operator::{EvolutionaryOperator, OperatorContext};
pub use progress::{
    ChannelProgressCallback, JsonLinesProgressCallback, LogProgressCallback, ProgressCallback,
    ProgressMessage,
};
pub use selection::{SelectionOperator, TournamentSelection, TruncationSelection};
pub use stats::GenerationStats;
pub use stop::{EndIterations, NoImprovement, StopSignal, StopStrategy, TargetScore};
