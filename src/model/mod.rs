pub use vivarium_core::{init_logging, BrainError, GenomeSource, Metrics};
pub mod brain {
    pub use vivarium_core::brain::*;
}
pub mod config {
    pub use vivarium_core::config::*;
}
pub mod genome {
    pub use vivarium_core::genome::*;
    pub use vivarium_data::{Gene, Genome, PlasticityProfile, SensorModulationProfile};
}
