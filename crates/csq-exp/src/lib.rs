#![deny(missing_docs)]
#![doc = "Layered configuration, result documents and the simulation drivers of the central-spin toolkit."]

/// Layered YAML configuration and per-simulation validation.
pub mod config;
/// Persistence of eigen solutions.
pub mod eigen_store;
/// Spin time evolution driver.
pub mod evolution;
/// Result documents and run timing.
pub mod results;
/// Simulation dispatch.
pub mod run;
/// YAML helpers with structured errors.
pub mod serde;
/// Spectrum against magnetic field.
pub mod spectrum;
pub mod sweeps;
/// Assembling baths, Hamiltonians and operators from configuration.
pub mod system;

pub use config::{
    load_config, merge_values, Config, FilesConfig, ObservableConfig, OperatorKind,
    PhysicsConfig, PhysicsField, ResultsConfig, SimulationKind, GAUSSIAN_SPREAD_DOCUMENT,
};
pub use eigen_store::{load_eigen, save_eigen, EigenRecord};
pub use results::{ResultsDocument, RunClock, SystemRecord, Values};
pub use run::{run, run_and_write};
