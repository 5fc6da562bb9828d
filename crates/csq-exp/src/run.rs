use std::path::PathBuf;

use csq_core::errors::CsqError;
use tracing::info;

use crate::config::{Config, SimulationKind};
use crate::evolution::spin_evolution;
use crate::results::ResultsDocument;
use crate::spectrum::spectrum;
use crate::sweeps::{
    decay_time_sweep, find_geometry, gaussian_spread, interactions, spread_of_couplings,
};

/// Validates the configuration and runs the simulation it names.
pub fn run(config: &Config) -> Result<ResultsDocument, CsqError> {
    let kind = config.simulation()?;
    config.validate(kind)?;
    info!(simulation = %kind, "starting simulation");
    match kind {
        SimulationKind::SpreadOfCouplings | SimulationKind::SpreadOfCouplingsSelectedCoeffs => {
            spread_of_couplings(config, kind)
        }
        SimulationKind::DecayTime => decay_time_sweep(config),
        SimulationKind::Interactions => interactions(config),
        SimulationKind::FindGeometryGivenInteractions => find_geometry(config),
        SimulationKind::Spectrum => spectrum(config),
        SimulationKind::SpinEvolution | SimulationKind::SpinEvolutionSelectedCoeffs => {
            spin_evolution(config, kind)
        }
        SimulationKind::SpreadOfCouplingsGaussian => gaussian_spread(config),
    }
}

/// Runs the configured simulation and writes its document to the outputs
/// directory.
pub fn run_and_write(config: &Config) -> Result<PathBuf, CsqError> {
    let document = run(config)?;
    document.write(&config.files.outputs_dir())
}
