use std::f64::consts::PI;
use std::path::PathBuf;

use csq_core::errors::{CsqError, ErrorInfo};
use csq_core::{Xy, Xys};
use csq_spin::{
    diagonalize, down_spins, many_body_ket, spin_dim, Eigen, Evolution, Observable, SiteBasis,
};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{Config, ObservableConfig, SimulationKind};
use crate::eigen_store::{load_eigen, save_eigen};
use crate::results::{ResultsDocument, RunClock, SystemRecord};
use crate::system::{build_bath, hamiltonian, operator_matrix};

/// Returns `true` when the ket is a product of `u`/`d` states with at least
/// one `d`, so evolution can stay in its fixed-magnetisation block.
pub fn restricts_to_subspace(ket: &str) -> bool {
    ket.chars().all(|c| c == 'u' || c == 'd') && down_spins(ket) > 0
}

/// Embeds the configured observables in `basis`, skipping entries whose
/// slot lies past the last site.
pub fn prepare_observables(
    observables: &[ObservableConfig],
    spin: f64,
    basis: &SiteBasis,
) -> Result<Vec<Observable>, CsqError> {
    let mut prepared = Vec::with_capacity(observables.len());
    for observable in observables {
        if observable.slot >= basis.sites() {
            warn!(
                slot = observable.slot,
                sites = basis.sites(),
                "observable slot outside the system, skipping"
            );
            continue;
        }
        let single = operator_matrix(observable.operator, spin)?;
        prepared.push(Observable::at_slot(&single, observable.slot, basis)?);
    }
    Ok(prepared)
}

fn obtain_eigen(
    config: &Config,
    clock: &RunClock,
    matrix: impl FnOnce() -> Result<csq_spin::DMatrix<f64>, CsqError>,
    system: &SystemRecord,
    dim: usize,
) -> Result<Eigen, CsqError> {
    if let Some(path) = config.files.diagonalization_path() {
        let eigen = load_eigen(&path)?;
        if eigen.dim() != dim {
            return Err(CsqError::Linalg(
                ErrorInfo::new("eigen-dimension", "cached eigen solution has the wrong dimension")
                    .with_context("path", path.display().to_string())
                    .with_context("expected", dim.to_string())
                    .with_context("actual", eigen.dim().to_string()),
            ));
        }
        return Ok(eigen);
    }
    let eigen = diagonalize(&matrix()?)?;
    let path: PathBuf = config
        .files
        .outputs_dir()
        .join(format!("diag-{}.yaml", clock.stamp()));
    save_eigen(&path, &eigen, system.clone())?;
    Ok(eigen)
}

/// Expectation values of every observable at `timerange` samples spaced by
/// `dt`, each series emitted as `(t/2π, ⟨O⟩)`.
pub fn spin_evolution(config: &Config, kind: SimulationKind) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let physics = &config.physics;
    let ket = physics.initial_ket.as_str();
    let sites = ket.chars().count();
    if sites < 2 {
        return Err(CsqError::Config(
            ErrorInfo::new("ket-too-short", "initial ket needs the central spin and a bath site")
                .with_context("field", "physics.initialket")
                .with_context("ket", ket),
        ));
    }
    if spin_dim(physics.spin)? != 2 {
        return Err(CsqError::Config(
            ErrorInfo::new("unsupported-spin", "ket strings describe spin-1/2 sites only")
                .with_context("spin", physics.spin.to_string()),
        ));
    }

    let bath_count = sites - 1;
    let bath = build_bath(physics, bath_count, physics.tilt_angle)?;
    let ham = hamiltonian(
        physics,
        &bath,
        physics.central_magnetic_field,
        physics.bath_magnetic_field,
    );
    let full_ket = many_body_ket(ket)?;
    let block = if restricts_to_subspace(ket) {
        Some(ham.fixed_down_basis(down_spins(ket))?).filter(|basis| basis.len() > 1)
    } else {
        None
    };
    let (basis, initial) = match block {
        Some(basis) => {
            let initial = basis.restrict_vector(&full_ket)?;
            debug!(full = full_ket.len(), reduced = basis.len(), "restricted to fixed magnetisation");
            (basis, initial)
        }
        // A single-state block (every spin down) is evolved in the full space.
        None => (ham.full_basis()?, full_ket),
    };

    let mut recorded = physics.clone();
    recorded.bath_count = bath_count;
    let system = SystemRecord::with_bath(&recorded, bath);
    let eigen = obtain_eigen(config, &clock, || ham.matrix(&basis), &system, basis.len())?;
    let observables = prepare_observables(&physics.observables, physics.spin, &basis)?;
    let evolution = Evolution::new(&eigen, &initial)?;

    info!(samples = physics.time_range, observables = observables.len(), "evolving");
    let samples: Vec<Vec<f64>> = (0..physics.time_range)
        .into_par_iter()
        .map(|step| -> Result<Vec<f64>, CsqError> {
            let state = evolution.state_at(step as f64 * physics.dt);
            observables
                .iter()
                .map(|observable| observable.expectation(&state))
                .collect()
        })
        .collect::<Result<_, _>>()?;

    let series: Vec<Xys> = (0..observables.len())
        .map(|k| {
            samples
                .iter()
                .enumerate()
                .map(|(step, values)| Xy::new(step as f64 * physics.dt / (2.0 * PI), values[k]))
                .collect()
        })
        .collect();

    Ok(clock.finish(kind, config, system, series))
}
