use csq_core::errors::CsqError;
use csq_core::{Xy, Xys};
use csq_spin::diagonalize;
use rayon::prelude::*;
use tracing::debug;

use crate::config::{Config, SimulationKind};
use crate::results::{ResultsDocument, RunClock, SystemRecord};
use crate::system::{build_bath, hamiltonian};

/// Bath field step between spectrum samples.
pub const FIELD_STEP: f64 = 1e3;

/// Central field relative to the bath field.
pub const CENTRAL_FIELD_RATIO: f64 = 1.0002;

/// Field values `(b0, b)` of sample `index`.
pub fn fields_at(index: usize) -> (f64, f64) {
    let b = index as f64 * FIELD_STEP;
    (CENTRAL_FIELD_RATIO * b, b)
}

/// Eigenvalues of the full Hamiltonian for `magneticfieldrange` field values,
/// emitted as `(b, E)` in field order.
pub fn spectrum(config: &Config) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let physics = &config.physics;
    let bath = build_bath(physics, physics.bath_count, physics.tilt_angle)?;
    debug!(fields = physics.magnetic_field_range, sites = bath.len() + 1, "computing spectrum");

    let per_field: Vec<Xys> = (0..physics.magnetic_field_range)
        .into_par_iter()
        .map(|index| -> Result<Xys, CsqError> {
            let (b0, b) = fields_at(index);
            let eigen = diagonalize(&hamiltonian(physics, &bath, b0, b).build()?)?;
            Ok(eigen.values.iter().map(|&energy| Xy::new(b, energy)).collect())
        })
        .collect::<Result<_, _>>()?;

    Ok(clock.finish(
        SimulationKind::Spectrum,
        config,
        SystemRecord::with_bath(physics, bath),
        vec![per_field.into_iter().flatten().collect()],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uncoupled_spectrum_is_zeeman_ladder() {
        let config = Config::from_yaml_str(
            "physics: {spin: 0.5, bathcount: 1, magneticfieldrange: 3, interactioncoefficients: [0, 0]}",
        )
        .unwrap();
        let doc = spectrum(&config).unwrap();
        let series = &doc.xys[0];
        assert_eq!(series.len(), 12);
        assert!(series[..4].iter().all(|p| p.x == 0.0 && p.y.abs() < 1e-9));
        let (b0, b) = fields_at(2);
        let top = series[11];
        assert_eq!(top.x, 2e3);
        assert!((top.y - 0.5 * (b0 + b)).abs() < 1e-6);
    }

    #[test]
    fn dipolar_spectrum_without_distance_is_rejected() {
        let config = Config::from_yaml_str(
            "simulation: spectrum\nphysics: {spin: 0.5, bathcount: 2, magneticfieldrange: 2, bathdipolemoment: 1.0, atomdipolemoment: 1.0}",
        )
        .unwrap();
        let err = crate::run::run(&config).unwrap_err();
        assert_eq!(err.info().code, "missing-field");
    }

    #[test]
    fn zero_distance_bath_does_not_produce_nan() {
        let config = Config::from_yaml_str(
            "physics: {spin: 0.5, bathcount: 2, magneticfieldrange: 2, bathdipolemoment: 1.0,
             atomdipolemoment: 1.0, constantdistance: 0.0, geometry: ring}",
        )
        .unwrap();
        let err = spectrum(&config).unwrap_err();
        assert_eq!(err.info().code, "non-finite-hamiltonian");
    }
}
