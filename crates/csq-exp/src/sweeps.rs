//! Coupling sweeps: spread and decay time against tilt, ranked
//! interactions, geometry reconstruction and the Gaussian width sweep.

use std::cmp::Ordering;

use csq_core::errors::CsqError;
use csq_core::{Xy, Xys};
use csq_coupling::{b_grid, spread_curve_with, Bath, SPREAD_SCALE};
use tracing::debug;

use crate::config::{Config, PhysicsField, SimulationKind};
use crate::results::{ResultsDocument, RunClock, SystemRecord};
use crate::system::{build_bath, coefficient_bath_count, coupling_model};

/// Spreads below this are treated as numerical noise.
pub const SPREAD_FLOOR: f64 = 1e-8;

/// Reported spread: `spread · 1e-3`, with noise clamped to zero.
pub fn reported_spread(spread: f64) -> f64 {
    if spread < SPREAD_FLOOR {
        0.0
    } else {
        spread * SPREAD_SCALE
    }
}

/// Decay time `1 / (spread · 1e-3)`, with the spread floored at `1e-8`.
pub fn decay_time(spread: f64) -> f64 {
    1.0 / (spread.max(SPREAD_FLOOR) * SPREAD_SCALE)
}

fn tilt_series(
    config: &Config,
    bath_count: usize,
    reduce: impl Fn(f64) -> f64,
) -> Result<Xys, CsqError> {
    let physics = &config.physics;
    let (min, max) = physics.range(PhysicsField::TiltAngleRange)?;
    let tilts = b_grid(min, max, physics.dt)?;
    debug!(samples = tilts.len(), bath_count, "sweeping tilt angle");
    tilts
        .into_iter()
        .map(|tilt| {
            let bath = build_bath(physics, bath_count, tilt)?;
            Ok(Xy::new(tilt, reduce(bath.spread())))
        })
        .collect()
}

/// `(tilt, spread·1e-3)` over `tiltanglerange`, for dipolar or explicit
/// couplings depending on `kind`.
pub fn spread_of_couplings(
    config: &Config,
    kind: SimulationKind,
) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let bath_count = match kind {
        SimulationKind::SpreadOfCouplingsSelectedCoeffs => {
            coefficient_bath_count(&config.physics)?
        }
        _ => config.physics.bath_count,
    };
    let series = tilt_series(config, bath_count, reported_spread)?;
    Ok(clock.finish(
        kind,
        config,
        SystemRecord::from_physics(&config.physics),
        vec![series],
    ))
}

/// `(tilt, decay time)` over `tiltanglerange`.
pub fn decay_time_sweep(config: &Config) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let series = tilt_series(config, config.physics.bath_count, decay_time)?;
    Ok(clock.finish(
        SimulationKind::DecayTime,
        config,
        SystemRecord::from_physics(&config.physics),
        vec![series],
    ))
}

/// Couplings at the configured tilt, strongest first, as `(rank, C·1e-3)`.
pub fn interactions(config: &Config) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let physics = &config.physics;
    let bath = build_bath(physics, physics.bath_count, physics.tilt_angle)?;
    let mut strengths: Vec<f64> = bath.sites().iter().map(|s| s.interaction_strength).collect();
    strengths.sort_by(|a, b| b.partial_cmp(a).unwrap_or(Ordering::Equal));
    debug!(?strengths, "ranked interactions");
    let series = strengths
        .iter()
        .enumerate()
        .map(|(rank, strength)| Xy::new(rank as f64, strength * SPREAD_SCALE))
        .collect();
    Ok(clock.finish(
        SimulationKind::Interactions,
        config,
        SystemRecord::with_bath(physics, bath),
        vec![series],
    ))
}

/// Distances at which each site reproduces its supplied coupling.
pub fn find_geometry(config: &Config) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let physics = &config.physics;
    let bath_count = coefficient_bath_count(physics)?;
    let mut bath = Bath::from_geometry(physics.geometry, bath_count, physics.tilt_angle, 0.0);
    bath.assign_coefficients(&physics.interaction_coefficients)?;
    bath.place_for_strengths(&coupling_model(physics))?;
    let mut physics = physics.clone();
    physics.bath_count = bath_count;
    Ok(clock.finish(
        SimulationKind::FindGeometryGivenInteractions,
        config,
        SystemRecord::with_bath(&physics, bath),
        Vec::new(),
    ))
}

/// Gaussian spread curve over `spreadrange` with step `dt`.
pub fn gaussian_spread(config: &Config) -> Result<ResultsDocument, CsqError> {
    let clock = RunClock::start();
    let physics = &config.physics;
    let (min, max) = physics.range(PhysicsField::SpreadRange)?;
    let grid = b_grid(min, max, physics.dt)?;
    let series = spread_curve_with(
        physics.bath_count,
        physics.gaussian_scale,
        &grid,
        physics.normalization,
    )?;
    Ok(clock.finish(
        SimulationKind::SpreadOfCouplingsGaussian,
        config,
        SystemRecord::from_physics(physics),
        vec![series],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(yaml: &str) -> Config {
        Config::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn clamps_follow_the_floor() {
        assert_eq!(reported_spread(5e-9), 0.0);
        assert_eq!(reported_spread(2.0), 2.0e-3);
        assert_eq!(decay_time(0.0), 1.0 / (1e-8 * 1e-3));
        assert_eq!(decay_time(4.0), 250.0);
    }

    #[test]
    fn untilted_ring_has_no_spread() {
        let config = config(
            "physics: {bathdipolemoment: 1.0, atomdipolemoment: 1.0, bathcount: 4, spin: 0.5,
             tiltanglerange: [0.0, 0.5], constantdistance: 1.0, geometry: ring, dt: 0.125}",
        );
        let doc = spread_of_couplings(&config, SimulationKind::SpreadOfCouplings).unwrap();
        let xs: Vec<f64> = doc.xys[0].iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 0.125, 0.25, 0.375]);
        assert_eq!(doc.xys[0][0].y, 0.0);
        assert!(doc.xys[0][2].y > 0.0);
    }

    #[test]
    fn selected_coefficients_give_constant_spread() {
        let config = config(
            "physics: {spin: 0.5, interactioncoefficients: [0, 1000, 3000], tiltanglerange: [0, 1], dt: 0.5}",
        );
        let doc =
            spread_of_couplings(&config, SimulationKind::SpreadOfCouplingsSelectedCoeffs).unwrap();
        assert_eq!(doc.xys[0], vec![Xy::new(0.0, 2.0), Xy::new(0.5, 2.0)]);
    }

    #[test]
    fn interactions_are_ranked_descending() {
        let config = config(
            "physics: {bathdipolemoment: 1.0, atomdipolemoment: 1.0, bathcount: 3,
             constantdistance: 1.0, interactioncoefficients: [0, -1000, 3000, 2000]}",
        );
        let doc = interactions(&config).unwrap();
        let ys: Vec<f64> = doc.xys[0].iter().map(|p| p.y).collect();
        assert_eq!(ys, vec![3.0, 2.0, -1.0]);
        assert_eq!(doc.values.system.bath.as_ref().map(Bath::len), Some(3));
    }

    #[test]
    fn geometry_recovers_distances() {
        let config = config(
            "physics: {bathdipolemoment: 1.0, atomdipolemoment: 1.0, interactioncoefficients: [0, 2.0, -4.0]}",
        );
        let doc = find_geometry(&config).unwrap();
        assert!(doc.xys.is_empty());
        let bath = doc.values.system.bath.unwrap();
        assert!(bath.sites().iter().all(|site| site.distance > 0.0));
        assert!(bath.sites()[0].distance > bath.sites()[1].distance);
        assert_eq!(doc.values.system.physicsconfig.bath_count, 2);
    }

    #[test]
    fn gaussian_sweep_matches_curve() {
        let config = config(
            "physics: {bathcount: 11, gaussianscale: 2.0, spreadrange: [0.0, 1.0], dt: 0.25}",
        );
        let doc = gaussian_spread(&config).unwrap();
        assert_eq!(doc.xys[0].len(), 4);
        assert!(doc.xys[0][0].y.abs() < 1e-15);
        assert!(doc.xys[0][3].y > doc.xys[0][1].y);
    }
}
