use csq_core::errors::{CsqError, ErrorInfo};
use csq_coupling::{Bath, CouplingModel};
use csq_spin::{DMatrix, XxHamiltonian};

use crate::config::{OperatorKind, PhysicsConfig};

/// Dipolar model described by the physics section.
pub fn coupling_model(physics: &PhysicsConfig) -> CouplingModel {
    CouplingModel {
        bath_dipole_moment: physics.bath_dipole_moment,
        atom_dipole_moment: physics.atom_dipole_moment,
        units: physics.units,
    }
}

/// Bath size implied by explicit coefficients, which include the central
/// entry.
pub fn coefficient_bath_count(physics: &PhysicsConfig) -> Result<usize, CsqError> {
    match physics.interaction_coefficients.len() {
        0 | 1 => Err(CsqError::Config(
            ErrorInfo::new(
                "coefficient-count",
                "interaction coefficients need the central entry and at least one bath site",
            )
            .with_context("field", "physics.interactioncoefficients")
            .with_context("length", physics.interaction_coefficients.len().to_string()),
        )),
        len => Ok(len - 1),
    }
}

/// Places `bath_count` sites on the configured lattice tilted by `tilt` and
/// assigns couplings: the explicit coefficients when given, dipolar
/// strengths otherwise.
pub fn build_bath(physics: &PhysicsConfig, bath_count: usize, tilt: f64) -> Result<Bath, CsqError> {
    let mut bath =
        Bath::from_geometry(physics.geometry, bath_count, tilt, physics.constant_distance);
    if physics.interaction_coefficients.is_empty() {
        bath.assign_strengths(&coupling_model(physics));
    } else {
        bath.assign_coefficients(&physics.interaction_coefficients)?;
    }
    Ok(bath)
}

/// XX Hamiltonian for `bath` with explicit field values.
pub fn hamiltonian(physics: &PhysicsConfig, bath: &Bath, b0: f64, b: f64) -> XxHamiltonian {
    XxHamiltonian::new(bath.couplings(), b0, b, physics.spin)
}

/// Single-site matrix of an observable operator.
pub fn operator_matrix(kind: OperatorKind, spin: f64) -> Result<DMatrix<f64>, CsqError> {
    match kind {
        OperatorKind::Sz => csq_spin::sz(spin),
        OperatorKind::Sp => csq_spin::sp(spin),
        OperatorKind::Sm => csq_spin::sm(spin),
        OperatorKind::Id => csq_spin::identity(spin),
    }
}
