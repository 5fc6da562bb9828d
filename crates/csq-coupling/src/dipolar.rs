use std::f64::consts::PI;

use csq_core::errors::{CsqError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::gaussian::spread_of;
use crate::geometry::Geometry;

/// Vacuum permittivity in SI units.
pub const EPSILON_0: f64 = 8.854e-12;

/// Dipolar prefactor `1/(4πε0)` expressed in atomic units.
pub const ATOMIC_PREFACTOR: f64 = 149.427_859_550_129_54;

/// Unit system used for the dipolar prefactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    /// SI units, prefactor `1/(4πε0)`.
    #[default]
    Si,
    /// Atomic units.
    Atomic,
}

impl Units {
    /// Returns the dipolar prefactor for this unit system.
    pub fn prefactor(&self) -> f64 {
        match self {
            Units::Si => 1.0 / (4.0 * PI * EPSILON_0),
            Units::Atomic => ATOMIC_PREFACTOR,
        }
    }
}

/// Position and coupling of a single bath site relative to the central spin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BathSite {
    /// Cosine of the polar angle between the site and the quantisation axis.
    pub angle: f64,
    /// Distance from the central spin.
    pub distance: f64,
    /// Coupling strength to the central spin.
    #[serde(rename = "interactionstrength")]
    pub interaction_strength: f64,
}

impl BathSite {
    /// Creates a site with no coupling assigned yet.
    pub fn new(angle: f64, distance: f64) -> Self {
        Self {
            angle,
            distance,
            interaction_strength: 0.0,
        }
    }

    fn angular_factor(&self) -> f64 {
        0.5 * (1.0 - 3.0 * self.angle * self.angle)
    }
}

/// Dipole-dipole coupling between the central atom and the bath molecules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CouplingModel {
    /// Dipole moment of each bath molecule.
    pub bath_dipole_moment: f64,
    /// Dipole moment of the central atom.
    pub atom_dipole_moment: f64,
    /// Unit system for the prefactor.
    pub units: Units,
}

impl CouplingModel {
    /// Dipolar coupling `k · d_b · d_a / r^3 · ½(1 - 3cos²θ)` for a site.
    pub fn strength(&self, site: &BathSite) -> f64 {
        self.units.prefactor() * self.bath_dipole_moment * self.atom_dipole_moment
            / site.distance.abs().powi(3)
            * site.angular_factor()
    }

    /// Inverts [`CouplingModel::strength`] for the distance that yields
    /// `strength` at the given polar cosine. Always uses the SI prefactor.
    pub fn distance_for(&self, strength: f64, angle: f64) -> Result<f64, CsqError> {
        if strength == 0.0 {
            return Err(CsqError::Coupling(
                ErrorInfo::new("zero-strength", "cannot place a site with zero coupling")
                    .with_context("angle", angle.to_string()),
            ));
        }
        let site = BathSite::new(angle, 0.0);
        let cube = self.bath_dipole_moment * self.atom_dipole_moment * Units::Si.prefactor()
            / strength
            * site.angular_factor();
        Ok(cube.abs().cbrt())
    }
}

/// Collection of bath sites, indexed `1..=N` from the central spin's view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Bath {
    sites: Vec<BathSite>,
}

impl Bath {
    /// Wraps an explicit list of sites.
    pub fn new(sites: Vec<BathSite>) -> Self {
        Self { sites }
    }

    /// Places `bath_count` sites on `geometry` at a fixed distance, tilted by
    /// `tilt · π`.
    pub fn from_geometry(geometry: Geometry, bath_count: usize, tilt: f64, distance: f64) -> Self {
        let sites = (0..bath_count)
            .map(|i| BathSite::new(geometry.polar_angle_cos(i, bath_count, tilt), distance))
            .collect();
        Self { sites }
    }

    /// Number of bath sites.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    /// Returns `true` when the bath has no sites.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Borrow the sites.
    pub fn sites(&self) -> &[BathSite] {
        &self.sites
    }

    /// Assigns every site its dipolar coupling under `model`.
    pub fn assign_strengths(&mut self, model: &CouplingModel) {
        for site in &mut self.sites {
            site.interaction_strength = model.strength(site);
        }
    }

    /// Assigns explicit coefficients indexed `0..=N`; entry 0 belongs to the
    /// central spin and is ignored.
    pub fn assign_coefficients(&mut self, coefficients: &[f64]) -> Result<(), CsqError> {
        if coefficients.len() != self.sites.len() + 1 {
            return Err(CsqError::Coupling(
                ErrorInfo::new(
                    "coefficient-count",
                    "interaction coefficients must cover the central spin and every bath site",
                )
                .with_context("expected", (self.sites.len() + 1).to_string())
                .with_context("actual", coefficients.len().to_string()),
            ));
        }
        for (site, &value) in self.sites.iter_mut().zip(&coefficients[1..]) {
            site.interaction_strength = value;
        }
        Ok(())
    }

    /// Solves for every site's distance given its assigned coupling and angle.
    pub fn place_for_strengths(&mut self, model: &CouplingModel) -> Result<(), CsqError> {
        for site in &mut self.sites {
            site.distance = model.distance_for(site.interaction_strength, site.angle)?;
        }
        Ok(())
    }

    /// Coupling vector indexed `0..=N` with the central entry fixed at zero.
    pub fn couplings(&self) -> Vec<f64> {
        std::iter::once(0.0)
            .chain(self.sites.iter().map(|site| site.interaction_strength))
            .collect()
    }

    /// Spread between the strongest and weakest absolute coupling.
    pub fn spread(&self) -> f64 {
        let strengths: Vec<f64> = self.sites.iter().map(|s| s.interaction_strength).collect();
        spread_of(&strengths)
    }
}
