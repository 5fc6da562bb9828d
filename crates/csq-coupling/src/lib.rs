#![deny(missing_docs)]
#![doc = "Coupling-strength synthesis for a central spin and its bath: Gaussian profiles, spread curves, lattice geometries and dipolar couplings."]

/// Dipole-dipole couplings and bath site bookkeeping.
pub mod dipolar;
/// Gaussian coefficient synthesis and spread-curve reduction.
pub mod gaussian;
/// Bath lattice geometries.
pub mod geometry;

pub use dipolar::{Bath, BathSite, CouplingModel, Units};
pub use gaussian::{
    b_grid, spread_curve, spread_curve_with, spread_of, synthesize, synthesize_with,
    Normalization, SPREAD_SCALE,
};
pub use geometry::Geometry;
