#![deny(missing_docs)]
#![doc = "Spin operators, XX central-spin Hamiltonians, exact diagonalisation and unitary time evolution."]

/// Product bases, subspace restriction and product kets.
pub mod basis;
/// Symmetric eigen decomposition with residual checks.
pub mod eigen;
/// Unitary evolution in an eigenbasis and observable expectations.
pub mod evolve;
/// The XX central-spin Hamiltonian.
pub mod hamiltonian;
/// Single-site spin operators and their many-body embedding.
pub mod operators;

pub use basis::{
    basis_indices, down_spins, many_body_ket, restrict_to_subspace, SiteBasis,
};
pub use eigen::{diagonalize, Eigen, RESIDUAL_TOLERANCE};
pub use evolve::{evolve, Evolution, Observable};
pub use hamiltonian::XxHamiltonian;
pub use nalgebra::{Complex, DMatrix, DVector};
pub use operators::{identity, many_body_operator, sm, sp, spin_dim, sz};
