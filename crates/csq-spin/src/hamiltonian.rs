use csq_core::errors::{CsqError, ErrorInfo};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::basis::{restrict_to_subspace, SiteBasis};
use crate::operators::{sm, sp, spin_dim, sz};

const SYMMETRY_TOLERANCE: f64 = 1e-8;

/// XX central-spin Hamiltonian
/// `H = Σ_j C_j (S+_0 S-_j + S-_0 S+_j) + b0 Sz_0 + b Σ_j Sz_j`.
///
/// `couplings[0]` belongs to the central spin and never enters `H`; the
/// length of `couplings` is the total site count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct XxHamiltonian {
    /// Coupling of each site to the central spin, central entry first.
    pub couplings: Vec<f64>,
    /// Field `b0` acting on the central spin.
    pub central_field: f64,
    /// Field `b` acting on every bath site.
    pub bath_field: f64,
    /// Spin carried by every site.
    pub spin: f64,
}

impl XxHamiltonian {
    /// Bundles couplings, fields and spin.
    pub fn new(couplings: Vec<f64>, central_field: f64, bath_field: f64, spin: f64) -> Self {
        Self {
            couplings,
            central_field,
            bath_field,
            spin,
        }
    }

    /// Number of sites including the central spin.
    pub fn sites(&self) -> usize {
        self.couplings.len()
    }

    /// Local dimension `2s + 1` of every site.
    pub fn local_dim(&self) -> Result<usize, CsqError> {
        spin_dim(self.spin)
    }

    /// Basis spanning every product state.
    pub fn full_basis(&self) -> Result<SiteBasis, CsqError> {
        SiteBasis::full(self.local_dim()?, self.sites())
    }

    /// Basis of states with `down` lowering quanta, which `H` leaves invariant.
    pub fn fixed_down_basis(&self, down: usize) -> Result<SiteBasis, CsqError> {
        SiteBasis::fixed_down(self.local_dim()?, self.sites(), down)
    }

    /// Matrix of `H` in the full product basis.
    pub fn build(&self) -> Result<DMatrix<f64>, CsqError> {
        self.matrix(&self.full_basis()?)
    }

    /// Full matrix restricted to the listed product-basis indices.
    pub fn build_in_subspace(&self, indices: &[usize]) -> Result<DMatrix<f64>, CsqError> {
        check_subspace(indices.len())?;
        restrict_to_subspace(&self.build()?, indices)
    }

    /// Matrix of `H` expressed directly in `basis`.
    pub fn matrix(&self, basis: &SiteBasis) -> Result<DMatrix<f64>, CsqError> {
        if self.sites() == 0 {
            return Err(CsqError::Linalg(ErrorInfo::new(
                "no-sites",
                "hamiltonian needs at least the central spin",
            )));
        }
        if basis.sites() != self.sites() {
            return Err(CsqError::Linalg(
                ErrorInfo::new("basis-mismatch", "basis and hamiltonian disagree on site count")
                    .with_context("basis", basis.sites().to_string())
                    .with_context("hamiltonian", self.sites().to_string()),
            ));
        }
        if !basis.is_full() {
            check_subspace(basis.len())?;
        }
        debug!(sites = self.sites(), dim = basis.len(), "building xx hamiltonian");

        let (raise, lower, z) = (sp(self.spin)?, sm(self.spin)?, sz(self.spin)?);
        let mut h = basis.embed(&z, 0)? * self.central_field;
        for (slot, &coupling) in self.couplings.iter().enumerate().skip(1) {
            h += basis.embed(&z, slot)? * self.bath_field;
            if coupling == 0.0 {
                continue;
            }
            let flip = basis.embed_pair(&raise, 0, &lower, slot)?
                + basis.embed_pair(&lower, 0, &raise, slot)?;
            h += flip * coupling;
        }

        if let Some(entry) = h.iter().find(|v| !v.is_finite()) {
            return Err(CsqError::Linalg(
                ErrorInfo::new("non-finite-hamiltonian", "hamiltonian has non-finite entries")
                    .with_context("entry", entry.to_string())
                    .with_context("couplings", format!("{:?}", self.couplings))
                    .with_hint("check the bath distance and dipole moments"),
            ));
        }
        let asymmetry = (&h - h.transpose()).amax();
        if asymmetry > SYMMETRY_TOLERANCE {
            return Err(CsqError::Linalg(
                ErrorInfo::new("asymmetric-hamiltonian", "hamiltonian is not symmetric")
                    .with_context("max_deviation", asymmetry.to_string()),
            ));
        }
        Ok(h)
    }
}

fn check_subspace(dim: usize) -> Result<(), CsqError> {
    if dim < 2 {
        return Err(CsqError::Linalg(
            ErrorInfo::new("degenerate-subspace", "subspace must keep at least two states")
                .with_context("dim", dim.to_string())
                .with_hint("the initial ket pins every spin; add an up spin or drop the restriction"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::basis_indices;
    use nalgebra::DVector;

    #[test]
    fn magnetic_term_for_single_bath_site() {
        let h = XxHamiltonian::new(vec![0.0, 0.0], 1.0, 3.0, 0.5).build().unwrap();
        let expected = DMatrix::from_diagonal(&DVector::from_vec(vec![2.0, -1.0, 1.0, -2.0]));
        assert_eq!(h, expected);
    }

    #[test]
    fn flip_flop_connects_ud_and_du() {
        let h = XxHamiltonian::new(vec![0.0, 0.7], 0.0, 0.0, 0.5).build().unwrap();
        assert_eq!(h[(1, 2)], 0.7);
        assert_eq!(h[(2, 1)], 0.7);
        assert_eq!(h[(0, 3)], 0.0);
        assert_eq!(h.trace(), 0.0);
    }

    #[test]
    fn subspace_matrix_matches_restricted_full_matrix() {
        let ham = XxHamiltonian::new(vec![0.0, 0.3, -1.2, 0.8], 0.4, 1.1, 0.5);
        let direct = ham.matrix(&ham.fixed_down_basis(1).unwrap()).unwrap();
        let restricted = ham.build_in_subspace(&basis_indices(4, 1)).unwrap();
        assert!((direct - restricted).amax() < 1e-12);
    }

    #[test]
    fn pinned_subspace_is_rejected() {
        let ham = XxHamiltonian::new(vec![0.0, 0.3], 0.0, 0.0, 0.5);
        let err = ham.build_in_subspace(&[0]).unwrap_err();
        assert_eq!(err.info().code, "degenerate-subspace");
        assert!(ham.matrix(&ham.fixed_down_basis(0).unwrap()).is_err());
    }

    #[test]
    fn infinite_coupling_is_rejected() {
        let ham = XxHamiltonian::new(vec![0.0, f64::INFINITY, 1.0], 1.0, 1.0, 0.5);
        let err = ham.build().unwrap_err();
        assert_eq!(err.info().code, "non-finite-hamiltonian");
        let nan_field = XxHamiltonian::new(vec![0.0, 1.0], f64::NAN, 0.0, 0.5);
        assert!(nan_field.matrix(&nan_field.fixed_down_basis(1).unwrap()).is_err());
    }

    #[test]
    fn spin_one_sites_are_supported() {
        let ham = XxHamiltonian::new(vec![0.0, 1.0], 0.5, 0.5, 1.0);
        let h = ham.build().unwrap();
        assert_eq!(h.nrows(), 9);
        assert!((&h - h.transpose()).amax() < 1e-12);
    }
}
