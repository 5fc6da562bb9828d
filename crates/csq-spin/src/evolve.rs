use csq_core::errors::{CsqError, ErrorInfo};
use nalgebra::{Complex, DMatrix, DVector};

use crate::basis::SiteBasis;
use crate::eigen::Eigen;

fn dimension_error(what: &str, expected: usize, actual: usize) -> CsqError {
    CsqError::Linalg(
        ErrorInfo::new("dimension-mismatch", format!("{what} does not match the basis"))
            .with_context("expected", expected.to_string())
            .with_context("actual", actual.to_string()),
    )
}

/// Real Hermitian operator whose expectation value is tracked in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Observable {
    matrix: DMatrix<f64>,
}

impl Observable {
    /// Wraps an operator already expressed in the evolution basis.
    pub fn new(matrix: DMatrix<f64>) -> Self {
        Self { matrix }
    }

    /// One-body operator acting on `slot`, expressed in `basis`.
    pub fn at_slot(
        operator: &DMatrix<f64>,
        slot: usize,
        basis: &SiteBasis,
    ) -> Result<Self, CsqError> {
        Ok(Self::new(basis.embed(operator, slot)?))
    }

    /// Borrow the operator matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// `Re(ψ† O ψ)`.
    pub fn expectation(&self, state: &DVector<Complex<f64>>) -> Result<f64, CsqError> {
        if state.len() != self.matrix.ncols() {
            return Err(dimension_error("state", self.matrix.ncols(), state.len()));
        }
        let re: DVector<f64> = state.map(|c| c.re);
        let im: DVector<f64> = state.map(|c| c.im);
        // Real part of (a - ib)ᵀ O (a + ib).
        Ok(re.dot(&(&self.matrix * &re)) + im.dot(&(&self.matrix * &im)))
    }
}

/// Initial state expanded in an eigenbasis, ready to be propagated.
#[derive(Debug, Clone)]
pub struct Evolution<'a> {
    eigen: &'a Eigen,
    overlaps: DVector<f64>,
}

impl<'a> Evolution<'a> {
    /// Computes `⟨E_j|ψ0⟩` for every eigenvector.
    pub fn new(eigen: &'a Eigen, initial: &DVector<f64>) -> Result<Self, CsqError> {
        if initial.len() != eigen.dim() {
            return Err(dimension_error("initial state", eigen.dim(), initial.len()));
        }
        Ok(Self {
            eigen,
            overlaps: eigen.vectors.tr_mul(initial),
        })
    }

    /// Overlaps of the initial state with each eigenvector.
    pub fn overlaps(&self) -> &DVector<f64> {
        &self.overlaps
    }

    /// `ψ(t) = Σ_j e^{-iE_j t} ⟨E_j|ψ0⟩ |E_j⟩`.
    pub fn state_at(&self, time: f64) -> DVector<Complex<f64>> {
        let phase_re = DVector::from_iterator(
            self.overlaps.len(),
            self.overlaps
                .iter()
                .zip(&self.eigen.values)
                .map(|(c, energy)| c * (energy * time).cos()),
        );
        let phase_im = DVector::from_iterator(
            self.overlaps.len(),
            self.overlaps
                .iter()
                .zip(&self.eigen.values)
                .map(|(c, energy)| -c * (energy * time).sin()),
        );
        let re = &self.eigen.vectors * phase_re;
        let im = &self.eigen.vectors * phase_im;
        re.zip_map(&im, Complex::new)
    }
}

/// Evolves `initial` to time `t` in the eigenbasis of `eigen`.
pub fn evolve(
    initial: &DVector<f64>,
    time: f64,
    eigen: &Eigen,
) -> Result<DVector<Complex<f64>>, CsqError> {
    Ok(Evolution::new(eigen, initial)?.state_at(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basis::many_body_ket;
    use crate::eigen::diagonalize;
    use crate::hamiltonian::XxHamiltonian;
    use crate::operators::sz;

    fn two_site() -> (Eigen, SiteBasis) {
        let ham = XxHamiltonian::new(vec![0.0, 1.0], 0.2, 0.1, 0.5);
        let basis = ham.full_basis().unwrap();
        (diagonalize(&ham.matrix(&basis).unwrap()).unwrap(), basis)
    }

    #[test]
    fn time_zero_returns_initial_state() {
        let (eigen, _) = two_site();
        let initial = many_body_ket("dp").unwrap();
        let state = evolve(&initial, 0.0, &eigen).unwrap();
        for (got, want) in state.iter().zip(initial.iter()) {
            assert!((got.re - want).abs() < 1e-12);
            assert!(got.im.abs() < 1e-12);
        }
    }

    #[test]
    fn norm_is_preserved() {
        let (eigen, _) = two_site();
        let evolution = Evolution::new(&eigen, &many_body_ket("du").unwrap()).unwrap();
        for step in 0..20 {
            let norm: f64 = evolution.state_at(step as f64 * 0.37).iter().map(|c| c.norm_sqr()).sum();
            assert!((norm - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn central_spin_flips_under_resonant_exchange() {
        let ham = XxHamiltonian::new(vec![0.0, 1.0], 0.0, 0.0, 0.5);
        let basis = ham.full_basis().unwrap();
        let eigen = diagonalize(&ham.matrix(&basis).unwrap()).unwrap();
        let observable = Observable::at_slot(&sz(0.5).unwrap(), 0, &basis).unwrap();
        let evolution = Evolution::new(&eigen, &many_body_ket("du").unwrap()).unwrap();
        let start = observable.expectation(&evolution.state_at(0.0)).unwrap();
        let half_period = observable
            .expectation(&evolution.state_at(std::f64::consts::FRAC_PI_2))
            .unwrap();
        assert!((start + 0.5).abs() < 1e-10);
        assert!((half_period - 0.5).abs() < 1e-10);
    }

    #[test]
    fn mismatched_state_is_an_error() {
        let (eigen, _) = two_site();
        assert!(evolve(&DVector::zeros(3), 1.0, &eigen).is_err());
        let observable = Observable::new(DMatrix::identity(4, 4));
        assert!(observable.expectation(&DVector::zeros(2)).is_err());
    }
}
