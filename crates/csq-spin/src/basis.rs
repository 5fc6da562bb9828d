use std::collections::HashMap;
use std::f64::consts::FRAC_1_SQRT_2;

use csq_core::errors::{CsqError, ErrorInfo};
use nalgebra::{DMatrix, DVector};

/// Product basis of `sites` spins with `local_dim` levels each, optionally
/// restricted to states with a fixed number of lowering quanta.
///
/// A state index is the mixed-radix number whose most significant digit is
/// site 0; digit `k` counts how far site `k` sits below its top level (for
/// spin 1/2: `0 = up`, `1 = down`).
#[derive(Debug, Clone, PartialEq)]
pub struct SiteBasis {
    local_dim: usize,
    sites: usize,
    states: Vec<usize>,
    position: HashMap<usize, usize>,
}

impl SiteBasis {
    /// Complete product basis.
    pub fn full(local_dim: usize, sites: usize) -> Result<Self, CsqError> {
        let size = full_size(local_dim, sites)?;
        Ok(Self::from_states(local_dim, sites, (0..size).collect()))
    }

    /// Subspace with exactly `down` lowering quanta in total, which for
    /// spin 1/2 is the number of down spins.
    pub fn fixed_down(local_dim: usize, sites: usize, down: usize) -> Result<Self, CsqError> {
        let size = full_size(local_dim, sites)?;
        let states = (0..size)
            .filter(|&index| digit_sum(index, local_dim) == down)
            .collect();
        Ok(Self::from_states(local_dim, sites, states))
    }

    fn from_states(local_dim: usize, sites: usize, states: Vec<usize>) -> Self {
        let position = states.iter().enumerate().map(|(pos, &state)| (state, pos)).collect();
        Self {
            local_dim,
            sites,
            states,
            position,
        }
    }

    /// Number of basis states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` when no state satisfies the restriction.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Number of sites in the product space.
    pub fn sites(&self) -> usize {
        self.sites
    }

    /// Indices of the retained states within the full product basis.
    pub fn indices(&self) -> &[usize] {
        &self.states
    }

    /// Returns `true` when every product state is retained.
    pub fn is_full(&self) -> bool {
        full_size(self.local_dim, self.sites).map_or(false, |size| size == self.states.len())
    }

    fn stride(&self, slot: usize) -> usize {
        self.local_dim.pow((self.sites - 1 - slot) as u32)
    }

    fn digit(&self, state: usize, slot: usize) -> usize {
        (state / self.stride(slot)) % self.local_dim
    }

    fn check_operator(&self, operator: &DMatrix<f64>, slot: usize) -> Result<(), CsqError> {
        if slot >= self.sites {
            return Err(CsqError::Linalg(
                ErrorInfo::new("slot-out-of-range", "operator slot exceeds the site count")
                    .with_context("slot", slot.to_string())
                    .with_context("sites", self.sites.to_string()),
            ));
        }
        if operator.nrows() != self.local_dim || operator.ncols() != self.local_dim {
            return Err(CsqError::Linalg(
                ErrorInfo::new("operator-dimension", "operator does not match the local dimension")
                    .with_context("expected", self.local_dim.to_string())
                    .with_context("rows", operator.nrows().to_string()),
            ));
        }
        Ok(())
    }

    /// Matrix of a one-body operator acting on `slot`, expressed in this
    /// basis. Transitions leaving the subspace are dropped.
    pub fn embed(&self, operator: &DMatrix<f64>, slot: usize) -> Result<DMatrix<f64>, CsqError> {
        self.check_operator(operator, slot)?;
        let stride = self.stride(slot);
        let mut out = DMatrix::zeros(self.len(), self.len());
        for (col, &state) in self.states.iter().enumerate() {
            let digit = self.digit(state, slot);
            let base = state - digit * stride;
            for row_digit in 0..self.local_dim {
                let value = operator[(row_digit, digit)];
                if value == 0.0 {
                    continue;
                }
                if let Some(&row) = self.position.get(&(base + row_digit * stride)) {
                    out[(row, col)] += value;
                }
            }
        }
        Ok(out)
    }

    /// Matrix of the product `a_slot_a · b_slot_b` for two distinct slots.
    pub fn embed_pair(
        &self,
        a: &DMatrix<f64>,
        slot_a: usize,
        b: &DMatrix<f64>,
        slot_b: usize,
    ) -> Result<DMatrix<f64>, CsqError> {
        self.check_operator(a, slot_a)?;
        self.check_operator(b, slot_b)?;
        if slot_a == slot_b {
            return Ok(self.embed(a, slot_a)? * self.embed(b, slot_b)?);
        }
        let (stride_a, stride_b) = (self.stride(slot_a), self.stride(slot_b));
        let mut out = DMatrix::zeros(self.len(), self.len());
        for (col, &state) in self.states.iter().enumerate() {
            let (da, db) = (self.digit(state, slot_a), self.digit(state, slot_b));
            let base = state - da * stride_a - db * stride_b;
            for ra in 0..self.local_dim {
                let va = a[(ra, da)];
                if va == 0.0 {
                    continue;
                }
                for rb in 0..self.local_dim {
                    let vb = b[(rb, db)];
                    if vb == 0.0 {
                        continue;
                    }
                    let target = base + ra * stride_a + rb * stride_b;
                    if let Some(&row) = self.position.get(&target) {
                        out[(row, col)] += va * vb;
                    }
                }
            }
        }
        Ok(out)
    }

    /// Picks this basis' components out of a full product-space vector.
    pub fn restrict_vector(&self, full: &DVector<f64>) -> Result<DVector<f64>, CsqError> {
        let size = full_size(self.local_dim, self.sites)?;
        if full.len() != size {
            return Err(CsqError::Linalg(
                ErrorInfo::new("vector-dimension", "vector does not span the full product space")
                    .with_context("expected", size.to_string())
                    .with_context("actual", full.len().to_string()),
            ));
        }
        Ok(DVector::from_iterator(
            self.len(),
            self.states.iter().map(|&index| full[index]),
        ))
    }
}

fn full_size(local_dim: usize, sites: usize) -> Result<usize, CsqError> {
    u32::try_from(sites)
        .ok()
        .and_then(|sites| local_dim.checked_pow(sites))
        .filter(|&size| size > 0)
        .ok_or_else(|| {
            CsqError::Linalg(
                ErrorInfo::new("basis-too-large", "product space dimension overflows")
                    .with_context("local_dim", local_dim.to_string())
                    .with_context("sites", sites.to_string()),
            )
        })
}

fn digit_sum(mut index: usize, local_dim: usize) -> usize {
    let mut sum = 0;
    while index > 0 {
        sum += index % local_dim;
        index /= local_dim;
    }
    sum
}

/// Number of `d` characters in a ket string.
pub fn down_spins(ket: &str) -> usize {
    ket.chars().filter(|&c| c == 'd').count()
}

/// Full product basis indices with exactly `down` down spins among
/// `sites` spin-1/2 sites, in ascending order.
pub fn basis_indices(sites: usize, down: usize) -> Vec<usize> {
    (0..1usize << sites)
        .filter(|index| index.count_ones() as usize == down)
        .collect()
}

/// Keeps the rows and columns of `matrix` listed in `indices`.
pub fn restrict_to_subspace(
    matrix: &DMatrix<f64>,
    indices: &[usize],
) -> Result<DMatrix<f64>, CsqError> {
    if let Some(&bad) = indices.iter().find(|&&i| i >= matrix.nrows() || i >= matrix.ncols()) {
        return Err(CsqError::Linalg(
            ErrorInfo::new("index-out-of-range", "subspace index exceeds the matrix dimension")
                .with_context("index", bad.to_string()),
        ));
    }
    let dim = indices.len();
    Ok(DMatrix::from_fn(dim, dim, |r, c| matrix[(indices[r], indices[c])]))
}

/// Product state of spin-1/2 sites described by one character per site:
/// `u` (up), `d` (down), `p` ((u+d)/√2) and `m` ((u-d)/√2).
pub fn many_body_ket(ket: &str) -> Result<DVector<f64>, CsqError> {
    let mut out = DVector::from_element(1, 1.0);
    for (position, symbol) in ket.chars().enumerate() {
        let local = match symbol {
            'u' => DVector::from_vec(vec![1.0, 0.0]),
            'd' => DVector::from_vec(vec![0.0, 1.0]),
            'p' => DVector::from_vec(vec![FRAC_1_SQRT_2, FRAC_1_SQRT_2]),
            'm' => DVector::from_vec(vec![FRAC_1_SQRT_2, -FRAC_1_SQRT_2]),
            other => {
                return Err(CsqError::Linalg(
                    ErrorInfo::new("ket-symbol", "unknown single-site state")
                        .with_context("symbol", other.to_string())
                        .with_context("position", position.to_string())
                        .with_hint("use one of u, d, p, m"),
                ))
            }
        };
        out = out.kronecker(&local);
    }
    Ok(out)
}
