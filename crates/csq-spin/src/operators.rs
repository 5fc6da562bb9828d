use csq_core::errors::{CsqError, ErrorInfo};
use nalgebra::DMatrix;

fn linalg_error(code: &str, message: impl Into<String>) -> CsqError {
    CsqError::Linalg(ErrorInfo::new(code, message.into()))
}

/// Local Hilbert space dimension `2s + 1` for spin `s`.
pub fn spin_dim(spin: f64) -> Result<usize, CsqError> {
    let doubled = 2.0 * spin;
    if doubled.is_nan() || doubled < 0.0 || (doubled - doubled.round()).abs() > 1e-9 {
        return Err(CsqError::Linalg(
            ErrorInfo::new("invalid-spin", "spin must be a non-negative multiple of 1/2")
                .with_context("spin", spin.to_string()),
        ));
    }
    Ok(doubled.round() as usize + 1)
}

/// Magnetic quantum numbers `s, s-1, ..., -s` labelling the local basis.
fn magnetic_numbers(spin: f64, dim: usize) -> impl Iterator<Item = f64> {
    (0..dim).map(move |i| spin - i as f64)
}

fn build(spin: f64, element: impl Fn(f64, f64) -> f64) -> Result<DMatrix<f64>, CsqError> {
    let dim = spin_dim(spin)?;
    let ms: Vec<f64> = magnetic_numbers(spin, dim).collect();
    Ok(DMatrix::from_fn(dim, dim, |r, c| element(ms[r], ms[c])))
}

fn same(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-4
}

/// Identity on a single spin-`s` site.
pub fn identity(spin: f64) -> Result<DMatrix<f64>, CsqError> {
    Ok(DMatrix::identity(spin_dim(spin)?, spin_dim(spin)?))
}

/// `S_z` with entries `m` on the diagonal.
pub fn sz(spin: f64) -> Result<DMatrix<f64>, CsqError> {
    build(spin, |row, col| if same(row, col) { col } else { 0.0 })
}

/// Raising operator `S_+`, `<m+1|S_+|m> = sqrt(s(s+1) - m(m+1))`.
pub fn sp(spin: f64) -> Result<DMatrix<f64>, CsqError> {
    build(spin, |row, col| {
        if same(row, col + 1.0) {
            (spin * (spin + 1.0) - col * row).sqrt()
        } else {
            0.0
        }
    })
}

/// Lowering operator `S_-`, the transpose of [`sp`].
pub fn sm(spin: f64) -> Result<DMatrix<f64>, CsqError> {
    build(spin, |row, col| {
        if same(row + 1.0, col) {
            (spin * (spin + 1.0) - col * row).sqrt()
        } else {
            0.0
        }
    })
}

/// Embeds a one-body operator at `slot` of a `sites`-body product space:
/// `I ⊗ ... ⊗ op ⊗ ... ⊗ I`, site 0 being the leftmost factor.
pub fn many_body_operator(
    operator: &DMatrix<f64>,
    slot: usize,
    sites: usize,
) -> Result<DMatrix<f64>, CsqError> {
    if slot >= sites {
        return Err(CsqError::Linalg(
            ErrorInfo::new("slot-out-of-range", "operator slot exceeds the site count")
                .with_context("slot", slot.to_string())
                .with_context("sites", sites.to_string()),
        ));
    }
    if !operator.is_square() {
        return Err(linalg_error("non-square-operator", "one-body operator must be square"));
    }
    let local = DMatrix::<f64>::identity(operator.nrows(), operator.ncols());
    let mut out = DMatrix::<f64>::identity(1, 1);
    for site in 0..sites {
        out = if site == slot {
            out.kronecker(operator)
        } else {
            out.kronecker(&local)
        };
    }
    Ok(out)
}
