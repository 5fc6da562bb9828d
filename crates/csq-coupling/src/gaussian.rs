use csq_core::errors::{CsqError, ErrorInfo};
use csq_core::Xy;
use serde::{Deserialize, Serialize};

/// Scale applied to spread values before they are emitted (Hz to kHz).
pub const SPREAD_SCALE: f64 = 1e-3;

/// Index range summed when normalising the Gaussian kernel.
///
/// The two conventions produce different magnitudes and are kept distinct;
/// every caller names the one it uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Normalization {
    /// Sum over the bath sites `j = 1..=N`.
    #[default]
    OneBased,
    /// Sum over `j = 0..N`, including the reference site and excluding site `N`.
    ZeroBased,
}

impl Normalization {
    fn indices(self, bath_count: usize) -> std::ops::Range<usize> {
        match self {
            Normalization::OneBased => 1..bath_count + 1,
            Normalization::ZeroBased => 0..bath_count,
        }
    }
}

/// Gaussian kernel `exp(-(j·B/N)^2)`.
pub fn kernel(j: usize, spread: f64, bath_count: usize) -> f64 {
    let arg = j as f64 * spread / bath_count as f64;
    (-(arg * arg)).exp()
}

fn check_bath_count(bath_count: usize) -> Result<(), CsqError> {
    if bath_count == 0 {
        return Err(CsqError::Coupling(
            ErrorInfo::new("bath-count-zero", "bath count must be at least one")
                .with_context("bathcount", "0"),
        ));
    }
    Ok(())
}

/// Synthesises Gaussian-weighted coupling coefficients using the default
/// [`Normalization::OneBased`] convention.
pub fn synthesize(bath_count: usize, spread: f64, scale: f64) -> Result<Vec<f64>, CsqError> {
    synthesize_with(bath_count, spread, scale, Normalization::default())
}

/// Synthesises `N + 1` coupling coefficients: entry 0 is the reference site
/// and is always zero, entry `j` is `x1 · N · k(j) / Σk`.
pub fn synthesize_with(
    bath_count: usize,
    spread: f64,
    scale: f64,
    normalization: Normalization,
) -> Result<Vec<f64>, CsqError> {
    check_bath_count(bath_count)?;
    let norm: f64 = normalization
        .indices(bath_count)
        .map(|j| kernel(j, spread, bath_count))
        .sum();
    let prefactor = scale * bath_count as f64 / norm;
    let mut coeffs = Vec::with_capacity(bath_count + 1);
    coeffs.push(0.0);
    coeffs.extend((1..=bath_count).map(|j| prefactor * kernel(j, spread, bath_count)));
    Ok(coeffs)
}

/// Difference between the largest and smallest absolute value in `values`.
///
/// Returns zero for an empty slice.
pub fn spread_of(values: &[f64]) -> f64 {
    let mut iter = values.iter().map(|value| value.abs());
    let Some(first) = iter.next() else {
        return 0.0;
    };
    let (min, max) = iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
    max - min
}

/// Reduces the coefficient sequence to its spread for every `B` in
/// `spreads`, using the default normalization.
pub fn spread_curve(bath_count: usize, scale: f64, spreads: &[f64]) -> Result<Vec<Xy>, CsqError> {
    spread_curve_with(bath_count, scale, spreads, Normalization::default())
}

/// Spread curve `(B, (max|A_j| - min|A_j|)·1e-3)` over the bath sites.
pub fn spread_curve_with(
    bath_count: usize,
    scale: f64,
    spreads: &[f64],
    normalization: Normalization,
) -> Result<Vec<Xy>, CsqError> {
    check_bath_count(bath_count)?;
    spreads
        .iter()
        .map(|&spread| {
            let coeffs = synthesize_with(bath_count, spread, scale, normalization)?;
            Ok(Xy::new(spread, spread_of(&coeffs[1..]) * SPREAD_SCALE))
        })
        .collect()
}

/// Half-open arithmetic grid `start, start + step, ...` below `stop`.
pub fn b_grid(start: f64, stop: f64, step: f64) -> Result<Vec<f64>, CsqError> {
    if !step.is_finite() || step <= 0.0 {
        return Err(CsqError::Coupling(
            ErrorInfo::new("grid-step", "grid step must be positive and finite")
                .with_context("step", step.to_string()),
        ));
    }
    if !start.is_finite() || !stop.is_finite() || stop <= start {
        return Ok(Vec::new());
    }
    let count = ((stop - start) / step).ceil() as usize;
    Ok((0..count)
        .map(|i| start + i as f64 * step)
        .filter(|&value| value < stop)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_case_zero_based() {
        let coeffs = synthesize_with(11, 0.4, 2.0, Normalization::ZeroBased).unwrap();
        let expected = [
            0.0,
            2.0900180409799605,
            2.081743483518041,
            2.068025289611682,
            2.0489715559522352,
            2.024731624768968,
            1.9954941347254727,
            1.961484576667773,
            1.9229623985192257,
            1.8802177113004983,
            1.833567654737686,
            1.783352486074295,
        ];
        assert_eq!(coeffs.len(), expected.len());
        for (got, want) in coeffs.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
        assert!(coeffs[1..].windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn reference_case_one_based() {
        let coeffs = synthesize(11, 0.4, 2.0).unwrap();
        assert!((coeffs[1] - 2.1198336010926027).abs() < 1e-12);
        assert!((coeffs[11] - 1.808793248884958).abs() < 1e-12);
    }

    #[test]
    fn zero_bath_is_rejected() {
        let err = synthesize(0, 0.4, 2.0).unwrap_err();
        assert_eq!(err.info().code, "bath-count-zero");
        assert!(spread_curve(0, 1.0, &[0.1]).is_err());
    }

    #[test]
    fn grid_matches_half_open_range() {
        let grid = b_grid(0.0, 1.5, 1e-3).unwrap();
        assert_eq!(grid.len(), 1500);
        assert_eq!(grid[0], 0.0);
        assert!(*grid.last().unwrap() < 1.5);
        assert!(b_grid(0.0, 1.0, 0.0).is_err());
        assert!(b_grid(1.0, 0.0, 0.1).unwrap().is_empty());
    }

    #[test]
    fn spread_of_handles_signs_and_empty() {
        assert_eq!(spread_of(&[]), 0.0);
        assert_eq!(spread_of(&[-3.0, 1.0, 2.0]), 2.0);
    }
}
