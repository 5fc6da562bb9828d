use std::cmp::Ordering;

use csq_core::errors::{CsqError, ErrorInfo};
use nalgebra::{DMatrix, SymmetricEigen};
use tracing::{debug, warn};

/// Largest tolerated `‖Hv - λv‖` before a warning is logged.
pub const RESIDUAL_TOLERANCE: f64 = 1e-8;

/// Eigen decomposition of a real symmetric matrix, eigenvalues ascending and
/// eigenvectors stored as the matching columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Eigen {
    /// Eigenvalues in ascending order.
    pub values: Vec<f64>,
    /// Column `j` is the normalised eigenvector of `values[j]`.
    pub vectors: DMatrix<f64>,
}

impl Eigen {
    /// Dimension of the diagonalised space.
    pub fn dim(&self) -> usize {
        self.values.len()
    }

    /// Eigenvector matrix flattened row by row.
    pub fn vectors_row_major(&self) -> Vec<f64> {
        self.vectors.transpose().iter().copied().collect()
    }

    /// Rebuilds a decomposition from eigenvalues and a row-major eigenvector
    /// matrix, the layout used on disk.
    pub fn from_row_major(values: Vec<f64>, vectors: &[f64]) -> Result<Self, CsqError> {
        let dim = values.len();
        if vectors.len() != dim * dim {
            return Err(CsqError::Linalg(
                ErrorInfo::new("eigen-shape", "eigenvector data does not form a square matrix")
                    .with_context("values", dim.to_string())
                    .with_context("entries", vectors.len().to_string()),
            ));
        }
        Ok(Self {
            values,
            vectors: DMatrix::from_row_slice(dim, dim, vectors),
        })
    }

    /// Largest `‖Hv_j - λ_j v_j‖` over all eigenpairs.
    pub fn max_residual(&self, matrix: &DMatrix<f64>) -> f64 {
        self.values
            .iter()
            .enumerate()
            .map(|(j, &value)| {
                let column = self.vectors.column(j);
                (matrix * column - column * value).norm()
            })
            .fold(0.0, f64::max)
    }
}

/// Diagonalises a symmetric matrix and checks every eigenpair.
pub fn diagonalize(matrix: &DMatrix<f64>) -> Result<Eigen, CsqError> {
    if !matrix.is_square() || matrix.nrows() == 0 {
        return Err(CsqError::Linalg(
            ErrorInfo::new("not-square", "only non-empty square matrices can be diagonalised")
                .with_context("rows", matrix.nrows().to_string())
                .with_context("cols", matrix.ncols().to_string()),
        ));
    }
    debug!(dim = matrix.nrows(), "diagonalizing");
    let decomposition = SymmetricEigen::new(matrix.clone());
    let mut order: Vec<usize> = (0..matrix.nrows()).collect();
    order.sort_by(|&a, &b| {
        decomposition.eigenvalues[a]
            .partial_cmp(&decomposition.eigenvalues[b])
            .unwrap_or(Ordering::Equal)
    });
    let values = order.iter().map(|&i| decomposition.eigenvalues[i]).collect();
    let columns: Vec<_> = order
        .iter()
        .map(|&i| decomposition.eigenvectors.column(i).into_owned())
        .collect();
    let eigen = Eigen {
        values,
        vectors: DMatrix::from_columns(&columns),
    };

    let residual = eigen.max_residual(matrix);
    if residual > RESIDUAL_TOLERANCE {
        warn!(residual, "eigenpairs do not satisfy H v = λ v");
    }
    Ok(eigen)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_are_sorted_and_pairs_hold() {
        let matrix = DMatrix::from_row_slice(3, 3, &[2.0, 1.0, 0.0, 1.0, 2.0, 0.0, 0.0, 0.0, -4.0]);
        let eigen = diagonalize(&matrix).unwrap();
        let expected = [-4.0, 1.0, 3.0];
        for (got, want) in eigen.values.iter().zip(expected) {
            assert!((got - want).abs() < 1e-10);
        }
        assert!(eigen.max_residual(&matrix) < 1e-10);
    }

    #[test]
    fn row_major_layout_restores_vectors() {
        let matrix = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 1.0, 0.0]);
        let eigen = diagonalize(&matrix).unwrap();
        let restored =
            Eigen::from_row_major(eigen.values.clone(), &eigen.vectors_row_major()).unwrap();
        assert_eq!(restored, eigen);
        assert!(Eigen::from_row_major(vec![1.0], &[1.0, 0.0]).is_err());
    }

    #[test]
    fn rejects_rectangular_input() {
        let err = diagonalize(&DMatrix::zeros(2, 3)).unwrap_err();
        assert_eq!(err.info().code, "not-square");
    }
}
