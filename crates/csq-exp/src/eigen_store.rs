use std::path::Path;

use csq_core::errors::CsqError;
use csq_spin::Eigen;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::results::SystemRecord;
use crate::serde::{read_yaml, write_yaml};

/// On-disk eigen solution; `evectors` is the eigenvector matrix in row-major
/// order with eigenvectors as columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct EigenRecord {
    /// System the Hamiltonian was built from.
    pub system: SystemRecord,
    /// Eigenvalues, ascending.
    pub evalues: Vec<f64>,
    /// Row-major eigenvector matrix.
    pub evectors: Vec<f64>,
}

impl EigenRecord {
    /// Captures a decomposition together with its system.
    pub fn new(eigen: &Eigen, system: SystemRecord) -> Self {
        Self {
            system,
            evalues: eigen.values.clone(),
            evectors: eigen.vectors_row_major(),
        }
    }

    /// Rebuilds the decomposition.
    pub fn into_eigen(self) -> Result<Eigen, CsqError> {
        Eigen::from_row_major(self.evalues, &self.evectors)
    }
}

/// Writes an eigen solution to `path`.
pub fn save_eigen(path: &Path, eigen: &Eigen, system: SystemRecord) -> Result<(), CsqError> {
    write_yaml(path, &EigenRecord::new(eigen, system))?;
    info!(path = %path.display(), dim = eigen.dim(), "eigen solution saved");
    Ok(())
}

/// Loads an eigen solution written by [`save_eigen`].
pub fn load_eigen(path: &Path) -> Result<Eigen, CsqError> {
    info!(path = %path.display(), "loading eigen solution");
    read_yaml::<EigenRecord>(path)?.into_eigen()
}
