//! ILU(0) triangular-solve preconditioner
//!
//! Incomplete LU factorization with no fill-in outside the stored pattern.
//! The factors are kept in the same flat layout as the system matrix, so
//! applying them is one forward and one backward sweep over the bands
//! (or rows) with the kernels every solver path shares.

use crate::sparse::ComputeMatrix;
use crate::traits::Preconditioner;
use ndarray::Array1;

/// ILU(0) preconditioner
#[derive(Debug, Clone)]
pub struct IluPreconditioner {
    /// Packed factors: unit lower L below the diagonal, U on and above it
    factors: ComputeMatrix,
}

impl IluPreconditioner {
    /// Factorize a prepared matrix
    pub fn from_matrix(matrix: &ComputeMatrix) -> Self {
        Self {
            factors: matrix.ilu0(),
        }
    }

    /// Wrap factors computed elsewhere
    pub fn from_factors(factors: ComputeMatrix) -> Self {
        Self { factors }
    }

    /// Packed factors, as uploaded to a device
    pub fn factors(&self) -> &ComputeMatrix {
        &self.factors
    }
}

impl Preconditioner for IluPreconditioner {
    fn apply(&self, r: &Array1<f64>) -> Array1<f64> {
        let mut z = vec![0.0; r.len()];
        self.apply_into(&r.to_vec(), &mut z);
        Array1::from_vec(z)
    }

    fn apply_into(&self, r: &[f64], z: &mut [f64]) {
        z.copy_from_slice(r);
        let view = self.factors.view();
        view.forward_solve(z);
        view.backward_solve(z);
    }
}
