//! Diagonal (Jacobi) preconditioner
//!
//! Simple preconditioner that scales by the inverse diagonal of A.
//! It only involves element-wise operations.

use crate::kernels;
use crate::sparse::ComputeMatrix;
use crate::traits::Preconditioner;
use ndarray::Array1;

/// Diagonal (Jacobi) preconditioner
///
/// M = diag(A)^(-1); rows with a vanishing diagonal are passed through.
#[derive(Debug, Clone)]
pub struct DiagonalPreconditioner {
    /// Inverse diagonal elements
    inv_diag: Vec<f64>,
}

impl DiagonalPreconditioner {
    /// Create a diagonal preconditioner from a prepared matrix
    pub fn from_matrix(matrix: &ComputeMatrix) -> Self {
        Self::from_diagonal(matrix.diagonal())
    }

    /// Create from a diagonal vector directly
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let inv_diag = diag
            .iter()
            .map(|&d| if d.abs() > 1e-30 { 1.0 / d } else { 1.0 })
            .collect();
        Self { inv_diag }
    }

    /// Inverse diagonal, as uploaded to a device
    pub fn inverse_diagonal(&self) -> &[f64] {
        &self.inv_diag
    }
}

impl Preconditioner for DiagonalPreconditioner {
    fn apply(&self, r: &Array1<f64>) -> Array1<f64> {
        let mut z = vec![0.0; r.len()];
        self.apply_into(&r.to_vec(), &mut z);
        Array1::from_vec(z)
    }

    fn apply_into(&self, r: &[f64], z: &mut [f64]) {
        kernels::pointwise_mul(&self.inv_diag, r, z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_preconditioner() {
        let precond = DiagonalPreconditioner::from_diagonal(&[2.0, 4.0, 1.0]);
        let result = precond.apply(&array![2.0, 8.0, 3.0]);

        assert_relative_eq!(result[0], 1.0, epsilon = 1e-10);
        assert_relative_eq!(result[1], 2.0, epsilon = 1e-10);
        assert_relative_eq!(result[2], 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_zero_diagonal_passes_through() {
        let precond = DiagonalPreconditioner::from_diagonal(&[0.0, 4.0]);
        assert_eq!(precond.inverse_diagonal(), &[1.0, 0.25]);
    }
}
