//! Core traits for linear algebra operations
//!
//! This module defines the abstractions the Krylov solvers are written against:
//! - [`LinearOperator`]: matrix-like objects that can perform matrix-vector products
//! - [`Preconditioner`]: approximate inverses applied once per solver step
//!
//! All systems assembled on rectangular meshes are real, so the traits are
//! specialised to `f64`.

use ndarray::Array1;

/// Trait for linear operators (matrices) that can perform matrix-vector products.
///
/// Implemented by both storage formats and by the device-ready
/// [`ComputeMatrix`](crate::sparse::ComputeMatrix), so the host solvers accept any of them.
pub trait LinearOperator: Send + Sync {
    /// Number of rows in the operator
    fn num_rows(&self) -> usize;

    /// Number of columns in the operator
    fn num_cols(&self) -> usize;

    /// Apply the operator: y = A * x
    fn apply(&self, x: &Array1<f64>) -> Array1<f64>;

    /// Apply the operator into a preallocated slice: y = A * x
    ///
    /// The Krylov solvers call this in their inner loop. Storage formats
    /// override it to run their matvec kernel without allocating.
    fn apply_into(&self, x: &[f64], y: &mut [f64]) {
        let result = self.apply(&Array1::from_vec(x.to_vec()));
        for (yi, ri) in y.iter_mut().zip(result.iter()) {
            *yi = *ri;
        }
    }

    /// Check if the operator is square
    fn is_square(&self) -> bool {
        self.num_rows() == self.num_cols()
    }
}

/// Trait for preconditioners used in iterative solvers.
///
/// A preconditioner M approximates A^(-1), so that M*A is better conditioned
/// than A alone. This accelerates convergence of iterative methods.
pub trait Preconditioner: Send + Sync {
    /// Apply the preconditioner: y = M * r
    ///
    /// This should approximate solving A * y = r
    fn apply(&self, r: &Array1<f64>) -> Array1<f64>;

    /// Apply the preconditioner into a preallocated slice: z = M * r
    fn apply_into(&self, r: &[f64], z: &mut [f64]) {
        let result = self.apply(&Array1::from_vec(r.to_vec()));
        for (zi, ri) in z.iter_mut().zip(result.iter()) {
            *zi = *ri;
        }
    }
}

/// Identity preconditioner (no preconditioning)
#[derive(Clone, Debug, Default)]
pub struct IdentityPreconditioner;

impl Preconditioner for IdentityPreconditioner {
    fn apply(&self, r: &Array1<f64>) -> Array1<f64> {
        r.clone()
    }

    fn apply_into(&self, r: &[f64], z: &mut [f64]) {
        z.copy_from_slice(r);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_preconditioner() {
        let precond = IdentityPreconditioner;
        let r = Array1::from_vec(vec![1.0, -2.0, 3.5]);
        let y = precond.apply(&r);
        assert_eq!(r, y);
    }
}
