//! Preconditioners for iterative solvers
//!
//! Preconditioners approximate A^(-1) to accelerate convergence of iterative methods.
//!
//! # Available Preconditioners
//!
//! - **IdentityPreconditioner**: no preconditioning
//! - **DiagonalPreconditioner** (Jacobi): diagonal scaling, fully parallel
//! - **IluPreconditioner**: ILU(0) applied as forward/backward triangular solves
//!
//! [`Preconditioning`] bundles the three behind one value so a solver can be
//! configured with a [`PreconditionerKind`] and a device can mirror the same
//! operations.

mod diagonal;
mod ilu;

pub use diagonal::DiagonalPreconditioner;
pub use ilu::IluPreconditioner;

// Re-export IdentityPreconditioner from traits
pub use crate::traits::IdentityPreconditioner;

use crate::sparse::ComputeMatrix;
use crate::traits::Preconditioner;
use ndarray::Array1;

/// Which preconditioner a solver builds for its matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PreconditionerKind {
    Identity,
    Jacobi,
    #[default]
    Ilu,
}

/// A preconditioner built for one matrix
#[derive(Debug, Clone)]
pub enum Preconditioning {
    Identity,
    Jacobi(DiagonalPreconditioner),
    Ilu(IluPreconditioner),
}

impl Preconditioning {
    /// Build the preconditioner of the requested kind
    pub fn build(kind: PreconditionerKind, matrix: &ComputeMatrix) -> Self {
        match kind {
            PreconditionerKind::Identity => Preconditioning::Identity,
            PreconditionerKind::Jacobi => {
                Preconditioning::Jacobi(DiagonalPreconditioner::from_matrix(matrix))
            }
            PreconditionerKind::Ilu => Preconditioning::Ilu(IluPreconditioner::from_matrix(matrix)),
        }
    }

    /// The kind this preconditioner was built as
    pub fn kind(&self) -> PreconditionerKind {
        match self {
            Preconditioning::Identity => PreconditionerKind::Identity,
            Preconditioning::Jacobi(_) => PreconditionerKind::Jacobi,
            Preconditioning::Ilu(_) => PreconditionerKind::Ilu,
        }
    }
}

impl Preconditioner for Preconditioning {
    fn apply(&self, r: &Array1<f64>) -> Array1<f64> {
        match self {
            Preconditioning::Identity => IdentityPreconditioner.apply(r),
            Preconditioning::Jacobi(p) => p.apply(r),
            Preconditioning::Ilu(p) => p.apply(r),
        }
    }

    fn apply_into(&self, r: &[f64], z: &mut [f64]) {
        match self {
            Preconditioning::Identity => IdentityPreconditioner.apply_into(r, z),
            Preconditioning::Jacobi(p) => p.apply_into(r, z),
            Preconditioning::Ilu(p) => p.apply_into(r, z),
        }
    }
}
