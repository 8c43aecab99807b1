//! Preconditioners resident on an accelerator

use super::Accelerator;
use crate::error::SolverError;
use crate::preconditioners::Preconditioning;

/// Device copy of a [`Preconditioning`]
///
/// Applying it issues the same kernels, in the same order, as the host
/// [`Preconditioner::apply_into`](crate::Preconditioner::apply_into).
#[derive(Debug)]
pub enum DevicePreconditioner<A: Accelerator> {
    Identity,
    /// Inverse diagonal
    Jacobi(A::Buffer),
    /// Packed ILU(0) factors
    Ilu(A::Matrix),
}

impl<A: Accelerator> DevicePreconditioner<A> {
    /// Upload the data a host preconditioner needs
    pub fn upload(device: &mut A, precond: &Preconditioning) -> Result<Self, SolverError> {
        Ok(match precond {
            Preconditioning::Identity => DevicePreconditioner::Identity,
            Preconditioning::Jacobi(p) => {
                let inv = p.inverse_diagonal();
                let buffer = device.alloc(inv.len());
                if let Err(e) = device.upload(inv, buffer) {
                    device.release(buffer)?;
                    return Err(e);
                }
                DevicePreconditioner::Jacobi(buffer)
            }
            Preconditioning::Ilu(p) => DevicePreconditioner::Ilu(device.upload_matrix(p.factors())),
        })
    }

    /// z = M * r
    pub fn apply(&self, device: &mut A, r: A::Buffer, z: A::Buffer) -> Result<(), SolverError> {
        match self {
            DevicePreconditioner::Identity => device.copy(r, z),
            DevicePreconditioner::Jacobi(inv) => device.pointwise(*inv, r, z),
            DevicePreconditioner::Ilu(factors) => {
                device.copy(r, z)?;
                device.lower_solve(*factors, z)?;
                device.upper_solve(*factors, z)
            }
        }
    }

    /// Free device memory
    pub fn release(self, device: &mut A) -> Result<(), SolverError> {
        match self {
            DevicePreconditioner::Identity => Ok(()),
            DevicePreconditioner::Jacobi(inv) => device.release(inv),
            DevicePreconditioner::Ilu(factors) => device.release_matrix(factors),
        }
    }
}
