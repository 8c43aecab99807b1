//! Device-side state of one solve

use super::{Accelerator, DevicePreconditioner};
use crate::error::SolverError;
use crate::preconditioners::{PreconditionerKind, Preconditioning};
use crate::sparse::ComputeMatrix;

/// Matrix, preconditioner and working vectors uploaded for one solve
///
/// Everything allocated through a session is freed by [`release`](Self::release).
pub(crate) struct Session<A: Accelerator> {
    pub matrix: A::Matrix,
    pub precond: DevicePreconditioner<A>,
    buffers: Vec<A::Buffer>,
}

impl<A: Accelerator> Session<A> {
    /// Upload the system matrix and the preconditioner built for it
    pub fn open(
        device: &mut A,
        matrix: &ComputeMatrix,
        kind: PreconditionerKind,
    ) -> Result<Self, SolverError> {
        let precond = Preconditioning::build(kind, matrix);
        let matrix = device.upload_matrix(matrix);
        match DevicePreconditioner::upload(device, &precond) {
            Ok(precond) => Ok(Self {
                matrix,
                precond,
                buffers: Vec::new(),
            }),
            Err(e) => {
                device.release_matrix(matrix)?;
                Err(e)
            }
        }
    }

    /// Allocate a zeroed working vector owned by the session
    pub fn alloc(&mut self, device: &mut A, len: usize) -> A::Buffer {
        let buffer = device.alloc(len);
        self.buffers.push(buffer);
        buffer
    }

    /// Free every buffer, the preconditioner and the matrix
    pub fn release(self, device: &mut A) -> Result<(), SolverError> {
        for buffer in self.buffers {
            device.release(buffer)?;
        }
        self.precond.release(device)?;
        device.release_matrix(self.matrix)
    }
}
