//! Accelerator abstraction and device-resident Krylov solvers
//!
//! An [`Accelerator`] owns vector buffers and matrices in its own memory.
//! Data moves only through explicit [`upload`](Accelerator::upload) and
//! [`download`](Accelerator::download) calls; kernels operate on handles.
//! The device solvers upload the system once, iterate entirely on handles
//! (reading back nothing but scalar reductions) and download the solution
//! once at the end.
//!
//! [`CpuDevice`] is the reference backend. Its kernels are the functions in
//! [`crate::kernels`] and [`crate::sparse::view`], so a device solve is bit
//! for bit the host solve.

mod bicgstab;
mod cg;
mod cpu;
mod precond;
mod session;

pub use bicgstab::DeviceBiCgstab;
pub use cg::DeviceCg;
pub use cpu::{BufferId, CpuDevice, MatrixId, TransferStats};
pub use precond::DevicePreconditioner;

use crate::error::SolverError;
use crate::sparse::ComputeMatrix;
use std::fmt::Debug;

/// Capabilities a compute backend offers the solvers
///
/// Two-operand kernels require distinct input and output buffers.
pub trait Accelerator {
    /// Handle to a vector in device memory
    type Buffer: Copy + Debug;
    /// Handle to a matrix in device memory
    type Matrix: Copy + Debug;

    /// Human-readable backend name, used in log messages
    fn name(&self) -> &str;

    /// Allocate a zeroed vector of `len` values
    fn alloc(&mut self, len: usize) -> Self::Buffer;

    /// Free a vector
    fn release(&mut self, buffer: Self::Buffer) -> Result<(), SolverError>;

    /// Copy host values into a device vector of the same length
    fn upload(&mut self, host: &[f64], buffer: Self::Buffer) -> Result<(), SolverError>;

    /// Copy a device vector back into host memory of the same length
    fn download(&mut self, buffer: Self::Buffer, host: &mut [f64]) -> Result<(), SolverError>;

    /// Copy a prepared matrix into device memory
    fn upload_matrix(&mut self, matrix: &ComputeMatrix) -> Self::Matrix;

    /// Free a matrix
    fn release_matrix(&mut self, matrix: Self::Matrix) -> Result<(), SolverError>;

    /// y = A * x
    fn spmv(
        &mut self,
        matrix: Self::Matrix,
        x: Self::Buffer,
        y: Self::Buffer,
    ) -> Result<(), SolverError>;

    /// Solve L·y = v in place with the unit lower factor packed in `factors`
    fn lower_solve(&mut self, factors: Self::Matrix, v: Self::Buffer) -> Result<(), SolverError>;

    /// Solve U·y = v in place with the upper factor packed in `factors`
    fn upper_solve(&mut self, factors: Self::Matrix, v: Self::Buffer) -> Result<(), SolverError>;

    /// dst = src
    fn copy(&mut self, src: Self::Buffer, dst: Self::Buffer) -> Result<(), SolverError>;

    /// x = 0
    fn fill_zero(&mut self, x: Self::Buffer) -> Result<(), SolverError>;

    /// y = alpha * x + y
    fn axpy(&mut self, alpha: f64, x: Self::Buffer, y: Self::Buffer) -> Result<(), SolverError>;

    /// y = x + beta * y
    fn xpay(&mut self, x: Self::Buffer, beta: f64, y: Self::Buffer) -> Result<(), SolverError>;

    /// y = d ⊙ x
    fn pointwise(
        &mut self,
        d: Self::Buffer,
        x: Self::Buffer,
        y: Self::Buffer,
    ) -> Result<(), SolverError>;

    /// r = b - ax
    fn residual(
        &mut self,
        b: Self::Buffer,
        ax: Self::Buffer,
        r: Self::Buffer,
    ) -> Result<(), SolverError>;

    /// (x, y), read back to the host as a scalar
    fn dot(&mut self, x: Self::Buffer, y: Self::Buffer) -> Result<f64, SolverError>;

    /// ‖x‖₂
    fn norm(&mut self, x: Self::Buffer) -> Result<f64, SolverError> {
        Ok(self.dot(x, x)?.sqrt())
    }
}
