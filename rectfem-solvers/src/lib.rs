//! Sparse storage and Krylov solvers for structured-grid FEM
//!
//! This crate provides the linear-algebra half of a rectangular-mesh finite
//! element code: the matrix formats the assembler writes into, the
//! preconditioners built from them, and the iterative solvers that run either
//! on the host or on an [`Accelerator`](device::Accelerator).
//!
//! # Features
//!
//! - **Sparse Matrices**: profile-diagonal 9-point bands ([`DiagMatrix`]) and
//!   general sparse rows with a separate diagonal ([`MsrMatrix`])
//! - **Preconditioners**: Jacobi, ILU(0) applied as packed triangular solves
//! - **Iterative Solvers**: CG, right-preconditioned BiCGSTAB
//! - **Accelerators**: the same iterations on device buffers, bit-identical
//!   to the host path
//! - **Direct Solvers**: dense LU for reference answers
//!
//! # Example
//!
//! ```
//! use rectfem_solvers::{DiagMatrix, HostCg, SlaeSolver};
//!
//! // 1D Laplacian on 4 nodes
//! let mut a = DiagMatrix::for_grid(4, 1);
//! for row in 0..4 {
//!     a.set(row, row, 2.0);
//!     if row + 1 < 4 {
//!         a.set(row, row + 1, -1.0);
//!         a.set(row + 1, row, -1.0);
//!     }
//! }
//! let b = a.multiply(&[1.0; 4]);
//!
//! let mut solver = HostCg::new(100, 1e-12);
//! let mut x = vec![0.0; 4];
//! let report = solver.solve(&a.prepare_for_solve(), &b, &mut x).unwrap();
//! assert!(report.converged);
//! ```

pub mod device;
pub mod direct;
pub mod error;
pub mod iterative;
pub mod kernels;
pub mod parallel;
pub mod preconditioners;
pub mod sparse;
pub mod traits;

// Re-export main types
pub use error::SolverError;
pub use sparse::{ComputeMatrix, DiagMatrix, GlobalMatrix, MsrMatrix, SparseMatrix};
pub use traits::{LinearOperator, Preconditioner};

// Re-export iterative solvers
pub use iterative::{
    BiCgstabConfig, BiCgstabSolution, CgConfig, CgSolution, HostBiCgstab, HostCg, Method,
    SlaeSolver, SolveReport, bicgstab, bicgstab_preconditioned, cg, cg_preconditioned,
};

// Re-export device solvers
pub use device::{Accelerator, CpuDevice, DeviceBiCgstab, DeviceCg, TransferStats};

// Re-export direct solvers
pub use direct::{LuError, LuFactorization, lu_solve};

// Re-export preconditioners
pub use preconditioners::{
    DiagonalPreconditioner, IdentityPreconditioner, IluPreconditioner, PreconditionerKind,
    Preconditioning,
};
