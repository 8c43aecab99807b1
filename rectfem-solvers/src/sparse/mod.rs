//! Sparse matrix structures for structured-mesh FEM
//!
//! Two storage formats share one contract ([`GlobalMatrix`]):
//! - [`DiagMatrix`]: profile-diagonal bands of the bilinear 9-point stencil
//! - [`MsrMatrix`]: general sparse rows with a separate diagonal
//!
//! Both flatten into a [`ComputeMatrix`] for the solve phase, and every
//! kernel runs on the borrowed views of [`view`].

mod compute;
mod diag;
mod matrix;
mod msr;
pub mod view;

pub use compute::{ComputeMatrix, MatrixView};
pub use diag::DiagMatrix;
pub use matrix::{GlobalMatrix, SparseMatrix};
pub use msr::MsrMatrix;
pub use view::{BAND_COUNT, DiagView, MsrView, band_offsets};
