//! Error type for solves and accelerator buffer management

use thiserror::Error;

/// Errors that can occur while setting up or running a solve
///
/// Non-convergence is not an error: it is reported through
/// [`SolveReport::converged`](crate::iterative::SolveReport).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Vector length mismatch: expected {expected}, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("Unknown or released device buffer {0}")]
    UnknownBuffer(usize),
    #[error("Unknown or released device matrix {0}")]
    UnknownMatrix(usize),
}

impl SolverError {
    /// Check that a vector has the expected length
    pub(crate) fn check_len(expected: usize, got: usize) -> Result<(), SolverError> {
        if expected == got {
            Ok(())
        } else {
            Err(SolverError::LengthMismatch { expected, got })
        }
    }
}
