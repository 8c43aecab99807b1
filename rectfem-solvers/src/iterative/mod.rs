//! Iterative solvers for linear systems
//!
//! This module provides Krylov subspace methods for solving large sparse systems:
//! - [`cg`]: Conjugate Gradient - for symmetric positive definite systems
//! - [`bicgstab`]: BiCGSTAB - for general non-symmetric systems
//!
//! The functional API works on any [`LinearOperator`](crate::LinearOperator).
//! [`HostCg`] and [`HostBiCgstab`] wrap the same loops behind the
//! [`SlaeSolver`] contract shared with the device solvers.

mod bicgstab;
mod cg;
mod host;

pub use bicgstab::{
    BiCgstabConfig, BiCgstabSolution, BiCgstabWorkspace, bicgstab, bicgstab_in_place,
    bicgstab_preconditioned, bicgstab_preconditioned_with_guess,
};
pub use cg::{
    CgConfig, CgSolution, CgWorkspace, cg, cg_in_place, cg_preconditioned,
    cg_preconditioned_with_guess,
};
pub use host::{HostBiCgstab, HostCg};

use crate::error::SolverError;
use crate::sparse::ComputeMatrix;

/// Denominators below this magnitude end the iteration
pub(crate) const BREAKDOWN: f64 = 1e-30;

/// Krylov method selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Preconditioned Conjugate Gradient (symmetric positive definite systems)
    #[default]
    Cg,
    /// Right-preconditioned BiCGSTAB (general systems)
    BiCgstab,
}

/// Outcome of one solve
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolveReport {
    /// Final relative residual ‖r‖/‖b‖
    pub residual: f64,
    /// Number of iterations performed
    pub iterations: usize,
    /// Whether the tolerance was reached
    pub converged: bool,
}

impl SolveReport {
    pub(crate) fn converged(iterations: usize, residual: f64) -> Self {
        Self {
            residual,
            iterations,
            converged: true,
        }
    }

    pub(crate) fn stalled(iterations: usize, residual: f64) -> Self {
        Self {
            residual,
            iterations,
            converged: false,
        }
    }

    /// Log the outcome of a solve: a summary line, or a warning when the
    /// tolerance was not reached
    pub fn log(&self, solver: &str) {
        if self.converged {
            log::info!(
                "{solver}: converged in {} iterations, relative residual = {:.6e}",
                self.iterations,
                self.residual
            );
        } else {
            log::warn!(
                "{solver}: stopped after {} iterations without converging, relative residual = {:.6e}",
                self.iterations,
                self.residual
            );
        }
    }
}

/// A solver for one assembled system of linear algebraic equations
///
/// `x` carries the initial guess in and the solution out. Non-convergence is
/// reported in the [`SolveReport`], never as an error.
pub trait SlaeSolver {
    /// Reserve working storage for systems with `n` unknowns
    fn allocate(&mut self, n: usize);

    /// Solve `matrix * x = rhs`
    fn solve(
        &mut self,
        matrix: &ComputeMatrix,
        rhs: &[f64],
        x: &mut [f64],
    ) -> Result<SolveReport, SolverError>;
}

impl<S: SlaeSolver + ?Sized> SlaeSolver for Box<S> {
    fn allocate(&mut self, n: usize) {
        (**self).allocate(n)
    }

    fn solve(
        &mut self,
        matrix: &ComputeMatrix,
        rhs: &[f64],
        x: &mut [f64],
    ) -> Result<SolveReport, SolverError> {
        (**self).solve(matrix, rhs, x)
    }
}
