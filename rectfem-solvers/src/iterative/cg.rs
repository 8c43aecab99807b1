//! CG (Conjugate Gradient) solver
//!
//! The preconditioned Conjugate Gradient method for symmetric positive
//! definite systems. Every vector operation goes through [`crate::kernels`],
//! in the order [`DeviceCg`](crate::device::DeviceCg) replays on a device.

use super::{BREAKDOWN, SolveReport};
use crate::kernels;
use crate::traits::{IdentityPreconditioner, LinearOperator, Preconditioner};
use ndarray::Array1;

/// CG solver configuration
#[derive(Debug, Clone)]
pub struct CgConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Relative tolerance for convergence
    pub tolerance: f64,
    /// Log progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for CgConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            print_interval: 0,
        }
    }
}

/// CG solver result
#[derive(Debug)]
pub struct CgSolution {
    /// Solution vector
    pub x: Array1<f64>,
    /// Number of iterations
    pub iterations: usize,
    /// Final relative residual
    pub residual: f64,
    /// Whether convergence was achieved
    pub converged: bool,
}

/// Working vectors of one CG solve
#[derive(Debug, Clone)]
pub struct CgWorkspace {
    r: Vec<f64>,
    z: Vec<f64>,
    p: Vec<f64>,
    q: Vec<f64>,
}

impl CgWorkspace {
    /// Allocate working vectors for `n` unknowns
    pub fn new(n: usize) -> Self {
        Self {
            r: vec![0.0; n],
            z: vec![0.0; n],
            p: vec![0.0; n],
            q: vec![0.0; n],
        }
    }

    /// Number of unknowns the workspace was allocated for
    pub fn len(&self) -> usize {
        self.r.len()
    }

    /// Whether the workspace holds no unknowns
    pub fn is_empty(&self) -> bool {
        self.r.is_empty()
    }
}

/// Solve Ax = b using the Conjugate Gradient method
///
/// Note: This method is only correct for symmetric positive definite matrices.
/// For non-symmetric systems, use BiCGSTAB instead.
pub fn cg<A>(operator: &A, b: &Array1<f64>, config: &CgConfig) -> CgSolution
where
    A: LinearOperator,
{
    cg_preconditioned_with_guess(operator, &IdentityPreconditioner, b, None, config)
}

/// Solve Ax = b using preconditioned CG
pub fn cg_preconditioned<A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<f64>,
    config: &CgConfig,
) -> CgSolution
where
    A: LinearOperator,
    P: Preconditioner,
{
    cg_preconditioned_with_guess(operator, precond, b, None, config)
}

/// Solve Ax = b using preconditioned CG, starting from `x0` (zero if `None`)
pub fn cg_preconditioned_with_guess<A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<f64>,
    x0: Option<&Array1<f64>>,
    config: &CgConfig,
) -> CgSolution
where
    A: LinearOperator,
    P: Preconditioner,
{
    let n = b.len();
    let b = b.to_vec();
    let mut x = x0.map_or_else(|| vec![0.0; n], |x0| x0.to_vec());
    let mut workspace = CgWorkspace::new(n);

    let report = cg_in_place(operator, precond, &b, &mut x, &mut workspace, config);

    CgSolution {
        x: Array1::from_vec(x),
        iterations: report.iterations,
        residual: report.residual,
        converged: report.converged,
    }
}

/// Preconditioned CG on caller-owned storage
///
/// `x` holds the initial guess on entry and the iterate on exit.
pub fn cg_in_place<A, P>(
    operator: &A,
    precond: &P,
    b: &[f64],
    x: &mut [f64],
    ws: &mut CgWorkspace,
    config: &CgConfig,
) -> SolveReport
where
    A: LinearOperator,
    P: Preconditioner,
{
    assert_eq!(ws.len(), b.len(), "Workspace size mismatch");

    let b_norm = kernels::norm(b);
    if b_norm == 0.0 {
        x.fill(0.0);
        return SolveReport::converged(0, 0.0);
    }

    // r = b - A x
    operator.apply_into(x, &mut ws.q);
    kernels::residual(b, &ws.q, &mut ws.r);

    let mut rel_residual = kernels::norm(&ws.r) / b_norm;
    if rel_residual < config.tolerance {
        return SolveReport::converged(0, rel_residual);
    }

    precond.apply_into(&ws.r, &mut ws.z);
    ws.p.copy_from_slice(&ws.z);
    let mut rz = kernels::dot(&ws.r, &ws.z);

    for iter in 0..config.max_iterations {
        // q = A * p
        operator.apply_into(&ws.p, &mut ws.q);

        // alpha = (r, z) / (p, q)
        let pq = kernels::dot(&ws.p, &ws.q);
        if pq.abs() < BREAKDOWN {
            return SolveReport::stalled(iter, rel_residual);
        }
        let alpha = rz / pq;

        kernels::axpy(alpha, &ws.p, x);
        kernels::axpy(-alpha, &ws.q, &mut ws.r);

        rel_residual = kernels::norm(&ws.r) / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::debug!(
                "CG iteration {}: relative residual = {:.6e}",
                iter + 1,
                rel_residual
            );
        }

        if rel_residual < config.tolerance {
            return SolveReport::converged(iter + 1, rel_residual);
        }

        precond.apply_into(&ws.r, &mut ws.z);
        let rz_new = kernels::dot(&ws.r, &ws.z);
        if rz.abs() < BREAKDOWN {
            return SolveReport::stalled(iter + 1, rel_residual);
        }

        let beta = rz_new / rz;
        rz = rz_new;

        // p = z + beta * p
        kernels::xpay(&ws.z, beta, &mut ws.p);
    }

    SolveReport::stalled(config.max_iterations, rel_residual)
}
