//! BiCGSTAB (Bi-Conjugate Gradient Stabilized) solver
//!
//! BiCGSTAB is a Krylov subspace method for non-symmetric systems. This
//! version is right-preconditioned: the iterate is updated with `M p` and
//! `M s`, so the monitored residual is the true residual of `A x = b`.

use super::{BREAKDOWN, SolveReport};
use crate::kernels;
use crate::traits::{IdentityPreconditioner, LinearOperator, Preconditioner};
use ndarray::Array1;

/// BiCGSTAB solver configuration
#[derive(Debug, Clone)]
pub struct BiCgstabConfig {
    /// Maximum number of iterations
    pub max_iterations: usize,
    /// Relative tolerance for convergence
    pub tolerance: f64,
    /// Log progress every N iterations (0 = no output)
    pub print_interval: usize,
}

impl Default for BiCgstabConfig {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-6,
            print_interval: 0,
        }
    }
}

/// BiCGSTAB solver result
#[derive(Debug)]
pub struct BiCgstabSolution {
    /// Solution vector
    pub x: Array1<f64>,
    /// Number of iterations
    pub iterations: usize,
    /// Final relative residual
    pub residual: f64,
    /// Whether convergence was achieved
    pub converged: bool,
}

/// Working vectors of one BiCGSTAB solve
#[derive(Debug, Clone)]
pub struct BiCgstabWorkspace {
    r: Vec<f64>,
    r0: Vec<f64>,
    p: Vec<f64>,
    v: Vec<f64>,
    p_hat: Vec<f64>,
    s_hat: Vec<f64>,
    t: Vec<f64>,
}

impl BiCgstabWorkspace {
    /// Allocate working vectors for `n` unknowns
    pub fn new(n: usize) -> Self {
        Self {
            r: vec![0.0; n],
            r0: vec![0.0; n],
            p: vec![0.0; n],
            v: vec![0.0; n],
            p_hat: vec![0.0; n],
            s_hat: vec![0.0; n],
            t: vec![0.0; n],
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

/// Solve Ax = b using the BiCGSTAB method
pub fn bicgstab<A>(operator: &A, b: &Array1<f64>, config: &BiCgstabConfig) -> BiCgstabSolution
where
    A: LinearOperator,
{
    bicgstab_preconditioned_with_guess(operator, &IdentityPreconditioner, b, None, config)
}

/// Solve Ax = b using right-preconditioned BiCGSTAB
pub fn bicgstab_preconditioned<A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<f64>,
    config: &BiCgstabConfig,
) -> BiCgstabSolution
where
    A: LinearOperator,
    P: Preconditioner,
{
    bicgstab_preconditioned_with_guess(operator, precond, b, None, config)
}

/// Solve Ax = b using right-preconditioned BiCGSTAB, starting from `x0`
pub fn bicgstab_preconditioned_with_guess<A, P>(
    operator: &A,
    precond: &P,
    b: &Array1<f64>,
    x0: Option<&Array1<f64>>,
    config: &BiCgstabConfig,
) -> BiCgstabSolution
where
    A: LinearOperator,
    P: Preconditioner,
{
    let n = b.len();
    let b = b.to_vec();
    let mut x = x0.map_or_else(|| vec![0.0; n], |x0| x0.to_vec());
    let mut workspace = BiCgstabWorkspace::new(n);

    let report = bicgstab_in_place(operator, precond, &b, &mut x, &mut workspace, config);

    BiCgstabSolution {
        x: Array1::from_vec(x),
        iterations: report.iterations,
        residual: report.residual,
        converged: report.converged,
    }
}

/// Right-preconditioned BiCGSTAB on caller-owned storage
///
/// `x` holds the initial guess on entry and the iterate on exit.
pub fn bicgstab_in_place<A, P>(
    operator: &A,
    precond: &P,
    b: &[f64],
    x: &mut [f64],
    ws: &mut BiCgstabWorkspace,
    config: &BiCgstabConfig,
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
    operator.apply_into(x, &mut ws.t);
    kernels::residual(b, &ws.t, &mut ws.r);

    let mut rel_residual = kernels::norm(&ws.r) / b_norm;
    if rel_residual < config.tolerance {
        return SolveReport::converged(0, rel_residual);
    }

    // Shadow residual
    ws.r0.copy_from_slice(&ws.r);
    ws.p.fill(0.0);
    ws.v.fill(0.0);

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;

    for iter in 0..config.max_iterations {
        let rho_new = kernels::dot(&ws.r0, &ws.r);
        if rho_new.abs() < BREAKDOWN {
            return SolveReport::stalled(iter, rel_residual);
        }

        let beta = (rho_new / rho) * (alpha / omega);
        rho = rho_new;

        // p = r + beta * (p - omega * v)
        kernels::axpy(-omega, &ws.v, &mut ws.p);
        kernels::xpay(&ws.r, beta, &mut ws.p);

        // v = A * M p
        precond.apply_into(&ws.p, &mut ws.p_hat);
        operator.apply_into(&ws.p_hat, &mut ws.v);

        let r0v = kernels::dot(&ws.r0, &ws.v);
        if r0v.abs() < BREAKDOWN {
            return SolveReport::stalled(iter, rel_residual);
        }
        alpha = rho / r0v;

        // s = r - alpha * v, kept in r
        kernels::axpy(-alpha, &ws.v, &mut ws.r);

        // Check for early convergence
        let s_residual = kernels::norm(&ws.r) / b_norm;
        if s_residual < config.tolerance {
            kernels::axpy(alpha, &ws.p_hat, x);
            return SolveReport::converged(iter + 1, s_residual);
        }

        // t = A * M s
        precond.apply_into(&ws.r, &mut ws.s_hat);
        operator.apply_into(&ws.s_hat, &mut ws.t);

        // omega = (t, s) / (t, t)
        let tt = kernels::dot(&ws.t, &ws.t);
        if tt.abs() < BREAKDOWN {
            kernels::axpy(alpha, &ws.p_hat, x);
            return SolveReport::stalled(iter + 1, s_residual);
        }
        omega = kernels::dot(&ws.t, &ws.r) / tt;

        // x = x + alpha * M p + omega * M s
        kernels::axpy(alpha, &ws.p_hat, x);
        kernels::axpy(omega, &ws.s_hat, x);

        // r = s - omega * t
        kernels::axpy(-omega, &ws.t, &mut ws.r);

        rel_residual = kernels::norm(&ws.r) / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::debug!(
                "BiCGSTAB iteration {}: relative residual = {:.6e}",
                iter + 1,
                rel_residual
            );
        }

        if rel_residual < config.tolerance {
            return SolveReport::converged(iter + 1, rel_residual);
        }

        // Check for stagnation
        if omega.abs() < BREAKDOWN {
            return SolveReport::stalled(iter + 1, rel_residual);
        }
    }

    SolveReport::stalled(config.max_iterations, rel_residual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preconditioners::IluPreconditioner;
    use crate::sparse::{DiagMatrix, MsrMatrix};
    use ndarray::array;

    #[test]
    fn test_bicgstab_simple() {
        let dofs: &[usize] = &[0, 1];
        let mut a = MsrMatrix::from_element_dofs(2, [dofs]);
        a.scatter(dofs, &array![[4.0, 1.0], [2.0, 3.0]]);
        let b = array![1.0, 2.0];

        let config = BiCgstabConfig {
            max_iterations: 100,
            tolerance: 1e-10,
            print_interval: 0,
        };

        let solution = bicgstab(&a, &b, &config);

        assert!(solution.converged, "BiCGSTAB should converge");

        let ax = a.matvec(&solution.x);
        let error: f64 = (&ax - &b).iter().map(|e| e * e).sum::<f64>().sqrt();
        assert!(error < 1e-8, "Solution should satisfy Ax = b");
    }

    #[test]
    fn test_bicgstab_nonsymmetric_stencil_with_ilu() {
        // Convection-like skew part on top of a dominant diagonal
        let mut a = DiagMatrix::for_grid(6, 5);
        for row in 0..a.size() {
            for col in a.neighbours(row) {
                let skew = if col > row { 0.3 } else { -0.3 };
                a.set(row, col, -1.0 + skew);
            }
            a.diagonal_mut()[row] = 9.0;
        }
        let x_true: Vec<f64> = (0..a.size()).map(|i| 1.0 + (i as f64 * 0.1).cos()).collect();
        let b = Array1::from_vec(a.multiply(&x_true));

        let precond = IluPreconditioner::from_matrix(&a.prepare_for_solve());
        let config = BiCgstabConfig {
            max_iterations: 200,
            tolerance: 1e-12,
            print_interval: 0,
        };
        let solution = bicgstab_preconditioned(&a, &precond, &b, &config);

        assert!(solution.converged);
        for (xi, ti) in solution.x.iter().zip(x_true.iter()) {
            assert!((xi - ti).abs() < 1e-9);
        }
    }
}
