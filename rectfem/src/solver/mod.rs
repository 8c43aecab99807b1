//! Solvers for the assembled system
//!
//! Picks one of the [`solvers`] backends for a [`Slae`]:
//!
//! - **Host**: CG or BiCGSTAB on host vectors
//! - **Device**: the same iterations on accelerator buffers, bit-identical
//!   to the host path
//! - **Direct**: dense LU, for small systems and reference answers

use crate::assembly::Slae;
use crate::error::Result;
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use solvers::{
    CpuDevice, DeviceBiCgstab, DeviceCg, GlobalMatrix, HostBiCgstab, HostCg, Method,
    PreconditionerKind, SlaeSolver, lu_solve,
};
use std::time::Instant;

/// Where the solve runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Host,
    Device,
    Direct,
}

/// Krylov method of the iterative backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum KrylovMethod {
    #[default]
    Cg,
    Bicgstab,
}

impl From<KrylovMethod> for Method {
    fn from(method: KrylovMethod) -> Self {
        match method {
            KrylovMethod::Cg => Method::Cg,
            KrylovMethod::Bicgstab => Method::BiCgstab,
        }
    }
}

/// Preconditioner of the iterative backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PreconditionerChoice {
    Identity,
    Jacobi,
    #[default]
    Ilu,
}

impl From<PreconditionerChoice> for PreconditionerKind {
    fn from(choice: PreconditionerChoice) -> Self {
        match choice {
            PreconditionerChoice::Identity => PreconditionerKind::Identity,
            PreconditionerChoice::Jacobi => PreconditionerKind::Jacobi,
            PreconditionerChoice::Ilu => PreconditionerKind::Ilu,
        }
    }
}

/// Solver configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    pub backend: Backend,
    pub method: KrylovMethod,
    pub preconditioner: PreconditionerChoice,
    /// Relative residual ‖r‖/‖b‖ to reach
    pub tolerance: f64,
    pub max_iterations: usize,
    /// Log the residual every this many iterations (0 = never)
    pub print_interval: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Host,
            method: KrylovMethod::Cg,
            preconditioner: PreconditionerChoice::Ilu,
            tolerance: 1e-12,
            max_iterations: 10_000,
            print_interval: 0,
        }
    }
}

impl SolverConfig {
    /// Iterative solver for this configuration, `None` for the direct backend
    pub fn build(&self) -> Option<Box<dyn SlaeSolver>> {
        let kind = PreconditionerKind::from(self.preconditioner);
        let (max, tol, every) = (self.max_iterations, self.tolerance, self.print_interval);
        let solver: Box<dyn SlaeSolver> = match (self.backend, Method::from(self.method)) {
            (Backend::Direct, _) => return None,
            (Backend::Host, Method::Cg) => Box::new(
                HostCg::new(max, tol)
                    .with_preconditioner(kind)
                    .with_print_interval(every),
            ),
            (Backend::Host, Method::BiCgstab) => Box::new(
                HostBiCgstab::new(max, tol)
                    .with_preconditioner(kind)
                    .with_print_interval(every),
            ),
            (Backend::Device, Method::Cg) => Box::new(
                DeviceCg::new(CpuDevice::new(), max, tol)
                    .with_preconditioner(kind)
                    .with_print_interval(every),
            ),
            (Backend::Device, Method::BiCgstab) => Box::new(
                DeviceBiCgstab::new(CpuDevice::new(), max, tol)
                    .with_preconditioner(kind)
                    .with_print_interval(every),
            ),
        };
        Some(solver)
    }
}

/// Solution result from the solver
#[derive(Debug, Clone)]
pub struct Solution {
    /// Solution vector
    pub values: Vec<f64>,
    /// Number of iterations (0 for direct solver)
    pub iterations: usize,
    /// Final relative residual
    pub residual: f64,
    /// Whether the solver converged
    pub converged: bool,
}

/// Solve an assembled system from a zero initial guess
pub fn solve(slae: &Slae, config: &SolverConfig) -> Result<Solution> {
    let start = Instant::now();
    let solution = match config.build() {
        Some(mut solver) => {
            let compute = slae.matrix.prepare_for_solve();
            solver.allocate(slae.size());
            let mut x = vec![0.0; slae.size()];
            let report = solver.solve(&compute, &slae.rhs, &mut x)?;
            Solution {
                values: x,
                iterations: report.iterations,
                residual: report.residual,
                converged: report.converged,
            }
        }
        None => solve_direct(slae)?,
    };

    log::info!(
        "{:?} solve of {} unknowns: {} iterations, residual {:.3e}, {:.1}ms",
        config.backend,
        slae.size(),
        solution.iterations,
        solution.residual,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(solution)
}

fn solve_direct(slae: &Slae) -> Result<Solution> {
    log::info!("Using direct LU solver");
    let dense = slae.matrix.to_dense();
    let b = Array1::from(slae.rhs.clone());
    let x = lu_solve(&dense, &b)?.to_vec();

    let values = slae.matrix.multiply(&x);
    let norm = |v: &mut dyn Iterator<Item = f64>| v.map(|t| t * t).sum::<f64>().sqrt();
    let r_norm = norm(&mut values.iter().zip(&slae.rhs).map(|(ax, b)| b - ax));
    let b_norm = norm(&mut slae.rhs.iter().copied());
    let residual = if b_norm > 0.0 { r_norm / b_norm } else { r_norm };

    Ok(Solution {
        values: x,
        iterations: 0,
        residual,
        converged: true,
    })
}
