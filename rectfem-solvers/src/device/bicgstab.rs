//! Right-preconditioned BiCGSTAB on an accelerator
//!
//! Mirrors [`bicgstab_in_place`](crate::iterative::bicgstab_in_place) kernel
//! for kernel.

use super::session::Session;
use super::{Accelerator, DevicePreconditioner};
use crate::error::SolverError;
use crate::iterative::{BREAKDOWN, BiCgstabConfig, SlaeSolver, SolveReport};
use crate::preconditioners::PreconditionerKind;
use crate::sparse::ComputeMatrix;

struct BiCgstabBuffers<B> {
    b: B,
    x: B,
    r: B,
    r0: B,
    p: B,
    v: B,
    p_hat: B,
    s_hat: B,
    t: B,
}

/// Right-preconditioned BiCGSTAB whose vectors live on an [`Accelerator`]
#[derive(Debug)]
pub struct DeviceBiCgstab<A: Accelerator> {
    device: A,
    config: BiCgstabConfig,
    preconditioner: PreconditionerKind,
    size: usize,
}

impl<A: Accelerator> DeviceBiCgstab<A> {
    /// Create a solver with an iteration cap and a relative-residual tolerance
    pub fn new(device: A, max_iterations: usize, tolerance: f64) -> Self {
        Self {
            device,
            config: BiCgstabConfig {
                max_iterations,
                tolerance,
                ..BiCgstabConfig::default()
            },
            preconditioner: PreconditionerKind::default(),
            size: 0,
        }
    }

    pub fn with_preconditioner(mut self, kind: PreconditionerKind) -> Self {
        self.preconditioner = kind;
        self
    }

    pub fn with_print_interval(mut self, interval: usize) -> Self {
        self.config.print_interval = interval;
        self
    }

    pub fn device(&self) -> &A {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut A {
        &mut self.device
    }

    pub fn into_device(self) -> A {
        self.device
    }
}

impl<A: Accelerator> SlaeSolver for DeviceBiCgstab<A> {
    fn allocate(&mut self, n: usize) {
        self.size = n;
    }

    fn solve(
        &mut self,
        matrix: &ComputeMatrix,
        rhs: &[f64],
        x: &mut [f64],
    ) -> Result<SolveReport, SolverError> {
        let n = matrix.size();
        SolverError::check_len(n, rhs.len())?;
        SolverError::check_len(n, x.len())?;
        if self.size != n {
            self.allocate(n);
        }

        let device = &mut self.device;
        let mut session = Session::open(device, matrix, self.preconditioner)?;
        let buffers = BiCgstabBuffers {
            b: session.alloc(device, n),
            x: session.alloc(device, n),
            r: session.alloc(device, n),
            r0: session.alloc(device, n),
            p: session.alloc(device, n),
            v: session.alloc(device, n),
            p_hat: session.alloc(device, n),
            s_hat: session.alloc(device, n),
            t: session.alloc(device, n),
        };

        let outcome = run(device, &session, &buffers, rhs, x, &self.config);
        session.release(device)?;

        let report = outcome?;
        report.log(&format!("BiCGSTAB ({})", device.name()));
        Ok(report)
    }
}

fn run<A: Accelerator>(
    device: &mut A,
    session: &Session<A>,
    v: &BiCgstabBuffers<A::Buffer>,
    rhs: &[f64],
    x: &mut [f64],
    config: &BiCgstabConfig,
) -> Result<SolveReport, SolverError> {
    device.upload(rhs, v.b)?;
    device.upload(x, v.x)?;
    let report = iterate(device, session.matrix, &session.precond, v, config)?;
    device.download(v.x, x)?;
    Ok(report)
}

fn iterate<A: Accelerator>(
    device: &mut A,
    a: A::Matrix,
    precond: &DevicePreconditioner<A>,
    w: &BiCgstabBuffers<A::Buffer>,
    config: &BiCgstabConfig,
) -> Result<SolveReport, SolverError> {
    let b_norm = device.norm(w.b)?;
    if b_norm == 0.0 {
        device.fill_zero(w.x)?;
        return Ok(SolveReport::converged(0, 0.0));
    }

    // r = b - A x
    device.spmv(a, w.x, w.t)?;
    device.residual(w.b, w.t, w.r)?;

    let mut rel_residual = device.norm(w.r)? / b_norm;
    if rel_residual < config.tolerance {
        return Ok(SolveReport::converged(0, rel_residual));
    }

    device.copy(w.r, w.r0)?;
    device.fill_zero(w.p)?;
    device.fill_zero(w.v)?;

    let mut rho = 1.0;
    let mut alpha = 1.0;
    let mut omega = 1.0;

    for iter in 0..config.max_iterations {
        let rho_new = device.dot(w.r0, w.r)?;
        if rho_new.abs() < BREAKDOWN {
            return Ok(SolveReport::stalled(iter, rel_residual));
        }

        let beta = (rho_new / rho) * (alpha / omega);
        rho = rho_new;

        // p = r + beta * (p - omega * v)
        device.axpy(-omega, w.v, w.p)?;
        device.xpay(w.r, beta, w.p)?;

        precond.apply(device, w.p, w.p_hat)?;
        device.spmv(a, w.p_hat, w.v)?;

        let r0v = device.dot(w.r0, w.v)?;
        if r0v.abs() < BREAKDOWN {
            return Ok(SolveReport::stalled(iter, rel_residual));
        }
        alpha = rho / r0v;

        // s, kept in r
        device.axpy(-alpha, w.v, w.r)?;

        let s_residual = device.norm(w.r)? / b_norm;
        if s_residual < config.tolerance {
            device.axpy(alpha, w.p_hat, w.x)?;
            return Ok(SolveReport::converged(iter + 1, s_residual));
        }

        precond.apply(device, w.r, w.s_hat)?;
        device.spmv(a, w.s_hat, w.t)?;

        let tt = device.dot(w.t, w.t)?;
        if tt.abs() < BREAKDOWN {
            device.axpy(alpha, w.p_hat, w.x)?;
            return Ok(SolveReport::stalled(iter + 1, s_residual));
        }
        omega = device.dot(w.t, w.r)? / tt;

        device.axpy(alpha, w.p_hat, w.x)?;
        device.axpy(omega, w.s_hat, w.x)?;
        device.axpy(-omega, w.t, w.r)?;

        rel_residual = device.norm(w.r)? / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::debug!(
                "BiCGSTAB ({}) iteration {}: relative residual = {:.6e}",
                device.name(),
                iter + 1,
                rel_residual
            );
        }

        if rel_residual < config.tolerance {
            return Ok(SolveReport::converged(iter + 1, rel_residual));
        }

        if omega.abs() < BREAKDOWN {
            return Ok(SolveReport::stalled(iter + 1, rel_residual));
        }
    }

    Ok(SolveReport::stalled(config.max_iterations, rel_residual))
}
