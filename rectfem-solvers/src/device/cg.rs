//! Preconditioned CG on an accelerator
//!
//! Mirrors [`cg_in_place`](crate::iterative::cg_in_place) kernel for kernel.

use super::session::Session;
use super::{Accelerator, DevicePreconditioner};
use crate::error::SolverError;
use crate::iterative::{BREAKDOWN, CgConfig, SlaeSolver, SolveReport};
use crate::preconditioners::PreconditionerKind;
use crate::sparse::ComputeMatrix;

struct CgBuffers<B> {
    b: B,
    x: B,
    r: B,
    z: B,
    p: B,
    q: B,
}

/// Preconditioned CG whose vectors live on an [`Accelerator`]
#[derive(Debug)]
pub struct DeviceCg<A: Accelerator> {
    device: A,
    config: CgConfig,
    preconditioner: PreconditionerKind,
    size: usize,
}

impl<A: Accelerator> DeviceCg<A> {
    /// Create a solver with an iteration cap and a relative-residual tolerance
    pub fn new(device: A, max_iterations: usize, tolerance: f64) -> Self {
        Self {
            device,
            config: CgConfig {
                max_iterations,
                tolerance,
                ..CgConfig::default()
            },
            preconditioner: PreconditionerKind::default(),
            size: 0,
        }
    }

    /// Select the preconditioner built for each matrix
    pub fn with_preconditioner(mut self, kind: PreconditionerKind) -> Self {
        self.preconditioner = kind;
        self
    }

    /// Log the residual every `interval` iterations (0 = never)
    pub fn with_print_interval(mut self, interval: usize) -> Self {
        self.config.print_interval = interval;
        self
    }

    /// The accelerator the solver runs on
    pub fn device(&self) -> &A {
        &self.device
    }

    /// Mutable access to the accelerator
    pub fn device_mut(&mut self) -> &mut A {
        &mut self.device
    }

    /// Give the accelerator back
    pub fn into_device(self) -> A {
        self.device
    }
}

impl<A: Accelerator> SlaeSolver for DeviceCg<A> {
    /// Record the system size; device buffers are allocated per solve
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
        let buffers = CgBuffers {
            b: session.alloc(device, n),
            x: session.alloc(device, n),
            r: session.alloc(device, n),
            z: session.alloc(device, n),
            p: session.alloc(device, n),
            q: session.alloc(device, n),
        };

        let outcome = run(device, &session, &buffers, rhs, x, &self.config);
        session.release(device)?;

        let report = outcome?;
        report.log(&format!("CG ({})", device.name()));
        Ok(report)
    }
}

fn run<A: Accelerator>(
    device: &mut A,
    session: &Session<A>,
    v: &CgBuffers<A::Buffer>,
    rhs: &[f64],
    x: &mut [f64],
    config: &CgConfig,
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
    v: &CgBuffers<A::Buffer>,
    config: &CgConfig,
) -> Result<SolveReport, SolverError> {
    let b_norm = device.norm(v.b)?;
    if b_norm == 0.0 {
        device.fill_zero(v.x)?;
        return Ok(SolveReport::converged(0, 0.0));
    }

    // r = b - A x
    device.spmv(a, v.x, v.q)?;
    device.residual(v.b, v.q, v.r)?;

    let mut rel_residual = device.norm(v.r)? / b_norm;
    if rel_residual < config.tolerance {
        return Ok(SolveReport::converged(0, rel_residual));
    }

    precond.apply(device, v.r, v.z)?;
    device.copy(v.z, v.p)?;
    let mut rz = device.dot(v.r, v.z)?;

    for iter in 0..config.max_iterations {
        device.spmv(a, v.p, v.q)?;

        let pq = device.dot(v.p, v.q)?;
        if pq.abs() < BREAKDOWN {
            return Ok(SolveReport::stalled(iter, rel_residual));
        }
        let alpha = rz / pq;

        device.axpy(alpha, v.p, v.x)?;
        device.axpy(-alpha, v.q, v.r)?;

        rel_residual = device.norm(v.r)? / b_norm;

        if config.print_interval > 0 && (iter + 1) % config.print_interval == 0 {
            log::debug!(
                "CG ({}) iteration {}: relative residual = {:.6e}",
                device.name(),
                iter + 1,
                rel_residual
            );
        }

        if rel_residual < config.tolerance {
            return Ok(SolveReport::converged(iter + 1, rel_residual));
        }

        precond.apply(device, v.r, v.z)?;
        let rz_new = device.dot(v.r, v.z)?;
        if rz.abs() < BREAKDOWN {
            return Ok(SolveReport::stalled(iter + 1, rel_residual));
        }

        let beta = rz_new / rz;
        rz = rz_new;

        device.xpay(v.z, beta, v.p)?;
    }

    Ok(SolveReport::stalled(config.max_iterations, rel_residual))
}
