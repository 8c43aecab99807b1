//! Host implementations of the [`SlaeSolver`] contract

use super::{
    BiCgstabConfig, BiCgstabWorkspace, CgConfig, CgWorkspace, SlaeSolver, SolveReport,
    bicgstab_in_place, cg_in_place,
};
use crate::error::SolverError;
use crate::preconditioners::{PreconditionerKind, Preconditioning};
use crate::sparse::ComputeMatrix;

fn check_system(matrix: &ComputeMatrix, rhs: &[f64], x: &[f64]) -> Result<usize, SolverError> {
    let n = matrix.size();
    SolverError::check_len(n, rhs.len())?;
    SolverError::check_len(n, x.len())?;
    Ok(n)
}

/// Preconditioned CG on the host
#[derive(Debug, Clone)]
pub struct HostCg {
    config: CgConfig,
    preconditioner: PreconditionerKind,
    workspace: Option<CgWorkspace>,
}

impl HostCg {
    /// Create a solver with an iteration cap and a relative-residual tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            config: CgConfig {
                max_iterations,
                tolerance,
                ..CgConfig::default()
            },
            preconditioner: PreconditionerKind::default(),
            workspace: None,
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

    /// Solver configuration
    pub fn config(&self) -> &CgConfig {
        &self.config
    }
}

impl SlaeSolver for HostCg {
    fn allocate(&mut self, n: usize) {
        self.workspace = Some(CgWorkspace::new(n));
    }

    fn solve(
        &mut self,
        matrix: &ComputeMatrix,
        rhs: &[f64],
        x: &mut [f64],
    ) -> Result<SolveReport, SolverError> {
        let n = check_system(matrix, rhs, x)?;
        if self.workspace.as_ref().is_some_and(|ws| ws.len() != n) {
            self.workspace = None;
        }
        let precond = Preconditioning::build(self.preconditioner, matrix);

        let ws = self.workspace.get_or_insert_with(|| CgWorkspace::new(n));
        let report = cg_in_place(matrix, &precond, rhs, x, ws, &self.config);
        report.log("CG (host)");
        Ok(report)
    }
}

/// Right-preconditioned BiCGSTAB on the host
#[derive(Debug, Clone)]
pub struct HostBiCgstab {
    config: BiCgstabConfig,
    preconditioner: PreconditionerKind,
    workspace: Option<BiCgstabWorkspace>,
}

impl HostBiCgstab {
    /// Create a solver with an iteration cap and a relative-residual tolerance
    pub fn new(max_iterations: usize, tolerance: f64) -> Self {
        Self {
            config: BiCgstabConfig {
                max_iterations,
                tolerance,
                ..BiCgstabConfig::default()
            },
            preconditioner: PreconditionerKind::default(),
            workspace: None,
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

    /// Solver configuration
    pub fn config(&self) -> &BiCgstabConfig {
        &self.config
    }
}

impl SlaeSolver for HostBiCgstab {
    fn allocate(&mut self, n: usize) {
        self.workspace = Some(BiCgstabWorkspace::new(n));
    }

    fn solve(
        &mut self,
        matrix: &ComputeMatrix,
        rhs: &[f64],
        x: &mut [f64],
    ) -> Result<SolveReport, SolverError> {
        let n = check_system(matrix, rhs, x)?;
        if self.workspace.as_ref().is_some_and(|ws| ws.len() != n) {
            self.workspace = None;
        }
        let precond = Preconditioning::build(self.preconditioner, matrix);

        let ws = self.workspace.get_or_insert_with(|| BiCgstabWorkspace::new(n));
        let report = bicgstab_in_place(matrix, &precond, rhs, x, ws, &self.config);
        report.log("BiCGSTAB (host)");
        Ok(report)
    }
}
