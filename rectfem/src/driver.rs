//! Run a task over successive mesh generations
//!
//! Each generation assembles and solves the task, measures the L2 error
//! against the known answer, reads the probes and optionally fits a spline
//! through the solution. The mesh is doubled before the next generation.

use crate::basis::ElementFamily;
use crate::config::TaskConfig;
use crate::error::Result;
use crate::postprocess::{Field, ProbeReading};
use crate::problem::Coefficients;
use crate::solver::solve;
use crate::spline::build_spline;
use serde::Serialize;

/// Spline fitted through one generation's solution
#[derive(Debug, Clone, Serialize)]
pub struct SplineReport {
    pub unknowns: usize,
    pub iterations: usize,
    pub residual: f64,
    pub probes: Vec<ProbeReading>,
}

/// Outcome of one generation
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub generation: usize,
    pub nodes: [usize; 2],
    pub unknowns: usize,
    pub iterations: usize,
    pub residual: f64,
    pub converged: bool,
    /// `None` when the task has no known answer
    pub l2_error: Option<f64>,
    pub probes: Vec<ProbeReading>,
    pub spline: Option<SplineReport>,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub task: String,
    pub generations: Vec<GenerationReport>,
}

impl RunReport {
    /// Ratios of consecutive L2 errors, about 4 for second order convergence
    pub fn error_ratios(&self) -> Vec<f64> {
        self.generations
            .windows(2)
            .filter_map(|w| Some(w[0].l2_error? / w[1].l2_error?))
            .collect()
    }
}

/// Run every generation of `config` with the built-in task it names
pub fn run(config: &TaskConfig) -> Result<RunReport> {
    run_with(config, &config.task)
}

/// Run every generation of `config` with custom coefficients
pub fn run_with<C>(config: &TaskConfig, coeffs: &C) -> Result<RunReport>
where
    C: Coefficients + ?Sized,
{
    let assembler = config.assembler();
    let coords = assembler.coords;
    let mut mesh = config.build_mesh()?;
    let spline_mesh = config.spline.as_ref().map(|s| s.build_mesh()).transpose()?;

    log::info!(
        "Task '{}': {} generations, {:?} elements, {:?} coordinates",
        coeffs.description(),
        config.generations,
        assembler.family,
        coords
    );

    let mut generations = Vec::with_capacity(config.generations);
    for generation in 0..config.generations {
        if generation > 0 {
            mesh.double()?;
        }

        let slae = assembler.assemble(&mesh, coeffs)?;
        let solution = solve(&slae, &config.solver)?;
        let field = Field::new(&mesh, assembler.family, &solution.values);
        let l2_error = field.l2_error(coords, coeffs);
        if let Some(err) = l2_error {
            log::info!("Generation {generation}: L2 error {err:.6e}");
        }

        let spline = match (&config.spline, &spline_mesh) {
            (Some(spline), Some(target)) if assembler.family == ElementFamily::Bilinear => {
                let system = build_spline(&mesh, &solution.values, target, &spline.params)?;
                let fit = solve(&system, &config.solver)?;
                let surface = Field::new(target, ElementFamily::Hermite, &fit.values);
                Some(SplineReport {
                    unknowns: system.size(),
                    iterations: fit.iterations,
                    residual: fit.residual,
                    probes: surface.probe(&config.probes),
                })
            }
            (Some(_), _) => {
                log::warn!("Spline fitting needs nodal values, skipped for Hermite solutions");
                None
            }
            _ => None,
        };

        generations.push(GenerationReport {
            generation,
            nodes: [mesh.width(), mesh.height()],
            unknowns: slae.size(),
            iterations: solution.iterations,
            residual: solution.residual,
            converged: solution.converged,
            l2_error,
            probes: field.probe(&config.probes),
            spline,
        });
    }

    Ok(RunReport {
        task: coeffs.description().to_string(),
        generations,
    })
}
