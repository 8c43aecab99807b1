//! Recover a scalar coefficient from measured fields
//!
//! A parameter σ reaches the equation through a closure building the
//! coefficients. Given the field `E = -∇u` measured at a few sensors, the
//! fit minimises
//!
//! `J(σ) = Σ c_i |E*_i - E_i(σ)|² + α (σ - σ0)²` with `c_i = (w_i / |E*_i|)²`
//!
//! by Gauss-Newton steps. The sensitivity `∂E/∂σ` is a forward difference
//! and a step that does not lower `J` is halved.

use crate::config::TaskConfig;
use crate::driver::run_with;
use crate::error::{FemError, Result};
use crate::mesh::Point;
use crate::problem::Coefficients;
use serde::{Deserialize, Serialize};

fn default_relative_step() -> f64 {
    0.05
}

fn default_min_step_scale() -> f64 {
    0.25
}

fn default_tolerance() -> f64 {
    1e-8
}

fn default_max_iterations() -> usize {
    50
}

/// Measurements and stopping rules of a fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Starting value, also the centre σ0 of the regularisation term
    pub initial: f64,
    pub sensors: Vec<Point>,
    /// Measured field at each sensor
    pub measured: Vec<[f64; 2]>,
    /// Sensor weights, empty for all ones
    #[serde(default)]
    pub weights: Vec<f64>,
    /// Regularisation α
    #[serde(default)]
    pub alpha: f64,
    /// Forward difference step relative to σ
    #[serde(default = "default_relative_step")]
    pub relative_step: f64,
    /// Smallest fraction of the Gauss-Newton step tried before giving up
    #[serde(default = "default_min_step_scale")]
    pub min_step_scale: f64,
    /// Stop once an accepted move is below this fraction of σ
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

impl FitConfig {
    pub fn new(initial: f64, sensors: Vec<Point>, measured: Vec<[f64; 2]>) -> Self {
        Self {
            initial,
            sensors,
            measured,
            weights: Vec::new(),
            alpha: 0.0,
            relative_step: default_relative_step(),
            min_step_scale: default_min_step_scale(),
            tolerance: default_tolerance(),
            max_iterations: default_max_iterations(),
        }
    }

    /// Misfit weights `c_i`, after checking the measurements line up
    fn misfit_weights(&self) -> Result<Vec<f64>> {
        if self.sensors.is_empty() {
            return Err(FemError::InvalidFit("no sensors".into()));
        }
        if self.measured.len() != self.sensors.len() {
            return Err(FemError::InvalidFit(format!(
                "{} measurements for {} sensors",
                self.measured.len(),
                self.sensors.len()
            )));
        }
        if !self.weights.is_empty() && self.weights.len() != self.sensors.len() {
            return Err(FemError::InvalidFit(format!(
                "{} weights for {} sensors",
                self.weights.len(),
                self.sensors.len()
            )));
        }
        if !(self.initial > 0.0) || !(self.relative_step > 0.0) {
            return Err(FemError::InvalidFit(
                "the initial value and the difference step must be positive".into(),
            ));
        }

        Ok(self
            .measured
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let w = self.weights.get(i).copied().unwrap_or(1.0);
                let norm = e[0].hypot(e[1]);
                if norm > 0.0 { (w / norm).powi(2) } else { w * w }
            })
            .collect())
    }
}

/// Why a fit stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FitStop {
    /// The last accepted move was below the tolerance
    SmallStep,
    /// No fraction of the step lowered the functional
    StepExhausted,
    IterationLimit,
    /// The sensors do not see the parameter
    Insensitive,
}

/// One accepted parameter value
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FitStep {
    pub parameter: f64,
    pub functional: f64,
    /// Fraction of the Gauss-Newton step that was taken
    pub scale: f64,
}

/// Outcome of a fit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FitReport {
    pub parameter: f64,
    pub functional: f64,
    pub iterations: usize,
    pub stop: FitStop,
    /// Starting point first, then every accepted step
    pub history: Vec<FitStep>,
}

/// Field `-∇u` at `sensors` on the last generation of `task`
pub fn sensor_fields<C>(task: &TaskConfig, sensors: &[Point], coeffs: &C) -> Result<Vec<[f64; 2]>>
where
    C: Coefficients + ?Sized,
{
    let config = TaskConfig {
        probes: sensors.to_vec(),
        spline: None,
        ..task.clone()
    };
    let report = run_with(&config, coeffs)?;
    let last = report
        .generations
        .last()
        .ok_or_else(|| FemError::InvalidFit("the task has no generations".into()))?;

    last.probes
        .iter()
        .map(|reading| {
            reading
                .gradient
                .map(|[gx, gy]| [-gx, -gy])
                .ok_or(FemError::SensorOutsideMesh {
                    x: reading.point.x,
                    y: reading.point.y,
                })
        })
        .collect()
}

/// Fit the parameter fed to `make` against the measured fields
pub fn fit_coefficient<C, F>(task: &TaskConfig, fit: &FitConfig, make: F) -> Result<FitReport>
where
    C: Coefficients,
    F: Fn(f64) -> C,
{
    let c = fit.misfit_weights()?;
    let fields = |sigma: f64| sensor_fields(task, &fit.sensors, &make(sigma));
    let functional = |sigma: f64, e: &[[f64; 2]]| {
        let data: f64 = fit
            .measured
            .iter()
            .zip(e)
            .zip(&c)
            .map(|((m, e), c)| c * ((m[0] - e[0]).powi(2) + (m[1] - e[1]).powi(2)))
            .sum();
        data + fit.alpha * (sigma - fit.initial).powi(2)
    };

    let mut sigma = fit.initial;
    let mut e = fields(sigma)?;
    let mut j = functional(sigma, &e);
    let mut scale = 1.0;
    let mut history = vec![FitStep {
        parameter: sigma,
        functional: j,
        scale,
    }];
    log::info!(
        "Fitting against {} sensors from {sigma:.6e}, J = {j:.6e}",
        fit.sensors.len()
    );

    let mut iterations = 0;
    let stop = loop {
        if iterations == fit.max_iterations {
            break FitStop::IterationLimit;
        }
        iterations += 1;

        let h = fit.relative_step * sigma;
        let shifted = fields(sigma + h)?;
        let mut a = fit.alpha;
        let mut f = -fit.alpha * (sigma - fit.initial);
        for (((m, e0), e1), c) in fit.measured.iter().zip(&e).zip(&shifted).zip(&c) {
            let d = [(e1[0] - e0[0]) / h, (e1[1] - e0[1]) / h];
            a += c * (d[0] * d[0] + d[1] * d[1]);
            f += c * ((m[0] - e0[0]) * d[0] + (m[1] - e0[1]) * d[1]);
        }
        if a <= 0.0 {
            break FitStop::Insensitive;
        }
        let step = f / a;

        // the scale is kept for later iterations once reduced
        let accepted = loop {
            let candidate = sigma + scale * step;
            if candidate > 0.0 {
                let trial = fields(candidate)?;
                let jc = functional(candidate, &trial);
                if jc < j {
                    break Some((candidate, trial, jc));
                }
            }
            scale /= 2.0;
            if scale < fit.min_step_scale {
                break None;
            }
        };
        let Some((candidate, trial, jc)) = accepted else {
            break FitStop::StepExhausted;
        };

        let moved = (candidate - sigma).abs();
        sigma = candidate;
        e = trial;
        j = jc;
        history.push(FitStep {
            parameter: sigma,
            functional: j,
            scale,
        });
        log::debug!("Fit iteration {iterations}: σ = {sigma:.10e}, J = {j:.6e}, scale {scale}");

        if moved <= fit.tolerance * sigma.abs() {
            break FitStop::SmallStep;
        }
    };

    log::info!("Fit stopped ({stop:?}) after {iterations} iterations: σ = {sigma:.10e}, J = {j:.6e}");
    Ok(FitReport {
        parameter: sigma,
        functional: j,
        iterations,
        stop,
        history,
    })
}
