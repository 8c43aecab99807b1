//! Smoothing bicubic spline through a solved field
//!
//! Fits Hermite dofs on a uniform target mesh to nodal samples of a source
//! mesh by minimising
//!
//! ```text
//! w Σ_p (s(p) - v_p)² + α ∫ |∇s|² dΩ + β ∫ s² dΩ
//! ```
//!
//! Each sample belongs to the single target element that
//! [`RectMesh::locate_element`] returns for it. Samples outside the target
//! mesh are ignored.

use crate::assembly::{CellQuadrature, Slae, local_mass, local_stiffness};
use crate::basis::{ElementFamily, bicubic};
use crate::coords::CoordSystem;
use crate::error::{FemError, Result};
use crate::mesh::RectMesh;
use crate::problem::Coefficients;
use crate::quadrature::QuadratureRule;
use serde::{Deserialize, Serialize};
use solvers::MsrMatrix;
use std::time::Instant;

fn default_weight() -> f64 {
    0.9
}

/// Weights of the spline functional
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplineParams {
    /// Gradient penalty α
    #[serde(default)]
    pub alpha: f64,
    /// Value penalty β
    #[serde(default)]
    pub beta: f64,
    /// Weight w of every sample
    #[serde(default = "default_weight")]
    pub w: f64,
}

impl Default for SplineParams {
    fn default() -> Self {
        Self {
            alpha: 0.0,
            beta: 0.0,
            w: default_weight(),
        }
    }
}

/// Penalty terms expressed as an equation with λ = α and γ = β
struct Smoothing(SplineParams);

impl Coefficients for Smoothing {
    fn lambda(&self, _: usize, _: f64, _: f64) -> f64 {
        self.0.alpha
    }
    fn gamma(&self, _: usize, _: f64, _: f64) -> f64 {
        self.0.beta
    }
    fn source(&self, _: usize, _: f64, _: f64) -> f64 {
        0.0
    }
    fn dirichlet(&self, _: usize, _: f64, _: f64) -> f64 {
        0.0
    }
    fn neumann(&self, _: usize, _: f64, _: f64) -> f64 {
        0.0
    }
    fn robin_beta(&self, _: usize) -> f64 {
        0.0
    }
    fn robin_value(&self, _: usize, _: f64, _: f64) -> f64 {
        0.0
    }
}

/// Build the spline system on `target` from nodal `values` of `source`
pub fn build_spline(
    source: &RectMesh,
    values: &[f64],
    target: &RectMesh,
    params: &SplineParams,
) -> Result<Slae> {
    if values.len() != source.node_count() {
        return Err(FemError::SampleMismatch {
            expected: source.node_count(),
            got: values.len(),
        });
    }
    target.ensure_uniform()?;
    let start = Instant::now();

    let family = ElementFamily::Hermite;
    let width = target.width();
    let maps: Vec<Vec<usize>> = target
        .elements()
        .map(|(xi, yi)| family.element_dofs(xi, yi, width))
        .collect();
    let size = target.node_count() * family.dofs_per_node();
    let mut matrix = MsrMatrix::from_element_dofs(size, maps.iter().map(|d| d.as_slice()));
    let mut rhs = vec![0.0; size];

    if params.alpha != 0.0 || params.beta != 0.0 {
        let rule = QuadratureRule::default();
        let smoothing = Smoothing(*params);
        for ((xi, yi), dofs) in target.elements().zip(&maps) {
            let (p0, p1) = target.element_bounds(xi, yi);
            let cell = CellQuadrature::new(family, CoordSystem::Cartesian, &rule, p0, p1, 0);
            let local = local_stiffness(&cell, &smoothing) + local_mass(&cell, &smoothing);
            matrix.scatter(dofs, &local);
        }
    }

    let mut used = 0;
    for yi in 0..source.height() {
        for xi in 0..source.width() {
            let p = source.node(xi, yi);
            let Some((ex, ey)) = target.locate_element(p.x, p.y) else {
                continue;
            };
            let (p0, p1) = target.element_bounds(ex, ey);
            let phi = bicubic((p.x - p0[0]) / (p1[0] - p0[0]), (p.y - p0[1]) / (p1[1] - p0[1]));
            let v = values[source.node_index(xi, yi)];
            let dofs = family.element_dofs(ex, ey, width);

            for (i, &row) in dofs.iter().enumerate() {
                for (j, &col) in dofs.iter().enumerate() {
                    matrix.add(row, col, params.w * phi[i] * phi[j]);
                }
                rhs[row] += params.w * v * phi[i];
            }
            used += 1;
        }
    }

    // dofs no sample or penalty reaches
    for (row, d) in matrix.diagonal_mut().iter_mut().enumerate() {
        if *d == 0.0 {
            *d = 1.0;
            rhs[row] = 0.0;
        }
    }

    log::info!(
        "Spline system: {} unknowns from {} samples in {:.1}ms",
        size,
        used,
        start.elapsed().as_secs_f64() * 1000.0
    );
    Ok(Slae {
        matrix: matrix.into(),
        rhs,
    })
}
