//! PDE coefficients of a task
//!
//! The equation is `-div(λ ∇u) + γ u = f` with boundary data per boundary
//! number: `u = g` (type 1), `λ ∂u/∂n = θ` (type 2) and
//! `λ ∂u/∂n + β (u - u_β) = 0` (type 3). The assembler never interprets
//! these values; it only samples them.

use crate::coords::CoordSystem;
use serde::{Deserialize, Serialize};

/// Supplier of the equation coefficients and boundary data
///
/// Element integrals may be evaluated from several threads at once.
pub trait Coefficients: Sync {
    /// Short human-readable name
    fn description(&self) -> &str {
        "custom task"
    }

    /// Diffusion coefficient λ of `region` at a point
    fn lambda(&self, region: usize, x: f64, y: f64) -> f64;

    /// Reaction coefficient γ of `region` at a point
    fn gamma(&self, region: usize, x: f64, y: f64) -> f64;

    /// Source f of `region` at a point
    fn source(&self, region: usize, x: f64, y: f64) -> f64;

    /// Prescribed value g of a type 1 boundary
    fn dirichlet(&self, boundary: usize, x: f64, y: f64) -> f64;

    /// Prescribed flux θ of a type 2 boundary
    fn neumann(&self, boundary: usize, x: f64, y: f64) -> f64;

    /// Exchange coefficient β of a type 3 boundary
    fn robin_beta(&self, boundary: usize) -> f64;

    /// Ambient value u_β of a type 3 boundary
    fn robin_value(&self, boundary: usize, x: f64, y: f64) -> f64;

    /// Exact solution, when known
    fn answer(&self, _region: usize, _x: f64, _y: f64) -> Option<f64> {
        None
    }
}

/// Outward normal of boundary `boundary` of a rectangle
///
/// Boundary numbers repeat the pattern left (-x), right (+x), bottom (-y),
/// top (+y).
pub fn outward_normal(boundary: usize) -> [f64; 2] {
    match boundary % 4 {
        0 => [-1.0, 0.0],
        1 => [1.0, 0.0],
        2 => [0.0, -1.0],
        _ => [0.0, 1.0],
    }
}

const ROBIN_BETA: f64 = 2.0;

/// Manufactured tasks with a known answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuiltinTask {
    /// `u = 2x + 3y + 1` with γ = 1, exact for bilinear elements in (x, y)
    #[default]
    Linear,
    /// `u = 3z + 1` with γ = 1, exact for bilinear elements in (r, z)
    LinearZ,
    /// `u = x² + y²` with γ = 0, not representable by bilinear elements
    Quadratic,
}

impl BuiltinTask {
    /// Coordinate system the task is written for
    pub fn coords(self) -> CoordSystem {
        match self {
            BuiltinTask::LinearZ => CoordSystem::Axisymmetric,
            BuiltinTask::Linear | BuiltinTask::Quadratic => CoordSystem::Cartesian,
        }
    }

    fn u(self, x: f64, y: f64) -> f64 {
        match self {
            BuiltinTask::Linear => 2.0 * x + 3.0 * y + 1.0,
            BuiltinTask::LinearZ => 3.0 * y + 1.0,
            BuiltinTask::Quadratic => x * x + y * y,
        }
    }

    fn grad(self, x: f64, y: f64) -> [f64; 2] {
        match self {
            BuiltinTask::Linear => [2.0, 3.0],
            BuiltinTask::LinearZ => [0.0, 3.0],
            BuiltinTask::Quadratic => [2.0 * x, 2.0 * y],
        }
    }

    fn flux(self, boundary: usize, x: f64, y: f64) -> f64 {
        let n = outward_normal(boundary);
        let g = self.grad(x, y);
        self.lambda(0, x, y) * (g[0] * n[0] + g[1] * n[1])
    }
}

impl Coefficients for BuiltinTask {
    fn description(&self) -> &str {
        match self {
            BuiltinTask::Linear => "u = 2x + 3y + 1",
            BuiltinTask::LinearZ => "u = 3z + 1 (axisymmetric)",
            BuiltinTask::Quadratic => "u = x^2 + y^2",
        }
    }

    fn lambda(&self, _region: usize, _x: f64, _y: f64) -> f64 {
        1.0
    }

    fn gamma(&self, _region: usize, _x: f64, _y: f64) -> f64 {
        match self {
            BuiltinTask::Linear | BuiltinTask::LinearZ => 1.0,
            BuiltinTask::Quadratic => 0.0,
        }
    }

    fn source(&self, region: usize, x: f64, y: f64) -> f64 {
        let reaction = self.gamma(region, x, y) * self.u(x, y);
        match self {
            BuiltinTask::Linear | BuiltinTask::LinearZ => reaction,
            BuiltinTask::Quadratic => reaction - 4.0 * self.lambda(region, x, y),
        }
    }

    fn dirichlet(&self, _boundary: usize, x: f64, y: f64) -> f64 {
        self.u(x, y)
    }

    fn neumann(&self, boundary: usize, x: f64, y: f64) -> f64 {
        self.flux(boundary, x, y)
    }

    fn robin_beta(&self, _boundary: usize) -> f64 {
        ROBIN_BETA
    }

    fn robin_value(&self, boundary: usize, x: f64, y: f64) -> f64 {
        self.u(x, y) + self.flux(boundary, x, y) / ROBIN_BETA
    }

    fn answer(&self, _region: usize, x: f64, y: f64) -> Option<f64> {
        Some(self.u(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_robin_value_balances_flux() {
        let task = BuiltinTask::Linear;
        for boundary in 0..4 {
            let (x, y) = (0.5, 0.25);
            let u = task.answer(0, x, y).unwrap();
            let beta = task.robin_beta(boundary);
            let residual = task.neumann(boundary, x, y) + beta * (u - task.robin_value(boundary, x, y));
            assert!(residual.abs() < 1e-14);
        }
    }

    #[test]
    fn test_linear_fluxes() {
        let task = BuiltinTask::Linear;
        assert_eq!(task.neumann(0, 0.0, 0.0), -2.0);
        assert_eq!(task.neumann(1, 0.0, 0.0), 2.0);
        assert_eq!(task.neumann(2, 0.0, 0.0), -3.0);
        assert_eq!(task.neumann(3, 0.0, 0.0), 3.0);
    }

    #[test]
    fn test_quadratic_source() {
        let task = BuiltinTask::Quadratic;
        assert_eq!(task.source(0, 1.0, 2.0), -4.0);
        assert_eq!(task.coords(), CoordSystem::Cartesian);
        assert_eq!(BuiltinTask::LinearZ.coords(), CoordSystem::Axisymmetric);
    }
}
