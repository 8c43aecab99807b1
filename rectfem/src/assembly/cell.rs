//! Quadrature data of one mesh cell
//!
//! Shape values, physical gradients and integration weights are evaluated
//! once per cell and shared by the stiffness, mass and load integrals.

use crate::basis::{ElementFamily, ShapeValues, evaluate_shape};
use crate::coords::CoordSystem;
use crate::quadrature::QuadratureRule;

/// One quadrature point mapped onto a cell
#[derive(Debug, Clone)]
pub struct CellPoint {
    /// Reference coordinates in [0, 1]²
    pub reference: [f64; 2],
    /// Physical coordinates
    pub physical: [f64; 2],
    /// Rule weight times cell area times the coordinate Jacobian
    pub weight: f64,
    /// Basis values and physical gradients
    pub shape: ShapeValues,
}

/// A cell `[p0, p1]` of region `region` with its quadrature points
#[derive(Debug, Clone)]
pub struct CellQuadrature {
    pub p0: [f64; 2],
    pub p1: [f64; 2],
    pub region: usize,
    pub points: Vec<CellPoint>,
}

impl CellQuadrature {
    /// Evaluate `family` on the cell at every point of `rule`
    pub fn new(
        family: ElementFamily,
        coords: CoordSystem,
        rule: &QuadratureRule,
        p0: [f64; 2],
        p1: [f64; 2],
        region: usize,
    ) -> Self {
        let hx = p1[0] - p0[0];
        let hy = p1[1] - p0[1];
        let points = rule
            .iter()
            .map(|q| {
                let physical = [p0[0] + q.xi() * hx, p0[1] + q.eta() * hy];
                CellPoint {
                    reference: q.coords,
                    physical,
                    weight: q.weight * hx * hy * coords.weight(physical[0], physical[1]),
                    shape: evaluate_shape(family, q.xi(), q.eta(), hx, hy),
                }
            })
            .collect();

        Self {
            p0,
            p1,
            region,
            points,
        }
    }

    /// Number of local basis functions
    pub fn dofs(&self) -> usize {
        self.points.first().map_or(0, |p| p.shape.values.len())
    }

    /// Corners in local bilinear node order
    pub fn corners(&self) -> [[f64; 2]; 4] {
        let [x0, y0] = self.p0;
        let [x1, y1] = self.p1;
        [[x0, y0], [x1, y0], [x0, y1], [x1, y1]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_integrate_area() {
        let rule = QuadratureRule::order5();
        let cell = CellQuadrature::new(
            ElementFamily::Bilinear,
            CoordSystem::Cartesian,
            &rule,
            [1.0, 2.0],
            [3.0, 2.5],
            0,
        );
        let area: f64 = cell.points.iter().map(|p| p.weight).sum();
        assert!((area - 1.0).abs() < 1e-14);
        assert_eq!(cell.dofs(), 4);
    }

    #[test]
    fn test_axisymmetric_weights_integrate_volume() {
        let rule = QuadratureRule::order5();
        let cell = CellQuadrature::new(
            ElementFamily::Hermite,
            CoordSystem::Axisymmetric,
            &rule,
            [1.0, 0.0],
            [3.0, 1.0],
            0,
        );
        // ∫_1^3 r dr = 4
        let volume: f64 = cell.points.iter().map(|p| p.weight).sum();
        assert!((volume - 4.0).abs() < 1e-12);
        assert_eq!(cell.dofs(), 16);
    }
}
