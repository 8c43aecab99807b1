//! Evaluation of solved fields
//!
//! A [`Field`] pairs a mesh with a dof vector and evaluates values and
//! gradients at arbitrary points, and L2 errors against a known answer.

use crate::basis::{ElementFamily, evaluate_shape};
use crate::coords::CoordSystem;
use crate::mesh::{Point, RectMesh};
use crate::problem::Coefficients;
use crate::quadrature::QuadratureRule;
use serde::Serialize;

/// Value and gradient of a field at a probe point
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeReading {
    pub point: Point,
    /// `None` outside the mesh
    pub value: Option<f64>,
    pub gradient: Option<[f64; 2]>,
}

/// A finite element function on a mesh
#[derive(Debug, Clone, Copy)]
pub struct Field<'a> {
    mesh: &'a RectMesh,
    family: ElementFamily,
    values: &'a [f64],
}

impl<'a> Field<'a> {
    /// Wrap a dof vector
    ///
    /// # Panics
    ///
    /// Panics if `values` does not hold one entry per dof of `mesh`.
    pub fn new(mesh: &'a RectMesh, family: ElementFamily, values: &'a [f64]) -> Self {
        assert_eq!(
            values.len(),
            mesh.node_count() * family.dofs_per_node(),
            "Dof vector does not match the mesh"
        );
        Self {
            mesh,
            family,
            values,
        }
    }

    pub fn mesh(&self) -> &RectMesh {
        self.mesh
    }

    /// Value and gradient at a point, `None` outside the mesh
    pub fn evaluate(&self, x: f64, y: f64) -> Option<(f64, [f64; 2])> {
        let (xi, yi) = self.mesh.locate_element(x, y)?;
        let (p0, p1) = self.mesh.element_bounds(xi, yi);
        let (hx, hy) = (p1[0] - p0[0], p1[1] - p0[1]);
        let shape = evaluate_shape(self.family, (x - p0[0]) / hx, (y - p0[1]) / hy, hx, hy);

        let mut value = 0.0;
        let mut gradient = [0.0; 2];
        let dofs = self.family.element_dofs(xi, yi, self.mesh.width());
        for (k, &dof) in dofs.iter().enumerate() {
            let q = self.values[dof];
            value += q * shape.values[k];
            gradient[0] += q * shape.gradients[k][0];
            gradient[1] += q * shape.gradients[k][1];
        }
        Some((value, gradient))
    }

    pub fn value_at(&self, x: f64, y: f64) -> Option<f64> {
        self.evaluate(x, y).map(|(v, _)| v)
    }

    pub fn gradient_at(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        self.evaluate(x, y).map(|(_, g)| g)
    }

    /// Readings at every probe point
    pub fn probe(&self, points: &[Point]) -> Vec<ProbeReading> {
        points
            .iter()
            .map(|&point| {
                let reading = self.evaluate(point.x, point.y);
                ProbeReading {
                    point,
                    value: reading.map(|(v, _)| v),
                    gradient: reading.map(|(_, g)| g),
                }
            })
            .collect()
    }

    /// `‖u_h - u‖` in L2 over the elements of every region
    ///
    /// `None` when the task has no known answer.
    pub fn l2_error<C>(&self, coords: CoordSystem, coeffs: &C) -> Option<f64>
    where
        C: Coefficients + ?Sized,
    {
        let rule = QuadratureRule::order5();
        let width = self.mesh.width();
        let mut sum = 0.0;

        for (xi, yi) in self.mesh.elements() {
            let Some(region) = self.mesh.subdomain_at_element(xi, yi) else {
                continue;
            };
            let (p0, p1) = self.mesh.element_bounds(xi, yi);
            let (hx, hy) = (p1[0] - p0[0], p1[1] - p0[1]);
            let dofs = self.family.element_dofs(xi, yi, width);

            for q in rule.iter() {
                let (x, y) = (p0[0] + q.xi() * hx, p0[1] + q.eta() * hy);
                let shape = evaluate_shape(self.family, q.xi(), q.eta(), hx, hy);
                let uh: f64 = dofs
                    .iter()
                    .zip(&shape.values)
                    .map(|(&d, phi)| self.values[d] * phi)
                    .sum();
                let u = coeffs.answer(region, x, y)?;
                sum += q.weight * hx * hy * coords.weight(x, y) * (uh - u).powi(2);
            }
        }
        Some(sum.sqrt())
    }
}
