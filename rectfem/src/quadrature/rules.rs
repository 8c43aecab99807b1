//! Quadrature rule selection for rectangular cells

use super::gauss::{QuadraturePoint, gauss_unit_square};

/// Points per axis of the rule used for element matrices (exact to degree 5)
pub const ELEMENT_ORDER: usize = 3;

/// Tensor Gauss rule on the unit square
#[derive(Debug, Clone)]
pub struct QuadratureRule {
    /// Points per axis
    pub order: usize,
    /// Quadrature points and weights on [0, 1]²
    pub points: Vec<QuadraturePoint>,
}

impl QuadratureRule {
    /// Create a rule with `order` points per axis
    pub fn new(order: usize) -> Self {
        Self {
            order,
            points: gauss_unit_square(order),
        }
    }

    /// The 3×3 rule used by the assembler
    pub fn order5() -> Self {
        Self::new(ELEMENT_ORDER)
    }

    /// Number of quadrature points
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Iterator over quadrature points
    pub fn iter(&self) -> impl Iterator<Item = &QuadraturePoint> {
        self.points.iter()
    }

    /// Integrate `f` over the cell `[x0, x1] × [y0, y1]`
    ///
    /// `f` receives the reference point in [0, 1]² and the physical point.
    pub fn integrate<F>(&self, p0: [f64; 2], p1: [f64; 2], mut f: F) -> f64
    where
        F: FnMut([f64; 2], [f64; 2]) -> f64,
    {
        let hx = p1[0] - p0[0];
        let hy = p1[1] - p0[1];
        let sum: f64 = self
            .points
            .iter()
            .map(|q| {
                let physical = [p0[0] + q.xi() * hx, p0[1] + q.eta() * hy];
                q.weight * f(q.coords, physical)
            })
            .sum();
        sum * hx * hy
    }
}

impl Default for QuadratureRule {
    fn default() -> Self {
        Self::order5()
    }
}

/// Minimum points per axis to integrate a polynomial of `degree` per axis exactly
///
/// Gauss quadrature of order n integrates polynomials of degree 2n-1 exactly
pub fn required_order(degree: usize) -> usize {
    degree / 2 + 1
}
