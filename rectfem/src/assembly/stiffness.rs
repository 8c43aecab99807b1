//! Element stiffness matrix
//!
//! K_ij = ∫ λ ∇φ_i · ∇φ_j J dΩ over one cell

use super::cell::CellQuadrature;
use crate::problem::Coefficients;
use ndarray::Array2;

/// Local stiffness matrix of a cell
pub fn local_stiffness<C>(cell: &CellQuadrature, coeffs: &C) -> Array2<f64>
where
    C: Coefficients + ?Sized,
{
    let n = cell.dofs();
    let mut k_local = Array2::zeros((n, n));

    for qp in &cell.points {
        let [x, y] = qp.physical;
        let scale = coeffs.lambda(cell.region, x, y) * qp.weight;
        let grads = &qp.shape.gradients;

        for i in 0..n {
            for j in 0..n {
                let dot = grads[i][0] * grads[j][0] + grads[i][1] * grads[j][1];
                k_local[[i, j]] += scale * dot;
            }
        }
    }

    k_local
}
