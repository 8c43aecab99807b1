//! Dirichlet (essential) boundary conditions
//!
//! Implements u = g by eliminating the constrained dof: its column is moved
//! to the rhs, then its row and column are cleared and the diagonal set to
//! one. The matrix stays symmetric when it was symmetric before.

use super::segment_nodes;
use crate::error::Result;
use crate::mesh::{BoundaryCondition, RectMesh};
use crate::problem::Coefficients;
use solvers::GlobalMatrix;

/// Fix dof `m` to `value`
pub fn eliminate_dof<M>(matrix: &mut M, rhs: &mut [f64], m: usize, value: f64)
where
    M: GlobalMatrix + ?Sized,
{
    for t in matrix.neighbours(m) {
        rhs[t] -= value * matrix.get(t, m);
        matrix.set(t, m, 0.0);
        matrix.set(m, t, 0.0);
    }
    matrix.diagonal_mut()[m] = 1.0;
    rhs[m] = value;
}

/// Eliminate every node of one type 1 record, returning how many were fixed
pub fn apply_dirichlet<C, M>(
    mesh: &RectMesh,
    coeffs: &C,
    bc: &BoundaryCondition,
    matrix: &mut M,
    rhs: &mut [f64],
) -> Result<usize>
where
    C: Coefficients + ?Sized,
    M: GlobalMatrix + ?Sized,
{
    let nodes = segment_nodes(mesh, bc)?;
    for &(m, p) in &nodes {
        let value = coeffs.dirichlet(bc.num, p.x, p.y);
        eliminate_dof(matrix, rhs, m, value);
    }
    Ok(nodes.len())
}
