//! Robin (mixed) boundary conditions
//!
//! Implements `λ ∂u/∂n + β (u - u_β) = 0` on an edge. Robin BC adds:
//! - β * ∫_Γ φ_i φ_j dΓ to the matrix (edge mass matrix)
//! - β * ∫_Γ u_β φ_i dΓ to the rhs, u_β interpolated linearly

use super::segment_edges;
use crate::error::Result;
use crate::mesh::{BoundaryCondition, RectMesh};
use crate::problem::Coefficients;
use solvers::GlobalMatrix;

/// Add the edge terms of one type 3 record on edges next to some region
pub fn apply_robin<C, M>(
    mesh: &RectMesh,
    coeffs: &C,
    bc: &BoundaryCondition,
    matrix: &mut M,
    rhs: &mut [f64],
) -> Result<()>
where
    C: Coefficients + ?Sized,
    M: GlobalMatrix + ?Sized,
{
    let beta = coeffs.robin_beta(bc.num);

    for edge in segment_edges(mesh, bc)?.into_iter().filter(|e| e.region.is_some()) {
        let (n1, n2) = (edge.n1, edge.n2);
        let bh = beta * edge.h;

        matrix.add(n1, n1, bh / 3.0);
        matrix.add(n2, n2, bh / 3.0);
        matrix.add(n1, n2, bh / 6.0);
        matrix.add(n2, n1, bh / 6.0);

        let u1 = coeffs.robin_value(bc.num, edge.p1.x, edge.p1.y);
        let u2 = coeffs.robin_value(bc.num, edge.p2.x, edge.p2.y);
        rhs[n1] += bh * (2.0 * u1 + u2) / 6.0;
        rhs[n2] += bh * (u1 + 2.0 * u2) / 6.0;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Subdomain;
    use crate::problem::BuiltinTask;
    use approx::assert_relative_eq;
    use solvers::{DiagMatrix, MsrMatrix};

    fn left_side() -> (RectMesh, BoundaryCondition) {
        let bc = BoundaryCondition {
            num: 0,
            kind: 3,
            x1: 0,
            x2: 0,
            y1: 0,
            y2: 1,
        };
        let whole = Subdomain {
            num: 0,
            x1: 0,
            x2: 1,
            y1: 0,
            y2: 1,
        };
        let mesh =
            RectMesh::new(vec![0.0, 1.0], vec![0.0, 0.5], vec![whole], vec![bc]).unwrap();
        (mesh, bc)
    }

    #[test]
    fn test_edge_mass_entries() {
        let (mesh, bc) = left_side();
        let mut matrix = DiagMatrix::for_grid(mesh.width(), mesh.height());
        let mut rhs = vec![0.0; mesh.node_count()];
        apply_robin(&mesh, &BuiltinTask::Linear, &bc, &mut matrix, &mut rhs).unwrap();

        // β = 2, h = 0.5 between nodes 0 and 2
        assert_relative_eq!(matrix.get(0, 0), 1.0 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(matrix.get(2, 2), 1.0 / 3.0, epsilon = 1e-15);
        assert_relative_eq!(matrix.get(0, 2), 1.0 / 6.0, epsilon = 1e-15);
        assert_relative_eq!(matrix.get(2, 0), 1.0 / 6.0, epsilon = 1e-15);
        assert_eq!(matrix.get(1, 1), 0.0);
        assert_eq!(rhs[1], 0.0);
    }

    #[test]
    fn test_rhs_uses_two_point_weights() {
        let (mesh, bc) = left_side();
        let elems = [vec![0usize, 1, 2, 3]];
        let mut matrix = MsrMatrix::from_element_dofs(4, elems.iter().map(|d| d.as_slice()));
        let mut rhs = vec![0.0; 4];
        let task = BuiltinTask::Quadratic;
        apply_robin(&mesh, &task, &bc, &mut matrix, &mut rhs).unwrap();

        let beta = 2.0;
        let h = 0.5;
        let ub = |y: f64| task.robin_value(0, 0.0, y);
        assert_relative_eq!(rhs[0], beta * h * (2.0 * ub(0.0) + ub(0.5)) / 6.0, epsilon = 1e-15);
        assert_relative_eq!(rhs[2], beta * h * (ub(0.0) + 2.0 * ub(0.5)) / 6.0, epsilon = 1e-15);
    }
}
