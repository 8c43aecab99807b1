//! Neumann (natural) boundary conditions
//!
//! A prescribed flux θ adds `∫_Γ θ φ_i dΓ` to the rhs. θ is interpolated
//! linearly along each edge, which gives the two-point weights
//! `h (2θ1 + θ2) / 6` and `h (θ1 + 2θ2) / 6`.

use super::segment_edges;
use crate::error::Result;
use crate::mesh::{BoundaryCondition, RectMesh};
use crate::problem::Coefficients;

/// Add the flux integrals of one type 2 record to `rhs`, skipping edges
/// outside every region
pub fn apply_neumann<C>(
    mesh: &RectMesh,
    coeffs: &C,
    bc: &BoundaryCondition,
    rhs: &mut [f64],
) -> Result<()>
where
    C: Coefficients + ?Sized,
{
    for edge in segment_edges(mesh, bc)?.into_iter().filter(|e| e.region.is_some()) {
        let k1 = coeffs.neumann(bc.num, edge.p1.x, edge.p1.y);
        let k2 = coeffs.neumann(bc.num, edge.p2.x, edge.p2.y);
        rhs[edge.n1] += edge.h * (2.0 * k1 + k2) / 6.0;
        rhs[edge.n2] += edge.h * (k1 + 2.0 * k2) / 6.0;
    }
    Ok(())
}
