//! Boundary condition handling for finite element problems
//!
//! Provides implementations for:
//! - Dirichlet (type 1) conditions, by elimination of the constrained dof
//! - Neumann (type 2) conditions, as edge integrals added to the rhs
//! - Robin (type 3) conditions, as edge mass matrices plus rhs integrals
//!
//! [`apply_boundary_conditions`] applies every type 2 record, then every
//! type 3 record, then every type 1 record, so the eliminated rows see all
//! other contributions. Edge terms are only added on edges next to an
//! element of some region; nodes outside every region stay pinned.

mod dirichlet;
mod neumann;
mod robin;

pub use dirichlet::*;
pub use neumann::*;
pub use robin::*;

use crate::error::Result;
use crate::mesh::{BoundaryCondition, BoundaryKind, Point, RectMesh, SegmentAxis};
use crate::problem::Coefficients;
use solvers::GlobalMatrix;

/// One refined edge of a boundary segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// First node (lower coordinate)
    pub n1: usize,
    /// Second node
    pub n2: usize,
    pub p1: Point,
    pub p2: Point,
    /// Edge length
    pub h: f64,
    /// Region of an element next to the edge, `None` outside every region
    pub region: Option<usize>,
}

/// Refined corner indices `(x1, x2, y1, y2)` of a boundary record
fn refined_extent(mesh: &RectMesh, bc: &BoundaryCondition) -> (usize, usize, usize, usize) {
    (
        mesh.x().refined_index(bc.x1),
        mesh.x().refined_index(bc.x2),
        mesh.y().refined_index(bc.y1),
        mesh.y().refined_index(bc.y2),
    )
}

/// Refined edges covered by a boundary record, in ascending order
///
/// Edges that border no region are returned too, with `region: None`.
pub fn segment_edges(mesh: &RectMesh, bc: &BoundaryCondition) -> Result<Vec<Edge>> {
    let axis = bc.segment_axis()?;
    let (x1, x2, y1, y2) = refined_extent(mesh, bc);

    let (nx, ny) = (mesh.x().intervals(), mesh.y().intervals());
    // elements on either side of the edge starting at (xa, ya)
    let region = |xa: usize, ya: usize| {
        let sides = match axis {
            SegmentAxis::AlongY => [
                xa.checked_sub(1).map(|x| (x, ya)),
                (xa < nx).then_some((xa, ya)),
            ],
            SegmentAxis::AlongX => [
                ya.checked_sub(1).map(|y| (xa, y)),
                (ya < ny).then_some((xa, ya)),
            ],
        };
        sides
            .into_iter()
            .flatten()
            .find_map(|(xi, yi)| mesh.subdomain_at_element(xi, yi))
    };
    let edge = |(xa, ya): (usize, usize), (xb, yb): (usize, usize)| {
        let p1 = mesh.node(xa, ya);
        let p2 = mesh.node(xb, yb);
        Edge {
            n1: mesh.node_index(xa, ya),
            n2: mesh.node_index(xb, yb),
            p1,
            p2,
            h: (p2.x - p1.x) + (p2.y - p1.y),
            region: region(xa, ya),
        }
    };

    Ok(match axis {
        SegmentAxis::AlongY => (y1..y2).map(|yi| edge((x1, yi), (x1, yi + 1))).collect(),
        SegmentAxis::AlongX => (x1..x2).map(|xi| edge((xi, y1), (xi + 1, y1))).collect(),
    })
}

/// Refined nodes covered by a boundary record, ends included
pub fn segment_nodes(mesh: &RectMesh, bc: &BoundaryCondition) -> Result<Vec<(usize, Point)>> {
    let axis = bc.segment_axis()?;
    let (x1, x2, y1, y2) = refined_extent(mesh, bc);

    let node = |xi: usize, yi: usize| (mesh.node_index(xi, yi), mesh.node(xi, yi));
    Ok(match axis {
        SegmentAxis::AlongY => (y1..=y2).map(|yi| node(x1, yi)).collect(),
        SegmentAxis::AlongX => (x1..=x2).map(|xi| node(xi, y1)).collect(),
    })
}

/// Apply all boundary records of `mesh` in the order 2, 3, 1
///
/// Every record is checked before anything is modified: an unknown type
/// tag or an extent degenerate in neither axis fails the whole pass.
pub fn apply_boundary_conditions<C, M>(
    mesh: &RectMesh,
    coeffs: &C,
    matrix: &mut M,
    rhs: &mut [f64],
) -> Result<()>
where
    C: Coefficients + ?Sized,
    M: GlobalMatrix + ?Sized,
{
    let mut records: Vec<(BoundaryKind, &BoundaryCondition)> = Vec::new();
    for bc in mesh.boundaries() {
        let kind = bc.boundary_kind()?;
        bc.segment_axis()?;
        records.push((kind, bc));
    }

    let of_kind = |kind: BoundaryKind| {
        records
            .iter()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, bc)| *bc)
    };

    for bc in of_kind(BoundaryKind::Neumann) {
        apply_neumann(mesh, coeffs, bc, rhs)?;
    }
    for bc in of_kind(BoundaryKind::Robin) {
        apply_robin(mesh, coeffs, bc, matrix, rhs)?;
    }
    let mut eliminated = 0;
    for bc in of_kind(BoundaryKind::Dirichlet) {
        eliminated += apply_dirichlet(mesh, coeffs, bc, matrix, rhs)?;
    }

    log::debug!(
        "Applied {} boundary records, {} dofs eliminated",
        records.len(),
        eliminated
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FemError;
    use crate::mesh::{AxisRefinement, RefineParams, Subdomain};
    use crate::problem::BuiltinTask;
    use solvers::DiagMatrix;

    fn bc(kind: u8, x1: usize, x2: usize, y1: usize, y2: usize) -> BoundaryCondition {
        BoundaryCondition {
            num: 0,
            kind,
            x1,
            x2,
            y1,
            y2,
        }
    }

    /// Region 0 covers the left coarse cell only
    fn mesh(boundaries: Vec<BoundaryCondition>) -> RectMesh {
        let left = Subdomain {
            num: 0,
            x1: 0,
            x2: 1,
            y1: 0,
            y2: 1,
        };
        let mut mesh = RectMesh::new(
            vec![0.0, 1.0, 2.0],
            vec![0.0, 3.0],
            vec![left],
            boundaries,
        )
        .unwrap();
        mesh.refine(&RefineParams {
            x: AxisRefinement::uniform(2, 2),
            y: AxisRefinement::uniform(1, 3),
        })
        .unwrap();
        mesh
    }

    #[test]
    fn test_segment_edges_follow_refinement() {
        let m = mesh(vec![]);
        // bottom edge from coarse x = 1 to x = 2
        let edges = segment_edges(&m, &bc(2, 1, 2, 0, 0)).unwrap();
        assert_eq!(edges.len(), 2);
        assert_eq!((edges[0].n1, edges[0].n2), (2, 3));
        assert_eq!((edges[1].n1, edges[1].n2), (3, 4));
        assert!((edges[0].h - 0.5).abs() < 1e-14);

        // right side, full height
        let edges = segment_edges(&m, &bc(2, 2, 2, 0, 1)).unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!((edges[2].n1, edges[2].n2), (14, 19));
        assert!((edges[2].h - 1.0).abs() < 1e-14);
    }

    #[test]
    fn test_edges_know_their_region() {
        let m = mesh(vec![]);
        let bottom = segment_edges(&m, &bc(2, 0, 2, 0, 0)).unwrap();
        let regions: Vec<Option<usize>> = bottom.iter().map(|e| e.region).collect();
        assert_eq!(regions, vec![Some(0), Some(0), None, None]);

        // the interior line x = 1 borders region 0 from the left
        let middle = segment_edges(&m, &bc(2, 1, 1, 0, 1)).unwrap();
        assert!(middle.iter().all(|e| e.region == Some(0)));
        let right = segment_edges(&m, &bc(2, 2, 2, 0, 1)).unwrap();
        assert!(right.iter().all(|e| e.region.is_none()));
    }

    #[test]
    fn test_edge_terms_skip_nodes_outside_regions() {
        // flux and exchange along the whole bottom and the uncovered right side
        let m = mesh(vec![bc(2, 0, 2, 0, 0), bc(3, 2, 2, 0, 1)]);
        let mut matrix = DiagMatrix::for_grid(m.width(), m.height());
        let mut rhs = vec![0.0; m.node_count()];
        apply_boundary_conditions(&m, &BuiltinTask::Linear, &mut matrix, &mut rhs).unwrap();

        // bottom nodes 0..=2 touch region 0, nodes 3 and 4 do not
        assert!(rhs[..3].iter().any(|&v| v != 0.0));
        for node in [3, 4, 9, 14, 19] {
            assert_eq!(rhs[node], 0.0, "node {node}");
            assert_eq!(matrix.get(node, node), 0.0, "node {node}");
            assert!(matrix.neighbours(node).iter().all(|&c| matrix.get(node, c) == 0.0));
        }
    }

    #[test]
    fn test_segment_nodes_include_ends() {
        let m = mesh(vec![]);
        let nodes: Vec<usize> = segment_nodes(&m, &bc(1, 0, 0, 0, 1))
            .unwrap()
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(nodes, vec![0, 5, 10, 15]);
    }

    #[test]
    fn test_malformed_records_fail_before_any_change() {
        let m = mesh(vec![bc(2, 0, 2, 0, 0), bc(1, 0, 1, 0, 1)]);
        let mut matrix = DiagMatrix::for_grid(m.width(), m.height());
        let mut rhs = vec![0.0; m.node_count()];
        let err = apply_boundary_conditions(
            &m,
            &crate::problem::BuiltinTask::Linear,
            &mut matrix,
            &mut rhs,
        )
        .unwrap_err();
        assert!(matches!(err, FemError::MalformedBoundary { .. }));
        assert!(rhs.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unknown_type_is_fatal() {
        let m = mesh(vec![bc(5, 0, 0, 0, 1)]);
        let mut matrix = DiagMatrix::for_grid(m.width(), m.height());
        let mut rhs = vec![0.0; m.node_count()];
        let err = apply_boundary_conditions(
            &m,
            &crate::problem::BuiltinTask::Linear,
            &mut matrix,
            &mut rhs,
        )
        .unwrap_err();
        assert!(matches!(err, FemError::UnknownBoundaryType { kind: 5, .. }));
    }
}
