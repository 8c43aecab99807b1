//! Structural properties of assembled systems
//!
//! Both storage formats must hold the same values, boundary elimination
//! must keep the matrix symmetric, and host and accelerator solves must
//! agree bit for bit.

use rectfem::assembly::{Assembler, MatrixFormat, Slae};
use rectfem::basis::ElementFamily;
use rectfem::coords::CoordSystem;
use rectfem::mesh::{AxisRefinement, BoundaryCondition, RectMesh, RefineParams, Subdomain};
use rectfem::problem::BuiltinTask;
use rectfem::solver::{Backend, KrylovMethod, PreconditionerChoice, SolverConfig, solve};
use solvers::GlobalMatrix;

fn bc(num: usize, kind: u8, x1: usize, x2: usize, y1: usize, y2: usize) -> BoundaryCondition {
    BoundaryCondition {
        num,
        kind,
        x1,
        x2,
        y1,
        y2,
    }
}

/// L-shaped domain: the upper right coarse cell belongs to no region
fn l_shape() -> RectMesh {
    let region = |num, x1, x2, y1, y2| Subdomain {
        num,
        x1,
        x2,
        y1,
        y2,
    };
    let mut mesh = RectMesh::new(
        vec![0.0, 1.0, 2.5],
        vec![0.0, 0.5, 2.0],
        vec![region(0, 0, 2, 0, 1), region(1, 0, 1, 1, 2)],
        vec![
            bc(0, 1, 0, 0, 0, 2),
            bc(2, 2, 0, 2, 0, 0),
            bc(1, 3, 2, 2, 0, 1),
            bc(3, 3, 0, 1, 2, 2),
        ],
    )
    .unwrap();
    mesh.refine(&RefineParams {
        x: AxisRefinement {
            split_count: vec![4, 3],
            stretch_ratio: vec![1.1, 0.9],
        },
        y: AxisRefinement {
            split_count: vec![2, 5],
            stretch_ratio: vec![1.0, 1.25],
        },
    })
    .unwrap();
    mesh
}

fn assemble(format: MatrixFormat) -> Slae {
    Assembler::new(format, ElementFamily::Bilinear, CoordSystem::Cartesian)
        .assemble(&l_shape(), &BuiltinTask::Quadratic)
        .unwrap()
}

#[test]
fn test_formats_store_identical_values() {
    let diag = assemble(MatrixFormat::Diag);
    let msr = assemble(MatrixFormat::Msr);

    assert_eq!(diag.size(), msr.size());
    assert_eq!(diag.matrix.enumerate_nonzero(), msr.matrix.enumerate_nonzero());
    assert_eq!(diag.rhs, msr.rhs);
    for row in 0..diag.size() {
        assert_eq!(diag.matrix.row_entries(row), msr.matrix.row_entries(row));
    }
}

#[test]
fn test_formats_share_incomplete_factors() {
    let diag = assemble(MatrixFormat::Diag).matrix.ilu0();
    let msr = assemble(MatrixFormat::Msr).matrix.ilu0();

    let band = diag.enumerate_nonzero();
    let rows = msr.enumerate_nonzero();
    assert_eq!(band.len(), rows.len());
    for (b, r) in band.iter().zip(&rows) {
        assert!((b - r).abs() < 1e-12, "band {b} vs rows {r}");
    }

    // the factors are not the operator itself: pivots below the first row change
    let original = assemble(MatrixFormat::Diag).matrix;
    let changed = (0..original.size())
        .filter(|&i| (diag.diagonal()[i] - original.diagonal()[i]).abs() > 1e-12)
        .count();
    assert!(changed > 0);
}

#[test]
fn test_boundary_elimination_keeps_symmetry() {
    let mesh = l_shape();
    let slae = assemble(MatrixFormat::Msr);
    let dense = slae.matrix.to_dense();
    let n = slae.size();

    for r in 0..n {
        for c in 0..r {
            assert!(
                (dense[[r, c]] - dense[[c, r]]).abs() < 1e-14,
                "A[{r},{c}] = {} but A[{c},{r}] = {}",
                dense[[r, c]],
                dense[[c, r]]
            );
        }
    }

    // every left-side node is an identity row carrying its boundary value
    for yi in 0..mesh.height() {
        let m = mesh.node_index(0, yi);
        let y = mesh.node(0, yi).y;
        assert_eq!(dense[[m, m]], 1.0);
        assert_eq!(slae.rhs[m], y * y);
        for c in 0..n {
            if c != m {
                assert_eq!(dense[[m, c]], 0.0);
            }
        }
    }
}

#[test]
fn test_nodes_outside_regions_are_pinned() {
    let mesh = l_shape();
    let slae = assemble(MatrixFormat::Diag);

    // strictly inside the empty upper right cell
    let xi = mesh.x().refined_index(1) + 1;
    let yi = mesh.y().refined_index(1) + 1;
    let m = mesh.node_index(xi, yi);
    assert_eq!(slae.matrix.get(m, m), 1.0);
    assert_eq!(slae.rhs[m], 0.0);
    assert!(slae.matrix.neighbours(m).iter().all(|&c| slae.matrix.get(m, c) == 0.0));
}

#[test]
fn test_host_and_device_agree_bit_for_bit() {
    for format in [MatrixFormat::Diag, MatrixFormat::Msr] {
        let slae = assemble(format);
        for method in [KrylovMethod::Cg, KrylovMethod::Bicgstab] {
            for preconditioner in [
                PreconditionerChoice::Identity,
                PreconditionerChoice::Jacobi,
                PreconditionerChoice::Ilu,
            ] {
                let config = SolverConfig {
                    method,
                    preconditioner,
                    ..SolverConfig::default()
                };
                let host = solve(&slae, &config).unwrap();
                let device = solve(
                    &slae,
                    &SolverConfig {
                        backend: Backend::Device,
                        ..config.clone()
                    },
                )
                .unwrap();

                assert!(host.converged, "{format:?} {method:?} {preconditioner:?}");
                assert_eq!(host.iterations, device.iterations);
                assert_eq!(host.residual.to_bits(), device.residual.to_bits());
                assert_eq!(host.values, device.values);
            }
        }
    }
}

#[test]
fn test_refinement_keeps_coarse_points() {
    let mut mesh = l_shape();
    let coarse_x = mesh.x().coarse().to_vec();
    let coarse_y = mesh.y().coarse().to_vec();

    for _ in 0..3 {
        for (i, &c) in coarse_x.iter().enumerate() {
            assert_eq!(mesh.x().nodes()[mesh.x().refined_index(i)], c);
        }
        for (i, &c) in coarse_y.iter().enumerate() {
            assert_eq!(mesh.y().nodes()[mesh.y().refined_index(i)], c);
        }
        assert!(mesh.x().nodes().windows(2).all(|w| w[0] < w[1]));
        assert!(mesh.y().nodes().windows(2).all(|w| w[0] < w[1]));

        let before = (mesh.x().intervals(), mesh.y().intervals());
        mesh.double().unwrap();
        assert_eq!(mesh.x().intervals(), 2 * before.0);
        assert_eq!(mesh.y().intervals(), 2 * before.1);
    }
}

#[test]
fn test_doubling_splits_each_step_in_two() {
    // with ratio q the halves of one step have ratio sqrt(q)
    let mut mesh = RectMesh::rectangle(vec![0.0, 3.0], vec![0.0, 1.0]).unwrap();
    mesh.refine(&RefineParams {
        x: AxisRefinement {
            split_count: vec![2],
            stretch_ratio: vec![4.0],
        },
        y: AxisRefinement::uniform(1, 1),
    })
    .unwrap();
    let x = mesh.x().nodes();
    assert_eq!(x.len(), 3);
    assert!((x[1] - 0.6).abs() < 1e-12);
    assert_eq!(x[2], 3.0);

    mesh.double().unwrap();
    let x = mesh.x().nodes();
    assert_eq!(x.len(), 5);
    let steps: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    for pair in steps.windows(2) {
        assert!((pair[1] / pair[0] - 2.0).abs() < 1e-12);
    }
    assert!((x[2] - 0.6).abs() < 1e-12);
}
