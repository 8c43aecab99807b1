//! Benchmark: assembly and solve scaling on a unit square
//!
//! Tests how the pipeline scales with:
//! 1. Mesh size (number of nodes)
//! 2. Matrix format (band vs general sparse rows)
//! 3. Solver backend (host vs accelerator)
//!
//! Run with:
//!   cargo bench -p rectfem --bench assemble_solve

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rectfem::assembly::{Assembler, MatrixFormat};
use rectfem::basis::ElementFamily;
use rectfem::coords::CoordSystem;
use rectfem::mesh::{AxisRefinement, BoundaryCondition, RectMesh, RefineParams, Subdomain};
use rectfem::problem::BuiltinTask;
use rectfem::solver::{Backend, SolverConfig, solve};
use std::time::Duration;

/// Unit square with Dirichlet data on the left and bottom sides
fn unit_square(n: usize) -> RectMesh {
    let side = |num, x1, x2, y1, y2| BoundaryCondition {
        num,
        kind: 1,
        x1,
        x2,
        y1,
        y2,
    };
    let mut mesh = RectMesh::new(
        vec![0.0, 1.0],
        vec![0.0, 1.0],
        vec![Subdomain {
            num: 0,
            x1: 0,
            x2: 1,
            y1: 0,
            y2: 1,
        }],
        vec![side(0, 0, 0, 0, 1), side(2, 0, 1, 0, 0)],
    )
    .unwrap();
    mesh.refine(&RefineParams {
        x: AxisRefinement::uniform(1, n),
        y: AxisRefinement::uniform(1, n),
    })
    .unwrap();
    mesh
}

fn bench_assembly(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembly");
    group.warm_up_time(Duration::from_secs(2));
    group.measurement_time(Duration::from_secs(5));

    for &n in &[32, 64, 128, 256] {
        let mesh = unit_square(n);
        group.throughput(Throughput::Elements(mesh.node_count() as u64));

        for (name, format) in [("diag", MatrixFormat::Diag), ("msr", MatrixFormat::Msr)] {
            let assembler = Assembler::new(format, ElementFamily::Bilinear, CoordSystem::Cartesian);
            group.bench_with_input(BenchmarkId::new(name, n), &mesh, |b, mesh| {
                b.iter(|| black_box(assembler.assemble(mesh, &BuiltinTask::Quadratic).unwrap()));
            });
        }
    }

    group.finish();
}

fn bench_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("cg_ilu_solve");
    group.sample_size(10);

    for &n in &[32, 64, 128] {
        let mesh = unit_square(n);
        let slae = Assembler::new(MatrixFormat::Diag, ElementFamily::Bilinear, CoordSystem::Cartesian)
            .assemble(&mesh, &BuiltinTask::Quadratic)
            .unwrap();
        group.throughput(Throughput::Elements(slae.size() as u64));

        for (name, backend) in [("host", Backend::Host), ("device", Backend::Device)] {
            let config = SolverConfig {
                backend,
                tolerance: 1e-10,
                ..SolverConfig::default()
            };
            group.bench_with_input(BenchmarkId::new(name, n), &slae, |b, slae| {
                b.iter(|| black_box(solve(slae, &config).unwrap()));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, bench_assembly, bench_solve);
criterion_main!(benches);
