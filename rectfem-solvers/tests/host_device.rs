//! Host and device solvers must produce the same bits

use approx::assert_relative_eq;
use ndarray::Array1;
use rectfem_solvers::{
    ComputeMatrix, CpuDevice, DeviceBiCgstab, DeviceCg, DiagMatrix, HostBiCgstab, HostCg,
    MsrMatrix, PreconditionerKind, SlaeSolver, SolverError, lu_solve,
};

const KINDS: [PreconditionerKind; 3] = [
    PreconditionerKind::Identity,
    PreconditionerKind::Jacobi,
    PreconditionerKind::Ilu,
];

fn five_node_system() -> (ComputeMatrix, Vec<f64>) {
    let a = MsrMatrix::from_raw_parts(
        vec![1.0; 5],
        vec![0, 1, 2, 2, 2, 2],
        vec![1, 0],
        vec![0.5, 0.5],
    );
    (a.prepare_for_solve(), vec![1.5, 1.5, 1.0, 1.0, 1.0])
}

/// 9-point stencil with a skew part when `skew != 0`
fn stencil(width: usize, height: usize, skew: f64) -> DiagMatrix {
    let mut a = DiagMatrix::for_grid(width, height);
    for row in 0..a.size() {
        for col in a.neighbours(row) {
            let sign = if col > row { 1.0 } else { -1.0 };
            a.set(row, col, -1.0 + sign * skew);
        }
        a.diagonal_mut()[row] = 9.0;
    }
    a
}

fn rhs_for(a: &DiagMatrix) -> Vec<f64> {
    let x_true: Vec<f64> = (0..a.size()).map(|i| 1.0 + 0.25 * (i as f64).sin()).collect();
    a.multiply(&x_true)
}

#[test]
fn five_node_system_all_paths_agree() {
    let (a, b) = five_node_system();
    let dense = a.to_sparse().to_dense();
    let reference = lu_solve(&dense, &Array1::from_vec(b.clone())).unwrap();
    for xi in reference.iter() {
        assert_relative_eq!(*xi, 1.0, epsilon = 1e-12);
    }

    for kind in KINDS {
        let mut host_x = vec![0.0; 5];
        let mut device_x = vec![0.0; 5];
        let host = HostCg::new(100, 1e-12)
            .with_preconditioner(kind)
            .solve(&a, &b, &mut host_x)
            .unwrap();
        let device = DeviceCg::new(CpuDevice::new(), 100, 1e-12)
            .with_preconditioner(kind)
            .solve(&a, &b, &mut device_x)
            .unwrap();

        assert!(host.converged);
        assert_eq!(host, device);
        assert_eq!(host_x, device_x);
        for xi in &host_x {
            assert_relative_eq!(*xi, 1.0, epsilon = 1e-10);
        }

        let mut host_x = vec![0.0; 5];
        let mut device_x = vec![0.0; 5];
        let host = HostBiCgstab::new(100, 1e-12)
            .with_preconditioner(kind)
            .solve(&a, &b, &mut host_x)
            .unwrap();
        let device = DeviceBiCgstab::new(CpuDevice::new(), 100, 1e-12)
            .with_preconditioner(kind)
            .solve(&a, &b, &mut device_x)
            .unwrap();

        assert!(host.converged);
        assert_eq!(host, device);
        assert_eq!(host_x, device_x);
        for xi in &host_x {
            assert_relative_eq!(*xi, 1.0, epsilon = 1e-10);
        }
    }
}

#[test]
fn cg_on_stencil_is_bit_identical() {
    let a = stencil(23, 17, 0.0);
    let b = rhs_for(&a);
    let m = a.prepare_for_solve();

    for kind in KINDS {
        let mut host_x = vec![0.0; a.size()];
        let mut device_x = vec![0.0; a.size()];
        let host = HostCg::new(500, 1e-10)
            .with_preconditioner(kind)
            .solve(&m, &b, &mut host_x)
            .unwrap();
        let device = DeviceCg::new(CpuDevice::new(), 500, 1e-10)
            .with_preconditioner(kind)
            .solve(&m, &b, &mut device_x)
            .unwrap();

        assert!(host.converged, "{kind:?} did not converge");
        assert!(host.iterations > 1);
        assert_eq!(host, device);
        assert_eq!(host_x, device_x);
    }
}

#[test]
fn bicgstab_on_skew_stencil_is_bit_identical() {
    let a = stencil(19, 21, 0.1);
    let b = rhs_for(&a);
    let m = a.prepare_for_solve();

    for kind in KINDS {
        let mut host_x = vec![0.0; a.size()];
        let mut device_x = vec![0.0; a.size()];
        let host = HostBiCgstab::new(500, 1e-10)
            .with_preconditioner(kind)
            .solve(&m, &b, &mut host_x)
            .unwrap();
        let device = DeviceBiCgstab::new(CpuDevice::new(), 500, 1e-10)
            .with_preconditioner(kind)
            .solve(&m, &b, &mut device_x)
            .unwrap();

        assert!(host.converged, "{kind:?} did not converge");
        assert_eq!(host, device);
        assert_eq!(host_x, device_x);
    }
}

#[test]
fn iteration_cap_is_reported_identically() {
    let a = stencil(30, 30, 0.0);
    let b = rhs_for(&a);
    let m = a.prepare_for_solve();

    let mut host_x = vec![0.0; a.size()];
    let mut device_x = vec![0.0; a.size()];
    let host = HostCg::new(3, 1e-14)
        .with_preconditioner(PreconditionerKind::Identity)
        .solve(&m, &b, &mut host_x)
        .unwrap();
    let device = DeviceCg::new(CpuDevice::new(), 3, 1e-14)
        .with_preconditioner(PreconditionerKind::Identity)
        .solve(&m, &b, &mut device_x)
        .unwrap();

    assert!(!host.converged);
    assert_eq!(host.iterations, 3);
    assert_eq!(host, device);
    assert_eq!(host_x, device_x);
}

#[test]
fn device_transfers_only_at_entry_and_exit() {
    let a = stencil(12, 9, 0.0);
    let b = rhs_for(&a);
    let m = a.prepare_for_solve();
    let n = a.size();

    let mut solver = DeviceCg::new(CpuDevice::new(), 200, 1e-10);
    let mut x = vec![0.0; n];
    let report = solver.solve(&m, &b, &mut x).unwrap();
    assert!(report.converged);

    let stats = solver.device().stats();
    // matrix, ILU factors, rhs, initial guess
    assert_eq!(stats.uploads, 4);
    assert_eq!(stats.values_uploaded, 2 * m.value_count() + 2 * n);
    assert_eq!(stats.downloads, 1);
    assert_eq!(stats.values_downloaded, n);
    // ‖b‖, ‖r0‖, (r, z), then three per iteration except the last
    assert_eq!(stats.reductions, 3 * report.iterations + 2);

    let device = solver.into_device();
    assert_eq!(device.live_buffers(), 0);
    assert_eq!(device.live_matrices(), 0);
}

#[test]
fn device_solver_reuses_its_device() {
    let (a, b) = five_node_system();
    let mut solver = DeviceBiCgstab::new(CpuDevice::new(), 50, 1e-12);

    let mut first = vec![0.0; 5];
    let mut second = vec![0.0; 5];
    solver.solve(&a, &b, &mut first).unwrap();
    solver.device_mut().reset_stats();
    solver.solve(&a, &b, &mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(solver.device().stats().downloads, 1);
    assert_eq!(solver.device().live_buffers(), 0);
}

#[test]
fn zero_rhs_gives_zero_solution() {
    let a = stencil(5, 4, 0.0).prepare_for_solve();
    let b = vec![0.0; a.size()];
    let mut x = vec![3.0; a.size()];

    let report = DeviceCg::new(CpuDevice::new(), 10, 1e-8)
        .solve(&a, &b, &mut x)
        .unwrap();

    assert!(report.converged);
    assert_eq!(report.iterations, 0);
    assert!(x.iter().all(|&v| v == 0.0));
}

#[test]
fn length_mismatch_is_an_error_everywhere() {
    let (a, _) = five_node_system();
    let b = vec![1.0; 4];
    let mut x = vec![0.0; 5];
    let expected = Err(SolverError::LengthMismatch {
        expected: 5,
        got: 4,
    });

    assert_eq!(HostCg::new(10, 1e-8).solve(&a, &b, &mut x), expected);
    assert_eq!(HostBiCgstab::new(10, 1e-8).solve(&a, &b, &mut x), expected);

    let mut solver = DeviceCg::new(CpuDevice::new(), 10, 1e-8);
    assert_eq!(solver.solve(&a, &b, &mut x), expected);
    assert_eq!(solver.device().stats().uploads, 0);

    let mut solver = DeviceBiCgstab::new(CpuDevice::new(), 10, 1e-8);
    assert_eq!(solver.solve(&a, &b, &mut x), expected);
    assert_eq!(solver.device().live_buffers(), 0);
}
