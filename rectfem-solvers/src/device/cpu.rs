//! Reference accelerator backed by host memory and rayon worker threads

use super::Accelerator;
use crate::error::SolverError;
use crate::kernels;
use crate::sparse::ComputeMatrix;

/// Handle to a [`CpuDevice`] vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(usize);

/// Handle to a [`CpuDevice`] matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatrixId(usize);

/// Counters of host↔device traffic
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferStats {
    /// Vector and matrix uploads
    pub uploads: usize,
    /// Vector downloads
    pub downloads: usize,
    /// Values copied to the device
    pub values_uploaded: usize,
    /// Values copied back to the host
    pub values_downloaded: usize,
    /// Scalar reductions read back
    pub reductions: usize,
    /// Kernels launched
    pub kernels: usize,
}

/// Accelerator whose memory is host memory
///
/// Buffers live in slots addressed by [`BufferId`]; a released slot is never
/// reused, so a stale handle is reported instead of aliasing a new buffer.
#[derive(Debug, Default)]
pub struct CpuDevice {
    buffers: Vec<Option<Vec<f64>>>,
    matrices: Vec<Option<ComputeMatrix>>,
    stats: TransferStats,
}

impl CpuDevice {
    /// Create an empty device
    pub fn new() -> Self {
        Self::default()
    }

    /// Traffic since creation or the last [`reset_stats`](Self::reset_stats)
    pub fn stats(&self) -> TransferStats {
        self.stats
    }

    /// Zero the traffic counters
    pub fn reset_stats(&mut self) {
        self.stats = TransferStats::default();
    }

    /// Number of vectors currently allocated
    pub fn live_buffers(&self) -> usize {
        self.buffers.iter().filter(|b| b.is_some()).count()
    }

    /// Number of matrices currently resident
    pub fn live_matrices(&self) -> usize {
        self.matrices.iter().filter(|m| m.is_some()).count()
    }

    fn buffer(&self, id: BufferId) -> Result<&[f64], SolverError> {
        self.buffers
            .get(id.0)
            .and_then(|b| b.as_deref())
            .ok_or(SolverError::UnknownBuffer(id.0))
    }

    fn take(&mut self, id: BufferId) -> Result<Vec<f64>, SolverError> {
        self.buffers
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(SolverError::UnknownBuffer(id.0))
    }

    fn put(&mut self, id: BufferId, data: Vec<f64>) {
        self.buffers[id.0] = Some(data);
    }

    fn matrix(&self, id: MatrixId) -> Result<&ComputeMatrix, SolverError> {
        self.matrices
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(SolverError::UnknownMatrix(id.0))
    }

    /// Run a kernel writing `out` while reading other device state
    fn with_output<F>(&mut self, out: BufferId, kernel: F) -> Result<(), SolverError>
    where
        F: FnOnce(&Self, &mut [f64]) -> Result<(), SolverError>,
    {
        let mut data = self.take(out)?;
        let result = kernel(&*self, &mut data);
        self.put(out, data);
        self.stats.kernels += 1;
        result
    }
}

impl Accelerator for CpuDevice {
    type Buffer = BufferId;
    type Matrix = MatrixId;

    fn name(&self) -> &str {
        "cpu"
    }

    fn alloc(&mut self, len: usize) -> BufferId {
        self.buffers.push(Some(vec![0.0; len]));
        BufferId(self.buffers.len() - 1)
    }

    fn release(&mut self, buffer: BufferId) -> Result<(), SolverError> {
        self.take(buffer).map(drop)
    }

    fn upload(&mut self, host: &[f64], buffer: BufferId) -> Result<(), SolverError> {
        let dst = self
            .buffers
            .get_mut(buffer.0)
            .and_then(Option::as_mut)
            .ok_or(SolverError::UnknownBuffer(buffer.0))?;
        SolverError::check_len(dst.len(), host.len())?;
        dst.copy_from_slice(host);
        self.stats.uploads += 1;
        self.stats.values_uploaded += host.len();
        Ok(())
    }

    fn download(&mut self, buffer: BufferId, host: &mut [f64]) -> Result<(), SolverError> {
        let src = self.buffer(buffer)?;
        SolverError::check_len(src.len(), host.len())?;
        host.copy_from_slice(src);
        self.stats.downloads += 1;
        self.stats.values_downloaded += host.len();
        Ok(())
    }

    fn upload_matrix(&mut self, matrix: &ComputeMatrix) -> MatrixId {
        self.matrices.push(Some(matrix.clone()));
        self.stats.uploads += 1;
        self.stats.values_uploaded += matrix.value_count();
        MatrixId(self.matrices.len() - 1)
    }

    fn release_matrix(&mut self, matrix: MatrixId) -> Result<(), SolverError> {
        self.matrices
            .get_mut(matrix.0)
            .and_then(Option::take)
            .map(drop)
            .ok_or(SolverError::UnknownMatrix(matrix.0))
    }

    fn spmv(&mut self, matrix: MatrixId, x: BufferId, y: BufferId) -> Result<(), SolverError> {
        self.with_output(y, |dev, out| {
            let a = dev.matrix(matrix)?;
            let input = dev.buffer(x)?;
            SolverError::check_len(a.size(), input.len())?;
            SolverError::check_len(a.size(), out.len())?;
            a.view().spmv(input, out);
            Ok(())
        })
    }

    fn lower_solve(&mut self, factors: MatrixId, v: BufferId) -> Result<(), SolverError> {
        self.with_output(v, |dev, out| {
            let f = dev.matrix(factors)?;
            SolverError::check_len(f.size(), out.len())?;
            f.view().forward_solve(out);
            Ok(())
        })
    }

    fn upper_solve(&mut self, factors: MatrixId, v: BufferId) -> Result<(), SolverError> {
        self.with_output(v, |dev, out| {
            let f = dev.matrix(factors)?;
            SolverError::check_len(f.size(), out.len())?;
            f.view().backward_solve(out);
            Ok(())
        })
    }

    fn copy(&mut self, src: BufferId, dst: BufferId) -> Result<(), SolverError> {
        self.with_output(dst, |dev, out| {
            let input = dev.buffer(src)?;
            SolverError::check_len(out.len(), input.len())?;
            out.copy_from_slice(input);
            Ok(())
        })
    }

    fn fill_zero(&mut self, x: BufferId) -> Result<(), SolverError> {
        self.with_output(x, |_, out| {
            out.fill(0.0);
            Ok(())
        })
    }

    fn axpy(&mut self, alpha: f64, x: BufferId, y: BufferId) -> Result<(), SolverError> {
        self.with_output(y, |dev, out| {
            let input = dev.buffer(x)?;
            SolverError::check_len(out.len(), input.len())?;
            kernels::axpy(alpha, input, out);
            Ok(())
        })
    }

    fn xpay(&mut self, x: BufferId, beta: f64, y: BufferId) -> Result<(), SolverError> {
        self.with_output(y, |dev, out| {
            let input = dev.buffer(x)?;
            SolverError::check_len(out.len(), input.len())?;
            kernels::xpay(input, beta, out);
            Ok(())
        })
    }

    fn pointwise(&mut self, d: BufferId, x: BufferId, y: BufferId) -> Result<(), SolverError> {
        self.with_output(y, |dev, out| {
            let scale = dev.buffer(d)?;
            let input = dev.buffer(x)?;
            SolverError::check_len(out.len(), scale.len())?;
            SolverError::check_len(out.len(), input.len())?;
            kernels::pointwise_mul(scale, input, out);
            Ok(())
        })
    }

    fn residual(&mut self, b: BufferId, ax: BufferId, r: BufferId) -> Result<(), SolverError> {
        self.with_output(r, |dev, out| {
            let rhs = dev.buffer(b)?;
            let product = dev.buffer(ax)?;
            SolverError::check_len(out.len(), rhs.len())?;
            SolverError::check_len(out.len(), product.len())?;
            kernels::residual(rhs, product, out);
            Ok(())
        })
    }

    fn dot(&mut self, x: BufferId, y: BufferId) -> Result<f64, SolverError> {
        let a = self.buffer(x)?;
        let b = self.buffer(y)?;
        SolverError::check_len(a.len(), b.len())?;
        let value = kernels::dot(a, b);
        self.stats.kernels += 1;
        self.stats.reductions += 1;
        Ok(value)
    }
}
