//! Vector kernels shared by the host and device solver paths
//!
//! Every floating-point operation a Krylov iteration performs on dense
//! vectors goes through this module. The host solvers call these functions
//! on `ndarray` storage and [`CpuDevice`](crate::device::CpuDevice) calls them
//! on its buffers, so both paths round identically.
//!
//! Reductions use a fixed block decomposition ([`REDUCTION_BLOCK`]): each block
//! is summed left to right and the block sums are then added left to right.
//! The result therefore does not depend on how many threads run the blocks.

use crate::parallel;

/// Number of elements summed sequentially before partial sums are combined
pub const REDUCTION_BLOCK: usize = 4096;

/// Vectors shorter than this are processed on the calling thread
const PARALLEL_THRESHOLD: usize = 16 * 1024;

#[inline]
fn block_dot(x: &[f64], y: &[f64]) -> f64 {
    let mut sum = 0.0;
    for (xi, yi) in x.iter().zip(y.iter()) {
        sum += xi * yi;
    }
    sum
}

/// Compute inner product (x, y) = Σ x_i * y_i
pub fn dot(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(
        x.len(),
        y.len(),
        "Vector lengths must match for inner product"
    );

    parallel::map_blocks(x, y, REDUCTION_BLOCK, PARALLEL_THRESHOLD, block_dot)
        .iter()
        .fold(0.0, |acc, p| acc + p)
}

/// Compute vector 2-norm: ||x||_2 = sqrt(Σ x_i^2)
#[inline]
pub fn norm(x: &[f64]) -> f64 {
    dot(x, x).sqrt()
}

/// Compute axpy: y = α * x + y
pub fn axpy(alpha: f64, x: &[f64], y: &mut [f64]) {
    assert_eq!(x.len(), y.len(), "Vector lengths must match for axpy");

    parallel::zip_update(x, y, PARALLEL_THRESHOLD, |xi, yi| yi + alpha * xi);
}

/// Compute xpay: y = x + β * y
pub fn xpay(x: &[f64], beta: f64, y: &mut [f64]) {
    assert_eq!(x.len(), y.len(), "Vector lengths must match for xpay");

    parallel::zip_update(x, y, PARALLEL_THRESHOLD, |xi, yi| xi + beta * yi);
}

/// Element-wise product: y = d ⊙ x
pub fn pointwise_mul(d: &[f64], x: &[f64], y: &mut [f64]) {
    assert_eq!(d.len(), x.len(), "Vector lengths must match");
    assert_eq!(x.len(), y.len(), "Vector lengths must match");

    for ((yi, di), xi) in y.iter_mut().zip(d.iter()).zip(x.iter()) {
        *yi = di * xi;
    }
}

/// Compute the residual r = b - y where y = A * x has already been formed
pub fn residual(b: &[f64], ax: &[f64], r: &mut [f64]) {
    assert_eq!(b.len(), ax.len(), "Vector lengths must match");
    assert_eq!(b.len(), r.len(), "Vector lengths must match");

    for ((ri, bi), yi) in r.iter_mut().zip(b.iter()).zip(ax.iter()) {
        *ri = bi - yi;
    }
}

/// Compute vector scale in-place: x = α * x
#[inline]
pub fn scale_inplace(x: &mut [f64], alpha: f64) {
    for xi in x.iter_mut() {
        *xi *= alpha;
    }
}
