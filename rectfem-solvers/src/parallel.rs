//! Parallel utilities with feature-gated implementations
//!
//! With the `rayon` feature, work above a caller-supplied size threshold runs
//! on the rayon pool; without it everything runs on the calling thread. Each
//! output element is computed from the same inputs in the same order either
//! way, so results never depend on the feature or on the thread count.

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Check if parallel processing is available
#[cfg(feature = "rayon")]
pub fn is_parallel_available() -> bool {
    true
}

/// Check if parallel processing is available
#[cfg(not(feature = "rayon"))]
pub fn is_parallel_available() -> bool {
    false
}

/// Set `y[i] = f(i)` for every index
#[cfg(feature = "rayon")]
pub fn fill_indexed<F>(y: &mut [f64], threshold: usize, f: F)
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    if y.len() >= threshold {
        y.par_iter_mut().enumerate().for_each(|(i, yi)| *yi = f(i));
    } else {
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = f(i);
        }
    }
}

/// Set `y[i] = f(i)` for every index (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn fill_indexed<F>(y: &mut [f64], _threshold: usize, f: F)
where
    F: Fn(usize) -> f64,
{
    for (i, yi) in y.iter_mut().enumerate() {
        *yi = f(i);
    }
}

/// Set `y[i] = f(x[i], y[i])` for every index
#[cfg(feature = "rayon")]
pub fn zip_update<F>(x: &[f64], y: &mut [f64], threshold: usize, f: F)
where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    if y.len() >= threshold {
        y.par_iter_mut()
            .zip(x.par_iter())
            .for_each(|(yi, xi)| *yi = f(*xi, *yi));
    } else {
        for (yi, xi) in y.iter_mut().zip(x.iter()) {
            *yi = f(*xi, *yi);
        }
    }
}

/// Set `y[i] = f(x[i], y[i])` for every index (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn zip_update<F>(x: &[f64], y: &mut [f64], _threshold: usize, f: F)
where
    F: Fn(f64, f64) -> f64,
{
    for (yi, xi) in y.iter_mut().zip(x.iter()) {
        *yi = f(*xi, *yi);
    }
}

/// Map `f` over matching `block`-sized chunks of `x` and `y`, in chunk order
#[cfg(feature = "rayon")]
pub fn map_blocks<F>(x: &[f64], y: &[f64], block: usize, threshold: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64], &[f64]) -> f64 + Sync + Send,
{
    if x.len() >= threshold {
        x.par_chunks(block)
            .zip(y.par_chunks(block))
            .map(|(xb, yb)| f(xb, yb))
            .collect()
    } else {
        x.chunks(block)
            .zip(y.chunks(block))
            .map(|(xb, yb)| f(xb, yb))
            .collect()
    }
}

/// Map `f` over matching `block`-sized chunks of `x` and `y` (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn map_blocks<F>(x: &[f64], y: &[f64], block: usize, _threshold: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64], &[f64]) -> f64,
{
    x.chunks(block)
        .zip(y.chunks(block))
        .map(|(xb, yb)| f(xb, yb))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_indexed_both_sides_of_threshold() {
        for threshold in [0, usize::MAX] {
            let mut y = vec![0.0; 10];
            fill_indexed(&mut y, threshold, |i| (i * i) as f64);
            assert_eq!(y[3], 9.0);
            assert_eq!(y[9], 81.0);
        }
    }

    #[test]
    fn test_zip_update() {
        let x = [1.0, 2.0, 3.0];
        let mut y = [10.0, 20.0, 30.0];
        zip_update(&x, &mut y, 0, |xi, yi| xi + 0.5 * yi);
        assert_eq!(y, [6.0, 12.0, 18.0]);
    }

    #[test]
    fn test_map_blocks_keeps_block_order() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let ones = vec![1.0; 10];
        let sums = map_blocks(&x, &ones, 4, 0, |a, b| a.iter().zip(b).map(|(p, q)| p * q).sum());
        assert_eq!(sums, vec![6.0, 22.0, 17.0]);
    }
}
