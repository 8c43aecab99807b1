//! Dense LU with partial pivoting
//!
//! The reference answer for the Krylov solvers. Assembled systems are
//! densified with `to_dense()` first, so this is only meant for small meshes.

use ndarray::{Array1, Array2, Zip, s};
use thiserror::Error;

/// Pivots below this magnitude mark the matrix as singular
const PIVOT_FLOOR: f64 = 1e-30;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LuError {
    #[error("Pivot {pivot:e} in column {column} is below the singularity floor")]
    Singular { column: usize, pivot: f64 },
    #[error("Expected {expected} entries, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

/// Packed `P A = L U`
///
/// `L` is unit lower triangular and lives strictly below the diagonal of
/// `factors`, `U` on and above it.
#[derive(Debug, Clone)]
pub struct LuFactorization {
    factors: Array2<f64>,
    perm: Vec<usize>,
}

impl LuFactorization {
    pub fn size(&self) -> usize {
        self.perm.len()
    }

    /// Row of `A` that ended up in row `i` of `P A`
    pub fn permutation(&self) -> &[usize] {
        &self.perm
    }

    pub fn solve(&self, b: &Array1<f64>) -> Result<Array1<f64>, LuError> {
        let n = self.size();
        if b.len() != n {
            return Err(LuError::DimensionMismatch {
                expected: n,
                got: b.len(),
            });
        }

        let mut x: Array1<f64> = self.perm.iter().map(|&p| b[p]).collect();
        for i in 1..n {
            let dot = self.factors.slice(s![i, ..i]).dot(&x.slice(s![..i]));
            x[i] -= dot;
        }
        for i in (0..n).rev() {
            let dot = self
                .factors
                .slice(s![i, i + 1..])
                .dot(&x.slice(s![i + 1..]));
            x[i] = (x[i] - dot) / self.factors[[i, i]];
        }
        Ok(x)
    }
}

/// Factorize a square matrix, swapping in the largest pivot of each column
pub fn lu_factorize(a: &Array2<f64>) -> Result<LuFactorization, LuError> {
    let n = a.nrows();
    if a.ncols() != n {
        return Err(LuError::DimensionMismatch {
            expected: n,
            got: a.ncols(),
        });
    }

    let mut factors = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();

    for k in 0..n {
        let (p, magnitude) = factors
            .slice(s![k.., k])
            .iter()
            .enumerate()
            .fold((0, -1.0_f64), |best, (i, v)| {
                if v.abs() > best.1 { (i, v.abs()) } else { best }
            });
        if magnitude < PIVOT_FLOOR {
            return Err(LuError::Singular {
                column: k,
                pivot: magnitude,
            });
        }

        let p = p + k;
        if p != k {
            let (mut upper, mut lower) = factors.multi_slice_mut((s![k, ..], s![p, ..]));
            Zip::from(&mut upper)
                .and(&mut lower)
                .for_each(|u, l| std::mem::swap(u, l));
            perm.swap(k, p);
        }

        let pivot = factors[[k, k]];
        let pivot_row = factors.slice(s![k, k + 1..]).to_owned();
        for i in k + 1..n {
            let m = factors[[i, k]] / pivot;
            factors[[i, k]] = m;
            if m != 0.0 {
                factors.slice_mut(s![i, k + 1..]).scaled_add(-m, &pivot_row);
            }
        }
    }

    Ok(LuFactorization { factors, perm })
}

/// Factorize and solve in one call
pub fn lu_solve(a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, LuError> {
    lu_factorize(a)?.solve(b)
}
