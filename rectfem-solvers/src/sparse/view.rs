//! Borrowed views over matrix storage and the kernels that run on them
//!
//! [`DiagView`] and [`MsrView`] are what a compute kernel sees: plain slices
//! and no ownership. Owned matrices, the flat [`ComputeMatrix`](super::ComputeMatrix)
//! layout and the device buffers all hand out views, so the matrix-vector
//! product and the triangular sweeps exist exactly once.

use crate::parallel;

/// Number of off-diagonal bands on each side of a profile-diagonal matrix
pub const BAND_COUNT: usize = 4;

/// Rows below this count are multiplied on the calling thread
const PARALLEL_ROWS: usize = 4096;

/// Band offsets of the bilinear 9-point stencil for a given `gap`.
///
/// `gap` is the number of interior nodes per mesh row (row width minus two),
/// so the offsets are the horizontal neighbour, the two diagonal neighbours
/// and the vertical neighbour.
#[inline]
pub const fn band_offsets(gap: usize) -> [usize; BAND_COUNT] {
    [1, gap + 1, gap + 2, gap + 3]
}

/// Borrowed profile-diagonal storage
#[derive(Debug, Clone, Copy)]
pub struct DiagView<'a> {
    /// Distance parameter of the stencil, see [`band_offsets`]
    pub gap: usize,
    /// Main diagonal
    pub di: &'a [f64],
    /// `lower[k][r] = A[r + off_k, r]`
    pub lower: [&'a [f64]; BAND_COUNT],
    /// `upper[k][r] = A[r, r + off_k]`
    pub upper: [&'a [f64]; BAND_COUNT],
}

impl DiagView<'_> {
    /// Number of rows
    #[inline]
    pub fn size(&self) -> usize {
        self.di.len()
    }

    #[inline]
    fn row_product(&self, offsets: &[usize; BAND_COUNT], row: usize, x: &[f64]) -> f64 {
        let n = self.di.len();
        let mut sum = self.di[row] * x[row];
        for k in 0..BAND_COUNT {
            let off = offsets[k];
            if row >= off {
                sum += self.lower[k][row - off] * x[row - off];
            }
            if row + off < n {
                sum += self.upper[k][row] * x[row + off];
            }
        }
        sum
    }

    /// Matrix-vector product: y = A * x
    pub fn spmv(&self, x: &[f64], y: &mut [f64]) {
        let n = self.size();
        assert_eq!(x.len(), n, "Input vector size mismatch");
        assert_eq!(y.len(), n, "Output vector size mismatch");
        let offsets = band_offsets(self.gap);

        parallel::fill_indexed(y, PARALLEL_ROWS, |row| {
            self.row_product(&offsets, row, x)
        });
    }

    /// Solve L·y = v in place (unit lower factor taken from the lower bands)
    pub fn forward_solve(&self, v: &mut [f64]) {
        let n = self.size();
        assert_eq!(v.len(), n, "Vector size mismatch");
        let offsets = band_offsets(self.gap);

        for row in 0..n {
            let mut sum = v[row];
            for k in 0..BAND_COUNT {
                let off = offsets[k];
                if row >= off {
                    sum -= self.lower[k][row - off] * v[row - off];
                }
            }
            v[row] = sum;
        }
    }

    /// Solve U·y = v in place (diagonal plus upper bands)
    pub fn backward_solve(&self, v: &mut [f64]) {
        let n = self.size();
        assert_eq!(v.len(), n, "Vector size mismatch");
        let offsets = band_offsets(self.gap);

        for row in (0..n).rev() {
            let mut sum = v[row];
            for k in 0..BAND_COUNT {
                let off = offsets[k];
                if row + off < n {
                    sum -= self.upper[k][row] * v[row + off];
                }
            }
            v[row] = sum / self.di[row];
        }
    }

    /// out = L·y
    pub fn forward_apply(&self, y: &[f64], out: &mut [f64]) {
        let n = self.size();
        assert_eq!(y.len(), n, "Input vector size mismatch");
        assert_eq!(out.len(), n, "Output vector size mismatch");
        let offsets = band_offsets(self.gap);

        for row in 0..n {
            let mut sum = y[row];
            for k in 0..BAND_COUNT {
                let off = offsets[k];
                if row >= off {
                    sum += self.lower[k][row - off] * y[row - off];
                }
            }
            out[row] = sum;
        }
    }

    /// out = U·y
    pub fn backward_apply(&self, y: &[f64], out: &mut [f64]) {
        let n = self.size();
        assert_eq!(y.len(), n, "Input vector size mismatch");
        assert_eq!(out.len(), n, "Output vector size mismatch");
        let offsets = band_offsets(self.gap);

        for row in 0..n {
            let mut sum = self.di[row] * y[row];
            for k in 0..BAND_COUNT {
                let off = offsets[k];
                if row + off < n {
                    sum += self.upper[k][row] * y[row + off];
                }
            }
            out[row] = sum;
        }
    }
}

/// Borrowed general sparse-row storage (diagonal kept apart from `elems`)
#[derive(Debug, Clone, Copy)]
pub struct MsrView<'a> {
    /// Main diagonal
    pub di: &'a [f64],
    /// Row pointers, `ia[n] == ja.len()`
    pub ia: &'a [usize],
    /// Column indices, ascending within a row, diagonal excluded
    pub ja: &'a [usize],
    /// Off-diagonal values parallel to `ja`
    pub elems: &'a [f64],
}

impl MsrView<'_> {
    /// Number of rows
    #[inline]
    pub fn size(&self) -> usize {
        self.di.len()
    }

    #[inline]
    fn row_product(&self, row: usize, x: &[f64]) -> f64 {
        let mut sum = self.di[row] * x[row];
        for k in self.ia[row]..self.ia[row + 1] {
            sum += self.elems[k] * x[self.ja[k]];
        }
        sum
    }

    /// Matrix-vector product: y = A * x
    pub fn spmv(&self, x: &[f64], y: &mut [f64]) {
        let n = self.size();
        assert_eq!(x.len(), n, "Input vector size mismatch");
        assert_eq!(y.len(), n, "Output vector size mismatch");

        parallel::fill_indexed(y, PARALLEL_ROWS, |row| self.row_product(row, x));
    }

    /// Solve L·y = v in place, L unit lower with the entries left of the diagonal
    pub fn forward_solve(&self, v: &mut [f64]) {
        let n = self.size();
        assert_eq!(v.len(), n, "Vector size mismatch");

        for row in 0..n {
            let mut sum = v[row];
            for k in self.ia[row]..self.ia[row + 1] {
                let col = self.ja[k];
                if col >= row {
                    break;
                }
                sum -= self.elems[k] * v[col];
            }
            v[row] = sum;
        }
    }

    /// Solve U·y = v in place, U = diagonal plus the entries right of it
    pub fn backward_solve(&self, v: &mut [f64]) {
        let n = self.size();
        assert_eq!(v.len(), n, "Vector size mismatch");

        for row in (0..n).rev() {
            let mut sum = v[row];
            for k in self.ia[row]..self.ia[row + 1] {
                let col = self.ja[k];
                if col > row {
                    sum -= self.elems[k] * v[col];
                }
            }
            v[row] = sum / self.di[row];
        }
    }

    /// out = L·y
    pub fn forward_apply(&self, y: &[f64], out: &mut [f64]) {
        let n = self.size();
        assert_eq!(y.len(), n, "Input vector size mismatch");
        assert_eq!(out.len(), n, "Output vector size mismatch");

        for row in 0..n {
            let mut sum = y[row];
            for k in self.ia[row]..self.ia[row + 1] {
                let col = self.ja[k];
                if col >= row {
                    break;
                }
                sum += self.elems[k] * y[col];
            }
            out[row] = sum;
        }
    }

    /// out = U·y
    pub fn backward_apply(&self, y: &[f64], out: &mut [f64]) {
        let n = self.size();
        assert_eq!(y.len(), n, "Input vector size mismatch");
        assert_eq!(out.len(), n, "Output vector size mismatch");

        for row in 0..n {
            let mut sum = self.di[row] * y[row];
            for k in self.ia[row]..self.ia[row + 1] {
                let col = self.ja[k];
                if col > row {
                    sum += self.elems[k] * y[col];
                }
            }
            out[row] = sum;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_offsets() {
        // 5 nodes per mesh row
        assert_eq!(band_offsets(3), [1, 4, 5, 6]);
        // single element column: the two offset-1 bands never overlap structurally
        assert_eq!(band_offsets(0), [1, 1, 2, 3]);
    }

    #[test]
    fn test_msr_view_spmv() {
        let di = [1.0, 1.0, 1.0, 1.0, 1.0];
        let ia = [0, 1, 2, 2, 2, 2];
        let ja = [1, 0];
        let elems = [0.5, 0.5];
        let view = MsrView {
            di: &di,
            ia: &ia,
            ja: &ja,
            elems: &elems,
        };

        let x = [1.0; 5];
        let mut y = [0.0; 5];
        view.spmv(&x, &mut y);
        assert_eq!(y, [1.5, 1.5, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_msr_view_triangular_round_trip() {
        let di = [2.0, 3.0, 4.0];
        let ia = [0, 1, 3, 4];
        let ja = [2, 0, 2, 1];
        let elems = [0.25, -1.0, 0.5, 2.0];
        let view = MsrView {
            di: &di,
            ia: &ia,
            ja: &ja,
            elems: &elems,
        };

        let v = [1.0, -2.0, 0.5];
        let mut y = v;
        view.forward_solve(&mut y);
        let mut back = [0.0; 3];
        view.forward_apply(&y, &mut back);
        for (a, b) in back.iter().zip(v.iter()) {
            assert!((a - b).abs() < 1e-14);
        }

        let mut y = v;
        view.backward_solve(&mut y);
        view.backward_apply(&y, &mut back);
        for (a, b) in back.iter().zip(v.iter()) {
            assert!((a - b).abs() < 1e-14);
        }
    }
}
