//! Device-ready matrix layout
//!
//! [`ComputeMatrix`] is what a solver consumes: flat arrays that can be copied
//! to an accelerator as-is. The profile-diagonal layout keeps its eight bands
//! in one array with a fixed stride of `n`, each band left-aligned and padded
//! with zeros; the sparse-row layout is already flat.

use super::diag::DiagMatrix;
use super::matrix::SparseMatrix;
use super::msr::MsrMatrix;
use super::view::{BAND_COUNT, DiagView, MsrView, band_offsets};
use crate::traits::LinearOperator;
use ndarray::Array1;

/// Matrix flattened for the solve phase
#[derive(Debug, Clone, PartialEq)]
pub enum ComputeMatrix {
    /// Profile-diagonal: `bands[k*n..]` is lower band `k`, `bands[(4+k)*n..]` upper band `k`
    Diag {
        gap: usize,
        di: Vec<f64>,
        bands: Vec<f64>,
    },
    /// General sparse-row with separate diagonal
    Msr {
        di: Vec<f64>,
        ia: Vec<usize>,
        ja: Vec<usize>,
        elems: Vec<f64>,
    },
}

/// Borrowed kernel view of either layout
#[derive(Debug, Clone, Copy)]
pub enum MatrixView<'a> {
    Diag(DiagView<'a>),
    Msr(MsrView<'a>),
}

impl MatrixView<'_> {
    /// Number of rows
    pub fn size(&self) -> usize {
        match self {
            MatrixView::Diag(v) => v.size(),
            MatrixView::Msr(v) => v.size(),
        }
    }

    /// y = A * x
    pub fn spmv(&self, x: &[f64], y: &mut [f64]) {
        match self {
            MatrixView::Diag(v) => v.spmv(x, y),
            MatrixView::Msr(v) => v.spmv(x, y),
        }
    }

    /// Solve L·y = v in place
    pub fn forward_solve(&self, v: &mut [f64]) {
        match self {
            MatrixView::Diag(m) => m.forward_solve(v),
            MatrixView::Msr(m) => m.forward_solve(v),
        }
    }

    /// Solve U·y = v in place
    pub fn backward_solve(&self, v: &mut [f64]) {
        match self {
            MatrixView::Diag(m) => m.backward_solve(v),
            MatrixView::Msr(m) => m.backward_solve(v),
        }
    }
}

impl ComputeMatrix {
    /// Number of rows
    pub fn size(&self) -> usize {
        self.diagonal().len()
    }

    /// Main diagonal
    pub fn diagonal(&self) -> &[f64] {
        match self {
            ComputeMatrix::Diag { di, .. } | ComputeMatrix::Msr { di, .. } => di,
        }
    }

    /// Number of `f64` values held (diagonal, bands or off-diagonal values)
    pub fn value_count(&self) -> usize {
        match self {
            ComputeMatrix::Diag { di, bands, .. } => di.len() + bands.len(),
            ComputeMatrix::Msr { di, elems, .. } => di.len() + elems.len(),
        }
    }

    /// Borrow as a kernel view
    pub fn view(&self) -> MatrixView<'_> {
        match self {
            ComputeMatrix::Diag { gap, di, bands } => {
                let n = di.len();
                let offsets = band_offsets(*gap);
                let band = move |slot: usize, k: usize| {
                    let start = slot * n;
                    &bands[start..start + n.saturating_sub(offsets[k])]
                };
                MatrixView::Diag(DiagView {
                    gap: *gap,
                    di,
                    lower: std::array::from_fn(|k| band(k, k)),
                    upper: std::array::from_fn(|k| band(BAND_COUNT + k, k)),
                })
            }
            ComputeMatrix::Msr { di, ia, ja, elems } => {
                MatrixView::Msr(MsrView { di, ia, ja, elems })
            }
        }
    }

    /// Back to an editable matrix
    pub fn to_sparse(&self) -> SparseMatrix {
        match self {
            ComputeMatrix::Diag { gap, di, bands } => {
                SparseMatrix::Diag(DiagMatrix::from_flat(*gap, di, bands))
            }
            ComputeMatrix::Msr { di, ia, ja, elems } => SparseMatrix::Msr(
                MsrMatrix::from_raw_parts(di.clone(), ia.clone(), ja.clone(), elems.clone()),
            ),
        }
    }

    /// ILU(0) factors in the same layout
    pub fn ilu0(&self) -> ComputeMatrix {
        match self.to_sparse() {
            SparseMatrix::Diag(m) => m.ilu0().prepare_for_solve(),
            SparseMatrix::Msr(m) => m.ilu0().prepare_for_solve(),
        }
    }
}

impl LinearOperator for ComputeMatrix {
    fn num_rows(&self) -> usize {
        self.size()
    }

    fn num_cols(&self) -> usize {
        self.size()
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        let mut y = vec![0.0; self.size()];
        self.view().spmv(&x.to_vec(), &mut y);
        Array1::from_vec(y)
    }

    fn apply_into(&self, x: &[f64], y: &mut [f64]) {
        self.view().spmv(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sparse::diag::tests::stencil_laplacian;
    use crate::sparse::msr::tests::five_node_system;

    #[test]
    fn test_diag_view_matches_owned() {
        let a = stencil_laplacian(4, 3);
        let c = a.prepare_for_solve();
        let x: Vec<f64> = (0..a.size()).map(|i| i as f64 - 3.5).collect();
        let mut y = vec![0.0; a.size()];
        c.view().spmv(&x, &mut y);
        assert_eq!(y, a.multiply(&x));
        assert_eq!(c.value_count(), 9 * a.size());
    }

    #[test]
    fn test_msr_round_trip_through_layout() {
        let (a, b) = five_node_system();
        let c = a.prepare_for_solve();
        assert_eq!(c.to_sparse(), SparseMatrix::Msr(a));
        let y = c.apply(&Array1::from_elem(5, 1.0));
        assert_eq!(y.to_vec(), b);
    }

    #[test]
    fn test_ilu0_matches_format_ilu0() {
        let a = stencil_laplacian(5, 3);
        let direct = a.ilu0().prepare_for_solve();
        let via_layout = a.prepare_for_solve().ilu0();
        assert_eq!(direct, via_layout);
    }
}
