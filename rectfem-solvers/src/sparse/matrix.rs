//! Format-independent access to an assembled global matrix

use super::compute::ComputeMatrix;
use super::diag::DiagMatrix;
use super::msr::MsrMatrix;
use crate::traits::LinearOperator;
use ndarray::Array1;

/// Operations assembly and boundary conditions need from a global matrix
///
/// `add` and `set` panic when the entry lies outside the stored pattern:
/// writing there means the assembler and the pattern disagree.
pub trait GlobalMatrix {
    /// Number of rows
    fn size(&self) -> usize;

    /// Main diagonal
    fn diagonal(&self) -> &[f64];

    /// Mutable main diagonal
    fn diagonal_mut(&mut self) -> &mut [f64];

    /// Entry `A[row, col]`, zero outside the pattern
    fn get(&self, row: usize, col: usize) -> f64;

    /// Add `value` to `A[row, col]`
    fn add(&mut self, row: usize, col: usize, value: f64);

    /// Overwrite `A[row, col]`
    fn set(&mut self, row: usize, col: usize, value: f64);

    /// Columns coupled to `row`, ascending, diagonal excluded
    ///
    /// Patterns are structurally symmetric, so these are also the rows
    /// coupled to column `row`.
    fn neighbours(&self, row: usize) -> Vec<usize>;

    /// Matrix-vector product: y = A * x
    fn multiply(&self, x: &[f64]) -> Vec<f64>;

    /// Stored values row by row, ascending columns, exact zeros skipped
    fn enumerate_nonzero(&self) -> Vec<f64>;

    /// Flatten into the device-ready layout
    fn prepare_for_solve(&self) -> ComputeMatrix;
}

/// An assembled matrix in either storage format
#[derive(Debug, Clone, PartialEq)]
pub enum SparseMatrix {
    Diag(DiagMatrix),
    Msr(MsrMatrix),
}

impl SparseMatrix {
    /// Incomplete LU factors in the same format
    pub fn ilu0(&self) -> SparseMatrix {
        match self {
            SparseMatrix::Diag(m) => SparseMatrix::Diag(m.ilu0()),
            SparseMatrix::Msr(m) => SparseMatrix::Msr(m.ilu0()),
        }
    }

    /// Solve L·y = v in place
    pub fn forward_solve(&self, v: &mut [f64]) {
        match self {
            SparseMatrix::Diag(m) => m.forward_solve(v),
            SparseMatrix::Msr(m) => m.forward_solve(v),
        }
    }

    /// Solve U·y = v in place
    pub fn backward_solve(&self, v: &mut [f64]) {
        match self {
            SparseMatrix::Diag(m) => m.backward_solve(v),
            SparseMatrix::Msr(m) => m.backward_solve(v),
        }
    }

    /// L·y
    pub fn forward_apply(&self, y: &[f64]) -> Vec<f64> {
        match self {
            SparseMatrix::Diag(m) => m.forward_apply(y),
            SparseMatrix::Msr(m) => m.forward_apply(y),
        }
    }

    /// U·y
    pub fn backward_apply(&self, y: &[f64]) -> Vec<f64> {
        match self {
            SparseMatrix::Diag(m) => m.backward_apply(y),
            SparseMatrix::Msr(m) => m.backward_apply(y),
        }
    }

    /// `(col, value)` pairs of a row in ascending column order
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        match self {
            SparseMatrix::Diag(m) => m.row_entries(row),
            SparseMatrix::Msr(m) => m.row_entries(row),
        }
    }

    /// Convert to dense matrix (for debugging/small matrices)
    pub fn to_dense(&self) -> ndarray::Array2<f64> {
        match self {
            SparseMatrix::Diag(m) => m.to_dense(),
            SparseMatrix::Msr(m) => m.to_dense(),
        }
    }

    fn inner(&self) -> &dyn GlobalMatrix {
        match self {
            SparseMatrix::Diag(m) => m,
            SparseMatrix::Msr(m) => m,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn GlobalMatrix {
        match self {
            SparseMatrix::Diag(m) => m,
            SparseMatrix::Msr(m) => m,
        }
    }
}

impl From<DiagMatrix> for SparseMatrix {
    fn from(m: DiagMatrix) -> Self {
        SparseMatrix::Diag(m)
    }
}

impl From<MsrMatrix> for SparseMatrix {
    fn from(m: MsrMatrix) -> Self {
        SparseMatrix::Msr(m)
    }
}

impl GlobalMatrix for SparseMatrix {
    fn size(&self) -> usize {
        self.inner().size()
    }

    fn diagonal(&self) -> &[f64] {
        self.inner().diagonal()
    }

    fn diagonal_mut(&mut self) -> &mut [f64] {
        self.inner_mut().diagonal_mut()
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        self.inner().get(row, col)
    }

    fn add(&mut self, row: usize, col: usize, value: f64) {
        self.inner_mut().add(row, col, value)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        self.inner_mut().set(row, col, value)
    }

    fn neighbours(&self, row: usize) -> Vec<usize> {
        self.inner().neighbours(row)
    }

    fn multiply(&self, x: &[f64]) -> Vec<f64> {
        self.inner().multiply(x)
    }

    fn enumerate_nonzero(&self) -> Vec<f64> {
        self.inner().enumerate_nonzero()
    }

    fn prepare_for_solve(&self) -> ComputeMatrix {
        self.inner().prepare_for_solve()
    }
}

impl LinearOperator for SparseMatrix {
    fn num_rows(&self) -> usize {
        self.size()
    }

    fn num_cols(&self) -> usize {
        self.size()
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from_vec(self.multiply(&x.to_vec()))
    }

    fn apply_into(&self, x: &[f64], y: &mut [f64]) {
        match self {
            SparseMatrix::Diag(m) => m.view().spmv(x, y),
            SparseMatrix::Msr(m) => m.view().spmv(x, y),
        }
    }
}
