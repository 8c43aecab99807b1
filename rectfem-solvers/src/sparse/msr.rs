//! General sparse-row storage with a separate diagonal
//!
//! Used when a node carries more than one degree of freedom (bicubic Hermite
//! elements have four per node) and the couplings no longer fit fixed bands.
//! Layout:
//! - `di`: main diagonal
//! - `ia`: row pointers, `ia[r]..ia[r + 1]` is the slice of row `r`
//! - `ja`: column indices, ascending within a row, diagonal excluded
//! - `elems`: off-diagonal values parallel to `ja`

use super::compute::ComputeMatrix;
use super::matrix::GlobalMatrix;
use super::view::MsrView;
use crate::traits::LinearOperator;
use ndarray::{Array1, Array2};
use std::ops::Range;

/// Pivots smaller than this are replaced by one during ILU(0)
const PIVOT_FLOOR: f64 = 1e-30;

/// General sparse-row matrix
#[derive(Debug, Clone, PartialEq)]
pub struct MsrMatrix {
    di: Vec<f64>,
    ia: Vec<usize>,
    ja: Vec<usize>,
    elems: Vec<f64>,
}

impl MsrMatrix {
    /// Diagonal-only matrix with `size` rows
    pub fn new(size: usize) -> Self {
        Self {
            di: vec![0.0; size],
            ia: vec![0; size + 1],
            ja: Vec::new(),
            elems: Vec::new(),
        }
    }

    /// Create a matrix from raw components
    ///
    /// # Panics
    ///
    /// Panics if the arrays are inconsistent:
    /// - `ia` must have length `di.len() + 1` and be non-decreasing
    /// - `ia[n]` must equal `ja.len()` and `elems.len()`
    /// - columns must be strictly ascending within a row and never the diagonal
    pub fn from_raw_parts(di: Vec<f64>, ia: Vec<usize>, ja: Vec<usize>, elems: Vec<f64>) -> Self {
        let n = di.len();
        assert_eq!(ia.len(), n + 1, "ia must have size + 1 elements");
        assert_eq!(ja.len(), elems.len(), "ja and elems must have the same length");
        assert_eq!(ia[n], ja.len(), "ia[size] must equal the number of stored entries");
        for row in 0..n {
            assert!(ia[row] <= ia[row + 1], "ia must be non-decreasing");
            let cols = &ja[ia[row]..ia[row + 1]];
            assert!(
                cols.windows(2).all(|w| w[0] < w[1]),
                "Columns of row {row} must be strictly ascending"
            );
            assert!(
                cols.iter().all(|&c| c != row && c < n),
                "Row {row} stores its diagonal or an out-of-range column"
            );
        }
        Self { di, ia, ja, elems }
    }

    /// Build the portrait from element degree-of-freedom maps
    ///
    /// Every pair of dofs that share an element becomes a stored (zero)
    /// entry, in both directions.
    pub fn from_element_dofs<'a, I>(size: usize, elements: I) -> Self
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        let mut rows: Vec<Vec<usize>> = vec![Vec::new(); size];
        for dofs in elements {
            for &i in dofs {
                for &j in dofs {
                    if i != j {
                        rows[i].push(j);
                    }
                }
            }
        }

        let mut ia = Vec::with_capacity(size + 1);
        let mut ja = Vec::new();
        ia.push(0);
        for cols in rows.iter_mut() {
            cols.sort_unstable();
            cols.dedup();
            ja.extend_from_slice(cols);
            ia.push(ja.len());
        }

        let elems = vec![0.0; ja.len()];
        Self {
            di: vec![0.0; size],
            ia,
            ja,
            elems,
        }
    }

    /// Number of rows
    pub fn size(&self) -> usize {
        self.di.len()
    }

    /// Number of stored off-diagonal entries
    pub fn nnz(&self) -> usize {
        self.ja.len()
    }

    /// Main diagonal
    pub fn diagonal(&self) -> &[f64] {
        &self.di
    }

    /// Mutable main diagonal
    pub fn diagonal_mut(&mut self) -> &mut [f64] {
        &mut self.di
    }

    /// Row pointers
    pub fn ia(&self) -> &[usize] {
        &self.ia
    }

    /// Column indices
    pub fn ja(&self) -> &[usize] {
        &self.ja
    }

    /// Off-diagonal values
    pub fn elems(&self) -> &[f64] {
        &self.elems
    }

    /// Borrow the storage as a kernel view
    pub fn view(&self) -> MsrView<'_> {
        MsrView {
            di: &self.di,
            ia: &self.ia,
            ja: &self.ja,
            elems: &self.elems,
        }
    }

    /// Get the range of indices in ja/elems for a given row
    pub fn row_range(&self, row: usize) -> Range<usize> {
        self.ia[row]..self.ia[row + 1]
    }

    /// Slot of column `col` in row `row`, searching from slot `from` onwards
    ///
    /// `from` is an absolute index into `ja`; values below the start of the
    /// row are clamped to it. Assembly passes the slot after the previous hit
    /// so a sorted sweep over one row costs a single pass.
    pub fn find_column(&self, row: usize, col: usize, from: usize) -> Option<usize> {
        let range = self.row_range(row);
        let start = from.clamp(range.start, range.end);
        self.ja[start..range.end]
            .iter()
            .position(|&c| c == col)
            .map(|offset| start + offset)
    }

    fn locate(&self, row: usize, col: usize) -> Option<usize> {
        let range = self.row_range(row);
        self.ja[range.clone()]
            .binary_search(&col)
            .ok()
            .map(|offset| range.start + offset)
    }

    /// Entry `A[row, col]` (zero when not stored)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row == col {
            return self.di[row];
        }
        self.locate(row, col).map_or(0.0, |slot| self.elems[slot])
    }

    fn entry_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        if row == col {
            return &mut self.di[row];
        }
        match self.locate(row, col) {
            Some(slot) => &mut self.elems[slot],
            None => panic!("Entry ({row}, {col}) is not in the matrix portrait"),
        }
    }

    /// Add `value` to `A[row, col]`
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is not in the portrait.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        *self.entry_mut(row, col) += value;
    }

    /// Overwrite `A[row, col]`
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is not in the portrait.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        *self.entry_mut(row, col) = value;
    }

    /// Add a dense local matrix through the element dof map
    ///
    /// # Panics
    ///
    /// Panics if the portrait lacks a coupling between two dofs of `dofs`.
    pub fn scatter(&mut self, dofs: &[usize], local: &Array2<f64>) {
        assert_eq!(local.nrows(), dofs.len(), "Local matrix size mismatch");
        assert_eq!(local.ncols(), dofs.len(), "Local matrix size mismatch");

        let mut order: Vec<usize> = (0..dofs.len()).collect();
        order.sort_by_key(|&i| dofs[i]);

        for &i in &order {
            let row = dofs[i];
            let mut from = self.ia[row];
            for &j in &order {
                let col = dofs[j];
                if col == row {
                    self.di[row] += local[[i, j]];
                    continue;
                }
                let slot = self.find_column(row, col, from).unwrap_or_else(|| {
                    panic!("Element coupling ({row}, {col}) is missing from the portrait")
                });
                self.elems[slot] += local[[i, j]];
                from = slot + 1;
            }
        }
    }

    /// Stored neighbours of `row` in ascending order
    pub fn neighbours(&self, row: usize) -> Vec<usize> {
        self.ja[self.row_range(row)].to_vec()
    }

    /// `(col, value)` pairs of a row in ascending column order, diagonal included
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        let range = self.row_range(row);
        let mut entries = Vec::with_capacity(range.len() + 1);
        let mut placed = false;
        for idx in range {
            let col = self.ja[idx];
            if !placed && col > row {
                entries.push((row, self.di[row]));
                placed = true;
            }
            entries.push((col, self.elems[idx]));
        }
        if !placed {
            entries.push((row, self.di[row]));
        }
        entries
    }

    /// Matrix-vector product: y = A * x
    pub fn multiply(&self, x: &[f64]) -> Vec<f64> {
        let mut y = vec![0.0; self.size()];
        self.view().spmv(x, &mut y);
        y
    }

    /// Matrix-vector product on `ndarray` vectors
    pub fn matvec(&self, x: &Array1<f64>) -> Array1<f64> {
        Array1::from_vec(self.multiply(&x.to_vec()))
    }

    /// Solve L·y = v in place, L unit lower with the entries left of the diagonal
    pub fn forward_solve(&self, v: &mut [f64]) {
        self.view().forward_solve(v);
    }

    /// Solve U·y = v in place, U the diagonal and the entries right of it
    pub fn backward_solve(&self, v: &mut [f64]) {
        self.view().backward_solve(v);
    }

    /// L·y
    pub fn forward_apply(&self, y: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.size()];
        self.view().forward_apply(y, &mut out);
        out
    }

    /// U·y
    pub fn backward_apply(&self, y: &[f64]) -> Vec<f64> {
        let mut out = vec![0.0; self.size()];
        self.view().backward_apply(y, &mut out);
        out
    }

    /// Incomplete LU factorization restricted to the portrait
    ///
    /// Factors are packed like [`DiagMatrix::ilu0`](super::DiagMatrix::ilu0):
    /// entries left of the diagonal hold the unit lower factor, the diagonal
    /// and entries right of it hold the upper factor.
    pub fn ilu0(&self) -> MsrMatrix {
        let mut f = self.clone();
        let n = self.size();
        let mut floored = 0usize;

        for i in 0..n {
            let row = self.row_range(i);
            for idx in row.clone() {
                let k = f.ja[idx];
                if k >= i {
                    break;
                }

                let l_ik = f.elems[idx] / f.di[k];
                f.elems[idx] = l_ik;

                for j_idx in (idx + 1)..row.end {
                    let j = f.ja[j_idx];
                    if let Some(kj) = f.locate(k, j) {
                        f.elems[j_idx] -= l_ik * f.elems[kj];
                    }
                }
                if let Some(ki) = f.locate(k, i) {
                    f.di[i] -= l_ik * f.elems[ki];
                }
            }

            if f.di[i].abs() < PIVOT_FLOOR {
                f.di[i] = 1.0;
                floored += 1;
            }
        }

        if floored > 0 {
            log::warn!("ILU(0): replaced {floored} vanishing pivots by 1");
        }
        f
    }

    /// Stored values row by row in ascending column order, exact zeros skipped
    pub fn enumerate_nonzero(&self) -> Vec<f64> {
        (0..self.size())
            .flat_map(|row| self.row_entries(row))
            .map(|(_, v)| v)
            .filter(|&v| v != 0.0)
            .collect()
    }

    /// Copy into the device-ready layout
    pub fn prepare_for_solve(&self) -> ComputeMatrix {
        ComputeMatrix::Msr {
            di: self.di.clone(),
            ia: self.ia.clone(),
            ja: self.ja.clone(),
            elems: self.elems.clone(),
        }
    }

    /// Convert to dense matrix (for debugging/small matrices)
    pub fn to_dense(&self) -> Array2<f64> {
        let n = self.size();
        let mut dense = Array2::zeros((n, n));
        for row in 0..n {
            for (col, v) in self.row_entries(row) {
                dense[[row, col]] = v;
            }
        }
        dense
    }
}

impl GlobalMatrix for MsrMatrix {
    fn size(&self) -> usize {
        MsrMatrix::size(self)
    }

    fn diagonal(&self) -> &[f64] {
        &self.di
    }

    fn diagonal_mut(&mut self) -> &mut [f64] {
        &mut self.di
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        MsrMatrix::get(self, row, col)
    }

    fn add(&mut self, row: usize, col: usize, value: f64) {
        MsrMatrix::add(self, row, col, value)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        MsrMatrix::set(self, row, col, value)
    }

    fn neighbours(&self, row: usize) -> Vec<usize> {
        MsrMatrix::neighbours(self, row)
    }

    fn multiply(&self, x: &[f64]) -> Vec<f64> {
        MsrMatrix::multiply(self, x)
    }

    fn enumerate_nonzero(&self) -> Vec<f64> {
        MsrMatrix::enumerate_nonzero(self)
    }

    fn prepare_for_solve(&self) -> ComputeMatrix {
        MsrMatrix::prepare_for_solve(self)
    }
}

impl LinearOperator for MsrMatrix {
    fn num_rows(&self) -> usize {
        self.size()
    }

    fn num_cols(&self) -> usize {
        self.size()
    }

    fn apply(&self, x: &Array1<f64>) -> Array1<f64> {
        self.matvec(x)
    }

    fn apply_into(&self, x: &[f64], y: &mut [f64]) {
        self.view().spmv(x, y);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// The five-row system whose solution is all ones
    pub(crate) fn five_node_system() -> (MsrMatrix, Vec<f64>) {
        let a = MsrMatrix::from_raw_parts(
            vec![1.0; 5],
            vec![0, 1, 2, 2, 2, 2],
            vec![1, 0],
            vec![0.5, 0.5],
        );
        (a, vec![1.5, 1.5, 1.0, 1.0, 1.0])
    }

    #[test]
    fn test_five_node_multiply() {
        let (a, b) = five_node_system();
        assert_eq!(a.multiply(&[1.0; 5]), b);
        assert_eq!(a.get(0, 1), 0.5);
        assert_eq!(a.get(0, 2), 0.0);
    }

    #[test]
    fn test_portrait_from_elements() {
        let e0: &[usize] = &[0, 1, 3, 4];
        let e1: &[usize] = &[1, 2, 4, 5];
        let a = MsrMatrix::from_element_dofs(6, [e0, e1]);

        assert_eq!(a.ia(), &[0, 3, 8, 11, 14, 19, 22]);
        assert_eq!(&a.ja()[0..3], &[1, 3, 4]);
        assert_eq!(&a.ja()[3..8], &[0, 2, 3, 4, 5]);
        assert_eq!(a.nnz(), 22);
    }

    #[test]
    fn test_find_column_from_slot() {
        let e0: &[usize] = &[0, 1, 3, 4];
        let e1: &[usize] = &[1, 2, 4, 5];
        let a = MsrMatrix::from_element_dofs(6, [e0, e1]);

        assert_eq!(a.find_column(1, 4, 0), Some(6));
        assert_eq!(a.find_column(1, 4, 6), Some(6));
        assert_eq!(a.find_column(1, 2, 5), None);
        assert_eq!(a.find_column(0, 5, 0), None);
    }

    #[test]
    fn test_scatter_accumulates() {
        let dofs: &[usize] = &[2, 0, 1];
        let mut a = MsrMatrix::from_element_dofs(3, [dofs]);
        let local = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        a.scatter(dofs, &local);
        a.scatter(dofs, &local);

        assert_eq!(a.diagonal(), &[10.0, 18.0, 2.0]);
        assert_eq!(a.get(2, 0), 4.0);
        assert_eq!(a.get(0, 2), 8.0);
        assert_eq!(a.get(1, 2), 14.0);
    }

    #[test]
    #[should_panic(expected = "missing from the portrait")]
    fn test_scatter_outside_portrait_panics() {
        let mut a = MsrMatrix::new(2);
        a.scatter(&[0, 1], &Array2::ones((2, 2)));
    }

    #[test]
    fn test_row_entries_place_diagonal() {
        let (a, _) = five_node_system();
        assert_eq!(a.row_entries(0), vec![(0, 1.0), (1, 0.5)]);
        assert_eq!(a.row_entries(1), vec![(0, 0.5), (1, 1.0)]);
        assert_eq!(a.enumerate_nonzero(), vec![1.0, 0.5, 0.5, 1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_ilu0_exact_on_full_pattern() {
        // A dense pattern has no dropped fill, so ILU(0) is the exact LU
        let dofs: &[usize] = &[0, 1, 2];
        let mut a = MsrMatrix::from_element_dofs(3, [dofs]);
        a.scatter(dofs, &array![[4.0, 1.0, 0.5], [1.0, 3.0, 1.0], [0.5, 1.0, 2.0]]);

        let f = a.ilu0();
        let b = [1.0, 2.0, 3.0];
        let mut x = b.to_vec();
        f.forward_solve(&mut x);
        f.backward_solve(&mut x);

        let ax = a.multiply(&x);
        for (lhs, rhs) in ax.iter().zip(b.iter()) {
            assert_relative_eq!(*lhs, *rhs, epsilon = 1e-12);
        }
    }
}
