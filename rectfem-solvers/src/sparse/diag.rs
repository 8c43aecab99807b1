//! Profile-diagonal storage for the bilinear 9-point stencil
//!
//! Nodes of a structured mesh with `W` nodes per row are numbered row-major,
//! so every coupling of node `r` lies at a fixed distance: the horizontal
//! neighbour (1), the two diagonal neighbours (`W-1`, `W+1`) and the
//! vertical neighbour (`W`). The matrix keeps the main diagonal plus four
//! lower and four upper bands, one per distance.
//!
//! A band slot `r` holds the coupling between rows `r` and `r + off_k`, so
//! both directions of one coupling share an index:
//!
//! ```text
//! upper[k][r] = A[r, r + off_k]
//! lower[k][r] = A[r + off_k, r]
//! ```
//!
//! Not every band slot is a stencil entry: node `r` at the right edge of a
//! mesh row has no horizontal neighbour at `r + 1`. Such slots stay zero and
//! [`DiagMatrix::get`] reports them as zero.

use super::compute::ComputeMatrix;
use super::matrix::GlobalMatrix;
use super::view::{BAND_COUNT, DiagView, band_offsets};
use crate::traits::LinearOperator;
use ndarray::{Array1, Array2};

/// Pivots smaller than this are replaced by one during ILU(0)
const PIVOT_FLOOR: f64 = 1e-30;

/// Profile-diagonal matrix of a structured 2D mesh
#[derive(Debug, Clone, PartialEq)]
pub struct DiagMatrix {
    gap: usize,
    di: Vec<f64>,
    lower: [Vec<f64>; BAND_COUNT],
    upper: [Vec<f64>; BAND_COUNT],
}

impl DiagMatrix {
    /// Create a zero matrix with `size` rows for a mesh with `gap + 2` nodes per row
    pub fn new(size: usize, gap: usize) -> Self {
        let offsets = band_offsets(gap);
        Self {
            gap,
            di: vec![0.0; size],
            lower: std::array::from_fn(|k| vec![0.0; size.saturating_sub(offsets[k])]),
            upper: std::array::from_fn(|k| vec![0.0; size.saturating_sub(offsets[k])]),
        }
    }

    /// Create a zero matrix for a `width` x `height` node grid
    ///
    /// # Panics
    ///
    /// Panics if `width < 2`: a row of nodes must span at least one element.
    pub fn for_grid(width: usize, height: usize) -> Self {
        assert!(width >= 2, "A mesh row needs at least two nodes, got {width}");
        Self::new(width * height, width - 2)
    }

    /// Rebuild a matrix from the flat band layout of [`ComputeMatrix::Diag`]
    pub fn from_flat(gap: usize, di: &[f64], bands: &[f64]) -> Self {
        let n = di.len();
        assert_eq!(
            bands.len(),
            2 * BAND_COUNT * n,
            "Flat band storage must hold {} bands of length {n}",
            2 * BAND_COUNT
        );
        let offsets = band_offsets(gap);
        let band = |slot: usize, k: usize| {
            let start = slot * n;
            bands[start..start + n.saturating_sub(offsets[k])].to_vec()
        };
        Self {
            gap,
            di: di.to_vec(),
            lower: std::array::from_fn(|k| band(k, k)),
            upper: std::array::from_fn(|k| band(BAND_COUNT + k, k)),
        }
    }

    /// Number of rows
    pub fn size(&self) -> usize {
        self.di.len()
    }

    /// Stencil distance parameter (nodes per mesh row minus two)
    pub fn gap(&self) -> usize {
        self.gap
    }

    /// Number of nodes per mesh row
    pub fn row_width(&self) -> usize {
        self.gap + 2
    }

    /// Band offsets `[1, W-1, W, W+1]`
    pub fn offsets(&self) -> [usize; BAND_COUNT] {
        band_offsets(self.gap)
    }

    /// Main diagonal
    pub fn diagonal(&self) -> &[f64] {
        &self.di
    }

    /// Mutable main diagonal
    pub fn diagonal_mut(&mut self) -> &mut [f64] {
        &mut self.di
    }

    /// Lower band `k`: `lower(k)[r] = A[r + off_k, r]`
    pub fn lower(&self, k: usize) -> &[f64] {
        &self.lower[k]
    }

    /// Upper band `k`: `upper(k)[r] = A[r, r + off_k]`
    pub fn upper(&self, k: usize) -> &[f64] {
        &self.upper[k]
    }

    /// Borrow the storage as a kernel view
    pub fn view(&self) -> DiagView<'_> {
        DiagView {
            gap: self.gap,
            di: &self.di,
            lower: std::array::from_fn(|k| self.lower[k].as_slice()),
            upper: std::array::from_fn(|k| self.upper[k].as_slice()),
        }
    }

    /// Whether band `k` has a stencil entry starting at node column `c`
    #[inline]
    fn band_has_entry(&self, k: usize, c: usize) -> bool {
        let last = self.gap + 1;
        match k {
            0 | 3 => c != last,
            1 => c != 0,
            _ => true,
        }
    }

    /// Band holding the coupling between `row` and `col`, if it is a stencil entry
    ///
    /// The slot index inside the band is `min(row, col)`.
    pub fn slot(&self, row: usize, col: usize) -> Option<usize> {
        let (lo, hi) = if row < col { (row, col) } else { (col, row) };
        if lo == hi || hi >= self.size() {
            return None;
        }
        let dist = hi - lo;
        let c = lo % self.row_width();
        self.offsets()
            .iter()
            .enumerate()
            .find(|&(k, &off)| off == dist && self.band_has_entry(k, c))
            .map(|(k, _)| k)
    }

    /// Entry `A[row, col]` (zero outside the stencil)
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row == col {
            return self.di[row];
        }
        match self.slot(row, col) {
            Some(k) if row < col => self.upper[k][row],
            Some(k) => self.lower[k][col],
            None => 0.0,
        }
    }

    fn entry_mut(&mut self, row: usize, col: usize) -> &mut f64 {
        if row == col {
            return &mut self.di[row];
        }
        match self.slot(row, col) {
            Some(k) if row < col => &mut self.upper[k][row],
            Some(k) => &mut self.lower[k][col],
            None => panic!(
                "Entry ({row}, {col}) is outside the 9-point stencil (row width {})",
                self.row_width()
            ),
        }
    }

    /// Add `value` to `A[row, col]`
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is not a stencil entry.
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        *self.entry_mut(row, col) += value;
    }

    /// Overwrite `A[row, col]`
    ///
    /// # Panics
    ///
    /// Panics if `(row, col)` is not a stencil entry.
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        *self.entry_mut(row, col) = value;
    }

    /// Stencil neighbours of `row` in ascending order (diagonal excluded)
    pub fn neighbours(&self, row: usize) -> Vec<usize> {
        let n = self.size();
        let w = self.row_width();
        let offsets = self.offsets();
        let mut cols = Vec::with_capacity(2 * BAND_COUNT);
        for (k, &off) in offsets.iter().enumerate() {
            if row >= off && self.band_has_entry(k, (row - off) % w) {
                cols.push(row - off);
            }
            if row + off < n && self.band_has_entry(k, row % w) {
                cols.push(row + off);
            }
        }
        cols.sort_unstable();
        cols
    }

    /// `(col, value)` pairs of a row in ascending column order, diagonal included
    pub fn row_entries(&self, row: usize) -> Vec<(usize, f64)> {
        let mut cols = self.neighbours(row);
        let pos = cols.partition_point(|&c| c < row);
        cols.insert(pos, row);
        cols.into_iter().map(|c| (c, self.get(row, c))).collect()
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

    /// Solve L·y = v in place, L unit lower triangular from the lower bands
    pub fn forward_solve(&self, v: &mut [f64]) {
        self.view().forward_solve(v);
    }

    /// Solve U·y = v in place, U from the diagonal and upper bands
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

    /// Incomplete LU factorization with no fill outside the stencil
    ///
    /// The factors come back packed into a new matrix of the same shape:
    /// the lower bands hold the multipliers of the unit lower factor, the
    /// diagonal and upper bands hold the upper factor. Apply them with
    /// [`forward_solve`](Self::forward_solve) followed by
    /// [`backward_solve`](Self::backward_solve).
    pub fn ilu0(&self) -> DiagMatrix {
        let mut f = self.clone();
        let mut floored = 0usize;

        for i in 0..self.size() {
            let cols = self.neighbours(i);
            for &k in cols.iter().filter(|&&k| k < i) {
                let l_ik = f.get(i, k) / f.di[k];
                f.set(i, k, l_ik);

                for &j in cols.iter().filter(|&&j| j > k) {
                    if f.slot(k, j).is_some() {
                        let u_kj = f.get(k, j);
                        f.add(i, j, -l_ik * u_kj);
                    }
                }
                // `cols` has no diagonal, the pivot update is separate
                let u_ki = f.get(k, i);
                f.di[i] -= l_ik * u_ki;
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

    /// Flatten into the device-ready layout
    pub fn prepare_for_solve(&self) -> ComputeMatrix {
        let n = self.size();
        let mut bands = vec![0.0; 2 * BAND_COUNT * n];
        for k in 0..BAND_COUNT {
            let lo = k * n;
            bands[lo..lo + self.lower[k].len()].copy_from_slice(&self.lower[k]);
            let up = (BAND_COUNT + k) * n;
            bands[up..up + self.upper[k].len()].copy_from_slice(&self.upper[k]);
        }
        ComputeMatrix::Diag {
            gap: self.gap,
            di: self.di.clone(),
            bands,
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

impl GlobalMatrix for DiagMatrix {
    fn size(&self) -> usize {
        DiagMatrix::size(self)
    }

    fn diagonal(&self) -> &[f64] {
        &self.di
    }

    fn diagonal_mut(&mut self) -> &mut [f64] {
        &mut self.di
    }

    fn get(&self, row: usize, col: usize) -> f64 {
        DiagMatrix::get(self, row, col)
    }

    fn add(&mut self, row: usize, col: usize, value: f64) {
        DiagMatrix::add(self, row, col, value)
    }

    fn set(&mut self, row: usize, col: usize, value: f64) {
        DiagMatrix::set(self, row, col, value)
    }

    fn neighbours(&self, row: usize) -> Vec<usize> {
        DiagMatrix::neighbours(self, row)
    }

    fn multiply(&self, x: &[f64]) -> Vec<f64> {
        DiagMatrix::multiply(self, x)
    }

    fn enumerate_nonzero(&self) -> Vec<f64> {
        DiagMatrix::enumerate_nonzero(self)
    }

    fn prepare_for_solve(&self) -> ComputeMatrix {
        DiagMatrix::prepare_for_solve(self)
    }
}

impl LinearOperator for DiagMatrix {
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
