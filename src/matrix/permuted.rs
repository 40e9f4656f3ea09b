//! Permutation-aware column store for vineyard updates
//!
//! Barcode-template maintenance transposes adjacent rows and columns of an
//! already-reduced matrix. Rebuilding columns on every transposition would
//! be quadratic, so the store keeps raw row indices fixed and threads an
//! explicit permutation through every read: `perm` maps stored indices to
//! observable ones, `mrep` is its inverse, and heap order is keyed by
//! `perm[stored]`. A row swap is then two writes into each array; a column
//! swap exchanges two column vectors.
//!
//! The row-priority variant [`RowPriorityPermutedMatrix`] is the same store
//! with the two axes exchanged at the boundary; it holds the `U` factor of
//! the RU-decomposition, whose updates are row operations.

use ndarray::Array2;
use tracing::debug;

use super::heap;
use crate::error::{Error, Result};

/// Column-sparse mod-2 matrix with an explicit row permutation
#[derive(Debug, Clone)]
pub struct PermutedMatrix {
    /// Raw column storage; heap order under `perm[stored]`
    columns: Vec<Vec<usize>>,
    /// Raw pushes into each column since it was last pruned
    inserts_since_prune: Vec<usize>,
    /// Stored row index → observable row index
    perm: Vec<usize>,
    /// Observable row index → stored row index; `perm[mrep[i]] == i`
    mrep: Vec<usize>,
}

impl PermutedMatrix {
    /// Create an all-zero matrix with the identity row permutation
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            columns: vec![Vec::new(); cols],
            inserts_since_prune: vec![0; cols],
            perm: (0..rows).collect(),
            mrep: (0..rows).collect(),
        }
    }

    /// Create a square identity matrix with the identity row permutation
    pub fn identity(size: usize) -> Self {
        Self {
            columns: (0..size).map(|i| vec![i]).collect(),
            inserts_since_prune: vec![0; size],
            perm: (0..size).collect(),
            mrep: (0..size).collect(),
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.perm.len()
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    fn check_col(&self, idx: usize) -> Result<()> {
        if idx >= self.columns.len() {
            return Err(Error::col_out_of_range(idx, self.columns.len()));
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.perm.len() {
            return Err(Error::row_out_of_range(row, self.perm.len()));
        }
        Ok(())
    }

    /// Replace the row permutation; `order[stored]` is the observable index
    pub fn set_perm(&mut self, order: &[usize]) -> Result<()> {
        if order.len() != self.perm.len() {
            return Err(Error::InvariantViolation {
                reason: format!(
                    "permutation of length {} applied to {} rows",
                    order.len(),
                    self.perm.len()
                ),
            });
        }
        let mut seen = vec![false; order.len()];
        for &o in order {
            if o >= order.len() || seen[o] {
                return Err(Error::InvariantViolation {
                    reason: format!("row order is not a permutation at value {o}"),
                });
            }
            seen[o] = true;
        }
        self.perm.copy_from_slice(order);
        for (stored, &observable) in order.iter().enumerate() {
            self.mrep[observable] = stored;
        }
        Ok(())
    }

    /// Push a raw entry for observable `(row, col)`.
    ///
    /// Construction-time only; same caller contract as the plain store
    /// (entry absent, heapify before pivot queries).
    pub fn set_entry(&mut self, row: usize, col: usize) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        let stored = self.mrep[row];
        #[cfg(feature = "paranoid")]
        if self.columns[col].iter().filter(|&&r| r == stored).count() % 2 == 1 {
            return Err(Error::InvariantViolation {
                reason: format!("duplicate entry ({row}, {col})"),
            });
        }
        self.columns[col].push(stored);
        Ok(())
    }

    /// Replace a column with the given observable rows
    pub fn set_col(&mut self, idx: usize, rows: &[usize]) -> Result<()> {
        self.check_col(idx)?;
        for &r in rows {
            self.check_row(r)?;
        }
        let Self { columns, mrep, perm, .. } = self;
        let col = &mut columns[idx];
        col.clear();
        col.extend(rows.iter().map(|&r| mrep[r]));
        heap::make(col, &|r| perm[r]);
        self.inserts_since_prune[idx] = 0;
        Ok(())
    }

    /// Replace a column with the images of `rows` under `order`.
    ///
    /// Rows whose image is negative are dropped; used to seed a reduced
    /// matrix from columns expressed in another row order.
    pub fn set_col_permuted(&mut self, idx: usize, rows: &[usize], order: &[i32]) -> Result<()> {
        self.check_col(idx)?;
        let mut entries = Vec::with_capacity(rows.len());
        for &r in rows {
            if r >= order.len() {
                return Err(Error::row_out_of_range(r, order.len()));
            }
            let Ok(img) = usize::try_from(order[r]) else {
                continue;
            };
            if img >= self.perm.len() {
                return Err(Error::row_out_of_range(img, self.perm.len()));
            }
            entries.push(img);
        }
        let Self { columns, perm, .. } = self;
        let col = &mut columns[idx];
        col.clear();
        col.extend(entries);
        heap::make(col, &|r| perm[r]);
        self.inserts_since_prune[idx] = 0;
        Ok(())
    }

    /// Whether observable `(row, col)` is logically set (odd multiplicity)
    pub fn contains(&self, row: usize, col: usize) -> Result<bool> {
        self.check_row(row)?;
        self.check_col(col)?;
        let stored = self.mrep[row];
        Ok(self.columns[col].iter().filter(|&&r| r == stored).count() % 2 == 1)
    }

    /// Impose perm-keyed heap order on a column's raw entries
    pub fn heapify_col(&mut self, idx: usize) -> Result<()> {
        self.check_col(idx)?;
        let Self { columns, perm, .. } = self;
        heap::make(&mut columns[idx], &|r| perm[r]);
        Ok(())
    }

    /// Observable pivot of a column, or `None` when the column is zero.
    ///
    /// Lazy read: cancelled pairs are popped, the survivor pushed back.
    pub fn pivot(&mut self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        let Self { columns, perm, .. } = self;
        let key = |r: usize| perm[r];
        let col = &mut columns[idx];
        let max = heap::pop_pivot(col, &key);
        if let Some(stored) = max {
            heap::push(col, stored, &key);
        }
        Ok(max.map(|stored| perm[stored]))
    }

    /// O(1) observable pivot read for a finalized column
    pub fn pivot_finalized(&self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        Ok(self.columns[idx].first().map(|&stored| self.perm[stored]))
    }

    /// Pop and return the observable pivot, removing it from the column
    pub fn remove_pivot(&mut self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        let Self { columns, perm, .. } = self;
        Ok(heap::pop_pivot(&mut columns[idx], &|r| perm[r]).map(|stored| perm[stored]))
    }

    /// Add observable `row` as a fresh entry, restoring heap order
    pub fn push_index(&mut self, idx: usize, row: usize) -> Result<()> {
        self.check_col(idx)?;
        self.check_row(row)?;
        let Self { columns, perm, mrep, .. } = self;
        heap::push(&mut columns[idx], mrep[row], &|r| perm[r]);
        Ok(())
    }

    /// Add column `src` to column `tgt` (mod 2).
    ///
    /// Raw entries transfer directly; both columns share the permutation.
    pub fn add_to(&mut self, src: usize, tgt: usize) -> Result<()> {
        self.check_col(src)?;
        self.check_col(tgt)?;
        if src == tgt {
            return Err(Error::self_addition(src));
        }
        let Self { columns, perm, .. } = self;
        let key = |r: usize| perm[r];
        let (src_col, tgt_col) = super::sparse::two_cols_mut(columns, src, tgt);
        for &r in src_col {
            heap::push(tgt_col, r, &key);
        }
        self.inserts_since_prune[tgt] += src_col.len();
        self.maybe_prune(tgt);
        Ok(())
    }

    /// Fast-path addition skipping the source's pivot.
    ///
    /// Preconditions as on the plain store: `tgt`'s pivot was just removed
    /// and equals `src`'s pivot, and `src` is finalized.
    pub fn add_to_popped(&mut self, src: usize, tgt: usize) -> Result<()> {
        self.check_col(src)?;
        self.check_col(tgt)?;
        if src == tgt {
            return Err(Error::self_addition(src));
        }
        let Self { columns, perm, .. } = self;
        let key = |r: usize| perm[r];
        let (src_col, tgt_col) = super::sparse::two_cols_mut(columns, src, tgt);
        for &r in src_col.iter().skip(1) {
            heap::push(tgt_col, r, &key);
        }
        self.inserts_since_prune[tgt] += src_col.len().saturating_sub(1);
        self.maybe_prune(tgt);
        Ok(())
    }

    /// Reduce a column to duplicate-free perm-keyed heap order
    pub fn finalize(&mut self, idx: usize) -> Result<()> {
        self.check_col(idx)?;
        self.prune(idx);
        Ok(())
    }

    fn maybe_prune(&mut self, idx: usize) {
        if 2 * self.inserts_since_prune[idx] > self.columns[idx].len() {
            self.prune(idx);
        }
    }

    fn prune(&mut self, idx: usize) {
        let Self { columns, perm, .. } = self;
        heap::prune(&mut columns[idx], &|r| perm[r]);
        self.inserts_since_prune[idx] = 0;
    }

    /// Transpose observable rows `i` and `i+1` in O(1).
    ///
    /// Only the permutation arrays move; raw storage is untouched. The
    /// matrix may come out not-reduced; see [`Self::row_swap_needs_repair`].
    pub fn swap_rows(&mut self, i: usize) -> Result<()> {
        if i + 1 >= self.perm.len() {
            return Err(Error::row_out_of_range(i + 1, self.perm.len()));
        }
        let a = self.mrep[i];
        let b = self.mrep[i + 1];
        self.perm[a] = i + 1;
        self.perm[b] = i;
        self.mrep[i] = b;
        self.mrep[i + 1] = a;
        Ok(())
    }

    /// Transpose columns `j` and `j+1` in O(1)
    pub fn swap_columns(&mut self, j: usize) -> Result<()> {
        if j + 1 >= self.columns.len() {
            return Err(Error::col_out_of_range(j + 1, self.columns.len()));
        }
        self.columns.swap(j, j + 1);
        self.inserts_since_prune.swap(j, j + 1);
        Ok(())
    }

    /// Index of the column whose pivot is `r`, if any.
    ///
    /// Deliberately a linear scan: a cached pivot→column array goes stale
    /// under row transpositions, and the scan is the authoritative answer.
    pub fn find_column_with_pivot(&mut self, r: usize) -> Result<Option<usize>> {
        self.check_row(r)?;
        for j in 0..self.columns.len() {
            if self.pivot(j)? == Some(r) {
                return Ok(Some(j));
            }
        }
        Ok(None)
    }

    /// Vineyard signal: would swapping rows `i` and `i+1` break reducedness?
    ///
    /// Call on a reduced matrix *before* [`Self::swap_rows`]. Returns the
    /// column pair `(k, l)` with `pivot(k) = i`, `pivot(l) = i+1`, `k < l`,
    /// and entry `(i, l)` set: the configuration in which the swap leaves
    /// both columns with pivot `i+1`, and `add_to(k, l)` after the swap
    /// restores a reduced state. Returns `None` when the swap is safe.
    pub fn row_swap_needs_repair(&mut self, i: usize) -> Result<Option<(usize, usize)>> {
        if i + 1 >= self.perm.len() {
            return Err(Error::row_out_of_range(i + 1, self.perm.len()));
        }
        let Some(k) = self.find_column_with_pivot(i)? else {
            return Ok(None);
        };
        let Some(l) = self.find_column_with_pivot(i + 1)? else {
            return Ok(None);
        };
        if k < l && self.contains(i, l)? {
            Ok(Some((k, l)))
        } else {
            Ok(None)
        }
    }

    /// Reduce in place and return the `U` factor, with `M = R · U`.
    ///
    /// Left-to-right scan with pivot bookkeeping: every column addition
    /// `add_to(c, j)` on `self` is mirrored by the opposite row operation
    /// `add_row(j, c)` on `U`. On return, `self` is the reduced factor `R`
    /// and `U` is upper-triangular with unit diagonal.
    pub fn decompose_ru(&mut self) -> Result<RowPriorityPermutedMatrix> {
        debug!(
            rows = self.num_rows(),
            cols = self.num_cols(),
            "starting RU decomposition"
        );
        let mut u = RowPriorityPermutedMatrix::identity(self.num_cols());
        let mut low_col: Vec<Option<usize>> = vec![None; self.num_rows()];
        for j in 0..self.columns.len() {
            while let Some(l) = self.pivot(j)? {
                match low_col[l] {
                    Some(c) => {
                        self.add_to(c, j)?;
                        u.add_row(j, c)?;
                    }
                    None => {
                        low_col[l] = Some(j);
                        break;
                    }
                }
            }
        }
        debug!("RU decomposition complete");
        Ok(u)
    }

    /// Dense mod-2 rendering in observable row order, for tests and debugging
    pub fn to_dense(&self) -> Array2<u8> {
        let mut dense = Array2::zeros((self.perm.len(), self.columns.len()));
        for (j, col) in self.columns.iter().enumerate() {
            for &stored in col {
                dense[[self.perm[stored], j]] ^= 1;
            }
        }
        dense
    }
}

/// The permuted store viewed with rows and columns exchanged.
///
/// Holds the `U` factor of an RU-decomposition, whose maintenance consists
/// of row operations: those become column operations on the wrapped store,
/// where they are cheap. The permutation of the wrapped store runs along
/// this matrix's *column* axis.
#[derive(Debug, Clone)]
pub struct RowPriorityPermutedMatrix {
    inner: PermutedMatrix,
}

impl RowPriorityPermutedMatrix {
    /// Create a square identity matrix
    pub fn identity(size: usize) -> Self {
        Self {
            inner: PermutedMatrix::identity(size),
        }
    }

    /// Number of columns
    pub fn width(&self) -> usize {
        self.inner.num_rows()
    }

    /// Number of rows
    pub fn height(&self) -> usize {
        self.inner.num_cols()
    }

    /// Whether observable `(row, col)` is set
    pub fn contains(&self, row: usize, col: usize) -> Result<bool> {
        self.inner.contains(col, row)
    }

    /// Push a raw entry for observable `(row, col)`; construction-time only
    pub fn set_entry(&mut self, row: usize, col: usize) -> Result<()> {
        self.inner.set_entry(col, row)
    }

    /// Add row `src` to row `tgt` (mod 2)
    pub fn add_row(&mut self, src: usize, tgt: usize) -> Result<()> {
        self.inner.add_to(src, tgt)
    }

    /// Transpose rows `i` and `i+1` (storage swap)
    pub fn swap_rows(&mut self, i: usize) -> Result<()> {
        self.inner.swap_columns(i)
    }

    /// Transpose columns `j` and `j+1` (permutation update)
    pub fn swap_columns(&mut self, j: usize) -> Result<()> {
        self.inner.swap_rows(j)
    }

    /// Dense mod-2 rendering, for tests and debugging
    pub fn to_dense(&self) -> Array2<u8> {
        self.inner.to_dense().reversed_axes()
    }
}
