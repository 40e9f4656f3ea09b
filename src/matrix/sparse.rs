//! Sparse Column Store: mod-2 matrices with lazy-heap columns
//!
//! Each column is a multiset of raw row indices kept in max-heap order; a
//! row belongs to the column iff it occurs an odd number of times. Column
//! addition pushes the source's raw entries onto the target and lets
//! duplicates cancel lazily at the next pivot read, which keeps additions
//! cheap near the pivot during reduction.
//!
//! ## Column states
//!
//! A column moves through three states, driven by the caller:
//!
//! - *Dirty*: raw entries in arbitrary order, as left by [`SparseMatrix::set_entry`].
//!   Pivot queries are not meaningful here.
//! - *Heaped*: heap order, duplicates possible. Entered via
//!   [`SparseMatrix::heapify_col`]; maintained by every addition.
//! - *Finalized*: heap order, duplicate-free. Entered via
//!   [`SparseMatrix::finalize`]; required by [`SparseMatrix::pivot_finalized`]
//!   and by the fast-path addition [`SparseMatrix::add_to_popped`].
//!
//! [`SparseMatrix::sort_col`] puts a column in a fourth, terminal state
//! (ascending, duplicate-free) used by the presentation-minimization path;
//! only the `*_sorted` operations are valid there.

use ndarray::Array2;

use super::heap;
use super::scratch::with_scratch;
use crate::error::{Error, Result};

fn natural_key(r: usize) -> usize {
    r
}

/// Column-sparse mod-2 matrix with lazy max-heap columns
#[derive(Debug, Clone, Default)]
pub struct SparseMatrix {
    /// Raw column storage; heap order under the natural key
    columns: Vec<Vec<usize>>,
    /// Raw pushes into each column since it was last pruned
    inserts_since_prune: Vec<usize>,
    num_rows: usize,
}

impl SparseMatrix {
    /// Create an all-zero matrix of the given dimensions
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            columns: vec![Vec::new(); cols],
            inserts_since_prune: vec![0; cols],
            num_rows: rows,
        }
    }

    /// Create a square identity matrix
    pub fn identity(size: usize) -> Self {
        Self {
            columns: (0..size).map(|i| vec![i]).collect(),
            inserts_since_prune: vec![0; size],
            num_rows: size,
        }
    }

    /// Number of rows
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Number of columns
    pub fn num_cols(&self) -> usize {
        self.columns.len()
    }

    /// Resize to `n` columns; new columns are zero
    pub fn set_num_cols(&mut self, n: usize) {
        self.columns.resize(n, Vec::new());
        self.inserts_since_prune.resize(n, 0);
    }

    /// Reserve capacity for `n` additional columns
    pub fn reserve_cols(&mut self, n: usize) {
        self.columns.reserve(n);
        self.inserts_since_prune.reserve(n);
    }

    fn check_col(&self, idx: usize) -> Result<()> {
        if idx >= self.columns.len() {
            return Err(Error::col_out_of_range(idx, self.columns.len()));
        }
        Ok(())
    }

    fn check_row(&self, row: usize) -> Result<()> {
        if row >= self.num_rows {
            return Err(Error::row_out_of_range(row, self.num_rows));
        }
        Ok(())
    }

    /// Push a raw entry onto a column.
    ///
    /// The caller promises the entry is not already present. No heap order
    /// is restored; [`Self::heapify_col`] or [`Self::finalize`] must run on
    /// the column before any pivot query.
    pub fn set_entry(&mut self, row: usize, col: usize) -> Result<()> {
        self.check_row(row)?;
        self.check_col(col)?;
        #[cfg(feature = "paranoid")]
        if self.columns[col].iter().filter(|&&r| r == row).count() % 2 == 1 {
            return Err(Error::InvariantViolation {
                reason: format!("duplicate entry ({row}, {col})"),
            });
        }
        self.columns[col].push(row);
        Ok(())
    }

    /// Whether `(row, col)` is logically set (odd multiplicity)
    pub fn contains(&self, row: usize, col: usize) -> Result<bool> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.columns[col].iter().filter(|&&r| r == row).count() % 2 == 1)
    }

    /// Raw entries of a column.
    ///
    /// Meaningful as a logical set only after [`Self::finalize`] (or
    /// [`Self::sort_col`]); before that, duplicates encode mod-2 parity.
    pub fn col_entries(&self, idx: usize) -> Result<&[usize]> {
        self.check_col(idx)?;
        Ok(&self.columns[idx])
    }

    /// Append a new column containing the given rows
    pub fn append_col(&mut self, rows: &[usize]) -> Result<()> {
        for &r in rows {
            self.check_row(r)?;
        }
        let mut col = rows.to_vec();
        heap::make(&mut col, &natural_key);
        self.columns.push(col);
        self.inserts_since_prune.push(0);
        Ok(())
    }

    /// Move column `src` of `other` to the back of this matrix.
    ///
    /// The source column is left empty. Row spaces must agree; the caller
    /// guarantees this (the reduction hands slave columns to the kernel
    /// matrix this way).
    pub fn append_col_from(&mut self, other: &mut SparseMatrix, src: usize) -> Result<()> {
        other.check_col(src)?;
        self.columns.push(std::mem::take(&mut other.columns[src]));
        self.inserts_since_prune.push(0);
        other.inserts_since_prune[src] = 0;
        Ok(())
    }

    /// Move column `src` onto column `dst`, leaving `src` empty
    pub fn move_col(&mut self, src: usize, dst: usize) -> Result<()> {
        self.check_col(src)?;
        self.check_col(dst)?;
        if src != dst {
            self.columns[dst] = std::mem::take(&mut self.columns[src]);
            self.inserts_since_prune[dst] = self.inserts_since_prune[src];
            self.inserts_since_prune[src] = 0;
        }
        Ok(())
    }

    /// Move column `src` of `other` onto column `dst` of this matrix
    pub fn move_col_from(&mut self, other: &mut SparseMatrix, src: usize, dst: usize) -> Result<()> {
        other.check_col(src)?;
        self.check_col(dst)?;
        self.columns[dst] = std::mem::take(&mut other.columns[src]);
        self.inserts_since_prune[dst] = other.inserts_since_prune[src];
        other.inserts_since_prune[src] = 0;
        Ok(())
    }

    /// Zero a column, releasing its storage
    pub fn clear(&mut self, idx: usize) -> Result<()> {
        self.check_col(idx)?;
        self.columns[idx] = Vec::new();
        self.inserts_since_prune[idx] = 0;
        Ok(())
    }

    /// Impose heap order on a column's raw entries
    pub fn heapify_col(&mut self, idx: usize) -> Result<()> {
        self.check_col(idx)?;
        heap::make(&mut self.columns[idx], &natural_key);
        Ok(())
    }

    /// Largest row index of odd multiplicity, or `None` for a zero column.
    ///
    /// Pops cancelled pairs off the top of the heap and pushes the survivor
    /// back, so the column's logical content is unchanged.
    pub fn pivot(&mut self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        let col = &mut self.columns[idx];
        let max = heap::pop_pivot(col, &natural_key);
        if let Some(p) = max {
            heap::push(col, p, &natural_key);
        }
        Ok(max)
    }

    /// O(1) pivot read for a finalized (duplicate-free) column
    pub fn pivot_finalized(&self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        Ok(self.columns[idx].first().copied())
    }

    /// Pop and return the pivot, removing it from the column
    pub fn remove_pivot(&mut self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        Ok(heap::pop_pivot(&mut self.columns[idx], &natural_key))
    }

    /// Add `row` as a fresh entry, restoring heap order.
    ///
    /// Used right after [`Self::remove_pivot`] to undo it.
    pub fn push_index(&mut self, idx: usize, row: usize) -> Result<()> {
        self.check_col(idx)?;
        self.check_row(row)?;
        heap::push(&mut self.columns[idx], row, &natural_key);
        Ok(())
    }

    /// Add column `src` to column `tgt` (mod 2)
    pub fn add_to(&mut self, src: usize, tgt: usize) -> Result<()> {
        self.check_col(src)?;
        self.check_col(tgt)?;
        if src == tgt {
            return Err(Error::self_addition(src));
        }
        let (src_col, tgt_col) = two_cols_mut(&mut self.columns, src, tgt);
        for &r in src_col {
            heap::push(tgt_col, r, &natural_key);
        }
        self.inserts_since_prune[tgt] += src_col.len();
        self.maybe_prune(tgt);
        Ok(())
    }

    /// Add column `src` of `other` to column `tgt` of this matrix (mod 2)
    pub fn add_to_from(&mut self, other: &SparseMatrix, src: usize, tgt: usize) -> Result<()> {
        other.check_col(src)?;
        self.check_col(tgt)?;
        let src_col = &other.columns[src];
        for &r in src_col {
            heap::push(&mut self.columns[tgt], r, &natural_key);
        }
        self.inserts_since_prune[tgt] += src_col.len();
        self.maybe_prune(tgt);
        Ok(())
    }

    /// Fast-path addition that skips the source's pivot.
    ///
    /// Preconditions: `tgt`'s pivot was just removed via
    /// [`Self::remove_pivot`], it equals `src`'s pivot, and `src` is
    /// finalized (so its pivot sits at the front of the heap). The shared
    /// pivot then cancels without ever being pushed.
    pub fn add_to_popped(&mut self, src: usize, tgt: usize) -> Result<()> {
        self.check_col(src)?;
        self.check_col(tgt)?;
        if src == tgt {
            return Err(Error::self_addition(src));
        }
        let (src_col, tgt_col) = two_cols_mut(&mut self.columns, src, tgt);
        for &r in src_col.iter().skip(1) {
            heap::push(tgt_col, r, &natural_key);
        }
        self.inserts_since_prune[tgt] += src_col.len().saturating_sub(1);
        self.maybe_prune(tgt);
        Ok(())
    }

    /// [`Self::add_to_popped`] with the source column taken from `other`.
    ///
    /// Same preconditions. The bigraded reduction only exercises the
    /// in-matrix variant; this one exists for cross-matrix callers.
    pub fn add_to_popped_from(&mut self, other: &SparseMatrix, src: usize, tgt: usize) -> Result<()> {
        other.check_col(src)?;
        self.check_col(tgt)?;
        let src_col = &other.columns[src];
        for &r in src_col.iter().skip(1) {
            heap::push(&mut self.columns[tgt], r, &natural_key);
        }
        self.inserts_since_prune[tgt] += src_col.len().saturating_sub(1);
        self.maybe_prune(tgt);
        Ok(())
    }

    /// Reduce a column to duplicate-free heap order
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
        heap::prune(&mut self.columns[idx], &natural_key);
        self.inserts_since_prune[idx] = 0;
    }

    /// Rewrite each raw entry `r` of a column to `map[r]`
    pub fn reindex_column(&mut self, idx: usize, map: &[usize]) -> Result<()> {
        self.check_col(idx)?;
        for r in &self.columns[idx] {
            if *r >= map.len() {
                return Err(Error::row_out_of_range(*r, map.len()));
            }
        }
        for r in &mut self.columns[idx] {
            *r = map[*r];
        }
        Ok(())
    }

    /// Sort a column ascending, entering sorted mode
    pub fn sort_col(&mut self, idx: usize) -> Result<()> {
        self.check_col(idx)?;
        self.columns[idx].sort_unstable();
        Ok(())
    }

    /// Add column `src` to column `tgt`, both in sorted mode.
    ///
    /// Symmetric-difference merge through the scratch buffer; the result is
    /// again sorted and duplicate-free.
    pub fn add_to_sorted(&mut self, src: usize, tgt: usize) -> Result<()> {
        self.check_col(src)?;
        self.check_col(tgt)?;
        if src == tgt {
            return Err(Error::self_addition(src));
        }
        let (src_col, tgt_col) = two_cols_mut(&mut self.columns, src, tgt);
        with_scratch(|buf| {
            let (mut i, mut j) = (0, 0);
            while i < src_col.len() && j < tgt_col.len() {
                match src_col[i].cmp(&tgt_col[j]) {
                    std::cmp::Ordering::Less => {
                        buf.push(src_col[i]);
                        i += 1;
                    }
                    std::cmp::Ordering::Greater => {
                        buf.push(tgt_col[j]);
                        j += 1;
                    }
                    std::cmp::Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                }
            }
            buf.extend_from_slice(&src_col[i..]);
            buf.extend_from_slice(&tgt_col[j..]);
            tgt_col.clear();
            tgt_col.extend_from_slice(buf);
        });
        Ok(())
    }

    /// Largest row of a sorted-mode column
    pub fn max_sorted(&self, idx: usize) -> Result<Option<usize>> {
        self.check_col(idx)?;
        Ok(self.columns[idx].last().copied())
    }

    /// Membership test on a sorted-mode column
    pub fn contains_sorted(&self, row: usize, col: usize) -> Result<bool> {
        self.check_row(row)?;
        self.check_col(col)?;
        Ok(self.columns[col].binary_search(&row).is_ok())
    }

    /// Standard column reduction, in place.
    ///
    /// Left-to-right scan; whenever two columns share a pivot the earlier
    /// one is added into the current one. Columns must be heaped. After the
    /// call, nonzero columns have pairwise distinct pivots.
    pub fn reduce(&mut self) -> Result<()> {
        let mut lows: Vec<Option<usize>> = vec![None; self.num_rows];
        for j in 0..self.columns.len() {
            while let Some(l) = self.pivot(j)? {
                match lows[l] {
                    Some(c) => self.add_to(c, j)?,
                    None => {
                        lows[l] = Some(j);
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// Dense mod-2 rendering, for tests and debugging
    pub fn to_dense(&self) -> Array2<u8> {
        let mut dense = Array2::zeros((self.num_rows, self.columns.len()));
        for (j, col) in self.columns.iter().enumerate() {
            for &r in col {
                dense[[r, j]] ^= 1;
            }
        }
        dense
    }
}

/// Disjoint borrows of a source and a target column
pub(crate) fn two_cols_mut(
    cols: &mut [Vec<usize>],
    src: usize,
    tgt: usize,
) -> (&Vec<usize>, &mut Vec<usize>) {
    debug_assert_ne!(src, tgt);
    if src < tgt {
        let (head, tail) = cols.split_at_mut(tgt);
        (&head[src], &mut tail[0])
    } else {
        let (head, tail) = cols.split_at_mut(src);
        (&tail[0], &mut head[tgt])
    }
}
