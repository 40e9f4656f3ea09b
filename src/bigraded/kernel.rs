//! Bigraded reduction: kernels of bigraded matrices
//!
//! A single standard persistence reduction computes the kernel of a colex
//! bigraded matrix, visiting bigrades in lex order. A slave identity matrix
//! runs alongside the reduction; whenever a column of the input reduces to
//! zero, the corresponding slave column is a kernel generator and is moved
//! into the emerging lex-ordered kernel.
//!
//! The pivot bookkeeping (`lows`) is global across bigrades: generators
//! found early keep suppressing duplicates at later bigrades, which is what
//! gives the kernel its bigrade grouping. Within one bigrade, a column that
//! is certain to change has its pivot popped up front so every addition can
//! take the fast path that skips the shared pivot.

use tracing::{debug, trace};

use super::matrix::{BigradedMatrix, BigradedMatrixLex};
use crate::error::{Error, Result};
use crate::matrix::SparseMatrix;

impl BigradedMatrix {
    /// Compute a bigrade-sorted basis of the kernel.
    ///
    /// The input columns must be finalized. `self` is reduced in place; the
    /// returned matrix is colex-ordered, with one column per kernel
    /// generator expressed in the input's column indices.
    pub fn kernel(&mut self) -> Result<BigradedMatrix> {
        self.kernel_with_cancel(|| true)
    }

    /// [`Self::kernel`] with a cooperative cancellation callback.
    ///
    /// `should_continue` is polled once per bigrade; when it returns false
    /// the computation stops with [`Error::AbortedByCaller`] and the partial
    /// result is dropped.
    pub fn kernel_with_cancel(
        &mut self,
        mut should_continue: impl FnMut() -> bool,
    ) -> Result<BigradedMatrix> {
        debug!(
            rows = self.height(),
            cols = self.width(),
            grades_y = self.ind.height(),
            grades_x = self.ind.width(),
            "computing bigraded kernel"
        );
        let cols = self.mat.num_cols();
        let mut slave = SparseMatrix::identity(cols);
        let mut ker = BigradedMatrixLex::new(cols, 0, self.ind.height(), self.ind.width());
        let mut lows: Vec<Option<usize>> = vec![None; self.mat.num_rows()];

        for x in 0..self.ind.width() {
            for y in 0..self.ind.height() {
                if !should_continue() {
                    return Err(Error::AbortedByCaller);
                }
                self.reduce_one_bigrade(&mut slave, &mut ker, x, y, &mut lows)?;
            }
        }

        debug!(generators = ker.mat.num_cols(), "bigraded kernel computed");
        BigradedMatrix::from_lex(ker)
    }

    /// Reduce the columns visible at bigrade `(x, y)` and collect the
    /// generators that appear there.
    fn reduce_one_bigrade(
        &mut self,
        slave: &mut SparseMatrix,
        ker: &mut BigradedMatrixLex,
        x: usize,
        y: usize,
        lows: &mut [Option<usize>],
    ) -> Result<()> {
        let first_col = self.ind.start_index(y, 0)?;
        let first_col_this = self.ind.start_index(y, x)?;
        let last_col = self.ind.get(y, x)?;
        trace!(x, y, first_col, last_col, "reducing bigrade");

        if last_col >= first_col as i32 {
            for j in first_col..=(last_col as usize) {
                let mut low = self.mat.pivot_finalized(j)?;
                let changing =
                    matches!(low, Some(l) if matches!(lows[l], Some(c) if c < j));
                if changing {
                    // the pivot is about to cancel; pop it now so every
                    // addition below can skip the source's copy of it
                    self.mat.remove_pivot(j)?;
                }

                while let Some(l) = low {
                    let Some(c) = lows[l].filter(|&c| c < j) else {
                        break;
                    };
                    self.mat.add_to_popped(c, j)?;
                    slave.add_to(c, j)?;
                    low = self.mat.remove_pivot(j)?;
                }

                match low {
                    Some(l) => {
                        lows[l] = Some(j);
                        if changing {
                            // undo the speculative pop and leave the column
                            // finalized for later bigrades
                            self.mat.push_index(j, l)?;
                            self.mat.finalize(j)?;
                        }
                    }
                    None => {
                        if changing {
                            // zeroed just now: the slave column is a generator
                            slave.finalize(j)?;
                            ker.mat.append_col_from(slave, j)?;
                        } else if j >= first_col_this {
                            // zero on entry at its own bigrade: the untouched
                            // slave column is a generator as well
                            ker.mat.append_col_from(slave, j)?;
                        }
                    }
                }
            }
        }

        ker.ind.set(y, x, ker.mat.num_cols() as i32 - 1)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// Build a colex bigraded matrix from `(rows, x, y)` column descriptors
    /// given in colex order of bigrade.
    fn bigraded(
        rows: usize,
        grades_y: usize,
        grades_x: usize,
        cols: &[(&[usize], usize, usize)],
    ) -> BigradedMatrix {
        let mut m = BigradedMatrix::new(rows, cols.len(), grades_y, grades_x);
        for (j, (entries, _, _)) in cols.iter().enumerate() {
            for &r in *entries {
                m.mat.set_entry(r, j).unwrap();
            }
            m.mat.heapify_col(j).unwrap();
            m.mat.finalize(j).unwrap();
        }
        let mut last = -1i32;
        let mut k = 0;
        for y in 0..grades_y {
            for x in 0..grades_x {
                while k < cols.len() && cols[k].1 == x && cols[k].2 == y {
                    last = k as i32;
                    k += 1;
                }
                m.ind.set(y, x, last).unwrap();
            }
        }
        m
    }

    /// Sorted observable entries of a kernel column
    fn ker_col(ker: &BigradedMatrix, j: usize) -> Vec<usize> {
        let mut v = ker.mat.col_entries(j).unwrap().to_vec();
        v.sort_unstable();
        v
    }

    /// Check that every kernel column XORs the referenced input columns to zero
    fn assert_kernel_annihilates(input: &BigradedMatrix, ker: &BigradedMatrix) {
        let dense = input.mat.to_dense();
        for j in 0..ker.width() {
            let mut acc = vec![0u8; input.height()];
            for &c in ker.mat.col_entries(j).unwrap() {
                for r in 0..input.height() {
                    acc[r] ^= dense[[r, c]];
                }
            }
            assert!(acc.iter().all(|&b| b == 0), "kernel column {j} not in kernel");
        }
    }

    #[test]
    fn test_identity_has_trivial_kernel() {
        let mut m = bigraded(3, 1, 1, &[(&[0], 0, 0), (&[1], 0, 0), (&[2], 0, 0)]);
        let ker = m.kernel().unwrap();
        assert_eq!(ker.width(), 0);
        assert_eq!(ker.ind.get(0, 0).unwrap(), -1);
    }

    #[test]
    fn test_duplicate_columns_give_one_generator() {
        // two equal columns: the only generator is their sum
        let mut m = bigraded(3, 1, 1, &[(&[0, 1], 0, 0), (&[0, 1], 0, 0)]);
        let ker = m.kernel().unwrap();
        assert_eq!(ker.width(), 1);
        assert_eq!(ker_col(&ker, 0), vec![0, 1]);
        assert_eq!(ker.ind.get(0, 0).unwrap(), 0);
    }

    #[test]
    fn test_zero_column_is_captured_at_its_bigrade() {
        // a column that is zero on entry contributes its own unit generator
        let mut m = bigraded(3, 1, 1, &[(&[0, 1], 0, 0), (&[0, 1], 0, 0), (&[], 0, 0)]);
        let ker = m.kernel().unwrap();
        assert_eq!(ker.width(), 2);
        assert_eq!(ker_col(&ker, 0), vec![0, 1]);
        assert_eq!(ker_col(&ker, 1), vec![2]);
        assert_eq!(ker.ind.get(0, 0).unwrap(), 1);
    }

    #[test]
    fn test_generators_grouped_by_bigrade() {
        // c0, c1 at (0,0); c2, c3 at (1,0): one generator per bigrade
        let mut m = bigraded(
            2,
            1,
            2,
            &[(&[0], 0, 0), (&[0], 0, 0), (&[1], 1, 0), (&[1], 1, 0)],
        );
        let ker = m.kernel().unwrap();
        assert_eq!(ker.width(), 2);
        assert_eq!(ker_col(&ker, 0), vec![0, 1]);
        assert_eq!(ker_col(&ker, 1), vec![2, 3]);
        assert_eq!(ker.ind.get(0, 0).unwrap(), 0);
        assert_eq!(ker.ind.get(0, 1).unwrap(), 1);
    }

    #[test]
    fn test_kernel_comes_out_in_colex_order() {
        // generators appear at (0,0) and (1,1) across a 2x2 grid; the lex
        // discovery order and the colex output order must both hold up
        let mut m = bigraded(
            2,
            2,
            2,
            &[
                (&[0], 0, 0),
                (&[0], 0, 0),
                (&[1], 1, 0),
                (&[1], 0, 1),
            ],
        );
        let ker = m.kernel().unwrap();
        assert_eq!(ker.width(), 2);
        assert_eq!(ker_col(&ker, 0), vec![0, 1]);
        assert_eq!(ker.ind.get(0, 0).unwrap(), 0);
        // the second generator combines the (1,0) and (0,1) columns and so
        // lives at the join (1,1)
        assert_eq!(ker_col(&ker, 1), vec![2, 3]);
        assert_eq!(ker.ind.get(0, 1).unwrap(), 0);
        assert_eq!(ker.ind.get(1, 0).unwrap(), 0);
        assert_eq!(ker.ind.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_kernel_annihilates_random_input() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..10 {
            let rows = 12;
            let cols = 16;
            let mut m = BigradedMatrix::new(rows, cols, 2, 2);
            for j in 0..cols {
                for r in 0..rows {
                    if rng.gen_bool(0.3) {
                        m.mat.set_entry(r, j).unwrap();
                    }
                }
                m.mat.heapify_col(j).unwrap();
                m.mat.finalize(j).unwrap();
            }
            // spread the columns over the colex walk of the grid
            let boundaries = [cols / 4, cols / 2, 3 * cols / 4, cols];
            let mut runs = boundaries.iter();
            let mut last = 0usize;
            for y in 0..2 {
                for x in 0..2 {
                    last = *runs.next().unwrap();
                    m.ind.set(y, x, last as i32 - 1).unwrap();
                }
            }
            assert_eq!(last, cols);

            let pristine = m.clone();
            let ker = m.kernel().unwrap();

            assert_kernel_annihilates(&pristine, &ker);
            // independence: every generator keeps a distinct pivot
            let mut pivots = Vec::new();
            for j in 0..ker.width() {
                let p = ker.mat.pivot_finalized(j).unwrap();
                assert!(p.is_some());
                pivots.push(p.unwrap());
            }
            let mut dedup = pivots.clone();
            dedup.sort_unstable();
            dedup.dedup();
            assert_eq!(dedup.len(), pivots.len());
        }
    }

    #[test]
    fn test_kernel_index_matrix_is_monotone() {
        let mut m = bigraded(
            2,
            2,
            2,
            &[
                (&[0], 0, 0),
                (&[0], 0, 0),
                (&[1], 1, 0),
                (&[1], 0, 1),
            ],
        );
        let ker = m.kernel().unwrap();
        let mut prev = -1;
        for y in 0..2 {
            for x in 0..2 {
                let v = ker.ind.get(y, x).unwrap();
                assert!(v >= prev);
                prev = v;
            }
        }
    }

    #[test]
    fn test_cancellation_aborts() {
        let mut m = bigraded(3, 1, 1, &[(&[0, 1], 0, 0), (&[0, 1], 0, 0)]);
        assert_eq!(
            m.kernel_with_cancel(|| false).unwrap_err(),
            Error::AbortedByCaller
        );
    }

    #[test]
    fn test_cancellation_mid_run() {
        let mut m = bigraded(
            2,
            2,
            2,
            &[(&[0], 0, 0), (&[0], 0, 0), (&[1], 1, 0), (&[1], 0, 1)],
        );
        let mut budget = 2;
        let result = m.kernel_with_cancel(|| {
            if budget == 0 {
                return false;
            }
            budget -= 1;
            true
        });
        assert_eq!(result.unwrap_err(), Error::AbortedByCaller);
    }
}
