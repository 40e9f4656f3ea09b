//! Bigraded matrices: column stores grouped by bigrade
//!
//! A bigraded matrix pairs a sparse column store with an [`IndexMatrix`]
//! that names, per bigrade, the interval of columns carrying that bigrade.
//! Two layouts exist: colex order (`y` outer, `x` inner) is the resting
//! representation handed to consumers; lex order (`x` outer, `y` inner) is
//! what the reduction produces. Converting from lex to colex moves whole
//! bigrade runs of columns and consumes the source.

use crate::error::Result;
use crate::matrix::{IndexMatrix, SparseMatrix};

/// Sparse mod-2 matrix whose columns are laid out in colex bigrade order
#[derive(Debug, Clone)]
pub struct BigradedMatrix {
    /// Column store, colex-ordered by bigrade
    pub mat: SparseMatrix,
    /// Last column index of each bigrade in the colex layout
    pub ind: IndexMatrix,
}

/// Sparse mod-2 matrix whose columns are laid out in lex bigrade order
#[derive(Debug, Clone)]
pub struct BigradedMatrixLex {
    /// Column store, lex-ordered by bigrade
    pub mat: SparseMatrix,
    /// Last column index of each bigrade in the lex layout
    pub ind: IndexMatrix,
}

impl BigradedMatrix {
    /// Create an all-zero matrix over a `grades_y × grades_x` grid
    pub fn new(rows: usize, cols: usize, grades_y: usize, grades_x: usize) -> Self {
        Self {
            mat: SparseMatrix::new(rows, cols),
            ind: IndexMatrix::new(grades_y, grades_x),
        }
    }

    /// Number of rows of the column store
    pub fn height(&self) -> usize {
        self.mat.num_rows()
    }

    /// Number of columns of the column store
    pub fn width(&self) -> usize {
        self.mat.num_cols()
    }

    /// Rebuild a lex-layout matrix in colex order, consuming it.
    ///
    /// Walks bigrades in colex order and moves each bigrade's run of
    /// columns into the next free slots, recording the new intervals.
    pub fn from_lex(mut lex: BigradedMatrixLex) -> Result<Self> {
        let mut out = Self::new(
            lex.mat.num_rows(),
            lex.mat.num_cols(),
            lex.ind.height(),
            lex.ind.width(),
        );
        let mut next = 0usize;
        for y in 0..out.ind.height() {
            for x in 0..out.ind.width() {
                let first = lex.ind.start_index_lex(y, x)?;
                let last = lex.ind.get(y, x)?;
                if last >= first as i32 {
                    for j in first..=(last as usize) {
                        out.mat.move_col_from(&mut lex.mat, j, next)?;
                        next += 1;
                    }
                }
                out.ind.set(y, x, next as i32 - 1)?;
            }
        }
        Ok(out)
    }
}

impl BigradedMatrixLex {
    /// Create an all-zero matrix over a `grades_y × grades_x` grid
    pub fn new(rows: usize, cols: usize, grades_y: usize, grades_x: usize) -> Self {
        Self {
            mat: SparseMatrix::new(rows, cols),
            ind: IndexMatrix::new(grades_y, grades_x),
        }
    }

    /// Number of rows of the column store
    pub fn height(&self) -> usize {
        self.mat.num_rows()
    }

    /// Number of columns of the column store
    pub fn width(&self) -> usize {
        self.mat.num_cols()
    }

    /// First column of bigrade `(x, y)` in this layout
    pub fn start_index(&self, y: usize, x: usize) -> Result<usize> {
        self.ind.start_index_lex(y, x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lex_reorders_columns() {
        // lex layout over a 2x2 grid: one column at (0,1), one at (1,0);
        // lex visits (0,1) first, colex wants (1,0) first
        let mut lex = BigradedMatrixLex::new(2, 2, 2, 2);
        lex.mat.set_entry(0, 0).unwrap(); // the (0,1) column
        lex.mat.set_entry(1, 1).unwrap(); // the (1,0) column
        lex.mat.heapify_col(0).unwrap();
        lex.mat.heapify_col(1).unwrap();
        lex.ind.set(0, 0, -1).unwrap();
        lex.ind.set(1, 0, 0).unwrap();
        lex.ind.set(0, 1, 1).unwrap();
        lex.ind.set(1, 1, 1).unwrap();

        let colex = BigradedMatrix::from_lex(lex).unwrap();
        assert_eq!(colex.width(), 2);
        // the (1,0) column now comes first
        assert!(colex.mat.contains(1, 0).unwrap());
        assert!(colex.mat.contains(0, 1).unwrap());
        assert_eq!(colex.ind.get(0, 0).unwrap(), -1);
        assert_eq!(colex.ind.get(0, 1).unwrap(), 0);
        assert_eq!(colex.ind.get(1, 0).unwrap(), 1);
        assert_eq!(colex.ind.get(1, 1).unwrap(), 1);
    }

    #[test]
    fn test_from_lex_same_bigrade_run_stays_contiguous() {
        let mut lex = BigradedMatrixLex::new(3, 3, 1, 1);
        for j in 0..3 {
            lex.mat.set_entry(j, j).unwrap();
            lex.mat.heapify_col(j).unwrap();
        }
        lex.ind.set(0, 0, 2).unwrap();

        let colex = BigradedMatrix::from_lex(lex).unwrap();
        assert_eq!(colex.ind.get(0, 0).unwrap(), 2);
        for j in 0..3 {
            assert!(colex.mat.contains(j, j).unwrap());
        }
    }

    #[test]
    fn test_empty_grid() {
        let lex = BigradedMatrixLex::new(0, 0, 0, 0);
        let colex = BigradedMatrix::from_lex(lex).unwrap();
        assert_eq!(colex.width(), 0);
        assert_eq!(colex.height(), 0);
    }
}
