//! Index Matrix: bigrade → column-interval bookkeeping
//!
//! For a matrix whose columns are grouped by bigrade, `ind[y][x]` records
//! the index of the last column of bigrade `(x, y)` in the layout (or of the
//! closest earlier bigrade when `(x, y)` has no columns); `-1` means no
//! column at or before that bigrade. Together with the predecessor queries
//! this names the half-open run of columns at each bigrade, in either the
//! colex walk (`y` outer, `x` inner) or the lex walk (`x` outer, `y` inner).

use ndarray::Array2;

use crate::error::{Error, Result};

/// Bigrade bookkeeping table of signed column indices
#[derive(Debug, Clone)]
pub struct IndexMatrix {
    ind: Array2<i32>,
}

impl IndexMatrix {
    /// Create an `height × width` table with every entry `-1`
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            ind: Array2::from_elem((height, width), -1),
        }
    }

    /// Grid height (number of `y` grades)
    pub fn height(&self) -> usize {
        self.ind.nrows()
    }

    /// Grid width (number of `x` grades)
    pub fn width(&self) -> usize {
        self.ind.ncols()
    }

    fn check(&self, y: usize, x: usize) -> Result<()> {
        if y >= self.ind.nrows() {
            return Err(Error::row_out_of_range(y, self.ind.nrows()));
        }
        if x >= self.ind.ncols() {
            return Err(Error::col_out_of_range(x, self.ind.ncols()));
        }
        Ok(())
    }

    /// Record `v` as the last column index of bigrade `(x, y)`
    pub fn set(&mut self, y: usize, x: usize, v: i32) -> Result<()> {
        self.check(y, x)?;
        self.ind[[y, x]] = v;
        Ok(())
    }

    /// Last column index of bigrade `(x, y)`, `-1` if none at or before it
    pub fn get(&self, y: usize, x: usize) -> Result<i32> {
        self.check(y, x)?;
        Ok(self.ind[[y, x]])
    }

    /// First column of bigrade `(x, y)` in a colex-ordered layout.
    ///
    /// One past the end of the colex predecessor's run: the bigrade to the
    /// left in the same row, or the last bigrade of the previous row.
    pub fn start_index(&self, y: usize, x: usize) -> Result<usize> {
        self.check(y, x)?;
        let prev = if x > 0 {
            self.ind[[y, x - 1]]
        } else if y > 0 {
            self.ind[[y - 1, self.ind.ncols() - 1]]
        } else {
            -1
        };
        Ok((prev + 1) as usize)
    }

    /// First column of bigrade `(x, y)` in a lex-ordered layout.
    ///
    /// Same idea with the walk transposed: the predecessor is the bigrade
    /// below in the same column, or the top bigrade of the previous column.
    pub fn start_index_lex(&self, y: usize, x: usize) -> Result<usize> {
        self.check(y, x)?;
        let prev = if y > 0 {
            self.ind[[y - 1, x]]
        } else if x > 0 {
            self.ind[[self.ind.nrows() - 1, x - 1]]
        } else {
            -1
        };
        Ok((prev + 1) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colex_intervals() {
        // colex layout over a 2x2 grid: two columns at (0,0), none at (1,0),
        // one at (0,1), one at (1,1)
        let mut ind = IndexMatrix::new(2, 2);
        ind.set(0, 0, 1).unwrap();
        ind.set(0, 1, 1).unwrap();
        ind.set(1, 0, 2).unwrap();
        ind.set(1, 1, 3).unwrap();

        assert_eq!(ind.start_index(0, 0).unwrap(), 0);
        assert_eq!(ind.start_index(0, 1).unwrap(), 2); // empty run: start > end
        assert_eq!(ind.start_index(1, 0).unwrap(), 2);
        assert_eq!(ind.start_index(1, 1).unwrap(), 3);
    }

    #[test]
    fn test_lex_intervals() {
        // lex layout over the same grid: one column at (0,0), one at (0,1),
        // two at (1,0), none at (1,1)
        let mut ind = IndexMatrix::new(2, 2);
        ind.set(0, 0, 0).unwrap();
        ind.set(1, 0, 1).unwrap();
        ind.set(0, 1, 3).unwrap();
        ind.set(1, 1, 3).unwrap();

        assert_eq!(ind.start_index_lex(0, 0).unwrap(), 0);
        assert_eq!(ind.start_index_lex(1, 0).unwrap(), 1);
        assert_eq!(ind.start_index_lex(0, 1).unwrap(), 2);
        assert_eq!(ind.start_index_lex(1, 1).unwrap(), 4); // empty run
    }

    #[test]
    fn test_unset_prefix() {
        let ind = IndexMatrix::new(2, 2);
        assert_eq!(ind.get(0, 0).unwrap(), -1);
        assert_eq!(ind.start_index(0, 0).unwrap(), 0);
        assert_eq!(ind.start_index(1, 0).unwrap(), 0);
    }

    #[test]
    fn test_bounds() {
        let ind = IndexMatrix::new(2, 3);
        assert!(ind.get(2, 0).is_err());
        assert!(ind.get(0, 3).is_err());
    }
}
