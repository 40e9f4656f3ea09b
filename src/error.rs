//! Error types for the bigraded matrix core

use thiserror::Error;

/// Result type alias using the crate's [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by matrix operations
///
/// An empty-column pivot is reported as `None`, never as an error; these
/// variants cover genuine misuse or caller-requested cancellation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A row or column index past the stored dimensions
    #[error("{axis} index {index} out of range for dimension of size {size}")]
    IndexOutOfRange {
        /// The offending index
        index: usize,
        /// Size of the dimension that was indexed
        size: usize,
        /// Which axis was indexed ("row" or "column")
        axis: &'static str,
    },

    /// An operation that would corrupt the matrix state
    #[error("invariant violation: {reason}")]
    InvariantViolation {
        /// What was attempted
        reason: String,
    },

    /// The cancellation callback returned false
    #[error("computation aborted by caller")]
    AbortedByCaller,
}

impl Error {
    /// Create a row-axis out-of-range error
    pub fn row_out_of_range(index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { index, size, axis: "row" }
    }

    /// Create a column-axis out-of-range error
    pub fn col_out_of_range(index: usize, size: usize) -> Self {
        Self::IndexOutOfRange { index, size, axis: "column" }
    }

    /// Create a self-addition invariant violation
    pub fn self_addition(col: usize) -> Self {
        Self::InvariantViolation {
            reason: format!("adding column {col} to itself"),
        }
    }
}
