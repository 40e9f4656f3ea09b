//! # bigraded-persistence
//!
//! Bigraded mod-2 sparse linear algebra for two-parameter persistent
//! homology.
//!
//! ## Overview
//!
//! A two-parameter filtration grades the columns of its boundary matrices
//! by a pair `(x, y)` of grid coordinates. Computing barcode templates for
//! such a filtration reduces, over and over, to two linear-algebra problems
//! over the two-element field:
//!
//! 1. **Bigraded kernels**: a basis of the kernel of a boundary matrix,
//!    sorted and grouped by bigrade, so that the generators visible at any
//!    grid point can be read off an index table.
//!
//! 2. **Vineyard updates**: maintaining an RU-decomposition of a reduced
//!    matrix while adjacent rows and columns transpose, as a query line
//!    sweeps the parameter plane.
//!
//! Both are served by one storage idea: a column is a lazy max-heap of row
//! indices in which membership is parity of occurrences. Column addition is
//! then a batch of heap pushes whose duplicates cancel at the next pivot
//! read; periodic pruning keeps columns near their logical size.
//!
//! ## Modules
//!
//! - [`matrix`]: the lazy-heap column store, its permutation-aware variant,
//!   and the bigrade index table.
//! - [`bigraded`]: bigraded matrices in colex and lex layouts and the
//!   bigraded kernel computation.
//! - [`error`]: the crate's error type.
//!
//! Input parsing, arrangement construction, and barcode queries live in the
//! surrounding system; this crate only sees matrices.

pub mod bigraded;
pub mod error;
pub mod matrix;

// Re-exports from matrix
pub use matrix::{IndexMatrix, PermutedMatrix, RowPriorityPermutedMatrix, SparseMatrix};

// Re-exports from bigraded
pub use bigraded::{BigradedMatrix, BigradedMatrixLex};

// Re-exports from error
pub use error::{Error, Result};
