//! Matrix Module: Sparse mod-2 stores and their bookkeeping
//!
//! Implements the column-sparse building blocks of the bigraded engine:
//!
//! - `sparse.rs`: the lazy-heap column store. Columns are max-heaps of raw
//!   row indices; membership is parity of occurrences, so additions are
//!   plain pushes and duplicates cancel at the next pivot read.
//!
//! - `permuted.rs`: the same storage discipline threaded through an explicit
//!   row permutation, giving O(1) row and column transpositions for
//!   vineyard updates, plus the RU-decomposition.
//!
//! - `index.rs`: the bigrade → column-interval table that a bigraded matrix
//!   pairs with its store.

mod heap;
mod index;
mod permuted;
mod scratch;
mod sparse;

pub use index::IndexMatrix;
pub use permuted::{PermutedMatrix, RowPriorityPermutedMatrix};
pub use sparse::SparseMatrix;
