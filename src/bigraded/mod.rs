//! Bigraded Module: Matrices graded over a two-parameter grid
//!
//! Two-parameter filtrations attach a bigrade `(x, y)` to every column of a
//! boundary matrix. This module pairs the sparse stores with that grading:
//!
//! - `matrix.rs`: the colex- and lex-layout bigraded matrices and the
//!   column-moving conversion between them.
//!
//! - `kernel.rs`: the bigraded reduction, which walks bigrades in lex order
//!   and emits a bigrade-sorted basis of the kernel. Higher layers build
//!   presentations and barcode templates out of these kernels.

mod kernel;
mod matrix;

pub use matrix::{BigradedMatrix, BigradedMatrixLex};
