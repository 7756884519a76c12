#![forbid(unsafe_code)]

//! Monte Carlo estimation of the site percolation threshold of square grids.
//!
//! [`Percolation`] tracks which sites of an `n` by `n` grid are open, whether
//! they are connected to the top row and whether the grid percolates.
//! [`PercolationStats`] opens random sites of fresh grids until they percolate
//! and aggregates the fractions of open sites.

pub mod error;
pub mod percolation;
pub mod source;
pub mod stats;
pub mod union_find;

pub use error::{Error, Result};
pub use percolation::{Percolation, Status};
pub use source::RandomSource;
pub use stats::{run_trial, Experiment, PercolationStats, Sampling, CONFIDENCE_95};
pub use union_find::UnionFind;
