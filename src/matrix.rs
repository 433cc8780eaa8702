//! Pairwise distance matrix construction.
//!
//! Every clustering decision reads from one symmetric n-by-n matrix of
//! record distances, built here in full before any merging starts. Each
//! cell depends only on two immutable roster rows, so the upper triangle
//! can be computed by independent workers; rows are interleaved across
//! the pool to balance the shrinking triangle and assembled at a single
//! barrier. The parallel and sequential paths produce bit-identical
//! matrices.

use std::thread;

use crossbeam_channel::bounded;
use tracing::debug;

use crate::distance::record_distance;
use crate::error::{ResolveError, ResolveResult};
use crate::normalize::NameNormalizer;
use crate::record::{derive_rows, DerivedRecord, IdentityRecord};

/// Symmetric matrix of pairwise record distances with a zero diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    len: usize,
    cells: Vec<f64>,
}

impl DistanceMatrix {
    fn zeroed(len: usize) -> Self {
        Self {
            len,
            cells: vec![0.0; len * len],
        }
    }

    /// Builds a matrix by evaluating `pair` over the upper triangle.
    ///
    /// Symmetry and the zero diagonal are applied automatically; `pair`
    /// is never called with `i >= j`.
    pub fn from_fn(len: usize, mut pair: impl FnMut(usize, usize) -> f64) -> Self {
        let mut matrix = Self::zeroed(len);
        for i in 0..len {
            for j in (i + 1)..len {
                matrix.set(i, j, pair(i, j));
            }
        }
        matrix
    }

    /// Number of rows (equally, columns).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the matrix has no rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the distance between rows `i` and `j`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.len && j < self.len, "matrix index out of bounds");
        self.cells[i * self.len + j]
    }

    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.cells[i * self.len + j] = value;
        self.cells[j * self.len + i] = value;
    }
}

/// Computes the distance matrix for a roster, sequentially or on a small
/// worker pool.
#[derive(Debug, Clone, Copy)]
pub struct MatrixBuilder {
    workers: usize,
}

impl MatrixBuilder {
    /// Creates a builder. A `workers` value of 0 or 1 selects the
    /// sequential path.
    #[must_use]
    pub const fn new(workers: usize) -> Self {
        Self { workers }
    }

    /// Collapses records onto the unique roster and computes their
    /// matrix in one step.
    ///
    /// # Errors
    ///
    /// Propagates the worker failures described on [`Self::build`].
    pub fn build_from_records(
        &self,
        records: &[&IdentityRecord],
        normalizer: &NameNormalizer,
    ) -> ResolveResult<(Vec<DerivedRecord>, DistanceMatrix)> {
        let rows = derive_rows(records, normalizer);
        let matrix = self.build(&rows)?;
        Ok((rows, matrix))
    }

    /// Computes the full matrix for the given roster rows.
    ///
    /// # Errors
    ///
    /// Returns an internal error if a worker thread cannot be spawned or
    /// a worker disappears before delivering its rows.
    pub fn build(&self, rows: &[DerivedRecord]) -> ResolveResult<DistanceMatrix> {
        let n = rows.len();
        if n < 2 {
            return Ok(DistanceMatrix::zeroed(n));
        }
        let workers = self.workers.min(n);
        debug!(rows = n, workers, "building distance matrix");
        if workers <= 1 {
            return Ok(Self::build_sequential(rows));
        }
        Self::build_parallel(rows, workers)
    }

    fn build_sequential(rows: &[DerivedRecord]) -> DistanceMatrix {
        DistanceMatrix::from_fn(rows.len(), |i, j| record_distance(&rows[i], &rows[j]))
    }

    fn build_parallel(rows: &[DerivedRecord], workers: usize) -> ResolveResult<DistanceMatrix> {
        let n = rows.len();
        let mut matrix = DistanceMatrix::zeroed(n);
        // One message per row; capacity n means senders never block, so
        // workers run to completion even if assembly bails out early.
        let (tx, rx) = bounded::<(usize, Vec<f64>)>(n);

        thread::scope(|scope| -> ResolveResult<()> {
            for idx in 0..workers {
                let tx = tx.clone();
                thread::Builder::new()
                    .name(format!("aliasmatch-matrix-{idx}"))
                    .spawn_scoped(scope, move || {
                        let mut row = idx;
                        while row < n {
                            let mut cells = Vec::with_capacity(n - row - 1);
                            for col in (row + 1)..n {
                                cells.push(record_distance(&rows[row], &rows[col]));
                            }
                            let _ = tx.send((row, cells));
                            row += workers;
                        }
                    })
                    .map_err(|err| {
                        ResolveError::internal(format!("failed to spawn matrix worker: {err}"))
                    })?;
            }
            drop(tx);

            for _ in 0..n {
                let (row, cells) = rx.recv().map_err(|_| {
                    ResolveError::internal("matrix worker disconnected before finishing")
                })?;
                for (offset, distance) in cells.into_iter().enumerate() {
                    matrix.set(row, row + 1 + offset, distance);
                }
            }
            Ok(())
        })?;

        Ok(matrix)
    }
}
