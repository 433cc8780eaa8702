//! Agglomerative complete-linkage clustering.
//!
//! Clusters grow bottom-up from singletons: on every step the two active
//! clusters at minimum distance merge, until that minimum exceeds the
//! threshold. Cluster-to-cluster distance is complete linkage, the
//! maximum pairwise member distance, so a cluster only absorbs a row
//! that is close to every existing member. Complete linkage is monotone
//! (merge distances never decrease step over step), which is what makes
//! partitions at a lower threshold refinements of partitions at a higher
//! one.
//!
//! Determinism: the minimum scan keeps the first minimal pair in
//! ascending `(i, j)` order, and a merge folds the higher slot into the
//! lower, so a cluster's slot is always the smallest row index it
//! contains. Identical input always yields identical labels.

use tracing::debug;

use crate::distance::Threshold;
use crate::matrix::DistanceMatrix;

/// Cuts a distance matrix into clusters at a fixed merge threshold.
#[derive(Debug, Clone, Copy)]
pub struct ClusterEngine {
    threshold: Threshold,
}

impl ClusterEngine {
    /// Creates an engine merging up to the given distance.
    #[must_use]
    pub const fn new(threshold: Threshold) -> Self {
        Self { threshold }
    }

    /// Clusters the matrix rows, returning one dense label per row.
    ///
    /// Labels are numbered by first occurrence over row order: the
    /// cluster containing row 0 is labeled 0, the next distinct cluster
    /// encountered is labeled 1, and so on.
    #[must_use]
    pub fn cluster(&self, matrix: &DistanceMatrix) -> Vec<usize> {
        let n = matrix.len();
        if n == 0 {
            return Vec::new();
        }

        // Working copy of the matrix; merges overwrite it in place.
        let mut working = vec![0.0_f64; n * n];
        for i in 0..n {
            for j in 0..n {
                working[i * n + j] = matrix.get(i, j);
            }
        }

        let mut active = vec![true; n];
        let mut slot_of: Vec<usize> = (0..n).collect();
        let mut merges = 0_usize;

        loop {
            let mut best = f64::INFINITY;
            let mut best_pair: Option<(usize, usize)> = None;
            for i in 0..n {
                if !active[i] {
                    continue;
                }
                for j in (i + 1)..n {
                    if !active[j] {
                        continue;
                    }
                    let d = working[i * n + j];
                    if d < best {
                        best = d;
                        best_pair = Some((i, j));
                    }
                }
            }

            let Some((i, j)) = best_pair else {
                break;
            };
            if best > self.threshold.value() {
                break;
            }

            for k in 0..n {
                if !active[k] || k == i || k == j {
                    continue;
                }
                let merged = working[i * n + k].max(working[j * n + k]);
                working[i * n + k] = merged;
                working[k * n + i] = merged;
            }
            active[j] = false;
            for slot in &mut slot_of {
                if *slot == j {
                    *slot = i;
                }
            }
            merges += 1;
        }

        let mut label_of_slot: Vec<Option<usize>> = vec![None; n];
        let mut labels = Vec::with_capacity(n);
        let mut next = 0_usize;
        for row in 0..n {
            let label = match label_of_slot[slot_of[row]] {
                Some(label) => label,
                None => {
                    label_of_slot[slot_of[row]] = Some(next);
                    next += 1;
                    next - 1
                }
            };
            labels.push(label);
        }

        debug!(
            rows = n,
            merges,
            clusters = next,
            threshold = self.threshold.value(),
            "clustering complete"
        );
        labels
    }
}
