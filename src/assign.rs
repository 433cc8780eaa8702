//! Canonical ID assignment.
//!
//! Clustering produces per-row labels; this module turns them into the
//! final output: dense 0-based canonical IDs covering every input key.
//! The numbering order is part of the contract. Clusters are ranked by
//! size descending, then label descending, because downstream consumers
//! rely on which cluster receives ID 0 when sizes tie. Rows excluded
//! from clustering travel through the same ranking under synthetic
//! negative labels with size zero, which places them after every real
//! cluster while keeping their roster order.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::DerivedRecord;

/// Canonical contributor identifier.
///
/// IDs are dense: a resolution with k distinct identities uses exactly
/// 0 through k - 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalId(u64);

impl CanonicalId {
    /// Returns the underlying integer.
    #[must_use]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The resolved mapping from every input key to its canonical ID.
///
/// Backed by an ordered map, so iteration and serialization are
/// deterministic. Looking up a key that was never part of the input
/// returns `None`; it never panics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalAssignment {
    entries: BTreeMap<String, CanonicalId>,
}

impl CanonicalAssignment {
    /// Returns the canonical ID for a key, or `None` for a key that was
    /// never presented.
    #[must_use]
    pub fn get(&self, initial_id: &str) -> Option<CanonicalId> {
        self.entries.get(initial_id).copied()
    }

    /// Returns true if the key was part of the resolved input.
    #[must_use]
    pub fn contains_key(&self, initial_id: &str) -> bool {
        self.entries.contains_key(initial_id)
    }

    /// Number of covered keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no keys are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of distinct canonical IDs.
    #[must_use]
    pub fn distinct_ids(&self) -> u64 {
        self.entries
            .values()
            .map(|id| id.0)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Iterates over `(key, id)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, CanonicalId)> + '_ {
        self.entries.iter().map(|(key, id)| (key.as_str(), *id))
    }
}

impl IntoIterator for CanonicalAssignment {
    type Item = (String, CanonicalId);
    type IntoIter = std::collections::btree_map::IntoIter<String, CanonicalId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Assigns dense canonical IDs across clustered and excluded rows.
///
/// `labels` pairs each clustered row with its cluster label; `excluded`
/// rows never entered clustering and receive the placeholder treatment.
/// Every key on every row ends up in the returned assignment; keys are
/// expected to be unique across rows.
///
/// # Panics
///
/// Panics if `clustered` and `labels` differ in length.
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn assign_canonical_ids(
    clustered: &[DerivedRecord],
    labels: &[usize],
    excluded: &[DerivedRecord],
) -> CanonicalAssignment {
    assert_eq!(
        clustered.len(),
        labels.len(),
        "one label per clustered row"
    );

    let label_count = labels.iter().max().map_or(0, |max| max + 1);
    let mut size_of_label = vec![0_usize; label_count];
    for &label in labels {
        size_of_label[label] += 1;
    }

    // Real clusters keep their non-negative labels; each excluded row
    // gets a unique negative label with size zero, exactly as if it had
    // come out of clustering as an unmergeable group.
    let mut groups: Vec<(usize, i64)> = size_of_label
        .iter()
        .enumerate()
        .filter(|&(_, &size)| size > 0)
        .map(|(label, &size)| (size, label as i64))
        .collect();
    for position in 0..excluded.len() {
        groups.push((0, -(position as i64) - 1));
    }
    groups.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let id_of_label: HashMap<i64, CanonicalId> = groups
        .iter()
        .enumerate()
        .map(|(id, &(_, label))| (label, CanonicalId(id as u64)))
        .collect();

    let mut entries = BTreeMap::new();
    for (row, &label) in clustered.iter().zip(labels) {
        let id = id_of_label[&(label as i64)];
        for key in &row.keys {
            entries.insert(key.clone(), id);
        }
    }
    for (position, row) in excluded.iter().enumerate() {
        let id = id_of_label[&(-(position as i64) - 1)];
        for key in &row.keys {
            entries.insert(key.clone(), id);
        }
    }

    CanonicalAssignment { entries }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::NameNormalizer;
    use crate::record::IdentityRecord;

    fn row(name: &str, key: &str) -> DerivedRecord {
        let record = IdentityRecord::from_parts(name, "", "", key);
        DerivedRecord::derive(&record, &NameNormalizer::default())
    }

    #[test]
    fn test_bigger_cluster_gets_id_zero() {
        let rows = vec![row("a", "k0"), row("b", "k1"), row("c", "k2"), row("d", "k3")];
        let labels = vec![0, 1, 1, 1];
        let assignment = assign_canonical_ids(&rows, &labels, &[]);
        assert_eq!(assignment.get("k1").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("k2").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("k3").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("k0").unwrap().as_u64(), 1);
    }

    #[test]
    fn test_size_tie_breaks_on_higher_label() {
        let rows = vec![row("a", "k0"), row("b", "k1"), row("c", "k2"), row("d", "k3")];
        let labels = vec![0, 0, 1, 1];
        let assignment = assign_canonical_ids(&rows, &labels, &[]);
        // Both clusters have size 2; the higher label wins ID 0.
        assert_eq!(assignment.get("k2").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("k3").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("k0").unwrap().as_u64(), 1);
        assert_eq!(assignment.get("k1").unwrap().as_u64(), 1);
    }

    #[test]
    fn test_excluded_rows_follow_real_clusters() {
        let rows = vec![row("a", "k0"), row("b", "k1")];
        let labels = vec![0, 0];
        let excluded = vec![row("jenkins", "bot-1"), row("zuul", "bot-2")];
        let assignment = assign_canonical_ids(&rows, &labels, &excluded);
        assert_eq!(assignment.get("k0").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("k1").unwrap().as_u64(), 0);
        assert_eq!(assignment.get("bot-1").unwrap().as_u64(), 1);
        assert_eq!(assignment.get("bot-2").unwrap().as_u64(), 2);
        assert_eq!(assignment.distinct_ids(), 3);
    }

    #[test]
    fn test_multi_key_row_shares_one_id() {
        let mut shared = row("", "k0");
        shared.keys.push("k1".to_string());
        let assignment = assign_canonical_ids(&[shared], &[0], &[]);
        assert_eq!(assignment.len(), 2);
        assert_eq!(assignment.get("k0"), assignment.get("k1"));
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let assignment = assign_canonical_ids(&[row("a", "k0")], &[0], &[]);
        assert_eq!(assignment.get("never-seen"), None);
        assert!(!assignment.contains_key("never-seen"));
        assert!(assignment.contains_key("k0"));
    }

    #[test]
    fn test_ids_are_dense() {
        let rows = vec![row("a", "k0"), row("b", "k1"), row("c", "k2")];
        let labels = vec![0, 1, 2];
        let excluded = vec![row("bot", "k3")];
        let assignment = assign_canonical_ids(&rows, &labels, &excluded);
        let mut ids: Vec<u64> = assignment.iter().map(|(_, id)| id.as_u64()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_input_yields_empty_assignment() {
        let assignment = assign_canonical_ids(&[], &[], &[]);
        assert!(assignment.is_empty());
        assert_eq!(assignment.distinct_ids(), 0);
    }

    #[test]
    fn test_assignment_serde_roundtrip() {
        let rows = vec![row("a", "k0"), row("b", "k1")];
        let assignment = assign_canonical_ids(&rows, &[0, 1], &[]);
        let json = serde_json::to_string(&assignment).unwrap();
        let back: CanonicalAssignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, assignment);
    }
}
