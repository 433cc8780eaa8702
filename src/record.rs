//! Identity records and roster deduplication.
//!
//! A record is one observed raw identity triple plus the opaque key the
//! caller tracks it by. Before any pairwise comparison the record set is
//! collapsed onto a roster of unique rows: repeated keys are dropped after
//! their first occurrence, and records whose raw triples are identical
//! share a single row. The roster is what the matrix and clustering
//! stages operate on.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::normalize::{first_name, last_name, shorten_email, NameNormalizer};

/// One observed raw identity.
///
/// Any of the three fields may be absent; absence degrades the similarity
/// signals that would have read it, never the pipeline. The `initial_id`
/// is preserved verbatim into the output mapping.
///
/// # Examples
///
/// ```
/// use aliasmatch::IdentityRecord;
///
/// let record = IdentityRecord::from_composite_key("Jane Doe:jane@example.com:jdoe");
/// assert_eq!(record.name.as_deref(), Some("Jane Doe"));
/// assert_eq!(record.email.as_deref(), Some("jane@example.com"));
/// assert_eq!(record.login.as_deref(), Some("jdoe"));
/// assert_eq!(record.initial_id, "Jane Doe:jane@example.com:jdoe");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Display name as reported, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub name: Option<String>,

    /// Email address as reported, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub email: Option<String>,

    /// Login handle as reported, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub login: Option<String>,

    /// Opaque caller-supplied key
    pub initial_id: String,
}

impl IdentityRecord {
    /// Creates a record from explicit optional fields.
    #[must_use]
    pub fn new(
        name: Option<String>,
        email: Option<String>,
        login: Option<String>,
        initial_id: impl Into<String>,
    ) -> Self {
        Self {
            name,
            email,
            login,
            initial_id: initial_id.into(),
        }
    }

    /// Creates a record from borrowed fields, treating empty strings as
    /// absent.
    #[must_use]
    pub fn from_parts(name: &str, email: &str, login: &str, initial_id: impl Into<String>) -> Self {
        let field = |s: &str| (!s.is_empty()).then(|| s.to_string());
        Self {
            name: field(name),
            email: field(email),
            login: field(login),
            initial_id: initial_id.into(),
        }
    }

    /// Splits a composite `name:email:login` key into a record.
    ///
    /// The last colon-delimited segment is the login, the second-to-last
    /// the email, and everything before them (which may itself contain
    /// colons) the display name. A key with a single segment is treated
    /// as a bare login. Empty segments become absent fields. The full key
    /// becomes the record's `initial_id`.
    #[must_use]
    pub fn from_composite_key(key: &str) -> Self {
        let parts: Vec<&str> = key.split(':').collect();
        let (name, email, login) = match parts.as_slice() {
            [head @ .., email, login] => (head.join(":"), (*email).to_string(), (*login).to_string()),
            [login] => (String::new(), String::new(), (*login).to_string()),
            [] => (String::new(), String::new(), String::new()),
        };
        Self::from_parts(&name, &email, &login, key)
    }

    /// The raw field triple, with absent fields as empty strings.
    #[must_use]
    pub fn raw_triple(&self) -> (&str, &str, &str) {
        (
            self.name.as_deref().unwrap_or(""),
            self.email.as_deref().unwrap_or(""),
            self.login.as_deref().unwrap_or(""),
        )
    }
}

/// A deduplicated roster row carrying every field the similarity
/// heuristics read, derived once before matrix construction and never
/// mutated afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedRecord {
    /// Normalized display name, `""` when the record had none
    pub normalized_name: String,

    /// First token of the normalized name
    pub first_name: String,

    /// Last token of the normalized name
    pub last_name: String,

    /// Raw email, `""` when absent
    pub email: String,

    /// Local part of the raw email
    pub short_email: String,

    /// Raw login, `""` when absent
    pub login: String,

    /// Every `initial_id` collapsed onto this row, in input order
    pub keys: Vec<String>,
}

impl DerivedRecord {
    /// Derives the comparable fields for one record.
    #[must_use]
    pub fn derive(record: &IdentityRecord, normalizer: &NameNormalizer) -> Self {
        let (raw_name, email, login) = record.raw_triple();
        let normalized_name = normalizer.normalize_name(raw_name);
        Self {
            first_name: first_name(&normalized_name).to_string(),
            last_name: last_name(&normalized_name).to_string(),
            email: email.to_string(),
            short_email: shorten_email(email).to_string(),
            login: login.to_string(),
            normalized_name,
            keys: vec![record.initial_id.clone()],
        }
    }
}

/// Keeps the first record for each `initial_id`, preserving input order.
#[must_use]
pub fn dedup_by_key(records: &[IdentityRecord]) -> Vec<&IdentityRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.initial_id.as_str()))
        .collect()
}

/// Collapses records with identical raw triples onto single derived rows,
/// preserving first-occurrence order.
///
/// Each row accumulates the keys of every record that collapsed onto it.
/// This is what keeps structurally identical records on one canonical ID
/// even when all their similarity signals are uninformative.
#[must_use]
pub fn derive_rows(records: &[&IdentityRecord], normalizer: &NameNormalizer) -> Vec<DerivedRecord> {
    let mut index_of: HashMap<(&str, &str, &str), usize> = HashMap::new();
    let mut rows: Vec<DerivedRecord> = Vec::new();
    for record in records {
        match index_of.entry(record.raw_triple()) {
            Entry::Occupied(slot) => rows[*slot.get()].keys.push(record.initial_id.clone()),
            Entry::Vacant(slot) => {
                slot.insert(rows.len());
                rows.push(DerivedRecord::derive(record, normalizer));
            }
        }
    }
    rows
}
