//! Pairwise record similarity.
//!
//! Two records are compared through four independent heuristics, each a
//! distance in [0.0, 1.0] where 0.0 means confidently the same person.
//! The final distance is the minimum of the four: any one strongly
//! matching signal is enough to merge a pair. That trades precision for
//! recall on purpose, because contributors routinely change display
//! names while keeping an email, or change emails while keeping a login.
//!
//! Missing fields never fail a comparison. They degrade the signals that
//! would have read them to the uninformative value 1.0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::DerivedRecord;

/// Maximum complete-linkage distance at which two clusters may still
/// merge.
///
/// Valid values cover the closed interval [0.0, 1.0]. Both endpoints are
/// meaningful: 0.0 merges only exact-distance-zero pairs, 1.0 collapses
/// every record into one cluster.
///
/// # Examples
///
/// ```
/// use aliasmatch::Threshold;
///
/// let threshold = Threshold::new(0.25).unwrap();
/// assert_eq!(threshold.value(), 0.25);
/// assert!(Threshold::new(1.5).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Threshold(f64);

impl Threshold {
    /// Minimum valid threshold value.
    pub const MIN_VALUE: f64 = 0.0;

    /// Maximum valid threshold value.
    pub const MAX_VALUE: f64 = 1.0;

    /// Default merge distance, conservative enough that only strongly
    /// matching signals join two identities.
    pub const DEFAULT_VALUE: f64 = 0.1;

    /// Creates a new threshold with validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ThresholdOutOfRange` if the value is NaN or
    /// not in [0.0, 1.0].
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value.is_nan() {
            return Err(ConfigError::ThresholdOutOfRange { value });
        }
        if !(Self::MIN_VALUE..=Self::MAX_VALUE).contains(&value) {
            return Err(ConfigError::ThresholdOutOfRange { value });
        }
        Ok(Self(value))
    }

    /// Returns the underlying value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(Self::DEFAULT_VALUE)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Levenshtein distance normalized by the longer operand's character
/// count.
///
/// Two empty strings are at distance 0.0 (the divide-by-zero guard);
/// callers that consider empty-vs-empty uninformative must gate on
/// emptiness themselves, as the name and handle signals do.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn normalized_edit_distance(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 0.0;
    }
    strsim::levenshtein(a, b) as f64 / longest as f64
}

/// Edit distance over a handle pair, guarded against short operands.
///
/// Handles of one or two characters collide constantly ("x", "jd"), so
/// the comparison only participates when both operands are longer than
/// two characters. Otherwise it contributes the uninformative 1.0.
fn guarded_edit_distance(a: &str, b: &str) -> f64 {
    if a.chars().count() > 2 && b.chars().count() > 2 {
        normalized_edit_distance(a, b)
    } else {
        1.0
    }
}

/// True when both name tokens of one record appear inside a single handle
/// of the other record.
///
/// Both tokens must be longer than one character and must land in the
/// same handle (both in the email, or both in the login). Handles are
/// compared raw, so the check is case-sensitive.
fn contained_in_handles(first: &str, last: &str, other: &DerivedRecord) -> bool {
    if first.chars().count() <= 1 || last.chars().count() <= 1 {
        return false;
    }
    let within = |handle: &str| handle.contains(first) && handle.contains(last);
    within(&other.email) || within(&other.login)
}

/// The four sub-distances behind one record-pair comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubDistances {
    /// Edit distance over the whole normalized names
    pub name: f64,

    /// Mean edit distance over the first-name and last-name tokens
    pub part_name: f64,

    /// Name-tokens-contained-in-handle check, 0.0 or 1.0
    pub handle_containment: f64,

    /// Edit distance over email local parts and over logins
    pub handle: f64,
}

impl SubDistances {
    /// Combines the four signals into the final pair distance.
    #[must_use]
    pub fn combined(&self) -> f64 {
        self.name
            .min(self.part_name)
            .min(self.handle_containment)
            .min(self.handle)
    }
}

/// Computes all four sub-distances for a pair of roster rows.
///
/// When either normalized name is empty the whole name group (full name,
/// name parts) is uninformative. Without that gate two nameless records
/// would compare as identical through the empty-string edit distance.
#[must_use]
pub fn sub_distances(a: &DerivedRecord, b: &DerivedRecord) -> SubDistances {
    let names_known = !a.normalized_name.is_empty() && !b.normalized_name.is_empty();
    let (name, part_name) = if names_known {
        (
            normalized_edit_distance(&a.normalized_name, &b.normalized_name),
            (normalized_edit_distance(&a.first_name, &b.first_name)
                + normalized_edit_distance(&a.last_name, &b.last_name))
                / 2.0,
        )
    } else {
        (1.0, 1.0)
    };

    let handle_containment = if contained_in_handles(&a.first_name, &a.last_name, b)
        || contained_in_handles(&b.first_name, &b.last_name, a)
    {
        0.0
    } else {
        1.0
    };

    let handle = guarded_edit_distance(&a.short_email, &b.short_email)
        .min(guarded_edit_distance(&a.login, &b.login));

    SubDistances {
        name,
        part_name,
        handle_containment,
        handle,
    }
}

/// The final distance between two roster rows: the minimum sub-distance.
#[must_use]
pub fn record_distance(a: &DerivedRecord, b: &DerivedRecord) -> f64 {
    sub_distances(a, b).combined()
}
