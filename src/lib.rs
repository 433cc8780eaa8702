//! # aliasmatch - Contributor identity resolution
//!
//! Commit logs and review systems reference the same human contributor
//! under many raw identity strings: display names drift, emails change,
//! logins differ per platform, and bot accounts add noise. aliasmatch
//! collapses a batch of raw identity records onto canonical contributor
//! IDs using a multi-signal similarity metric, full pairwise comparison,
//! and agglomerative complete-linkage clustering. The whole pipeline is
//! deterministic: identical input always yields identical IDs.
//!
//! ## Core Concepts
//!
//! - **IdentityRecord**: one observed raw `(name, email, login)` triple tied to an opaque key
//! - **Threshold**: the maximum complete-linkage distance at which clusters still merge
//! - **BotPolicy**: screening of automation accounts before clustering
//! - **CanonicalAssignment**: the total, deterministic key-to-ID mapping
//!
//! ## Usage
//!
//! ```
//! use aliasmatch::{resolve, IdentityRecord};
//!
//! let records = vec![
//!     IdentityRecord::from_parts("John Smith", "john@x.com", "jsmith", "rec-1"),
//!     IdentityRecord::from_parts("J. Smith", "john@x.com", "jsmith2", "rec-2"),
//!     IdentityRecord::from_parts("Alice Lee", "alee@co.com", "alee", "rec-3"),
//! ];
//!
//! let assignment = resolve(&records, 0.1).unwrap();
//! assert_eq!(assignment.get("rec-1"), assignment.get("rec-2"));
//! assert_ne!(assignment.get("rec-1"), assignment.get("rec-3"));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assign;
pub mod cluster;
pub mod distance;
pub mod error;
pub mod filter;
pub mod matrix;
pub mod normalize;
pub mod record;
pub mod resolver;

// Re-export primary types at crate root for convenience
pub use assign::{assign_canonical_ids, CanonicalAssignment, CanonicalId};
pub use cluster::ClusterEngine;
pub use distance::{
    normalized_edit_distance, record_distance, sub_distances, SubDistances, Threshold,
};
pub use error::{ConfigError, ResolveError, ResolveResult};
pub use filter::{BotFilter, BotPolicy};
pub use matrix::{DistanceMatrix, MatrixBuilder};
pub use normalize::{first_name, last_name, shorten_email, NameNormalizer, DEFAULT_BAN_WORDS};
pub use record::{dedup_by_key, derive_rows, DerivedRecord, IdentityRecord};
pub use resolver::{resolve, Resolver, ResolverConfig};
