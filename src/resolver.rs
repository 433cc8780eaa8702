//! The resolution pipeline.
//!
//! `Resolver` ties the stages together in fixed order: key dedup, bot
//! screening, roster derivation, matrix construction, clustering, and
//! canonical assignment. Each stage runs exactly once per call; there is
//! no backtracking and no state carried between calls, so a resolution
//! is a pure function of its records and configuration.

use tracing::{debug, info};

use crate::assign::{assign_canonical_ids, CanonicalAssignment};
use crate::cluster::ClusterEngine;
use crate::distance::Threshold;
use crate::error::{ConfigError, ResolveResult};
use crate::filter::{BotFilter, BotPolicy};
use crate::matrix::MatrixBuilder;
use crate::normalize::{NameNormalizer, DEFAULT_BAN_WORDS};
use crate::record::{dedup_by_key, derive_rows, IdentityRecord};

/// Configuration for a [`Resolver`].
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Maximum complete-linkage distance at which clusters still merge.
    pub threshold: Threshold,

    /// Tokens stripped from display names during normalization.
    pub ban_words: Vec<String>,

    /// Screening applied before clustering.
    pub bot_policy: BotPolicy,

    /// Matrix worker threads. 0 or 1 selects the sequential path.
    pub matrix_workers: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            ban_words: DEFAULT_BAN_WORDS.iter().map(|word| (*word).to_string()).collect(),
            bot_policy: BotPolicy::default(),
            matrix_workers: 2,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration with the given threshold and defaults
    /// everywhere else.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ThresholdOutOfRange` if the value is NaN or
    /// not in [0.0, 1.0].
    pub fn with_threshold(value: f64) -> Result<Self, ConfigError> {
        Ok(Self {
            threshold: Threshold::new(value)?,
            ..Self::default()
        })
    }
}

/// Runs the full identity-resolution pipeline.
///
/// # Examples
///
/// ```
/// use aliasmatch::{IdentityRecord, Resolver, ResolverConfig};
///
/// let records = vec![
///     IdentityRecord::from_parts("John Smith", "john@x.com", "jsmith", "a"),
///     IdentityRecord::from_parts("J. Smith", "john@x.com", "jsmith2", "b"),
/// ];
/// let resolver = Resolver::new(ResolverConfig::default());
/// let assignment = resolver.resolve(&records).unwrap();
/// assert_eq!(assignment.get("a"), assignment.get("b"));
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    config: ResolverConfig,
    normalizer: NameNormalizer,
}

impl Resolver {
    /// Creates a resolver from a configuration.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let normalizer = NameNormalizer::new(config.ban_words.iter().cloned());
        Self { config, normalizer }
    }

    /// Returns the configuration this resolver runs with.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves a record set into a canonical assignment.
    ///
    /// Every `initial_id` in `records` appears in the result exactly
    /// once, including records screened out by the bot policy.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an empty record set or an
    /// uncompilable bot pattern, and an internal error if a matrix
    /// worker fails.
    pub fn resolve(&self, records: &[IdentityRecord]) -> ResolveResult<CanonicalAssignment> {
        if records.is_empty() {
            return Err(ConfigError::EmptyInput.into());
        }
        let filter = BotFilter::compile(&self.config.bot_policy)?;

        let unique = dedup_by_key(records);
        let (excluded, active): (Vec<&IdentityRecord>, Vec<&IdentityRecord>) = unique
            .into_iter()
            .partition(|record| filter.is_bot(record));
        debug!(
            records = records.len(),
            active = active.len(),
            excluded = excluded.len(),
            "screened record set"
        );

        let (rows, matrix) = MatrixBuilder::new(self.config.matrix_workers)
            .build_from_records(&active, &self.normalizer)?;
        let labels = ClusterEngine::new(self.config.threshold).cluster(&matrix);
        let excluded_rows = derive_rows(&excluded, &self.normalizer);
        let assignment = assign_canonical_ids(&rows, &labels, &excluded_rows);

        info!(
            keys = assignment.len(),
            identities = assignment.distinct_ids(),
            threshold = self.config.threshold.value(),
            "resolved record set"
        );
        Ok(assignment)
    }
}

/// Resolves records at the given distance threshold, with default
/// settings everywhere else.
///
/// # Errors
///
/// Returns `ConfigError::ThresholdOutOfRange` for an invalid threshold
/// and `ConfigError::EmptyInput` for an empty record set.
pub fn resolve(
    records: &[IdentityRecord],
    distance_threshold: f64,
) -> ResolveResult<CanonicalAssignment> {
    Resolver::new(ResolverConfig::with_threshold(distance_threshold)?).resolve(records)
}
