//! Display-name normalization.
//!
//! Raw contributor names arrive with punctuation, mixed case, honorifics,
//! and shared-mailbox markers ("admin", "support"). Normalization strips
//! all of that so the similarity heuristics compare only the identifying
//! tokens. Emails and logins are deliberately left untouched; the handle
//! heuristics compare them raw.

use std::collections::HashSet;

/// Tokens dropped from display names before comparison: generational and
/// honorific suffixes plus shared-mailbox markers.
pub const DEFAULT_BAN_WORDS: [&str; 7] = ["jr", "sr", "dr", "mr", "mrs", "admin", "support"];

/// Cleans raw display names into comparable token sequences.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    ban_words: HashSet<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BAN_WORDS)
    }
}

impl NameNormalizer {
    /// Creates a normalizer with a custom ban-word list.
    ///
    /// Ban words are matched against tokens that have already been
    /// lower-cased and stripped of punctuation, so entries should be
    /// lowercase.
    pub fn new<I, S>(ban_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ban_words: ban_words.into_iter().map(Into::into).collect(),
        }
    }

    /// Normalizes a raw display name.
    ///
    /// Removes every ASCII-punctuation character (without inserting
    /// spaces, so "Smith-Jones" becomes "smithjones"), lower-cases,
    /// splits on whitespace, drops ban-listed tokens, and re-joins with
    /// single spaces. Empty input yields the empty string.
    ///
    /// # Examples
    ///
    /// ```
    /// use aliasmatch::NameNormalizer;
    ///
    /// let normalizer = NameNormalizer::default();
    /// assert_eq!(normalizer.normalize_name("Dr. John Smith-Jones"), "john smithjones");
    /// ```
    #[must_use]
    pub fn normalize_name(&self, raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_ascii_punctuation())
            .collect::<String>()
            .to_lowercase();
        cleaned
            .split_whitespace()
            .filter(|token| !self.ban_words.contains(*token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// First whitespace-delimited token of a normalized name, or `""` when the
/// name has no tokens.
#[must_use]
pub fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

/// Last whitespace-delimited token of a normalized name, or `""` when the
/// name has no tokens.
#[must_use]
pub fn last_name(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or("")
}

/// Local part of an email address: everything before the first `@`.
///
/// An address without `@` is returned unchanged; empty input yields `""`.
#[must_use]
pub fn shorten_email(email: &str) -> &str {
    match email.split_once('@') {
        Some((local, _)) => local,
        None => email,
    }
}
