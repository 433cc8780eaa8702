//! Bot-account screening.
//!
//! Review and CI platforms are full of non-human accounts (build bots,
//! merge queues, shared infra mailboxes) that would otherwise soak up
//! clustering capacity and occasionally merge with real contributors.
//! Screening runs before similarity scoring; screened records never
//! enter the matrix but still receive canonical IDs through the
//! placeholder path.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::IdentityRecord;

/// Marker substrings that flag an account name as automation.
const BOT_MARKERS: &str = "(?i)(bot|test|jenkins|zuul|automation|build|job|infra)";

/// "ci" counts only as a whole word; as a substring it would flag
/// ordinary names ("Lucia", "Garcia").
const CI_MARKER: &str = r"(?i)\bci\b";

/// Which records are screened out before clustering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotPolicy {
    /// No screening; every record is clustered.
    Off,

    /// Built-in marker heuristics, optionally extended with the name of
    /// the project whose history is being resolved.
    Auto {
        #[serde(skip_serializing_if = "Option::is_none")]
        #[serde(default)]
        project: Option<String>,
    },

    /// Screen exactly the records whose `initial_id` is listed.
    Denylist {
        ids: BTreeSet<String>,
    },
}

impl Default for BotPolicy {
    fn default() -> Self {
        Self::Off
    }
}

#[derive(Debug)]
enum CompiledPolicy {
    Off,
    Auto {
        markers: Regex,
        ci: Regex,
        project: Option<Regex>,
    },
    Denylist {
        ids: BTreeSet<String>,
    },
}

/// Compiled form of a [`BotPolicy`], ready to screen records.
#[derive(Debug)]
pub struct BotFilter {
    inner: CompiledPolicy,
}

impl BotFilter {
    /// Compiles a policy's patterns once for the whole run.
    ///
    /// An empty project name is ignored rather than matched (an empty
    /// pattern matches every record).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidBotPattern` if a pattern fails to
    /// compile.
    pub fn compile(policy: &BotPolicy) -> Result<Self, ConfigError> {
        let inner = match policy {
            BotPolicy::Off => CompiledPolicy::Off,
            BotPolicy::Auto { project } => {
                let markers = compile_pattern(BOT_MARKERS)?;
                let ci = compile_pattern(CI_MARKER)?;
                let project = match project.as_deref() {
                    Some(name) if !name.is_empty() => {
                        Some(compile_pattern(&format!("(?i){}", regex::escape(name)))?)
                    }
                    _ => None,
                };
                CompiledPolicy::Auto {
                    markers,
                    ci,
                    project,
                }
            }
            BotPolicy::Denylist { ids } => CompiledPolicy::Denylist { ids: ids.clone() },
        };
        Ok(Self { inner })
    }

    /// Returns true if the record should be excluded from clustering.
    ///
    /// The heuristics read the display name, falling back to the login
    /// when the name is absent or empty. A record with neither is never
    /// screened.
    #[must_use]
    pub fn is_bot(&self, record: &IdentityRecord) -> bool {
        match &self.inner {
            CompiledPolicy::Off => false,
            CompiledPolicy::Denylist { ids } => ids.contains(&record.initial_id),
            CompiledPolicy::Auto {
                markers,
                ci,
                project,
            } => {
                let subject = record
                    .name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .or(record.login.as_deref())
                    .unwrap_or("");
                if subject.is_empty() {
                    return false;
                }
                markers.is_match(subject)
                    || ci.is_match(subject)
                    || project.as_ref().is_some_and(|p| p.is_match(subject))
            }
        }
    }
}

fn compile_pattern(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|err| ConfigError::InvalidBotPattern {
        reason: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, login: &str, key: &str) -> IdentityRecord {
        IdentityRecord::from_parts(name, "", login, key)
    }

    fn auto_filter(project: Option<&str>) -> BotFilter {
        BotFilter::compile(&BotPolicy::Auto {
            project: project.map(str::to_string),
        })
        .unwrap()
    }

    #[test]
    fn test_off_screens_nothing() {
        let filter = BotFilter::compile(&BotPolicy::Off).unwrap();
        assert!(!filter.is_bot(&record("Jenkins Builder", "jenkins", "k1")));
    }

    #[test]
    fn test_auto_flags_marker_names() {
        let filter = auto_filter(None);
        assert!(filter.is_bot(&record("Jenkins Builder", "", "k1")));
        assert!(filter.is_bot(&record("zuul", "", "k2")));
        assert!(filter.is_bot(&record("nightly-build", "", "k3")));
        assert!(filter.is_bot(&record("Infra Team", "", "k4")));
        assert!(filter.is_bot(&record("welcome bot", "", "k5")));
    }

    #[test]
    fn test_auto_ci_matches_whole_word_only() {
        let filter = auto_filter(None);
        assert!(filter.is_bot(&record("CI", "", "k1")));
        assert!(filter.is_bot(&record("ci runner", "", "k2")));
        assert!(!filter.is_bot(&record("Lucia", "", "k3")));
        assert!(!filter.is_bot(&record("Patricia Garcia", "", "k4")));
    }

    #[test]
    fn test_auto_falls_back_to_login() {
        let filter = auto_filter(None);
        assert!(filter.is_bot(&record("", "test-runner", "k1")));
        assert!(!filter.is_bot(&record("", "alovelace", "k2")));
        assert!(!filter.is_bot(&record("", "", "k3")));
    }

    #[test]
    fn test_auto_ignores_ordinary_humans() {
        let filter = auto_filter(None);
        assert!(!filter.is_bot(&record("Ada Lovelace", "alovelace", "k1")));
        assert!(!filter.is_bot(&record("John Smith", "jsmith", "k2")));
    }

    #[test]
    fn test_auto_project_name() {
        let with_project = auto_filter(Some("neutron"));
        assert!(with_project.is_bot(&record("Neutron Gate", "", "k1")));

        let without_project = auto_filter(None);
        assert!(!without_project.is_bot(&record("Neutron Gate", "", "k1")));
    }

    #[test]
    fn test_auto_empty_project_is_ignored() {
        let filter = auto_filter(Some(""));
        assert!(!filter.is_bot(&record("Ada Lovelace", "", "k1")));
    }

    #[test]
    fn test_denylist_matches_ids_exactly() {
        let ids: BTreeSet<String> = ["bot-7".to_string()].into_iter().collect();
        let filter = BotFilter::compile(&BotPolicy::Denylist { ids }).unwrap();
        assert!(filter.is_bot(&record("Anything", "any", "bot-7")));
        assert!(!filter.is_bot(&record("Anything", "any", "bot-8")));
    }
}
