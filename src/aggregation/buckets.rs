//! Cause re-bucketing.
//!
//! Free-text stop names are collapsed into canonical buckets by an ordered
//! rule list. The first matching rule wins, so a cause is never counted in
//! two buckets.

use crate::config::CauseRule;
use crate::error::{DowntimeError, Result};
use regex::{Regex, RegexBuilder};

/// Compiled, ordered cause rules
#[derive(Debug, Clone)]
pub struct CauseBuckets {
    rules: Vec<(Regex, String)>,
}

impl CauseBuckets {
    /// Compile rules as case-insensitive regular expressions
    pub fn compile(rules: &[CauseRule]) -> Result<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                RegexBuilder::new(&rule.pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|regex| (regex, rule.bucket.clone()))
                    .map_err(|e| {
                        DowntimeError::configuration(format!(
                            "Invalid cause pattern '{}': {}",
                            rule.pattern, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    /// No rules: every cause is its own bucket
    pub fn identity() -> Self {
        Self { rules: Vec::new() }
    }

    /// Canonical bucket of a cause name
    pub fn bucket<'a>(&'a self, cause: &'a str) -> &'a str {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.is_match(cause))
            .map(|(_, bucket)| bucket.as_str())
            .unwrap_or(cause)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
