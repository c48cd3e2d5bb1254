//! Compaction threshold parsing.

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Output size above which the first phase is compacted.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextLimit {
    /// Share of `context_budget`, in percent.
    Percentage(f32),
    /// Character count.
    Absolute(usize),
}

impl ContextLimit {
    /// Effective character limit for the given context budget.
    pub fn effective_limit(&self, context_budget: usize) -> usize {
        match *self {
            Self::Percentage(share) => (context_budget as f32 * share / 100.0) as usize,
            Self::Absolute(limit) => limit,
        }
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self, ContextLimit::Percentage(_))
    }
}

impl Default for ContextLimit {
    fn default() -> Self {
        ContextLimit::Absolute(12_000)
    }
}

impl std::fmt::Display for ContextLimit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentage(share) => write!(f, "{share}%"),
            Self::Absolute(limit) => write!(f, "{limit}"),
        }
    }
}

impl std::str::FromStr for ContextLimit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        parse_context_limit(s)
    }
}

impl Serialize for ContextLimit {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ContextLimit {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_context_limit(&raw).map_err(|e| serde::de::Error::custom(format!("{:#}", e)))
    }
}

/// Parse a threshold string: `"60%"` of the context budget or `"12000"` chars.
pub fn parse_context_limit(s: &str) -> Result<ContextLimit> {
    let raw = s.trim();
    anyhow::ensure!(!raw.is_empty(), "Compaction threshold cannot be empty");

    match raw.strip_suffix('%') {
        Some(number) => {
            let share = number
                .trim()
                .parse::<f32>()
                .with_context(|| format!("Invalid percentage in compaction threshold: {raw}"))?;
            anyhow::ensure!(
                share > 0.0 && share <= 100.0,
                "Compaction threshold percentage must be in (0, 100], got {share}"
            );
            Ok(ContextLimit::Percentage(share))
        }
        None => {
            let limit = raw
                .parse::<usize>()
                .with_context(|| format!("Invalid absolute compaction threshold: {raw}"))?;
            anyhow::ensure!(limit > 0, "Compaction threshold cannot be zero");
            Ok(ContextLimit::Absolute(limit))
        }
    }
}
