//! Terminal status and summary of an automation run.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How an automation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Every phase is completed.
    Complete,
    /// Stopped at a cancellation checkpoint or a held review; resumable.
    Paused,
    /// No phase left to try, but at least one failed this run.
    Error,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Complete => write!(f, "complete"),
            RunStatus::Paused => write!(f, "paused"),
            RunStatus::Error => write!(f, "error"),
        }
    }
}

/// A phase skipped for the rest of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPhase {
    pub id: String,
    pub name: String,
    pub error: String,
    /// Structural defect (bad graph, malformed response) rather than a backend failure.
    pub structural: bool,
}

/// What a run did, for the caller and the final console line.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub status: RunStatus,
    /// Phases that reached `completed` during this run, in order.
    pub completed: Vec<String>,
    pub failed: Vec<FailedPhase>,
    /// Phase left `in-review` by the review policy.
    pub held_for_review: Option<String>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.status != RunStatus::Error
    }
}

impl std::fmt::Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, &self.held_for_review) {
            (RunStatus::Complete, _) => write!(f, "All phases complete"),
            (RunStatus::Error, _) => write!(
                f,
                "Completed with {} phase{} skipped due to errors",
                self.failed.len(),
                if self.failed.len() == 1 { "" } else { "s" }
            ),
            (RunStatus::Paused, Some(phase)) => {
                write!(f, "Paused: {} is awaiting design review approval", phase)
            }
            (RunStatus::Paused, None) => write!(f, "Paused by user"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(status: RunStatus) -> RunSummary {
        RunSummary {
            status,
            completed: Vec::new(),
            failed: Vec::new(),
            held_for_review: None,
            elapsed: Duration::ZERO,
        }
    }

    #[test]
    fn test_summary_lines() {
        assert_eq!(summary(RunStatus::Complete).to_string(), "All phases complete");
        assert_eq!(summary(RunStatus::Paused).to_string(), "Paused by user");

        let mut error = summary(RunStatus::Error);
        error.failed.push(FailedPhase {
            id: "critical".into(),
            name: "Critical Design".into(),
            error: "cycle".into(),
            structural: true,
        });
        assert_eq!(error.to_string(), "Completed with 1 phase skipped due to errors");
        assert!(!error.is_success());

        let mut held = summary(RunStatus::Paused);
        held.held_for_review = Some("Critical Design".into());
        assert!(held.to_string().contains("awaiting design review"));
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&RunStatus::Paused).unwrap(), "\"paused\"");
    }
}
