//! Producing the compacted requirements context.

use super::config::ContextLimit;
use crate::context::labeled;
use crate::errors::{GenerationError, PhaseError};
use crate::generation::{GenerationRequest, GenerationTarget, Generator};
use crate::orchestrator::Progress;
use crate::project::Project;
use crate::store::ProjectStore;
use tracing::{debug, info};

/// When and how aggressively to compact.
#[derive(Debug, Clone, PartialEq)]
pub struct CompactionSettings {
    pub enabled: bool,
    pub threshold: ContextLimit,
    /// Context size the percentage thresholds are relative to.
    pub context_budget: usize,
}

impl Default for CompactionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: ContextLimit::default(),
            context_budget: super::DEFAULT_CONTEXT_BUDGET,
        }
    }
}

impl CompactionSettings {
    pub fn threshold_chars(&self) -> usize {
        self.threshold.effective_limit(self.context_budget)
    }
}

/// Result of a compaction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompactionOutcome {
    Compacted {
        original_chars: usize,
        summary_chars: usize,
    },
    Skipped { reason: String },
}

/// Whether the first phase's output should be compacted now.
pub fn should_compact(project: &Project, settings: &CompactionSettings) -> bool {
    if !settings.enabled || project.compacted_context.is_some() {
        return false;
    }
    match project.phases.first() {
        Some(first) => first.is_completed() && first.output.len() > settings.threshold_chars(),
        None => false,
    }
}

/// Summarizes the first phase's output into `compacted_context`.
pub struct Compactor<'a> {
    generator: &'a Generator,
    store: &'a dyn ProjectStore,
    progress: &'a Progress,
    settings: &'a CompactionSettings,
}

impl<'a> Compactor<'a> {
    pub fn new(
        generator: &'a Generator,
        store: &'a dyn ProjectStore,
        progress: &'a Progress,
        settings: &'a CompactionSettings,
    ) -> Self {
        Self {
            generator,
            store,
            progress,
            settings,
        }
    }

    /// Compact when the threshold is exceeded, or unconditionally with `force`.
    ///
    /// The first phase must be completed with output either way. An existing
    /// summary is replaced only when forced.
    pub async fn compact(&self, project: &mut Project, force: bool) -> Result<CompactionOutcome, PhaseError> {
        let Some(first) = project.phases.first() else {
            return Ok(skipped("project has no phases"));
        };
        if !first.is_completed() || first.output.trim().is_empty() {
            return Ok(skipped(format!("{} has no completed output yet", first.name)));
        }
        if !force && !should_compact(project, self.settings) {
            debug!(
                chars = first.output.len(),
                threshold = self.settings.threshold_chars(),
                "Compaction not needed"
            );
            return Ok(skipped("below threshold or already compacted"));
        }

        let original_chars = first.output.len();
        let request = GenerationRequest::new(
            GenerationTarget::Compaction {
                phase_name: first.name.clone(),
            },
            format!(
                "# PROJECT: {}\n\n{}",
                project.name,
                labeled(&format!("{} OUTPUT", first.name), &first.output)
            ),
        );

        let summary = self.generator.text(&request).await?;
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(GenerationError::backend("compaction produced an empty summary").into());
        }

        let summary_chars = summary.len();
        project.compacted_context = Some(summary.to_string());
        project.touch();
        self.store.persist(project)?;

        info!(original_chars, summary_chars, "Requirements context compacted");
        self.progress.message(format!(
            "Compacted requirements context: {} -> {} chars",
            original_chars, summary_chars
        ));

        Ok(CompactionOutcome::Compacted {
            original_chars,
            summary_chars,
        })
    }
}

fn skipped(reason: impl Into<String>) -> CompactionOutcome {
    CompactionOutcome::Skipped {
        reason: reason.into(),
    }
}
