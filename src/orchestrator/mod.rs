//! Phase automation orchestrator.
//!
//! Runs the phases of a project in order until every phase is completed, a
//! cancellation checkpoint is reached, or no phase is left to try.
//!
//! Each loop iteration re-derives the phase to work on from project state:
//! the first phase that is not `completed` and has not failed in this run.
//! Nothing else is cached, so a paused run resumes at the right place.
//!
//! Failures are isolated per phase. A phase-fatal error marks the phase as
//! failed for the current run and the loop moves on; the phase is retried by
//! the next run.

mod events;
mod summary;

pub use tokio_util::sync::CancellationToken;
pub use events::{AutomationEvent, EventReceiver, EventSender, Progress, event_channel};
pub use summary::{FailedPhase, RunStatus, RunSummary};

use crate::compaction::{CompactionOutcome, CompactionSettings, Compactor, should_compact};
use crate::errors::PhaseError;
use crate::generation::Generator;
use crate::project::{PhaseStatus, Project};
use crate::review::{AutoAdvance, GateOutcome, ReviewGate, ReviewPolicy};
use crate::store::ProjectStore;
use crate::strategy::{PhaseExecutor, StepOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Ephemeral state of one `run` invocation. Never persisted.
#[derive(Debug)]
pub struct AutomationRun {
    cancel: CancellationToken,
    failed: Vec<FailedPhase>,
}

impl AutomationRun {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            failed: Vec::new(),
        }
    }

    pub fn cancellation_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn failed_phase_ids(&self) -> Vec<String> {
        self.failed.iter().map(|f| f.id.clone()).collect()
    }
}

/// How one phase attempt ended, short of an error.
enum PhaseOutcome {
    Completed,
    Interrupted,
    Held,
}

/// Drives a project through its phases.
pub struct Orchestrator {
    generator: Generator,
    store: Arc<dyn ProjectStore>,
    review_policy: Arc<dyn ReviewPolicy>,
    compaction: CompactionSettings,
    progress: Progress,
}

impl Orchestrator {
    pub fn new(generator: Generator, store: Arc<dyn ProjectStore>) -> Self {
        Self {
            generator,
            store,
            review_policy: Arc::new(AutoAdvance),
            compaction: CompactionSettings::default(),
            progress: Progress::silent(),
        }
    }

    pub fn with_review_policy(mut self, policy: Arc<dyn ReviewPolicy>) -> Self {
        self.review_policy = policy;
        self
    }

    pub fn with_compaction(mut self, settings: CompactionSettings) -> Self {
        self.compaction = settings;
        self
    }

    pub fn with_events(mut self, tx: EventSender) -> Self {
        self.progress = Progress::new(tx);
        self
    }

    /// Run automation until a terminal status.
    ///
    /// `cancel` may be triggered at any time from outside; it takes effect at
    /// the next checkpoint (before a phase, document or sprint). A run in
    /// which every phase is completed reports `Complete` even if
    /// cancellation was requested.
    pub async fn run(&self, project: &mut Project, cancel: &CancellationToken) -> RunSummary {
        let started = Instant::now();
        let mut run = AutomationRun::new(cancel.clone());
        let mut completed = Vec::new();
        let mut held_for_review = None;

        info!(project = %project.name, phases = project.phases.len(), "Starting automation run");

        let status = loop {
            let Some(index) = project.next_incomplete(&run.failed_phase_ids()) else {
                break if run.failed.is_empty() {
                    RunStatus::Complete
                } else {
                    RunStatus::Error
                };
            };

            if run.cancellation_requested() {
                info!("Cancellation requested, pausing before next phase");
                break RunStatus::Paused;
            }

            let phase_id = project.phases[index].id.clone();
            let phase_name = project.phases[index].name.clone();
            info!(phase = %phase_id, status = %project.phases[index].status, "Automating phase");
            self.progress.emit(AutomationEvent::PhaseStarted {
                phase_id: phase_id.clone(),
                phase_name: phase_name.clone(),
            });

            match self.automate_phase(project, index, &run.cancel).await {
                Ok(PhaseOutcome::Completed) => {
                    info!(phase = %phase_id, "Phase completed");
                    self.progress.emit(AutomationEvent::PhaseCompleted {
                        phase_id: phase_id.clone(),
                        phase_name,
                    });
                    completed.push(phase_id);
                    self.compact_if_needed(project).await;
                }
                Ok(PhaseOutcome::Interrupted) => {
                    info!(phase = %phase_id, "Phase interrupted by cancellation");
                    break RunStatus::Paused;
                }
                Ok(PhaseOutcome::Held) => {
                    held_for_review = Some(phase_name);
                    break RunStatus::Paused;
                }
                Err(e) => {
                    error!(phase = %phase_id, error = %e, "Phase failed, skipping for this run");
                    self.progress.emit(AutomationEvent::PhaseFailed {
                        phase_id: phase_id.clone(),
                        phase_name: phase_name.clone(),
                        error: e.to_string(),
                    });
                    self.progress
                        .message(format!("{} skipped due to error: {}", phase_name, e));
                    run.failed.push(FailedPhase {
                        id: phase_id,
                        name: phase_name,
                        error: e.to_string(),
                        structural: e.is_structural(),
                    });
                }
            }
        };

        info!(%status, completed = completed.len(), failed = run.failed.len(), "Automation run finished");
        self.progress.emit(AutomationEvent::RunFinished { status });

        RunSummary {
            status,
            completed,
            failed: run.failed,
            held_for_review,
            elapsed: started.elapsed(),
        }
    }

    async fn automate_phase(
        &self,
        project: &mut Project,
        index: usize,
        cancel: &CancellationToken,
    ) -> Result<PhaseOutcome, PhaseError> {
        // A phase held in review by an earlier run goes straight back to the gate.
        if project.phases[index].status != PhaseStatus::InReview {
            let executor = PhaseExecutor::new(&self.generator, self.store.as_ref(), &self.progress, cancel);
            if executor.execute(project, index).await? == StepOutcome::Interrupted {
                return Ok(PhaseOutcome::Interrupted);
            }
        }

        let gate = ReviewGate::new(
            &self.generator,
            self.store.as_ref(),
            &self.progress,
            self.review_policy.as_ref(),
        );
        match gate.apply(project, index).await? {
            GateOutcome::Completed => Ok(PhaseOutcome::Completed),
            GateOutcome::Held => Ok(PhaseOutcome::Held),
        }
    }

    /// Compaction failures are reported, never fatal.
    async fn compact_if_needed(&self, project: &mut Project) {
        if !should_compact(project, &self.compaction) {
            return;
        }

        let compactor = Compactor::new(&self.generator, self.store.as_ref(), &self.progress, &self.compaction);
        match compactor.compact(project, false).await {
            Ok(CompactionOutcome::Compacted { .. }) | Ok(CompactionOutcome::Skipped { .. }) => {}
            Err(e) => {
                warn!(error = %e, "Context compaction failed, continuing with raw output");
                self.progress
                    .message(format!("Context compaction failed: {}", e));
            }
        }
    }
}
