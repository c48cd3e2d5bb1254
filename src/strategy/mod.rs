//! Phase execution strategies.
//!
//! A phase's `kind` selects how its output is produced:
//!
//! - **Direct** - one generation call for the whole phase
//! - **Document series** - declared sprints generated in list order, each
//!   seeing the documents before it
//! - **Decompositional** - a proposed sprint graph executed ready set by
//!   ready set
//!
//! Strategies mutate the phase in place and persist after every document or
//! sprint. They never complete a phase; that is the review gate's job.

mod decompose;
mod direct;
mod series;

pub use decompose::{UnresolvedDependency, resolve_proposed_sprints};

use crate::errors::PhaseError;
use crate::generation::Generator;
use crate::orchestrator::{CancellationToken, Progress};
use crate::project::{PhaseKind, PhaseStatus, Project};
use crate::store::ProjectStore;
use tracing::debug;

/// How a strategy step ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The phase output is fully produced.
    Finished,
    /// Cancellation was observed at a checkpoint; partial work is persisted.
    Interrupted,
}

/// Runs the execution strategy selected by a phase's kind.
pub struct PhaseExecutor<'a> {
    pub(crate) generator: &'a Generator,
    pub(crate) store: &'a dyn ProjectStore,
    pub(crate) progress: &'a Progress,
    pub(crate) cancel: &'a CancellationToken,
}

impl<'a> PhaseExecutor<'a> {
    pub fn new(
        generator: &'a Generator,
        store: &'a dyn ProjectStore,
        progress: &'a Progress,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            generator,
            store,
            progress,
            cancel,
        }
    }

    /// Produce the output of the phase at `index`.
    ///
    /// A `not-started` phase moves to `in-progress` before any generation
    /// call. Phase-fatal errors propagate unchanged.
    pub async fn execute(
        &self,
        project: &mut Project,
        index: usize,
    ) -> Result<StepOutcome, PhaseError> {
        let phase = &mut project.phases[index];
        if phase.status == PhaseStatus::NotStarted {
            phase.status = PhaseStatus::InProgress;
            self.persist(project)?;
        }

        let kind = project.phases[index].kind;
        debug!(phase = %project.phases[index].id, kind = %kind, "Executing phase");

        match kind {
            PhaseKind::Direct => direct::execute(self, project, index).await,
            PhaseKind::DocumentSeries => series::execute(self, project, index).await,
            PhaseKind::Decompositional => decompose::execute(self, project, index).await,
        }
    }

    pub(crate) fn persist(&self, project: &mut Project) -> Result<(), PhaseError> {
        project.touch();
        self.store.persist(project)?;
        Ok(())
    }

    pub(crate) fn cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::generation::testing::StubClient;
    use crate::generation::{GenerationRequest, RetryPolicy};
    use crate::errors::GenerationError;
    use crate::project::Phase;
    use crate::store::MemoryStore;
    use std::sync::Arc;
    use std::time::Duration;

    pub(crate) struct Harness {
        pub client: Arc<StubClient>,
        pub generator: Generator,
        pub store: MemoryStore,
        pub progress: Progress,
        pub cancel: CancellationToken,
    }

    impl Harness {
        pub fn new<F>(respond: F) -> Self
        where
            F: Fn(&GenerationRequest) -> Result<String, GenerationError> + Send + Sync + 'static,
        {
            let client = Arc::new(StubClient::new(respond));
            let generator = Generator::new(client.clone())
                .with_retry(RetryPolicy::new(1, Duration::from_millis(1)));
            Self {
                client,
                generator,
                store: MemoryStore::new(),
                progress: Progress::silent(),
                cancel: CancellationToken::new(),
            }
        }

        pub fn executor(&self) -> PhaseExecutor<'_> {
            PhaseExecutor::new(&self.generator, &self.store, &self.progress, &self.cancel)
        }
    }

    #[tokio::test]
    async fn test_execute_marks_in_progress_first() {
        let harness = Harness::new(|_| Ok("Concept output".into()));
        let mut project = Project::new(
            "Test",
            vec![Phase::new("concept", "Conceptual Design", "", PhaseKind::Direct)],
        );

        let outcome = harness.executor().execute(&mut project, 0).await.unwrap();

        assert_eq!(outcome, StepOutcome::Finished);
        let snapshots = harness.store.snapshots();
        assert_eq!(snapshots[0].phases[0].status, PhaseStatus::InProgress);
        assert!(snapshots[0].phases[0].output.is_empty());
        assert_eq!(project.phases[0].output, "Concept output");
        assert_eq!(project.phases[0].status, PhaseStatus::InProgress);
    }
}
