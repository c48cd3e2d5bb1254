//! Design review gate: the step between phase execution and completion.

use super::policy::{ReviewDecision, ReviewPolicy};
use crate::context::{build_context, labeled};
use crate::errors::PhaseError;
use crate::generation::{Checklist, GenerationRequest, GenerationTarget, Generator};
use crate::orchestrator::Progress;
use crate::project::{ChecklistItem, MetaDocument, MetaDocumentKind, PhaseStatus, Project};
use crate::store::ProjectStore;
use tracing::{debug, info};

/// Where the gate left the phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Completed,
    /// The review policy kept the phase `in-review`.
    Held,
}

/// Applies the design review requirements of a phase.
pub struct ReviewGate<'a> {
    generator: &'a Generator,
    store: &'a dyn ProjectStore,
    progress: &'a Progress,
    policy: &'a dyn ReviewPolicy,
}

fn render_checklist(items: &[ChecklistItem]) -> String {
    items
        .iter()
        .map(|item| format!("- [{}] {}", if item.checked { "x" } else { " " }, item.text))
        .collect::<Vec<_>>()
        .join("\n")
}

impl<'a> ReviewGate<'a> {
    pub fn new(
        generator: &'a Generator,
        store: &'a dyn ProjectStore,
        progress: &'a Progress,
        policy: &'a dyn ReviewPolicy,
    ) -> Self {
        Self {
            generator,
            store,
            progress,
            policy,
        }
    }

    /// Move the phase at `index` towards `completed`.
    ///
    /// Without a required review, or with empty output, the phase completes
    /// directly. Otherwise a checklist is generated from the output (unless
    /// the phase is already `in-review` with one), the phase enters
    /// `in-review`, and the policy decides whether it completes now.
    pub async fn apply(&self, project: &mut Project, index: usize) -> Result<GateOutcome, PhaseError> {
        let phase = &project.phases[index];

        if !phase.design_review.required || phase.output.trim().is_empty() {
            debug!(phase = %phase.id, "No review needed, completing phase");
            return self.complete(project, index);
        }

        if phase.status != PhaseStatus::InReview {
            self.generate_checklist(project, index).await?;
        } else {
            debug!(phase = %phase.id, "Phase already in review, reusing checklist");
        }

        let phase = &project.phases[index];
        match self.policy.decide(phase) {
            ReviewDecision::Advance => self.complete(project, index),
            ReviewDecision::Hold => {
                info!(phase = %phase.id, policy = self.policy.name(), "Phase held in review");
                self.progress.message(format!(
                    "{} is waiting for design review approval",
                    phase.name
                ));
                Ok(GateOutcome::Held)
            }
        }
    }

    async fn generate_checklist(&self, project: &mut Project, index: usize) -> Result<(), PhaseError> {
        let phase = &project.phases[index];
        let context = format!(
            "{}\n\n{}",
            build_context(project, &phase.id),
            labeled(&format!("{} OUTPUT UNDER REVIEW", phase.name), &phase.output)
        );
        let request = GenerationRequest::new(
            GenerationTarget::Checklist {
                phase_name: phase.name.clone(),
            },
            context,
        )
        .with_tuning(phase.tuning.clone());

        let checklist: Checklist = self.generator.structured(&request).await?;
        let items: Vec<ChecklistItem> = checklist.items.into_iter().map(ChecklistItem::new).collect();
        info!(phase = %phase.id, items = items.len(), "Design review checklist generated");

        let document = MetaDocument::new(
            MetaDocumentKind::Checklist,
            &format!("{} design review checklist", phase.name),
            Some(phase.id.as_str()),
            render_checklist(&items),
        );

        let phase = &mut project.phases[index];
        phase.design_review.checklist = items;
        phase.status = PhaseStatus::InReview;
        let message = format!(
            "{}: design review checklist with {} items",
            phase.name,
            phase.design_review.checklist.len()
        );
        project.append_meta_document(document);
        self.persist(project)?;
        self.progress.message(message);
        Ok(())
    }

    fn complete(&self, project: &mut Project, index: usize) -> Result<GateOutcome, PhaseError> {
        project.phases[index].status = PhaseStatus::Completed;
        self.persist(project)?;
        Ok(GateOutcome::Completed)
    }

    fn persist(&self, project: &mut Project) -> Result<(), PhaseError> {
        project.touch();
        self.store.persist(project)?;
        Ok(())
    }
}
