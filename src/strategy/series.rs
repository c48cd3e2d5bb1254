//! Document-series execution.
//!
//! Sprints are generated strictly in declared order. Each document sees the
//! documents before it, never the ones after. Completed documents from an
//! interrupted run are not generated again.

use super::{PhaseExecutor, StepOutcome};
use crate::context::{build_context, labeled, with_prior_documents};
use crate::errors::PhaseError;
use crate::generation::{GenerationRequest, GenerationTarget};
use crate::orchestrator::AutomationEvent;
use crate::project::{PhaseStatus, Project, SprintStatus};
use tracing::{debug, info};

pub(super) async fn execute(
    exec: &PhaseExecutor<'_>,
    project: &mut Project,
    index: usize,
) -> Result<StepOutcome, PhaseError> {
    let phase_id = project.phases[index].id.clone();
    let base = build_context(project, &phase_id);
    let total = project.phases[index].sprints.len();

    for position in 0..total {
        if project.phases[index].sprints[position].is_completed() {
            debug!(phase = %phase_id, position, "Document already completed");
            continue;
        }
        if exec.cancelled() {
            info!(phase = %phase_id, position, "Cancellation observed before document");
            return Ok(StepOutcome::Interrupted);
        }

        let phase = &project.phases[index];
        let sprint = &phase.sprints[position];
        let context = with_prior_documents(
            &base,
            phase.sprints[..position]
                .iter()
                .filter(|s| s.is_completed())
                .map(|s| (s.name.as_str(), s.output.as_str())),
        );
        let request = GenerationRequest::new(
            GenerationTarget::Document {
                phase_name: phase.name.clone(),
                name: sprint.name.clone(),
                description: sprint.description.clone(),
            },
            context,
        )
        .with_tuning(phase.tuning.clone());

        project.phases[index].sprints[position].status = SprintStatus::InProgress;
        exec.persist(project)?;

        let output = exec.generator.text(&request).await?;

        let phase = &mut project.phases[index];
        let sprint = &mut phase.sprints[position];
        sprint.output = output;
        sprint.status = SprintStatus::Completed;
        let sprint_name = sprint.name.clone();
        let completed = phase.completed_sprint_count();
        info!(phase = %phase_id, sprint = %sprint_name, completed, total, "Document generated");
        exec.persist(project)?;

        exec.progress.emit(AutomationEvent::SprintCompleted {
            phase_id: phase_id.clone(),
            sprint_name,
            completed,
            total,
        });
    }

    let phase = &mut project.phases[index];
    phase.output = phase
        .sprints
        .iter()
        .map(|s| labeled(&s.name, &s.output))
        .collect::<Vec<_>>()
        .join("\n\n");
    phase.status = PhaseStatus::InProgress;
    exec.persist(project)?;

    Ok(StepOutcome::Finished)
}
