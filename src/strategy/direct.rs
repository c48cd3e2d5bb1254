//! Direct execution: one generation call produces the whole phase.

use super::{PhaseExecutor, StepOutcome};
use crate::context::build_context;
use crate::errors::PhaseError;
use crate::generation::{GenerationRequest, GenerationTarget};
use crate::project::{PhaseStatus, Project};
use tracing::{debug, info};

pub(super) async fn execute(
    exec: &PhaseExecutor<'_>,
    project: &mut Project,
    index: usize,
) -> Result<StepOutcome, PhaseError> {
    let phase = &project.phases[index];

    // Output from an interrupted run is kept as is.
    if phase.status == PhaseStatus::InProgress && !phase.output.trim().is_empty() {
        debug!(phase = %phase.id, "Direct phase already has output, skipping generation");
        return Ok(StepOutcome::Finished);
    }

    let request = GenerationRequest::new(
        GenerationTarget::Phase {
            phase_name: phase.name.clone(),
            description: phase.description.clone(),
        },
        build_context(project, &phase.id),
    )
    .with_tuning(phase.tuning.clone());

    let output = exec.generator.text(&request).await?;

    let phase = &mut project.phases[index];
    phase.output = output;
    phase.status = PhaseStatus::InProgress;
    info!(phase = %phase.id, chars = phase.output.len(), "Direct phase generated");
    exec.persist(project)?;

    Ok(StepOutcome::Finished)
}

#[cfg(test)]
mod tests {
    use crate::generation::GenerationTarget;
    use crate::project::{Phase, PhaseKind, PhaseStatus, Project};
    use crate::strategy::StepOutcome;
    use crate::strategy::tests::Harness;

    fn project() -> Project {
        let mut project = Project::new(
            "Substation",
            vec![
                Phase::new("requirements", "Requirements", "", PhaseKind::Direct),
                Phase::new("concept", "Conceptual Design", "Trade studies", PhaseKind::Direct),
            ],
        )
        .with_requirements("132 kV");
        project.phases[0].status = PhaseStatus::Completed;
        project.phases[0].output = "REQ OUTPUT".into();
        project.phases[1]
            .tuning
            .insert("temperature".into(), serde_json::json!(0.2));
        project
    }

    #[tokio::test]
    async fn test_direct_generates_with_context_and_tuning() {
        let harness = Harness::new(|_| Ok("CONCEPT".into()));
        let mut project = project();

        let outcome = harness.executor().execute(&mut project, 1).await.unwrap();
        assert_eq!(outcome, StepOutcome::Finished);
        assert_eq!(project.phases[1].output, "CONCEPT");
        assert_eq!(project.phases[1].status, PhaseStatus::InProgress);

        let calls = harness.client.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0].context.contains("REQ OUTPUT"));
        assert!(calls[0].context.contains("132 kV"));
        assert_eq!(calls[0].tuning["temperature"], serde_json::json!(0.2));
        assert!(matches!(calls[0].target, GenerationTarget::Phase { .. }));
    }

    #[tokio::test]
    async fn test_direct_resume_keeps_existing_output() {
        let harness = Harness::new(|_| Ok("REGENERATED".into()));
        let mut project = project();
        project.phases[1].status = PhaseStatus::InProgress;
        project.phases[1].output = "EARLIER".into();

        harness.executor().execute(&mut project, 1).await.unwrap();
        assert_eq!(project.phases[1].output, "EARLIER");
        assert!(harness.client.calls().is_empty());
    }

    #[tokio::test]
    async fn test_direct_failure_leaves_phase_in_progress() {
        let harness = Harness::new(|_| Err(crate::errors::GenerationError::backend("down")));
        let mut project = project();

        let err = harness.executor().execute(&mut project, 1).await.unwrap_err();
        assert!(err.to_string().contains("down"));
        assert_eq!(project.phases[1].status, PhaseStatus::InProgress);
        assert!(project.phases[1].output.is_empty());
        // First attempt plus one retry.
        assert_eq!(harness.client.calls().len(), 2);
    }
}
