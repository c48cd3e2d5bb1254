//! Decompositional execution.
//!
//! Two stages:
//!
//! 1. **Propose** - one structured call returns a preliminary specification
//!    and a list of sprints whose dependencies are given by name. Each
//!    proposed sprint gets an id, then dependency names are resolved through
//!    a name to id map built in the first pass.
//! 2. **Execute** - the scheduler hands out ready sets; each sprint in a set
//!    is generated in list order against the cumulative phase output.

use super::{PhaseExecutor, StepOutcome};
use crate::context::{build_context, labeled, with_phase_progress};
use crate::dag::SprintScheduler;
use crate::errors::PhaseError;
use crate::generation::{GenerationRequest, GenerationTarget, ProposedSprint, SprintPlan, SprintSpec};
use crate::orchestrator::AutomationEvent;
use crate::project::{Phase, Project, Sprint, SprintStatus};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Separator placed between sprint sections of a decompositional output.
const SPRINT_SEPARATOR: &str = "\n\n---\n\n";

/// A dependency name that matched no proposed sprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedDependency {
    pub sprint: String,
    pub dependency: String,
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Assign ids to proposed sprints and resolve dependency names to ids.
///
/// Names match after trimming, case-insensitively; with duplicate names the
/// first sprint wins. Unresolvable names are dropped and returned so the
/// caller can report them. Repeated names collapse to one edge.
pub fn resolve_proposed_sprints(
    proposed: &[ProposedSprint],
) -> (Vec<Sprint>, Vec<UnresolvedDependency>) {
    let mut ids_by_name: HashMap<String, String> = HashMap::new();
    let mut sprints: Vec<Sprint> = proposed
        .iter()
        .map(|p| {
            let id = uuid::Uuid::new_v4().to_string();
            ids_by_name.entry(name_key(&p.name)).or_insert_with(|| id.clone());
            Sprint::new(&id, p.name.trim(), &p.description)
        })
        .collect();

    let mut unresolved = Vec::new();
    for (sprint, proposal) in sprints.iter_mut().zip(proposed) {
        let mut dependencies: Vec<String> = Vec::new();
        for name in &proposal.dependencies {
            match ids_by_name.get(&name_key(name)) {
                Some(id) if !dependencies.contains(id) => dependencies.push(id.clone()),
                Some(_) => {}
                None => unresolved.push(UnresolvedDependency {
                    sprint: sprint.name.clone(),
                    dependency: name.clone(),
                }),
            }
        }
        sprint.dependencies = dependencies;
    }

    (sprints, unresolved)
}

async fn propose(
    exec: &PhaseExecutor<'_>,
    project: &mut Project,
    index: usize,
    base: &str,
) -> Result<(), PhaseError> {
    let phase = &project.phases[index];
    let request = GenerationRequest::new(
        GenerationTarget::SprintPlan {
            phase_name: phase.name.clone(),
            description: phase.description.clone(),
        },
        base.to_string(),
    )
    .with_tuning(phase.tuning.clone());

    let plan: SprintPlan = exec.generator.structured(&request).await?;
    let (sprints, unresolved) = resolve_proposed_sprints(&plan.sprints);

    for missing in &unresolved {
        warn!(
            phase = %phase.id,
            sprint = %missing.sprint,
            dependency = %missing.dependency,
            "Dropping unresolved sprint dependency"
        );
        exec.progress.message(format!(
            "Sprint '{}' depends on unknown sprint '{}'; dependency ignored",
            missing.sprint, missing.dependency
        ));
    }

    info!(phase = %phase.id, sprints = sprints.len(), "Sprint plan accepted");
    exec.progress.message(format!(
        "{}: planned {} sprints",
        phase.name,
        sprints.len()
    ));

    let phase = &mut project.phases[index];
    phase.output = plan.specification.trim().to_string();
    phase.sprints = sprints;
    exec.persist(project)
}

/// An earlier run accepted a plan when it left a sprint list or a seeded
/// specification behind. A plan with no sprints leaves only the latter.
fn plan_accepted(phase: &Phase) -> bool {
    !phase.sprints.is_empty() || !phase.output.trim().is_empty()
}

pub(super) async fn execute(
    exec: &PhaseExecutor<'_>,
    project: &mut Project,
    index: usize,
) -> Result<StepOutcome, PhaseError> {
    let phase_id = project.phases[index].id.clone();
    let base = build_context(project, &phase_id);

    if !plan_accepted(&project.phases[index]) {
        propose(exec, project, index, &base).await?;
    } else {
        debug!(phase = %phase_id, "Resuming with persisted sprint plan");
    }

    let mut scheduler = SprintScheduler::from_sprints(&project.phases[index].sprints)?;
    let total = scheduler.sprint_count();

    loop {
        let batch = match scheduler.next_batch() {
            Ok(batch) => batch,
            Err(e) => {
                warn!(phase = %phase_id, error = %e, "Sprint graph cannot make progress");
                return Err(e.into());
            }
        };
        if batch.is_empty() {
            break;
        }
        debug!(phase = %phase_id, ready = batch.len(), "Ready set computed");

        for sprint_index in batch {
            if exec.cancelled() {
                info!(phase = %phase_id, "Cancellation observed before sprint");
                return Ok(StepOutcome::Interrupted);
            }

            let phase = &project.phases[index];
            let sprint = &phase.sprints[sprint_index];
            let request = GenerationRequest::new(
                GenerationTarget::Sprint {
                    phase_name: phase.name.clone(),
                    name: sprint.name.clone(),
                    description: sprint.description.clone(),
                },
                with_phase_progress(&base, phase),
            )
            .with_tuning(phase.tuning.clone());

            project.phases[index].sprints[sprint_index].status = SprintStatus::InProgress;
            exec.persist(project)?;

            let spec: SprintSpec = exec.generator.structured(&request).await?;

            let phase = &mut project.phases[index];
            let section = labeled(&phase.sprints[sprint_index].name, &spec.technical_spec);
            phase.output.push_str(SPRINT_SEPARATOR);
            phase.output.push_str(&section);

            let sprint = &mut phase.sprints[sprint_index];
            sprint.output = spec.technical_spec;
            sprint.deliverables = spec.deliverables;
            sprint.status = SprintStatus::Completed;
            let sprint_name = sprint.name.clone();
            exec.persist(project)?;

            scheduler.mark_completed(sprint_index);
            let completed = scheduler.completed_count();
            info!(phase = %phase_id, sprint = %sprint_name, completed, total, "Sprint completed");
            exec.progress.emit(AutomationEvent::SprintCompleted {
                phase_id: phase_id.clone(),
                sprint_name,
                completed,
                total,
            });
        }
    }

    Ok(StepOutcome::Finished)
}
