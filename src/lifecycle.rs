//! The fixed engineering lifecycle every new project is created with.
//!
//! Phase order is part of the project's identity: it is fixed here at
//! creation time and never reordered afterwards.

use crate::project::{Phase, PhaseKind, Project, Sprint, TuningSettings};
use serde_json::json;

pub const REQUIREMENTS: &str = "requirements";
pub const CONCEPTUAL_DESIGN: &str = "conceptual-design";
pub const PRELIMINARY_DESIGN: &str = "preliminary-design";
pub const CRITICAL_DESIGN: &str = "critical-design";
pub const TEST_VALIDATION: &str = "test-validation";
pub const PRODUCTION_HANDOFF: &str = "production-handoff";

fn tuning(temperature: f64, max_tokens: u32) -> TuningSettings {
    let mut settings = TuningSettings::new();
    settings.insert("temperature".into(), json!(temperature));
    settings.insert("max_tokens".into(), json!(max_tokens));
    settings
}

/// Build the default phase list, all `not-started`.
pub fn default_phases() -> Vec<Phase> {
    vec![
        Phase::new(
            REQUIREMENTS,
            "Requirements",
            "Capture scope, contractual work and the technical baseline.",
            PhaseKind::DocumentSeries,
        )
        .with_sprints(vec![
            Sprint::new(
                "requirements-scope",
                "Scope Document",
                "Project boundaries, stakeholders, success criteria and exclusions.",
            ),
            Sprint::new(
                "requirements-sow",
                "Statement of Work",
                "Work breakdown, deliverables, milestones and acceptance terms.",
            ),
            Sprint::new(
                "requirements-tech-spec",
                "Technical Specification",
                "Functional and performance requirements with verification methods.",
            ),
        ])
        .with_tuning(tuning(0.3, 4096)),
        Phase::new(
            CONCEPTUAL_DESIGN,
            "Conceptual Design",
            "Candidate architectures, trade studies and the selected concept.",
            PhaseKind::Direct,
        )
        .with_tuning(tuning(0.7, 4096)),
        Phase::new(
            PRELIMINARY_DESIGN,
            "Preliminary Design",
            "System decomposition, interfaces, preliminary sizing and risk register.",
            PhaseKind::Direct,
        )
        .with_review(true)
        .with_tuning(tuning(0.5, 6144)),
        Phase::new(
            CRITICAL_DESIGN,
            "Critical Design",
            "Detailed design broken into dependent work packages ready for build.",
            PhaseKind::Decompositional,
        )
        .with_review(true)
        .with_tuning(tuning(0.4, 8192)),
        Phase::new(
            TEST_VALIDATION,
            "Test & Validation",
            "Test plan, procedures and the requirements verification matrix.",
            PhaseKind::Direct,
        )
        .with_tuning(tuning(0.3, 6144)),
        Phase::new(
            PRODUCTION_HANDOFF,
            "Production Handoff",
            "Manufacturing package, operations and maintenance documentation.",
            PhaseKind::Direct,
        )
        .with_tuning(tuning(0.3, 4096)),
    ]
}

/// Create a project with the default lifecycle.
pub fn new_project(
    name: &str,
    disciplines: Vec<String>,
    requirements: &str,
    constraints: &str,
) -> Project {
    Project::new(name, default_phases())
        .with_disciplines(disciplines)
        .with_requirements(requirements)
        .with_constraints(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::PhaseStatus;

    #[test]
    fn test_lifecycle_order_is_fixed() {
        let ids: Vec<String> = default_phases().into_iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            vec![
                REQUIREMENTS,
                CONCEPTUAL_DESIGN,
                PRELIMINARY_DESIGN,
                CRITICAL_DESIGN,
                TEST_VALIDATION,
                PRODUCTION_HANDOFF
            ]
        );
    }

    #[test]
    fn test_requirements_is_a_three_document_series() {
        let phases = default_phases();
        let requirements = &phases[0];
        assert_eq!(requirements.kind, PhaseKind::DocumentSeries);
        assert_eq!(requirements.sprints.len(), 3);
        assert!(requirements.sprints.iter().all(|s| s.dependencies.is_empty()));
    }

    #[test]
    fn test_critical_design_is_decompositional_with_review() {
        let phases = default_phases();
        let critical = phases.iter().find(|p| p.id == CRITICAL_DESIGN).unwrap();
        assert_eq!(critical.kind, PhaseKind::Decompositional);
        assert!(critical.design_review.required);
        assert!(critical.sprints.is_empty());
    }

    #[test]
    fn test_new_project_starts_untouched() {
        let project = new_project("Bridge", vec!["civil".into()], "Span 40m", "Budget 2M");
        assert_eq!(project.disciplines, vec!["civil"]);
        assert!(project.phases.iter().all(|p| p.status == PhaseStatus::NotStarted));
        assert!(project.compacted_context.is_none());
    }
}
