//! Prompt rendering for process-backed generators.

use super::{GenerationRequest, GenerationTarget, StructuredKind};

fn task_section(target: &GenerationTarget) -> String {
    match target {
        GenerationTarget::Phase {
            phase_name,
            description,
        } => format!(
            "Write the complete {} deliverable for this project.\n\nPhase scope: {}",
            phase_name, description
        ),
        GenerationTarget::Document {
            phase_name,
            name,
            description,
        } => format!(
            "Write the \"{}\" document of the {} phase.\n\nDocument scope: {}\n\n\
             Build on the earlier documents of this phase where they exist; do not repeat them.",
            name, phase_name, description
        ),
        GenerationTarget::SprintPlan {
            phase_name,
            description,
        } => format!(
            "Draft the preliminary specification for the {} phase and break the detailed work \
             into sprints. Name every sprint uniquely and list, for each sprint, the names of the \
             sprints it depends on.\n\nPhase scope: {}",
            phase_name, description
        ),
        GenerationTarget::Sprint {
            phase_name,
            name,
            description,
        } => format!(
            "Produce the technical specification and deliverables for sprint \"{}\" of the {} \
             phase.\n\nSprint scope: {}",
            name, phase_name, description
        ),
        GenerationTarget::Checklist { phase_name } => format!(
            "Derive a design review checklist for the {} phase output above: short, \
             independently verifiable statements.",
            phase_name
        ),
        GenerationTarget::Compaction { phase_name } => format!(
            "Summarize the {} phase output above into a dense reference that preserves every \
             requirement, number, interface and constraint later phases depend on.",
            phase_name
        ),
    }
}

/// Render a request as a single prompt document.
pub fn render(request: &GenerationRequest, structured: Option<StructuredKind>) -> String {
    let mut prompt = String::new();
    prompt.push_str("You are producing engineering documentation for the project below.\n\n");
    prompt.push_str("## PROJECT CONTEXT\n\n");
    prompt.push_str(request.context.trim_end());
    prompt.push_str("\n\n## TASK\n\n");
    prompt.push_str(&task_section(&request.target));
    prompt.push('\n');

    if let Some(kind) = structured {
        prompt.push_str(&format!(
            "\n## OUTPUT FORMAT\n\nRespond with a single JSON value of this shape and nothing else:\n{}\n",
            kind.schema_hint()
        ));
    }

    prompt
}
