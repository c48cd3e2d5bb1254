//! Context accumulation for generation calls.
//!
//! `build_context` is a pure function of project state. It assembles the base
//! project facts, the compacted requirements summary when one exists, and the
//! outputs of earlier completed phases. Partial output of a phase that is not
//! `completed` never leaks into another phase's context.

use crate::project::{Phase, Project};

/// Render a labeled section, used for sprint and phase outputs alike.
pub fn labeled(name: &str, text: &str) -> String {
    format!("## {}\n\n{}", name, text.trim_end())
}

fn base_facts(project: &Project) -> String {
    let mut text = String::new();
    text.push_str(&format!("# PROJECT: {}\n\n", project.name));

    let disciplines = if project.disciplines.is_empty() {
        "(none specified)".to_string()
    } else {
        project.disciplines.join(", ")
    };
    text.push_str(&format!("**Disciplines:** {}\n\n", disciplines));

    text.push_str("## REQUIREMENTS\n\n");
    text.push_str(project.requirements.trim());
    text.push_str("\n\n## CONSTRAINTS\n\n");
    text.push_str(project.constraints.trim());
    text.push('\n');
    text
}

fn contributes(phase: &Phase) -> bool {
    phase.is_completed() && !phase.output.trim().is_empty()
}

/// Build the context handed to generation for the phase `up_to_phase_id`.
///
/// With a compacted context, the first phase's raw output is replaced by the
/// summary and only phases strictly between the first phase and the target
/// contribute raw output. Without one, every completed phase before the
/// target contributes, in phase order. An unknown id is treated as "after the
/// last phase".
pub fn build_context(project: &Project, up_to_phase_id: &str) -> String {
    let end = project
        .phase_index(up_to_phase_id)
        .unwrap_or(project.phases.len());

    let mut sections = vec![base_facts(project)];

    let start = match project.compacted_context.as_deref() {
        Some(summary) if end > 0 => {
            sections.push(labeled("REQUIREMENTS SUMMARY (COMPACTED)", summary));
            1
        }
        _ => 0,
    };

    let prior: Vec<String> = project.phases[start.min(end)..end]
        .iter()
        .filter(|p| contributes(p))
        .map(|p| labeled(&format!("COMPLETED PHASE: {}", p.name), &p.output))
        .collect();

    if !prior.is_empty() {
        sections.push("# PRIOR PHASE OUTPUTS".to_string());
        sections.extend(prior);
    }

    sections.join("\n\n")
}

/// Extend a base context with earlier documents of the same phase.
///
/// `prior` must already be limited to documents that precede the one being
/// generated; later documents are never included.
pub fn with_prior_documents<'a, I>(base: &str, prior: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let sections: Vec<String> = prior
        .into_iter()
        .map(|(name, output)| labeled(name, output))
        .collect();

    if sections.is_empty() {
        return base.to_string();
    }

    format!(
        "{}\n\n# EARLIER DOCUMENTS IN THIS PHASE\n\n{}",
        base,
        sections.join("\n\n")
    )
}

/// Extend a base context with the cumulative output of the current phase.
///
/// For decompositional phases the cumulative output holds the preliminary
/// specification followed by every completed sprint, in completion order.
pub fn with_phase_progress(base: &str, phase: &Phase) -> String {
    if phase.output.trim().is_empty() {
        return base.to_string();
    }
    format!(
        "{}\n\n# CURRENT PHASE: {} (WORK SO FAR)\n\n{}",
        base,
        phase.name,
        phase.output.trim_end()
    )
}
