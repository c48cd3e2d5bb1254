//! Project inspection: `draftsman status` and `draftsman context`.

use anyhow::{Result, bail};
use console::style;
use std::path::Path;

use draftsman::compaction::should_compact;
use draftsman::config::DraftsmanConfig;
use draftsman::context::build_context;
use draftsman::dag::SprintScheduler;
use draftsman::project::{Phase, PhaseKind, PhaseStatus, SprintStatus};
use draftsman::ui::icons::{CHECK, REVIEW, RUNNING, WAVE};

use super::open_project;

fn status_cell(status: PhaseStatus) -> String {
    let text = format!("{:<12}", status.to_string());
    match status {
        PhaseStatus::Completed => style(text).green().to_string(),
        PhaseStatus::InReview => style(text).yellow().to_string(),
        PhaseStatus::InProgress => style(text).cyan().to_string(),
        PhaseStatus::NotStarted => style(text).dim().to_string(),
    }
}

fn sprint_marker(status: SprintStatus) -> String {
    match status {
        SprintStatus::Completed => CHECK.to_string(),
        SprintStatus::InProgress => RUNNING.to_string(),
        SprintStatus::NotStarted => "   ".to_string(),
    }
}

fn print_waves(phase: &Phase) {
    if phase.sprints.is_empty() {
        println!("    {}", style("sprints not proposed yet").dim());
        return;
    }
    match SprintScheduler::from_sprints(&phase.sprints) {
        Ok(scheduler) => {
            let waves = scheduler.compute_waves();
            for (i, wave) in waves.iter().enumerate() {
                let names: Vec<&str> = wave
                    .iter()
                    .map(|id| phase.sprint(id).map_or(id.as_str(), |s| s.name.as_str()))
                    .collect();
                println!("    {}Wave {}: {}", WAVE, i + 1, names.join(", "));
            }
            let scheduled: usize = waves.iter().map(Vec::len).sum();
            let blocked = scheduler
                .sprint_count()
                .saturating_sub(scheduler.completed_count() + scheduled);
            if blocked > 0 {
                println!(
                    "    {}",
                    style(format!("{} sprint(s) blocked by a dependency cycle", blocked)).red()
                );
            }
        }
        Err(e) => println!("    {} {}", style("invalid sprint graph:").red(), e),
    }
}

pub fn cmd_status(project_dir: &Path) -> Result<()> {
    let config = DraftsmanConfig::new(project_dir.to_path_buf())?;
    let (store, project) = open_project(&config)?;

    println!();
    println!("{}", style(format!("Project: {}", project.name)).bold());
    if !project.disciplines.is_empty() {
        println!("Disciplines: {}", project.disciplines.join(", "));
    }
    println!("File: {}", store.path().display());
    println!();
    println!("{:<4} {:<24} {:<16} {:<12} Progress", "#", "Phase", "Kind", "Status");
    println!(
        "{:<4} {:<24} {:<16} {:<12} --------",
        "--", "------------------------", "---------------", "------------"
    );

    for (i, phase) in project.phases.iter().enumerate() {
        let progress = if phase.sprints.is_empty() {
            String::new()
        } else {
            format!("{}/{} sprints", phase.completed_sprint_count(), phase.sprints.len())
        };
        println!(
            "{:<4} {:<24} {:<16} {} {}",
            i + 1,
            phase.name,
            phase.kind.to_string(),
            status_cell(phase.status),
            progress
        );

        if phase.kind == PhaseKind::DocumentSeries || !phase.is_completed() {
            for sprint in &phase.sprints {
                println!("     {}{}", sprint_marker(sprint.status), sprint.name);
            }
        }
        if phase.kind == PhaseKind::Decompositional && !phase.is_completed() {
            print_waves(phase);
        }

        let checklist = &phase.design_review.checklist;
        if phase.design_review.required && !checklist.is_empty() {
            let checked = checklist.iter().filter(|c| c.checked).count();
            println!(
                "     {}Review checklist: {}/{} checked",
                REVIEW,
                checked,
                checklist.len()
            );
        }
    }

    println!();
    let settings = config.compaction_settings();
    match &project.compacted_context {
        Some(summary) => println!("Compaction: active ({} chars)", summary.len()),
        None if should_compact(&project, &settings) => {
            println!("Compaction: pending (runs after the next completed phase, or `draftsman compact`)")
        }
        None if settings.enabled => {
            println!("Compaction: not needed (threshold {} chars)", settings.threshold_chars())
        }
        None => println!("Compaction: disabled"),
    }

    if !project.meta_documents().is_empty() {
        println!("Side documents: {}", project.meta_documents().len());
    }
    println!();

    Ok(())
}

pub fn cmd_context(project_dir: &Path, phase_id: &str) -> Result<()> {
    let config = DraftsmanConfig::new(project_dir.to_path_buf())?;
    let (_, project) = open_project(&config)?;

    if project.phase(phase_id).is_none() {
        let ids: Vec<&str> = project.phases.iter().map(|p| p.id.as_str()).collect();
        bail!("Unknown phase '{}'. Known phases: {}", phase_id, ids.join(", "));
    }

    println!("{}", build_context(&project, phase_id));
    Ok(())
}
