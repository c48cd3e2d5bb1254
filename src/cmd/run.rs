//! Phase automation: `draftsman run`.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use draftsman::config::DraftsmanConfig;
use draftsman::generation::Generator;
use draftsman::logging;
use draftsman::orchestrator::{CancellationToken, Orchestrator, RunStatus, event_channel};
use draftsman::ui::AutomationUI;

use super::super::Cli;
use super::open_project;

/// Cancel `token` on the first Ctrl-C. The run pauses at its next checkpoint.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, pausing at the next checkpoint");
            token.cancel();
        }
    });
}

pub async fn cmd_run(
    cli: &Cli,
    project_dir: PathBuf,
    generator_cmd: Option<String>,
    hold_reviews: bool,
) -> Result<RunStatus> {
    let config = DraftsmanConfig::new(project_dir)?
        .with_verbose(cli.verbose)
        .with_generator_cmd(generator_cmd)
        .with_hold_reviews(hold_reviews);
    logging::init(&config.logging());

    let (store, mut project) = open_project(&config)?;
    info!(
        generator = %config.generator_cmd(),
        review_policy = %config.review_policy_kind(),
        "Loaded project {}",
        project.name
    );

    let generator = Generator::new(Arc::new(config.command_client())).with_retry(config.retry_policy());
    let (tx, mut rx) = event_channel();
    let orchestrator = Orchestrator::new(generator, Arc::new(store))
        .with_review_policy(config.review_policy())
        .with_compaction(config.compaction_settings())
        .with_events(tx);

    let total = project.phases.len() as u64;
    let done = project.phases.iter().filter(|p| p.is_completed()).count() as u64;
    let ui = AutomationUI::new(total, done, config.verbose);

    let ui_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            ui.handle(&event);
        }
        ui
    });

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let summary = orchestrator.run(&mut project, &cancel).await;
    // Closing the last sender ends the UI loop.
    drop(orchestrator);

    match ui_task.await {
        Ok(ui) => ui.finish(&summary),
        Err(e) => {
            warn!(error = %e, "Progress display task failed");
            println!("{}", summary);
        }
    }

    if summary.status == RunStatus::Paused && summary.held_for_review.is_some() {
        println!();
        println!("Tick the checklist items in the project file, then run `draftsman run` again.");
    }

    Ok(summary.status)
}
