//! Manual context compaction: `draftsman compact`.

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;

use draftsman::compaction::{CompactionOutcome, Compactor};
use draftsman::config::DraftsmanConfig;
use draftsman::generation::Generator;
use draftsman::logging;
use draftsman::orchestrator::Progress;
use draftsman::ui::icons::{INFO, SPARKLE};

use super::super::Cli;
use super::open_project;

pub async fn cmd_compact(
    cli: &Cli,
    project_dir: PathBuf,
    generator_cmd: Option<String>,
    force: bool,
) -> Result<()> {
    let config = DraftsmanConfig::new(project_dir)?
        .with_verbose(cli.verbose)
        .with_generator_cmd(generator_cmd);
    logging::init(&config.logging());

    let (store, mut project) = open_project(&config)?;
    let generator = Generator::new(Arc::new(config.command_client())).with_retry(config.retry_policy());
    let settings = config.compaction_settings();
    let progress = Progress::silent();

    let compactor = Compactor::new(&generator, &store, &progress, &settings);
    match compactor.compact(&mut project, force).await? {
        CompactionOutcome::Compacted {
            original_chars,
            summary_chars,
        } => {
            println!(
                "{}Compacted requirements context: {} -> {} chars",
                SPARKLE, original_chars, summary_chars
            );
        }
        CompactionOutcome::Skipped { reason } => {
            println!("{}Nothing compacted: {}", INFO, reason);
            if !force {
                println!("Use --force to compact below the threshold.");
            }
        }
    }

    Ok(())
}
