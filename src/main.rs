use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cmd;

#[derive(Parser)]
#[command(name = "draftsman")]
#[command(version, about = "Lifecycle orchestrator for generated engineering documents")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a project from the lifecycle template
    Init {
        /// Project name
        #[arg(long)]
        name: String,

        /// Engineering discipline involved (repeatable)
        #[arg(long = "discipline")]
        disciplines: Vec<String>,

        /// File holding the requirements text
        #[arg(long)]
        requirements: Option<PathBuf>,

        /// File holding the constraints text
        #[arg(long)]
        constraints: Option<PathBuf>,

        /// Overwrite an existing project
        #[arg(long)]
        force: bool,
    },
    /// Run phase automation until complete, paused or failed
    Run {
        /// Generator command (overrides draftsman.toml and DRAFTSMAN_GENERATOR_CMD)
        #[arg(long)]
        generator_cmd: Option<String>,

        /// Keep reviewed phases in review until their checklist is approved
        #[arg(long)]
        hold_reviews: bool,
    },
    /// Show phase and sprint status
    Status,
    /// Print the context that generation would receive for a phase
    Context {
        /// Phase id, e.g. "critical-design"
        phase_id: String,
    },
    /// Compact the requirements context now
    Compact {
        /// Compact even below the threshold, replacing an existing summary
        #[arg(long)]
        force: bool,

        /// Generator command (overrides draftsman.toml and DRAFTSMAN_GENERATOR_CMD)
        #[arg(long)]
        generator_cmd: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir.clone() {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    match &cli.command {
        Commands::Init {
            name,
            disciplines,
            requirements,
            constraints,
            force,
        } => cmd::cmd_init(
            &project_dir,
            name,
            disciplines.clone(),
            requirements.as_deref(),
            constraints.as_deref(),
            *force,
        )?,
        Commands::Run {
            generator_cmd,
            hold_reviews,
        } => {
            let status =
                cmd::cmd_run(&cli, project_dir, generator_cmd.clone(), *hold_reviews).await?;
            if status == draftsman::orchestrator::RunStatus::Error {
                std::process::exit(1);
            }
        }
        Commands::Status => cmd::cmd_status(&project_dir)?,
        Commands::Context { phase_id } => cmd::cmd_context(&project_dir, phase_id)?,
        Commands::Compact {
            force,
            generator_cmd,
        } => cmd::cmd_compact(&cli, project_dir, generator_cmd.clone(), *force).await?,
    }

    Ok(())
}
