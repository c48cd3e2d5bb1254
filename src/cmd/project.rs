//! Project creation: `draftsman init`.

use anyhow::{Context, Result, bail};
use std::path::Path;

use draftsman::config::{CONFIG_FILE, DRAFTSMAN_DIR, DraftsmanToml, PROJECT_FILE};
use draftsman::lifecycle::new_project;
use draftsman::store::{JsonProjectStore, ProjectStore};

fn read_optional(path: Option<&Path>, what: &str) -> Result<String> {
    match path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("Failed to read {} file: {}", what, p.display())),
        None => Ok(String::new()),
    }
}

pub fn cmd_init(
    project_dir: &Path,
    name: &str,
    disciplines: Vec<String>,
    requirements: Option<&Path>,
    constraints: Option<&Path>,
    force: bool,
) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Project name must not be empty");
    }

    let draftsman_dir = project_dir.join(DRAFTSMAN_DIR);
    let store = JsonProjectStore::new(draftsman_dir.join(PROJECT_FILE));
    if store.exists() && !force {
        bail!(
            "A project already exists at {}. Use --force to overwrite it.",
            store.path().display()
        );
    }

    let requirements = read_optional(requirements, "requirements")?;
    let constraints = read_optional(constraints, "constraints")?;

    let project = new_project(name.trim(), disciplines, &requirements, &constraints);
    store
        .persist(&project)
        .with_context(|| format!("Failed to create {}", store.path().display()))?;

    let config_path = draftsman_dir.join(CONFIG_FILE);
    let wrote_config = !config_path.exists();
    if wrote_config {
        DraftsmanToml::default().save(&config_path)?;
    }

    println!(
        "Initialized draftsman project '{}' at {}",
        project.name,
        draftsman_dir.display()
    );
    println!();
    println!("  {}/", DRAFTSMAN_DIR);
    println!("  ├── {}   # Project state, updated after every step", PROJECT_FILE);
    if wrote_config {
        println!("  └── {}  # Generator, retry, compaction and logging settings", CONFIG_FILE);
    } else {
        println!("  └── {}  # (kept existing file)", CONFIG_FILE);
    }
    println!();
    println!("Phases:");
    for (i, phase) in project.phases.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, phase.name, phase.kind);
    }
    println!();
    println!("Next: run `draftsman run` to start automation.");

    Ok(())
}
