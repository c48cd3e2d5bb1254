//! CLI command implementations.
//!
//! | Module    | Commands handled      |
//! |-----------|-----------------------|
//! | `project` | `Init`                |
//! | `run`     | `Run`                 |
//! | `status`  | `Status`, `Context`   |
//! | `compact` | `Compact`             |

pub mod compact;
pub mod project;
pub mod run;
pub mod status;

pub use compact::cmd_compact;
pub use project::cmd_init;
pub use run::cmd_run;
pub use status::{cmd_context, cmd_status};

use anyhow::{Result, bail};
use draftsman::config::DraftsmanConfig;
use draftsman::project::Project;
use draftsman::store::JsonProjectStore;

/// Open the project file named by `config`, failing with a hint when absent.
pub(crate) fn open_project(config: &DraftsmanConfig) -> Result<(JsonProjectStore, Project)> {
    let store = JsonProjectStore::new(config.project_file());
    if !store.exists() {
        bail!(
            "No project found at {}. Run 'draftsman init --name <NAME>' first.",
            store.path().display()
        );
    }
    let project = store.load()?;
    Ok((store, project))
}
