//! Project persistence.
//!
//! The orchestrator persists after every status transition and every sprint
//! completion. A write either lands fully or not at all: the JSON store
//! writes a sibling temp file and renames it over the target.

use crate::errors::StoreError;
use crate::project::Project;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// Durable snapshot sink for the project aggregate.
pub trait ProjectStore: Send + Sync {
    fn persist(&self, project: &Project) -> Result<(), StoreError>;
}

/// Stores the project as pretty-printed JSON at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonProjectStore {
    path: PathBuf,
}

impl JsonProjectStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self) -> anyhow::Result<Project> {
        Project::load(&self.path)
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl ProjectStore for JsonProjectStore {
    fn persist(&self, project: &Project) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(project)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, content).map_err(|e| self.io_error(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), "Project persisted");
        Ok(())
    }
}

/// Keeps every persisted snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshots: Mutex<Vec<Project>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persist_count(&self) -> usize {
        self.snapshots.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn last(&self) -> Option<Project> {
        self.snapshots.lock().ok().and_then(|s| s.last().cloned())
    }

    pub fn snapshots(&self) -> Vec<Project> {
        self.snapshots
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl ProjectStore for MemoryStore {
    fn persist(&self, project: &Project) -> Result<(), StoreError> {
        self.snapshots
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?
            .push(project.clone());
        Ok(())
    }
}
