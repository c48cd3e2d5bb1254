//! Typed error hierarchy for the Draftsman orchestrator.
//!
//! Three leaf enums cover the subsystems below the orchestrator:
//! - `GenerationError`: generation backend and structured-response failures
//! - `GraphError`: structural defects in a sprint dependency graph
//! - `StoreError`: persistence failures
//!
//! `PhaseError` wraps all of them. It is the phase-fatal error: the
//! orchestrator catches it per phase, records the phase as failed for the
//! current run, and moves on.

use std::path::PathBuf;
use thiserror::Error;

use crate::generation::StructuredKind;

/// Errors from the generation collaborator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Transient backend failure (process error, non-zero exit, timeout).
    #[error("Generation backend failed: {message}")]
    Backend { message: String },

    /// The generator process could not be started.
    #[error("Failed to spawn generator '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The generator ran past its deadline.
    #[error("Generation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// A structured response could not be parsed into the expected shape.
    #[error("Malformed {kind} response: {reason}")]
    MalformedResponse { kind: StructuredKind, reason: String },
}

impl GenerationError {
    /// Create a transient backend error.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    /// Create a malformed-response error for the given shape.
    pub fn malformed(kind: StructuredKind, reason: impl Into<String>) -> Self {
        Self::MalformedResponse {
            kind,
            reason: reason.into(),
        }
    }

    /// Whether the bounded retry may attempt this call again.
    ///
    /// A malformed response is never retried: the same inputs would produce
    /// the same shape violation.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MalformedResponse { .. })
    }
}

/// Structural errors in a sprint dependency graph.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Duplicate sprint id: {id}")]
    DuplicateSprint { id: String },

    #[error("Sprint '{sprint}' depends on unknown sprint '{dependency}'")]
    UnknownDependency { sprint: String, dependency: String },

    #[error("Cycle or missing dependency: no sprint is ready; blocked sprints: {blocked:?}")]
    Cycle { blocked: Vec<String> },
}

/// Errors from the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access project file at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode project: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Project store lock poisoned")]
    LockPoisoned,
}

/// Phase-fatal error: ends processing of one phase for the current run.
#[derive(Debug, Error)]
pub enum PhaseError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl PhaseError {
    /// Whether this error reflects a structural defect rather than a backend issue.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Graph(_) | Self::Generation(GenerationError::MalformedResponse { .. })
        )
    }
}
