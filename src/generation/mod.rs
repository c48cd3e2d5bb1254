//! Generation collaborator: the boundary to whatever produces document text.
//!
//! The orchestrator never talks to a backend directly. It builds a
//! `GenerationRequest` (what to write plus the accumulated context) and hands
//! it to a `Generator`, which applies the bounded retry around an injected
//! `GenerationClient`.
//!
//! ## Structured calls
//!
//! `generate_structured` asks for a JSON payload of a given `StructuredKind`.
//! The payload is converted into a typed value (`SprintPlan`, `SprintSpec`,
//! `Checklist`) before anything else sees it. A payload that does not fit is
//! a `MalformedResponse` and is not retried.

mod command;
mod prompt;
mod retry;
mod structured;

#[cfg(test)]
pub(crate) mod testing;

pub use command::{CommandClient, TUNING_ENV};
pub use prompt::render;
pub use retry::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY, RetryPolicy};
pub use structured::{
    Checklist, ProposedSprint, SprintPlan, SprintSpec, StructuredKind, StructuredResponse,
    extract_json_payload, parse_payload,
};

use crate::errors::GenerationError;
use crate::project::TuningSettings;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// What a generation call is asked to produce.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationTarget {
    /// Whole output of a direct phase.
    Phase {
        phase_name: String,
        description: String,
    },
    /// One document of a document-series phase.
    Document {
        phase_name: String,
        name: String,
        description: String,
    },
    /// Preliminary specification plus proposed sprints.
    SprintPlan {
        phase_name: String,
        description: String,
    },
    /// Technical specification for one sprint of a decompositional phase.
    Sprint {
        phase_name: String,
        name: String,
        description: String,
    },
    /// Design review checklist for a finished phase output.
    Checklist { phase_name: String },
    /// Dense summary of a phase output used as compacted context.
    Compaction { phase_name: String },
}

impl GenerationTarget {
    pub fn phase_name(&self) -> &str {
        match self {
            GenerationTarget::Phase { phase_name, .. }
            | GenerationTarget::Document { phase_name, .. }
            | GenerationTarget::SprintPlan { phase_name, .. }
            | GenerationTarget::Sprint { phase_name, .. }
            | GenerationTarget::Checklist { phase_name }
            | GenerationTarget::Compaction { phase_name } => phase_name,
        }
    }

    /// Short human-readable label for logs and progress messages.
    pub fn label(&self) -> String {
        match self {
            GenerationTarget::Phase { phase_name, .. } => format!("phase '{}'", phase_name),
            GenerationTarget::Document {
                phase_name, name, ..
            } => format!("document '{}' ({})", name, phase_name),
            GenerationTarget::SprintPlan { phase_name, .. } => {
                format!("sprint plan ({})", phase_name)
            }
            GenerationTarget::Sprint {
                phase_name, name, ..
            } => format!("sprint '{}' ({})", name, phase_name),
            GenerationTarget::Checklist { phase_name } => format!("checklist ({})", phase_name),
            GenerationTarget::Compaction { phase_name } => format!("compaction ({})", phase_name),
        }
    }
}

/// A single generation call: target, accumulated context and tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub target: GenerationTarget,
    pub context: String,
    /// Passed to the backend untouched.
    pub tuning: TuningSettings,
    /// Set when the caller expects a JSON payload of this shape.
    pub structured: Option<StructuredKind>,
}

impl GenerationRequest {
    pub fn new(target: GenerationTarget, context: String) -> Self {
        Self {
            target,
            context,
            tuning: TuningSettings::new(),
            structured: None,
        }
    }

    pub fn with_tuning(mut self, tuning: TuningSettings) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn expecting(mut self, kind: StructuredKind) -> Self {
        self.structured = Some(kind);
        self
    }
}

/// A backend able to produce text for a request.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Produce free text for the request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Produce a JSON payload of the given shape.
    ///
    /// The default asks `generate` for JSON and extracts the payload from
    /// the returned text.
    async fn generate_structured(
        &self,
        request: &GenerationRequest,
        kind: StructuredKind,
    ) -> Result<Value, GenerationError> {
        let request = request.clone().expecting(kind);
        let text = self.generate(&request).await?;
        parse_payload(kind, &text)
    }
}

/// Retrying front for a `GenerationClient`.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn GenerationClient>,
    retry: RetryPolicy,
}

impl Generator {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Free-text generation with the bounded retry.
    pub async fn text(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let label = request.target.label();
        debug!(target = %label, context_chars = request.context.len(), "Generating text");
        self.retry
            .run(&label, || self.client.generate(request))
            .await
    }

    /// Structured generation converted to `T` at the boundary.
    ///
    /// Transport failures are retried. A payload that does not fit `T` is
    /// returned as `MalformedResponse` on the first occurrence.
    pub async fn structured<T: StructuredResponse>(
        &self,
        request: &GenerationRequest,
    ) -> Result<T, GenerationError> {
        let label = request.target.label();
        debug!(target = %label, kind = %T::KIND, "Generating structured response");
        let payload = self
            .retry
            .run(&label, || self.client.generate_structured(request, T::KIND))
            .await?;
        T::from_payload(payload)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}
