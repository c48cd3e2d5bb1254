//! Structured responses and their boundary validation.
//!
//! The generation backend returns an untyped JSON payload. Each expected
//! shape implements `StructuredResponse`, which converts the payload into a
//! typed value or fails with `MalformedResponse`. Nothing past this boundary
//! sees raw JSON.

use crate::errors::GenerationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The shapes a structured generation call can be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StructuredKind {
    /// Preliminary specification plus proposed sprints with dependency names.
    SprintPlan,
    /// Technical specification and deliverables for one sprint.
    SprintSpec,
    /// Short verification strings for a design review.
    Checklist,
}

impl StructuredKind {
    /// JSON shape description appended to structured prompts.
    pub fn schema_hint(&self) -> &'static str {
        match self {
            StructuredKind::SprintPlan => {
                r#"{"specification": "<preliminary specification text>", "sprints": [{"name": "<unique sprint name>", "description": "<what this sprint designs>", "dependencies": ["<name of another sprint>"]}]}"#
            }
            StructuredKind::SprintSpec => {
                r#"{"technical_spec": "<full technical specification text>", "deliverables": ["<deliverable>"]}"#
            }
            StructuredKind::Checklist => r#"{"items": ["<short verification statement>"]}"#,
        }
    }
}

impl std::fmt::Display for StructuredKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StructuredKind::SprintPlan => write!(f, "sprint-plan"),
            StructuredKind::SprintSpec => write!(f, "sprint-spec"),
            StructuredKind::Checklist => write!(f, "checklist"),
        }
    }
}

/// A typed view of a structured payload.
pub trait StructuredResponse: DeserializeOwned + Sized {
    const KIND: StructuredKind;

    /// Shape checks serde cannot express.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }

    fn from_payload(payload: Value) -> Result<Self, GenerationError> {
        let value: Self = serde_json::from_value(payload)
            .map_err(|e| GenerationError::malformed(Self::KIND, e.to_string()))?;
        value
            .validate()
            .map_err(|reason| GenerationError::malformed(Self::KIND, reason))?;
        Ok(value)
    }
}

/// One sprint as proposed by the generator, before identities exist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProposedSprint {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "depends_on")]
    pub dependencies: Vec<String>,
}

/// Preliminary specification plus the proposed sprint graph.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SprintPlan {
    #[serde(alias = "spec", alias = "preliminary_specification")]
    pub specification: String,
    #[serde(default)]
    pub sprints: Vec<ProposedSprint>,
}

impl StructuredResponse for SprintPlan {
    const KIND: StructuredKind = StructuredKind::SprintPlan;

    fn validate(&self) -> Result<(), String> {
        if let Some(pos) = self.sprints.iter().position(|s| s.name.trim().is_empty()) {
            return Err(format!("sprint #{} has an empty name", pos + 1));
        }
        Ok(())
    }
}

/// Generated content for one sprint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SprintSpec {
    #[serde(alias = "technicalSpec", alias = "spec")]
    pub technical_spec: String,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

impl StructuredResponse for SprintSpec {
    const KIND: StructuredKind = StructuredKind::SprintSpec;
}

/// Verification checklist for a design review.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Checklist {
    pub items: Vec<String>,
}

impl StructuredResponse for Checklist {
    const KIND: StructuredKind = StructuredKind::Checklist;

    fn from_payload(payload: Value) -> Result<Self, GenerationError> {
        // A bare array of strings is accepted as the item list.
        let payload = match payload {
            Value::Array(items) => serde_json::json!({ "items": items }),
            other => other,
        };
        let checklist: Checklist = serde_json::from_value(payload)
            .map_err(|e| GenerationError::malformed(Self::KIND, e.to_string()))?;
        Ok(Checklist {
            items: checklist
                .items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

/// Extract a JSON object or array from free text.
///
/// A fenced ```` ```json ```` block wins when it parses. Otherwise every `{`
/// or `[` is tried in order and the first balanced slice that parses is
/// returned, so brackets in surrounding prose are skipped.
pub fn extract_json_payload(text: &str) -> Option<&str> {
    if let Some(fenced) = fenced_json(text)
        && parses(fenced)
    {
        return Some(fenced);
    }

    text.char_indices()
        .filter(|&(_, ch)| ch == '{' || ch == '[')
        .filter_map(|(start, _)| balanced_slice(text, start))
        .find(|candidate| parses(candidate))
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<Value>(candidate).is_ok()
}

/// Body of the first ```` ```json ```` code block.
fn fenced_json(text: &str) -> Option<&str> {
    let start = text.find("```json")? + "```json".len();
    let body = &text[start..];
    let end = body.find("```")?;
    Some(body[..end].trim())
}

/// The bracketed slice opening at `start`, if it closes. Brackets inside
/// string literals are ignored.
fn balanced_slice(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(&text[start..start + i + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Parse a raw text response into a JSON payload for the given shape.
pub fn parse_payload(kind: StructuredKind, text: &str) -> Result<Value, GenerationError> {
    let json = extract_json_payload(text)
        .ok_or_else(|| GenerationError::malformed(kind, "no JSON object in response"))?;
    serde_json::from_str(json).map_err(|e| GenerationError::malformed(kind, e.to_string()))
}
