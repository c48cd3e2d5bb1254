//! Project, phase and sprint data model.
//!
//! This module provides:
//! - `Project`, the aggregate the orchestrator mutates during a run
//! - `Phase` and `Sprint` with their forward-only status machines
//! - `PhaseKind`, the closed set of execution shapes selected by static metadata
//! - JSON loading/saving of a project file

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Opaque parameter bag handed to the generation backend untouched.
pub type TuningSettings = BTreeMap<String, serde_json::Value>;

/// How a phase's output is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseKind {
    /// One generation call produces the whole phase output.
    #[default]
    Direct,
    /// An ordered list of independent documents, concatenated.
    DocumentSeries,
    /// A proposed specification plus a runtime sprint dependency graph.
    Decompositional,
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseKind::Direct => write!(f, "direct"),
            PhaseKind::DocumentSeries => write!(f, "document-series"),
            PhaseKind::Decompositional => write!(f, "decompositional"),
        }
    }
}

/// Status of a phase. Transitions only move forward during automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseStatus {
    #[default]
    NotStarted,
    InProgress,
    InReview,
    Completed,
}

impl PhaseStatus {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhaseStatus::NotStarted => write!(f, "not-started"),
            PhaseStatus::InProgress => write!(f, "in-progress"),
            PhaseStatus::InReview => write!(f, "in-review"),
            PhaseStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Status of a sprint within its phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SprintStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl std::fmt::Display for SprintStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SprintStatus::NotStarted => write!(f, "not-started"),
            SprintStatus::InProgress => write!(f, "in-progress"),
            SprintStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A single verification item produced by the design review gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub checked: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            text: text.into(),
            checked: false,
        }
    }
}

/// Review requirements attached to a phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DesignReview {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
}

impl DesignReview {
    pub fn required() -> Self {
        Self {
            required: true,
            checklist: Vec::new(),
        }
    }
}

/// A sub-unit of work inside a document-series or decompositional phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: SprintStatus,
    /// Ids of sibling sprints (same phase) that must complete first.
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub deliverables: Vec<String>,
}

impl Sprint {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            status: SprintStatus::NotStarted,
            dependencies: Vec::new(),
            output: String::new(),
            deliverables: Vec::new(),
        }
    }

    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status == SprintStatus::Completed
    }
}

/// A top-level lifecycle stage of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub kind: PhaseKind,
    #[serde(default)]
    pub sprints: Vec<Sprint>,
    #[serde(default)]
    pub tuning: TuningSettings,
    #[serde(default)]
    pub design_review: DesignReview,
    #[serde(default)]
    pub status: PhaseStatus,
    #[serde(default)]
    pub output: String,
}

impl Phase {
    pub fn new(id: &str, name: &str, description: &str, kind: PhaseKind) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            kind,
            sprints: Vec::new(),
            tuning: TuningSettings::new(),
            design_review: DesignReview::default(),
            status: PhaseStatus::NotStarted,
            output: String::new(),
        }
    }

    pub fn with_sprints(mut self, sprints: Vec<Sprint>) -> Self {
        self.sprints = sprints;
        self
    }

    pub fn with_review(mut self, required: bool) -> Self {
        self.design_review.required = required;
        self
    }

    pub fn with_tuning(mut self, tuning: TuningSettings) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn is_completed(&self) -> bool {
        self.status.is_completed()
    }

    pub fn sprint(&self, id: &str) -> Option<&Sprint> {
        self.sprints.iter().find(|s| s.id == id)
    }

    pub fn completed_sprint_count(&self) -> usize {
        self.sprints.iter().filter(|s| s.is_completed()).count()
    }
}

/// Kind of a side artifact stored outside the phase sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetaDocumentKind {
    Checklist,
    RiskReport,
}

/// A side artifact (checklist, risk report). Append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaDocument {
    pub id: String,
    pub kind: MetaDocumentKind,
    pub title: String,
    #[serde(default)]
    pub phase_id: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl MetaDocument {
    pub fn new(kind: MetaDocumentKind, title: &str, phase_id: Option<&str>, content: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            title: title.to_string(),
            phase_id: phase_id.map(str::to_string),
            content,
            created_at: Utc::now(),
        }
    }
}

/// The project aggregate: fixed-order phases plus shared context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub disciplines: Vec<String>,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub constraints: String,
    pub phases: Vec<Phase>,
    /// Summary that stands in for the first phase's raw output once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compacted_context: Option<String>,
    #[serde(default)]
    meta_documents: Vec<MetaDocument>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(name: &str, phases: Vec<Phase>) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            disciplines: Vec::new(),
            requirements: String::new(),
            constraints: String::new(),
            phases,
            compacted_context: None,
            meta_documents: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_disciplines(mut self, disciplines: Vec<String>) -> Self {
        self.disciplines = disciplines;
        self
    }

    pub fn with_requirements(mut self, requirements: &str) -> Self {
        self.requirements = requirements.to_string();
        self
    }

    pub fn with_constraints(mut self, constraints: &str) -> Self {
        self.constraints = constraints.to_string();
        self
    }

    /// The active phase: first phase in order that is not completed.
    pub fn active_phase(&self) -> Option<&Phase> {
        self.phases.iter().find(|p| !p.is_completed())
    }

    /// Index of the first incomplete phase whose id is not excluded.
    ///
    /// Re-derived from current state on every call; this is what makes a
    /// paused run resume at the right place.
    pub fn next_incomplete(&self, excluded: &[String]) -> Option<usize> {
        self.phases
            .iter()
            .position(|p| !p.is_completed() && !excluded.contains(&p.id))
    }

    pub fn phase_index(&self, id: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.id == id)
    }

    pub fn phase(&self, id: &str) -> Option<&Phase> {
        self.phases.iter().find(|p| p.id == id)
    }

    pub fn phase_mut(&mut self, id: &str) -> Option<&mut Phase> {
        self.phases.iter_mut().find(|p| p.id == id)
    }

    pub fn all_completed(&self) -> bool {
        self.phases.iter().all(Phase::is_completed)
    }

    pub fn meta_documents(&self) -> &[MetaDocument] {
        &self.meta_documents
    }

    /// Append a side artifact. Existing entries are never modified or removed.
    pub fn append_meta_document(&mut self, document: MetaDocument) {
        self.meta_documents.push(document);
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Load a project from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;

        let project: Project = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse project JSON: {}", path.display()))?;

        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project::new(
            "Pump Station",
            vec![
                Phase::new("requirements", "Requirements", "", PhaseKind::DocumentSeries),
                Phase::new("design", "Design", "", PhaseKind::Direct),
                Phase::new("critical", "Critical Design", "", PhaseKind::Decompositional),
            ],
        )
    }

    #[test]
    fn test_active_phase_is_first_incomplete() {
        let mut project = sample_project();
        assert_eq!(project.active_phase().unwrap().id, "requirements");

        project.phases[0].status = PhaseStatus::Completed;
        assert_eq!(project.active_phase().unwrap().id, "design");

        project.phases[1].status = PhaseStatus::Completed;
        project.phases[2].status = PhaseStatus::Completed;
        assert!(project.active_phase().is_none());
        assert!(project.all_completed());
    }

    #[test]
    fn test_next_incomplete_skips_excluded() {
        let mut project = sample_project();
        project.phases[0].status = PhaseStatus::Completed;
        let failed = vec!["design".to_string()];
        assert_eq!(project.next_incomplete(&failed), Some(2));
        let none: Vec<String> = Vec::new();
        assert_eq!(project.next_incomplete(&none), Some(1));
    }

    #[test]
    fn test_status_serializes_kebab_case() {
        let json = serde_json::to_string(&PhaseStatus::NotStarted).unwrap();
        assert_eq!(json, "\"not-started\"");
        let json = serde_json::to_string(&PhaseStatus::InReview).unwrap();
        assert_eq!(json, "\"in-review\"");
        let kind: PhaseKind = serde_json::from_str("\"document-series\"").unwrap();
        assert_eq!(kind, PhaseKind::DocumentSeries);
    }

    #[test]
    fn test_phase_defaults_when_fields_missing() {
        let phase: Phase = serde_json::from_str(r#"{"id": "x", "name": "X"}"#).unwrap();
        assert_eq!(phase.kind, PhaseKind::Direct);
        assert_eq!(phase.status, PhaseStatus::NotStarted);
        assert!(phase.sprints.is_empty());
        assert!(!phase.design_review.required);
    }

    #[test]
    fn test_meta_documents_append_only() {
        let mut project = sample_project();
        project.append_meta_document(MetaDocument::new(
            MetaDocumentKind::Checklist,
            "Design checklist",
            Some("design"),
            "- item".into(),
        ));
        project.append_meta_document(MetaDocument::new(
            MetaDocumentKind::RiskReport,
            "Risks",
            None,
            "none".into(),
        ));
        assert_eq!(project.meta_documents().len(), 2);
        assert_eq!(project.meta_documents()[0].title, "Design checklist");
    }

    #[test]
    fn test_project_json_roundtrip_preserves_tuning() {
        let mut project = sample_project();
        project.phases[1]
            .tuning
            .insert("temperature".into(), serde_json::json!(0.4));
        let json = serde_json::to_string(&project).unwrap();
        let back: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(back.phases[1].tuning["temperature"], serde_json::json!(0.4));
        assert_eq!(back, project);
    }

    #[test]
    fn test_load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let err = Project::load(&path).unwrap_err();
        assert!(err.to_string().contains("missing.json"));
    }
}
