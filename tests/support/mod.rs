//! Deterministic generation client for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use draftsman::errors::GenerationError;
use draftsman::generation::{GenerationClient, GenerationRequest, GenerationTarget};
use draftsman::orchestrator::CancellationToken;
use draftsman::project::{Phase, PhaseKind, Project, Sprint};
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Answers every target with text derived from its name and records the calls.
///
/// - documents: `Text of <name>`
/// - direct phases: `Output of <phase>`
/// - compaction: `Summary of <phase>`
/// - sprint plans: the plan registered for the phase, or an empty plan
/// - sprints: `{"technical_spec": "Spec of <name>", "deliverables": ["<name> drawing"]}`
/// - checklists: `{"items": ["Verify <phase>"]}`
#[derive(Default)]
pub struct ScriptedClient {
    plans: HashMap<String, serde_json::Value>,
    transient: Mutex<HashMap<String, u32>>,
    malformed: HashSet<String>,
    cancel_after: Option<(String, CancellationToken)>,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sprint plan returned for `phase_name`.
    pub fn with_plan(mut self, phase_name: &str, plan: serde_json::Value) -> Self {
        self.plans.insert(phase_name.to_string(), plan);
        self
    }

    /// The first `times` calls for `label` fail with a transient error.
    pub fn failing(self, label: &str, times: u32) -> Self {
        self.transient
            .lock()
            .unwrap()
            .insert(label.to_string(), times);
        self
    }

    /// Calls for `label` return text that holds no JSON.
    pub fn malformed(mut self, label: &str) -> Self {
        self.malformed.insert(label.to_string());
        self
    }

    /// Cancel `token` as soon as the call for `label` has produced its text.
    pub fn cancel_after(mut self, label: &str, token: CancellationToken) -> Self {
        self.cancel_after = Some((label.to_string(), token));
        self
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<String> {
        self.calls().iter().map(|c| c.target.label()).collect()
    }

    pub fn count(&self, label: &str) -> usize {
        self.labels().iter().filter(|l| l.as_str() == label).count()
    }

    /// Context of the first call for `label`.
    pub fn context_for(&self, label: &str) -> String {
        self.calls()
            .into_iter()
            .find(|c| c.target.label() == label)
            .map(|c| c.context)
            .unwrap_or_else(|| panic!("no call for {label}"))
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn respond(&self, request: &GenerationRequest) -> String {
        match &request.target {
            GenerationTarget::SprintPlan { phase_name, .. } => self
                .plans
                .get(phase_name)
                .cloned()
                .unwrap_or_else(|| json!({"specification": format!("Spec for {phase_name}"), "sprints": []}))
                .to_string(),
            GenerationTarget::Sprint { name, .. } => json!({
                "technical_spec": format!("Spec of {name}"),
                "deliverables": [format!("{name} drawing")]
            })
            .to_string(),
            GenerationTarget::Checklist { phase_name } => {
                json!({"items": [format!("Verify {phase_name}")]}).to_string()
            }
            GenerationTarget::Document { name, .. } => format!("Text of {name}"),
            GenerationTarget::Phase { phase_name, .. } => format!("Output of {phase_name}"),
            GenerationTarget::Compaction { phase_name } => format!("Summary of {phase_name}"),
        }
    }
}

#[async_trait]
impl GenerationClient for ScriptedClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let label = request.target.label();
        self.calls.lock().unwrap().push(request.clone());

        {
            let mut transient = self.transient.lock().unwrap();
            if let Some(remaining) = transient.get_mut(&label)
                && *remaining > 0
            {
                *remaining -= 1;
                return Err(GenerationError::backend(format!("{label}: backend unavailable")));
            }
        }

        let text = if self.malformed.contains(&label) {
            "I could not produce that, sorry.".to_string()
        } else {
            self.respond(request)
        };

        if let Some((after, token)) = &self.cancel_after
            && *after == label
        {
            token.cancel();
        }

        Ok(text)
    }
}

/// Document series with three documents: Scope, SOW, TechSpec.
pub fn requirements_phase() -> Phase {
    Phase::new("requirements", "Requirements", "Baseline", PhaseKind::DocumentSeries).with_sprints(
        vec![
            Sprint::new("scope", "Scope", "Scope document"),
            Sprint::new("sow", "SOW", "Statement of work"),
            Sprint::new("techspec", "TechSpec", "Technical specification"),
        ],
    )
}

pub fn design_phase() -> Phase {
    Phase::new("design", "Design", "Concept", PhaseKind::Direct)
}

pub fn critical_phase() -> Phase {
    Phase::new("critical", "Critical", "Detailed design", PhaseKind::Decompositional)
}

pub fn project(phases: Vec<Phase>) -> Project {
    Project::new("Pump Station", phases)
        .with_disciplines(vec!["Mechanical".to_string()])
        .with_requirements("Move 40 l/s")
        .with_constraints("Budget 2M")
}

/// Plan with A, B after A, C after A.
pub fn fan_out_plan() -> serde_json::Value {
    json!({
        "specification": "Preliminary spec",
        "sprints": [
            {"name": "A", "description": "first"},
            {"name": "B", "description": "second", "dependencies": ["A"]},
            {"name": "C", "description": "third", "dependencies": ["A"]}
        ]
    })
}

pub const PLAN_LABEL: &str = "sprint plan (Critical)";

pub fn sprint_label(name: &str) -> String {
    format!("sprint '{name}' (Critical)")
}

pub fn document_label(name: &str) -> String {
    format!("document '{name}' (Requirements)")
}

