//! Progress events emitted during an automation run.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::RunStatus;

/// Events emitted while automating a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AutomationEvent {
    /// A phase has been selected and its execution is starting.
    PhaseStarted { phase_id: String, phase_name: String },
    /// One document or sprint of a phase finished.
    SprintCompleted {
        phase_id: String,
        sprint_name: String,
        completed: usize,
        total: usize,
    },
    /// A phase reached `completed`.
    PhaseCompleted { phase_id: String, phase_name: String },
    /// A phase was skipped for the rest of this run.
    PhaseFailed {
        phase_id: String,
        phase_name: String,
        error: String,
    },
    /// Free-form progress text.
    Message { text: String },
    /// The run reached a terminal status.
    RunFinished { status: RunStatus },
}

pub type EventSender = mpsc::UnboundedSender<AutomationEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<AutomationEvent>;

/// Create a connected event channel.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Optional event sink shared by the orchestrator and its collaborators.
///
/// Sending never blocks and never fails the run: a dropped receiver only
/// means nobody is watching.
#[derive(Debug, Clone, Default)]
pub struct Progress {
    tx: Option<EventSender>,
}

impl Progress {
    pub fn new(tx: EventSender) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that discards everything.
    pub fn silent() -> Self {
        Self::default()
    }

    pub fn emit(&self, event: AutomationEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn message(&self, text: impl Into<String>) {
        self.emit(AutomationEvent::Message { text: text.into() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_delivers_events() {
        let (tx, mut rx) = event_channel();
        let progress = Progress::new(tx);
        progress.message("hello");
        assert_eq!(
            rx.try_recv().unwrap(),
            AutomationEvent::Message {
                text: "hello".into()
            }
        );
    }

    #[test]
    fn test_progress_survives_dropped_receiver() {
        let (tx, rx) = event_channel();
        drop(rx);
        Progress::new(tx).message("nobody listening");
        Progress::silent().message("nowhere");
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let json = serde_json::to_string(&AutomationEvent::PhaseStarted {
            phase_id: "requirements".into(),
            phase_name: "Requirements".into(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"phase_started""#));
    }
}
