//! What happens to a phase once it is `in-review`.

use crate::project::Phase;

/// Verdict of a review policy for one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Move the phase to `completed` now.
    Advance,
    /// Leave the phase `in-review` until someone approves it.
    Hold,
}

/// Decides whether an in-review phase may complete within an automated run.
pub trait ReviewPolicy: Send + Sync {
    fn decide(&self, phase: &Phase) -> ReviewDecision;

    fn name(&self) -> &'static str;
}

/// The checklist is informational; phases complete immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoAdvance;

impl ReviewPolicy for AutoAdvance {
    fn decide(&self, _phase: &Phase) -> ReviewDecision {
        ReviewDecision::Advance
    }

    fn name(&self) -> &'static str {
        "auto-advance"
    }
}

/// Every reviewed phase waits for a human.
///
/// Checklist items the reviewer ticked off count as approval: a phase whose
/// checklist is non-empty and fully checked advances on the next run.
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldForApproval;

impl ReviewPolicy for HoldForApproval {
    fn decide(&self, phase: &Phase) -> ReviewDecision {
        let checklist = &phase.design_review.checklist;
        if !checklist.is_empty() && checklist.iter().all(|item| item.checked) {
            ReviewDecision::Advance
        } else {
            ReviewDecision::Hold
        }
    }

    fn name(&self) -> &'static str {
        "hold-for-approval"
    }
}
