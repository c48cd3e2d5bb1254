//! Design review gate for phase completion.
//!
//! A phase that requires review gets a checklist generated from its output
//! and passes through `in-review` before it completes. Whether it leaves
//! `in-review` in the same run is up to the configured [`ReviewPolicy`]:
//!
//! - [`AutoAdvance`] completes the phase immediately; the checklist is an
//!   audit artifact only
//! - [`HoldForApproval`] keeps the phase in review until every checklist item
//!   is checked
//!
//! ## Example
//!
//! ```
//! use draftsman::project::{Phase, PhaseKind};
//! use draftsman::review::{AutoAdvance, HoldForApproval, ReviewDecision, ReviewPolicy};
//!
//! let phase = Phase::new("critical", "Critical Design", "", PhaseKind::Decompositional)
//!     .with_review(true);
//!
//! assert_eq!(AutoAdvance.decide(&phase), ReviewDecision::Advance);
//! assert_eq!(HoldForApproval.decide(&phase), ReviewDecision::Hold);
//! ```

mod gate;
mod policy;

pub use gate::{GateOutcome, ReviewGate};
pub use policy::{AutoAdvance, HoldForApproval, ReviewDecision, ReviewPolicy};
