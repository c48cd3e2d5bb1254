//! Context Compaction
//!
//! Bounds the context handed to later phases. Once the first phase's output
//! grows past a threshold, it is summarized into `compacted_context`, which
//! then stands in for the raw output in every later context build.
//!
//! ## Configuration
//!
//! ```toml
//! [compaction]
//! enabled = true
//! threshold = "60%"       # of context_budget, or an absolute count like "12000"
//! context_budget = 48000
//! ```

mod config;
mod manager;

pub use config::{ContextLimit, parse_context_limit};
pub use manager::{CompactionOutcome, CompactionSettings, Compactor, should_compact};

/// Default context budget in characters that percentage thresholds refer to.
pub const DEFAULT_CONTEXT_BUDGET: usize = 48_000;
