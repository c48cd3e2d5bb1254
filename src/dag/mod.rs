//! Sprint dependency scheduling for decompositional phases.
//!
//! Sprints of one phase form a dependency graph whose shape is only known
//! after a generation call proposes it. This module turns that graph into a
//! sequence of ready sets.
//!
//! ## Architecture
//!
//! 1. **Builder** - Resolves sprint ids to arena indices and builds edges
//! 2. **Scheduler** - Computes ready sets, tracks completion, detects cycles
//!
//! ## Example
//!
//! ```
//! use draftsman::dag::SprintScheduler;
//! use draftsman::project::Sprint;
//!
//! # fn example() -> Result<(), draftsman::errors::GraphError> {
//! let sprints = vec![
//!     Sprint::new("a", "Structure", "Primary structure"),
//!     Sprint::new("b", "Piping", "Piping layout").with_dependencies(vec!["a".into()]),
//!     Sprint::new("c", "Electrical", "Power distribution").with_dependencies(vec!["a".into()]),
//! ];
//!
//! let scheduler = SprintScheduler::from_sprints(&sprints)?;
//! let waves = scheduler.compute_waves();
//! // Wave 0: [a]
//! // Wave 1: [b, c] - both depend only on a, run in list order
//! assert_eq!(waves.len(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

mod builder;
mod scheduler;

pub use builder::{GraphBuilder, SprintGraph, SprintIndex};
pub use scheduler::SprintScheduler;
