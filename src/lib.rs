pub mod compaction;
pub mod config;
pub mod context;
pub mod dag;
pub mod errors;
pub mod generation;
pub mod lifecycle;
pub mod logging;
pub mod orchestrator;
pub mod project;
pub mod review;
pub mod store;
pub mod strategy;
pub mod ui;
