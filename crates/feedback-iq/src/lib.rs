//! Feedback triage: load pre-scored feedback, derive priority views, export them, relay
//! selected rows to an automation webhook and ask a language model for a summary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
