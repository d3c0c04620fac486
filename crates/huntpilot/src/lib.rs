//! Job application tracking with rule-based follow-up reminders.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
