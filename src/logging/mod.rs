//! Structured logging: tracing subscriber setup and JSON audit lines.

mod format;

pub use format::{AssessmentLogLine, StructuredLogger};
