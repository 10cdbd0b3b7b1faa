//! Process-wide tracing/logging setup for Mentora services.

pub mod telemetry;

pub use telemetry::{init, init_compact};
