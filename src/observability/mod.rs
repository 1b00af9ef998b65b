//! Observability
//!
//! - Structured logging (JSON lines)
//! - Typed events
//! - Counters
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. Logging never fails the caller
//! 3. No background threads
//!
//! # Usage
//!
//! ```ignore
//! use chronodoc::observability::{log_event, Event, MetricsRegistry};
//!
//! log_event(Event::SnapshotResolved, &[("revision", "3")]);
//!
//! let metrics = MetricsRegistry::new();
//! metrics.increment_snapshots_resolved();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log an event at its own severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
