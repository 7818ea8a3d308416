//! Events
//!
//! Event queueing during a tick and JSONL persistence.

pub mod logger;

pub use logger::{EventLogger, PendingEvents};
