//! Event Logging
//!
//! Persists the per-tick `PatrolEvent` stream as JSONL.

pub mod logger;

pub use logger::EventLogger;
