//! Output Generation
//!
//! Snapshot generation and coverage statistics.

pub mod snapshot;
pub mod stats;

pub use snapshot::*;
pub use stats::*;
