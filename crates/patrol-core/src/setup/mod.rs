//! World Setup
//!
//! Grid initialization and drone spawning.

pub mod fleet;

pub use fleet::*;
