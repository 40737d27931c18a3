//! animlock Test Harness - Simulated play sessions for the correction loop
//!
//! This crate provides:
//! - An in-memory host (live lock timer + hook registry)
//! - Seeded round-trip latency profiles
//! - A scenario runner for instant and cast actions
//! - End-to-end checks of the correction loop

pub mod host;
pub mod latency;
pub mod scenario;

#[cfg(test)]
mod integration;

pub use host::*;
pub use latency::*;
pub use scenario::*;
