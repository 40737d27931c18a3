//! animlock Time - Network timing signals
//!
//! This crate implements the two timing inputs of the correction loop:
//! - Packet window: outbound requests sent in the trailing ~50 ms
//! - Delay estimate: smoothed round-trip delay above the simulated floor

pub mod delay;
pub mod packets;

pub use delay::*;
pub use packets::*;
