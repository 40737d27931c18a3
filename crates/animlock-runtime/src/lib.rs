//! animlock Runtime - Animation lock correction loop
//!
//! This crate wires the correction loop to a host:
//! 1. Subscribe to the host hooks on activation
//! 2. Count outbound packets and advance the packet window every frame
//! 3. Apply the learned lock when an action is submitted
//! 4. Track cast bars so cast locks take the additive path
//! 5. Correct the live lock from each server acknowledgement
//! 6. Record the confirmed lock and refine the delay estimate

pub mod cast;
pub mod controller;
pub mod host;
pub mod logging;
pub mod outcome;

pub use cast::*;
pub use controller::*;
pub use host::*;
pub use logging::*;
pub use outcome::*;
