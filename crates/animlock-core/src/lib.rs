//! animlock Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every animlock crate:
//! - Identifiers (ActionId, ActorId, ObjectId, ActionType)
//! - Lock timing constants and millisecond formatting
//! - Host events and hook kinds
//! - Configuration surface
//! - Error taxonomy

pub mod config;
pub mod error;
pub mod event;
pub mod id;
pub mod time;

pub use config::*;
pub use error::*;
pub use event::*;
pub use id::*;
pub use time::*;
