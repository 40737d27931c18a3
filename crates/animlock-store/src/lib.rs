//! animlock Store - Learned animation locks
//!
//! This crate implements the durable side of the correction loop:
//! - Action lock database (action id -> last confirmed lock)
//! - Persistence capability injected by the host
//! - JSON settings file and fire-and-forget background writers

pub mod database;
pub mod persist;

pub use database::*;
pub use persist::*;
