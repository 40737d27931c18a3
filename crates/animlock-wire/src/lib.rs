//! animlock Wire - Action effect header layout
//!
//! Only two fields of the server's action effect header are consumed:
//! - the resolved action id
//! - the animation lock the server applied

pub mod effect;

pub use effect::*;
