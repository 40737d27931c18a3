//! Identity types for animlock
//!
//! Action identifiers are the 32-bit keys of the lock database. Actor and
//! object identifiers are opaque 64-bit handles handed over by the host.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Resolved action identity - key of the lock database
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(pub u32);

impl ActionId {
    pub const ZERO: ActionId = ActionId(0);

    #[inline]
    pub fn new(id: u32) -> Self {
        ActionId(id)
    }

    #[inline]
    pub fn to_bytes(self) -> [u8; 4] {
        self.0.to_le_bytes()
    }

    #[inline]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        ActionId(u32::from_le_bytes(bytes))
    }
}

impl fmt::Debug for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Action({})", self.0)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raw action category as reported by the host before resolution
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionType(pub u32);

impl ActionType {
    /// Ordinary combat action
    pub const SPELL: ActionType = ActionType(1);
    /// Consumable item
    pub const ITEM: ActionType = ActionType(2);
    /// General action (sprint, mount, ...)
    pub const GENERAL: ActionType = ActionType(5);

    #[inline]
    pub fn new(raw: u32) -> Self {
        ActionType(raw)
    }
}

impl fmt::Debug for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ActionType({})", self.0)
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Actor handle - identifies the character an acknowledgement belongs to
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActorId(pub u64);

impl ActorId {
    pub const ZERO: ActorId = ActorId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        ActorId(id)
    }
}

impl fmt::Debug for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({:016x})", self.0)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Game object handle - target of an action or caster of a cast bar
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectId(pub u64);

impl ObjectId {
    pub const NONE: ObjectId = ObjectId(0xE000_0000);

    #[inline]
    pub fn new(id: u64) -> Self {
        ObjectId(id)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Object({:08x})", self.0)
    }
}
