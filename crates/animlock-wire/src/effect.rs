//! Action effect header
//!
//! Layout of the consumed prefix (little endian):
//! - Bytes 0x00-0x07: Animation target id
//! - Bytes 0x08-0x0B: Action id (u32)
//! - Bytes 0x0C-0x0F: Global effect counter
//! - Bytes 0x10-0x13: Animation lock (f32, seconds)
//!
//! The full header is 0x28 bytes; everything past the lock is ignored.

use animlock_core::{ActionId, AnimLockError, AnimLockResult};
use bytes::{BufMut, Bytes, BytesMut};

/// Offset of the action id field
pub const ACTION_ID_OFFSET: usize = 0x08;

/// Offset of the animation lock field
pub const ANIMATION_LOCK_OFFSET: usize = 0x10;

/// Bytes needed to read both fields
pub const ACK_FIELDS_LEN: usize = ANIMATION_LOCK_OFFSET + 4;

/// Size of a complete effect header
pub const EFFECT_HEADER_SIZE: usize = 0x28;

/// Fields extracted from an acknowledgement payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AckFields {
    pub action_id: ActionId,
    pub animation_lock: f32,
}

impl AckFields {
    pub fn new(action_id: ActionId, animation_lock: f32) -> Self {
        AckFields {
            action_id,
            animation_lock,
        }
    }

    /// Parse the two fields from a raw header
    pub fn parse(buf: &[u8]) -> AnimLockResult<Self> {
        if buf.len() < ACK_FIELDS_LEN {
            return Err(AnimLockError::BufferTooShort {
                expected: ACK_FIELDS_LEN,
                actual: buf.len(),
            });
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&buf[ACTION_ID_OFFSET..ACTION_ID_OFFSET + 4]);

        let mut lock = [0u8; 4];
        lock.copy_from_slice(&buf[ANIMATION_LOCK_OFFSET..ANIMATION_LOCK_OFFSET + 4]);

        Ok(AckFields {
            action_id: ActionId::from_bytes(id),
            animation_lock: f32::from_le_bytes(lock),
        })
    }

    /// Build a full zero-padded header carrying these fields
    pub fn to_header(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(EFFECT_HEADER_SIZE);
        buf.put_u64_le(0);
        buf.put_u32_le(self.action_id.0);
        buf.put_u32_le(0);
        buf.put_f32_le(self.animation_lock);
        buf.put_bytes(0, EFFECT_HEADER_SIZE - ACK_FIELDS_LEN);
        buf.freeze()
    }
}
