//! Host event definitions
//!
//! Every callback the host delivers is modelled as one [`HostEvent`]
//! variant. Events are delivered serially for a given character.

use std::time::Duration;

use bytes::Bytes;

use crate::{ActionType, ActorId, ObjectId};

/// Hooks a controller subscribes to on activation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum HookKind {
    /// Local actor used an action
    UseAction = 0x01,
    /// A cast bar started
    CastBegin = 0x02,
    /// A cast bar was interrupted
    CastInterrupt = 0x03,
    /// Server confirmed an action effect
    ReceiveActionEffect = 0x04,
    /// A network message passed the client
    NetworkMessage = 0x05,
    /// Host frame update
    FrameUpdate = 0x06,
}

impl HookKind {
    /// Every hook, in subscription order
    pub const ALL: [HookKind; 6] = [
        HookKind::UseAction,
        HookKind::CastBegin,
        HookKind::CastInterrupt,
        HookKind::ReceiveActionEffect,
        HookKind::NetworkMessage,
        HookKind::FrameUpdate,
    ];
}

/// Direction of a zone network message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NetworkDirection {
    /// Client to server
    ZoneUp,
    /// Server to client
    ZoneDown,
}

/// Server confirmation of an action effect
#[derive(Clone, Debug, PartialEq)]
pub struct ServerAck {
    /// Actor the effect originates from
    pub source_actor: ActorId,
    /// Lock remaining on the live timer when the packet arrived
    pub old_lock: f32,
    /// Lock the server confirmed for the action
    pub new_lock: f32,
    /// Raw action effect header
    pub payload: Bytes,
}

/// A single host callback
#[derive(Clone, Debug, PartialEq)]
pub enum HostEvent {
    ActionSubmit {
        action_type: ActionType,
        action_id: u32,
        target: ObjectId,
    },
    CastBegin {
        object: ObjectId,
    },
    CastInterrupt {
        action_type: ActionType,
        action_id: u32,
    },
    ServerAck(ServerAck),
    OutboundPacket {
        direction: NetworkDirection,
    },
    FrameTick {
        elapsed: Duration,
    },
}

impl HostEvent {
    /// Hook that delivers this event
    pub fn hook(&self) -> HookKind {
        match self {
            HostEvent::ActionSubmit { .. } => HookKind::UseAction,
            HostEvent::CastBegin { .. } => HookKind::CastBegin,
            HostEvent::CastInterrupt { .. } => HookKind::CastInterrupt,
            HostEvent::ServerAck(_) => HookKind::ReceiveActionEffect,
            HostEvent::OutboundPacket { .. } => HookKind::NetworkMessage,
            HostEvent::FrameTick { .. } => HookKind::FrameUpdate,
        }
    }
}
