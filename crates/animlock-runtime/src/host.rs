//! Host collaborators
//!
//! All knowledge of the host's memory layout sits behind [`GameState`];
//! hook registration sits behind [`EventDispatcher`].

use std::fmt;

use animlock_core::{
    ActionId, ActionType, ActorId, AnimLockResult, HookKind, DEFAULT_CLIENT_ANIMATION_LOCK,
};
use animlock_wire::AckFields;

/// Typed access to the live game state
pub trait GameState {
    /// Lock currently on the live timer (seconds)
    fn current_lock(&self) -> f32;

    /// Overwrite the live timer
    fn set_current_lock(&mut self, lock: f32);

    /// Lock the client applies to every action before the server answers
    fn default_lock(&self) -> f32 {
        DEFAULT_CLIENT_ANIMATION_LOCK
    }

    /// Character controlled by this client, if logged in
    fn local_actor(&self) -> Option<ActorId>;

    /// Resolve a raw (type, id) pair to the id the server reports
    fn resolve_action_id(&self, action_type: ActionType, action_id: u32) -> ActionId;

    /// Read the action id and lock from an action effect header
    fn extract_ack_fields(&self, payload: &[u8]) -> AnimLockResult<AckFields> {
        AckFields::parse(payload)
    }
}

/// Handle to one hook registration
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sub({})", self.0)
    }
}

/// Hook registry provided by the host
pub trait EventDispatcher {
    /// Start delivering events of `hook` to the controller
    fn subscribe(&mut self, hook: HookKind) -> SubscriptionId;

    /// Stop delivering events for a previous subscription
    fn unsubscribe(&mut self, id: SubscriptionId);
}
