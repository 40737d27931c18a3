//! In-memory host for driving the controller

use std::collections::HashMap;
use std::time::Duration;

use animlock_core::{
    ActionId, ActionType, ActorId, HookKind, HostEvent, NetworkDirection, ObjectId, ServerAck,
    DEFAULT_CLIENT_ANIMATION_LOCK,
};
use animlock_runtime::{CorrectionController, EventDispatcher, EventOutcome, GameState, SubscriptionId};
use animlock_wire::AckFields;

/// Local character used by default
pub const LOCAL_ACTOR: ActorId = ActorId(0x1000_0001);

/// Simulated game client
///
/// Holds the live lock timer and the hook registry. Events reach the
/// controller only for hooks it subscribed to, like a real host.
#[derive(Debug)]
pub struct SimulatedHost {
    /// Live animation lock timer (seconds)
    lock: f32,
    /// Lock the client applies on every use
    default_lock: f32,
    local_actor: Option<ActorId>,
    /// Raw (type, id) pairs the server reports under another id
    remaps: HashMap<(ActionType, u32), ActionId>,
    subscriptions: HashMap<SubscriptionId, HookKind>,
    next_subscription: u64,
    /// Every value the controller wrote to the timer
    lock_writes: Vec<f32>,
}

impl SimulatedHost {
    /// Create a logged-in host with an idle timer
    pub fn new() -> Self {
        SimulatedHost {
            lock: 0.0,
            default_lock: DEFAULT_CLIENT_ANIMATION_LOCK,
            local_actor: Some(LOCAL_ACTOR),
            remaps: HashMap::new(),
            subscriptions: HashMap::new(),
            next_subscription: 0,
            lock_writes: Vec::new(),
        }
    }

    /// Host whose client default differs from the usual 0.5 s
    pub fn with_default_lock(mut self, default_lock: f32) -> Self {
        self.default_lock = default_lock;
        self
    }

    /// Log the character out
    pub fn logout(&mut self) {
        self.local_actor = None;
    }

    /// Report `raw` under `resolved` in acknowledgements
    pub fn remap(&mut self, action_type: ActionType, raw: u32, resolved: ActionId) {
        self.remaps.insert((action_type, raw), resolved);
    }

    /// Live timer value
    pub fn lock(&self) -> f32 {
        self.lock
    }

    /// Set the timer from the host side without recording a write
    pub fn set_lock(&mut self, lock: f32) {
        self.lock = lock;
    }

    /// Values the controller wrote to the timer, oldest first
    pub fn lock_writes(&self) -> &[f32] {
        &self.lock_writes
    }

    pub fn is_subscribed(&self, hook: HookKind) -> bool {
        self.subscriptions.values().any(|h| *h == hook)
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver an event if the controller listens for its hook
    pub fn deliver(
        &mut self,
        controller: &mut CorrectionController,
        event: HostEvent,
    ) -> Option<EventOutcome> {
        if !self.is_subscribed(event.hook()) {
            return None;
        }
        Some(controller.dispatch(self, event))
    }

    /// Use an action: the client applies its default lock, the submit hook
    /// fires, then the request goes out
    pub fn use_action(
        &mut self,
        controller: &mut CorrectionController,
        action_type: ActionType,
        action_id: u32,
    ) -> Option<EventOutcome> {
        if self.lock <= 0.0 {
            self.lock = self.default_lock;
        }
        let outcome = self.deliver(
            controller,
            HostEvent::ActionSubmit {
                action_type,
                action_id,
                target: ObjectId::NONE,
            },
        );
        self.send_packet(controller);
        outcome
    }

    /// Send one zone request unrelated to an action
    pub fn send_packet(&mut self, controller: &mut CorrectionController) {
        self.deliver(
            controller,
            HostEvent::OutboundPacket {
                direction: NetworkDirection::ZoneUp,
            },
        );
    }

    /// Receive one zone message
    pub fn receive_packet(&mut self, controller: &mut CorrectionController) {
        self.deliver(
            controller,
            HostEvent::OutboundPacket {
                direction: NetworkDirection::ZoneDown,
            },
        );
    }

    pub fn begin_cast(&mut self, controller: &mut CorrectionController) {
        self.deliver(
            controller,
            HostEvent::CastBegin {
                object: ObjectId::NONE,
            },
        );
    }

    pub fn interrupt_cast(
        &mut self,
        controller: &mut CorrectionController,
        action_type: ActionType,
        action_id: u32,
    ) {
        self.deliver(
            controller,
            HostEvent::CastInterrupt {
                action_type,
                action_id,
            },
        );
    }

    /// Run one frame: the timer counts down and the controller ticks
    pub fn frame(&mut self, controller: &mut CorrectionController, elapsed: Duration) {
        self.lock = (self.lock - elapsed.as_secs_f32()).max(0.0);
        self.deliver(controller, HostEvent::FrameTick { elapsed });
    }

    /// Run frames of at most `frame` until `total` has passed
    pub fn advance(&mut self, controller: &mut CorrectionController, total: Duration, frame: Duration) {
        let mut remaining = total;
        while !remaining.is_zero() {
            let step = remaining.min(frame);
            self.frame(controller, step);
            remaining -= step;
        }
    }

    /// Server acknowledgement for the local character
    ///
    /// `old_lock` is whatever is left on the timer.
    pub fn acknowledge(
        &mut self,
        controller: &mut CorrectionController,
        action_id: ActionId,
        new_lock: f32,
    ) -> Option<EventOutcome> {
        let ack = self.ack_for(action_id, new_lock);
        self.deliver(controller, HostEvent::ServerAck(ack))
    }

    /// Build an acknowledgement carrying the live timer as the old lock
    pub fn ack_for(&self, action_id: ActionId, new_lock: f32) -> ServerAck {
        ServerAck {
            source_actor: LOCAL_ACTOR,
            old_lock: self.lock,
            new_lock,
            payload: AckFields::new(action_id, new_lock).to_header(),
        }
    }
}

impl Default for SimulatedHost {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState for SimulatedHost {
    fn current_lock(&self) -> f32 {
        self.lock
    }

    fn set_current_lock(&mut self, lock: f32) {
        self.lock = lock;
        self.lock_writes.push(lock);
    }

    fn default_lock(&self) -> f32 {
        self.default_lock
    }

    fn local_actor(&self) -> Option<ActorId> {
        self.local_actor
    }

    fn resolve_action_id(&self, action_type: ActionType, action_id: u32) -> ActionId {
        self.remaps
            .get(&(action_type, action_id))
            .copied()
            .unwrap_or(ActionId(action_id))
    }
}

impl EventDispatcher for SimulatedHost {
    fn subscribe(&mut self, hook: HookKind) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.subscriptions.insert(id, hook);
        id
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscriptions.remove(&id);
    }
}
