#![no_main]

use std::time::Duration;

use animlock_core::{
    ActionId, ActionType, ActorId, AnimLockResult, Configuration, HookKind, HostEvent,
    NetworkDirection, ObjectId, ServerAck,
};
use animlock_runtime::{CorrectionController, EventDispatcher, GameState, SubscriptionId};
use animlock_store::NullPersister;
use animlock_wire::AckFields;
use arbitrary::Arbitrary;
use bytes::Bytes;
use libfuzzer_sys::fuzz_target;

const LOCAL: ActorId = ActorId(1);

#[derive(Arbitrary, Debug)]
enum Step {
    Submit { action_id: u16 },
    CastBegin,
    CastInterrupt,
    Ack { action_id: u16, old_lock: f32, new_lock: f32, foreign: bool, raw: Option<Vec<u8>> },
    Packet { up: bool },
    Frame { micros: u32 },
    ToggleDryRun,
}

struct Game {
    lock: f32,
}

impl GameState for Game {
    fn current_lock(&self) -> f32 {
        self.lock
    }

    fn set_current_lock(&mut self, lock: f32) {
        self.lock = lock;
    }

    fn local_actor(&self) -> Option<ActorId> {
        Some(LOCAL)
    }

    fn resolve_action_id(&self, _action_type: ActionType, action_id: u32) -> ActionId {
        ActionId(action_id)
    }

    fn extract_ack_fields(&self, payload: &[u8]) -> AnimLockResult<AckFields> {
        AckFields::parse(payload)
    }
}

struct Dispatcher(u64);

impl EventDispatcher for Dispatcher {
    fn subscribe(&mut self, _hook: HookKind) -> SubscriptionId {
        self.0 += 1;
        SubscriptionId(self.0)
    }

    fn unsubscribe(&mut self, _id: SubscriptionId) {}
}

fuzz_target!(|steps: Vec<Step>| {
    let mut game = Game { lock: 0.5 };
    let mut controller = CorrectionController::new(Configuration::default(), NullPersister);
    controller.activate(&mut Dispatcher(0));
    let mut dry_run = false;

    for step in steps {
        let event = match step {
            Step::Submit { action_id } => HostEvent::ActionSubmit {
                action_type: ActionType::SPELL,
                action_id: u32::from(action_id),
                target: ObjectId::NONE,
            },
            Step::CastBegin => HostEvent::CastBegin {
                object: ObjectId::NONE,
            },
            Step::CastInterrupt => HostEvent::CastInterrupt {
                action_type: ActionType::SPELL,
                action_id: 0,
            },
            Step::Ack { action_id, old_lock, new_lock, foreign, raw } => {
                let payload = match raw {
                    Some(raw) => Bytes::from(raw),
                    None => AckFields::new(ActionId(u32::from(action_id)), new_lock).to_header(),
                };
                HostEvent::ServerAck(ServerAck {
                    source_actor: if foreign { ActorId(2) } else { LOCAL },
                    old_lock,
                    new_lock,
                    payload,
                })
            }
            Step::Packet { up } => HostEvent::OutboundPacket {
                direction: if up { NetworkDirection::ZoneUp } else { NetworkDirection::ZoneDown },
            },
            Step::Frame { micros } => HostEvent::FrameTick {
                elapsed: Duration::from_micros(u64::from(micros)),
            },
            Step::ToggleDryRun => {
                dry_run = !dry_run;
                controller.set_dry_run(dry_run);
                continue;
            }
        };

        controller.dispatch(&mut game, event);

        if controller.anticheat_detected() {
            assert!(controller.is_dry_run());
        }
    }

    for lock in controller.database().snapshot().values() {
        assert!(lock.is_finite() && *lock >= 0.0);
    }
});
