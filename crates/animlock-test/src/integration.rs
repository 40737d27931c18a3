//! End-to-end behaviour of the correction loop against the simulated host

use std::time::Duration;

use animlock_core::{
    ActionId, ActionType, AnimLockError, Configuration, HostEvent, SIMULATED_RTT,
};
use animlock_runtime::{AckOutcome, CorrectionController, EventOutcome, SubmitOutcome};
use animlock_store::{
    ActionLockDatabase, BackgroundPersister, JsonFilePersister, MemoryPersister, NullPersister,
};
use animlock_time::{DelayEstimate, PacketWindow};
use animlock_wire::AckFields;
use proptest::prelude::*;

use crate::{LatencyProfile, Scenario, SimulatedHost};

fn active(persister: MemoryPersister) -> (SimulatedHost, CorrectionController) {
    let mut host = SimulatedHost::new();
    let mut controller = CorrectionController::new(Configuration::default(), persister);
    assert!(controller.activate(&mut host));
    (host, controller)
}

fn ack_outcome(outcome: Option<EventOutcome>) -> AckOutcome {
    match outcome {
        Some(EventOutcome::Ack(ack)) => ack,
        other => panic!("expected an acknowledgement outcome, got {other:?}"),
    }
}

#[test]
fn test_unknown_action_gets_default() {
    let db = ActionLockDatabase::new(NullPersister);
    for id in [0, 7, 3577, u32::MAX] {
        assert_eq!(db.lookup(ActionId(id)), 0.5 + SIMULATED_RTT);
    }
}

#[test]
fn test_packet_window_rotation() {
    let mut window = PacketWindow::new();
    window.observe();
    window.tick(Duration::from_millis(49));
    assert_eq!(window.sample_total(), 1);

    let mut window = PacketWindow::new();
    window.observe();
    window.tick(Duration::from_millis(60));
    assert_eq!(window.sample_total(), 0);
}

#[test]
fn test_estimator_seed_and_full_weight() {
    let mut estimate = DelayEstimate::new();
    assert_eq!(estimate.blend(0.09, 0.1), 0.09);
    assert_eq!(estimate.blend(0.2, 1.0), 0.2);
}

#[test]
fn test_noop_acknowledgement_is_idempotent() {
    let persister = MemoryPersister::new();
    let (mut host, mut controller) = active(persister.clone());
    host.set_lock(0.3);

    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.3));

    assert!(matches!(outcome, AckOutcome::Ignored));
    assert_eq!(host.lock(), 0.3);
    assert!(host.lock_writes().is_empty());
    assert!(controller.database().is_empty());
    assert!(persister.writes().is_empty());
    assert_eq!(controller.delay_estimate(), None);
}

#[test]
fn test_low_rtt_keeps_old_lock() {
    let (mut host, mut controller) = active(MemoryPersister::new());

    host.use_action(&mut controller, ActionType::SPELL, 7);
    host.advance(&mut controller, Duration::from_millis(20), Duration::from_millis(10));
    let old_lock = host.lock();

    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.6));

    assert!(matches!(outcome, AckOutcome::BelowFloor { .. }));
    assert_eq!(host.lock(), old_lock);
    assert_eq!(controller.delay_estimate(), None);
}

#[test]
fn test_cast_branch_returns_early() {
    let persister = MemoryPersister::new();
    let (mut host, mut controller) = active(persister.clone());

    host.begin_cast(&mut controller);
    host.set_lock(0.0);
    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.6));

    assert!(matches!(outcome, AckOutcome::CastLock { lock, .. } if lock == 0.6));
    assert_eq!(host.lock(), 0.6);
    assert!(!controller.request_state().cast.is_casting());
    assert!(controller.database().is_empty());
    assert!(persister.writes().is_empty());
    assert_eq!(controller.delay_estimate(), None);
}

#[test]
fn test_first_action_scenario() {
    let persister = MemoryPersister::new();
    let (mut host, mut controller) = active(persister.clone());

    let submit = host.use_action(&mut controller, ActionType::SPELL, 7);
    assert!(matches!(
        submit,
        Some(EventOutcome::Submit(SubmitOutcome::Applied { lock, .. })) if lock == 0.5 + SIMULATED_RTT
    ));

    // Server confirms 0.59 s after 90 ms
    host.set_lock(0.45);
    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.59));

    assert!(matches!(outcome, AckOutcome::Corrected(_)));
    assert!((controller.delay_estimate().unwrap() - 0.09).abs() < 1e-6);
    assert_eq!(controller.database().get(ActionId(7)), Some(0.59));
    assert_eq!(persister.latest().unwrap().get(&7), Some(&0.59));
    assert!(host.lock().is_finite());
    assert!(host.lock() >= 0.0 && host.lock() < 10.0);
    assert!((host.lock() - 0.54).abs() < 1e-5);
}

#[test]
fn test_quantized_lock_latches_once() {
    let persister = MemoryPersister::new();
    let (mut host, mut controller) = active(persister.clone());

    host.use_action(&mut controller, ActionType::SPELL, 7);
    host.set_lock(0.45);
    host.acknowledge(&mut controller, ActionId(7), 0.6055);
    assert!(controller.anticheat_detected());
    assert!(controller.is_dry_run());

    for (id, lock) in [(8, 0.6), (9, 0.6045), (10, 1.2)] {
        host.set_lock(0.0);
        host.use_action(&mut controller, ActionType::SPELL, id);
        host.set_lock(0.4);
        host.acknowledge(&mut controller, ActionId(id), lock);
    }

    assert!(controller.anticheat_detected());
    assert!(controller.database().is_empty());
    assert!(persister.writes().is_empty());
}

#[test]
fn test_dry_run_never_touches_timer() {
    let mut config = Configuration::default();
    config.enable_dry_run = true;
    let mut scenario = Scenario::new(
        CorrectionController::new(config, NullPersister),
        LatencyProfile::good(9),
    );

    for _ in 0..10 {
        scenario.weave(7, 0.6);
    }

    assert!(scenario.host.lock_writes().is_empty());
    // Still learns the confirmed lock
    assert_eq!(scenario.controller.database().get(ActionId(7)), Some(0.6));
    assert!(scenario
        .results()
        .iter()
        .all(|r| matches!(r.submit, Some(SubmitOutcome::DryRun { .. }))));
}

#[test]
fn test_logged_out_host_is_ignored() {
    let (mut host, mut controller) = active(MemoryPersister::new());
    host.logout();
    host.set_lock(0.4);

    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.6));
    assert!(matches!(outcome, AckOutcome::Ignored));
    assert_eq!(host.lock(), 0.4);
}

#[test]
fn test_mismatched_payload_aborts_event() {
    let persister = MemoryPersister::new();
    let (mut host, mut controller) = active(persister.clone());
    host.set_lock(0.45);

    let mut ack = host.ack_for(ActionId(7), 0.6);
    ack.payload = AckFields::new(ActionId(7), 0.65).to_header();
    let outcome = ack_outcome(host.deliver(&mut controller, HostEvent::ServerAck(ack)));

    assert!(matches!(
        outcome,
        AckOutcome::Failed(AnimLockError::LockMismatch { .. })
    ));
    assert_eq!(host.lock(), 0.45);
    assert!(persister.writes().is_empty());

    // Next event is processed normally
    host.set_lock(0.45);
    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.6));
    assert!(outcome.report().is_some());
}

#[test]
fn test_congestion_damps_estimate() {
    let mut scenario = Scenario::new(
        CorrectionController::new(Configuration::default(), NullPersister),
        LatencyProfile::fixed(90),
    );
    scenario.weave(7, 0.6);
    let seeded = scenario.controller.delay_estimate().unwrap();

    // A burst of requests right before the action
    scenario.background_packets(4);
    let result = scenario.instant_action(7, 0.6);
    let report = *result.ack.report().unwrap();

    // The action's own request goes out after the count is taken
    assert_eq!(report.packets_sent, 4);
    let expected = seeded * 0.9 + report.rtt * 0.1;
    assert!((scenario.controller.delay_estimate().unwrap() - expected).abs() < 1e-6);
}

#[test]
fn test_single_background_packet_is_uncongested() {
    let mut scenario = Scenario::new(
        CorrectionController::new(Configuration::default(), NullPersister),
        LatencyProfile::fixed(90),
    );
    scenario.weave(7, 0.6);
    scenario.idle(Duration::from_millis(100));

    scenario.background_packets(1);
    let result = scenario.instant_action(7, 0.6);
    let report = *result.ack.report().unwrap();

    assert_eq!(report.packets_sent, 1);
    // Full weight: the estimate is replaced by the new sample
    assert_eq!(scenario.controller.delay_estimate(), Some(report.rtt));
}

#[test]
fn test_host_default_lock_drives_lookup() {
    let mut host = SimulatedHost::new().with_default_lock(0.6);
    let mut controller = CorrectionController::new(Configuration::default(), NullPersister);
    controller.activate(&mut host);

    let submit = host.use_action(&mut controller, ActionType::SPELL, 7);
    assert!(matches!(
        submit,
        Some(EventOutcome::Submit(SubmitOutcome::Applied { lock, .. })) if lock == 0.6 + SIMULATED_RTT
    ));
    assert_eq!(host.lock(), 0.6 + SIMULATED_RTT);

    // 90 ms later the server confirms the same default
    host.set_lock(0.55);
    let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(7), 0.7));
    let report = *outcome.report().unwrap();
    assert!((report.last_recorded_lock - 0.6).abs() < 1e-6);
    assert!((report.rtt - 0.09).abs() < 1e-5);
    assert!((report.correction - 0.1).abs() < 1e-5);
}

#[test]
fn test_anomaly_surfaces_in_outcome() {
    let (mut host, mut controller) = active(MemoryPersister::new());

    let mut flagged = Vec::new();
    for (id, lock) in [(7, 0.6055), (8, 0.6045), (9, 0.6)] {
        host.set_lock(0.0);
        host.use_action(&mut controller, ActionType::SPELL, id);
        host.set_lock(0.45);
        let outcome = ack_outcome(host.acknowledge(&mut controller, ActionId(id), lock));
        flagged.push(outcome.anomaly_detected());
    }

    assert_eq!(flagged, vec![true, false, false]);
}

#[tokio::test]
async fn test_background_persistence_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("animlock.json");

    let persister =
        BackgroundPersister::spawn(&tokio::runtime::Handle::current(), JsonFilePersister::new(&path));
    let mut scenario = Scenario::new(
        CorrectionController::new(Configuration::default(), persister),
        LatencyProfile::fixed(90),
    );
    scenario.weave(7, 0.6);
    scenario.weave(16, 0.75);
    drop(scenario);

    let mut saved = Configuration::default();
    for _ in 0..200 {
        tokio::time::sleep(Duration::from_millis(10)).await;
        saved = Configuration::load(&path).unwrap();
        if saved.animation_locks.len() == 2 {
            break;
        }
    }
    assert_eq!(saved.animation_locks.get(&7), Some(&0.6));
    assert_eq!(saved.animation_locks.get(&16), Some(&0.75));

    // A restarted controller applies what it learned
    let mut host = SimulatedHost::new();
    let mut controller = CorrectionController::new(saved, NullPersister);
    controller.activate(&mut host);
    let submit = host.use_action(&mut controller, ActionType::SPELL, 16);
    assert!(matches!(
        submit,
        Some(EventOutcome::Submit(SubmitOutcome::Applied { lock, .. })) if lock == 0.75 + SIMULATED_RTT
    ));
}

proptest! {
    #[test]
    fn prop_record_then_lookup(id in any::<u32>(), lock in 0.5f32..5.0) {
        let mut db = ActionLockDatabase::new(NullPersister);
        db.record(ActionId(id), lock);
        prop_assert_eq!(db.lookup(ActionId(id)), lock + SIMULATED_RTT);
    }

    #[test]
    fn prop_applied_lock_stays_bounded(seed in any::<u64>(), server_lock in 0.3f32..2.5) {
        let mut scenario = Scenario::new(
            CorrectionController::new(Configuration::default(), NullPersister),
            LatencyProfile::poor(seed),
        );
        for _ in 0..8 {
            scenario.weave(7, server_lock);
        }
        for result in scenario.results() {
            prop_assert!(result.lock_after_ack.is_finite());
            prop_assert!(result.lock_after_ack >= 0.0);
            prop_assert!(result.lock_after_ack < 10.0);
        }
    }
}
