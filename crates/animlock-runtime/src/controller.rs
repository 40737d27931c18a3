//! Correction controller - per-character animation lock state machine
//!
//! Each action moves through `Idle -> Submitted -> Acknowledged`:
//! - On submit the learned lock (plus the simulated RTT) replaces the client
//!   default on the live timer.
//! - On acknowledgement the measured RTT feeds the delay estimate and the
//!   live timer is corrected to the server's lock plus a variation term.
//!
//! INVARIANT: the live timer is only written on submit while it still holds
//! the unmodified client default, so two in-flight corrections never race.

use std::any::Any;
use std::fmt::Write as _;
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use animlock_core::{
    is_quantized_lock, lock_ms, ActionType, AnimLockError, AnimLockResult, Configuration,
    HostEvent, NetworkDirection, ObjectId, ServerAck, CONGESTED_WEIGHT,
    CONGESTION_PACKET_THRESHOLD, MAX_APPLIED_LOCK, MIN_AVERAGE_DELAY, SIMULATED_RTT,
    UNCONGESTED_WEIGHT,
};
use animlock_store::{ActionLockDatabase, LockPersister};
use animlock_time::{DelayEstimate, PacketWindow};
use tracing::{debug, error, info, warn};

use crate::{
    AckOutcome, CastTracker, CorrectionReport, EventDispatcher, EventOutcome, GameState,
    SubmitOutcome, SubscriptionId,
};

/// User-settable switches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompensationFlags {
    /// Master switch
    pub enabled: bool,
    /// Per-acknowledgement diagnostic line
    pub logging: bool,
    /// Compute corrections without writing the live timer
    pub dry_run: bool,
}

impl Default for CompensationFlags {
    fn default() -> Self {
        CompensationFlags::from(&Configuration::default())
    }
}

impl From<&Configuration> for CompensationFlags {
    fn from(config: &Configuration) -> Self {
        CompensationFlags {
            enabled: config.enable_compensation,
            logging: config.enable_logging,
            dry_run: config.enable_dry_run,
        }
    }
}

/// Transient per-character request state
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RequestState {
    /// Cast bar flag
    pub cast: CastTracker,
    /// Packets in the trailing window when the last action was submitted
    pub packets_sent: u32,
}

/// Animation lock correction controller
#[derive(Debug)]
pub struct CorrectionController {
    flags: CompensationFlags,
    database: ActionLockDatabase,
    packets: PacketWindow,
    delay: DelayEstimate,
    request: RequestState,
    /// Latched once a quantized server lock is seen
    anticheat: bool,
    subscriptions: Vec<SubscriptionId>,
}

impl CorrectionController {
    /// Build from loaded settings; the lock map moves into the database
    pub fn new(config: Configuration, persister: impl LockPersister + 'static) -> Self {
        let flags = CompensationFlags::from(&config);
        let database = ActionLockDatabase::from_map(config.animation_locks, persister);
        Self::with_database(flags, database)
    }

    /// Build around an existing database
    pub fn with_database(flags: CompensationFlags, database: ActionLockDatabase) -> Self {
        CorrectionController {
            flags,
            database,
            packets: PacketWindow::new(),
            delay: DelayEstimate::new(),
            request: RequestState::default(),
            anticheat: false,
            subscriptions: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Subscribe to every host hook
    /// Returns false if already active or compensation is disabled
    pub fn activate(&mut self, dispatcher: &mut dyn EventDispatcher) -> bool {
        if self.is_active() || !self.flags.enabled {
            return false;
        }

        self.reset_request_state();
        self.subscriptions = animlock_core::HookKind::ALL
            .iter()
            .map(|hook| dispatcher.subscribe(*hook))
            .collect();

        debug!(hooks = self.subscriptions.len(), "Animation lock compensation activated");
        true
    }

    /// Unsubscribe from every host hook
    /// Returns false if not active
    pub fn deactivate(&mut self, dispatcher: &mut dyn EventDispatcher) -> bool {
        if !self.is_active() {
            return false;
        }

        for id in self.subscriptions.drain(..) {
            dispatcher.unsubscribe(id);
        }
        self.reset_request_state();

        debug!("Animation lock compensation deactivated");
        true
    }

    pub fn is_active(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    fn reset_request_state(&mut self) {
        self.request = RequestState::default();
        self.packets.reset();
    }

    // ------------------------------------------------------------------
    // Configuration
    // ------------------------------------------------------------------

    pub fn flags(&self) -> CompensationFlags {
        self.flags
    }

    /// Toggle the master switch, (de)activating accordingly
    pub fn set_enabled(&mut self, enabled: bool, dispatcher: &mut dyn EventDispatcher) {
        self.flags.enabled = enabled;
        if enabled {
            self.activate(dispatcher);
        } else {
            self.deactivate(dispatcher);
        }
    }

    pub fn set_logging(&mut self, logging: bool) {
        self.flags.logging = logging;
    }

    /// Change the dry-run setting; this also clears the anomaly latch
    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.flags.dry_run = dry_run;
        self.anticheat = false;
    }

    /// Whether corrections are currently computed without being applied
    pub fn is_dry_run(&self) -> bool {
        self.anticheat || self.flags.dry_run
    }

    /// Whether a quantized server lock has been seen
    pub fn anticheat_detected(&self) -> bool {
        self.anticheat
    }

    /// Current settings, including the learned locks, for saving
    pub fn configuration(&self) -> Configuration {
        Configuration {
            enable_compensation: self.flags.enabled,
            enable_logging: self.flags.logging,
            enable_dry_run: self.flags.dry_run,
            animation_locks: self.database.snapshot(),
        }
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    pub fn database(&self) -> &ActionLockDatabase {
        &self.database
    }

    pub fn delay_estimate(&self) -> Option<f32> {
        self.delay.value()
    }

    pub fn packet_window(&self) -> &PacketWindow {
        &self.packets
    }

    pub fn request_state(&self) -> RequestState {
        self.request
    }

    // ------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------

    /// Route one host event to its handler
    pub fn dispatch<G>(&mut self, game: &mut G, event: HostEvent) -> EventOutcome
    where
        G: GameState + ?Sized,
    {
        if !self.is_active() {
            return EventOutcome::Inactive;
        }

        match event {
            HostEvent::ActionSubmit {
                action_type,
                action_id,
                target,
            } => EventOutcome::Submit(self.handle_submit(game, action_type, action_id, target)),
            HostEvent::CastBegin { object } => {
                self.handle_cast_begin(object);
                EventOutcome::Handled
            }
            HostEvent::CastInterrupt {
                action_type,
                action_id,
            } => {
                self.handle_cast_interrupt(action_type, action_id);
                EventOutcome::Handled
            }
            HostEvent::ServerAck(ack) => EventOutcome::Ack(self.handle_ack(game, &ack)),
            HostEvent::OutboundPacket { direction } => {
                self.handle_outbound_packet(direction);
                EventOutcome::Handled
            }
            HostEvent::FrameTick { elapsed } => {
                self.handle_frame_tick(elapsed);
                EventOutcome::Handled
            }
        }
    }

    /// The local actor used an action
    pub fn handle_submit<G>(
        &mut self,
        game: &mut G,
        action_type: ActionType,
        action_id: u32,
        _target: ObjectId,
    ) -> SubmitOutcome
    where
        G: GameState + ?Sized,
    {
        if !self.is_active() {
            return SubmitOutcome::Skipped;
        }

        self.request.packets_sent = self.packets.sample_total();

        if game.current_lock() != game.default_lock() {
            return SubmitOutcome::Skipped;
        }

        let id = game.resolve_action_id(action_type, action_id);
        let lock = self.database.lookup_with_default(id, game.default_lock());
        let dry_run = self.is_dry_run();
        if !dry_run {
            game.set_current_lock(lock);
        }

        debug!(
            action_id = %id,
            packets = self.request.packets_sent,
            "Applying {} ms animation lock for {} {} ({})",
            lock_ms(lock),
            action_type,
            action_id,
            id
        );

        if dry_run {
            SubmitOutcome::DryRun { action_id: id, lock }
        } else {
            SubmitOutcome::Applied { action_id: id, lock }
        }
    }

    pub fn handle_cast_begin(&mut self, _object: ObjectId) {
        if self.is_active() {
            self.request.cast.begin();
        }
    }

    pub fn handle_cast_interrupt(&mut self, _action_type: ActionType, _action_id: u32) {
        if self.is_active() {
            self.request.cast.interrupt();
        }
    }

    /// A network message left or reached the client; only uploads count
    pub fn handle_outbound_packet(&mut self, direction: NetworkDirection) {
        if self.is_active() && direction == NetworkDirection::ZoneUp {
            self.packets.observe();
        }
    }

    /// Host frame update
    pub fn handle_frame_tick(&mut self, elapsed: Duration) {
        if self.is_active() {
            self.packets.tick(elapsed);
        }
    }

    /// Server confirmed an action effect
    ///
    /// Errors and panics are contained here; the host only ever sees an outcome.
    pub fn handle_ack<G>(&mut self, game: &mut G, ack: &ServerAck) -> AckOutcome
    where
        G: GameState + ?Sized,
    {
        if !self.is_active() {
            return AckOutcome::Ignored;
        }

        let result = panic::catch_unwind(AssertUnwindSafe(|| self.process_ack(game, ack)));
        match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(error = %e, "Animation lock acknowledgement rejected");
                AckOutcome::Failed(e)
            }
            Err(payload) => {
                let reason = panic_reason(payload.as_ref());
                error!(reason = %reason, "Error in animation lock module");
                AckOutcome::Failed(AnimLockError::InternalFault(reason))
            }
        }
    }

    fn process_ack<G>(&mut self, game: &mut G, ack: &ServerAck) -> AnimLockResult<AckOutcome>
    where
        G: GameState + ?Sized,
    {
        let old_lock = ack.old_lock;
        let new_lock = ack.new_lock;

        if old_lock == new_lock || game.local_actor() != Some(ack.source_actor) {
            return Ok(AckOutcome::Ignored);
        }

        // Cast locks (caster tax, teleport, limit breaks) are not network corrected.
        // The old lock should be 0, but a late packet can leave some behind.
        if self.request.cast.take() {
            let lock = new_lock + old_lock;
            let applied = !self.is_dry_run();
            if applied {
                game.set_current_lock(lock);
            }
            if self.flags.logging {
                info!("Cast Lock: {} ms (+{} ms)", lock_ms(lock), lock_ms(old_lock));
            }
            return Ok(AckOutcome::CastLock { lock, applied });
        }

        let fields = game.extract_ack_fields(&ack.payload)?;
        if fields.animation_lock != new_lock {
            return Err(AnimLockError::LockMismatch {
                reported: new_lock,
                payload: fields.animation_lock,
            });
        }

        let anomaly_detected = !self.anticheat && is_quantized_lock(new_lock);
        if anomaly_detected {
            self.anticheat = true;
            warn!(
                lock_ms = lock_ms(new_lock),
                "{}",
                AnimLockError::AnomalousLock(new_lock)
            );
        }

        let action_id = fields.action_id;
        let applied_lock = self.database.lookup_with_default(action_id, game.default_lock());
        let last_recorded_lock = applied_lock - SIMULATED_RTT;

        if !self.anticheat {
            self.database.record(action_id, new_lock);
        }

        let correction = new_lock - last_recorded_lock;
        let rtt = applied_lock - old_lock;

        if rtt <= SIMULATED_RTT {
            if self.flags.logging {
                info!(
                    action_id = %action_id,
                    "RTT ({} ms) was lower than {} ms, no adjustments were made",
                    lock_ms(rtt),
                    lock_ms(SIMULATED_RTT)
                );
            }
            return Ok(AckOutcome::BelowFloor {
                action_id,
                rtt,
                anomaly_detected,
            });
        }

        let packets_sent = self.request.packets_sent;
        let weight = if packets_sent > CONGESTION_PACKET_THRESHOLD {
            CONGESTED_WEIGHT
        } else {
            UNCONGESTED_WEIGHT
        };

        let previous_average = self.delay.value();
        let new_average = self.delay.blend(rtt, weight);
        let average = previous_average
            .unwrap_or(new_average)
            .max(MIN_AVERAGE_DELAY);

        let variation_multiplier = (rtt / average).max(1.0) - 1.0;
        let network_variation = SIMULATED_RTT * variation_multiplier;

        // f32::max would turn NaN into 0 and hide it from the finiteness guard
        let raw_lock = old_lock + correction + network_variation;
        let adjusted_lock = if raw_lock.is_nan() {
            raw_lock
        } else {
            raw_lock.max(0.0)
        };

        let dry_run = self.is_dry_run();
        let report = CorrectionReport {
            action_id,
            old_lock,
            new_lock,
            last_recorded_lock,
            correction,
            rtt,
            variation_multiplier,
            adjusted_lock,
            packets_sent,
            dry_run,
            anomaly_detected,
        };

        if self.flags.logging {
            info!("{}", self.describe(&report, network_variation));
        }

        if !adjusted_lock.is_finite() || adjusted_lock >= MAX_APPLIED_LOCK {
            debug!(
                action_id = %action_id,
                adjusted_lock,
                "Corrected animation lock out of bounds, not applied"
            );
            return Ok(AckOutcome::Rejected(report));
        }

        if !dry_run {
            game.set_current_lock(adjusted_lock);
        }
        Ok(AckOutcome::Corrected(report))
    }

    fn describe(&self, report: &CorrectionReport, network_variation: f32) -> String {
        let mut line = String::new();
        if report.dry_run {
            line.push_str("[DRY] ");
        }

        let _ = write!(line, "Action: {} ", report.action_id);
        if report.correction > 0.0 {
            let _ = write!(
                line,
                "({} > {} ms)",
                lock_ms(report.last_recorded_lock),
                lock_ms(report.new_lock)
            );
        } else {
            let _ = write!(line, "({} ms)", lock_ms(report.new_lock));
        }

        let _ = write!(
            line,
            " || RTT: {} (+{:.0}%) ms",
            lock_ms(report.rtt),
            report.variation_multiplier * 100.0
        );

        if self.anticheat {
            let external = report.rtt - (report.last_recorded_lock - report.new_lock);
            let _ = write!(line, " [External: {} ms]", lock_ms(external));
        }

        let _ = write!(
            line,
            " || Lock: {} > {} ({:+}) ms || Packets: {}",
            lock_ms(report.old_lock),
            lock_ms(report.adjusted_lock),
            lock_ms(report.correction + network_variation),
            report.packets_sent
        );
        line
    }
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
