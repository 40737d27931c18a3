//! Scenario runner
//!
//! Plays sequences of actions through a [`SimulatedHost`] with round trips
//! drawn from a [`LatencyProfile`], and records what the controller did.

use std::time::Duration;

use animlock_core::{ActionId, ActionType};
use animlock_runtime::{
    AckOutcome, CorrectionController, EventOutcome, GameState, SubmitOutcome,
};

use crate::host::SimulatedHost;
use crate::latency::LatencyProfile;

/// Roughly 60 fps
pub const DEFAULT_FRAME: Duration = Duration::from_micros(16_667);

/// Record of one simulated action
#[derive(Debug)]
pub struct ActionResult {
    pub action_id: ActionId,
    pub rtt: Duration,
    pub submit: Option<SubmitOutcome>,
    pub ack: AckOutcome,
    /// Timer value right after the acknowledgement was handled
    pub lock_after_ack: f32,
}

impl ActionResult {
    /// Time from pressing the action until the next one may be used
    pub fn effective_lock(&self) -> f32 {
        self.rtt.as_secs_f32() + self.lock_after_ack
    }
}

/// Aggregate counts over a run
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScenarioSummary {
    pub actions: usize,
    pub corrected: usize,
    pub below_floor: usize,
    pub rejected: usize,
    pub failed: usize,
    pub cast_locks: usize,
    pub mean_effective_lock: f32,
}

/// Drives a controller through a simulated play session
pub struct Scenario {
    pub host: SimulatedHost,
    pub controller: CorrectionController,
    latency: LatencyProfile,
    frame: Duration,
    results: Vec<ActionResult>,
}

impl Scenario {
    /// Activate `controller` against a fresh host
    pub fn new(mut controller: CorrectionController, latency: LatencyProfile) -> Self {
        let mut host = SimulatedHost::new();
        controller.activate(&mut host);
        Scenario {
            host,
            controller,
            latency,
            frame: DEFAULT_FRAME,
            results: Vec::new(),
        }
    }

    pub fn with_frame(mut self, frame: Duration) -> Self {
        self.frame = frame;
        self
    }

    /// Use an instant action and wait for the server to confirm `server_lock`
    ///
    /// The timer is left running; call [`Scenario::wait_for_lock`] to let it expire.
    pub fn instant_action(&mut self, action_id: u32, server_lock: f32) -> &ActionResult {
        let submit = match self
            .host
            .use_action(&mut self.controller, ActionType::SPELL, action_id)
        {
            Some(EventOutcome::Submit(outcome)) => Some(outcome),
            _ => None,
        };

        let rtt = self.latency.sample();
        self.host.advance(&mut self.controller, rtt, self.frame);

        let resolved = self.host.resolve_action_id(ActionType::SPELL, action_id);
        let ack = self.acknowledge(resolved, server_lock);

        self.results.push(ActionResult {
            action_id: resolved,
            rtt,
            submit,
            ack,
            lock_after_ack: self.host.lock(),
        });
        &self.results[self.results.len() - 1]
    }

    /// Instant action followed by waiting out its lock
    pub fn weave(&mut self, action_id: u32, server_lock: f32) -> &ActionResult {
        self.instant_action(action_id, server_lock);
        self.wait_for_lock();
        &self.results[self.results.len() - 1]
    }

    /// Cast `action_id` for `cast_time`; the server answers with the caster tax
    pub fn cast_action(&mut self, action_id: u32, cast_time: Duration, caster_tax: f32) -> AckOutcome {
        self.host.begin_cast(&mut self.controller);
        self.host
            .use_action(&mut self.controller, ActionType::SPELL, action_id);

        let rtt = self.latency.sample();
        self.host
            .advance(&mut self.controller, cast_time + rtt, self.frame);

        let resolved = self.host.resolve_action_id(ActionType::SPELL, action_id);
        self.acknowledge(resolved, caster_tax)
    }

    /// Zone requests sent outside of actions, e.g. movement or targeting
    pub fn background_packets(&mut self, count: usize) {
        for _ in 0..count {
            self.host.send_packet(&mut self.controller);
        }
    }

    /// Let time pass
    pub fn idle(&mut self, duration: Duration) {
        self.host.advance(&mut self.controller, duration, self.frame);
    }

    /// Run frames until the timer reaches zero
    pub fn wait_for_lock(&mut self) {
        while self.host.lock() > 0.0 {
            self.host.frame(&mut self.controller, self.frame);
        }
    }

    pub fn results(&self) -> &[ActionResult] {
        &self.results
    }

    pub fn summary(&self) -> ScenarioSummary {
        let mut summary = ScenarioSummary {
            actions: self.results.len(),
            ..ScenarioSummary::default()
        };

        let mut total_lock = 0.0;
        for result in &self.results {
            total_lock += result.effective_lock();
            match result.ack {
                AckOutcome::Corrected(_) => summary.corrected += 1,
                AckOutcome::BelowFloor { .. } => summary.below_floor += 1,
                AckOutcome::Rejected(_) => summary.rejected += 1,
                AckOutcome::Failed(_) => summary.failed += 1,
                AckOutcome::CastLock { .. } => summary.cast_locks += 1,
                AckOutcome::Ignored => {}
            }
        }

        if summary.actions > 0 {
            summary.mean_effective_lock = total_lock / summary.actions as f32;
        }
        summary
    }

    fn acknowledge(&mut self, action_id: ActionId, new_lock: f32) -> AckOutcome {
        match self
            .host
            .acknowledge(&mut self.controller, action_id, new_lock)
        {
            Some(EventOutcome::Ack(outcome)) => outcome,
            _ => AckOutcome::Ignored,
        }
    }
}
