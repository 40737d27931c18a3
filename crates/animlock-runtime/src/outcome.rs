//! Observable results of event handling

use animlock_core::{ActionId, AnimLockError};

/// Result of an action submission
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Provisional lock written to the live timer
    Applied { action_id: ActionId, lock: f32 },
    /// Provisional lock computed but not written
    DryRun { action_id: ActionId, lock: f32 },
    /// Live timer already adjusted, or controller inactive
    Skipped,
}

/// Values computed for one instant-action acknowledgement
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CorrectionReport {
    pub action_id: ActionId,
    pub old_lock: f32,
    pub new_lock: f32,
    /// Stored lock before this acknowledgement (without simulated RTT)
    pub last_recorded_lock: f32,
    /// Difference between the confirmed and the recorded lock
    pub correction: f32,
    pub rtt: f32,
    /// How far this RTT exceeds the running average, as a ratio >= 0
    pub variation_multiplier: f32,
    pub adjusted_lock: f32,
    pub packets_sent: u32,
    /// Computed without writing the live timer
    pub dry_run: bool,
    /// This acknowledgement tripped the anomaly latch
    pub anomaly_detected: bool,
}

impl CorrectionReport {
    /// Extra lock added for network variation
    pub fn network_variation(&self) -> f32 {
        self.adjusted_lock - self.old_lock - self.correction
    }
}

/// Result of a server acknowledgement
#[derive(Debug)]
pub enum AckOutcome {
    /// No-op acknowledgement, foreign actor, or controller inactive
    Ignored,
    /// Cast lock handled additively
    CastLock { lock: f32, applied: bool },
    /// RTT at or below the simulated floor; live timer untouched
    BelowFloor {
        action_id: ActionId,
        rtt: f32,
        anomaly_detected: bool,
    },
    /// Correction computed (and written unless dry run)
    Corrected(CorrectionReport),
    /// Correction computed but not finite or above the safety ceiling
    Rejected(CorrectionReport),
    /// Processing aborted for this event
    Failed(AnimLockError),
}

impl AckOutcome {
    /// Report of the instant-action path, if it ran to completion
    pub fn report(&self) -> Option<&CorrectionReport> {
        match self {
            AckOutcome::Corrected(report) | AckOutcome::Rejected(report) => Some(report),
            _ => None,
        }
    }

    /// Whether this acknowledgement tripped the anomaly latch
    ///
    /// Only the first quantized lock reports it; later ones see the latch already set.
    pub fn anomaly_detected(&self) -> bool {
        match self {
            AckOutcome::BelowFloor {
                anomaly_detected, ..
            } => *anomaly_detected,
            AckOutcome::Corrected(report) | AckOutcome::Rejected(report) => {
                report.anomaly_detected
            }
            _ => false,
        }
    }
}

/// Result of routing one host event
#[derive(Debug)]
pub enum EventOutcome {
    /// Controller is not subscribed
    Inactive,
    Submit(SubmitOutcome),
    Ack(AckOutcome),
    /// Cast, packet and frame events
    Handled,
}
