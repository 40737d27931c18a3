//! Round-trip delay estimate
//!
//! A single-pole IIR filter over RTT samples. Samples arrive once per
//! completed action, so the estimator stays deliberately simple.

/// Smoothed round-trip delay (seconds)
/// INVARIANT: once seeded, the value is > 0 for positive samples
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DelayEstimate {
    value: Option<f32>,
}

impl DelayEstimate {
    pub fn new() -> Self {
        DelayEstimate::default()
    }

    /// Current estimate, if any sample has been seen
    pub fn value(&self) -> Option<f32> {
        self.value.filter(|v| *v > 0.0)
    }

    /// Fold a sample into the estimate and return the new value
    ///
    /// The first sample seeds the estimate outright regardless of `weight`;
    /// later samples blend as `estimate * (1 - weight) + sample * weight`.
    pub fn blend(&mut self, sample: f32, weight: f32) -> f32 {
        let next = match self.value() {
            Some(estimate) => estimate * (1.0 - weight) + sample * weight,
            None => sample,
        };
        self.value = Some(next);
        next
    }
}
