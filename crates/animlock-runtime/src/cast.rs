//! Cast tracking
//!
//! Cast-time actions receive their lock through a separate additive rule,
//! so the controller has to know whether the acknowledgement it is looking
//! at closes a cast bar.

/// Cast bar flag for the local character
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CastTracker {
    casting: bool,
}

impl CastTracker {
    pub fn new() -> Self {
        CastTracker::default()
    }

    /// A cast bar started
    pub fn begin(&mut self) {
        self.casting = true;
    }

    /// The cast bar was interrupted
    pub fn interrupt(&mut self) {
        self.casting = false;
    }

    /// Whether a cast is in progress
    pub fn is_casting(&self) -> bool {
        self.casting
    }

    /// Consume the flag: returns whether a cast was in progress and clears it
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.casting)
    }
}
