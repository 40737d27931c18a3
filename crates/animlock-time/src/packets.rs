//! Outbound packet window
//!
//! A ring of [`PACKET_BUCKETS`] counters, each covering
//! [`PACKET_BUCKET_WIDTH`] of wall-clock time. Exactly one bucket is current;
//! advancing the clock past a bucket boundary moves to the next slot and
//! zeroes it, so the ring always holds the last ~50 ms of traffic.

use std::time::Duration;

use animlock_core::{PACKET_BUCKETS, PACKET_BUCKET_WIDTH};

/// Rolling count of client-to-server packets
#[derive(Clone, Debug, Default)]
pub struct PacketWindow {
    /// Packets per bucket
    buckets: [u32; PACKET_BUCKETS],
    /// Index of the current bucket
    index: usize,
    /// Time accumulated inside the current bucket
    elapsed: Duration,
}

impl PacketWindow {
    pub fn new() -> Self {
        PacketWindow::default()
    }

    /// Advance the rolling clock by `dt`, rotating once per bucket width crossed
    /// Returns the number of rotations
    pub fn tick(&mut self, dt: Duration) -> usize {
        self.elapsed = self.elapsed.saturating_add(dt);

        let mut rotations = 0;
        while self.elapsed >= PACKET_BUCKET_WIDTH {
            self.elapsed -= PACKET_BUCKET_WIDTH;
            self.index = (self.index + 1) % PACKET_BUCKETS;
            self.buckets[self.index] = 0;
            rotations += 1;
        }
        rotations
    }

    /// Record one outbound packet in the current bucket
    pub fn observe(&mut self) {
        self.buckets[self.index] = self.buckets[self.index].saturating_add(1);
    }

    /// Packets sent in the trailing window
    pub fn sample_total(&self) -> u32 {
        self.buckets.iter().sum()
    }

    /// Index of the current bucket
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Snapshot of all buckets in ring order
    pub fn buckets(&self) -> [u32; PACKET_BUCKETS] {
        self.buckets
    }

    /// Clear all buckets and restart the clock
    pub fn reset(&mut self) {
        *self = PacketWindow::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_counts_current_bucket() {
        let mut window = PacketWindow::new();
        window.observe();
        window.observe();

        assert_eq!(window.buckets()[0], 2);
        assert_eq!(window.sample_total(), 2);
    }

    #[test]
    fn test_packet_survives_within_window() {
        let mut window = PacketWindow::new();
        window.observe();

        let rotations = window.tick(Duration::from_millis(49));

        assert_eq!(rotations, 4);
        assert_eq!(window.sample_total(), 1);
    }

    #[test]
    fn test_packet_ages_out() {
        let mut window = PacketWindow::new();
        window.observe();

        window.tick(Duration::from_millis(60));

        assert_eq!(window.sample_total(), 0);
    }

    #[test]
    fn test_partial_ticks_accumulate() {
        let mut window = PacketWindow::new();

        assert_eq!(window.tick(Duration::from_millis(6)), 0);
        assert_eq!(window.current_index(), 0);

        assert_eq!(window.tick(Duration::from_millis(6)), 1);
        assert_eq!(window.current_index(), 1);
    }

    #[test]
    fn test_stall_rotates_each_bucket() {
        let mut window = PacketWindow::new();
        for _ in 0..PACKET_BUCKETS {
            window.observe();
            window.tick(Duration::from_millis(10));
        }
        // The latest rotation wrapped back to bucket 0 and cleared it
        assert_eq!(window.current_index(), 0);
        assert_eq!(window.sample_total(), 4);

        // A long frame hitch clears everything
        window.tick(Duration::from_millis(250));
        assert_eq!(window.sample_total(), 0);
    }

    #[test]
    fn test_reset() {
        let mut window = PacketWindow::new();
        window.observe();
        window.tick(Duration::from_millis(25));
        window.reset();

        assert_eq!(window.sample_total(), 0);
        assert_eq!(window.current_index(), 0);
    }

    proptest::proptest! {
        #[test]
        fn prop_total_bounded_by_observations(
            steps in proptest::collection::vec((0u8..4, 0u64..30), 0..64)
        ) {
            let mut window = PacketWindow::new();
            let mut observed = 0u32;
            for (packets, ms) in steps {
                for _ in 0..packets {
                    window.observe();
                    observed += 1;
                }
                window.tick(Duration::from_millis(ms));
            }
            proptest::prop_assert!(window.sample_total() <= observed);
            proptest::prop_assert!(window.current_index() < PACKET_BUCKETS);
        }

        #[test]
        fn prop_full_window_clears(packets in 0u32..50, ms in 50u64..1000) {
            let mut window = PacketWindow::new();
            for _ in 0..packets {
                window.observe();
            }
            window.tick(Duration::from_millis(ms));
            proptest::prop_assert_eq!(window.sample_total(), 0);
        }
    }
}
