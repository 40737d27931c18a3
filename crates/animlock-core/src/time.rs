//! Lock timing primitives
//!
//! Animation locks are carried as `f32` seconds, the representation the host
//! uses for its live timer. The constants below are the tuned values of the
//! correction loop and must not be re-derived.

use std::time::Duration;

/// Latency the corrected lock simulates on top of the measured delay
pub const SIMULATED_RTT: f32 = 0.04;

/// Uncorrected client animation lock applied by the host on every action
pub const DEFAULT_CLIENT_ANIMATION_LOCK: f32 = 0.5;

/// Stored locks below this value count as "unset"
pub const UNSET_LOCK_THRESHOLD: f32 = 0.5;

/// Number of buckets in the outbound packet window
pub const PACKET_BUCKETS: usize = 5;

/// Width of one packet window bucket
pub const PACKET_BUCKET_WIDTH: Duration = Duration::from_millis(10);

/// Estimator weight while more than one packet is in flight
pub const CONGESTED_WEIGHT: f32 = 0.1;

/// Estimator weight for an uncongested sample
pub const UNCONGESTED_WEIGHT: f32 = 1.0;

/// Packets in the trailing window above which a sample counts as congested
pub const CONGESTION_PACKET_THRESHOLD: u32 = 1;

/// Floor of the running delay average used as a divisor
pub const MIN_AVERAGE_DELAY: f32 = 0.001;

/// Corrected locks at or above this value are never written
pub const MAX_APPLIED_LOCK: f32 = 10.0;

/// Inclusive band of `lock % 0.01` that marks a quantized (tampered) lock
pub const QUANTIZED_LOCK_BAND: (f32, f32) = (0.0005, 0.0095);

/// Convert a lock in seconds to whole milliseconds for display
#[inline]
pub fn lock_ms(secs: f32) -> i64 {
    (f64::from(secs) * 1000.0).round() as i64
}

/// Check whether a server lock carries the sub-centisecond residue left by
/// external latency tools
#[inline]
pub fn is_quantized_lock(lock: f32) -> bool {
    let residue = f64::from(lock) % 0.01;
    let (low, high) = QUANTIZED_LOCK_BAND;
    residue >= f64::from(low) && residue <= f64::from(high)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_ms_rounds() {
        assert_eq!(lock_ms(0.5), 500);
        assert_eq!(lock_ms(0.04), 40);
        assert_eq!(lock_ms(0.6004), 600);
        assert_eq!(lock_ms(-0.012), -12);
    }

    #[test]
    fn test_server_locks_are_not_quantized() {
        // Server locks are whole centiseconds; only float noise remains
        for lock in [0.6_f32, 0.5, 0.1, 1.0, 2.5, 0.35, 0.64] {
            assert!(!is_quantized_lock(lock), "{lock} flagged");
        }
    }

    #[test]
    fn test_tampered_locks_are_quantized() {
        for lock in [0.6055_f32, 0.501, 0.4991, 0.5345] {
            assert!(is_quantized_lock(lock), "{lock} not flagged");
        }
    }

    #[test]
    fn test_bucket_geometry() {
        assert_eq!(PACKET_BUCKET_WIDTH * PACKET_BUCKETS as u32, Duration::from_millis(50));
    }

    proptest::proptest! {
        #[test]
        fn prop_centisecond_locks_never_flagged(centis in 0u32..1000) {
            let lock = centis as f32 / 100.0;
            proptest::prop_assert!(!is_quantized_lock(lock));
        }
    }
}
