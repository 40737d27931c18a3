//! Round-trip latency models
//!
//! Every profile is seeded so scenario runs are reproducible.

use std::time::Duration;

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Jitter added on top of the base round trip
#[derive(Clone, Debug)]
pub enum Jitter {
    None,
    /// Uniform in `[min_ms, max_ms)`
    Uniform { min_ms: u32, max_ms: u32 },
    /// Normal distribution (mean, stddev), clamped at zero
    Normal { mean_ms: f64, stddev_ms: f64 },
    /// Heavy tail, capped at one second
    Pareto { scale_ms: f64, shape: f64 },
}

impl Jitter {
    fn sample(&self, rng: &mut StdRng) -> Duration {
        match self {
            Jitter::None => Duration::ZERO,
            Jitter::Uniform { min_ms, max_ms } => {
                if min_ms >= max_ms {
                    return Duration::from_millis(u64::from(*min_ms));
                }
                let dist = Uniform::new(*min_ms, *max_ms);
                Duration::from_millis(u64::from(dist.sample(rng)))
            }
            Jitter::Normal { mean_ms, stddev_ms } => {
                // Box-Muller
                let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
                let u2: f64 = rng.gen();
                let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                Duration::from_micros(((mean_ms + stddev_ms * z).max(0.0) * 1000.0) as u64)
            }
            Jitter::Pareto { scale_ms, shape } => {
                let u: f64 = rng.gen_range(f64::EPSILON..1.0);
                let value = scale_ms / u.powf(1.0 / shape);
                Duration::from_micros((value.min(1000.0) * 1000.0) as u64)
            }
        }
    }
}

/// Round-trip time between an action request and its acknowledgement
#[derive(Clone, Debug)]
pub struct LatencyProfile {
    base: Duration,
    jitter: Jitter,
    rng: StdRng,
}

impl LatencyProfile {
    pub fn new(base: Duration, jitter: Jitter, seed: u64) -> Self {
        LatencyProfile {
            base,
            jitter,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Constant round trip
    pub fn fixed(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms), Jitter::None, 0)
    }

    /// Wired connection near the datacenter
    pub fn good(seed: u64) -> Self {
        Self::new(
            Duration::from_millis(30),
            Jitter::Uniform { min_ms: 0, max_ms: 10 },
            seed,
        )
    }

    /// Distant datacenter with unstable routing
    pub fn poor(seed: u64) -> Self {
        Self::new(
            Duration::from_millis(150),
            Jitter::Normal {
                mean_ms: 20.0,
                stddev_ms: 15.0,
            },
            seed,
        )
    }

    /// Congested wireless link with latency spikes
    pub fn hostile(seed: u64) -> Self {
        Self::new(
            Duration::from_millis(200),
            Jitter::Pareto {
                scale_ms: 20.0,
                shape: 1.5,
            },
            seed,
        )
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    /// Draw the next round trip
    pub fn sample(&mut self) -> Duration {
        self.base + self.jitter.sample(&mut self.rng)
    }
}
