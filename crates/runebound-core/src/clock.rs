//! Time sources for the frame loop and skill cooldowns.
//!
//! Production code uses [`SystemClock`]; tests drive a [`ManualClock`] by
//! hand so every frame delta is exact.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-advanced clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: u64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Turns successive clock readings into frame deltas.
///
/// The first tick after construction or [`FrameTicker::reset`] yields 0, so
/// time spent outside combat never leaks into the next encounter.
#[derive(Debug, Clone, Default)]
pub struct FrameTicker {
    last_ms: Option<u64>,
}

impl FrameTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delta in ms since the previous tick.
    pub fn tick(&mut self, now_ms: u64) -> f64 {
        let delta = match self.last_ms {
            Some(last) => now_ms.saturating_sub(last) as f64,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        delta
    }

    pub fn reset(&mut self) {
        self.last_ms = None;
    }

    pub fn is_running(&self) -> bool {
        self.last_ms.is_some()
    }
}
