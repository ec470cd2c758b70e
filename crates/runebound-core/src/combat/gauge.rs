use serde::{Deserialize, Serialize};

/// Gauge value at which the bound action fires.
pub const GAUGE_FULL: f64 = 100.0;

/// ATB readiness meter in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionGauge {
    value: f64,
}

impl ActionGauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_full(&self) -> bool {
        self.value >= GAUGE_FULL
    }

    /// Fill at `speed` percent per second for `delta_ms`. Never decreases.
    pub fn advance(&mut self, speed: f64, delta_ms: f64) {
        let gain = speed * delta_ms / 1000.0;
        if gain.is_finite() && gain > 0.0 {
            self.value = (self.value + gain).min(GAUGE_FULL);
        }
    }

    /// Reset to empty if full. Returns whether the action fires.
    pub fn fire(&mut self) -> bool {
        if self.is_full() {
            self.value = 0.0;
            true
        } else {
            false
        }
    }
}
