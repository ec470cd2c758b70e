//! Hit damage formula.
//!
//! `damage = max(1, floor((power × multiplier − defense × 0.5) × variance))`
//!
//! Variance is drawn uniformly per hit; callers pass it in so the formula
//! itself stays deterministic.

use rand::Rng;

/// Share of the defender's defense subtracted from each hit.
pub const DEFENSE_FACTOR: f64 = 0.5;

/// Default variance band for a single hit.
pub const VARIANCE_MIN: f64 = 0.8;
pub const VARIANCE_MAX: f64 = 1.2;

/// Minimum damage of any landed hit.
pub const MIN_DAMAGE: f64 = 1.0;

/// Compute the damage of one hit.
pub fn compute_damage(power: f64, multiplier: f64, defense: f64, variance: f64) -> f64 {
    let raw = (power * multiplier - defense * DEFENSE_FACTOR) * variance;
    let floored = raw.floor();
    if floored.is_nan() {
        return MIN_DAMAGE;
    }
    floored.max(MIN_DAMAGE)
}

/// Draw a variance factor uniformly from `[min, max]`.
pub fn roll_variance(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    min + rng.gen::<f64>() * (max - min)
}
