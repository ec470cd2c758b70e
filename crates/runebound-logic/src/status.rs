//! Status effects and the per-tick effect processor.
//!
//! Durations are milliseconds and only ever decrease. Damage-over-time is a
//! continuous per-second rate, so the total dealt over an effect's lifetime
//! does not depend on how the elapsed time was sliced into frames.
//!
//! ```
//! use runebound_logic::status::{process_effects, StatusEffect, StatusKind, EffectSource};
//!
//! let poison = StatusEffect::new(1, StatusKind::Poison, 8000.0, 10.0, EffectSource::Player);
//! let tick = process_effects(&[poison], 500.0);
//! assert!((tick.damage - 5.0).abs() < 1e-9);
//! assert_eq!(tick.effects[0].remaining_ms, 7500.0);
//! ```

use serde::{Deserialize, Serialize};

/// Kinds of status effect. At most one of each kind is active per actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Poison,
    Burn,
    Stun,
    Slow,
    Regen,
    Weakness,
}

impl StatusKind {
    pub const ALL: [StatusKind; 6] = [
        StatusKind::Poison,
        StatusKind::Burn,
        StatusKind::Stun,
        StatusKind::Slow,
        StatusKind::Regen,
        StatusKind::Weakness,
    ];

    /// Deals damage every tick it is active.
    pub fn is_damage_over_time(self) -> bool {
        matches!(self, StatusKind::Poison | StatusKind::Burn)
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Poison => "POISON",
            StatusKind::Burn => "BURN",
            StatusKind::Stun => "STUN",
            StatusKind::Slow => "SLOW",
            StatusKind::Regen => "REGEN",
            StatusKind::Weakness => "WEAKNESS",
        }
    }
}

/// Who applied an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectSource {
    Player,
    Enemy,
}

/// A single active effect on an actor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusEffect {
    /// Identity token, unique per application
    pub id: u64,
    pub kind: StatusKind,
    /// Remaining duration in milliseconds (> 0 while in an active list)
    pub remaining_ms: f64,
    /// Damage/heal per second, or a fraction for SLOW/WEAKNESS
    pub magnitude: f64,
    pub source: EffectSource,
}

impl StatusEffect {
    pub fn new(
        id: u64,
        kind: StatusKind,
        duration_ms: f64,
        magnitude: f64,
        source: EffectSource,
    ) -> Self {
        Self {
            id,
            kind,
            remaining_ms: duration_ms,
            magnitude,
            source,
        }
    }
}

/// Output of one processor step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusTick {
    /// Decremented effects with expired ones pruned
    pub effects: Vec<StatusEffect>,
    /// POISON + BURN damage accrued this step
    pub damage: f64,
    /// REGEN healing accrued this step
    pub healing: f64,
}

/// Advance every effect by `delta_ms`.
///
/// Each POISON/BURN accrues `magnitude × delta_ms / 1000` for every effect in
/// the input list, including one that expires during this step. Damage is
/// linear in `delta_ms` for a fixed effect set. Negative deltas are treated
/// as zero.
pub fn process_effects(effects: &[StatusEffect], delta_ms: f64) -> StatusTick {
    let delta_ms = delta_ms.max(0.0);
    let mut tick = StatusTick {
        effects: Vec::with_capacity(effects.len()),
        ..Default::default()
    };

    for effect in effects {
        let accrued = effect.magnitude.max(0.0) * delta_ms / 1000.0;

        match effect.kind {
            StatusKind::Poison | StatusKind::Burn => tick.damage += accrued,
            StatusKind::Regen => tick.healing += accrued,
            _ => {}
        }

        let remaining = effect.remaining_ms - delta_ms;
        if remaining > 0.0 {
            tick.effects.push(StatusEffect {
                remaining_ms: remaining,
                ..effect.clone()
            });
        }
    }

    tick
}

/// Apply `effect`, replacing any active effect of the same kind.
pub fn apply_effect(effects: &mut Vec<StatusEffect>, effect: StatusEffect) {
    if effect.remaining_ms <= 0.0 {
        return;
    }
    effects.retain(|e| e.kind != effect.kind);
    effects.push(effect);
}

/// Find the active effect of `kind`, if any.
pub fn find_effect(effects: &[StatusEffect], kind: StatusKind) -> Option<&StatusEffect> {
    effects.iter().find(|e| e.kind == kind)
}

/// Gauge fill multiplier from active effects.
///
/// STUN forces exactly 0. Each SLOW multiplies by `1 − magnitude`.
pub fn speed_multiplier(effects: &[StatusEffect]) -> f64 {
    if effects.iter().any(|e| e.kind == StatusKind::Stun) {
        return 0.0;
    }
    effects
        .iter()
        .filter(|e| e.kind == StatusKind::Slow)
        .map(|e| (1.0 - e.magnitude).clamp(0.0, 1.0))
        .product()
}

/// Outgoing attack-power multiplier; WEAKNESS scales by `1 − magnitude`.
pub fn power_multiplier(effects: &[StatusEffect]) -> f64 {
    effects
        .iter()
        .filter(|e| e.kind == StatusKind::Weakness)
        .map(|e| (1.0 - e.magnitude).clamp(0.0, 1.0))
        .product()
}
