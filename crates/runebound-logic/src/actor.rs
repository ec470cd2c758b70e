//! Shared combat shape for the player and enemies.

use crate::status::{process_effects, StatusEffect, StatusTick};

/// Anything that can stand in a fight.
///
/// Hit points are floating point and clamped to `[0, max_hp]` by
/// [`Actor::set_hp`].
pub trait Actor {
    fn hp(&self) -> f64;
    fn max_hp(&self) -> f64;
    /// Store new hp; implementations clamp to `[0, max_hp]`.
    fn set_hp(&mut self, hp: f64);
    fn attack_power(&self) -> f64;
    fn magic_power(&self) -> f64;
    fn defense(&self) -> f64;
    /// Gauge fill rate in percent per second, before status modifiers.
    fn base_speed(&self) -> f64;
    fn effects(&self) -> &[StatusEffect];
    fn effects_mut(&mut self) -> &mut Vec<StatusEffect>;

    fn is_alive(&self) -> bool {
        self.hp() > 0.0
    }

    fn take_damage(&mut self, amount: f64) {
        let hp = self.hp() - amount.max(0.0);
        self.set_hp(hp);
    }

    fn heal(&mut self, amount: f64) {
        let hp = self.hp() + amount.max(0.0);
        self.set_hp(hp);
    }

    /// Run the status processor for `delta_ms`, applying damage and healing
    /// and replacing the effect list. Returns the raw tick for reporting.
    fn tick_effects(&mut self, delta_ms: f64) -> StatusTick {
        let tick = process_effects(self.effects(), delta_ms);
        *self.effects_mut() = tick.effects.clone();
        self.take_damage(tick.damage);
        if self.is_alive() {
            self.heal(tick.healing);
        }
        tick
    }
}

/// Clamp hp to the valid range for `max_hp`.
pub fn clamp_hp(hp: f64, max_hp: f64) -> f64 {
    if hp.is_nan() {
        return 0.0;
    }
    hp.min(max_hp).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{EffectSource, StatusKind};

    struct Dummy {
        hp: f64,
        effects: Vec<StatusEffect>,
    }

    impl Actor for Dummy {
        fn hp(&self) -> f64 {
            self.hp
        }
        fn max_hp(&self) -> f64 {
            50.0
        }
        fn set_hp(&mut self, hp: f64) {
            self.hp = clamp_hp(hp, 50.0);
        }
        fn attack_power(&self) -> f64 {
            1.0
        }
        fn magic_power(&self) -> f64 {
            1.0
        }
        fn defense(&self) -> f64 {
            0.0
        }
        fn base_speed(&self) -> f64 {
            10.0
        }
        fn effects(&self) -> &[StatusEffect] {
            &self.effects
        }
        fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
            &mut self.effects
        }
    }

    #[test]
    fn test_tick_effects_applies_damage() {
        let mut d = Dummy {
            hp: 20.0,
            effects: vec![StatusEffect::new(1, StatusKind::Burn, 500.0, 10.0, EffectSource::Enemy)],
        };
        d.tick_effects(1000.0);
        assert!((d.hp - 10.0).abs() < 1e-9);
        assert!(d.effects.is_empty());
    }

    #[test]
    fn test_hp_clamped() {
        let mut d = Dummy { hp: 5.0, effects: vec![] };
        d.take_damage(100.0);
        assert_eq!(d.hp, 0.0);
        assert!(!d.is_alive());
        d.set_hp(500.0);
        assert_eq!(d.hp, 50.0);
    }

    #[test]
    fn test_regen_does_not_revive() {
        let mut d = Dummy {
            hp: 1.0,
            effects: vec![
                StatusEffect::new(1, StatusKind::Poison, 1000.0, 10.0, EffectSource::Enemy),
                StatusEffect::new(2, StatusKind::Regen, 1000.0, 10.0, EffectSource::Player),
            ],
        };
        d.tick_effects(1000.0);
        assert_eq!(d.hp, 0.0);
    }
}
