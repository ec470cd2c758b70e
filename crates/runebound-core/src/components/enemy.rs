use runebound_logic::actor::{clamp_hp, Actor};
use runebound_logic::status::StatusEffect;
use serde::{Deserialize, Serialize};

/// A generated opponent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub name: String,
    pub biome: String,
    pub hp: f64,
    pub max_hp: f64,
    pub attack: i32,
    pub defense: i32,
    /// Gauge fill rate, percent per second
    pub speed: f64,
    pub reward_xp: u32,
    pub reward_gold: u32,
    pub status_effects: Vec<StatusEffect>,
}

impl Actor for Enemy {
    fn hp(&self) -> f64 {
        self.hp
    }

    fn max_hp(&self) -> f64 {
        self.max_hp
    }

    fn set_hp(&mut self, hp: f64) {
        self.hp = clamp_hp(hp, self.max_hp);
    }

    fn attack_power(&self) -> f64 {
        self.attack as f64
    }

    fn magic_power(&self) -> f64 {
        self.attack as f64
    }

    fn defense(&self) -> f64 {
        self.defense as f64
    }

    fn base_speed(&self) -> f64 {
        self.speed
    }

    fn effects(&self) -> &[StatusEffect] {
        &self.status_effects
    }

    fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
        &mut self.status_effects
    }
}
