//! Tunables for combat and sessions.

use serde::{Deserialize, Serialize};

use runebound_logic::damage::{VARIANCE_MAX, VARIANCE_MIN};

/// Combat rules that are balancing choices rather than fixed formulas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Defense used for every enemy against player basic attacks. `None`
    /// uses the enemy's own defense.
    pub enemy_defense_override: Option<f64>,
    /// Skill hits skip the enemy's defense entirely.
    pub skills_ignore_defense: bool,
    /// Mana restored by a self-target utility skill.
    pub self_cast_mana_restore: f64,
    pub variance_min: f64,
    pub variance_max: f64,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            enemy_defense_override: Some(5.0),
            skills_ignore_defense: true,
            self_cast_mana_restore: 15.0,
            variance_min: VARIANCE_MIN,
            variance_max: VARIANCE_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for every rng in the session; `None` draws from entropy.
    pub seed: Option<u64>,
    /// Fixed biome; `None` picks one at random.
    pub biome: Option<String>,
    /// Newest-first message log size.
    pub log_capacity: usize,
    /// Quiet time after the last change before an auto-save fires.
    pub autosave_debounce_ms: u64,
    pub combat: CombatConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            biome: None,
            log_capacity: 50,
            autosave_debounce_ms: 2_000,
            combat: CombatConfig::default(),
        }
    }
}

impl SessionConfig {
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }
}
