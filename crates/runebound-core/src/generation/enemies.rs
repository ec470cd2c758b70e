//! Enemy generation

use rand::Rng;

use super::vocab::{pick, ENEMY_PREFIXES, ENEMY_SPECIES};
use crate::components::Enemy;

/// Slowest an enemy gauge may fill, percent per second.
pub const MIN_ENEMY_SPEED: f64 = 5.0;

/// Roll an enemy for `biome` at `depth`.
///
/// hp and attack grow linearly with depth; speed grows linearly with a
/// ±2 jitter and never drops below [`MIN_ENEMY_SPEED`].
pub fn generate_enemy(rng: &mut impl Rng, biome: &str, depth: u32) -> Enemy {
    let name = format!(
        "{} {}",
        pick(rng, ENEMY_PREFIXES),
        pick(rng, ENEMY_SPECIES)
    );
    let d = depth as f64;
    let hp = 40.0 + 15.0 * d;
    let base_speed = 8.0 + 0.8 * d;
    let jitter = rng.gen::<f64>() * 4.0 - 2.0;
    let speed = (base_speed + jitter).floor().max(MIN_ENEMY_SPEED);

    Enemy {
        name,
        biome: biome.to_string(),
        hp,
        max_hp: hp,
        attack: 8 + 3 * depth as i32,
        defense: 2 + depth as i32,
        speed,
        reward_xp: 30 + 10 * depth,
        reward_gold: 15 + 5 * depth,
        status_effects: Vec::new(),
    }
}
