//! Real-time ATB combat.
//!
//! One [`CombatEngine`] runs at most one encounter at a time. Each call to
//! [`CombatEngine::update`] is one frame:
//!
//! 1. Status effects tick on both actors (damage, healing, expiry)
//! 2. Deaths from status damage end the frame (player checked first)
//! 3. Effective speed = base speed × status speed multiplier
//! 4. Both gauges fill by `speed × delta / 1000`
//! 5. Full gauges fire a basic attack, player before enemy, with a death
//!    check after each hit
//! 6. A [`FrameReport`] is returned every active frame
//!
//! The player character is borrowed fresh on every call, so commands issued
//! between frames (skills, potions, equipment) are always seen by the next
//! tick. Victory and defeat are edge-triggered: the phase leaves `Active`
//! the moment an actor drops, and inactive engines ignore further frames.

mod events;
mod gauge;

pub use events::*;
pub use gauge::*;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use runebound_logic::actor::Actor;
use runebound_logic::character::Character;
use runebound_logic::damage::{compute_damage, roll_variance};
use runebound_logic::items::Item;
use runebound_logic::skills::ScalingStat;
use runebound_logic::status::{
    apply_effect, power_multiplier, speed_multiplier, EffectSource, StatusEffect, StatusTick,
};

use crate::components::Enemy;
use crate::config::CombatConfig;
use crate::generation::{LootRoller, LootSource};

/// The live state of one encounter.
#[derive(Debug, Clone)]
pub struct Battle {
    pub enemy: Enemy,
    /// Depth of the room the fight happens in (drives loot)
    pub depth: u32,
    pub player_gauge: ActionGauge,
    pub enemy_gauge: ActionGauge,
}

pub struct CombatEngine<R: Rng = StdRng> {
    config: CombatConfig,
    phase: CombatPhase,
    battle: Option<Battle>,
    rng: R,
    next_effect_id: u64,
}

impl CombatEngine<StdRng> {
    pub fn seeded(config: CombatConfig, seed: u64) -> Self {
        Self::new(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CombatEngine<R> {
    pub fn new(config: CombatConfig, rng: R) -> Self {
        Self {
            config,
            phase: CombatPhase::Idle,
            battle: None,
            rng,
            next_effect_id: 0,
        }
    }

    pub fn config(&self) -> &CombatConfig {
        &self.config
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == CombatPhase::Active
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.battle.as_ref()
    }

    pub fn enemy_mut(&mut self) -> Option<&mut Enemy> {
        self.battle.as_mut().map(|b| &mut b.enemy)
    }

    /// Start a fight. Ignored (returns `false`) unless the engine is idle.
    pub fn engage(&mut self, enemy: Enemy, depth: u32) -> bool {
        if self.phase != CombatPhase::Idle {
            return false;
        }
        info!(
            "Encounter: {} ({} hp, atk {}, speed {}) at depth {}",
            enemy.name, enemy.max_hp, enemy.attack, enemy.speed, depth
        );
        self.battle = Some(Battle {
            enemy,
            depth,
            player_gauge: ActionGauge::new(),
            enemy_gauge: ActionGauge::new(),
        });
        self.phase = CombatPhase::Active;
        true
    }

    /// Abandon an active fight. No rewards.
    pub fn flee(&mut self) -> bool {
        if self.phase != CombatPhase::Active {
            return false;
        }
        if let Some(battle) = self.battle.take() {
            info!("Fled from {}", battle.enemy.name);
        }
        self.phase = CombatPhase::Idle;
        true
    }

    /// Acknowledge a finished encounter and return to idle.
    ///
    /// Returns the terminal phase that was cleared, or `None` if no
    /// encounter had ended.
    pub fn finish(&mut self) -> Option<CombatPhase> {
        match self.phase {
            CombatPhase::PlayerDefeated | CombatPhase::EnemyDefeated => {
                let ended = self.phase;
                self.phase = CombatPhase::Idle;
                self.battle = None;
                Some(ended)
            }
            _ => None,
        }
    }

    /// Advance the encounter by `delta_ms`. Returns `None` when no encounter
    /// is active.
    pub fn update(
        &mut self,
        player: &mut Character,
        delta_ms: f64,
        loot: &mut dyn LootRoller,
    ) -> Option<FrameReport> {
        if self.phase != CombatPhase::Active {
            return None;
        }
        let battle = self.battle.as_mut()?;
        let delta = if delta_ms.is_finite() { delta_ms.max(0.0) } else { 0.0 };
        let mut events = Vec::new();

        let tick = player.tick_effects(delta);
        push_status_events(&mut events, Side::Player, &tick);
        let tick = battle.enemy.tick_effects(delta);
        push_status_events(&mut events, Side::Enemy, &tick);

        if !player.is_alive() {
            self.phase = CombatPhase::PlayerDefeated;
            events.push(defeat(player));
        } else if !battle.enemy.is_alive() {
            self.phase = CombatPhase::EnemyDefeated;
            events.push(CombatEvent::Victory(grant_victory(battle, player, loot)));
        } else {
            let player_speed = player.base_speed() * speed_multiplier(player.effects());
            let enemy_speed = battle.enemy.base_speed() * speed_multiplier(battle.enemy.effects());
            battle.player_gauge.advance(player_speed, delta);
            battle.enemy_gauge.advance(enemy_speed, delta);

            if battle.player_gauge.fire() {
                let defense = self
                    .config
                    .enemy_defense_override
                    .unwrap_or_else(|| battle.enemy.defense());
                let power = player.attack_power() * power_multiplier(player.effects());
                let variance =
                    roll_variance(&mut self.rng, self.config.variance_min, self.config.variance_max);
                let damage = compute_damage(power, 1.0, defense, variance);
                battle.enemy.take_damage(damage);
                debug!("{} hits {} for {}", player.name, battle.enemy.name, damage);
                events.push(CombatEvent::Attack {
                    attacker: Side::Player,
                    damage,
                });

                if !battle.enemy.is_alive() {
                    self.phase = CombatPhase::EnemyDefeated;
                    events.push(CombatEvent::Victory(grant_victory(battle, player, loot)));
                }
            }

            if self.phase == CombatPhase::Active && battle.enemy_gauge.fire() {
                let power =
                    battle.enemy.attack_power() * power_multiplier(battle.enemy.effects());
                let variance =
                    roll_variance(&mut self.rng, self.config.variance_min, self.config.variance_max);
                let damage = compute_damage(power, 1.0, player.defense(), variance);
                player.take_damage(damage);
                debug!("{} hits {} for {}", battle.enemy.name, player.name, damage);
                events.push(CombatEvent::Attack {
                    attacker: Side::Enemy,
                    damage,
                });

                if !player.is_alive() {
                    self.phase = CombatPhase::PlayerDefeated;
                    events.push(defeat(player));
                }
            }
        }

        Some(FrameReport {
            phase: self.phase,
            player_hp: player.hp(),
            player_max_hp: player.max_hp(),
            enemy_hp: battle.enemy.hp(),
            enemy_max_hp: battle.enemy.max_hp(),
            player_gauge: battle.player_gauge.value(),
            enemy_gauge: battle.enemy_gauge.value(),
            events,
        })
    }

    /// Cast one of the player's skills at `now_ms`.
    ///
    /// Returns `None` and changes nothing when the engine is not in an
    /// active fight, the enemy is already down, the player lacks the skill,
    /// or mana/cooldown do not allow it.
    pub fn cast_skill(
        &mut self,
        player: &mut Character,
        skill_id: &str,
        now_ms: u64,
        loot: &mut dyn LootRoller,
    ) -> Option<SkillCast> {
        if self.phase != CombatPhase::Active {
            return None;
        }
        let battle = self.battle.as_mut()?;
        if !battle.enemy.is_alive() {
            return None;
        }
        let idx = player.skills.iter().position(|s| s.id == skill_id)?;
        if !player.skills[idx].can_cast(player.mana, now_ms) {
            debug!("{} not castable at {}ms", skill_id, now_ms);
            return None;
        }

        let skill = player.skills[idx].clone();
        player.mana = (player.mana - skill.mana_cost).max(0.0);
        player.skills[idx].last_used_ms = Some(now_ms);

        if skill.is_self_cast() {
            let before = player.mana;
            player.restore_mana(self.config.self_cast_mana_restore);
            player.status_effects.clear();
            info!("{} casts {} on themself", player.name, skill.name);
            return Some(SkillCast {
                skill_id: skill.id,
                damage: 0.0,
                applied: None,
                mana_restored: player.mana - before,
                victory: None,
            });
        }

        let power = match skill.scaling {
            ScalingStat::Attack => player.attack_power(),
            ScalingStat::Magic => player.magic_power(),
        } * power_multiplier(player.effects());
        let defense = if self.config.skills_ignore_defense {
            0.0
        } else {
            self.config
                .enemy_defense_override
                .unwrap_or_else(|| battle.enemy.defense())
        };
        let variance =
            roll_variance(&mut self.rng, self.config.variance_min, self.config.variance_max);
        let damage = compute_damage(power, skill.damage_mult, defense, variance);
        battle.enemy.take_damage(damage);
        info!("{} casts {} for {}", player.name, skill.name, damage);

        let mut applied = None;
        if let Some(on_hit) = skill.on_hit {
            let chance = if on_hit.chance.is_nan() {
                0.0
            } else {
                on_hit.chance.clamp(0.0, 1.0)
            };
            if self.rng.gen_bool(chance) {
                self.next_effect_id += 1;
                apply_effect(
                    &mut battle.enemy.status_effects,
                    StatusEffect::new(
                        self.next_effect_id,
                        on_hit.kind,
                        on_hit.duration_ms,
                        on_hit.magnitude,
                        EffectSource::Player,
                    ),
                );
                applied = Some(on_hit.kind);
            }
        }

        let victory = if battle.enemy.is_alive() {
            None
        } else {
            self.phase = CombatPhase::EnemyDefeated;
            Some(grant_victory(battle, player, loot))
        };

        Some(SkillCast {
            skill_id: skill.id,
            damage,
            applied,
            mana_restored: 0.0,
            victory,
        })
    }
}

fn push_status_events(events: &mut Vec<CombatEvent>, side: Side, tick: &StatusTick) {
    if tick.damage > 0.0 {
        events.push(CombatEvent::StatusDamage {
            side,
            amount: tick.damage,
        });
    }
    if tick.healing > 0.0 {
        events.push(CombatEvent::StatusHealing {
            side,
            amount: tick.healing,
        });
    }
}

/// Put `item` in the player's inventory. An item already held under the same
/// id is replaced and logged.
pub(crate) fn stash(player: &mut Character, item: Item) {
    if let Some(displaced) = player.inventory.insert(item) {
        warn!(
            "{} lost {} ({:?}) to an item with the same id",
            player.name, displaced.name, displaced.id
        );
    }
}

/// Loot, XP (with every level-up it pays for) and gold for a kill.
fn grant_victory(battle: &Battle, player: &mut Character, loot: &mut dyn LootRoller) -> VictoryReport {
    let enemy = &battle.enemy;
    let drops = loot.roll(battle.depth, LootSource::Enemy);
    let ids = drops.iter().map(|item| item.id).collect();
    for item in drops {
        stash(player, item);
    }
    let levels_gained = player.gain_xp(enemy.reward_xp);
    player.gold = player.gold.saturating_add(enemy.reward_gold);

    info!(
        "{} vanquished: +{} xp, +{} gold",
        enemy.name, enemy.reward_xp, enemy.reward_gold
    );
    if levels_gained > 0 {
        info!("{} reached level {}", player.name, player.level);
    }

    VictoryReport {
        enemy_name: enemy.name.clone(),
        xp: enemy.reward_xp,
        gold: enemy.reward_gold,
        loot: ids,
        levels_gained,
        new_level: player.level,
    }
}

fn defeat(player: &Character) -> CombatEvent {
    info!("{} has fallen", player.name);
    CombatEvent::Defeat
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use runebound_logic::classes::PlayerClass;
    use runebound_logic::items::{ArmorWeight, ItemId, ItemType, Rarity};
    use runebound_logic::stats::StatBlock;
    use runebound_logic::status::StatusKind;

    struct NoLoot;

    impl LootRoller for NoLoot {
        fn roll(&mut self, _depth: u32, _source: LootSource) -> Vec<Item> {
            Vec::new()
        }
    }

    fn enemy(hp: f64, attack: i32, speed: f64) -> Enemy {
        Enemy {
            name: "Test Rat".into(),
            biome: "Sanguine Halls".into(),
            hp,
            max_hp: hp,
            attack,
            defense: 2,
            speed,
            reward_xp: 40,
            reward_gold: 20,
            status_effects: Vec::new(),
        }
    }

    /// Always drops a helm with id 7.
    struct SameIdLoot;

    impl LootRoller for SameIdLoot {
        fn roll(&mut self, _depth: u32, _source: LootSource) -> Vec<Item> {
            vec![Item {
                id: ItemId(7),
                name: "Dropped Helm".into(),
                item_type: ItemType::Helm,
                rarity: Rarity::Common,
                value: 10,
                description: "A common helm.".into(),
                weight: ArmorWeight::Light,
                class_restrictions: Vec::new(),
                stats: StatBlock { defense: 1, ..Default::default() },
                effect: None,
            }]
        }
    }

    // Variance always 0.8, every on-hit chance succeeds
    fn engine() -> CombatEngine<StepRng> {
        CombatEngine::new(CombatConfig::default(), StepRng::new(0, 0))
    }

    #[test]
    fn test_colliding_drop_replaces_held_item() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        let mut held = SameIdLoot.roll(1, LootSource::Enemy).remove(0);
        held.name = "Old Helm".into();
        p.inventory.insert(held);
        let before = p.inventory.len();
        e.engage(enemy(1.0, 5, 1.0), 1);

        let cast = e.cast_skill(&mut p, "strike", 0, &mut SameIdLoot).unwrap();
        let victory = cast.victory.expect("one hit kills");
        assert_eq!(victory.loot, vec![ItemId(7)]);
        assert_eq!(p.inventory.len(), before);
        assert_eq!(p.inventory.get(ItemId(7)).map(|i| i.name.as_str()), Some("Dropped Helm"));
    }

    #[test]
    fn test_stash_returns_nothing_for_new_ids() {
        let mut p = Character::new("P", PlayerClass::Warrior);
        let before = p.inventory.len();
        stash(&mut p, SameIdLoot.roll(1, LootSource::Chest).remove(0));
        assert_eq!(p.inventory.len(), before + 1);
        assert!(p.inventory.contains(ItemId(7)));
    }

    #[test]
    fn test_inactive_engine_ignores_frames() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        assert!(e.update(&mut p, 16.0, &mut NoLoot).is_none());
        assert!(e.cast_skill(&mut p, "strike", 0, &mut NoLoot).is_none());
        assert!(!e.flee());
    }

    #[test]
    fn test_gauges_fill_at_speed() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(100.0, 5, 10.0), 1);

        let report = e.update(&mut p, 1000.0, &mut NoLoot).unwrap();
        // Warrior: 8 + 10 dex × 0.5
        assert!((report.player_gauge - 13.0).abs() < 1e-9);
        assert!((report.enemy_gauge - 10.0).abs() < 1e-9);
        assert!(report.events.is_empty());
    }

    #[test]
    fn test_stun_freezes_gauge() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(100.0, 5, 20.0), 1);
        apply_effect(
            &mut e.enemy_mut().unwrap().status_effects,
            StatusEffect::new(1, StatusKind::Stun, 3000.0, 1.0, EffectSource::Player),
        );

        for _ in 0..29 {
            let r = e.update(&mut p, 100.0, &mut NoLoot).unwrap();
            assert_eq!(r.enemy_gauge, 0.0);
        }
        // Stun is pruned in step 1 of this frame, before gauges advance
        let r = e.update(&mut p, 100.0, &mut NoLoot).unwrap();
        assert!((r.enemy_gauge - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_slow_halves_fill() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(100.0, 5, 20.0), 1);
        apply_effect(
            &mut e.enemy_mut().unwrap().status_effects,
            StatusEffect::new(1, StatusKind::Slow, 5000.0, 0.5, EffectSource::Player),
        );
        let r = e.update(&mut p, 1000.0, &mut NoLoot).unwrap();
        assert!((r.enemy_gauge - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_death_stops_frame() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        let mut rat = enemy(3.0, 5, 10_000.0);
        rat.status_effects
            .push(StatusEffect::new(1, StatusKind::Poison, 5000.0, 10.0, EffectSource::Player));
        e.engage(rat, 1);

        let r = e.update(&mut p, 500.0, &mut NoLoot).unwrap();
        assert_eq!(r.phase, CombatPhase::EnemyDefeated);
        assert!(r.victory().is_some());
        assert_eq!(r.enemy_gauge, 0.0);
        assert!(!r.events.iter().any(|ev| matches!(ev, CombatEvent::Attack { .. })));
    }

    #[test]
    fn test_player_resolves_first() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        p.hp = 1.0;
        // Both gauges fill this frame; the rat dies before it can swing
        e.engage(enemy(10.0, 50, 1000.0), 1);
        let r = e.update(&mut p, 10_000.0, &mut NoLoot).unwrap();
        assert_eq!(r.phase, CombatPhase::EnemyDefeated);
        assert_eq!(p.hp, 1.0);
        assert_eq!(
            r.events
                .iter()
                .filter(|ev| matches!(ev, CombatEvent::Attack { .. }))
                .count(),
            1
        );
    }

    #[test]
    fn test_basic_attack_uses_defense_override() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(100.0, 1, 0.0), 1);
        // 100 / 13 per second: full after 7.7 s
        let r = e.update(&mut p, 8_000.0, &mut NoLoot).unwrap();
        // floor((20 − 5 × 0.5) × 0.8) = 14
        assert_eq!(r.enemy_hp, 86.0);

        let mut e = CombatEngine::new(
            CombatConfig {
                enemy_defense_override: None,
                ..CombatConfig::default()
            },
            StepRng::new(0, 0),
        );
        e.engage(enemy(100.0, 1, 0.0), 1);
        let r = e.update(&mut p, 8_000.0, &mut NoLoot).unwrap();
        // Own defense 2: floor((20 − 1) × 0.8) = 15
        assert_eq!(r.enemy_hp, 85.0);
    }

    #[test]
    fn test_skill_rejected_without_mana() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Mage);
        p.mana = 10.0;
        e.engage(enemy(100.0, 5, 10.0), 1);

        let before = p.clone();
        assert!(e.cast_skill(&mut p, "nova", 5_000, &mut NoLoot).is_none());
        assert_eq!(p, before);
        assert_eq!(e.battle().unwrap().enemy.hp, 100.0);
    }

    #[test]
    fn test_skill_cooldown_gate() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(500.0, 5, 10.0), 1);

        let cast = e.cast_skill(&mut p, "strike", 1_000, &mut NoLoot).unwrap();
        // floor(20 × 1.6 × 0.8), defense ignored
        assert_eq!(cast.damage, 25.0);
        assert_eq!(p.mana, 53.0 - 8.0);
        assert!(e.cast_skill(&mut p, "strike", 4_000, &mut NoLoot).is_none());
        assert!(e.cast_skill(&mut p, "strike", 4_500, &mut NoLoot).is_some());
        assert!(e.cast_skill(&mut p, "fireball", 9_000, &mut NoLoot).is_none());
    }

    #[test]
    fn test_magic_skill_scales_from_magic() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Mage);
        e.engage(enemy(500.0, 5, 10.0), 1);
        let cast = e.cast_skill(&mut p, "nova", 0, &mut NoLoot).unwrap();
        // floor(30 × 2.4 × 0.8)
        assert_eq!(cast.damage, 57.0);
        assert_eq!(cast.applied, Some(StatusKind::Burn));
    }

    #[test]
    fn test_on_hit_refreshes_not_stacks() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Rogue);
        e.engage(enemy(1_000.0, 5, 10.0), 1);

        e.cast_skill(&mut p, "poison_tip", 0, &mut NoLoot).unwrap();
        e.update(&mut p, 3_000.0, &mut NoLoot);
        e.cast_skill(&mut p, "poison_tip", 6_000, &mut NoLoot).unwrap();

        let effects = &e.battle().unwrap().enemy.status_effects;
        assert_eq!(effects.len(), 1);
        assert_eq!(effects[0].remaining_ms, 8_000.0);
    }

    #[test]
    fn test_ward_restores_and_cleanses() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Cleric);
        p.mana = 20.0;
        p.status_effects
            .push(StatusEffect::new(9, StatusKind::Burn, 4000.0, 5.0, EffectSource::Enemy));
        e.engage(enemy(100.0, 5, 10.0), 1);

        let cast = e.cast_skill(&mut p, "ward", 0, &mut NoLoot).unwrap();
        assert_eq!(cast.damage, 0.0);
        assert_eq!(cast.mana_restored, 15.0);
        assert_eq!(p.mana, 35.0);
        assert!(p.status_effects.is_empty());
        assert_eq!(e.battle().unwrap().enemy.hp, 100.0);
    }

    #[test]
    fn test_killing_skill_triggers_victory_once() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(10.0, 5, 10.0), 1);

        let cast = e.cast_skill(&mut p, "strike", 0, &mut NoLoot).unwrap();
        assert!(cast.victory.is_some());
        assert_eq!(e.phase(), CombatPhase::EnemyDefeated);
        assert_eq!(p.gold, 100);
        assert!(e.update(&mut p, 16.0, &mut NoLoot).is_none());
        assert!(e.cast_skill(&mut p, "bash", 10_000, &mut NoLoot).is_none());
        assert_eq!(p.gold, 100);

        assert_eq!(e.finish(), Some(CombatPhase::EnemyDefeated));
        assert_eq!(e.phase(), CombatPhase::Idle);
        assert!(e.battle().is_none());
        assert_eq!(e.finish(), None);
    }

    #[test]
    fn test_defeat() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Mage);
        p.hp = 5.0;
        e.engage(enemy(1_000.0, 30, 100.0), 1);
        let r = e.update(&mut p, 1_000.0, &mut NoLoot).unwrap();
        assert!(r.is_defeat());
        assert_eq!(e.phase(), CombatPhase::PlayerDefeated);
        assert_eq!(p.hp, 0.0);
        assert!(e.update(&mut p, 1_000.0, &mut NoLoot).is_none());
    }

    #[test]
    fn test_flee_returns_to_idle() {
        let mut e = engine();
        let mut p = Character::new("P", PlayerClass::Warrior);
        e.engage(enemy(100.0, 5, 10.0), 1);
        assert!(!e.engage(enemy(50.0, 5, 10.0), 1));
        assert!(e.flee());
        assert_eq!(e.phase(), CombatPhase::Idle);
        assert!(e.update(&mut p, 16.0, &mut NoLoot).is_none());
        assert_eq!(p.gold, 80);
    }
}
