//! Integration tests for the combat engine.
//!
//! Exercises: engage → update frames → victory/defeat → finish, and skill
//! casts against a live encounter.
//!
//! Every test uses `StepRng::new(0, 0)`: variance is always 0.8 and every
//! on-hit chance succeeds.

use rand::rngs::mock::StepRng;

use runebound_core::combat::{CombatEngine, CombatEvent, CombatPhase, Side};
use runebound_core::components::Enemy;
use runebound_core::config::CombatConfig;
use runebound_core::generation::{LootRoller, LootSource};
use runebound_logic::actor::Actor;
use runebound_logic::character::Character;
use runebound_logic::classes::PlayerClass;
use runebound_logic::items::{ArmorWeight, Item, ItemId, ItemType, Rarity};
use runebound_logic::stats::StatBlock;

// ── Helpers ────────────────────────────────────────────────────────────

/// Drops the same trophy on every roll and counts how often it was asked.
struct FixedLoot {
    rolls: usize,
}

impl LootRoller for FixedLoot {
    fn roll(&mut self, _depth: u32, _source: LootSource) -> Vec<Item> {
        self.rolls += 1;
        vec![Item {
            id: ItemId(0xBEEF),
            name: "Rat King's Crown".into(),
            item_type: ItemType::Helm,
            rarity: Rarity::Rare,
            value: 90,
            description: "A rare helm.".into(),
            weight: ArmorWeight::Light,
            class_restrictions: Vec::new(),
            stats: StatBlock { defense: 3, ..Default::default() },
            effect: None,
        }]
    }
}

fn engine() -> CombatEngine<StepRng> {
    CombatEngine::new(CombatConfig::default(), StepRng::new(0, 0))
}

fn enemy(hp: f64, attack: i32, speed: f64) -> Enemy {
    Enemy {
        name: "Gloom Rat".into(),
        biome: "Obsidian Depths".into(),
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

fn warrior(attack: i32, defense: i32) -> Character {
    let mut c = Character::new("Brannoc", PlayerClass::Warrior);
    c.attack = attack;
    c.defense = defense;
    c
}

/// Run 100ms frames until the engine goes inactive. Returns every event.
fn run_to_end(
    e: &mut CombatEngine<StepRng>,
    p: &mut Character,
    loot: &mut dyn LootRoller,
) -> Vec<CombatEvent> {
    let mut events = Vec::new();
    for _ in 0..100_000 {
        match e.update(p, 100.0, loot) {
            Some(report) => events.extend(report.events),
            None => return events,
        }
    }
    panic!("fight never ended");
}

// ── Basic-attack fights ────────────────────────────────────────────────

#[test]
fn warrior_beats_rat_with_basic_attacks() {
    let mut e = engine();
    let mut p = warrior(20, 7);
    let mut loot = FixedLoot { rolls: 0 };
    assert!(e.engage(enemy(70.0, 15, 10.0), 1));

    let events = run_to_end(&mut e, &mut p, &mut loot);

    let mut enemy_hits = 0;
    for ev in &events {
        if let CombatEvent::Attack { attacker, damage } = ev {
            match attacker {
                // (20 - 5 × 0.5) × 0.8
                Side::Player => assert_eq!(*damage, 14.0),
                // (15 - 7 × 0.5) × 0.8 = 9.2
                Side::Enemy => {
                    assert_eq!(*damage, 9.0);
                    enemy_hits += 1;
                }
            }
        }
    }
    let player_hits = events
        .iter()
        .filter(|ev| matches!(ev, CombatEvent::Attack { attacker: Side::Player, .. }))
        .count();
    assert_eq!(player_hits, 5, "70 hp at 14 per hit");

    let victories: Vec<_> = events
        .iter()
        .filter_map(|ev| match ev {
            CombatEvent::Victory(v) => Some(v),
            _ => None,
        })
        .collect();
    assert_eq!(victories.len(), 1);
    assert_eq!(victories[0].xp, 40);
    assert_eq!(victories[0].gold, 20);
    assert_eq!(victories[0].loot, vec![ItemId(0xBEEF)]);
    assert_eq!(loot.rolls, 1);

    assert_eq!(e.phase(), CombatPhase::EnemyDefeated);
    assert_eq!(p.xp, 40);
    assert_eq!(p.gold, 100);
    assert!(p.inventory.contains(ItemId(0xBEEF)));
    assert_eq!(p.hp, p.max_hp as f64 - 9.0 * enemy_hits as f64);
}

#[test]
fn terminal_phase_is_sticky_until_finished() {
    let mut e = engine();
    let mut p = warrior(200, 7);
    let mut loot = FixedLoot { rolls: 0 };
    e.engage(enemy(10.0, 1, 1.0), 1);
    run_to_end(&mut e, &mut p, &mut loot);

    // Further frames and casts change nothing
    assert!(e.update(&mut p, 10_000.0, &mut loot).is_none());
    assert!(e.cast_skill(&mut p, "strike", 0, &mut loot).is_none());
    assert!(!e.engage(enemy(10.0, 1, 1.0), 1));
    assert_eq!(loot.rolls, 1);

    assert_eq!(e.finish(), Some(CombatPhase::EnemyDefeated));
    assert_eq!(e.phase(), CombatPhase::Idle);
    assert!(e.battle().is_none());
    assert!(e.engage(enemy(10.0, 1, 1.0), 2));
}

#[test]
fn player_strikes_first_on_simultaneous_full_gauges() {
    let mut e = engine();
    let mut p = warrior(20, 7);
    let mut loot = FixedLoot { rolls: 0 };
    e.engage(enemy(14.0, 500, 13.0), 1);

    let report = e.update(&mut p, 60_000.0, &mut loot).unwrap();
    assert_eq!(report.phase, CombatPhase::EnemyDefeated);
    assert_eq!(p.hp, p.max_hp as f64);
    assert!(!report
        .events
        .iter()
        .any(|ev| matches!(ev, CombatEvent::Attack { attacker: Side::Enemy, .. })));
}

#[test]
fn defeat_grants_nothing() {
    let mut e = engine();
    let mut p = warrior(1, 0);
    let mut loot = FixedLoot { rolls: 0 };
    e.engage(enemy(10_000.0, 400, 50.0), 3);

    let events = run_to_end(&mut e, &mut p, &mut loot);
    assert!(events.iter().any(|ev| matches!(ev, CombatEvent::Defeat)));
    assert!(!events.iter().any(|ev| matches!(ev, CombatEvent::Victory(_))));
    assert_eq!(e.phase(), CombatPhase::PlayerDefeated);
    assert_eq!(p.hp, 0.0);
    assert_eq!(p.xp, 0);
    assert_eq!(loot.rolls, 0);
    assert_eq!(e.finish(), Some(CombatPhase::PlayerDefeated));
}

// ── Skills ─────────────────────────────────────────────────────────────

#[test]
fn nova_without_mana_is_a_no_op() {
    let mut e = engine();
    let mut p = Character::new("Ayla", PlayerClass::Mage);
    p.mana = 10.0;
    let mut loot = FixedLoot { rolls: 0 };
    e.engage(enemy(80.0, 5, 10.0), 1);

    assert!(e.cast_skill(&mut p, "nova", 1_000, &mut loot).is_none());
    assert_eq!(p.mana, 10.0);
    assert_eq!(p.skill("nova").unwrap().last_used_ms, None);
    assert_eq!(e.battle().unwrap().enemy.hp(), 80.0);
}

#[test]
fn skill_kill_grants_victory_once() {
    let mut e = engine();
    let mut p = Character::new("Ayla", PlayerClass::Mage);
    let mut loot = FixedLoot { rolls: 0 };
    e.engage(enemy(5.0, 5, 10.0), 1);

    let cast = e.cast_skill(&mut p, "nova", 0, &mut loot).unwrap();
    assert!(cast.damage >= 5.0);
    let victory = cast.victory.expect("killing blow reports victory");
    assert_eq!(victory.enemy_name, "Gloom Rat");
    assert_eq!(e.phase(), CombatPhase::EnemyDefeated);

    // The follow-up frame is ignored
    assert!(e.update(&mut p, 100.0, &mut loot).is_none());
    assert_eq!(loot.rolls, 1);
    assert_eq!(p.xp, 40);
}

#[test]
fn commands_between_frames_are_seen_next_tick() {
    let mut e = engine();
    let mut p = warrior(20, 7);
    let mut loot = FixedLoot { rolls: 0 };
    e.engage(enemy(500.0, 5, 1.0), 1);

    let before = e.update(&mut p, 1_000.0, &mut loot).unwrap().player_gauge;
    // Raise dexterity between frames: 4 more points is 2 more gauge per second
    p.attributes.dexterity += 4;
    let after = e.update(&mut p, 1_000.0, &mut loot).unwrap().player_gauge;
    assert!((after - before * 2.0 - 2.0).abs() < 1e-9);
}
