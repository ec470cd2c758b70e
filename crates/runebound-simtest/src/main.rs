//! Runebound Headless Simulation Harness
//!
//! Validates the pure rules and the engine without any UI, then plays a
//! scripted run on a manual clock.
//!
//! Usage:
//!   cargo run -p runebound-simtest
//!   cargo run -p runebound-simtest -- --verbose --seed 7
//!   cargo run -p runebound-simtest -- --config run.json

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;

use runebound_core::clock::ManualClock;
use runebound_core::combat::{CombatEngine, CombatEvent, CombatPhase};
use runebound_core::components::{Direction, Encounter, EncounterType, RiskLevel, RoomCoord};
use runebound_core::config::{CombatConfig, SessionConfig};
use runebound_core::engine::{GameSession, SessionError};
use runebound_core::generation::{
    generate_enemy, generate_entrance, generate_item, generate_potion, generate_room, LootSource,
    ProceduralLoot,
};
use runebound_core::persistence::{export_json, import_json};
use runebound_logic::actor::Actor;
use runebound_logic::character::Character;
use runebound_logic::classes::PlayerClass;
use runebound_logic::damage::compute_damage;
use runebound_logic::items::{ConsumableKind, EquipmentSlot};
use runebound_logic::skills::skill_by_id;
use runebound_logic::status::{
    process_effects, speed_multiplier, EffectSource, StatusEffect, StatusKind,
};

const DEFAULT_SEED: u64 = 0x5EED;

// ── Run plan (optional JSON via --config) ───────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RunPlan {
    session: SessionConfig,
    class: PlayerClass,
    /// Rooms to walk in the scripted run
    steps: usize,
}

impl Default for RunPlan {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            class: PlayerClass::Warrior,
            steps: 40,
        }
    }
}

fn load_plan(path: &str) -> Result<RunPlan, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    let verbose = args.iter().any(|a| a == "--verbose");
    let mut plan = match flag_value(&args, "--config") {
        Some(path) => match load_plan(path) {
            Ok(plan) => plan,
            Err(e) => {
                eprintln!("error: {e}");
                std::process::exit(2);
            }
        },
        None => RunPlan::default(),
    };
    if let Some(seed) = flag_value(&args, "--seed").and_then(|s| s.parse().ok()) {
        plan.session.seed = Some(seed);
    }
    let seed = *plan.session.seed.get_or_insert(DEFAULT_SEED);

    println!("=== Runebound Simulation Harness (seed {}) ===\n", seed);

    let mut results = Vec::new();

    // 1. Class and skill tables
    results.extend(validate_tables(verbose));

    // 2. Damage formula
    results.extend(validate_damage(verbose));

    // 3. Status processor
    results.extend(validate_status(verbose));

    // 4. Character mutators
    results.extend(validate_character(seed, verbose));

    // 5. Procedural generation sweep
    results.extend(validate_generation(seed, verbose));

    // 6. Combat sweep
    results.extend(validate_combat(seed, &plan.session.combat, verbose));

    // 7. Scripted exploration run
    results.extend(validate_scripted_run(&plan, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Tables ───────────────────────────────────────────────────────────

fn validate_tables(verbose: bool) -> Vec<TestResult> {
    println!("--- Class & Skill Tables ---");
    let mut results = Vec::new();

    let missing: Vec<String> = PlayerClass::ALL
        .iter()
        .flat_map(|c| c.profile().skills.iter())
        .filter(|id| skill_by_id(id).is_none())
        .map(|id| id.to_string())
        .collect();
    results.push(check(
        "class_skills_resolve",
        missing.is_empty(),
        if missing.is_empty() {
            "every starting skill is in the library".to_string()
        } else {
            format!("unknown skills: {:?}", missing)
        },
    ));

    let fresh_ok = PlayerClass::ALL.iter().all(|&class| {
        let c = Character::new("T", class);
        c.level == 1
            && c.xp == 0
            && c.xp_to_next == 100
            && c.gold == 80
            && c.hp == c.max_hp as f64
            && c.skills.len() == 2
            && c.skills.iter().all(|s| s.is_ready(0))
    });
    results.push(check(
        "fresh_characters",
        fresh_ok,
        "level 1, 0/100 xp, 80 gold, full hp, two ready skills",
    ));

    if verbose {
        for class in PlayerClass::ALL {
            let c = Character::new("T", class);
            println!(
                "  {:<10} hp {:>3} mana {:>3} atk {:>2} mag {:>2} def {:>2} speed {:.1}",
                class.profile().name,
                c.max_hp,
                c.max_mana,
                c.attack,
                c.magic,
                c.defense,
                c.base_speed()
            );
        }
    }

    results
}

// ── 2. Damage ───────────────────────────────────────────────────────────

fn validate_damage(_verbose: bool) -> Vec<TestResult> {
    println!("--- Damage Formula ---");
    let mut results = Vec::new();

    let cases = [
        (20.0, 1.0, 5.0, 1.0, 17.0),
        (20.0, 1.0, 5.0, 0.8, 14.0),
        (30.0, 2.4, 0.0, 1.0, 72.0),
        (1.0, 1.0, 500.0, 1.2, 1.0),
    ];
    let bad: Vec<_> = cases
        .iter()
        .filter(|(p, m, d, v, want)| compute_damage(*p, *m, *d, *v) != *want)
        .collect();
    results.push(check(
        "damage_table",
        bad.is_empty(),
        format!("{}/{} reference hits match", cases.len() - bad.len(), cases.len()),
    ));

    let mut min_seen = f64::MAX;
    for power in 0..60 {
        for defense in 0..120 {
            for variance in [0.8, 1.0, 1.2] {
                min_seen = min_seen.min(compute_damage(power as f64, 1.0, defense as f64, variance));
            }
        }
    }
    results.push(check(
        "damage_floor",
        min_seen >= 1.0,
        format!("smallest hit {}", min_seen),
    ));

    results
}

// ── 3. Status ───────────────────────────────────────────────────────────

fn validate_status(_verbose: bool) -> Vec<TestResult> {
    println!("--- Status Processor ---");
    let mut results = Vec::new();

    // Poison 10/s for 3s, stepped in uneven frames that sum to its duration
    let mut effects = vec![StatusEffect::new(1, StatusKind::Poison, 3000.0, 10.0, EffectSource::Enemy)];
    let mut total = 0.0;
    for delta in [16.0, 250.0, 1000.0, 34.0, 1700.0] {
        let tick = process_effects(&effects, delta);
        total += tick.damage;
        effects = tick.effects;
    }
    results.push(check(
        "poison_total_matches_duration",
        (total - 30.0).abs() < 1e-6 && effects.is_empty(),
        format!("poison dealt {:.3} (expected 30)", total),
    ));

    let stunned = [
        StatusEffect::new(1, StatusKind::Stun, 1000.0, 1.0, EffectSource::Player),
        StatusEffect::new(2, StatusKind::Slow, 1000.0, 0.5, EffectSource::Player),
    ];
    let slowed = [StatusEffect::new(3, StatusKind::Slow, 1000.0, 0.5, EffectSource::Player)];
    results.push(check(
        "speed_multipliers",
        speed_multiplier(&stunned) == 0.0 && (speed_multiplier(&slowed) - 0.5).abs() < 1e-9,
        "stun freezes, slow halves",
    ));

    results
}

// ── 4. Character ────────────────────────────────────────────────────────

fn validate_character(seed: u64, _verbose: bool) -> Vec<TestResult> {
    println!("--- Character Mutators ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let mut c = Character::new("Harness", PlayerClass::Barbarian);
    for _ in 0..60 {
        c.inventory.insert(generate_item(&mut rng, 4, LootSource::Chest));
    }
    let total_before = c.inventory.len();

    let ids: Vec<_> = c.inventory.iter().map(|i| i.id).collect();
    let mut equipped = 0;
    for id in ids {
        if c.equip(id, None) {
            equipped += 1;
        }
    }
    let total_after = c.inventory.len() + c.equipment.iter().count();
    results.push(check(
        "equip_conserves_items",
        total_before == total_after,
        format!("{} equips, {} items before, {} after", equipped, total_before, total_after),
    ));

    let hp_ok = c.hp <= c.max_hp as f64 && c.mana <= c.max_mana as f64;
    for slot in EquipmentSlot::ALL {
        c.unequip(slot);
    }
    results.push(check(
        "unequip_restores_base",
        hp_ok && c.equipment.iter().count() == 0 && c.attack == c.base.attack,
        format!("attack back to {}", c.attack),
    ));

    c.hp = 1.0;
    let heal = std::iter::repeat_with(|| generate_potion(&mut rng, 3))
        .take(100)
        .find(|p| p.effect.is_some_and(|e| e.kind == ConsumableKind::Heal));
    let drank = match heal {
        Some(potion) => {
            let id = potion.id;
            c.inventory.insert(potion);
            c.consume(id)
        }
        None => false,
    };
    results.push(check(
        "potion_consumed",
        drank && c.hp > 1.0 && c.hp <= c.max_hp as f64,
        format!("hp {:.0}/{}", c.hp, c.max_hp),
    ));

    let levels = c.gain_xp(10_000);
    results.push(check(
        "multi_level_up",
        levels > 1 && c.xp < c.xp_to_next && c.hp == c.max_hp as f64,
        format!("{} levels, now level {} ({}/{})", levels, c.level, c.xp, c.xp_to_next),
    ));

    results
}

// ── 5. Generation ───────────────────────────────────────────────────────

fn validate_generation(seed: u64, verbose: bool) -> Vec<TestResult> {
    println!("--- Procedural Generation ---");
    let mut results = Vec::new();
    let mut rng = StdRng::seed_from_u64(seed);

    let entrance = generate_entrance(&mut rng);
    results.push(check(
        "entrance",
        entrance.depth == 0
            && entrance.encounter_type() == EncounterType::Story
            && entrance.choices.len() == 2,
        format!("'{}' with {} exits", entrance.title, entrance.choices.len()),
    ));

    const SAMPLES: usize = 2_000;
    let mut high_battles = 0;
    let mut back_missing = 0;
    let mut bad_exits = 0;
    for _ in 0..SAMPLES {
        let prev = generate_room(&mut rng, None, RoomCoord::ORIGIN, RiskLevel::Low);
        let coord = RoomCoord::ORIGIN.step(Direction::East);
        let room = generate_room(&mut rng, Some(&prev), coord, RiskLevel::High);
        if room.encounter_type() == EncounterType::Battle {
            high_battles += 1;
        }
        if room.choice(Direction::West).is_none() {
            back_missing += 1;
        }
        if !(2..=4).contains(&room.choices.len()) {
            bad_exits += 1;
        }
    }
    let battle_share = high_battles as f64 / SAMPLES as f64;
    results.push(check(
        "high_risk_battle_share",
        (0.45..=0.55).contains(&battle_share),
        format!("{:.1}% battles on HIGH risk", battle_share * 100.0),
    ));
    results.push(check(
        "back_exit_always_offered",
        back_missing == 0 && bad_exits == 0,
        format!("{} rooms missing the way back, {} with bad exit counts", back_missing, bad_exits),
    ));

    let scaling_ok = (1..=20).all(|depth| {
        let e = generate_enemy(&mut rng, "Obsidian Depths", depth);
        e.max_hp == 40.0 + 15.0 * depth as f64
            && e.attack == 8 + 3 * depth as i32
            && e.reward_xp == 30 + 10 * depth
            && e.reward_gold == 15 + 5 * depth
            && e.speed >= 5.0
    });
    results.push(check(
        "enemy_depth_scaling",
        scaling_ok,
        "hp 40+15d, atk 8+3d, xp 30+10d, gold 15+5d",
    ));

    if verbose {
        let sample = generate_enemy(&mut rng, "Obsidian Depths", 5);
        println!("  sample depth-5 enemy: {:?}", sample);
    }

    results
}

// ── 6. Combat ───────────────────────────────────────────────────────────

fn validate_combat(seed: u64, config: &CombatConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Combat Sweep ---");
    let mut results = Vec::new();
    let mut content = StdRng::seed_from_u64(seed);

    let mut wins = 0;
    let mut losses = 0;
    let mut multi_victory = 0;
    let mut hp_violations = 0;

    for (i, class) in PlayerClass::ALL.iter().cycle().take(60).enumerate() {
        let depth = 1 + (i as u32 % 6);
        let mut engine = CombatEngine::seeded(config.clone(), seed.wrapping_add(i as u64));
        let mut loot = ProceduralLoot::new(StdRng::seed_from_u64(seed ^ i as u64));
        let mut player = Character::new("Sweep", *class);
        engine.engage(generate_enemy(&mut content, "Sanguine Halls", depth), depth);

        let mut victories = 0;
        let mut frames = 0;
        while let Some(report) = engine.update(&mut player, 16.0, &mut loot) {
            frames += 1;
            if !(0.0..=report.player_max_hp).contains(&report.player_hp)
                || !(0.0..=report.enemy_max_hp).contains(&report.enemy_hp)
            {
                hp_violations += 1;
            }
            victories += report
                .events
                .iter()
                .filter(|e| matches!(e, CombatEvent::Victory(_)))
                .count();
            // Cast whatever is ready every half second
            if frames % 30 == 0 {
                let now = frames as u64 * 16;
                let ids: Vec<String> = player.skills.iter().map(|s| s.id.clone()).collect();
                for id in ids {
                    if let Some(cast) = engine.cast_skill(&mut player, &id, now, &mut loot) {
                        victories += usize::from(cast.victory.is_some());
                    }
                }
            }
            if frames > 200_000 {
                break;
            }
        }
        if victories > 1 {
            multi_victory += 1;
        }
        match engine.finish() {
            Some(CombatPhase::EnemyDefeated) => wins += 1,
            Some(CombatPhase::PlayerDefeated) => losses += 1,
            _ => {}
        }
    }

    info!("Combat sweep: {} wins, {} losses", wins, losses);
    results.push(check(
        "fights_terminate",
        wins + losses == 60,
        format!("{} wins, {} losses", wins, losses),
    ));
    results.push(check(
        "victory_granted_once",
        multi_victory == 0,
        format!("{} fights with duplicate victories", multi_victory),
    ));
    results.push(check(
        "hp_stays_in_range",
        hp_violations == 0,
        format!("{} out-of-range frames", hp_violations),
    ));
    if verbose {
        println!("  win rate {:.0}%", wins as f64 / 60.0 * 100.0);
    }

    results
}

// ── 7. Scripted run ─────────────────────────────────────────────────────

#[derive(Default)]
struct RunStats {
    rooms_entered: usize,
    battles: usize,
    interactions: usize,
    died_at_step: Option<usize>,
}

fn play_room(session: &mut GameSession<ManualClock>, clock: &ManualClock, stats: &mut RunStats) {
    if session.in_combat() {
        stats.battles += 1;
        let skills: Vec<String> = session
            .character()
            .map(|c| c.skills.iter().map(|s| s.id.clone()).collect())
            .unwrap_or_default();
        let mut frames = 0u32;
        while session.in_combat() && frames < 200_000 {
            clock.advance(16);
            session.frame();
            frames += 1;
            if frames % 30 == 0 {
                for id in &skills {
                    session.cast_skill(id);
                }
            }
            let low = session
                .character()
                .is_some_and(|c| c.hp < c.max_hp as f64 * 0.4);
            if low {
                let potion = session
                    .character()
                    .and_then(|c| c.inventory.find_consumable(ConsumableKind::Heal))
                    .map(|p| p.id);
                if let Some(id) = potion {
                    session.use_item(id);
                }
            }
        }
        return;
    }

    let Some(kind) = session.current_room().map(|r| r.encounter_type()) else {
        return;
    };
    let outcome = match kind {
        EncounterType::Treasure => session.open_chest(),
        EncounterType::Secret => session.search_secret(),
        EncounterType::Trap => session.disarm_trap(),
        EncounterType::Puzzle => session.solve_puzzle(),
        EncounterType::Merchant => {
            let cheapest = session.current_room().and_then(|r| match &r.encounter {
                Encounter::Merchant { stock } => {
                    stock.iter().min_by_key(|i| i.value).map(|i| i.id)
                }
                _ => None,
            });
            match cheapest {
                Some(id) => session.buy(id),
                None => return,
            }
        }
        _ => return,
    };
    match outcome {
        Ok(_) => stats.interactions += 1,
        Err(SessionError::AlreadyResolved) | Err(SessionError::NotEnoughGold { .. }) => {}
        Err(e) => log::warn!("Interaction failed: {}", e),
    }
}

fn validate_scripted_run(plan: &RunPlan, verbose: bool) -> Vec<TestResult> {
    println!("--- Scripted Run ---");
    let mut results = Vec::new();

    let clock = ManualClock::new(0);
    let mut session = GameSession::with_clock(plan.session.clone(), clock.clone());
    session.create_character("Harness", plan.class);
    let mut stats = RunStats::default();

    for step in 0..plan.steps {
        play_room(&mut session, &clock, &mut stats);
        if session.character().is_none() {
            stats.died_at_step = Some(step);
            break;
        }
        let Some(room) = session.current_room() else {
            break;
        };
        // Prefer unexplored exits
        let here = room.coord;
        let next = room
            .choices
            .iter()
            .map(|c| c.direction)
            .find(|d| session.room(here.step(*d)).is_none())
            .or_else(|| room.choices.first().map(|c| c.direction));
        let Some(direction) = next else {
            break;
        };
        match session.travel(direction) {
            Ok(arrival) => {
                if !arrival.revisit {
                    stats.rooms_entered += 1;
                }
            }
            Err(e) => {
                results.push(check("run_travel", false, format!("step {}: {}", step, e)));
                break;
            }
        }
    }

    info!(
        "Scripted run: {} new rooms, {} battles, {} interactions",
        stats.rooms_entered, stats.battles, stats.interactions
    );

    results.push(check(
        "run_log_bounded",
        session.log().count() <= plan.session.log_capacity,
        format!("{} messages kept", session.log().count()),
    ));

    match stats.died_at_step {
        Some(step) => {
            results.push(check(
                "run_death_clears_state",
                session.visited_rooms().is_empty() && session.current_coord().is_none(),
                format!("fell at step {}", step),
            ));
        }
        None => {
            let rooms = session.visited_rooms();
            let depth_ok = rooms.values().all(|r| {
                r.depth == 0
                    || Direction::ALL.iter().any(|d| {
                        session
                            .room(r.coord.step(*d))
                            .is_some_and(|n| n.depth + 1 == r.depth)
                    })
            });
            results.push(check(
                "run_depths_chain",
                depth_ok,
                format!("{} rooms cached", rooms.len()),
            ));

            let roundtrip = session
                .snapshot()
                .ok_or_else(|| "no snapshot".to_string())
                .and_then(|data| {
                    let json = export_json(&data).map_err(|e| e.to_string())?;
                    let back = import_json(&json).map_err(|e| e.to_string())?;
                    Ok(back == data)
                });
            results.push(check(
                "run_save_roundtrip",
                roundtrip == Ok(true),
                format!("{:?}", roundtrip),
            ));
        }
    }

    if verbose {
        for line in session.log().take(10) {
            println!("  | {}", line);
        }
    }

    results
}
