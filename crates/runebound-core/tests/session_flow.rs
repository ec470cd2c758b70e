//! Integration tests for the exploration session.
//!
//! Exercises: create_character → travel/revisit → combat frames →
//! room interactions → save/resume
//!
//! Sessions run on a `ManualClock` so frame deltas and auto-save debounce
//! are fully controlled. Room contents depend on the seed, so helpers scan
//! seeds for the arrival a test needs.

use runebound_core::prelude::*;
use runebound_core::persistence::SaveError;
use runebound_logic::classes::PlayerClass;
use runebound_logic::items::ItemId;

// ── Helpers ────────────────────────────────────────────────────────────

fn fresh(seed: u64) -> (GameSession<ManualClock>, ManualClock) {
    let clock = ManualClock::new(0);
    let mut session = GameSession::with_clock(SessionConfig::seeded(seed), clock.clone());
    session.create_character("Vex", PlayerClass::Rogue);
    (session, clock)
}

fn exits(session: &GameSession<ManualClock>) -> Vec<Direction> {
    session
        .current_room()
        .map(|r| r.choices.iter().map(|c| c.direction).collect())
        .unwrap_or_default()
}

/// First (seed, exit) whose first step from the entrance satisfies `want`.
fn find_arrival(
    want: impl Fn(&Arrival) -> bool,
) -> (GameSession<ManualClock>, ManualClock, Arrival) {
    for seed in 0..1_000 {
        let (probe, _) = fresh(seed);
        for dir in exits(&probe) {
            let (mut session, clock) = fresh(seed);
            let arrival = session.travel(dir).expect("entrance exit is valid");
            if want(&arrival) {
                return (session, clock, arrival);
            }
        }
    }
    panic!("no seed produced the wanted arrival");
}

fn find_encounter(kind: EncounterType) -> (GameSession<ManualClock>, ManualClock, Arrival) {
    find_arrival(|a| a.encounter == kind)
}

/// Drive 100ms frames until combat ends.
fn fight_out(session: &mut GameSession<ManualClock>, clock: &ManualClock) {
    for _ in 0..100_000 {
        if !session.in_combat() {
            return;
        }
        clock.advance(100);
        session.frame();
    }
    panic!("fight never ended");
}

struct BrokenStore;

impl SaveStore for BrokenStore {
    fn load(&self, _user_id: &str) -> Result<Option<SaveData>, SaveError> {
        Err(SaveError::Unavailable("backend down".into()))
    }

    fn save(&mut self, _user_id: &str, _data: &SaveData) -> Result<(), SaveError> {
        Err(SaveError::Unavailable("backend down".into()))
    }
}

// ── Exploration ────────────────────────────────────────────────────────

#[test]
fn same_seed_same_dungeon() {
    let (a, _) = fresh(42);
    let (b, _) = fresh(42);
    assert_eq!(a.biome(), b.biome());
    assert_eq!(a.current_room(), b.current_room());
}

#[test]
fn revisit_uses_cache_without_encounter() {
    let (mut s, _clock, arrival) = find_arrival(|a| !a.battle);
    assert!(!arrival.revisit);
    let first = s.current_room().cloned().unwrap();
    assert_eq!(first.depth, 1);

    // The exit back to the entrance is always offered
    let back = first.coord.direction_to(RoomCoord::ORIGIN).unwrap();
    let home = s.travel(back).unwrap();
    assert!(home.revisit);
    assert_eq!(home.coord, RoomCoord::ORIGIN);
    assert_eq!(s.log().next(), Some("Returning to familiar ground."));

    let again = s.travel(back.reverse()).unwrap();
    assert!(again.revisit);
    assert!(!again.battle);
    assert_eq!(s.current_room(), Some(&first));
    assert_eq!(s.visited_rooms().len(), 2);
}

#[test]
fn travel_to_jumps_between_visited_rooms() {
    let (mut s, _clock, arrival) = find_arrival(|a| !a.battle);
    s.travel_to(RoomCoord::ORIGIN).unwrap();
    assert_eq!(s.current_coord(), Some(RoomCoord::ORIGIN));
    assert!(s.log().next().unwrap().starts_with("Traveling back to the"));

    s.travel_to(arrival.coord).unwrap();
    assert_eq!(s.current_coord(), Some(arrival.coord));
}

// ── Combat ─────────────────────────────────────────────────────────────

#[test]
fn battle_room_engages_and_locks_movement() {
    let (mut s, clock, arrival) = find_arrival(|a| a.battle);
    assert_eq!(arrival.encounter, EncounterType::Battle);
    assert!(s.in_combat());
    assert!(s.log().next().unwrap().starts_with("A hostile"));

    let back = arrival.coord.direction_to(RoomCoord::ORIGIN).unwrap();
    assert!(matches!(s.travel(back), Err(SessionError::CombatActive)));
    assert!(matches!(s.travel_to(RoomCoord::ORIGIN), Err(SessionError::CombatActive)));
    assert!(matches!(s.open_chest(), Err(SessionError::CombatActive)));

    // First frame after engaging has zero delta
    clock.advance(5_000);
    let report = s.frame().unwrap();
    assert_eq!(report.player_gauge, 0.0);
    assert_eq!(report.enemy_gauge, 0.0);
}

#[test]
fn depth_one_battle_ends_in_victory() {
    // Rogue: 108 hp, 16 gauge/s, hits for at least floor(12.5 × 0.8).
    // Depth-1 enemy: 55 hp, at most 10 gauge/s, hits for at most
    // floor(8.5 × 1.2) = 10. Seven hits land by 43.75s, when the enemy has
    // swung at most four times.
    let (mut s, clock, arrival) = find_arrival(|a| a.battle);
    let enemy = s.battle().map(|b| (b.enemy.max_hp, b.depth)).unwrap();
    assert_eq!(enemy, (55.0, 1));
    fight_out(&mut s, &clock);

    assert_eq!(s.combat_phase(), CombatPhase::Idle);
    assert!(s.frame().is_none());
    let c = s.character().expect("rogue survives a depth-1 fight");
    assert!(c.hp >= c.max_hp as f64 - 40.0);
    assert_eq!(c.level, 1);
    assert_eq!(c.xp, 40);
    assert_eq!(c.gold, 100);
    assert!(s.log().any(|l| l.ends_with("has been vanquished.")));
    assert_eq!(s.current_coord(), Some(arrival.coord));
    assert_eq!(s.visited_rooms().len(), 2);
}

#[test]
fn fled_battle_room_stays_quiet() {
    let (mut s, _clock, arrival) = find_arrival(|a| a.battle);
    assert!(s.flee());
    assert!(!s.in_combat());

    let back = arrival.coord.direction_to(RoomCoord::ORIGIN).unwrap();
    s.travel(back).unwrap();
    let again = s.travel(back.reverse()).unwrap();
    assert!(again.revisit);
    assert!(!again.battle);
    assert!(!s.in_combat());
}

// ── Room interactions ──────────────────────────────────────────────────

#[test]
fn chest_opens_once() {
    let (mut s, _clock, _) = find_encounter(EncounterType::Treasure);
    assert_eq!(s.log().next(), Some("A hidden cache awaits."));
    let gold_before = s.character().unwrap().gold;

    let Interaction::ChestOpened { gold, items } = s.open_chest().unwrap() else {
        panic!("expected a chest");
    };
    assert!(gold >= 50);
    let c = s.character().unwrap();
    assert_eq!(c.gold, gold_before + gold);
    assert!(items.iter().all(|id| c.inventory.contains(*id)));

    assert!(matches!(s.open_chest(), Err(SessionError::AlreadyResolved)));
}

#[test]
fn secret_pays_out_once() {
    let (mut s, _clock, _) = find_encounter(EncounterType::Secret);
    let Interaction::SecretFound { gold } = s.search_secret().unwrap() else {
        panic!("expected a secret");
    };
    assert_eq!(s.character().unwrap().gold, 80 + gold);
    assert!(matches!(s.search_secret(), Err(SessionError::AlreadyResolved)));
}

#[test]
fn trap_is_spent_either_way() {
    let (mut s, _clock, _) = find_encounter(EncounterType::Trap);
    let max_hp = s.character().unwrap().max_hp as f64;
    match s.disarm_trap().unwrap() {
        Interaction::TrapDisarmed => assert_eq!(s.character().unwrap().hp, max_hp),
        Interaction::TrapTriggered { damage } => {
            // depth 1: 5 + 3
            assert_eq!(damage, 8.0);
            assert_eq!(s.character().unwrap().hp, max_hp - 8.0);
        }
        other => panic!("unexpected {:?}", other),
    }
    assert!(matches!(s.disarm_trap(), Err(SessionError::AlreadyResolved)));
}

#[test]
fn puzzle_grants_depth_scaled_xp() {
    let (mut s, _clock, _) = find_encounter(EncounterType::Puzzle);
    let outcome = s.solve_puzzle().unwrap();
    assert_eq!(outcome, Interaction::PuzzleSolved { xp: 30, levels_gained: 0 });
    assert_eq!(s.character().unwrap().xp, 30);
    assert!(matches!(s.solve_puzzle(), Err(SessionError::AlreadyResolved)));
}

#[test]
fn merchant_sells_for_item_value() {
    let (mut s, _clock, _) = find_encounter(EncounterType::Merchant);
    assert!(matches!(s.buy(ItemId(u64::MAX)), Err(SessionError::NoSuchItem(_))));

    let Some(Encounter::Merchant { stock }) = s.current_room().map(|r| r.encounter.clone()) else {
        panic!("expected a merchant");
    };
    let cheapest = stock.iter().min_by_key(|i| i.value).unwrap().clone();
    let gold = s.character().unwrap().gold;

    match s.buy(cheapest.id) {
        Ok(Interaction::Purchased { item, price }) => {
            assert!(price <= gold);
            assert_eq!(item, cheapest.id);
            let c = s.character().unwrap();
            assert_eq!(c.gold, gold - price);
            assert!(c.inventory.contains(cheapest.id));
            let Some(Encounter::Merchant { stock: left }) =
                s.current_room().map(|r| r.encounter.clone())
            else {
                panic!("merchant vanished");
            };
            assert_eq!(left.len(), stock.len() - 1);
        }
        Err(SessionError::NotEnoughGold { price, gold: have }) => {
            assert_eq!(price, cheapest.value);
            assert!(have < price);
        }
        other => panic!("unexpected {:?}", other),
    }
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn autosave_and_resume_through_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let (mut s, clock, _) = find_arrival(|a| !a.battle);
    s.attach_store("player-1", Box::new(FileStore::new(dir.path())));

    // Still inside the debounce window
    clock.advance(500);
    assert!(!s.poll_autosave());
    clock.advance(2_000);
    assert!(s.poll_autosave());
    assert!(!s.poll_autosave());
    assert!(FileStore::new(dir.path()).path_for("player-1").exists());

    let mut resumed = GameSession::with_clock(SessionConfig::seeded(9), ManualClock::new(0));
    resumed.attach_store("player-1", Box::new(FileStore::new(dir.path())));
    assert!(resumed.resume());
    assert_eq!(resumed.character().unwrap().name, "Vex");
    assert_eq!(resumed.visited_rooms(), s.visited_rooms());
    assert_eq!(resumed.current_coord(), s.current_coord());
    assert_eq!(resumed.biome(), s.biome());
}

#[test]
fn missing_save_starts_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = GameSession::with_clock(SessionConfig::seeded(1), ManualClock::new(0));
    s.attach_store("nobody", Box::new(FileStore::new(dir.path())));
    assert!(!s.resume());
    assert!(s.character().is_none());
}

#[test]
fn broken_store_never_interrupts_play() {
    let (mut s, clock, _) = find_arrival(|a| !a.battle);
    s.attach_store("player-2", Box::new(BrokenStore));

    assert!(!s.resume());
    assert!(s.character().is_some());

    clock.advance(10_000);
    assert!(!s.poll_autosave());
    assert!(matches!(s.save_now(), Err(SessionError::Save(SaveError::Unavailable(_)))));

    // Play continues
    s.travel_to(RoomCoord::ORIGIN).unwrap();
    assert_eq!(s.current_coord(), Some(RoomCoord::ORIGIN));
}

#[test]
fn restore_resets_skill_cooldowns() {
    let (mut s, _clock, _) = find_arrival(|a| !a.battle);
    let mut data = s.snapshot().unwrap();
    for skill in &mut data.character.skills {
        skill.last_used_ms = Some(123_456);
    }
    s.restore(data);
    assert!(s
        .character()
        .unwrap()
        .skills
        .iter()
        .all(|sk| sk.last_used_ms.is_none()));
}
