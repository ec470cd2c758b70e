//! Room generation

use rand::seq::SliceRandom;
use rand::Rng;

use super::loot::{generate_loot, LootSource};
use super::vocab::*;
use crate::components::{
    Direction, Encounter, EncounterType, PathChoice, RiskLevel, Room, RoomCoord,
};

/// The starting room at the origin: depth 0, no encounter, two exits.
pub fn generate_entrance(rng: &mut impl Rng) -> Room {
    Room {
        coord: RoomCoord::ORIGIN,
        depth: 0,
        title: ENTRANCE_TITLE.to_string(),
        description: ENTRANCE_DESCRIPTION.to_string(),
        risk: RiskLevel::Low,
        encounter: Encounter::Story,
        choices: generate_choices(rng, None),
    }
}

/// Generate the room at `coord`, entered from `prev`.
///
/// Depth is one past the previous room (1 with no previous room). When the
/// previous room is adjacent, the exit leading back to it is always offered.
pub fn generate_room(
    rng: &mut impl Rng,
    prev: Option<&Room>,
    coord: RoomCoord,
    risk: RiskLevel,
) -> Room {
    let depth = prev.map_or(1, |p| p.depth + 1);
    let title = format!("{} {}", pick(rng, ROOM_ADJECTIVES), pick(rng, ROOM_NOUNS));
    let mut description = pick(rng, ROOM_FLAVOR).to_string();

    let encounter = match roll_encounter(rng, risk) {
        EncounterType::Merchant => {
            description = pick(rng, MERCHANT_FLAVOR).to_string();
            Encounter::Merchant {
                stock: generate_loot(rng, depth, LootSource::Merchant),
            }
        }
        EncounterType::Treasure => {
            description = TREASURE_DESCRIPTION.to_string();
            let loot = generate_loot(rng, depth, LootSource::Chest);
            let gold = (rng.gen::<f64>() * 50.0 * depth as f64).floor() as u32 + 50;
            Encounter::Treasure {
                loot,
                gold,
                opened: false,
            }
        }
        EncounterType::Puzzle => {
            description = pick(rng, PUZZLE_FLAVOR).to_string();
            Encounter::Puzzle { solved: false }
        }
        EncounterType::Secret => {
            description = pick(rng, SECRET_FLAVOR).to_string();
            let gold = (rng.gen::<f64>() * 100.0 * depth as f64).floor() as u32 + 100;
            Encounter::Secret { gold, found: false }
        }
        EncounterType::Trap => {
            description = TRAP_DESCRIPTION.to_string();
            Encounter::Trap { disarmed: false }
        }
        EncounterType::Battle => Encounter::Battle,
        EncounterType::Story => Encounter::Story,
    };

    let back = prev.and_then(|p| coord.direction_to(p.coord));

    Room {
        coord,
        depth,
        title,
        description,
        risk,
        encounter,
        choices: generate_choices(rng, back),
    }
}

/// Draw an encounter type from the risk tier's table.
///
/// | Risk | Battle | Trap | Treasure | Secret | Merchant | Puzzle |
/// |------|--------|------|----------|--------|----------|--------|
/// | High | 50% | 20% | 20% | 10% | - | - |
/// | Medium | 40% | 15% | 15% | - | 15% | 15% |
/// | Low | 20% | - | 10% | 20% | 30% | 20% |
pub fn roll_encounter(rng: &mut impl Rng, risk: RiskLevel) -> EncounterType {
    let roll = rng.gen::<f64>();
    match risk {
        RiskLevel::High => {
            if roll < 0.50 {
                EncounterType::Battle
            } else if roll < 0.70 {
                EncounterType::Trap
            } else if roll < 0.90 {
                EncounterType::Treasure
            } else {
                EncounterType::Secret
            }
        }
        RiskLevel::Low => {
            if roll < 0.20 {
                EncounterType::Battle
            } else if roll < 0.50 {
                EncounterType::Merchant
            } else if roll < 0.70 {
                EncounterType::Puzzle
            } else if roll < 0.90 {
                EncounterType::Secret
            } else {
                EncounterType::Treasure
            }
        }
        RiskLevel::Medium => {
            if roll < 0.40 {
                EncounterType::Battle
            } else if roll < 0.55 {
                EncounterType::Trap
            } else if roll < 0.70 {
                EncounterType::Puzzle
            } else if roll < 0.85 {
                EncounterType::Treasure
            } else {
                EncounterType::Merchant
            }
        }
    }
}

/// Exits for a new room. With a known way back: that direction plus 1-3
/// others. Otherwise two random directions. Each exit rolls its own risk.
fn generate_choices(rng: &mut impl Rng, back: Option<Direction>) -> Vec<PathChoice> {
    let mut directions = Vec::with_capacity(4);
    let mut pool: Vec<Direction> = Direction::ALL.to_vec();

    match back {
        Some(back) => {
            pool.retain(|d| *d != back);
            pool.shuffle(rng);
            let extras = rng.gen_range(1..=3);
            directions.push(back);
            directions.extend(pool.into_iter().take(extras));
        }
        None => {
            pool.shuffle(rng);
            directions.extend(pool.into_iter().take(2));
        }
    }

    directions
        .into_iter()
        .map(|direction| PathChoice {
            direction,
            description: pick(rng, PATH_DESCRIPTIONS).to_string(),
            risk: RiskLevel::ALL[rng.gen_range(0..RiskLevel::ALL.len())],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_entrance() {
        let mut rng = StdRng::seed_from_u64(1);
        let room = generate_entrance(&mut rng);
        assert_eq!(room.depth, 0);
        assert_eq!(room.title, "Entrance Hall");
        assert_eq!(room.encounter_type(), EncounterType::Story);
        assert_eq!(room.choices.len(), 2);
        assert_ne!(room.choices[0].direction, room.choices[1].direction);
    }

    #[test]
    fn test_back_path_always_offered() {
        let mut rng = StdRng::seed_from_u64(9);
        let entrance = generate_entrance(&mut rng);
        for _ in 0..200 {
            let room = generate_room(&mut rng, Some(&entrance), RoomCoord::new(1, 0), RiskLevel::Medium);
            assert_eq!(room.depth, 1);
            assert!(room.choice(Direction::West).is_some());
            assert!((2..=4).contains(&room.choices.len()));
            let unique: HashSet<_> = room.choices.iter().map(|c| c.direction).collect();
            assert_eq!(unique.len(), room.choices.len());
        }
    }

    #[test]
    fn test_payload_matches_type() {
        let mut rng = StdRng::seed_from_u64(12);
        let entrance = generate_entrance(&mut rng);
        for _ in 0..300 {
            let room = generate_room(&mut rng, Some(&entrance), RoomCoord::new(0, 1), RiskLevel::Low);
            match &room.encounter {
                Encounter::Treasure { loot, gold, opened } => {
                    assert!(!loot.is_empty());
                    assert!(*gold >= 50 && *gold < 100);
                    assert!(!opened);
                }
                Encounter::Secret { gold, found } => {
                    assert!(*gold >= 100 && *gold < 200);
                    assert!(!found);
                }
                Encounter::Merchant { stock } => assert_eq!(stock.len(), 4),
                Encounter::Trap { .. } => panic!("low risk never rolls a trap"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_high_risk_is_mostly_hostile() {
        let mut rng = StdRng::seed_from_u64(1000);
        let hostile = (0..1000)
            .map(|_| roll_encounter(&mut rng, RiskLevel::High))
            .filter(|t| matches!(t, EncounterType::Battle | EncounterType::Trap))
            .count();
        assert!(hostile >= 600, "only {} hostile of 1000", hostile);
    }

    #[test]
    fn test_no_previous_room() {
        let mut rng = StdRng::seed_from_u64(4);
        let room = generate_room(&mut rng, None, RoomCoord::new(5, 5), RiskLevel::High);
        assert_eq!(room.depth, 1);
        assert_eq!(room.choices.len(), 2);
    }
}
