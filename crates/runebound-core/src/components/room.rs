//! Dungeon rooms and the paths between them.

use runebound_logic::items::Item;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Integer grid coordinate of a room. Unique key in the visited-room cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RoomCoord {
    pub x: i32,
    pub y: i32,
}

impl RoomCoord {
    pub const ORIGIN: RoomCoord = RoomCoord { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Cache key, `"{x},{y}"`.
    pub fn key(self) -> String {
        self.to_string()
    }

    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Direction leading from `self` to an adjacent `other`.
    pub fn direction_to(self, other: RoomCoord) -> Option<Direction> {
        let delta = (other.x - self.x, other.y - self.y);
        Direction::ALL.into_iter().find(|d| d.offset() == delta)
    }
}

impl fmt::Display for RoomCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

impl FromStr for RoomCoord {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (x, y) = s
            .split_once(',')
            .ok_or_else(|| format!("room key '{}' is not 'x,y'", s))?;
        let x = x.trim().parse().map_err(|_| format!("bad x in room key '{}'", s))?;
        let y = y.trim().parse().map_err(|_| format!("bad y in room key '{}'", s))?;
        Ok(Self { x, y })
    }
}

/// Compass exits. North is `-y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::South => (0, 1),
            Direction::East => (1, 0),
            Direction::West => (-1, 0),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];
}

/// An exit out of a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathChoice {
    pub direction: Direction,
    pub description: String,
    pub risk: RiskLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EncounterType {
    Battle,
    Treasure,
    Trap,
    Merchant,
    Puzzle,
    Secret,
    Story,
}

/// Encounter payload. Only the fields of the rolled type exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Encounter {
    Battle,
    Treasure {
        loot: Vec<Item>,
        gold: u32,
        opened: bool,
    },
    Trap {
        disarmed: bool,
    },
    Merchant {
        stock: Vec<Item>,
    },
    Puzzle {
        solved: bool,
    },
    Secret {
        gold: u32,
        found: bool,
    },
    Story,
}

impl Encounter {
    pub fn kind(&self) -> EncounterType {
        match self {
            Encounter::Battle => EncounterType::Battle,
            Encounter::Treasure { .. } => EncounterType::Treasure,
            Encounter::Trap { .. } => EncounterType::Trap,
            Encounter::Merchant { .. } => EncounterType::Merchant,
            Encounter::Puzzle { .. } => EncounterType::Puzzle,
            Encounter::Secret { .. } => EncounterType::Secret,
            Encounter::Story => EncounterType::Story,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub coord: RoomCoord,
    /// Steps from the entrance (entrance = 0)
    pub depth: u32,
    pub title: String,
    pub description: String,
    pub risk: RiskLevel,
    pub encounter: Encounter,
    pub choices: Vec<PathChoice>,
}

impl Room {
    pub fn encounter_type(&self) -> EncounterType {
        self.encounter.kind()
    }

    pub fn choice(&self, direction: Direction) -> Option<&PathChoice> {
        self.choices.iter().find(|c| c.direction == direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_key_roundtrip() {
        let c = RoomCoord::new(-3, 12);
        assert_eq!(c.key(), "-3,12");
        assert_eq!("-3,12".parse::<RoomCoord>(), Ok(c));
        assert!("3;12".parse::<RoomCoord>().is_err());
    }

    #[test]
    fn test_step_and_reverse() {
        let start = RoomCoord::ORIGIN;
        for d in Direction::ALL {
            let next = start.step(d);
            assert_eq!(next.step(d.reverse()), start);
            assert_eq!(start.direction_to(next), Some(d));
            assert_eq!(next.direction_to(start), Some(d.reverse()));
        }
        assert_eq!(start.direction_to(RoomCoord::new(2, 0)), None);
    }
}
