//! Playable classes and their base stats.

use serde::{Deserialize, Serialize};

use crate::stats::Attributes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerClass {
    Warrior,
    Rogue,
    Mage,
    Cleric,
    Barbarian,
    Archer,
}

impl PlayerClass {
    pub const ALL: [PlayerClass; 6] = [
        PlayerClass::Warrior,
        PlayerClass::Rogue,
        PlayerClass::Mage,
        PlayerClass::Cleric,
        PlayerClass::Barbarian,
        PlayerClass::Archer,
    ];

    pub fn profile(self) -> &'static ClassProfile {
        match self {
            PlayerClass::Warrior => &WARRIOR,
            PlayerClass::Rogue => &ROGUE,
            PlayerClass::Mage => &MAGE,
            PlayerClass::Cleric => &CLERIC,
            PlayerClass::Barbarian => &BARBARIAN,
            PlayerClass::Archer => &ARCHER,
        }
    }
}

/// Level-1 stats and starting skills for a class.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub attributes: Attributes,
    pub hp: i32,
    pub mana: i32,
    pub attack: i32,
    pub magic: i32,
    pub defense: i32,
    pub crit: i32,
    pub skills: [&'static str; 2],
}

static WARRIOR: ClassProfile = ClassProfile {
    name: "Warrior",
    description: "Balanced melee fighter with strong defense and reliable damage.",
    attributes: Attributes::new(14, 10, 12, 6, 8),
    hp: 140,
    mana: 53,
    attack: 20,
    magic: 12,
    defense: 7,
    crit: 5,
    skills: ["strike", "bash"],
};

static ROGUE: ClassProfile = ClassProfile {
    name: "Rogue",
    description: "Agile assassin with high critical hits and evasion.",
    attributes: Attributes::new(8, 16, 8, 8, 10),
    hp: 108,
    mana: 65,
    attack: 15,
    magic: 15,
    defense: 5,
    crit: 15,
    skills: ["strike", "poison_tip"],
};

static MAGE: ClassProfile = ClassProfile {
    name: "Mage",
    description: "Arcane master dealing devastating magical damage.",
    attributes: Attributes::new(5, 8, 6, 18, 8),
    hp: 92,
    mana: 125,
    attack: 10,
    magic: 30,
    defense: 3,
    crit: 4,
    skills: ["nova", "freeze"],
};

static CLERIC: ClassProfile = ClassProfile {
    name: "Cleric",
    description: "Divine healer with supportive magic and holy power.",
    attributes: Attributes::new(8, 8, 12, 14, 10),
    hp: 140,
    mana: 101,
    attack: 13,
    magic: 24,
    defense: 5,
    crit: 4,
    skills: ["smite", "ward"],
};

static BARBARIAN: ClassProfile = ClassProfile {
    name: "Barbarian",
    description: "Unstoppable berserker with massive health and brutal attacks.",
    attributes: Attributes::new(18, 8, 14, 4, 6),
    hp: 156,
    mana: 41,
    attack: 23,
    magic: 9,
    defense: 9,
    crit: 4,
    skills: ["strike", "enrage"],
};

static ARCHER: ClassProfile = ClassProfile {
    name: "Archer",
    description: "Precision marksman with deadly accuracy and range.",
    attributes: Attributes::new(10, 18, 8, 6, 8),
    hp: 108,
    mana: 53,
    attack: 18,
    magic: 12,
    defense: 5,
    crit: 6,
    skills: ["strike", "cripple"],
};
