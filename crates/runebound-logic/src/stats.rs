//! Flat stat blocks and primary attributes.
//!
//! Items carry a [`StatBlock`] of flat bonuses; a character's derived stats
//! are its class base plus the sum of every equipped item's block.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// Primary attributes (STR/DEX/VIT/INT/CHA).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub dexterity: i32,
    pub vitality: i32,
    pub intellect: i32,
    pub charisma: i32,
}

impl Attributes {
    pub const fn new(
        strength: i32,
        dexterity: i32,
        vitality: i32,
        intellect: i32,
        charisma: i32,
    ) -> Self {
        Self {
            strength,
            dexterity,
            vitality,
            intellect,
            charisma,
        }
    }
}

/// Every stat an item bonus or affix can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatKind {
    Attack,
    Defense,
    Hp,
    Mana,
    Magic,
    Crit,
    Dodge,
    Strength,
    Dexterity,
    Intellect,
    Vitality,
    Charisma,
}

/// Flat additive bonuses. Negative values are allowed (cursed items).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatBlock {
    pub attack: i32,
    pub defense: i32,
    pub hp: i32,
    pub mana: i32,
    pub magic: i32,
    pub crit: i32,
    pub dodge: i32,
    pub strength: i32,
    pub dexterity: i32,
    pub intellect: i32,
    pub vitality: i32,
    pub charisma: i32,
}

impl StatBlock {
    /// All-zero block, usable in `const` item tables.
    pub const ZERO: StatBlock = StatBlock {
        attack: 0,
        defense: 0,
        hp: 0,
        mana: 0,
        magic: 0,
        crit: 0,
        dodge: 0,
        strength: 0,
        dexterity: 0,
        intellect: 0,
        vitality: 0,
        charisma: 0,
    };

    pub fn get(&self, kind: StatKind) -> i32 {
        match kind {
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Hp => self.hp,
            StatKind::Mana => self.mana,
            StatKind::Magic => self.magic,
            StatKind::Crit => self.crit,
            StatKind::Dodge => self.dodge,
            StatKind::Strength => self.strength,
            StatKind::Dexterity => self.dexterity,
            StatKind::Intellect => self.intellect,
            StatKind::Vitality => self.vitality,
            StatKind::Charisma => self.charisma,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: i32) {
        let slot = match kind {
            StatKind::Attack => &mut self.attack,
            StatKind::Defense => &mut self.defense,
            StatKind::Hp => &mut self.hp,
            StatKind::Mana => &mut self.mana,
            StatKind::Magic => &mut self.magic,
            StatKind::Crit => &mut self.crit,
            StatKind::Dodge => &mut self.dodge,
            StatKind::Strength => &mut self.strength,
            StatKind::Dexterity => &mut self.dexterity,
            StatKind::Intellect => &mut self.intellect,
            StatKind::Vitality => &mut self.vitality,
            StatKind::Charisma => &mut self.charisma,
        };
        *slot = value;
    }

    /// Attribute part of the block.
    pub fn attributes(&self) -> Attributes {
        Attributes::new(
            self.strength,
            self.dexterity,
            self.vitality,
            self.intellect,
            self.charisma,
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Add for StatBlock {
    type Output = Self;
    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl AddAssign for StatBlock {
    fn add_assign(&mut self, o: Self) {
        self.attack += o.attack;
        self.defense += o.defense;
        self.hp += o.hp;
        self.mana += o.mana;
        self.magic += o.magic;
        self.crit += o.crit;
        self.dodge += o.dodge;
        self.strength += o.strength;
        self.dexterity += o.dexterity;
        self.intellect += o.intellect;
        self.vitality += o.vitality;
        self.charisma += o.charisma;
    }
}

impl Add<StatBlock> for Attributes {
    type Output = Attributes;
    fn add(self, bonus: StatBlock) -> Attributes {
        Attributes {
            strength: self.strength + bonus.strength,
            dexterity: self.dexterity + bonus.dexterity,
            vitality: self.vitality + bonus.vitality,
            intellect: self.intellect + bonus.intellect,
            charisma: self.charisma + bonus.charisma,
        }
    }
}

impl<'a> std::iter::Sum<&'a StatBlock> for StatBlock {
    fn sum<I: Iterator<Item = &'a StatBlock>>(iter: I) -> Self {
        iter.fold(StatBlock::default(), |acc, b| acc + *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_set_roundtrip() {
        let mut block = StatBlock::default();
        block.set(StatKind::Magic, 12);
        block.set(StatKind::Charisma, -3);
        assert_eq!(block.get(StatKind::Magic), 12);
        assert_eq!(block.get(StatKind::Charisma), -3);
        assert_eq!(block.get(StatKind::Attack), 0);
    }

    #[test]
    fn test_sum_of_blocks() {
        let a = StatBlock { attack: 5, hp: 20, ..Default::default() };
        let b = StatBlock { attack: 3, defense: -5, ..Default::default() };
        let total: StatBlock = [a, b].iter().sum();
        assert_eq!(total.attack, 8);
        assert_eq!(total.defense, -5);
        assert_eq!(total.hp, 20);
    }

    #[test]
    fn test_attribute_bonus() {
        let base = Attributes::new(14, 10, 12, 6, 8);
        let bonus = StatBlock { dexterity: 5, ..Default::default() };
        assert_eq!((base + bonus).dexterity, 15);
        assert_eq!((base + bonus).strength, 14);
    }
}
