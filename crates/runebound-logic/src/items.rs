//! Items, rarity tiers and equipment slots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classes::PlayerClass;
use crate::stats::StatBlock;

/// Stable item identity, unique across a character's inventory and equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012x}", self.0)
    }
}

/// Rarity tiers, ordered COMMON < UNCOMMON < RARE < LEGENDARY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Uncommon => "uncommon",
            Rarity::Rare => "rare",
            Rarity::Legendary => "legendary",
        }
    }
}

/// What kind of thing an item is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Helm,
    Chest,
    Gloves,
    Boots,
    Offhand,
    Amulet,
    Belt,
    Ring,
    Weapon,
    Potion,
}

impl ItemType {
    /// Natural slot for this item type. Rings map to the first ring slot;
    /// see `Character::equip` for the two-slot rule.
    pub fn primary_slot(self) -> Option<EquipmentSlot> {
        match self {
            ItemType::Helm => Some(EquipmentSlot::Helm),
            ItemType::Chest => Some(EquipmentSlot::Chest),
            ItemType::Gloves => Some(EquipmentSlot::Gloves),
            ItemType::Boots => Some(EquipmentSlot::Boots),
            ItemType::Offhand => Some(EquipmentSlot::Offhand),
            ItemType::Amulet => Some(EquipmentSlot::Amulet),
            ItemType::Belt => Some(EquipmentSlot::Belt),
            ItemType::Ring => Some(EquipmentSlot::Ring1),
            ItemType::Weapon => Some(EquipmentSlot::Weapon),
            ItemType::Potion => None,
        }
    }

    /// Can an item of this type sit in `slot`?
    pub fn fits(self, slot: EquipmentSlot) -> bool {
        match self {
            ItemType::Ring => matches!(slot, EquipmentSlot::Ring1 | EquipmentSlot::Ring2),
            other => other.primary_slot() == Some(slot),
        }
    }

    pub fn is_equippable(self) -> bool {
        self != ItemType::Potion
    }
}

/// One slot per equipment category; rings get two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EquipmentSlot {
    Helm,
    Chest,
    Gloves,
    Boots,
    Offhand,
    Amulet,
    Belt,
    Ring1,
    Ring2,
    Weapon,
}

impl EquipmentSlot {
    pub const ALL: [EquipmentSlot; 10] = [
        EquipmentSlot::Helm,
        EquipmentSlot::Chest,
        EquipmentSlot::Gloves,
        EquipmentSlot::Boots,
        EquipmentSlot::Offhand,
        EquipmentSlot::Amulet,
        EquipmentSlot::Belt,
        EquipmentSlot::Ring1,
        EquipmentSlot::Ring2,
        EquipmentSlot::Weapon,
    ];
}

/// Armor weight class. Non-armor items use `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArmorWeight {
    Light,
    Medium,
    Heavy,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumableKind {
    Heal,
    Mana,
}

/// Effect of drinking a potion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumableEffect {
    pub kind: ConsumableKind,
    pub amount: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub rarity: Rarity,
    /// Gold value (also the merchant price)
    pub value: u32,
    pub description: String,
    pub weight: ArmorWeight,
    /// Empty means any class may equip it
    pub class_restrictions: Vec<PlayerClass>,
    pub stats: StatBlock,
    pub effect: Option<ConsumableEffect>,
}

impl Item {
    pub fn is_consumable(&self) -> bool {
        self.effect.is_some()
    }

    /// Whether `class` is allowed to equip this item.
    pub fn usable_by(&self, class: PlayerClass) -> bool {
        self.class_restrictions.is_empty() || self.class_restrictions.contains(&class)
    }
}
