//! The player character, its inventory and equipment, and the mutators
//! that move items between them.
//!
//! Items are owned by exactly one place at a time: the inventory (keyed by
//! [`ItemId`]) or a single equipment slot. Equip and unequip are moves, never
//! copies, so an item cannot be duplicated or lost by an equipment change.
//!
//! Derived combat stats are always `class base + Σ equipped bonuses`; they are
//! recomputed on every equipment change and current hp/mana are clamped down
//! to the new maxima (never raised).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::actor::{clamp_hp, Actor};
use crate::classes::PlayerClass;
use crate::items::{ConsumableKind, EquipmentSlot, Item, ItemId, ItemType};
use crate::skills::{skill_by_id, Skill};
use crate::stats::{Attributes, StatBlock};
use crate::status::StatusEffect;

/// Flat gauge speed every character has before dexterity.
pub const PLAYER_BASE_SPEED: f64 = 8.0;
/// Gauge speed gained per point of dexterity.
pub const DEXTERITY_SPEED_FACTOR: f64 = 0.5;
/// Gold a new character starts with.
pub const STARTING_GOLD: u32 = 80;
/// XP needed to reach level 2.
pub const STARTING_XP_TO_NEXT: u32 = 100;
/// Growth of the XP threshold per level.
pub const XP_GROWTH: f64 = 1.5;

/// Unequipped items, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Item>", into = "Vec<Item>")]
pub struct Inventory {
    items: BTreeMap<ItemId, Item>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item. Returns a displaced item if the id was already present.
    pub fn insert(&mut self, item: Item) -> Option<Item> {
        self.items.insert(item.id, item)
    }

    /// Move an item out of the inventory.
    pub fn take(&mut self, id: ItemId) -> Option<Item> {
        self.items.remove(&id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// First consumable of the given kind, if any.
    pub fn find_consumable(&self, kind: ConsumableKind) -> Option<&Item> {
        self.iter()
            .find(|i| i.effect.map(|e| e.kind) == Some(kind))
    }
}

impl From<Vec<Item>> for Inventory {
    fn from(items: Vec<Item>) -> Self {
        Self {
            items: items.into_iter().map(|i| (i.id, i)).collect(),
        }
    }
}

impl From<Inventory> for Vec<Item> {
    fn from(inv: Inventory) -> Self {
        inv.items.into_values().collect()
    }
}

/// Equipped items, at most one per slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    pub helm: Option<Item>,
    pub chest: Option<Item>,
    pub gloves: Option<Item>,
    pub boots: Option<Item>,
    pub offhand: Option<Item>,
    pub amulet: Option<Item>,
    pub belt: Option<Item>,
    pub ring1: Option<Item>,
    pub ring2: Option<Item>,
    pub weapon: Option<Item>,
}

impl Equipment {
    pub fn get(&self, slot: EquipmentSlot) -> Option<&Item> {
        match slot {
            EquipmentSlot::Helm => self.helm.as_ref(),
            EquipmentSlot::Chest => self.chest.as_ref(),
            EquipmentSlot::Gloves => self.gloves.as_ref(),
            EquipmentSlot::Boots => self.boots.as_ref(),
            EquipmentSlot::Offhand => self.offhand.as_ref(),
            EquipmentSlot::Amulet => self.amulet.as_ref(),
            EquipmentSlot::Belt => self.belt.as_ref(),
            EquipmentSlot::Ring1 => self.ring1.as_ref(),
            EquipmentSlot::Ring2 => self.ring2.as_ref(),
            EquipmentSlot::Weapon => self.weapon.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: EquipmentSlot) -> &mut Option<Item> {
        match slot {
            EquipmentSlot::Helm => &mut self.helm,
            EquipmentSlot::Chest => &mut self.chest,
            EquipmentSlot::Gloves => &mut self.gloves,
            EquipmentSlot::Boots => &mut self.boots,
            EquipmentSlot::Offhand => &mut self.offhand,
            EquipmentSlot::Amulet => &mut self.amulet,
            EquipmentSlot::Belt => &mut self.belt,
            EquipmentSlot::Ring1 => &mut self.ring1,
            EquipmentSlot::Ring2 => &mut self.ring2,
            EquipmentSlot::Weapon => &mut self.weapon,
        }
    }

    /// Put `item` into `slot`, returning whatever was there.
    pub fn replace(&mut self, slot: EquipmentSlot, item: Item) -> Option<Item> {
        self.slot_mut(slot).replace(item)
    }

    pub fn take(&mut self, slot: EquipmentSlot) -> Option<Item> {
        self.slot_mut(slot).take()
    }

    pub fn is_empty(&self, slot: EquipmentSlot) -> bool {
        self.get(slot).is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EquipmentSlot, &Item)> {
        EquipmentSlot::ALL
            .into_iter()
            .filter_map(move |slot| self.get(slot).map(|item| (slot, item)))
    }

    /// Sum of every equipped item's bonuses.
    pub fn total_bonus(&self) -> StatBlock {
        self.iter().map(|(_, item)| &item.stats).sum()
    }
}

/// Class stats a character was created with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub hp: i32,
    pub mana: i32,
    pub attack: i32,
    pub magic: i32,
    pub defense: i32,
    pub crit: i32,
    pub attributes: Attributes,
}

impl BaseStats {
    pub fn for_class(class: PlayerClass) -> Self {
        let p = class.profile();
        Self {
            hp: p.hp,
            mana: p.mana,
            attack: p.attack,
            magic: p.magic,
            defense: p.defense,
            crit: p.crit,
            attributes: p.attributes,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub class: PlayerClass,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,
    pub base: BaseStats,

    // Derived (base + equipment), kept in sync by `recompute_stats`
    pub max_hp: i32,
    pub max_mana: i32,
    pub attack: i32,
    pub magic: i32,
    pub defense: i32,
    pub crit: i32,
    pub dodge: i32,
    pub attributes: Attributes,

    pub hp: f64,
    pub mana: f64,
    pub gold: u32,
    pub inventory: Inventory,
    pub equipment: Equipment,
    pub status_effects: Vec<StatusEffect>,
    pub skills: Vec<Skill>,
}

impl Character {
    /// A fresh level-1 character of `class` at full hp/mana.
    pub fn new(name: impl Into<String>, class: PlayerClass) -> Self {
        let base = BaseStats::for_class(class);
        let skills = class
            .profile()
            .skills
            .iter()
            .filter_map(|id| skill_by_id(id))
            .collect();

        let mut character = Self {
            name: name.into(),
            class,
            level: 1,
            xp: 0,
            xp_to_next: STARTING_XP_TO_NEXT,
            base,
            max_hp: base.hp,
            max_mana: base.mana,
            attack: base.attack,
            magic: base.magic,
            defense: base.defense,
            crit: base.crit,
            dodge: 0,
            attributes: base.attributes,
            hp: base.hp as f64,
            mana: base.mana as f64,
            gold: STARTING_GOLD,
            inventory: Inventory::new(),
            equipment: Equipment::default(),
            status_effects: Vec::new(),
            skills,
        };
        character.recompute_stats();
        character
    }

    /// Recompute derived stats from base + equipment and clamp hp/mana down.
    pub fn recompute_stats(&mut self) {
        let bonus = self.equipment.total_bonus();
        self.max_hp = (self.base.hp + bonus.hp).max(1);
        self.max_mana = (self.base.mana + bonus.mana).max(0);
        self.attack = self.base.attack + bonus.attack;
        self.magic = self.base.magic + bonus.magic;
        self.defense = self.base.defense + bonus.defense;
        self.crit = self.base.crit + bonus.crit;
        self.dodge = bonus.dodge;
        self.attributes = self.base.attributes + bonus;

        self.hp = self.hp.min(self.max_hp as f64);
        self.mana = self.mana.min(self.max_mana as f64);
    }

    /// Slot an item of `item_type` would go to when no slot is given.
    ///
    /// Rings take the first free ring slot; with both full, ring slot 1 is
    /// overwritten.
    pub fn auto_slot(&self, item_type: ItemType) -> Option<EquipmentSlot> {
        match item_type {
            ItemType::Ring => {
                if self.equipment.is_empty(EquipmentSlot::Ring1) {
                    Some(EquipmentSlot::Ring1)
                } else if self.equipment.is_empty(EquipmentSlot::Ring2) {
                    Some(EquipmentSlot::Ring2)
                } else {
                    Some(EquipmentSlot::Ring1)
                }
            }
            other => other.primary_slot(),
        }
    }

    /// Move an inventory item into an equipment slot.
    ///
    /// Any item already in the slot moves back to the inventory. Returns
    /// `false` (and changes nothing) if the item is missing, not equippable,
    /// restricted to another class, or does not fit the requested slot.
    pub fn equip(&mut self, id: ItemId, slot: Option<EquipmentSlot>) -> bool {
        let Some(item) = self.inventory.get(id) else {
            return false;
        };
        if !item.item_type.is_equippable() || !item.usable_by(self.class) {
            return false;
        }
        let slot = match slot {
            Some(slot) if item.item_type.fits(slot) => slot,
            Some(_) => return false,
            None => match self.auto_slot(item.item_type) {
                Some(slot) => slot,
                None => return false,
            },
        };

        let Some(item) = self.inventory.take(id) else {
            return false;
        };
        if let Some(previous) = self.equipment.replace(slot, item) {
            self.inventory.insert(previous);
        }
        self.recompute_stats();
        true
    }

    /// Move the item in `slot` back to the inventory. No-op on an empty slot.
    pub fn unequip(&mut self, slot: EquipmentSlot) -> bool {
        let Some(item) = self.equipment.take(slot) else {
            return false;
        };
        self.inventory.insert(item);
        self.recompute_stats();
        true
    }

    /// Drink a potion from the inventory, consuming exactly that instance.
    pub fn consume(&mut self, id: ItemId) -> bool {
        let Some(effect) = self.inventory.get(id).and_then(|i| i.effect) else {
            return false;
        };
        match effect.kind {
            ConsumableKind::Heal => self.heal(effect.amount as f64),
            ConsumableKind::Mana => self.restore_mana(effect.amount as f64),
        }
        self.inventory.take(id);
        true
    }

    pub fn restore_mana(&mut self, amount: f64) {
        self.mana = (self.mana + amount.max(0.0)).min(self.max_mana as f64);
    }

    /// Add XP and process every level-up it pays for.
    ///
    /// Each level subtracts the threshold and grows it by ×1.5. Any level-up
    /// fully restores hp/mana and clears status effects. Returns the number
    /// of levels gained.
    pub fn gain_xp(&mut self, amount: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        while self.xp_to_next > 0 && self.xp >= self.xp_to_next {
            self.level += 1;
            self.xp -= self.xp_to_next;
            self.xp_to_next = (self.xp_to_next as f64 * XP_GROWTH).floor() as u32;
            gained += 1;
        }
        if gained > 0 {
            self.hp = self.max_hp as f64;
            self.mana = self.max_mana as f64;
            self.status_effects.clear();
        }
        gained
    }

    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Forget every cooldown stamp (clock readings do not survive a reload).
    pub fn reset_cooldowns(&mut self) {
        for skill in &mut self.skills {
            skill.last_used_ms = None;
        }
    }
}

impl Actor for Character {
    fn hp(&self) -> f64 {
        self.hp
    }

    fn max_hp(&self) -> f64 {
        self.max_hp as f64
    }

    fn set_hp(&mut self, hp: f64) {
        self.hp = clamp_hp(hp, self.max_hp as f64);
    }

    fn attack_power(&self) -> f64 {
        self.attack as f64
    }

    fn magic_power(&self) -> f64 {
        self.magic as f64
    }

    fn defense(&self) -> f64 {
        self.defense as f64
    }

    fn base_speed(&self) -> f64 {
        PLAYER_BASE_SPEED + self.attributes.dexterity as f64 * DEXTERITY_SPEED_FACTOR
    }

    fn effects(&self) -> &[StatusEffect] {
        &self.status_effects
    }

    fn effects_mut(&mut self) -> &mut Vec<StatusEffect> {
        &mut self.status_effects
    }
}
