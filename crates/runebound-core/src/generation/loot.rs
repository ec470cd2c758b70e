//! Loot generation: potions, procedural gear with affixes, and uniques.
//!
//! Item composition follows a fixed pipeline:
//! 1. Potion check (20%): tier from depth, amount from tier
//! 2. Rarity roll, biased by depth and boss source
//! 3. Category roll: weapon / armor / accessory / shield
//! 4. Base stats from `(3 + 1.5·depth) × rarity multiplier`
//! 5. Optional prefix and suffix affixes, which may raise rarity
//!
//! Any single drop may instead be replaced by a hand-authored unique.

use rand::Rng;
use serde::{Deserialize, Serialize};

use runebound_logic::classes::PlayerClass;
use runebound_logic::items::{
    ArmorWeight, ConsumableEffect, ConsumableKind, Item, ItemId, ItemType, Rarity,
};
use runebound_logic::stats::{StatBlock, StatKind};

use super::vocab::pick;

/// Where a loot roll comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LootSource {
    Enemy,
    Chest,
    Boss,
    Merchant,
}

/// Anything that can produce a loot drop. The combat engine calls this on
/// victory; tests plug in a fixed table.
pub trait LootRoller {
    fn roll(&mut self, depth: u32, source: LootSource) -> Vec<Item>;
}

/// The procedural generator behind its own rng.
#[derive(Debug, Clone)]
pub struct ProceduralLoot<R: Rng> {
    rng: R,
}

impl<R: Rng> ProceduralLoot<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> LootRoller for ProceduralLoot<R> {
    fn roll(&mut self, depth: u32, source: LootSource) -> Vec<Item> {
        generate_loot(&mut self.rng, depth, source)
    }
}

const POTION_CHANCE: f64 = 0.2;
const ENEMY_DROP_CHANCE: f64 = 0.4;
const BOSS_UNIQUE_CHANCE: f64 = 0.15;

/// Roll a full drop for `source` at `depth`.
pub fn generate_loot(rng: &mut impl Rng, depth: u32, source: LootSource) -> Vec<Item> {
    let count = match source {
        LootSource::Boss => rng.gen_range(2..=4),
        LootSource::Chest => rng.gen_range(1..=2),
        LootSource::Merchant => 4,
        LootSource::Enemy => usize::from(rng.gen_bool(ENEMY_DROP_CHANCE)),
    };

    let unique_chance = match source {
        LootSource::Boss => BOSS_UNIQUE_CHANCE,
        _ => 0.02 + depth as f64 * 0.005,
    };

    (0..count)
        .map(|_| {
            if rng.gen::<f64>() < unique_chance {
                generate_unique(rng, depth)
            } else {
                generate_item(rng, depth, source)
            }
        })
        .collect()
}

/// Fresh random id. 48 bits keeps the hex form short.
pub fn new_item_id(rng: &mut impl Rng) -> ItemId {
    ItemId(rng.gen::<u64>() & 0xffff_ffff_ffff)
}

/// One procedural item (potion or gear).
pub fn generate_item(rng: &mut impl Rng, depth: u32, source: LootSource) -> Item {
    if rng.gen::<f64>() < POTION_CHANCE {
        return generate_potion(rng, depth);
    }
    generate_gear(rng, depth, source)
}

/// Potion tier 1..=3 grows every three levels of depth.
pub fn generate_potion(rng: &mut impl Rng, depth: u32) -> Item {
    let heal = rng.gen::<f64>() > 0.5;
    let tier = (depth / 3 + 1).min(3);
    let size = match tier {
        1 => "Minor",
        2 => "Regular",
        _ => "Greater",
    };
    let amount = tier as i32 * 40;
    let (kind, what, resource) = if heal {
        (ConsumableKind::Heal, "Health", "HP")
    } else {
        (ConsumableKind::Mana, "Mana", "Mana")
    };

    Item {
        id: new_item_id(rng),
        name: format!("{} {} Potion", size, what),
        item_type: ItemType::Potion,
        rarity: Rarity::Common,
        value: 15 * tier,
        description: format!("Restores {} {}.", amount, resource),
        weight: ArmorWeight::None,
        class_restrictions: Vec::new(),
        stats: StatBlock::ZERO,
        effect: Some(ConsumableEffect { kind, amount }),
    }
}

fn generate_gear(rng: &mut impl Rng, depth: u32, source: LootSource) -> Item {
    let d = depth as f64;

    // Rarity
    let boss_bonus = if source == LootSource::Boss { 0.3 } else { 0.0 };
    let rarity_roll = rng.gen::<f64>() + d * 0.05 + boss_bonus;
    let (mut rarity, stat_mult, affix_count) = if rarity_roll > 0.98 {
        (Rarity::Legendary, 3.0, 2)
    } else if rarity_roll > 0.8 {
        (Rarity::Rare, 2.0, 2)
    } else if rarity_roll > 0.5 {
        (Rarity::Uncommon, 1.5, 1)
    } else {
        (Rarity::Common, 1.0, 0)
    };

    let base = ((3.0 + d * 1.5) * stat_mult).floor() as i32;
    let mut stats = StatBlock::ZERO;
    let mut weight = ArmorWeight::None;
    let mut class_restrictions = Vec::new();

    // Category
    let slot_roll = rng.gen::<f64>();
    let (item_type, base_name) = if slot_roll < 0.3 {
        let class = PlayerClass::ALL[rng.gen_range(0..PlayerClass::ALL.len())];
        class_restrictions.push(class);
        stats.attack = base * 2;
        (ItemType::Weapon, pick(rng, weapon_names(class)))
    } else if slot_roll < 0.7 {
        let item_type = ARMOR_TYPES[rng.gen_range(0..ARMOR_TYPES.len())];
        let weight_roll = rng.gen::<f64>();
        weight = if weight_roll < 0.33 {
            stats.defense = (base as f64 * 0.5).floor() as i32;
            stats.dodge = (base as f64 * 0.2).floor() as i32;
            ArmorWeight::Light
        } else if weight_roll < 0.66 {
            stats.defense = (base as f64 * 0.8).floor() as i32;
            stats.hp = base * 2;
            ArmorWeight::Medium
        } else {
            stats.defense = (base as f64 * 1.2).floor() as i32;
            ArmorWeight::Heavy
        };
        (item_type, pick(rng, armor_names(weight, item_type)))
    } else if slot_roll < 0.9 {
        let item_type = ACCESSORY_TYPES[rng.gen_range(0..ACCESSORY_TYPES.len())];
        let name = match item_type {
            ItemType::Amulet => {
                stats.intellect = (base as f64 * 0.3).floor() as i32;
                pick(rng, AMULET_NAMES)
            }
            ItemType::Belt => {
                stats.vitality = (base as f64 * 0.3).floor() as i32;
                pick(rng, BELT_NAMES)
            }
            _ => {
                stats.crit = rng.gen_range(1..=2);
                pick(rng, RING_NAMES)
            }
        };
        (item_type, name)
    } else {
        stats.defense = base;
        (ItemType::Offhand, "Shield")
    };

    // Affixes
    let mut name = base_name.to_string();
    let mut prefixed = false;
    if affix_count > 0 && rng.gen::<f64>() > 0.3 {
        let eligible: Vec<&Affix> = PREFIXES
            .iter()
            .filter(|p| p.rarity == Rarity::Common || rarity != Rarity::Common)
            .collect();
        let prefix = eligible[rng.gen_range(0..eligible.len())];
        name = format!("{} {}", prefix.name, name);
        apply_prefix(&mut stats, prefix, base);
        rarity = rarity.max(prefix.rarity);
        prefixed = true;
    }
    if affix_count > 1 || (affix_count == 1 && !prefixed) {
        let eligible: Vec<&Affix> = SUFFIXES
            .iter()
            .filter(|s| s.rarity == Rarity::Common || rarity != Rarity::Common)
            .collect();
        let suffix = eligible[rng.gen_range(0..eligible.len())];
        name = format!("{} {}", name, suffix.name);
        let current = stats.get(suffix.stat);
        stats.set(suffix.stat, current + suffix.modifier as i32);
        rarity = rarity.max(suffix.rarity);
    }

    Item {
        id: new_item_id(rng),
        name,
        item_type,
        rarity,
        value: (base as f64 * 10.0).floor().max(0.0) as u32,
        description: format!("A {} item.", rarity.label()),
        weight,
        class_restrictions,
        stats,
        effect: None,
    }
}

/// Flat prefixes add; scaling prefixes multiply an existing stat or seed a
/// missing one at 30% of base.
fn apply_prefix(stats: &mut StatBlock, prefix: &Affix, base: i32) {
    let current = stats.get(prefix.stat);
    let next = if prefix.flat {
        current + prefix.modifier as i32
    } else if current > 0 {
        (current as f64 * prefix.modifier).floor() as i32
    } else {
        (base as f64 * 0.3).floor() as i32
    };
    stats.set(prefix.stat, next);
}

/// A hand-authored unique, always legendary.
pub fn generate_unique(rng: &mut impl Rng, depth: u32) -> Item {
    let template = &UNIQUE_ITEMS[rng.gen_range(0..UNIQUE_ITEMS.len())];
    Item {
        id: new_item_id(rng),
        name: template.name.to_string(),
        item_type: template.item_type,
        rarity: Rarity::Legendary,
        value: 200 + 50 * depth,
        description: template.description.to_string(),
        weight: ArmorWeight::None,
        class_restrictions: Vec::new(),
        stats: template.stats,
        effect: None,
    }
}

// ── Tables ─────────────────────────────────────────────────────────────

struct Affix {
    name: &'static str,
    stat: StatKind,
    modifier: f64,
    flat: bool,
    rarity: Rarity,
}

const fn affix(name: &'static str, stat: StatKind, modifier: f64, rarity: Rarity) -> Affix {
    Affix {
        name,
        stat,
        modifier,
        flat: false,
        rarity,
    }
}

static PREFIXES: &[Affix] = &[
    affix("Broken", StatKind::Attack, 0.5, Rarity::Common),
    affix("Rusted", StatKind::Defense, 0.6, Rarity::Common),
    affix("Dull", StatKind::Attack, 0.8, Rarity::Common),
    affix("Iron", StatKind::Defense, 1.0, Rarity::Common),
    affix("Steel", StatKind::Attack, 1.1, Rarity::Uncommon),
    affix("Reinforced", StatKind::Defense, 1.2, Rarity::Uncommon),
    affix("Serrated", StatKind::Attack, 1.2, Rarity::Uncommon),
    affix("Hardened", StatKind::Defense, 1.3, Rarity::Rare),
    affix("Mithril", StatKind::Magic, 1.3, Rarity::Rare),
    affix("Adamant", StatKind::Defense, 1.5, Rarity::Rare),
    affix("Void-Forged", StatKind::Attack, 1.6, Rarity::Legendary),
    affix("Divine", StatKind::Magic, 1.6, Rarity::Legendary),
    Affix {
        name: "Runebound",
        stat: StatKind::Mana,
        modifier: 20.0,
        flat: true,
        rarity: Rarity::Rare,
    },
];

// Suffixes always add their modifier
static SUFFIXES: &[Affix] = &[
    affix("of the Bear", StatKind::Vitality, 2.0, Rarity::Uncommon),
    affix("of the Owl", StatKind::Intellect, 2.0, Rarity::Uncommon),
    affix("of the Wolf", StatKind::Dexterity, 2.0, Rarity::Uncommon),
    affix("of the Bull", StatKind::Strength, 2.0, Rarity::Uncommon),
    affix("of Vitality", StatKind::Hp, 20.0, Rarity::Common),
    affix("of Power", StatKind::Attack, 3.0, Rarity::Rare),
    affix("of Swiftness", StatKind::Crit, 2.0, Rarity::Rare),
    affix("of the Void", StatKind::Magic, 4.0, Rarity::Legendary),
    affix("of Kings", StatKind::Charisma, 3.0, Rarity::Rare),
];

struct UniqueTemplate {
    name: &'static str,
    item_type: ItemType,
    description: &'static str,
    stats: StatBlock,
}

static UNIQUE_ITEMS: &[UniqueTemplate] = &[
    UniqueTemplate {
        name: "Widowmaker",
        item_type: ItemType::Weapon,
        description: "A crimson blade that seems to weep blood.",
        stats: StatBlock {
            attack: 45,
            crit: 10,
            strength: 5,
            ..StatBlock::ZERO
        },
    },
    UniqueTemplate {
        name: "Aegis of the Immortals",
        item_type: ItemType::Offhand,
        description: "A shield polished to a mirror sheen, deflecting fate itself.",
        stats: StatBlock {
            defense: 30,
            hp: 100,
            vitality: 8,
            ..StatBlock::ZERO
        },
    },
    UniqueTemplate {
        name: "Crown of Madness",
        item_type: ItemType::Helm,
        description: "Whispers fill the mind of whoever wears this jagged circlet.",
        stats: StatBlock {
            magic: 25,
            intellect: 10,
            mana: 50,
            defense: -5,
            ..StatBlock::ZERO
        },
    },
    UniqueTemplate {
        name: "Boots of Haste",
        item_type: ItemType::Boots,
        description: "You feel lighter on your feet.",
        stats: StatBlock {
            dexterity: 5,
            dodge: 10,
            defense: 5,
            ..StatBlock::ZERO
        },
    },
    UniqueTemplate {
        name: "Ring of Greed",
        item_type: ItemType::Ring,
        description: "A gold band that feels heavy.",
        stats: StatBlock {
            charisma: 5,
            crit: 2,
            ..StatBlock::ZERO
        },
    },
    UniqueTemplate {
        name: "Tome of Lost Knowledge",
        item_type: ItemType::Offhand,
        description: "Pages filled with shifting runes.",
        stats: StatBlock {
            magic: 15,
            intellect: 8,
            mana: 30,
            ..StatBlock::ZERO
        },
    },
];

static ARMOR_TYPES: [ItemType; 4] = [ItemType::Helm, ItemType::Chest, ItemType::Gloves, ItemType::Boots];
static ACCESSORY_TYPES: [ItemType; 3] = [ItemType::Amulet, ItemType::Belt, ItemType::Ring];

fn armor_names(weight: ArmorWeight, item_type: ItemType) -> &'static [&'static str] {
    match (weight, item_type) {
        (ArmorWeight::Light, ItemType::Helm) => &["Hood", "Cap", "Mask", "Cowl"],
        (ArmorWeight::Light, ItemType::Chest) => &["Tunic", "Vest", "Jerkin", "Robes"],
        (ArmorWeight::Light, ItemType::Gloves) => &["Wraps", "Gloves", "Handguards"],
        (ArmorWeight::Light, _) => &["Sandals", "Shoes", "Boots", "Walkers"],
        (ArmorWeight::Medium, ItemType::Helm) => &["Coif", "Sallet", "Helm"],
        (ArmorWeight::Medium, ItemType::Chest) => &["Chainmail", "Brigandine", "Scale"],
        (ArmorWeight::Medium, ItemType::Gloves) => &["Vambraces", "Mitts"],
        (ArmorWeight::Medium, _) => &["Greaves", "Striders"],
        (_, ItemType::Helm) => &["Greathelm", "Visor", "Bascinet"],
        (_, ItemType::Chest) => &["Plate", "Cuirass", "Breastplate"],
        (_, ItemType::Gloves) => &["Gauntlets", "Fists"],
        (_, _) => &["Sabatons", "Iron Boots"],
    }
}

fn weapon_names(class: PlayerClass) -> &'static [&'static str] {
    match class {
        PlayerClass::Warrior => &["Longsword", "Broadsword", "Mace", "Waraxe"],
        PlayerClass::Barbarian => &["Greataxe", "Maul", "Zweihander", "Club"],
        PlayerClass::Mage => &["Staff", "Wand", "Scepter", "Rod"],
        PlayerClass::Cleric => &["Morningstar", "Hammer", "Censer", "Staff"],
        PlayerClass::Rogue => &["Dagger", "Kris", "Shortsword", "Kukri"],
        PlayerClass::Archer => &["Shortbow", "Longbow", "Crossbow", "Recurve"],
    }
}

static AMULET_NAMES: &[&str] = &["Amulet", "Pendant", "Necklace", "Talisman", "Charm"];
static BELT_NAMES: &[&str] = &["Belt", "Sash", "Girdle", "Cinch", "Waistguard"];
static RING_NAMES: &[&str] = &["Ring", "Band", "Signet", "Loop", "Coil"];
