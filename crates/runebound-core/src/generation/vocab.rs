//! Word pools for room titles, flavor text and enemy names

use rand::Rng;

/// Pick one entry from a non-empty static pool.
pub fn pick<'a>(rng: &mut impl Rng, pool: &[&'a str]) -> &'a str {
    pool[rng.gen_range(0..pool.len())]
}

pub static BIOMES: &[&str] = &[
    "Whispering Crypts",
    "Iron Spires of Aethelgard",
    "Sanguine Halls",
    "Void Rift Delta",
    "Cursed Library of Irem",
    "Infernal Foundations",
];

pub static ROOM_ADJECTIVES: &[&str] = &[
    "Dark",
    "Ancient",
    "Crumbling",
    "Whispering",
    "Forgotten",
    "Bloodstained",
    "Silent",
    "Echoing",
    "Frozen",
    "Burning",
    "Cursed",
    "Hollow",
    "Shattered",
    "Abyssal",
    "Mossy",
    "Iron",
    "Obsidian",
    "Spectral",
    "Venomous",
    "Gilded",
    "Hidden",
    "Opulent",
];

pub static ROOM_NOUNS: &[&str] = &[
    "Chamber",
    "Hall",
    "Corridor",
    "Crypt",
    "Sanctum",
    "Passage",
    "Oubliette",
    "Archives",
    "Vault",
    "Bridge",
    "Atrium",
    "Dungeon",
    "Catacomb",
    "Prison",
    "Gallery",
    "Nave",
    "Cloister",
    "Sepulcher",
    "Market",
    "Alcove",
    "Study",
];

pub static ROOM_FLAVOR: &[&str] = &[
    "The air is thick with the metallic scent of old blood.",
    "Dust motes dance in the pale light of a single flickering torch.",
    "You hear the distant scratching of claws against stone.",
    "A cold draft chills you to the bone, carrying whispers of the dead.",
    "Shadows seem to lengthen and grasp at your feet as you walk.",
    "Ancient runes glow faintly on the walls, pulsing with a sick light.",
    "The silence here is oppressive, heavy like a physical weight.",
    "Water drips rhythmically from the ceiling, echoing in the darkness.",
    "Bones litter the floor, remnants of those who came before.",
    "A strange violet mist clings to the ground.",
    "Tattered tapestries depicting forgotten wars hang from the walls.",
    "The smell of incense and rot mingles in the air.",
];

pub static MERCHANT_FLAVOR: &[&str] = &[
    "A hooded figure sits by a campfire, wares spread on a rug.",
    "A goblin merchant grins, displaying gold teeth and strange potions.",
    "An ethereal spirit offers spectral goods for a price.",
    "A wandering blacksmith sharpens a blade, nodding as you approach.",
];

pub static SECRET_FLAVOR: &[&str] = &[
    "A draft from behind a bookshelf reveals a hidden passage.",
    "You notice the mortar on this wall is fresh. A loose brick gives way.",
    "Illusionary magic fades, revealing a door where none stood before.",
    "A false floor panel clicks beneath your boot.",
];

pub static PUZZLE_FLAVOR: &[&str] = &[
    "A massive stone door stands shut, lacking a keyhole but covered in movable tiles.",
    "Statues line the walls, their heads turned in different directions.",
    "A pool of water reflects a constellation that does not exist in the sky.",
    "Runes carved into the floor glow when stepped on in sequence.",
];

pub const TREASURE_DESCRIPTION: &str = "A magnificent chest sits in the center of the room.";
pub const TRAP_DESCRIPTION: &str = "The floor here is uneven, and small holes line the walls.";

pub const ENTRANCE_TITLE: &str = "Entrance Hall";
pub const ENTRANCE_DESCRIPTION: &str =
    "The heavy doors slam shut behind you. There is no turning back.";

pub static PATH_DESCRIPTIONS: &[&str] = &[
    "A narrow passage winding into gloom.",
    "A heavy iron door, slightly ajar and creaking.",
    "A crumbling archway leading into darkness.",
    "A well-lit corridor with strange markings.",
    "A steep staircase ascending into mist.",
    "A rough-hewn tunnel that smells of sulfur.",
    "A grand doorway flanked by gargoyles.",
    "A path slick with moss and water.",
    "A corridor echoing with distant chimes.",
];

pub static ENEMY_PREFIXES: &[&str] = &[
    "Cursed",
    "Feral",
    "Undead",
    "Void",
    "Armored",
    "Skeletal",
    "Ragebound",
    "Shadow",
    "Plague",
    "Infernal",
    "Elite",
];

pub static ENEMY_SPECIES: &[&str] = &[
    "Skeleton",
    "Spider",
    "Cultist",
    "Rat",
    "Golem",
    "Wraith",
    "Bandit",
    "Horror",
    "Knight",
    "Beast",
    "Sorcerer",
];
