//! Pure rules for Runebound.
//!
//! Everything in this crate is plain data and deterministic functions. No
//! clocks, no I/O; randomness is always passed in as `&mut impl Rng`. The
//! session engine in `runebound-core` drives these rules frame by frame.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`actor`] | Shared hp/stat/effect shape for the player and enemies |
//! | [`character`] | Player character, inventory, equipment, XP and levels |
//! | [`classes`] | The six playable classes and their base stats |
//! | [`damage`] | Damage formula and variance roll |
//! | [`items`] | Items, rarity tiers, equipment slots, potions |
//! | [`skills`] | Skill costs, cooldowns, and the skill library |
//! | [`stats`] | Primary attributes and additive stat blocks |
//! | [`status`] | Timed status effects and the per-frame status processor |

pub mod actor;
pub mod character;
pub mod classes;
pub mod damage;
pub mod items;
pub mod skills;
pub mod stats;
pub mod status;
