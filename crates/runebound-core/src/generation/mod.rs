//! Generation - procedural creation of rooms, enemies and loot

mod enemies;
mod loot;
mod rooms;
pub mod vocab;

pub use enemies::*;
pub use loot::*;
pub use rooms::*;
