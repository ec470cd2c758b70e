//! Data types owned by the engine: rooms, paths and enemies.

mod enemy;
mod room;

pub use enemy::*;
pub use room::*;
