//! Runebound Core - Dungeon Crawl Engine
//!
//! A real-time dungeon crawler: the player explores a grid of procedurally
//! generated rooms and fights enemies in Active-Time-Battle combat, where
//! each side's gauge fills with speed and fires an attack when full.
//!
//! # Architecture
//!
//! The rules live in `runebound-logic`; this crate drives them:
//! - **Components**: Rooms, exits, encounters and enemies
//! - **Generation**: Seeded procedural rooms, enemies and loot
//! - **Combat**: The frame-driven ATB state machine and skill casting
//! - **Engine**: [`GameSession`](engine::GameSession), the command surface for one run
//! - **Persistence**: Versioned saves, per-user stores and debounced auto-save
//!
//! # Example
//!
//! ```rust,no_run
//! use runebound_core::prelude::*;
//! use runebound_logic::classes::PlayerClass;
//!
//! let mut session = GameSession::new(SessionConfig::default());
//! session.create_character("Ayla", PlayerClass::Mage);
//!
//! let exit = session.current_room().unwrap().choices[0].direction;
//! session.travel(exit).unwrap();
//!
//! // Drive combat from the display loop
//! while session.in_combat() {
//!     session.frame();
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! ```

pub mod clock;
pub mod combat;
pub mod components;
pub mod config;
pub mod engine;
pub mod generation;
pub mod persistence;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::combat::{CombatEvent, CombatPhase, FrameReport, SkillCast, VictoryReport};
    pub use crate::components::*;
    pub use crate::config::{CombatConfig, SessionConfig};
    pub use crate::engine::{Arrival, GameSession, Interaction, SessionError};
    pub use crate::persistence::{FileStore, MemoryStore, SaveData, SaveStore};
}
