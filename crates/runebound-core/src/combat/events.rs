//! What the combat engine reports back to its caller.

use runebound_logic::items::ItemId;
use runebound_logic::status::StatusKind;
use serde::{Deserialize, Serialize};

/// One of the two combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Enemy,
}

/// Encounter state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatPhase {
    #[default]
    Idle,
    Active,
    PlayerDefeated,
    EnemyDefeated,
}

/// Rewards granted once when an enemy falls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VictoryReport {
    pub enemy_name: String,
    pub xp: u32,
    pub gold: u32,
    pub loot: Vec<ItemId>,
    pub levels_gained: u32,
    pub new_level: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    StatusDamage { side: Side, amount: f64 },
    StatusHealing { side: Side, amount: f64 },
    Attack { attacker: Side, damage: f64 },
    Victory(VictoryReport),
    Defeat,
}

/// Per-frame snapshot for display. Produced every active frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub phase: CombatPhase,
    pub player_hp: f64,
    pub player_max_hp: f64,
    pub enemy_hp: f64,
    pub enemy_max_hp: f64,
    pub player_gauge: f64,
    pub enemy_gauge: f64,
    pub events: Vec<CombatEvent>,
}

impl FrameReport {
    pub fn victory(&self) -> Option<&VictoryReport> {
        self.events.iter().find_map(|e| match e {
            CombatEvent::Victory(v) => Some(v),
            _ => None,
        })
    }

    pub fn is_defeat(&self) -> bool {
        self.events.iter().any(|e| matches!(e, CombatEvent::Defeat))
    }
}

/// Result of an accepted skill cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillCast {
    pub skill_id: String,
    pub damage: f64,
    pub applied: Option<StatusKind>,
    pub mana_restored: f64,
    pub victory: Option<VictoryReport>,
}
