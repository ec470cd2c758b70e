//! Player skills: costs, cooldowns, and the static skill library.
//!
//! A skill is usable only when the caster has at least its mana cost and
//! its cooldown has fully elapsed since it was last used. A skill that has
//! never been used is ready immediately.

use serde::{Deserialize, Serialize};

use crate::status::StatusKind;

/// Which stat a skill scales its damage from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingStat {
    Attack,
    Magic,
}

/// Who the skill lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillTarget {
    Enemy,
    /// Utility archetype: restores mana and cleanses the caster
    Caster,
}

/// Status effect a skill may apply on hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OnHitEffect {
    pub kind: StatusKind,
    pub duration_ms: f64,
    pub magnitude: f64,
    /// Probability in [0, 1]
    pub chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    pub description: String,
    pub mana_cost: f64,
    pub cooldown_ms: u64,
    pub damage_mult: f64,
    pub scaling: ScalingStat,
    pub target: SkillTarget,
    pub on_hit: Option<OnHitEffect>,
    /// Clock reading (ms) of the last successful cast
    pub last_used_ms: Option<u64>,
}

impl Skill {
    /// Milliseconds left on the cooldown at `now_ms`.
    pub fn cooldown_remaining(&self, now_ms: u64) -> u64 {
        match self.last_used_ms {
            None => 0,
            Some(last) => {
                let elapsed = now_ms.saturating_sub(last);
                self.cooldown_ms.saturating_sub(elapsed)
            }
        }
    }

    pub fn is_ready(&self, now_ms: u64) -> bool {
        match self.last_used_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.cooldown_ms,
        }
    }

    /// Mana and cooldown gate.
    pub fn can_cast(&self, mana: f64, now_ms: u64) -> bool {
        mana >= self.mana_cost && self.is_ready(now_ms)
    }

    /// Zero-multiplier self-target skills skip the enemy entirely.
    pub fn is_self_cast(&self) -> bool {
        self.target == SkillTarget::Caster && self.damage_mult == 0.0
    }
}

struct SkillSpec {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    mana_cost: f64,
    cooldown_ms: u64,
    damage_mult: f64,
    scaling: ScalingStat,
    target: SkillTarget,
    on_hit: Option<OnHitEffect>,
}

const fn on_hit(kind: StatusKind, duration_ms: f64, magnitude: f64, chance: f64) -> Option<OnHitEffect> {
    Some(OnHitEffect {
        kind,
        duration_ms,
        magnitude,
        chance,
    })
}

static SKILL_LIBRARY: &[SkillSpec] = &[
    SkillSpec {
        id: "strike",
        name: "Runic Strike",
        description: "A focused mana-infused blow.",
        mana_cost: 8.0,
        cooldown_ms: 3500,
        damage_mult: 1.6,
        scaling: ScalingStat::Attack,
        target: SkillTarget::Enemy,
        on_hit: None,
    },
    SkillSpec {
        id: "bash",
        name: "Shield Bash",
        description: "Slams the enemy, possibly stunning them.",
        mana_cost: 15.0,
        cooldown_ms: 8000,
        damage_mult: 1.2,
        scaling: ScalingStat::Attack,
        target: SkillTarget::Enemy,
        on_hit: on_hit(StatusKind::Stun, 2500.0, 1.0, 0.6),
    },
    SkillSpec {
        id: "poison_tip",
        name: "Venom Blade",
        description: "Coats weapon in poison.",
        mana_cost: 12.0,
        cooldown_ms: 6000,
        damage_mult: 1.1,
        scaling: ScalingStat::Attack,
        target: SkillTarget::Enemy,
        on_hit: on_hit(StatusKind::Poison, 8000.0, 5.0, 1.0),
    },
    SkillSpec {
        id: "nova",
        name: "Spirit Nova",
        description: "Explosive mana release.",
        mana_cost: 22.0,
        cooldown_ms: 9000,
        damage_mult: 2.4,
        scaling: ScalingStat::Magic,
        target: SkillTarget::Enemy,
        on_hit: on_hit(StatusKind::Burn, 4000.0, 8.0, 0.5),
    },
    SkillSpec {
        id: "freeze",
        name: "Glacial Spike",
        description: "Chills the enemy, slowing their actions.",
        mana_cost: 18.0,
        cooldown_ms: 7000,
        damage_mult: 1.8,
        scaling: ScalingStat::Magic,
        target: SkillTarget::Enemy,
        on_hit: on_hit(StatusKind::Slow, 6000.0, 0.5, 0.8),
    },
    SkillSpec {
        id: "smite",
        name: "Holy Smite",
        description: "Calls down light to burn the wicked.",
        mana_cost: 15.0,
        cooldown_ms: 5000,
        damage_mult: 1.9,
        scaling: ScalingStat::Magic,
        target: SkillTarget::Enemy,
        on_hit: on_hit(StatusKind::Burn, 3000.0, 10.0, 0.4),
    },
    SkillSpec {
        id: "enrage",
        name: "Furious Blow",
        description: "A reckless attack that ignores pain.",
        mana_cost: 10.0,
        cooldown_ms: 4000,
        damage_mult: 2.2,
        scaling: ScalingStat::Attack,
        target: SkillTarget::Enemy,
        on_hit: None,
    },
    SkillSpec {
        id: "cripple",
        name: "Leg Shot",
        description: "Aims for mobility to slow the target.",
        mana_cost: 12.0,
        cooldown_ms: 6000,
        damage_mult: 1.4,
        scaling: ScalingStat::Attack,
        target: SkillTarget::Enemy,
        on_hit: on_hit(StatusKind::Slow, 5000.0, 0.4, 1.0),
    },
    SkillSpec {
        id: "ward",
        name: "Runic Ward",
        description: "Restores mana instantly and clears effects.",
        mana_cost: 0.0,
        cooldown_ms: 15000,
        damage_mult: 0.0,
        scaling: ScalingStat::Magic,
        target: SkillTarget::Caster,
        on_hit: None,
    },
];

/// Look up a skill by id, returning a fresh (never used) copy.
pub fn skill_by_id(id: &str) -> Option<Skill> {
    SKILL_LIBRARY.iter().find(|s| s.id == id).map(|s| Skill {
        id: s.id.to_string(),
        name: s.name.to_string(),
        description: s.description.to_string(),
        mana_cost: s.mana_cost,
        cooldown_ms: s.cooldown_ms,
        damage_mult: s.damage_mult,
        scaling: s.scaling,
        target: s.target,
        on_hit: s.on_hit,
        last_used_ms: None,
    })
}

/// Ids of every skill in the library.
pub fn skill_ids() -> impl Iterator<Item = &'static str> {
    SKILL_LIBRARY.iter().map(|s| s.id)
}
