//! Game session - exploration controller and main entry point
//!
//! A [`GameSession`] owns everything one run needs: the character, the
//! visited-room cache, the combat engine, the rngs, the clock, the
//! player-facing message log, and an optional save store. Callers drive it
//! with commands (`travel`, `cast_skill`, `use_item`, ...) and call
//! [`GameSession::frame`] once per display refresh while combat is active.

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

use runebound_logic::actor::Actor;
use runebound_logic::character::Character;
use runebound_logic::classes::PlayerClass;
use runebound_logic::items::{EquipmentSlot, ItemId};

use crate::clock::{Clock, FrameTicker, SystemClock};
use crate::combat::{
    stash, Battle, CombatEngine, CombatPhase, FrameReport, SkillCast, VictoryReport,
};
use crate::components::{Direction, Encounter, EncounterType, Room, RoomCoord};
use crate::config::SessionConfig;
use crate::generation::vocab::{pick, BIOMES};
use crate::generation::{generate_enemy, generate_entrance, generate_room, ProceduralLoot};
use crate::persistence::{AutoSaver, SaveData, SaveError, SaveStore};

/// Best disarm chance regardless of dexterity.
const MAX_DISARM_CHANCE: f64 = 0.95;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no character in this session")]
    NoCharacter,
    #[error("not allowed while combat is active")]
    CombatActive,
    #[error("no path leads {0:?} from here")]
    NoSuchPath(Direction),
    #[error("room {0} has not been visited")]
    UnknownRoom(String),
    #[error("this room holds a {found:?} encounter, not {expected:?}")]
    WrongEncounter {
        expected: EncounterType,
        found: EncounterType,
    },
    #[error("this room's encounter is already resolved")]
    AlreadyResolved,
    #[error("need {price} gold, have {gold}")]
    NotEnoughGold { price: u32, gold: u32 },
    #[error("no item {0} here")]
    NoSuchItem(ItemId),
    #[error("no save store attached")]
    NoSaveStore,
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Where a travel command ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct Arrival {
    pub coord: RoomCoord,
    /// Room came from the cache; no encounter was triggered
    pub revisit: bool,
    pub encounter: EncounterType,
    /// A fight started
    pub battle: bool,
}

/// Outcome of resolving a room's encounter.
#[derive(Debug, Clone, PartialEq)]
pub enum Interaction {
    ChestOpened { gold: u32, items: Vec<ItemId> },
    SecretFound { gold: u32 },
    TrapDisarmed,
    TrapTriggered { damage: f64 },
    PuzzleSolved { xp: u32, levels_gained: u32 },
    Purchased { item: ItemId, price: u32 },
}

/// One run of the game
pub struct GameSession<C: Clock = SystemClock> {
    config: SessionConfig,
    clock: C,
    ticker: FrameTicker,
    character: Option<Character>,
    /// Visited rooms keyed by `"x,y"`
    rooms: BTreeMap<String, Room>,
    current: Option<RoomCoord>,
    biome: String,
    combat: CombatEngine,
    /// Rooms and enemies
    rng: StdRng,
    /// Victory drops
    loot: ProceduralLoot<StdRng>,
    log: VecDeque<String>,
    autosaver: AutoSaver,
    store: Option<Box<dyn SaveStore>>,
    user_id: Option<String>,
}

impl GameSession<SystemClock> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> GameSession<C> {
    pub fn with_clock(config: SessionConfig, clock: C) -> Self {
        let rng_for = |offset: u64| match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(offset)),
            None => StdRng::from_entropy(),
        };
        let mut rng = rng_for(0);
        let combat = CombatEngine::new(config.combat.clone(), rng_for(1));
        let loot = ProceduralLoot::new(rng_for(2));
        let biome = config
            .biome
            .clone()
            .unwrap_or_else(|| pick(&mut rng, BIOMES).to_string());

        Self {
            autosaver: AutoSaver::new(config.autosave_debounce_ms),
            config,
            clock,
            ticker: FrameTicker::new(),
            character: None,
            rooms: BTreeMap::new(),
            current: None,
            biome,
            combat,
            rng,
            loot,
            log: VecDeque::new(),
            store: None,
            user_id: None,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn character(&self) -> Option<&Character> {
        self.character.as_ref()
    }

    pub fn biome(&self) -> &str {
        &self.biome
    }

    pub fn current_coord(&self) -> Option<RoomCoord> {
        self.current
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.current.and_then(|c| self.rooms.get(&c.key()))
    }

    pub fn room(&self, coord: RoomCoord) -> Option<&Room> {
        self.rooms.get(&coord.key())
    }

    pub fn visited_rooms(&self) -> &BTreeMap<String, Room> {
        &self.rooms
    }

    pub fn combat_phase(&self) -> CombatPhase {
        self.combat.phase()
    }

    pub fn in_combat(&self) -> bool {
        self.combat.is_active()
    }

    pub fn battle(&self) -> Option<&Battle> {
        self.combat.battle()
    }

    /// Player-facing messages, newest first.
    pub fn log(&self) -> impl Iterator<Item = &str> {
        self.log.iter().map(String::as_str)
    }

    // ── Run lifecycle ──────────────────────────────────────────────────

    /// Start a fresh run at the entrance.
    pub fn create_character(&mut self, name: impl Into<String>, class: PlayerClass) {
        self.reset_combat();
        let character = Character::new(name, class);
        info!("New {:?} '{}' enters {}", class, character.name, self.biome);
        self.push_log(format!(
            "{} the {} descends into the {}.",
            character.name,
            class.profile().name,
            self.biome
        ));
        self.character = Some(character);

        self.rooms.clear();
        let entrance = generate_entrance(&mut self.rng);
        self.current = Some(entrance.coord);
        self.rooms.insert(entrance.coord.key(), entrance);
        self.mark_dirty();
    }

    /// Clear everything scoped to the current run.
    fn end_run(&mut self) {
        self.reset_combat();
        self.character = None;
        self.rooms.clear();
        self.current = None;
        self.autosaver.clear();
    }

    fn reset_combat(&mut self) {
        self.combat.flee();
        self.combat.finish();
        self.ticker.reset();
    }

    // ── Exploration ────────────────────────────────────────────────────

    /// Take an exit from the current room.
    ///
    /// A cached destination is re-entered as-is with no encounter. A new
    /// destination is generated at the exit's risk tier; a BATTLE room
    /// starts combat immediately.
    pub fn travel(&mut self, direction: Direction) -> Result<Arrival, SessionError> {
        if self.character.is_none() {
            return Err(SessionError::NoCharacter);
        }
        if self.combat.is_active() {
            return Err(SessionError::CombatActive);
        }
        let from = self.current.ok_or(SessionError::NoCharacter)?;
        let from_key = from.key();
        let risk = self
            .rooms
            .get(&from_key)
            .ok_or_else(|| SessionError::UnknownRoom(from_key.clone()))?
            .choice(direction)
            .ok_or(SessionError::NoSuchPath(direction))?
            .risk;

        let target = from.step(direction);
        let key = target.key();

        if let Some(encounter) = self.rooms.get(&key).map(Room::encounter_type) {
            self.current = Some(target);
            self.push_log("Returning to familiar ground.");
            self.mark_dirty();
            return Ok(Arrival {
                coord: target,
                revisit: true,
                encounter,
                battle: false,
            });
        }

        let room = generate_room(&mut self.rng, self.rooms.get(&from_key), target, risk);
        info!(
            "Generated '{}' at {} (depth {}, {:?})",
            room.title,
            key,
            room.depth,
            room.encounter_type()
        );
        let encounter = room.encounter_type();
        let depth = room.depth;
        self.rooms.insert(key, room);
        self.current = Some(target);

        let mut battle = false;
        match encounter {
            EncounterType::Battle => {
                let enemy = generate_enemy(&mut self.rng, &self.biome, depth);
                self.push_log(format!("A hostile {} emerges!", enemy.name));
                self.ticker.reset();
                battle = self.combat.engage(enemy, depth);
            }
            EncounterType::Treasure => self.push_log("A hidden cache awaits."),
            _ => {}
        }
        self.mark_dirty();

        Ok(Arrival {
            coord: target,
            revisit: false,
            encounter,
            battle,
        })
    }

    /// Jump back to any visited room (minimap travel). Not during combat.
    pub fn travel_to(&mut self, coord: RoomCoord) -> Result<(), SessionError> {
        if self.character.is_none() {
            return Err(SessionError::NoCharacter);
        }
        if self.combat.is_active() {
            return Err(SessionError::CombatActive);
        }
        let title = self
            .rooms
            .get(&coord.key())
            .map(|r| r.title.clone())
            .ok_or_else(|| SessionError::UnknownRoom(coord.key()))?;
        self.current = Some(coord);
        self.push_log(format!("Traveling back to the {}.", title));
        self.mark_dirty();
        Ok(())
    }

    // ── Combat ─────────────────────────────────────────────────────────

    /// Run one combat frame with the delta since the previous frame.
    /// Returns `None` outside combat.
    pub fn frame(&mut self) -> Option<FrameReport> {
        if !self.combat.is_active() {
            return None;
        }
        let character = self.character.as_mut()?;
        let delta = self.ticker.tick(self.clock.now_ms());
        let report = self.combat.update(character, delta, &mut self.loot)?;
        self.settle_combat(report.victory());
        Some(report)
    }

    pub fn cast_skill(&mut self, skill_id: &str) -> Option<SkillCast> {
        let character = self.character.as_mut()?;
        let now = self.clock.now_ms();
        let cast = self
            .combat
            .cast_skill(character, skill_id, now, &mut self.loot)?;
        if cast.damage > 0.0 {
            self.push_log(format!("Your {} strikes for {} damage.", cast.skill_id, cast.damage));
        } else {
            self.push_log(format!("Runes flare: {} mana restored.", cast.mana_restored));
        }
        self.settle_combat(cast.victory.as_ref());
        Some(cast)
    }

    /// Abandon the current fight. The room stays cached and will not
    /// spawn another enemy.
    pub fn flee(&mut self) -> bool {
        let fled = self.combat.flee();
        if fled {
            self.ticker.reset();
            self.push_log("You flee into the shadows.");
        }
        fled
    }

    /// Finish a terminal phase: rewards get logged, defeat ends the run.
    fn settle_combat(&mut self, victory: Option<&VictoryReport>) {
        if let Some(v) = victory {
            self.push_log(format!("The {} has been vanquished.", v.enemy_name));
            let found: Vec<String> = self
                .character
                .as_ref()
                .map(|c| {
                    v.loot
                        .iter()
                        .filter_map(|id| c.inventory.get(*id).map(|i| i.name.clone()))
                        .collect()
                })
                .unwrap_or_default();
            for name in found {
                self.push_log(format!("You claim the {}.", name));
            }
            if v.levels_gained > 0 {
                self.push_log(format!("Power surges through you. Level {} reached.", v.new_level));
            }
        }

        match self.combat.finish() {
            Some(CombatPhase::EnemyDefeated) => {
                self.ticker.reset();
                self.mark_dirty();
            }
            Some(CombatPhase::PlayerDefeated) => {
                self.push_log("Death claims you.");
                self.end_run();
            }
            _ => {}
        }
    }

    // ── Character commands ─────────────────────────────────────────────

    /// Drink a potion. Allowed in and out of combat.
    pub fn use_item(&mut self, id: ItemId) -> bool {
        let Some(character) = self.character.as_mut() else {
            return false;
        };
        let Some(name) = character.inventory.get(id).map(|i| i.name.clone()) else {
            return false;
        };
        if !character.consume(id) {
            return false;
        }
        self.push_log(format!("You drink the {}.", name));
        self.mark_dirty();
        true
    }

    pub fn equip(&mut self, id: ItemId, slot: Option<EquipmentSlot>) -> bool {
        let Some(character) = self.character.as_mut() else {
            return false;
        };
        let Some(name) = character.inventory.get(id).map(|i| i.name.clone()) else {
            return false;
        };
        if !character.equip(id, slot) {
            return false;
        }
        self.push_log(format!("Equipped {}.", name));
        self.mark_dirty();
        true
    }

    pub fn unequip(&mut self, slot: EquipmentSlot) -> bool {
        let changed = self
            .character
            .as_mut()
            .is_some_and(|c| c.unequip(slot));
        if changed {
            self.mark_dirty();
        }
        changed
    }

    // ── Room interactions ──────────────────────────────────────────────

    fn here(&mut self) -> Result<(&mut Character, &mut Room), SessionError> {
        if self.combat.is_active() {
            return Err(SessionError::CombatActive);
        }
        let character = self.character.as_mut().ok_or(SessionError::NoCharacter)?;
        let key = self.current.ok_or(SessionError::NoCharacter)?.key();
        let room = self
            .rooms
            .get_mut(&key)
            .ok_or(SessionError::UnknownRoom(key))?;
        Ok((character, room))
    }

    /// Loot a TREASURE room's chest: items go to the inventory, gold to the purse.
    pub fn open_chest(&mut self) -> Result<Interaction, SessionError> {
        let (character, room) = self.here()?;
        let found = room.encounter_type();
        let Encounter::Treasure { loot, gold, opened } = &mut room.encounter else {
            return Err(SessionError::WrongEncounter {
                expected: EncounterType::Treasure,
                found,
            });
        };
        if *opened {
            return Err(SessionError::AlreadyResolved);
        }
        *opened = true;
        let gold = *gold;
        let items: Vec<ItemId> = loot.iter().map(|i| i.id).collect();
        for item in std::mem::take(loot) {
            stash(character, item);
        }
        character.gold = character.gold.saturating_add(gold);

        self.push_log(format!("The chest yields {} gold and {} item(s).", gold, items.len()));
        self.mark_dirty();
        Ok(Interaction::ChestOpened { gold, items })
    }

    pub fn search_secret(&mut self) -> Result<Interaction, SessionError> {
        let (character, room) = self.here()?;
        let found_type = room.encounter_type();
        let Encounter::Secret { gold, found } = &mut room.encounter else {
            return Err(SessionError::WrongEncounter {
                expected: EncounterType::Secret,
                found: found_type,
            });
        };
        if *found {
            return Err(SessionError::AlreadyResolved);
        }
        *found = true;
        let gold = *gold;
        character.gold = character.gold.saturating_add(gold);

        self.push_log(format!("A hidden stash: {} gold.", gold));
        self.mark_dirty();
        Ok(Interaction::SecretFound { gold })
    }

    /// Try to disarm a TRAP room. Success chance grows with dexterity; a
    /// failure springs the trap for depth-scaled damage. Either way the trap
    /// is spent.
    pub fn disarm_trap(&mut self) -> Result<Interaction, SessionError> {
        let roll: f64 = self.rng.gen();
        let (character, room) = self.here()?;
        let depth = room.depth;
        let found = room.encounter_type();
        let Encounter::Trap { disarmed } = &mut room.encounter else {
            return Err(SessionError::WrongEncounter {
                expected: EncounterType::Trap,
                found,
            });
        };
        if *disarmed {
            return Err(SessionError::AlreadyResolved);
        }
        *disarmed = true;

        let chance = (0.4 + character.attributes.dexterity as f64 * 0.02).min(MAX_DISARM_CHANCE);
        if roll < chance {
            self.push_log("You carefully disarm the mechanism.");
            self.mark_dirty();
            return Ok(Interaction::TrapDisarmed);
        }

        let damage = 5.0 + 3.0 * depth as f64;
        character.take_damage(damage);
        let alive = character.is_alive();
        self.push_log(format!("Darts hiss from the walls for {} damage.", damage));
        if alive {
            self.mark_dirty();
        } else {
            self.push_log("Death claims you.");
            self.end_run();
        }
        Ok(Interaction::TrapTriggered { damage })
    }

    pub fn solve_puzzle(&mut self) -> Result<Interaction, SessionError> {
        let (character, room) = self.here()?;
        let depth = room.depth;
        let found = room.encounter_type();
        let Encounter::Puzzle { solved } = &mut room.encounter else {
            return Err(SessionError::WrongEncounter {
                expected: EncounterType::Puzzle,
                found,
            });
        };
        if *solved {
            return Err(SessionError::AlreadyResolved);
        }
        *solved = true;
        let xp = 25 + 5 * depth;
        let levels_gained = character.gain_xp(xp);
        let level = character.level;

        self.push_log(format!("The mechanism yields. +{} xp.", xp));
        if levels_gained > 0 {
            self.push_log(format!("Power surges through you. Level {} reached.", level));
        }
        self.mark_dirty();
        Ok(Interaction::PuzzleSolved { xp, levels_gained })
    }

    /// Buy one item from a MERCHANT room's stock at its value.
    pub fn buy(&mut self, id: ItemId) -> Result<Interaction, SessionError> {
        let (character, room) = self.here()?;
        let found = room.encounter_type();
        let Encounter::Merchant { stock } = &mut room.encounter else {
            return Err(SessionError::WrongEncounter {
                expected: EncounterType::Merchant,
                found,
            });
        };
        let idx = stock
            .iter()
            .position(|i| i.id == id)
            .ok_or(SessionError::NoSuchItem(id))?;
        let price = stock[idx].value;
        if character.gold < price {
            return Err(SessionError::NotEnoughGold {
                price,
                gold: character.gold,
            });
        }
        character.gold -= price;
        let item = stock.remove(idx);
        let name = item.name.clone();
        stash(character, item);

        self.push_log(format!("Bought {} for {} gold.", name, price));
        self.mark_dirty();
        Ok(Interaction::Purchased { item: id, price })
    }

    // ── Persistence ────────────────────────────────────────────────────

    /// Attach a save backend for `user_id`. Without one, nothing is saved.
    pub fn attach_store(&mut self, user_id: impl Into<String>, store: Box<dyn SaveStore>) {
        self.user_id = Some(user_id.into());
        self.store = Some(store);
    }

    pub fn snapshot(&self) -> Option<SaveData> {
        self.character.as_ref().map(|c| {
            SaveData::new(c.clone(), self.rooms.clone(), self.current, self.biome.clone())
        })
    }

    /// Replace the run with a saved one. Any fight in progress is dropped.
    pub fn restore(&mut self, data: SaveData) {
        self.reset_combat();
        let mut character = data.character;
        character.reset_cooldowns();
        self.push_log(format!("Welcome back, {}.", character.name));
        self.character = Some(character);
        self.rooms = data.visited_rooms;
        self.current = data.current_room;
        self.biome = data.biome;
        self.autosaver.clear();
    }

    /// Load the attached user's save. Returns whether a run was restored;
    /// a missing or unreadable save leaves the session untouched.
    pub fn resume(&mut self) -> bool {
        let (Some(store), Some(user)) = (self.store.as_ref(), self.user_id.as_deref()) else {
            return false;
        };
        match store.load(user) {
            Ok(Some(data)) => {
                info!("Restored save for {}", user);
                self.restore(data);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Could not load save for {}: {}", user, e);
                false
            }
        }
    }

    /// Save immediately, bypassing the debounce.
    pub fn save_now(&mut self) -> Result<(), SessionError> {
        let data = self.snapshot().ok_or(SessionError::NoCharacter)?;
        let (Some(store), Some(user)) = (self.store.as_mut(), self.user_id.as_deref()) else {
            return Err(SessionError::NoSaveStore);
        };
        store.save(user, &data)?;
        self.autosaver.clear();
        Ok(())
    }

    /// Write a debounced auto-save if one is due. Never fails.
    pub fn poll_autosave(&mut self) -> bool {
        let now = self.clock.now_ms();
        let (Some(store), Some(user)) = (self.store.as_mut(), self.user_id.as_deref()) else {
            return false;
        };
        let character = &self.character;
        let rooms = &self.rooms;
        let current = self.current;
        let biome = &self.biome;
        self.autosaver.poll(now, &mut **store, user, || {
            character
                .as_ref()
                .map(|c| SaveData::new(c.clone(), rooms.clone(), current, biome.clone()))
        })
    }

    fn mark_dirty(&mut self) {
        let now = self.clock.now_ms();
        self.autosaver.mark_dirty(now);
    }

    fn push_log(&mut self, message: impl Into<String>) {
        self.log.push_front(message.into());
        self.log.truncate(self.config.log_capacity);
    }
}
