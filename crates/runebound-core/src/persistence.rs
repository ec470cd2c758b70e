//! Save/Load for a run: the character, every visited room, and where the
//! player stands.
//!
//! Binary saves use bincode; a JSON form is available for export and
//! inspection. Stores are keyed by user id. Gameplay never fails because a
//! store does: the [`AutoSaver`] logs and retries on the next debounce.

use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use runebound_logic::character::Character;

use crate::components::{Room, RoomCoord};

/// Version number for save file format (increment when format changes)
pub const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub character: Character,
    /// Visited rooms keyed by `"x,y"`
    pub visited_rooms: BTreeMap<String, Room>,
    pub current_room: Option<RoomCoord>,
    pub biome: String,
}

impl SaveData {
    pub fn new(
        character: Character,
        visited_rooms: BTreeMap<String, Room>,
        current_room: Option<RoomCoord>,
        biome: String,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            character,
            visited_rooms,
            current_room,
            biome,
        }
    }

    fn check_version(self) -> Result<Self, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::VersionMismatch {
                expected: SAVE_VERSION,
                found: self.version,
            });
        }
        Ok(self)
    }
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
    #[error("Save store unavailable: {0}")]
    Unavailable(String),
}

/// Write a run to a writer
pub fn save_run<W: Write>(writer: W, data: &SaveData) -> Result<(), SaveError> {
    bincode::serialize_into(writer, data)?;
    Ok(())
}

/// Load a run from a reader
pub fn load_run<R: Read>(reader: R) -> Result<SaveData, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;
    data.check_version()
}

pub fn export_json(data: &SaveData) -> Result<String, SaveError> {
    Ok(serde_json::to_string_pretty(data)?)
}

pub fn import_json(json: &str) -> Result<SaveData, SaveError> {
    let data: SaveData = serde_json::from_str(json)?;
    data.check_version()
}

/// Per-user save backend.
pub trait SaveStore {
    /// `Ok(None)` when the user has no save yet.
    fn load(&self, user_id: &str) -> Result<Option<SaveData>, SaveError>;
    fn save(&mut self, user_id: &str, data: &SaveData) -> Result<(), SaveError>;
}

/// One bincode file per user in a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, user_id: &str) -> PathBuf {
        let safe: String = user_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.sav", safe))
    }
}

impl SaveStore for FileStore {
    fn load(&self, user_id: &str) -> Result<Option<SaveData>, SaveError> {
        let path = self.path_for(user_id);
        match fs::File::open(&path) {
            Ok(file) => load_run(io::BufReader::new(file)).map(Some),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, user_id: &str, data: &SaveData) -> Result<(), SaveError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(user_id);
        // Temp file first, then renamed over the old save
        let tmp = path.with_extension("sav.tmp");
        {
            let mut writer = io::BufWriter::new(fs::File::create(&tmp)?);
            save_run(&mut writer, data)?;
            writer.flush()?;
        }
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

/// In-memory store. Can be switched offline to exercise failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    saves: HashMap<String, Vec<u8>>,
    offline: bool,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl SaveStore for MemoryStore {
    fn load(&self, user_id: &str) -> Result<Option<SaveData>, SaveError> {
        if self.offline {
            return Err(SaveError::Unavailable("memory store offline".into()));
        }
        self.saves
            .get(user_id)
            .map(|bytes| load_run(bytes.as_slice()))
            .transpose()
    }

    fn save(&mut self, user_id: &str, data: &SaveData) -> Result<(), SaveError> {
        if self.offline {
            return Err(SaveError::Unavailable("memory store offline".into()));
        }
        let mut bytes = Vec::new();
        save_run(&mut bytes, data)?;
        self.saves.insert(user_id.to_string(), bytes);
        self.writes += 1;
        Ok(())
    }
}

/// Debounced auto-save timer.
///
/// Every change restarts the quiet period; a save is due once
/// `debounce_ms` has passed since the last change.
#[derive(Debug, Clone)]
pub struct AutoSaver {
    debounce_ms: u64,
    dirty_since: Option<u64>,
}

impl AutoSaver {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            dirty_since: None,
        }
    }

    pub fn mark_dirty(&mut self, now_ms: u64) {
        self.dirty_since = Some(now_ms);
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn is_due(&self, now_ms: u64) -> bool {
        self.dirty_since
            .is_some_and(|since| now_ms.saturating_sub(since) >= self.debounce_ms)
    }

    pub fn clear(&mut self) {
        self.dirty_since = None;
    }

    /// Save through `store` if due. Failures are logged and rescheduled for
    /// the next window. Returns whether a save was written.
    pub fn poll(
        &mut self,
        now_ms: u64,
        store: &mut dyn SaveStore,
        user_id: &str,
        data: impl FnOnce() -> Option<SaveData>,
    ) -> bool {
        if !self.is_due(now_ms) {
            return false;
        }
        let Some(data) = data() else {
            self.clear();
            return false;
        };
        match store.save(user_id, &data) {
            Ok(()) => {
                self.clear();
                true
            }
            Err(e) => {
                warn!("Auto-save for {} failed, retrying later: {}", user_id, e);
                self.dirty_since = Some(now_ms);
                false
            }
        }
    }
}
