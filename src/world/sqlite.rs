use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::serialization::{SaveState, SAVE_VERSION};
use crate::simulation::flags::FlagValue;

const SLOT_SCHEMA_VERSION: i64 = 1;

const SLOT_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS save_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL,
  save_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS save_slots (
  slot TEXT PRIMARY KEY,
  player_name TEXT NOT NULL,
  level INTEGER NOT NULL,
  location TEXT NOT NULL,
  day INTEGER NOT NULL,
  saved_at_tick INTEGER NOT NULL,
  version INTEGER NOT NULL,
  state_json TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS save_flags (
  slot TEXT NOT NULL,
  flag_key TEXT NOT NULL,
  flag_value TEXT NOT NULL,
  PRIMARY KEY (slot, flag_key)
);
"#;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("save version {found} is newer than the supported version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
    #[error("no save in slot {0}")]
    MissingSlot(String),
    #[error("cannot save in the middle of a fight")]
    CombatInProgress,
    #[error("{0}")]
    InvalidData(String),
}

/// One row of the slot listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSummary {
    pub slot: String,
    pub player_name: String,
    pub level: u32,
    pub location: String,
    pub day: u32,
    pub saved_at_tick: u64,
}

/// Named save slots backed by SQLite. Each slot keeps the full JSON state plus
/// its flags in their own table so they can be queried without decoding it.
pub struct SaveDb {
    conn: Connection,
}

impl SaveDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, PersistenceError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PersistenceError> {
        conn.execute_batch(SLOT_DB_SCHEMA)?;
        let mut db = Self { conn };
        db.ensure_meta()?;
        Ok(db)
    }

    fn ensure_meta(&mut self) -> Result<(), PersistenceError> {
        let meta = self
            .conn
            .query_row(
                "SELECT schema_version, save_version FROM save_meta WHERE id = 1",
                [],
                |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
            )
            .optional()?;

        match meta {
            Some((schema_version, save_version)) => {
                if schema_version != SLOT_SCHEMA_VERSION {
                    return Err(PersistenceError::InvalidData(format!(
                        "save_meta schema {} does not match {}",
                        schema_version, SLOT_SCHEMA_VERSION
                    )));
                }
                if save_version > i64::from(SAVE_VERSION) {
                    return Err(PersistenceError::UnsupportedVersion {
                        found: save_version as u32,
                        supported: SAVE_VERSION,
                    });
                }
            }
            None => {
                self.conn.execute(
                    "INSERT INTO save_meta (id, schema_version, save_version) VALUES (1, ?1, ?2)",
                    params![SLOT_SCHEMA_VERSION, i64::from(SAVE_VERSION)],
                )?;
            }
        }
        Ok(())
    }

    /// Write `state` into `slot`, replacing whatever was there.
    pub fn save_slot(&mut self, slot: &str, state: &SaveState) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(state)?;
        let location = state.location.0.clone();
        let tx = self.conn.transaction()?;

        tx.execute("DELETE FROM save_slots WHERE slot = ?1", params![slot])?;
        tx.execute("DELETE FROM save_flags WHERE slot = ?1", params![slot])?;
        tx.execute(
            "INSERT INTO save_slots (slot, player_name, level, location, day, saved_at_tick, version, state_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                slot,
                state.player.character.name,
                state.player.character.level,
                location,
                state.time.day,
                state.time.tick as i64,
                state.version,
                json
            ],
        )?;
        for (key, value) in state.flags.iter() {
            tx.execute(
                "INSERT INTO save_flags (slot, flag_key, flag_value) VALUES (?1, ?2, ?3)",
                params![slot, key, serde_json::to_string(value)?],
            )?;
        }
        tx.commit()?;

        info!(slot, tick = state.time.tick, "saved slot");
        Ok(())
    }

    pub fn load_slot(&self, slot: &str) -> Result<SaveState, PersistenceError> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT state_json FROM save_slots WHERE slot = ?1",
                params![slot],
                |row| row.get(0),
            )
            .optional()?;
        let json = json.ok_or_else(|| PersistenceError::MissingSlot(slot.to_string()))?;
        let state: SaveState = serde_json::from_str(&json)?;
        state.check_version()?;
        info!(slot, tick = state.time.tick, "loaded slot");
        Ok(state)
    }

    pub fn list_slots(&self) -> Result<Vec<SlotSummary>, PersistenceError> {
        let mut stmt = self.conn.prepare(
            "SELECT slot, player_name, level, location, day, saved_at_tick FROM save_slots ORDER BY slot",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SlotSummary {
                slot: row.get(0)?,
                player_name: row.get(1)?,
                level: row.get(2)?,
                location: row.get(3)?,
                day: row.get(4)?,
                saved_at_tick: row.get::<_, i64>(5)? as u64,
            })
        })?;
        let mut slots = Vec::new();
        for row in rows {
            slots.push(row?);
        }
        Ok(slots)
    }

    /// Returns false when the slot did not exist.
    pub fn delete_slot(&mut self, slot: &str) -> Result<bool, PersistenceError> {
        let tx = self.conn.transaction()?;
        let removed = tx.execute("DELETE FROM save_slots WHERE slot = ?1", params![slot])?;
        tx.execute("DELETE FROM save_flags WHERE slot = ?1", params![slot])?;
        tx.commit()?;
        debug!(slot, removed, "delete slot");
        Ok(removed > 0)
    }

    /// Flag value stored with a slot, without decoding the whole save.
    pub fn slot_flag(&self, slot: &str, key: &str) -> Result<Option<FlagValue>, PersistenceError> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT flag_value FROM save_flags WHERE slot = ?1 AND flag_key = ?2",
                params![slot, key],
                |row| row.get(0),
            )
            .optional()?;
        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Slots whose saves have `key` set to anything.
    pub fn slots_with_flag(&self, key: &str) -> Result<Vec<String>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT slot FROM save_flags WHERE flag_key = ?1 ORDER BY slot")?;
        let rows = stmt.query_map(params![key], |row| row.get::<_, String>(0))?;
        let mut slots = Vec::new();
        for row in rows {
            slots.push(row?);
        }
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::character::Character;
    use crate::components::identity::Appearance;
    use crate::components::inventory::Inventory;
    use crate::components::stamina::StaminaPool;
    use crate::core::serialization::SavedPlayer;
    use crate::narrative::arcs::ArcProgress;
    use crate::simulation::journal::Journal;
    use crate::simulation::location::CurrentLocation;
    use crate::simulation::modes::ModeProgress;
    use crate::simulation::relationships::RelationshipBook;
    use crate::simulation::time::GameTime;
    use crate::simulation::world_events::WorldEvents;

    fn state(name: &str, level: u32) -> SaveState {
        let mut character = Character::new(name, 100, 50, 10, 10, 10);
        character.level = level;
        let mut state = SaveState {
            version: SAVE_VERSION,
            seed: 3,
            time: GameTime::default(),
            player: SavedPlayer {
                character,
                inventory: Inventory::default(),
                stamina: StaminaPool::default(),
                appearance: Appearance::default(),
            },
            location: CurrentLocation("old_road".into()),
            flags: Default::default(),
            journal: Journal::default(),
            relationships: RelationshipBook::default(),
            arcs: ArcProgress::default(),
            world_events: WorldEvents::default(),
            modes: ModeProgress::default(),
        };
        state.flags.set("defeated.roadside_curse", true);
        state.flags.set("exorcisms", 2i64);
        state
    }

    #[test]
    fn slots_round_trip_and_list() {
        let mut db = SaveDb::open_in_memory().expect("db");
        db.save_slot("beta", &state("Beta", 4)).expect("save");
        db.save_slot("alpha", &state("Alpha", 2)).expect("save");

        let loaded = db.load_slot("alpha").expect("load");
        assert_eq!(loaded.player.character.name, "Alpha");
        assert_eq!(loaded.location.0, "old_road");

        let slots = db.list_slots().expect("list");
        let names: Vec<_> = slots.iter().map(|s| s.slot.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
        assert_eq!(slots[1].level, 4);
        assert_eq!(slots[1].location, "old_road");
    }

    #[test]
    fn overwriting_a_slot_replaces_its_flags() {
        let mut db = SaveDb::open_in_memory().expect("db");
        db.save_slot("main", &state("Main", 1)).expect("save");
        assert_eq!(db.slot_flag("main", "exorcisms").expect("flag"), Some(FlagValue::Int(2)));

        let mut fresh = state("Main", 1);
        fresh.flags.clear("exorcisms");
        db.save_slot("main", &fresh).expect("save");
        assert_eq!(db.slot_flag("main", "exorcisms").expect("flag"), None);
        assert_eq!(db.slots_with_flag("defeated.roadside_curse").expect("query"), vec!["main"]);
    }

    #[test]
    fn missing_and_deleted_slots() {
        let mut db = SaveDb::open_in_memory().expect("db");
        assert!(matches!(db.load_slot("nope"), Err(PersistenceError::MissingSlot(_))));
        db.save_slot("gone", &state("Gone", 1)).expect("save");
        assert!(db.delete_slot("gone").expect("delete"));
        assert!(!db.delete_slot("gone").expect("delete again"));
        assert!(db.list_slots().expect("list").is_empty());
        assert!(db.slots_with_flag("exorcisms").expect("query").is_empty());
    }

    #[test]
    fn reopening_a_file_keeps_slots() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("saves").join("slots.db");
        {
            let mut db = SaveDb::open(&path).expect("open");
            db.save_slot("one", &state("One", 3)).expect("save");
        }
        let db = SaveDb::open(&path).expect("reopen");
        assert_eq!(db.list_slots().expect("list").len(), 1);
    }
}
