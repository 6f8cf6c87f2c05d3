use bevy::log::warn;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::cartridge::RoomCoord;

pub const SAVE_MAGIC: u32 = 0xAAAA;

/// Progress snapshot written on every room transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub magic: u32,
    pub seconds: u8,
    pub minutes: u8,
    pub deaths: u16,
    pub room: RoomCoord,
    /// Bit `i` set when the fruit of level `i` was collected.
    #[serde(default)]
    pub fruit: u32,
}

impl SaveRecord {
    pub fn new(seconds: u8, minutes: u8, deaths: u16, room: RoomCoord, fruit: u32) -> Self {
        Self {
            magic: SAVE_MAGIC,
            seconds,
            minutes,
            deaths,
            room,
            fruit,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.magic == SAVE_MAGIC
    }
}

/// Somewhere to keep a single [`SaveRecord`].
pub trait SaveStore: Send + Sync {
    fn load(&self) -> Option<SaveRecord>;
    fn save(&mut self, record: &SaveRecord) -> Result<(), String>;
    fn erase(&mut self) -> Result<(), String>;
}

/// JSON file on disk. Writes are read back and compared.
pub struct FileSaveStore {
    path: PathBuf,
}

impl FileSaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SaveStore for FileSaveStore {
    fn load(&self) -> Option<SaveRecord> {
        let text = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&text) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(
                    "[Summit save] Ignoring unreadable save {}: {e}",
                    self.path.display()
                );
                None
            }
        }
    }

    fn save(&mut self, record: &SaveRecord) -> Result<(), String> {
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| format!("failed to encode save: {e}"))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {e}", parent.display()))?;
        }
        std::fs::write(&self.path, json)
            .map_err(|e| format!("failed to write {}: {e}", self.path.display()))?;
        match self.load() {
            Some(stored) if stored == *record => Ok(()),
            _ => Err(format!(
                "save verification failed for {}",
                self.path.display()
            )),
        }
    }

    fn erase(&mut self) -> Result<(), String> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(format!("failed to erase {}: {e}", self.path.display())),
        }
    }
}

/// In-memory store. Clones share the same slot, so a test can keep a
/// handle while the world owns another.
#[derive(Clone, Default)]
pub struct MemorySaveStore {
    slot: Arc<Mutex<Option<SaveRecord>>>,
}

impl MemorySaveStore {
    pub fn with_record(record: SaveRecord) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(record))),
        }
    }
}

impl SaveStore for MemorySaveStore {
    fn load(&self) -> Option<SaveRecord> {
        self.slot.lock().ok().and_then(|slot| *slot)
    }

    fn save(&mut self, record: &SaveRecord) -> Result<(), String> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| "save slot poisoned".to_string())?;
        *slot = Some(*record);
        Ok(())
    }

    fn erase(&mut self) -> Result<(), String> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| "save slot poisoned".to_string())?;
        *slot = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("summit-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn file_store_round_trips_and_erases() {
        let path = temp_path("roundtrip");
        let mut store = FileSaveStore::new(&path);
        let record = SaveRecord::new(12, 3, 40, RoomCoord::new(2, 1), 0b101);
        store.save(&record).unwrap();
        assert_eq!(store.load(), Some(record));
        store.erase().unwrap();
        assert_eq!(store.load(), None);
        // Erasing twice is fine.
        store.erase().unwrap();
    }

    #[test]
    fn older_records_without_fruit_still_load() {
        let path = temp_path("legacy");
        std::fs::write(
            &path,
            r#"{"magic":43690,"seconds":1,"minutes":2,"deaths":3,"room":{"x":4,"y":0}}"#,
        )
        .unwrap();
        let store = FileSaveStore::new(&path);
        let record = store.load().unwrap();
        assert!(record.is_valid());
        assert_eq!(record.fruit, 0);
        assert_eq!(record.room, RoomCoord::new(4, 0));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn garbage_file_reads_as_empty() {
        let path = temp_path("garbage");
        std::fs::write(&path, "not json").unwrap();
        assert_eq!(FileSaveStore::new(&path).load(), None);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn memory_store_clones_share_slot() {
        let handle = MemorySaveStore::default();
        let mut owned = handle.clone();
        let record = SaveRecord::new(0, 0, 0, RoomCoord::START, 0);
        owned.save(&record).unwrap();
        assert_eq!(handle.load(), Some(record));
        owned.erase().unwrap();
        assert_eq!(handle.load(), None);
    }

    #[test]
    fn wrong_magic_is_invalid() {
        let mut record = SaveRecord::new(0, 0, 0, RoomCoord::START, 0);
        record.magic = 0;
        assert!(!record.is_valid());
    }
}
