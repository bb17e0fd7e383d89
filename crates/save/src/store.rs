//! Slot store - ten named save files in one directory

use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use tui_2048_core::{GameSnapshot, History};
use tui_2048_types::SAVE_SLOTS;

use crate::codec::{read_record, write_record, SaveRecord};
use crate::error::SaveError;

/// Slot used by quick save / quick load
pub const QUICK_SLOT: u8 = 0;

const QUICK_DESCRIPTION: &str = "Quick Save";

/// What the slot menu shows for one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub slot: u8,
    /// Empty for free or unreadable slots
    pub description: String,
    /// Seconds since the Unix epoch, 0 for free or unreadable slots
    pub timestamp: i64,
    /// A file exists for this slot
    pub present: bool,
    /// Board size of a readable save
    pub board_size: Option<u8>,
}

impl SlotInfo {
    fn empty(slot: u8, present: bool) -> Self {
        Self {
            slot,
            description: String::new(),
            timestamp: 0,
            present,
            board_size: None,
        }
    }
}

/// Save slots under one base directory.
///
/// The directory is created on the first write, so constructing a store never
/// touches the file system.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/slot_<n>.save`
    pub fn slot_path(&self, slot: u8) -> Result<PathBuf, SaveError> {
        validate_slot(slot)?;
        Ok(self.dir.join(format!("slot_{slot}.save")))
    }

    /// Write the game to `slot`, replacing whatever was there.
    pub fn save_slot(
        &self,
        slot: u8,
        snapshot: &GameSnapshot,
        history: &History,
        description: &str,
        play_time: Duration,
    ) -> Result<SaveRecord, SaveError> {
        let path = self.slot_path(slot)?;
        fs::create_dir_all(&self.dir)?;

        let record = SaveRecord::encode(snapshot, history, description, play_time);
        let mut out = BufWriter::new(File::create(&path)?);
        write_record(&mut out, &record)?;

        info!(slot, path = %path.display(), score = snapshot.stats.score, "saved game");
        Ok(record)
    }

    /// Read and validate `slot`. Nothing is applied to live state here.
    pub fn load_slot(&self, slot: u8) -> Result<SaveRecord, SaveError> {
        let path = self.slot_path(slot)?;
        let mut src = BufReader::new(File::open(&path)?);
        match read_record(&mut src) {
            Ok(record) => {
                info!(slot, path = %path.display(), "loaded game");
                Ok(record)
            }
            Err(e) => {
                warn!(slot, path = %path.display(), error = %e, "slot load failed");
                Err(e)
            }
        }
    }

    /// Describe all ten slots. A slot that cannot be read reports empty.
    pub fn list_slots(&self) -> Vec<SlotInfo> {
        (0..SAVE_SLOTS).map(|slot| self.slot_info(slot)).collect()
    }

    fn slot_info(&self, slot: u8) -> SlotInfo {
        let Ok(path) = self.slot_path(slot) else {
            return SlotInfo::empty(slot, false);
        };
        if !path.is_file() {
            return SlotInfo::empty(slot, false);
        }
        match self.load_slot(slot) {
            Ok(record) => SlotInfo {
                slot,
                description: record.description,
                timestamp: record.timestamp,
                present: true,
                board_size: Some(record.snapshot.board.size()),
            },
            Err(e) => {
                debug!(slot, error = %e, "slot listed as empty");
                SlotInfo::empty(slot, true)
            }
        }
    }

    /// Remove the file behind `slot`; deleting a free slot is not an error.
    pub fn delete_slot(&self, slot: u8) -> Result<(), SaveError> {
        let path = self.slot_path(slot)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(slot, "deleted save slot");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Lowest slot with no file, if any
    pub fn next_free_slot(&self) -> Option<u8> {
        (0..SAVE_SLOTS).find(|&slot| {
            self.slot_path(slot)
                .map(|path| !path.exists())
                .unwrap_or(false)
        })
    }

    pub fn quick_save(
        &self,
        snapshot: &GameSnapshot,
        history: &History,
        play_time: Duration,
    ) -> Result<SaveRecord, SaveError> {
        self.save_slot(QUICK_SLOT, snapshot, history, QUICK_DESCRIPTION, play_time)
    }

    pub fn quick_load(&self) -> Result<SaveRecord, SaveError> {
        self.load_slot(QUICK_SLOT)
    }
}

/// Slots are numbered `0..SAVE_SLOTS`
pub fn validate_slot(slot: u8) -> Result<(), SaveError> {
    if slot < SAVE_SLOTS {
        Ok(())
    } else {
        Err(SaveError::InvalidSlot(slot))
    }
}
