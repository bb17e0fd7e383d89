//! Auto-save session
//!
//! One [`AutoSave`] handle exists per run. It owns the auto-save file for the
//! whole session: opened at startup, read once, rewritten once at exit. The
//! owner holds an exclusive lock on the file until
//! [`AutoSave::save_and_close`] consumes the handle, so a second running game
//! can still read the file but never overwrites it. When the file cannot be
//! opened, or another session holds the lock, the session is disabled and the
//! game runs without auto-save.

use std::fs::{File, OpenOptions, TryLockError};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};
use tui_2048_core::{GameSnapshot, History};

use crate::codec::{decode_legacy, SaveRecord, LEGACY_LEN};
use crate::error::SaveError;

const AUTO_DESCRIPTION: &str = "Auto-save";

#[derive(Debug)]
pub struct AutoSave {
    path: PathBuf,
    file: Option<File>,
    /// Whether this session holds the file lock
    owner: bool,
}

impl AutoSave {
    /// Open (or create) the auto-save file and try to take its lock.
    ///
    /// When another session already holds the lock the returned session can
    /// still [`load`](Self::load) but is not enabled.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let path = path.into();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        let owner = match file.try_lock() {
            Ok(()) => true,
            Err(TryLockError::WouldBlock) => {
                warn!(path = %path.display(), "auto-save held by another session, disabled");
                false
            }
            Err(TryLockError::Error(e)) => return Err(e.into()),
        };
        debug!(path = %path.display(), owner, "auto-save opened");
        Ok(Self {
            path,
            file: Some(file),
            owner,
        })
    }

    /// A session with auto-save switched off
    pub fn disabled(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            owner: false,
        }
    }

    /// Open `path`, falling back to a disabled session when that fails.
    pub fn open_or_disabled(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(session) => session,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "auto-save disabled");
                Self::disabled(path)
            }
        }
    }

    /// True when this session owns the file and will write it at exit
    pub fn is_enabled(&self) -> bool {
        self.owner
    }

    /// True when the file is open, locked or not
    pub fn can_load(&self) -> bool {
        self.file.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored game: tagged record first, then the legacy layout.
    ///
    /// The legacy layout is only tried when the tagged read found no record
    /// and the file is exactly [`LEGACY_LEN`] bytes. The returned snapshot's
    /// auto-save flag tells whether this session owns the file.
    pub fn load(&mut self) -> Result<SaveRecord, SaveError> {
        let file = self.file.as_mut().ok_or(SaveError::AutoSaveDisabled)?;
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let mut record = match SaveRecord::from_bytes(&bytes) {
            Ok(record) => record,
            Err(SaveError::FormatMismatch) if bytes.len() == LEGACY_LEN => {
                let snapshot = decode_legacy(&bytes)?;
                info!(path = %self.path.display(), "loaded legacy auto-save");
                SaveRecord::from_legacy(snapshot)
            }
            Err(e) => {
                if !bytes.is_empty() {
                    warn!(path = %self.path.display(), error = %e, "auto-save unreadable");
                }
                return Err(e);
            }
        };

        record.snapshot.stats.auto_save = self.owner;
        debug!(
            path = %self.path.display(),
            score = record.snapshot.stats.score,
            history = record.history.len(),
            "auto-save loaded"
        );
        Ok(record)
    }

    /// Replace the file contents with the current game and close it.
    pub fn save_and_close(
        self,
        snapshot: &GameSnapshot,
        history: &History,
        play_time: Duration,
    ) -> Result<(), SaveError> {
        if !self.owner {
            return Err(SaveError::AutoSaveDisabled);
        }
        let mut file = self.file.ok_or(SaveError::AutoSaveDisabled)?;
        let record = SaveRecord::encode(snapshot, history, AUTO_DESCRIPTION, play_time);

        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&record.to_bytes())?;
        file.flush()?;
        // Dropping the file releases the lock.

        info!(path = %self.path.display(), score = snapshot.stats.score, "auto-saved");
        Ok(())
    }
}
