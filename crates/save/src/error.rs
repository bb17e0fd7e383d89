use std::io;

use thiserror::Error;

/// Why a structurally complete record was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unsupported save version {found} (expected {expected})")]
    UnsupportedVersion { found: i32, expected: i32 },
    #[error("negative score ({score}) or max score ({max_score})")]
    NegativeScore { score: i32, max_score: i32 },
    #[error("board size {0} out of range")]
    BoardSize(i32),
    #[error("board size {board} does not match stats board size {stats}")]
    SizeMismatch { board: i32, stats: i32 },
    #[error("history cursor {current} invalid for {size} entries")]
    HistoryCursor { current: i32, size: i32 },
    #[error("history size {0} out of range")]
    HistorySize(i32),
    #[error("tile exponent {exponent} at ({x}, {y}) out of range")]
    TileOutOfRange { x: usize, y: usize, exponent: i32 },
    #[error("flag byte {0} is not 0 or 1")]
    Flag(u8),
    #[error("history entry {index}: {source}")]
    HistoryEntry {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Errors from saving and loading games.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("invalid save slot {0} (expected 0-9)")]
    InvalidSlot(u8),
    #[error("not a save file (missing or wrong magic tag)")]
    FormatMismatch,
    #[error("save file failed validation: {0}")]
    ValidationFailed(#[from] ValidationError),
    #[error("save file i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("auto-save is disabled for this session")]
    AutoSaveDisabled,
}
