//! Save codec - fixed-layout binary records
//!
//! Every number is little-endian and every field has a fixed width, so a
//! record is always [`RECORD_LEN`] bytes and the magic tag check means
//! something. See the crate docs for the byte layout.
//!
//! Decoding is two steps: bytes are read into a [`WireRecord`] that mirrors the
//! layout and can hold any garbage the file contains, then
//! [`WireRecord::validate`] decides whether that image is a game this build
//! can run before it is turned into core types.

use std::io::{self, Read, Write};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tui_2048_core::{Board, CoreError, GameSnapshot, History, Stats};
use tui_2048_types::{
    is_valid_board_size, DESCRIPTION_LEN, HISTORY_CAPACITY, MAX_BOARD_SIZE, MAX_BOARD_TILES,
    MAX_EXPONENT,
};

use crate::error::{SaveError, ValidationError};

/// Tag written before every record ("2048" read as a big-endian number)
pub const MAGIC: u32 = 0x3230_3438;

/// The only record version this build reads and writes
pub const SAVE_VERSION: i32 = 1;

/// Version reported for records synthesized from the legacy format
pub const LEGACY_VERSION: i32 = 0;

const STRIDE: usize = MAX_BOARD_SIZE as usize;
const BOARD_LEN: usize = MAX_BOARD_TILES * 4 + 4;
const STATS_LEN: usize = 4 * 3 + 2 + 2 + 4;
const SNAPSHOT_LEN: usize = BOARD_LEN + STATS_LEN;
const HISTORY_LEN: usize = HISTORY_CAPACITY * SNAPSHOT_LEN + 8;

/// Size of a record body, after the magic tag
pub const BODY_LEN: usize = 4 + 8 + 4 + SNAPSHOT_LEN + HISTORY_LEN + DESCRIPTION_LEN;

/// Size of a complete tagged record on disk
pub const RECORD_LEN: usize = 4 + BODY_LEN;

/// Size of a legacy (untagged, history-less) record on disk
pub const LEGACY_LEN: usize = 4 * 3 + BOARD_LEN;

/// A decoded save: one live snapshot plus the undo/redo log behind it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRecord {
    pub version: i32,
    /// Seconds since the Unix epoch when the record was made
    pub timestamp: i64,
    /// Accumulated play time, whole seconds
    pub play_time: Duration,
    pub snapshot: GameSnapshot,
    pub history: History,
    pub description: String,
}

impl SaveRecord {
    /// Stamp a new record with the current version and wall-clock time.
    ///
    /// The description is cut at the first NUL and to at most 63 bytes (on a
    /// character boundary) so it always fits with its terminator.
    pub fn encode(
        snapshot: &GameSnapshot,
        history: &History,
        description: &str,
        play_time: Duration,
    ) -> Self {
        Self {
            version: SAVE_VERSION,
            timestamp: unix_now(),
            play_time: Duration::from_secs(play_time.as_secs()),
            snapshot: *snapshot,
            history: history.clone(),
            description: truncate_description(description).to_string(),
        }
    }

    /// Wrap a legacy snapshot: empty history, no timestamp.
    pub fn from_legacy(snapshot: GameSnapshot) -> Self {
        Self {
            version: LEGACY_VERSION,
            timestamp: 0,
            play_time: Duration::ZERO,
            snapshot,
            history: History::new(),
            description: "Legacy save".to_string(),
        }
    }

    /// Magic tag followed by the record body
    pub fn to_bytes(&self) -> Vec<u8> {
        WireRecord::from_record(self).encode()
    }

    /// Parse and validate a tagged record. Bytes past the record are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SaveError> {
        Ok(WireRecord::decode(bytes)?.into_record()?)
    }

    pub fn is_legacy(&self) -> bool {
        self.version == LEGACY_VERSION
    }
}

/// Write one tagged record in a single `write_all`.
///
/// Any error means the destination holds no usable record.
pub fn write_record<W: Write>(dest: &mut W, record: &SaveRecord) -> Result<(), SaveError> {
    dest.write_all(&record.to_bytes())?;
    dest.flush()?;
    Ok(())
}

/// Read one tagged record: magic tag, then the fixed-size body.
pub fn read_record<R: Read>(src: &mut R) -> Result<SaveRecord, SaveError> {
    let mut magic = [0u8; 4];
    read_exact_or_mismatch(src, &mut magic)?;
    if u32::from_le_bytes(magic) != MAGIC {
        return Err(SaveError::FormatMismatch);
    }

    let mut body = vec![0u8; BODY_LEN];
    read_exact_or_mismatch(src, &mut body)?;
    Ok(WireRecord::decode_body(&body)?.into_record()?)
}

fn read_exact_or_mismatch<R: Read>(src: &mut R, buf: &mut [u8]) -> Result<(), SaveError> {
    match src.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(SaveError::FormatMismatch),
        Err(e) => Err(e.into()),
    }
}

/// Parse a legacy record: score, max score, board size, board.
///
/// Only an input of exactly [`LEGACY_LEN`] bytes is considered legacy.
pub fn decode_legacy(bytes: &[u8]) -> Result<GameSnapshot, SaveError> {
    if bytes.len() != LEGACY_LEN {
        return Err(SaveError::FormatMismatch);
    }

    let mut r = Reader::new(bytes);
    let (score, max_score, board_size) = (
        r.i32().ok_or(SaveError::FormatMismatch)?,
        r.i32().ok_or(SaveError::FormatMismatch)?,
        r.i32().ok_or(SaveError::FormatMismatch)?,
    );
    let board = WireBoard::read(&mut r).ok_or(SaveError::FormatMismatch)?;
    let snapshot = WireSnapshot {
        board,
        stats: WireStats {
            score,
            points: 0,
            max_score,
            game_over: 0,
            auto_save: 0,
            board_size,
        },
    };

    snapshot.validate()?;
    Ok(snapshot.to_snapshot()?)
}

/// Encode a snapshot in the legacy layout (history and flags are dropped).
pub fn encode_legacy(snapshot: &GameSnapshot) -> Vec<u8> {
    let mut out = Vec::with_capacity(LEGACY_LEN);
    out.extend_from_slice(&clamp_i32(snapshot.stats.score).to_le_bytes());
    out.extend_from_slice(&clamp_i32(snapshot.stats.max_score).to_le_bytes());
    out.extend_from_slice(&i32::from(snapshot.stats.board_size).to_le_bytes());
    WireBoard::from_board(&snapshot.board).write(&mut out);
    out
}

// ---------------------------------------------------------------------------
// Wire image
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireBoard {
    /// Row-major, stride 5, regardless of `size`
    pub tiles: [i32; MAX_BOARD_TILES],
    pub size: i32,
}

impl WireBoard {
    fn from_board(board: &Board) -> Self {
        Self {
            tiles: (*board.raw_cells()).map(i32::from),
            size: i32::from(board.size()),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        for t in self.tiles {
            out.extend_from_slice(&t.to_le_bytes());
        }
        out.extend_from_slice(&self.size.to_le_bytes());
    }

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        let mut tiles = [0i32; MAX_BOARD_TILES];
        for t in tiles.iter_mut() {
            *t = r.i32()?;
        }
        Some(Self {
            tiles,
            size: r.i32()?,
        })
    }

    /// Tiles inside the active square must be valid exponents.
    fn validate_tiles(&self) -> Result<(), ValidationError> {
        let size = self.size.clamp(0, MAX_BOARD_SIZE as i32) as usize;
        for y in 0..size {
            for x in 0..size {
                let exponent = self.tiles[y * STRIDE + x];
                if !(0..=i32::from(MAX_EXPONENT)).contains(&exponent) {
                    return Err(ValidationError::TileOutOfRange { x, y, exponent });
                }
            }
        }
        Ok(())
    }

    fn to_board(&self) -> Result<Board, ValidationError> {
        // Cells outside the active square are never read; squash them into range.
        let cells = self.tiles.map(|t| t.clamp(0, i32::from(u8::MAX)) as u8);
        let size = u8::try_from(self.size).map_err(|_| ValidationError::BoardSize(self.size))?;
        Board::from_raw(size, cells).map_err(|e| match e {
            CoreError::InvalidSize(_) => ValidationError::BoardSize(self.size),
            CoreError::InvalidExponent { x, y, exponent } => ValidationError::TileOutOfRange {
                x: x.into(),
                y: y.into(),
                exponent: exponent.into(),
            },
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireStats {
    pub score: i32,
    pub points: i32,
    pub max_score: i32,
    pub game_over: u8,
    pub auto_save: u8,
    pub board_size: i32,
}

impl WireStats {
    fn from_stats(stats: &Stats) -> Self {
        Self {
            score: clamp_i32(stats.score),
            points: clamp_i32(stats.points),
            max_score: clamp_i32(stats.max_score),
            game_over: u8::from(stats.game_over),
            auto_save: u8::from(stats.auto_save),
            board_size: i32::from(stats.board_size),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.score.to_le_bytes());
        out.extend_from_slice(&self.points.to_le_bytes());
        out.extend_from_slice(&self.max_score.to_le_bytes());
        out.push(self.game_over);
        out.push(self.auto_save);
        out.extend_from_slice(&[0, 0]);
        out.extend_from_slice(&self.board_size.to_le_bytes());
    }

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        let score = r.i32()?;
        let points = r.i32()?;
        let max_score = r.i32()?;
        let game_over = r.u8()?;
        let auto_save = r.u8()?;
        r.skip(2)?;
        let board_size = r.i32()?;
        Some(Self {
            score,
            points,
            max_score,
            game_over,
            auto_save,
            board_size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireSnapshot {
    pub board: WireBoard,
    pub stats: WireStats,
}

impl WireSnapshot {
    /// Filler for history slots past the log size
    const UNUSED: Self = Self {
        board: WireBoard {
            tiles: [0; MAX_BOARD_TILES],
            size: 0,
        },
        stats: WireStats {
            score: 0,
            points: 0,
            max_score: 0,
            game_over: 0,
            auto_save: 0,
            board_size: 0,
        },
    };

    fn from_snapshot(snapshot: &GameSnapshot) -> Self {
        Self {
            board: WireBoard::from_board(&snapshot.board),
            stats: WireStats::from_stats(&snapshot.stats),
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        self.board.write(out);
        self.stats.write(out);
    }

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        Some(Self {
            board: WireBoard::read(r)?,
            stats: WireStats::read(r)?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let stats = &self.stats;
        if stats.score < 0 || stats.max_score < 0 {
            return Err(ValidationError::NegativeScore {
                score: stats.score,
                max_score: stats.max_score,
            });
        }
        if !in_board_range(stats.board_size) {
            return Err(ValidationError::BoardSize(stats.board_size));
        }
        if self.board.size != stats.board_size {
            return Err(ValidationError::SizeMismatch {
                board: self.board.size,
                stats: stats.board_size,
            });
        }
        for flag in [stats.game_over, stats.auto_save] {
            if flag > 1 {
                return Err(ValidationError::Flag(flag));
            }
        }
        self.board.validate_tiles()
    }

    fn to_snapshot(&self) -> Result<GameSnapshot, ValidationError> {
        let board = self.board.to_board()?;
        let stats = Stats {
            score: self.stats.score.max(0) as u32,
            points: self.stats.points.max(0) as u32,
            max_score: self.stats.max_score.max(0) as u32,
            game_over: self.stats.game_over == 1,
            auto_save: self.stats.auto_save == 1,
            board_size: board.size(),
        };
        Ok(GameSnapshot::new(board, stats))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireHistory {
    /// Always `HISTORY_CAPACITY` slots; only the first `size` are meaningful
    pub states: Vec<WireSnapshot>,
    pub current: i32,
    pub size: i32,
}

impl WireHistory {
    fn from_history(history: &History) -> Self {
        let mut states: Vec<WireSnapshot> = history
            .entries()
            .iter()
            .map(WireSnapshot::from_snapshot)
            .collect();
        states.resize(HISTORY_CAPACITY, WireSnapshot::UNUSED);
        Self {
            states,
            current: history.cursor().map_or(-1, |c| c as i32),
            size: history.len() as i32,
        }
    }

    fn write(&self, out: &mut Vec<u8>) {
        for state in &self.states {
            state.write(out);
        }
        out.extend_from_slice(&self.current.to_le_bytes());
        out.extend_from_slice(&self.size.to_le_bytes());
    }

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        let mut states = Vec::with_capacity(HISTORY_CAPACITY);
        for _ in 0..HISTORY_CAPACITY {
            states.push(WireSnapshot::read(r)?);
        }
        Some(Self {
            states,
            current: r.i32()?,
            size: r.i32()?,
        })
    }

    fn validate(&self) -> Result<(), ValidationError> {
        let capacity = HISTORY_CAPACITY as i32;
        if self.size < 0 || self.size > capacity {
            return Err(ValidationError::HistorySize(self.size));
        }
        let cursor_ok = if self.size == 0 {
            self.current == -1
        } else {
            (0..self.size).contains(&self.current)
        };
        if !cursor_ok {
            return Err(ValidationError::HistoryCursor {
                current: self.current,
                size: self.size,
            });
        }

        for (index, state) in self.live().iter().enumerate() {
            state
                .validate()
                .map_err(|source| ValidationError::HistoryEntry {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    fn live(&self) -> &[WireSnapshot] {
        let size = self.size.clamp(0, HISTORY_CAPACITY as i32) as usize;
        &self.states[..size.min(self.states.len())]
    }

    fn to_history(&self) -> Result<History, ValidationError> {
        let entries = self
            .live()
            .iter()
            .map(WireSnapshot::to_snapshot)
            .collect::<Result<Vec<_>, _>>()?;
        let cursor = usize::try_from(self.current).ok();
        History::from_parts(entries, cursor).ok_or(ValidationError::HistoryCursor {
            current: self.current,
            size: self.size,
        })
    }
}

/// A record exactly as laid out on disk, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireRecord {
    pub version: i32,
    pub timestamp: i64,
    pub play_time: i32,
    pub snapshot: WireSnapshot,
    pub history: WireHistory,
    pub description: [u8; DESCRIPTION_LEN],
}

impl WireRecord {
    pub fn from_record(record: &SaveRecord) -> Self {
        Self {
            version: record.version,
            timestamp: record.timestamp,
            play_time: i32::try_from(record.play_time.as_secs()).unwrap_or(i32::MAX),
            snapshot: WireSnapshot::from_snapshot(&record.snapshot),
            history: WireHistory::from_history(&record.history),
            description: pack_description(&record.description),
        }
    }

    /// Magic tag followed by the body
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(RECORD_LEN);
        out.extend_from_slice(&MAGIC.to_le_bytes());
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&self.timestamp.to_le_bytes());
        out.extend_from_slice(&self.play_time.to_le_bytes());
        self.snapshot.write(&mut out);
        self.history.write(&mut out);
        out.extend_from_slice(&self.description);
        out
    }

    /// Check the tag and read the body; no validation.
    pub fn decode(bytes: &[u8]) -> Result<Self, SaveError> {
        match bytes.get(..4) {
            Some(tag) if tag == MAGIC.to_le_bytes() => Self::decode_body(&bytes[4..]),
            _ => Err(SaveError::FormatMismatch),
        }
    }

    fn decode_body(body: &[u8]) -> Result<Self, SaveError> {
        let mut r = Reader::new(body);
        Self::read(&mut r).ok_or(SaveError::FormatMismatch)
    }

    fn read(r: &mut Reader<'_>) -> Option<Self> {
        Some(Self {
            version: r.i32()?,
            timestamp: r.i64()?,
            play_time: r.i32()?,
            snapshot: WireSnapshot::read(r)?,
            history: WireHistory::read(r)?,
            description: r.bytes::<DESCRIPTION_LEN>()?,
        })
    }

    /// Decide whether this image is a game that can be loaded.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.version != SAVE_VERSION {
            return Err(ValidationError::UnsupportedVersion {
                found: self.version,
                expected: SAVE_VERSION,
            });
        }
        self.snapshot.validate()?;
        self.history.validate()
    }

    /// Validate, then convert into core types
    pub fn into_record(self) -> Result<SaveRecord, ValidationError> {
        self.validate()?;
        Ok(SaveRecord {
            version: self.version,
            timestamp: self.timestamp,
            play_time: Duration::from_secs(self.play_time.max(0) as u64),
            snapshot: self.snapshot.to_snapshot()?,
            history: self.history.to_history()?,
            description: unpack_description(&self.description),
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn bytes<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let chunk = self.buf.get(self.pos..end)?;
        self.pos = end;
        chunk.try_into().ok()
    }

    fn skip(&mut self, n: usize) -> Option<()> {
        let end = self.pos.checked_add(n)?;
        if end > self.buf.len() {
            return None;
        }
        self.pos = end;
        Some(())
    }

    fn u8(&mut self) -> Option<u8> {
        self.bytes::<1>().map(|[b]| b)
    }

    fn i32(&mut self) -> Option<i32> {
        self.bytes::<4>().map(i32::from_le_bytes)
    }

    fn i64(&mut self) -> Option<i64> {
        self.bytes::<8>().map(i64::from_le_bytes)
    }
}

fn in_board_range(size: i32) -> bool {
    u8::try_from(size).map_or(false, is_valid_board_size)
}

fn clamp_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn truncate_description(text: &str) -> &str {
    let text = text.split('\0').next().unwrap_or_default();
    let mut end = text.len().min(DESCRIPTION_LEN - 1);
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

fn pack_description(text: &str) -> [u8; DESCRIPTION_LEN] {
    let text = truncate_description(text);
    let mut out = [0u8; DESCRIPTION_LEN];
    out[..text.len()].copy_from_slice(text.as_bytes());
    out
}

fn unpack_description(raw: &[u8; DESCRIPTION_LEN]) -> String {
    let end = raw
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(DESCRIPTION_LEN - 1);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
