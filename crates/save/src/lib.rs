//! Save games - versioned binary records, slots and the auto-save file
//!
//! A saved game is the live [`GameSnapshot`](tui_2048_core::GameSnapshot)
//! plus the whole undo/redo [`History`](tui_2048_core::History), so undo keeps
//! working after a load.
//!
//! # Module Structure
//!
//! - [`codec`]: byte layout, validation, legacy records
//! - [`store`]: numbered save slots in one directory
//! - [`session`]: the auto-save file owned by one run
//! - [`error`]: [`SaveError`] and [`ValidationError`]
//!
//! # Record Layout
//!
//! Little-endian, no implicit padding:
//!
//! | Field | Encoding | Bytes |
//! |-------|----------|-------|
//! | magic | `u32` `0x32303438` | 4 |
//! | version | `i32` | 4 |
//! | timestamp | `i64` seconds | 8 |
//! | play time | `i32` seconds | 4 |
//! | board | 25 x `i32` exponents (stride 5) + `i32` size | 104 |
//! | stats | `i32` score, points, max score; `u8` game over, auto-save; 2 pad; `i32` size | 20 |
//! | history | 50 x (board + stats) + `i32` cursor + `i32` size | 6208 |
//! | description | 64 bytes, NUL-terminated | 64 |
//!
//! The legacy auto-save layout is `i32` score, max score, board size and a
//! board: 116 bytes, no tag, no history.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tui_2048_core::Game;
//! use tui_2048_save::SaveRecord;
//!
//! let game = Game::new(4, 1).unwrap();
//! let record = SaveRecord::encode(&game.snapshot(), game.history(), "demo", Duration::ZERO);
//! let restored = SaveRecord::from_bytes(&record.to_bytes()).unwrap();
//! assert_eq!(restored.snapshot, game.snapshot());
//! assert_eq!(&restored.history, game.history());
//! ```

pub mod codec;
pub mod error;
pub mod session;
pub mod store;

pub use codec::{
    decode_legacy, encode_legacy, read_record, write_record, SaveRecord, WireRecord, LEGACY_LEN,
    LEGACY_VERSION, MAGIC, RECORD_LEN, SAVE_VERSION,
};
pub use error::{SaveError, ValidationError};
pub use session::AutoSave;
pub use store::{validate_slot, SaveStore, SlotInfo, QUICK_SLOT};
