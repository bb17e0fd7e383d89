//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains the rules of sliding-tile 2048 and the undo/redo log.
//! It has **zero dependencies** on UI, terminal or file I/O, making it:
//!
//! - **Deterministic**: Same seed produces identical games
//! - **Testable**: Comprehensive unit tests for all game rules
//! - **Portable**: Can run in any environment (terminal, GUI, headless)
//! - **Allocation-free**: Boards and history live in fixed-capacity storage
//!
//! # Module Structure
//!
//! - [`board`]: 3x3 to 5x5 board with sliding, merging and tile spawning
//! - [`snapshot`]: Score/flags ([`Stats`]) and the (board, stats) [`GameSnapshot`]
//! - [`history`]: Bounded, truncating undo/redo log of snapshots
//! - [`game`]: One running game and its round state machine
//! - [`rng`]: Tile spawn randomness (seeded LCG, scripted source for tests)
//!
//! # Game Rules
//!
//! - **Slide**: every line is compacted toward the chosen edge
//! - **Merge**: two equal neighbours merge once per slide into the next power of two
//! - **Points**: each merge scores the value of the tile it creates
//! - **Spawn**: after every legal slide a 2 (90%) or 4 (10%) appears on an empty cell
//! - **Game over**: no direction can move any tile
//!
//! # Example
//!
//! ```
//! use tui_2048_core::{Game, Turn};
//! use tui_2048_types::{Direction, GameAction};
//!
//! let mut game = Game::new(4, 12345).unwrap();
//!
//! // Try every direction until one is legal.
//! let moved = Direction::ALL
//!     .iter()
//!     .any(|&dir| matches!(game.apply_action(GameAction::Slide(dir)), Turn::Moved { .. }));
//! assert!(moved);
//!
//! // The opening board is one undo away.
//! assert_eq!(game.apply_action(GameAction::Undo), Turn::Undone);
//! ```

pub mod board;
pub mod error;
pub mod game;
pub mod history;
pub mod rng;
pub mod snapshot;

pub use tui_2048_types as types;

// Re-export commonly used types for convenience
pub use board::{Board, Distances, Slide};
pub use error::CoreError;
pub use game::{Game, Turn};
pub use history::History;
pub use rng::{ScriptedRng, SimpleRng, TileRng};
pub use snapshot::{GameSnapshot, Stats};
