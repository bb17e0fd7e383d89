//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (rules engine, save codec, terminal rendering).
//!
//! # Board Dimensions
//!
//! The playfield is square and its side length is chosen at game start:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `MIN_BOARD_SIZE` | 3 | Smallest playable board (3x3 "mini") |
//! | `MAX_BOARD_SIZE` | 5 | Largest playable board (5x5 "extended") |
//! | `DEFAULT_BOARD_SIZE` | 4 | Classic 4x4 board |
//! | `MAX_BOARD_TILES` | 25 | Storage capacity of every board |
//!
//! Boards always reserve `MAX_BOARD_TILES` cells; a smaller board simply
//! ignores the cells outside its `size x size` square.
//!
//! # Tiles
//!
//! A cell stores an exponent: `0` is empty, `e >= 1` displays `2^e`.
//! The largest exponent a valid game can hold is `MAX_EXPONENT` (17, i.e. 131072).
//!
//! # Persistence
//!
//! - `HISTORY_CAPACITY`: 50 snapshots kept for undo/redo
//! - `SAVE_SLOTS`: 10 named slots (0-9) plus one auto-save file
//! - `DESCRIPTION_LEN`: 64 bytes including the NUL terminator
//!
//! # Examples
//!
//! ```
//! use tui_2048_types::{Direction, GameAction, MAX_BOARD_SIZE, MIN_BOARD_SIZE};
//!
//! let dir = Direction::from_str("up").unwrap();
//! assert_eq!(dir, Direction::Up);
//! assert_eq!(dir.opposite(), Direction::Down);
//!
//! let action = GameAction::from_str("slideLeft").unwrap();
//! assert_eq!(action, GameAction::Slide(Direction::Left));
//!
//! assert!(MIN_BOARD_SIZE <= 4 && 4 <= MAX_BOARD_SIZE);
//! ```

/// Smallest supported board side length
pub const MIN_BOARD_SIZE: u8 = 3;

/// Largest supported board side length
pub const MAX_BOARD_SIZE: u8 = 5;

/// Board size used when nothing else is requested
pub const DEFAULT_BOARD_SIZE: u8 = 4;

/// Cell capacity of every board, independent of its active size
pub const MAX_BOARD_TILES: usize = (MAX_BOARD_SIZE as usize) * (MAX_BOARD_SIZE as usize);

/// Largest tile exponent accepted by validation (2^17 = 131072)
pub const MAX_EXPONENT: u8 = 17;

/// Number of snapshots the undo/redo log retains
pub const HISTORY_CAPACITY: usize = 50;

/// Number of named save slots
pub const SAVE_SLOTS: u8 = 10;

/// Width of the save description field, NUL terminator included
pub const DESCRIPTION_LEN: usize = 64;

/// Chance (out of 10) that a spawned tile is a 2 rather than a 4
pub const SPAWN_TWO_IN_TEN: u32 = 9;

/// Returns true when `size` is a playable board side length.
pub fn is_valid_board_size(size: u8) -> bool {
    (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size)
}

/// Displayed value of a tile exponent (`0` for an empty cell).
///
/// ```
/// use tui_2048_types::tile_value;
///
/// assert_eq!(tile_value(0), 0);
/// assert_eq!(tile_value(1), 2);
/// assert_eq!(tile_value(11), 2048);
/// ```
pub fn tile_value(exponent: u8) -> u32 {
    if exponent == 0 {
        0
    } else {
        1u32 << exponent
    }
}

/// Slide direction
///
/// Tiles travel toward the edge named by the direction: `Left` compacts every
/// row toward column 0, `Up` compacts every column toward row 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// All four directions, in the order `can_slide` tries them
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Parse direction from string (case-insensitive)
    ///
    /// ```
    /// use tui_2048_types::Direction;
    ///
    /// assert_eq!(Direction::from_str("LEFT"), Some(Direction::Left));
    /// assert_eq!(Direction::from_str("r"), Some(Direction::Right));
    /// assert_eq!(Direction::from_str("north"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" | "u" => Some(Direction::Up),
            "down" | "d" => Some(Direction::Down),
            "left" | "l" => Some(Direction::Left),
            "right" | "r" => Some(Direction::Right),
            _ => None,
        }
    }

    /// Convert to lowercase string
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// True for `Left`/`Right`, where each line is a row
    pub fn is_horizontal(&self) -> bool {
        matches!(self, Direction::Left | Direction::Right)
    }
}

/// Game actions that can be applied to a running game
///
/// Persistence commands (save/load menus, quick save) are handled by the
/// driving loop and never reach the rules engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Slide every tile toward an edge
    Slide(Direction),
    /// Step back one snapshot in history
    Undo,
    /// Step forward one snapshot in history
    Redo,
    /// Start a fresh board of the same size
    Restart,
}

impl GameAction {
    /// Parse game action from camelCase string
    ///
    /// ```
    /// use tui_2048_types::{Direction, GameAction};
    ///
    /// assert_eq!(GameAction::from_str("undo"), Some(GameAction::Undo));
    /// assert_eq!(GameAction::from_str("slideUp"), Some(GameAction::Slide(Direction::Up)));
    /// assert_eq!(GameAction::from_str("hold"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "slideUp" => Some(GameAction::Slide(Direction::Up)),
            "slideDown" => Some(GameAction::Slide(Direction::Down)),
            "slideLeft" => Some(GameAction::Slide(Direction::Left)),
            "slideRight" => Some(GameAction::Slide(Direction::Right)),
            "undo" => Some(GameAction::Undo),
            "redo" => Some(GameAction::Redo),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// Convert to camelCase string
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Slide(Direction::Up) => "slideUp",
            GameAction::Slide(Direction::Down) => "slideDown",
            GameAction::Slide(Direction::Left) => "slideLeft",
            GameAction::Slide(Direction::Right) => "slideRight",
            GameAction::Undo => "undo",
            GameAction::Redo => "redo",
            GameAction::Restart => "restart",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_capacity_matches_largest_board() {
        assert_eq!(MAX_BOARD_TILES, 25);
        assert!(is_valid_board_size(MIN_BOARD_SIZE));
        assert!(is_valid_board_size(MAX_BOARD_SIZE));
        assert!(!is_valid_board_size(2));
        assert!(!is_valid_board_size(6));
    }

    #[test]
    fn max_exponent_is_131072() {
        assert_eq!(tile_value(MAX_EXPONENT), 131_072);
    }

    #[test]
    fn direction_roundtrips_through_str() {
        for dir in Direction::ALL {
            assert_eq!(Direction::from_str(dir.as_str()), Some(dir));
            assert_eq!(dir.opposite().opposite(), dir);
        }
        assert!(Direction::Left.is_horizontal());
        assert!(!Direction::Up.is_horizontal());
    }

    #[test]
    fn action_roundtrips_through_str() {
        let actions = [
            GameAction::Slide(Direction::Up),
            GameAction::Slide(Direction::Down),
            GameAction::Slide(Direction::Left),
            GameAction::Slide(Direction::Right),
            GameAction::Undo,
            GameAction::Redo,
            GameAction::Restart,
        ];
        for action in actions {
            assert_eq!(GameAction::from_str(action.as_str()), Some(action));
        }
    }
}
