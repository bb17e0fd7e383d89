//! Terminal input module (engine-facing).
//!
//! This module is intentionally independent of any UI framework. It maps
//! `crossterm` key events into [`crate::types::GameAction`] for the rules
//! engine and into [`Command`] for the save/load menus around it.

pub mod map;

pub use tui_2048_types as types;

pub use map::{
    handle_key_event, is_cancel, map_playing_key, should_quit, size_choice, slot_digit, Command,
};
