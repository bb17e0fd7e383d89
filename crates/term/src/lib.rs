//! Drawing the 2048 screen
//!
//! [`GameView`] paints a [`ViewState`] (board, side panel, menus, status
//! line) into a [`FrameBuffer`] without touching the terminal, so frames can
//! be checked cell by cell in tests. [`TerminalRenderer`] flushes those frames
//! through crossterm, rewriting only the cells that changed since the last
//! draw.

pub mod fb;
pub mod game_view;
pub mod renderer;

pub use tui_2048_core as core;
pub use tui_2048_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use game_view::{GameView, Panel, ViewState, Viewport};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
