//! Terminal 2048 (workspace facade crate).
//!
//! The rules, save format, key mapping and rendering live in dedicated crates
//! under `crates/`; this package re-exports them as
//! `tui_2048::{core, save, input, term, types}` and adds the pieces only the
//! binary needs: configuration, the shutdown watcher and the app state machine.

pub use tui_2048_core as core;
pub use tui_2048_input as input;
pub use tui_2048_save as save;
pub use tui_2048_term as term;
pub use tui_2048_types as types;

pub mod app;
pub mod config;
pub mod shutdown;

pub use app::{App, Flow, Mode};
pub use config::{AppConfig, Args};
pub use shutdown::{ShutdownFlag, ShutdownWatcher};
