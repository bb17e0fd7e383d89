//! The key-driven application state machine.
//!
//! ```text
//! ChooseSize -> Playing <-> SaveSlot -> SaveDescription
//!                       <-> LoadSlot
//! ```
//!
//! `App` owns the running [`Game`], the slot store and the auto-save session.
//! It does no terminal I/O, so every transition can be driven from tests with
//! synthetic key events.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::{CoreError, Game, Turn};
use crate::input::{is_cancel, map_playing_key, should_quit, size_choice, slot_digit, Command};
use crate::save::{AutoSave, SaveError, SaveRecord, SaveStore, SlotInfo};
use crate::term::{FrameBuffer, GameView, Panel, ViewState, Viewport};
use crate::types::{GameAction, DESCRIPTION_LEN};

/// Which screen has the keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    ChooseSize,
    Playing,
    SaveSlot,
    SaveDescription { slot: u8, text: String },
    LoadSlot,
}

/// What the loop should do after a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct App {
    mode: Mode,
    game: Option<Game>,
    store: SaveStore,
    autosave: AutoSave,
    seed: u32,
    status: String,
    slot_lines: Vec<String>,
}

impl App {
    /// Build the app; with a configured board size the game starts at once.
    pub fn new(config: &AppConfig, autosave: AutoSave) -> Self {
        let mut app = Self {
            mode: Mode::ChooseSize,
            game: None,
            store: SaveStore::new(&config.save_dir),
            autosave,
            seed: config.seed(),
            status: String::new(),
            slot_lines: Vec::new(),
        };
        if let Some(size) = config.board_size {
            // Sizes in the config are validated when it is built.
            if let Err(e) = app.start_game(size) {
                app.status = e.to_string();
            }
        }
        app
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    /// Start playing on a `size` board, resuming the auto-save if it matches.
    pub fn start_game(&mut self, size: u8) -> Result<(), CoreError> {
        let seed = self.next_seed();
        let resumed = match self.autosave.can_load().then(|| self.autosave.load()) {
            Some(Ok(record)) if record.snapshot.board.size() == size => Some(record),
            Some(Ok(record)) => {
                info!(
                    saved = record.snapshot.board.size(),
                    chosen = size,
                    "auto-save board size differs, starting fresh"
                );
                None
            }
            Some(Err(SaveError::FormatMismatch)) | None => None,
            Some(Err(e)) => {
                warn!(error = %e, "auto-save not loaded");
                None
            }
        };

        let game = match resumed {
            Some(record) => {
                self.status = "Resumed from auto-save".to_string();
                Game::resume(record.snapshot, record.history, record.play_time, seed)
            }
            None => {
                self.status.clear();
                Game::new(size, seed)?
            }
        };
        self.install(game);
        Ok(())
    }

    /// Count play time while a live game is on screen.
    pub fn tick(&mut self, elapsed: Duration) {
        if let (Mode::Playing, Some(game)) = (&self.mode, self.game.as_mut()) {
            if !game.game_over() {
                game.add_play_time(elapsed);
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        if key.kind == KeyEventKind::Release {
            return Flow::Continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Flow::Quit;
        }

        match self.mode.clone() {
            Mode::ChooseSize => {
                if should_quit(key) {
                    return Flow::Quit;
                }
                if let Some(size) = size_choice(key) {
                    if let Err(e) = self.start_game(size) {
                        self.status = e.to_string();
                    }
                }
            }
            Mode::Playing => match map_playing_key(key) {
                Some(Command::Quit) => return Flow::Quit,
                Some(Command::Play(action)) => self.play(action),
                Some(Command::SaveMenu) => self.open_slots(Mode::SaveSlot),
                Some(Command::LoadMenu) => self.open_slots(Mode::LoadSlot),
                Some(Command::QuickSave) => self.quick_save(),
                Some(Command::QuickLoad) => {
                    let result = self.store.quick_load();
                    self.apply_load(result, "quick save");
                }
                None => {}
            },
            Mode::SaveSlot => {
                if is_cancel(key) {
                    self.mode = Mode::Playing;
                } else if let Some(slot) = slot_digit(key) {
                    self.mode = Mode::SaveDescription {
                        slot,
                        text: String::new(),
                    };
                }
            }
            Mode::SaveDescription { slot, mut text } => match key.code {
                KeyCode::Esc => self.mode = Mode::Playing,
                KeyCode::Enter => self.save_to(slot, &text),
                KeyCode::Backspace => {
                    text.pop();
                    self.mode = Mode::SaveDescription { slot, text };
                }
                KeyCode::Char(c) if !c.is_control() => {
                    if text.len() + c.len_utf8() < DESCRIPTION_LEN {
                        text.push(c);
                    }
                    self.mode = Mode::SaveDescription { slot, text };
                }
                _ => {}
            },
            Mode::LoadSlot => {
                if is_cancel(key) {
                    self.mode = Mode::Playing;
                } else if let Some(slot) = slot_digit(key) {
                    let result = self.store.load_slot(slot);
                    self.apply_load(result, &format!("slot {slot}"));
                }
            }
        }
        Flow::Continue
    }

    /// Draw the current screen into `fb`.
    pub fn render_into(&self, view: &GameView, viewport: Viewport, fb: &mut FrameBuffer) {
        let prompt_label;
        let snapshot = self.game.as_ref().map(Game::snapshot);
        let mut state = ViewState::new(snapshot.as_ref());
        state.status = &self.status;
        if let Some(game) = &self.game {
            state.undo_count = game.history().undo_count();
            state.redo_count = game.history().redo_count();
            state.play_time = game.play_time();
        }

        state.panel = match &self.mode {
            Mode::ChooseSize => Panel::SizeMenu,
            Mode::Playing => Panel::Board,
            Mode::SaveSlot => Panel::Slots {
                title: "Save to which slot? (Esc cancels)",
                lines: &self.slot_lines,
            },
            Mode::LoadSlot => Panel::Slots {
                title: "Load which slot? (Esc cancels)",
                lines: &self.slot_lines,
            },
            Mode::SaveDescription { slot, text } => {
                prompt_label = format!("Description for slot {slot}");
                Panel::Prompt {
                    label: &prompt_label,
                    text,
                }
            }
        };
        view.render_into(&state, viewport, fb);
    }

    /// Write the auto-save (if enabled) and end the session.
    ///
    /// Returns whether anything was written.
    pub fn finish(self) -> Result<bool, SaveError> {
        let Self {
            game, autosave, ..
        } = self;
        let Some(mut game) = game else {
            return Ok(false);
        };
        if !autosave.is_enabled() {
            return Ok(false);
        }

        let snapshot = game.exit_snapshot();
        autosave.save_and_close(&snapshot, game.history(), game.play_time())?;
        Ok(true)
    }

    fn play(&mut self, action: GameAction) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        let turn = game.apply_action(action);
        self.status = match (turn, action) {
            (Turn::Moved { .. }, _) | (Turn::Rejected, _) => String::new(),
            (Turn::GameOver, _) => "Game over! Press r to restart".to_string(),
            (Turn::Undone, _) => "Undo".to_string(),
            (Turn::Redone, _) => "Redo".to_string(),
            (Turn::Restarted, _) => "New game".to_string(),
            (Turn::Ignored, GameAction::Undo) => "Nothing to undo".to_string(),
            (Turn::Ignored, GameAction::Redo) => "Nothing to redo".to_string(),
            (Turn::Ignored, _) => "Game over! Press r to restart".to_string(),
        };
    }

    fn open_slots(&mut self, mode: Mode) {
        self.slot_lines = self.store.list_slots().iter().map(slot_line).collect();
        self.mode = mode;
    }

    fn save_to(&mut self, slot: u8, text: &str) {
        self.mode = Mode::Playing;
        let Some(game) = &self.game else {
            return;
        };
        let description = if text.trim().is_empty() {
            format!("Slot {slot}")
        } else {
            text.to_string()
        };
        self.status = match self.store.save_slot(
            slot,
            &game.snapshot(),
            game.history(),
            &description,
            game.play_time(),
        ) {
            Ok(_) => format!("Saved to slot {slot}"),
            Err(e) => format!("Save failed: {e}"),
        };
    }

    fn quick_save(&mut self) {
        let Some(game) = &self.game else {
            return;
        };
        self.status = match self
            .store
            .quick_save(&game.snapshot(), game.history(), game.play_time())
        {
            Ok(_) => "Quick saved".to_string(),
            Err(e) => format!("Quick save failed: {e}"),
        };
    }

    /// Replace the live game with a loaded one; a failed load changes nothing.
    fn apply_load(&mut self, result: Result<SaveRecord, SaveError>, source: &str) {
        self.mode = Mode::Playing;
        match result {
            Ok(record) => {
                let size = record.snapshot.board.size();
                let switched = self.game.as_ref().map_or(false, |g| g.size() != size);
                let seed = self.next_seed();
                self.install(Game::resume(
                    record.snapshot,
                    record.history,
                    record.play_time,
                    seed,
                ));
                self.status = if switched {
                    format!("Loaded {source} ({size}x{size} board)")
                } else {
                    format!("Loaded {source}")
                };
            }
            Err(e) => self.status = format!("Load failed: {e}"),
        }
    }

    fn install(&mut self, mut game: Game) {
        game.set_auto_save(self.autosave.is_enabled());
        info!(size = game.size(), score = game.score(), "game ready");
        self.game = Some(game);
        self.mode = Mode::Playing;
    }

    fn next_seed(&mut self) -> u32 {
        let seed = self.seed;
        self.seed = self.seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        seed
    }
}

fn slot_line(info: &SlotInfo) -> String {
    match (info.present, info.board_size) {
        (true, Some(size)) => format!(
            "{}  {}  [{size}x{size}]  ({})",
            info.slot,
            info.description,
            format_timestamp(info.timestamp)
        ),
        (true, None) => format!("{}  (unreadable)", info.slot),
        (false, _) => format!("{}  (empty)", info.slot),
    }
}

/// `YYYY-MM-DD HH:MM` in UTC, or "Unknown time" for unset stamps.
fn format_timestamp(secs: i64) -> String {
    if secs <= 0 {
        return "Unknown time".to_string();
    }
    let days = secs.div_euclid(86_400);
    let rem = secs.rem_euclid(86_400);

    // Days since 1970-01-01 to a civil date, with 400-year eras starting in March.
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);

    format!(
        "{year:04}-{month:02}-{day:02} {:02}:{:02}",
        rem / 3_600,
        rem % 3_600 / 60
    )
}
