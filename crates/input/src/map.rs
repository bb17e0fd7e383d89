//! Key mapping from terminal events to game actions and commands.

use crate::types::{Direction, GameAction, MAX_BOARD_SIZE, MIN_BOARD_SIZE, SAVE_SLOTS};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Everything a key can ask for while a game is on screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play(GameAction),
    SaveMenu,
    LoadMenu,
    QuickSave,
    QuickLoad,
    Quit,
}

/// Map keyboard input to game actions.
pub fn handle_key_event(key: KeyEvent) -> Option<GameAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        // Slides
        KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('H') => {
            Some(GameAction::Slide(Direction::Left))
        }
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('L') => {
            Some(GameAction::Slide(Direction::Right))
        }
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') => {
            Some(GameAction::Slide(Direction::Up))
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') => {
            Some(GameAction::Slide(Direction::Down))
        }

        // History
        KeyCode::Char('u') => Some(GameAction::Undo),
        KeyCode::Char('U') | KeyCode::Char('y') | KeyCode::Char('Y') => Some(GameAction::Redo),

        // Restart
        KeyCode::Char('r') | KeyCode::Char('R') => Some(GameAction::Restart),

        _ => None,
    }
}

/// Map a key pressed during play, including save/load commands.
pub fn map_playing_key(key: KeyEvent) -> Option<Command> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    if should_quit(key) {
        return Some(Command::Quit);
    }
    match key.code {
        KeyCode::Char('s') | KeyCode::Char('S') => Some(Command::SaveMenu),
        KeyCode::Char('g') | KeyCode::Char('G') => Some(Command::LoadMenu),
        KeyCode::F(5) => Some(Command::QuickSave),
        KeyCode::F(9) => Some(Command::QuickLoad),
        _ => handle_key_event(key).map(Command::Play),
    }
}

/// Check if key should quit the game.
pub fn should_quit(key: KeyEvent) -> bool {
    matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q'))
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL))
}

/// Slot number typed in a slot menu
pub fn slot_digit(key: KeyEvent) -> Option<u8> {
    match key.code {
        KeyCode::Char(c) => c
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .filter(|&d| d < SAVE_SLOTS),
        _ => None,
    }
}

/// Board size picked on the size menu
pub fn size_choice(key: KeyEvent) -> Option<u8> {
    match key.code {
        KeyCode::Char(c) => c
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .filter(|d| (MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(d)),
        _ => None,
    }
}

/// Escape backs out of menus and prompts
pub fn is_cancel(key: KeyEvent) -> bool {
    key.code == KeyCode::Esc
}
