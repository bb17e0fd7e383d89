//! Game module - one running game and its round state machine
//!
//! Ties the board engine, stats and history together. A round is:
//!
//! ```text
//! Idle -> slide(dir) -> NoOp      -> can_slide ? Idle : GameOver
//!                    -> Committed -> spawn -> history append -> Idle
//! ```
//!
//! `GameOver` is left only through [`Game::restart`].

use std::time::Duration;

use tracing::{debug, info};

use crate::board::{Board, Distances};
use crate::error::CoreError;
use crate::history::History;
use crate::rng::SimpleRng;
use crate::snapshot::{GameSnapshot, Stats};
use crate::types::{Direction, GameAction};

/// What a single action did to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    /// The slide was committed and a tile spawned
    Moved {
        points: u32,
        distances: Distances,
        spawned: Option<(u8, u8)>,
    },
    /// Nothing could move that way, but other directions are open
    Rejected,
    /// Nothing could move in any direction; the game is over
    GameOver,
    Undone,
    Redone,
    Restarted,
    /// The action had no effect (game already over, or nothing to undo/redo)
    Ignored,
}

/// A running game
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    stats: Stats,
    history: History,
    rng: SimpleRng,
    play_time: Duration,
}

impl Game {
    /// Start a fresh game and seed history with the opening board
    pub fn new(size: u8, seed: u32) -> Result<Self, CoreError> {
        let mut rng = SimpleRng::new(seed);
        let board = Board::create(size, &mut rng)?;
        let mut game = Self {
            board,
            stats: Stats::new(size),
            history: History::new(),
            rng,
            play_time: Duration::ZERO,
        };
        game.history.save_state(game.snapshot());
        Ok(game)
    }

    /// Continue a game restored from disk.
    ///
    /// A restored log that is empty (legacy saves carry none) is seeded with
    /// `snapshot` so undo from the first turn is a no-op.
    pub fn resume(snapshot: GameSnapshot, history: History, play_time: Duration, seed: u32) -> Self {
        let mut game = Self {
            board: snapshot.board,
            stats: snapshot.stats,
            history,
            rng: SimpleRng::new(seed),
            play_time,
        };
        if game.history.is_empty() {
            game.history.save_state(snapshot);
        }
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn size(&self) -> u8 {
        self.board.size()
    }

    pub fn score(&self) -> u32 {
        self.stats.score
    }

    pub fn game_over(&self) -> bool {
        self.stats.game_over
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::new(self.board, self.stats)
    }

    pub fn play_time(&self) -> Duration {
        self.play_time
    }

    pub fn add_play_time(&mut self, elapsed: Duration) {
        self.play_time = self.play_time.saturating_add(elapsed);
    }

    /// Record whether this session owns the auto-save file
    pub fn set_auto_save(&mut self, enabled: bool) {
        self.stats.auto_save = enabled;
    }

    /// Apply one action and report what happened
    pub fn apply_action(&mut self, action: GameAction) -> Turn {
        match action {
            GameAction::Slide(dir) => self.slide(dir),
            GameAction::Undo => self.undo(),
            GameAction::Redo => self.redo(),
            GameAction::Restart => self.restart(),
        }
    }

    /// Slide toward `dir`, then spawn a tile and append to history
    pub fn slide(&mut self, dir: Direction) -> Turn {
        if self.stats.game_over {
            return Turn::Ignored;
        }

        match self.board.slide(dir) {
            Some(slide) => {
                self.board = slide.board;
                self.stats.record_points(slide.points);
                let spawned = self.board.spawn(&mut self.rng, false);
                self.history.save_state(self.snapshot());
                debug!(
                    direction = dir.as_str(),
                    points = slide.points,
                    score = self.stats.score,
                    "slide committed"
                );
                Turn::Moved {
                    points: slide.points,
                    distances: slide.distances,
                    spawned,
                }
            }
            None if self.board.can_slide() => Turn::Rejected,
            None => {
                self.stats.game_over = true;
                info!(
                    score = self.stats.score,
                    max_score = self.stats.max_score,
                    "game over"
                );
                Turn::GameOver
            }
        }
    }

    pub fn undo(&mut self) -> Turn {
        match self.history.undo() {
            Some(snapshot) => {
                self.restore(snapshot);
                Turn::Undone
            }
            None => Turn::Ignored,
        }
    }

    pub fn redo(&mut self) -> Turn {
        match self.history.redo() {
            Some(snapshot) => {
                self.restore(snapshot);
                Turn::Redone
            }
            None => Turn::Ignored,
        }
    }

    /// New board of the same size; history restarts from it, best score is kept
    pub fn restart(&mut self) -> Turn {
        self.board.reset(&mut self.rng);
        self.stats.reset_round();
        self.history.clear();
        self.history.save_state(self.snapshot());
        info!(size = self.board.size(), "game restarted");
        Turn::Restarted
    }

    /// State to write on exit: a finished game is restarted first so the
    /// next session does not open on a dead position.
    pub fn exit_snapshot(&mut self) -> GameSnapshot {
        if self.stats.game_over {
            self.restart();
        }
        self.snapshot()
    }

    fn restore(&mut self, snapshot: GameSnapshot) {
        // The auto-save flag belongs to the session, not to the stored snapshot.
        let auto_save = self.stats.auto_save;
        self.board = snapshot.board;
        self.stats = snapshot.stats;
        self.stats.auto_save = auto_save;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stuck_board() -> Board {
        Board::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 1]]).unwrap()
    }

    #[test]
    fn test_new_game_seeds_history() {
        let game = Game::new(4, 7).unwrap();
        assert_eq!(game.size(), 4);
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history().current(), Some(&game.snapshot()));
        assert!(!game.history().can_undo());
    }

    #[test]
    fn test_new_game_rejects_bad_size() {
        assert_eq!(Game::new(7, 1).unwrap_err(), CoreError::InvalidSize(7));
    }

    #[test]
    fn test_committed_slide_spawns_and_records() {
        let board = Board::from_rows(&[[1, 1, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        let mut game = Game::resume(
            GameSnapshot::new(board, Stats::new(3)),
            History::new(),
            Duration::ZERO,
            3,
        );

        let turn = game.slide(Direction::Left);
        match turn {
            Turn::Moved {
                points, spawned, ..
            } => {
                assert_eq!(points, 4);
                assert!(spawned.is_some());
            }
            other => panic!("expected Moved, got {other:?}"),
        }
        assert_eq!(game.score(), 4);
        assert_eq!(game.stats().points, 4);
        assert_eq!(game.board().get(0, 0), Some(2));
        assert_eq!(game.board().empty_count(), 7);
        assert_eq!(game.history().len(), 2);
        assert_eq!(game.history().current(), Some(&game.snapshot()));
    }

    #[test]
    fn test_rejected_slide_leaves_state() {
        let board = Board::from_rows(&[[1, 2, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        let mut game = Game::resume(
            GameSnapshot::new(board, Stats::new(3)),
            History::new(),
            Duration::ZERO,
            3,
        );
        let before = game.snapshot();
        assert_eq!(game.slide(Direction::Left), Turn::Rejected);
        assert_eq!(game.snapshot(), before);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_game_over_only_left_by_restart() {
        let mut game = Game::resume(
            GameSnapshot::new(stuck_board(), Stats::new(3)),
            History::new(),
            Duration::ZERO,
            3,
        );
        assert_eq!(game.slide(Direction::Up), Turn::GameOver);
        assert!(game.game_over());
        assert_eq!(game.slide(Direction::Down), Turn::Ignored);

        assert_eq!(game.restart(), Turn::Restarted);
        assert!(!game.game_over());
        assert_eq!(game.board().empty_count(), 7);
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_undo_restores_previous_and_keeps_session_flag() {
        let mut game = Game::new(4, 11).unwrap();
        let opening = game.snapshot();
        let mut moved = false;
        for dir in Direction::ALL {
            if matches!(game.slide(dir), Turn::Moved { .. }) {
                moved = true;
                break;
            }
        }
        assert!(moved, "a two-tile board always has a legal slide");

        game.set_auto_save(true);
        assert_eq!(game.undo(), Turn::Undone);
        assert_eq!(game.board(), &opening.board);
        assert_eq!(game.score(), opening.stats.score);
        assert!(game.stats().auto_save);

        assert_eq!(game.undo(), Turn::Ignored);
        assert_eq!(game.redo(), Turn::Redone);
        assert_eq!(game.redo(), Turn::Ignored);
    }

    #[test]
    fn test_restart_keeps_max_score() {
        let board = Board::from_rows(&[[3, 3, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
        let mut game = Game::resume(
            GameSnapshot::new(board, Stats::new(3)),
            History::new(),
            Duration::ZERO,
            9,
        );
        game.slide(Direction::Right);
        assert_eq!(game.stats().max_score, 16);
        game.restart();
        assert_eq!(game.score(), 0);
        assert_eq!(game.stats().max_score, 16);
    }

    #[test]
    fn test_exit_snapshot_resets_finished_game() {
        let mut stats = Stats::new(3);
        stats.score = 500;
        let mut game = Game::resume(
            GameSnapshot::new(stuck_board(), stats),
            History::new(),
            Duration::ZERO,
            1,
        );
        game.slide(Direction::Left);
        assert!(game.game_over());

        let snap = game.exit_snapshot();
        assert_eq!(snap.stats.score, 0);
        assert!(!snap.stats.game_over);
        assert_eq!(snap.board.empty_count(), 7);
        assert_eq!(game.history().len(), 1);
        assert_eq!(game.history().current(), Some(&snap));
    }

    #[test]
    fn test_play_time_accumulates() {
        let mut game = Game::new(3, 1).unwrap();
        game.add_play_time(Duration::from_secs(2));
        game.add_play_time(Duration::from_millis(500));
        assert_eq!(game.play_time(), Duration::from_millis(2500));
    }
}
