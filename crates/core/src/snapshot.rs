use crate::board::Board;

/// Score and flags that travel with every board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Stats {
    pub score: u32,
    /// Points earned by the last committed slide
    pub points: u32,
    pub max_score: u32,
    pub game_over: bool,
    pub auto_save: bool,
    pub board_size: u8,
}

impl Stats {
    pub fn new(board_size: u8) -> Self {
        Self {
            score: 0,
            points: 0,
            max_score: 0,
            game_over: false,
            auto_save: false,
            board_size,
        }
    }

    /// Add the points of a committed slide, raising the best score if needed.
    pub fn record_points(&mut self, points: u32) {
        self.points = points;
        self.score = self.score.saturating_add(points);
        self.max_score = self.max_score.max(self.score);
    }

    /// Zero the running game while keeping the best score and session flags.
    pub fn reset_round(&mut self) {
        self.score = 0;
        self.points = 0;
        self.game_over = false;
    }
}

/// The complete game at one instant.
///
/// `Copy` on purpose: history entries and save records hold their own cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub board: Board,
    pub stats: Stats,
}

impl GameSnapshot {
    pub fn new(board: Board, stats: Stats) -> Self {
        Self { board, stats }
    }

    pub fn playable(&self) -> bool {
        !self.stats.game_over
    }
}
