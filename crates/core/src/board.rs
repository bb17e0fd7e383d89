//! Board module - the sliding grid and its transition rules
//!
//! The board is a square of side 3, 4 or 5. Storage is always a flat 5x5 array
//! (row-major, stride 5) so copies are plain value copies and no size ever
//! reallocates; the active `size` only decides which cells are read.
//! Coordinates: (x, y) where x is the column and y the row, both from the
//! top-left corner.
//!
//! Each cell holds an exponent: 0 is empty, `e` displays `2^e`.

use std::fmt;

use arrayvec::ArrayVec;

use crate::error::CoreError;
use crate::rng::TileRng;
use crate::types::{
    is_valid_board_size, tile_value, Direction, MAX_BOARD_SIZE, MAX_BOARD_TILES, MAX_EXPONENT,
};

/// Row stride of the backing array
const STRIDE: usize = MAX_BOARD_SIZE as usize;

/// The game board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Board {
    /// Flat array of exponents, row-major order (y * STRIDE + x)
    cells: [u8; MAX_BOARD_TILES],
    size: u8,
}

/// How far each tile travelled during one slide.
///
/// Indexed by the tile's position BEFORE the slide. Empty cells and tiles
/// that stayed put hold 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Distances {
    cells: [u8; MAX_BOARD_TILES],
    size: u8,
}

impl Distances {
    fn new(size: u8) -> Self {
        Self {
            cells: [0; MAX_BOARD_TILES],
            size,
        }
    }

    /// Distance travelled by the tile that started at (x, y)
    pub fn get(&self, x: u8, y: u8) -> Option<u8> {
        index(self.size, x, y).map(|idx| self.cells[idx])
    }

    /// Number of tiles that moved at all
    pub fn moved_count(&self) -> usize {
        positions(self.size).filter(|&i| self.cells[i] > 0).count()
    }
}

/// A successful slide: the new board, per-tile travel, and merge points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slide {
    pub board: Board,
    pub distances: Distances,
    /// Sum of the values of every tile created by a merge (in 2^e terms).
    /// Zero for a slide that only compacted.
    pub points: u32,
}

#[inline(always)]
fn index(size: u8, x: u8, y: u8) -> Option<usize> {
    if x >= size || y >= size {
        return None;
    }
    Some((y as usize) * STRIDE + (x as usize))
}

/// Flat indices of the active `size x size` square, row by row.
fn positions(size: u8) -> impl Iterator<Item = usize> {
    let size = size as usize;
    (0..size).flat_map(move |y| (0..size).map(move |x| y * STRIDE + x))
}

/// Flat index of the `k`-th cell of `line`, counted from the edge tiles move toward.
#[inline(always)]
fn line_cell(size: usize, dir: Direction, line: usize, k: usize) -> usize {
    let (x, y) = match dir {
        Direction::Left => (k, line),
        Direction::Right => (size - 1 - k, line),
        Direction::Up => (line, k),
        Direction::Down => (line, size - 1 - k),
    };
    y * STRIDE + x
}

fn check_exponent(x: u8, y: u8, exponent: u8) -> Result<(), CoreError> {
    if exponent > MAX_EXPONENT {
        return Err(CoreError::InvalidExponent { x, y, exponent });
    }
    Ok(())
}

impl Board {
    /// Create an empty board of the given size
    pub fn empty(size: u8) -> Result<Self, CoreError> {
        if !is_valid_board_size(size) {
            return Err(CoreError::InvalidSize(size));
        }
        Ok(Self {
            cells: [0; MAX_BOARD_TILES],
            size,
        })
    }

    /// Create a starting board: empty, then two spawned tiles
    pub fn create<R: TileRng + ?Sized>(size: u8, rng: &mut R) -> Result<Self, CoreError> {
        let mut board = Self::empty(size)?;
        board.reset(rng);
        Ok(board)
    }

    /// Clear every cell and spawn the two starting tiles, keeping the size
    pub fn reset<R: TileRng + ?Sized>(&mut self, rng: &mut R) {
        self.cells = [0; MAX_BOARD_TILES];
        self.spawn(rng, false);
        self.spawn(rng, false);
    }

    /// Build a board from its raw backing array.
    ///
    /// Cells outside the active square are kept as-is and never read. Cells
    /// inside it must hold exponents up to [`MAX_EXPONENT`].
    pub fn from_raw(size: u8, cells: [u8; MAX_BOARD_TILES]) -> Result<Self, CoreError> {
        if !is_valid_board_size(size) {
            return Err(CoreError::InvalidSize(size));
        }
        for y in 0..size {
            for x in 0..size {
                check_exponent(x, y, cells[y as usize * STRIDE + x as usize])?;
            }
        }
        Ok(Self { cells, size })
    }

    /// Build a board from rows of exponents; the row count sets the size.
    ///
    /// ```
    /// use tui_2048_core::Board;
    ///
    /// let board = Board::from_rows(&[[1, 0, 0], [0, 2, 0], [0, 0, 3]]).unwrap();
    /// assert_eq!(board.size(), 3);
    /// assert_eq!(board.get(1, 1), Some(2));
    /// ```
    pub fn from_rows<const N: usize>(rows: &[[u8; N]; N]) -> Result<Self, CoreError> {
        let size = u8::try_from(N).map_err(|_| CoreError::InvalidSize(u8::MAX))?;
        let mut board = Self::empty(size)?;
        for (y, row) in rows.iter().enumerate() {
            for (x, &e) in row.iter().enumerate() {
                check_exponent(x as u8, y as u8, e)?;
                board.cells[y * STRIDE + x] = e;
            }
        }
        Ok(board)
    }

    /// Side length of the active square
    pub fn size(&self) -> u8 {
        self.size
    }

    /// Get the exponent at (x, y); None if outside the active square
    pub fn get(&self, x: u8, y: u8) -> Option<u8> {
        index(self.size, x, y).map(|idx| self.cells[idx])
    }

    /// Set the exponent at (x, y); returns false if outside the active square
    /// or above [`MAX_EXPONENT`]
    pub fn set(&mut self, x: u8, y: u8, exponent: u8) -> bool {
        match index(self.size, x, y) {
            Some(idx) if exponent <= MAX_EXPONENT => {
                self.cells[idx] = exponent;
                true
            }
            _ => false,
        }
    }

    /// Raw backing array, including cells outside the active square
    pub fn raw_cells(&self) -> &[u8; MAX_BOARD_TILES] {
        &self.cells
    }

    /// Iterate the active rows as slices
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        let size = self.size as usize;
        self.cells.chunks(STRIDE).take(size).map(move |row| &row[..size])
    }

    pub fn empty_count(&self) -> usize {
        positions(self.size).filter(|&i| self.cells[i] == 0).count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    /// Largest exponent on the board (0 when empty)
    pub fn highest_exponent(&self) -> u8 {
        positions(self.size).map(|i| self.cells[i]).max().unwrap_or(0)
    }

    /// Sum of displayed tile values
    pub fn tile_sum(&self) -> u64 {
        positions(self.size)
            .map(|i| u64::from(tile_value(self.cells[i])))
            .sum()
    }

    /// Place one new tile on a uniformly chosen empty cell.
    ///
    /// The tile is a 2 with probability 0.9 and a 4 otherwise; `prefer_high`
    /// forces a 4. Returns the chosen (x, y), or None when the board is full.
    pub fn spawn<R: TileRng + ?Sized>(&mut self, rng: &mut R, prefer_high: bool) -> Option<(u8, u8)> {
        let free: ArrayVec<usize, MAX_BOARD_TILES> =
            positions(self.size).filter(|&i| self.cells[i] == 0).collect();
        if free.is_empty() {
            return None;
        }

        let pick = free[rng.next_range(free.len() as u32) as usize];
        self.cells[pick] = rng.roll_exponent(prefer_high);
        Some(((pick % STRIDE) as u8, (pick / STRIDE) as u8))
    }

    /// Slide every tile toward `dir`.
    ///
    /// Each line is compacted toward the leading edge; two equal neighbours
    /// merge into one tile of the next exponent, and a tile produced by a
    /// merge does not merge again in the same slide. Tiles already at
    /// `MAX_EXPONENT` never merge.
    ///
    /// Returns None when no tile would move (the move is illegal). A legal
    /// slide may score 0 points when it only compacts.
    ///
    /// ```
    /// use tui_2048_core::Board;
    /// use tui_2048_types::Direction;
    ///
    /// let board = Board::from_rows(&[[1, 1, 2], [0, 0, 0], [0, 0, 0]]).unwrap();
    /// let slide = board.slide(Direction::Left).unwrap();
    /// assert_eq!(slide.board.get(0, 0), Some(2));
    /// assert_eq!(slide.board.get(1, 0), Some(2));
    /// assert_eq!(slide.points, 4);
    ///
    /// // Nothing can move left any more on this row.
    /// let blocked = Board::from_rows(&[[1, 2, 0], [0, 0, 0], [0, 0, 0]]).unwrap();
    /// assert!(blocked.slide(Direction::Left).is_none());
    /// ```
    pub fn slide(&self, dir: Direction) -> Option<Slide> {
        let size = self.size as usize;
        let mut out = *self;
        let mut distances = Distances::new(self.size);
        let mut points = 0u32;
        let mut moved = false;

        for line in 0..size {
            for k in 0..size {
                out.cells[line_cell(size, dir, line, k)] = 0;
            }

            // `open` is the slot of the last placed tile that may still merge.
            let mut write = 0usize;
            let mut open: Option<usize> = None;

            for k in 0..size {
                let src = line_cell(size, dir, line, k);
                let e = self.cells[src];
                if e == 0 {
                    continue;
                }

                let landed = match open {
                    Some(slot)
                        if e < MAX_EXPONENT && out.cells[line_cell(size, dir, line, slot)] == e =>
                    {
                        out.cells[line_cell(size, dir, line, slot)] = e + 1;
                        points += tile_value(e + 1);
                        open = None;
                        slot
                    }
                    _ => {
                        out.cells[line_cell(size, dir, line, write)] = e;
                        open = Some(write);
                        write += 1;
                        write - 1
                    }
                };

                let travelled = (k - landed) as u8;
                distances.cells[src] = travelled;
                moved |= travelled > 0;
            }
        }

        moved.then_some(Slide {
            board: out,
            distances,
            points,
        })
    }

    /// True if at least one direction is a legal slide.
    ///
    /// A full board can still slide when two equal tiles are adjacent.
    pub fn can_slide(&self) -> bool {
        Direction::ALL.iter().any(|&dir| self.slide(dir).is_some())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for (x, &e) in row.iter().enumerate() {
                if x > 0 {
                    write!(f, " ")?;
                }
                if e == 0 {
                    write!(f, "{:>6}", ".")?;
                } else {
                    write!(f, "{:>6}", tile_value(e))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{ScriptedRng, SimpleRng};

    fn row4(cells: [u8; 4]) -> Board {
        Board::from_rows(&[cells, [0; 4], [0; 4], [0; 4]]).unwrap()
    }

    fn first_row(board: &Board) -> Vec<u8> {
        board.rows().next().unwrap().to_vec()
    }

    #[test]
    fn test_board_index_calculation() {
        assert_eq!(index(4, 0, 0), Some(0));
        assert_eq!(index(4, 3, 0), Some(3));
        assert_eq!(index(4, 0, 1), Some(5));
        assert_eq!(index(5, 4, 4), Some(24));
        assert_eq!(index(4, 4, 0), None);
        assert_eq!(index(3, 0, 3), None);
    }

    #[test]
    fn test_empty_rejects_bad_sizes() {
        assert_eq!(Board::empty(2), Err(CoreError::InvalidSize(2)));
        assert_eq!(Board::empty(6), Err(CoreError::InvalidSize(6)));
        assert!(Board::empty(3).is_ok());
    }

    #[test]
    fn test_create_spawns_two_tiles() {
        let mut rng = SimpleRng::new(99);
        for size in 3..=5 {
            let board = Board::create(size, &mut rng).unwrap();
            let occupied = (size as usize).pow(2) - board.empty_count();
            assert_eq!(occupied, 2);
        }
    }

    #[test]
    fn test_cells_outside_active_square_are_ignored() {
        let mut cells = [0u8; MAX_BOARD_TILES];
        cells[4] = 9; // column 4 of a 3x3 board
        let board = Board::from_raw(3, cells).unwrap();
        assert_eq!(board.empty_count(), 9);
        assert_eq!(board.highest_exponent(), 0);
        assert!(board.slide(Direction::Right).is_none());
    }

    #[test]
    fn test_out_of_range_exponents_are_rejected() {
        assert_eq!(
            Board::from_rows(&[[40, 0, 0], [0, 0, 0], [0, 0, 0]]),
            Err(CoreError::InvalidExponent { x: 0, y: 0, exponent: 40 })
        );
        assert!(Board::from_rows(&[[0, 0, 0], [0, 0, 0], [0, 0, MAX_EXPONENT]]).is_ok());

        let mut cells = [0u8; MAX_BOARD_TILES];
        cells[STRIDE + 2] = MAX_EXPONENT + 1;
        assert_eq!(
            Board::from_raw(3, cells),
            Err(CoreError::InvalidExponent { x: 2, y: 1, exponent: 18 })
        );

        let mut board = Board::empty(4).unwrap();
        assert!(!board.set(1, 1, 32));
        assert_eq!(board.get(1, 1), Some(0));
        assert!(board.set(1, 1, MAX_EXPONENT));
        assert_eq!(board.tile_sum(), 1 << 17);
    }

    #[test]
    fn test_slide_merges_pairs_once() {
        let slide = row4([1, 1, 1, 1]).slide(Direction::Left).unwrap();
        assert_eq!(first_row(&slide.board), vec![2, 2, 0, 0]);
        assert_eq!(slide.points, 8);
        assert_eq!(slide.distances.get(0, 0), Some(0));
        assert_eq!(slide.distances.get(1, 0), Some(1));
        assert_eq!(slide.distances.get(2, 0), Some(1));
        assert_eq!(slide.distances.get(3, 0), Some(2));
    }

    #[test]
    fn test_merged_tile_does_not_merge_again() {
        let slide = row4([1, 0, 1, 2]).slide(Direction::Left).unwrap();
        assert_eq!(first_row(&slide.board), vec![2, 2, 0, 0]);
        assert_eq!(slide.points, 4);
        assert_eq!(slide.distances.get(2, 0), Some(2));
        assert_eq!(slide.distances.get(3, 0), Some(2));
    }

    #[test]
    fn test_slide_right_merges_from_leading_edge() {
        let slide = row4([2, 2, 1, 1]).slide(Direction::Right).unwrap();
        assert_eq!(first_row(&slide.board), vec![0, 0, 3, 2]);
        assert_eq!(slide.points, 12);
        assert_eq!(slide.distances.get(3, 0), Some(0));
        assert_eq!(slide.distances.get(2, 0), Some(1));
        assert_eq!(slide.distances.get(1, 0), Some(1));
        assert_eq!(slide.distances.get(0, 0), Some(2));
    }

    #[test]
    fn test_slide_vertical() {
        let board = Board::from_rows(&[[1, 0, 0], [0, 0, 0], [1, 0, 2]]).unwrap();

        let up = board.slide(Direction::Up).unwrap();
        assert_eq!(up.board.get(0, 0), Some(2));
        assert_eq!(up.board.get(2, 0), Some(2));
        assert_eq!(up.distances.get(0, 2), Some(2));
        assert_eq!(up.distances.get(2, 2), Some(2));
        assert_eq!(up.points, 4);

        let down = board.slide(Direction::Down).unwrap();
        assert_eq!(down.board.get(0, 2), Some(2));
        assert_eq!(down.board.get(2, 2), Some(2));
        assert_eq!(down.distances.get(0, 0), Some(2));
        assert_eq!(down.distances.get(2, 2), Some(0));
    }

    #[test]
    fn test_blocked_slide_is_none() {
        assert!(row4([1, 2, 0, 0]).slide(Direction::Left).is_none());
        assert!(Board::empty(4).unwrap().slide(Direction::Up).is_none());
    }

    #[test]
    fn test_compaction_only_scores_zero() {
        let slide = row4([0, 0, 0, 1]).slide(Direction::Left).unwrap();
        assert_eq!(first_row(&slide.board), vec![1, 0, 0, 0]);
        assert_eq!(slide.points, 0);
        assert_eq!(slide.distances.get(3, 0), Some(3));
        assert_eq!(slide.distances.moved_count(), 1);
    }

    #[test]
    fn test_max_exponent_tiles_do_not_merge() {
        assert!(row4([17, 17, 0, 0]).slide(Direction::Left).is_none());
        let slide = row4([0, 17, 17, 0]).slide(Direction::Left).unwrap();
        assert_eq!(first_row(&slide.board), vec![17, 17, 0, 0]);
        assert_eq!(slide.points, 0);
    }

    #[test]
    fn test_can_slide_full_board() {
        let locked = Board::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 1]]).unwrap();
        assert!(locked.is_full());
        assert!(!locked.can_slide());

        let open = Board::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 2]]).unwrap();
        assert!(open.is_full());
        assert!(open.can_slide());
    }

    #[test]
    fn test_spawn_fills_chosen_cell() {
        let mut board = Board::empty(3).unwrap();
        // Draw 4 picks the fifth free cell (1, 1); draw 0 rolls a 2.
        let mut rng = ScriptedRng::new(vec![4, 0]);
        assert_eq!(board.spawn(&mut rng, false), Some((1, 1)));
        assert_eq!(board.get(1, 1), Some(1));

        let mut rng = ScriptedRng::new(vec![0]);
        assert_eq!(board.spawn(&mut rng, true), Some((0, 0)));
        assert_eq!(board.get(0, 0), Some(2));
    }

    #[test]
    fn test_spawn_on_full_board_is_noop() {
        let mut board = Board::from_rows(&[[1, 2, 1], [2, 1, 2], [1, 2, 1]]).unwrap();
        let before = board;
        let mut rng = SimpleRng::new(5);
        assert_eq!(board.spawn(&mut rng, false), None);
        assert_eq!(board, before);
    }

    #[test]
    fn test_display_shows_values() {
        let board = Board::from_rows(&[[11, 0, 0], [0, 0, 0], [0, 0, 1]]).unwrap();
        let text = board.to_string();
        assert!(text.contains("2048"));
        assert_eq!(text.lines().count(), 3);
    }
}
