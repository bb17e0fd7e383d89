//! RNG module - randomness for tile spawning
//!
//! Spawning needs two draws: which empty cell receives the tile, and whether
//! the tile is a 2 or a 4. Both go through [`TileRng`] so tests can script
//! the outcome and replays stay deterministic for a given seed.

use crate::types::SPAWN_TWO_IN_TEN;

/// Source of randomness for the board engine.
pub trait TileRng {
    /// Generate a value in range [0, max). `max` is never 0.
    fn next_range(&mut self, max: u32) -> u32;

    /// Roll the exponent of a freshly spawned tile.
    ///
    /// Returns 1 (value 2) nine times in ten and 2 (value 4) otherwise.
    /// `prefer_high` always yields 2.
    fn roll_exponent(&mut self, prefer_high: bool) -> u8 {
        if prefer_high {
            return 2;
        }
        if self.next_range(10) < SPAWN_TWO_IN_TEN {
            1
        } else {
            2
        }
    }
}

/// Simple LCG (Linear Congruential Generator) RNG
/// Uses constants from Numerical Recipes
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u32,
}

impl SimpleRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u32) -> Self {
        // Avoid 0 seed which would produce all zeros
        let state = if seed == 0 { 1 } else { seed };
        Self { state }
    }

    /// Generate next random u32
    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1664525).wrapping_add(1013904223);
        self.state
    }
}

impl TileRng for SimpleRng {
    fn next_range(&mut self, max: u32) -> u32 {
        // The low bits of an LCG cycle with a short period; use the high half.
        (self.next_u32() >> 16) % max.max(1)
    }
}

/// Replays a fixed list of draws, wrapping around at the end.
///
/// Intended for tests that need to place a tile on a specific cell.
#[derive(Debug, Clone)]
pub struct ScriptedRng {
    draws: Vec<u32>,
    pos: usize,
}

impl ScriptedRng {
    pub fn new(draws: Vec<u32>) -> Self {
        Self { draws, pos: 0 }
    }
}

impl TileRng for ScriptedRng {
    fn next_range(&mut self, max: u32) -> u32 {
        if self.draws.is_empty() {
            return 0;
        }
        let v = self.draws[self.pos % self.draws.len()];
        self.pos += 1;
        v % max.max(1)
    }
}
