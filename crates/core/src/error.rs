use thiserror::Error;

/// Errors raised by the rules engine.
///
/// Rejected slides are not errors; see [`crate::board::Board::slide`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid board size {0} (expected 3, 4 or 5)")]
    InvalidSize(u8),
    #[error("tile exponent {exponent} at ({x}, {y}) exceeds the maximum of 17")]
    InvalidExponent { x: u8, y: u8, exponent: u8 },
}
