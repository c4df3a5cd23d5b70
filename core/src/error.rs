use thiserror::Error;

use crate::types::*;

/// Errors raised while building configs, image pools and generators.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GameError {
    #[error("Image pool is empty")]
    EmptyImagePool,
    #[error("Image key {0:?} appears more than once in the pool")]
    DuplicateImageKey(String),
    #[error("Invalid {name} range {min}..={max}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
    },
    #[error("Tile count {0} is outside {min}..={max}", min = MIN_TILES_PER_ROUND, max = MAX_TILES_PER_ROUND)]
    InvalidTileCount(TileCount),
}

pub type Result<T> = core::result::Result<T, GameError>;

/// Why a gameplay call was dropped without touching the game.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Game already ended, no new moves are accepted")]
    GameOver,
    #[error("No game has been started")]
    NotConfigured,
    #[error("Tiles cannot be selected right now")]
    NotInteractive,
    #[error("Tile index is out of bounds")]
    OutOfBounds,
    #[error("Tile is already matched")]
    AlreadyMatched,
    #[error("Tile is already selected")]
    AlreadySelected,
    #[error("Call is not valid in the current state")]
    WrongState,
}
