//! Headless game-state engine for a partially-occluded tile pairing game.
//!
//! A round deals a shuffled set of paired tiles; the player picks two at a time and earns points
//! for every pair whose faces match, with a combo bonus for streaks and a penalty for misses.
//! Rounds end when the board is cleared or when no two remaining tiles can pair up anymore.

use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

pub use engine::*;
pub use error::*;
pub use event::*;
pub use generator::*;
pub use record::*;
pub use score::*;
pub use settings::*;
pub use tile::*;
pub use timer::*;
pub use types::*;
pub use validator::*;

mod engine;
mod error;
mod event;
mod generator;
mod record;
mod score;
mod settings;
mod tile;
mod timer;
mod types;
mod validator;

/// Occlusion drawn for every tile unless the config says otherwise.
pub const DEFAULT_OCCLUSION_RANGE: RangeInclusive<f64> = 0.2..=0.65;

/// Rotation in degrees drawn for modes that rotate their tiles.
pub const DEFAULT_ROTATION_RANGE: RangeInclusive<f64> = -30.0..=30.0;

pub const DEFAULT_GRID_COLUMNS: u8 = 5;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameMode {
    Classic,
    Challenge,
}

impl GameMode {
    /// Stable numeric id, used when storing finished sessions.
    pub const fn id(self) -> u8 {
        match self {
            Self::Classic => 1,
            Self::Challenge => 2,
        }
    }

    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Classic),
            2 => Some(Self::Challenge),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Classic => "Classic",
            Self::Challenge => "Challenge",
        }
    }

    pub const fn has_rotation(self) -> bool {
        matches!(self, Self::Challenge)
    }
}

impl Default for GameMode {
    fn default() -> Self {
        Self::Classic
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub mode: GameMode,
    pub tiles_count: TileCount,
    pub grid_columns: u8,
    pub occlusion_range: RangeInclusive<f64>,
    pub rotation_range: RangeInclusive<f64>,
}

impl GameConfig {
    /// Builds a config without clamping the tile count, useful for hand-built boards.
    pub fn new_unchecked(mode: GameMode, tiles_count: TileCount) -> Self {
        Self {
            mode,
            tiles_count,
            grid_columns: DEFAULT_GRID_COLUMNS,
            occlusion_range: DEFAULT_OCCLUSION_RANGE,
            rotation_range: if mode.has_rotation() {
                DEFAULT_ROTATION_RANGE
            } else {
                0.0..=0.0
            },
        }
    }

    pub fn new(mode: GameMode, tiles_count: TileCount) -> Self {
        Self::new_unchecked(mode, clamp_tile_count(tiles_count))
    }

    pub fn checked(mode: GameMode, tiles_count: TileCount) -> Result<Self> {
        if TILE_COUNT_RANGE.contains(&tiles_count) {
            Ok(Self::new_unchecked(mode, tiles_count))
        } else {
            Err(GameError::InvalidTileCount(tiles_count))
        }
    }

    pub fn with_occlusion_range(mut self, range: RangeInclusive<f64>) -> Result<Self> {
        let (min, max) = (*range.start(), *range.end());
        if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
            return Err(GameError::InvalidRange {
                name: "occlusion",
                min,
                max,
            });
        }
        self.occlusion_range = range;
        Ok(self)
    }

    pub fn with_rotation_range(mut self, range: RangeInclusive<f64>) -> Result<Self> {
        let (min, max) = (*range.start(), *range.end());
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(GameError::InvalidRange {
                name: "rotation",
                min,
                max,
            });
        }
        self.rotation_range = range;
        Ok(self)
    }

    /// Pairs that can be cleared in a full round, an orphaned tile does not count.
    pub const fn total_pairs(&self) -> TileCount {
        self.tiles_count / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_clamps_tile_count() {
        assert_eq!(GameConfig::new(GameMode::Classic, 3).tiles_count, 10);
        assert_eq!(GameConfig::new(GameMode::Classic, 40).tiles_count, 25);
        assert_eq!(GameConfig::new(GameMode::Classic, 16).tiles_count, 16);
    }

    #[test]
    fn checked_config_rejects_out_of_range_counts() {
        assert_eq!(
            GameConfig::checked(GameMode::Classic, 9),
            Err(GameError::InvalidTileCount(9))
        );
        assert!(GameConfig::checked(GameMode::Challenge, 25).is_ok());
    }

    #[test]
    fn only_challenge_rotates() {
        let classic = GameConfig::new(GameMode::Classic, 10);
        let challenge = GameConfig::new(GameMode::Challenge, 10);

        assert_eq!(classic.rotation_range, 0.0..=0.0);
        assert_eq!(challenge.rotation_range, DEFAULT_ROTATION_RANGE);
    }

    #[test]
    fn occlusion_range_must_stay_within_unit_interval() {
        let config = GameConfig::new(GameMode::Classic, 10);

        assert!(config.clone().with_occlusion_range(0.1..=0.9).is_ok());
        assert!(config.clone().with_occlusion_range(0.5..=1.2).is_err());
        assert!(config.with_occlusion_range(0.6..=0.4).is_err());
    }

    #[test]
    fn odd_count_total_pairs_rounds_down() {
        assert_eq!(GameConfig::new(GameMode::Classic, 25).total_pairs(), 12);
        assert_eq!(GameConfig::new(GameMode::Classic, 10).total_pairs(), 5);
    }

    #[test]
    fn mode_ids_round_trip() {
        for mode in [GameMode::Classic, GameMode::Challenge] {
            assert_eq!(GameMode::from_id(mode.id()), Some(mode));
        }
        assert_eq!(GameMode::from_id(0), None);
    }
}
