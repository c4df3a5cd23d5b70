use serde::{Deserialize, Serialize};

use crate::*;

/// Anything that can tell the engine how many tiles to deal per round.
pub trait SettingsSource {
    fn tiles_per_round(&self) -> TileCount;
}

/// Player preferences the engine reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tiles_per_game: TileCount,
}

impl Settings {
    pub fn set_tiles_per_game(&mut self, count: TileCount) {
        self.tiles_per_game = clamp_tile_count(count);
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tiles_per_game: DEFAULT_TILES_PER_ROUND,
        }
    }
}

impl SettingsSource for Settings {
    /// A stored value outside the allowed range falls back to the default rather than the
    /// nearest bound.
    fn tiles_per_round(&self) -> TileCount {
        if TILE_COUNT_RANGE.contains(&self.tiles_per_game) {
            self.tiles_per_game
        } else {
            DEFAULT_TILES_PER_ROUND
        }
    }
}

impl<T: SettingsSource + ?Sized> SettingsSource for &T {
    fn tiles_per_round(&self) -> TileCount {
        (**self).tiles_per_round()
    }
}
