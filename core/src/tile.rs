use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::*;

/// Score at or above which a tile counts as hard to identify.
pub const HIGH_DIFFICULTY_SCORE: f64 = 70.0;

/// Opaque identity of a dealt tile, unique even between tiles sharing a face.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileId(u64);

impl TileId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile-{}", self.0)
    }
}

/// Hands out fresh tile ids, one generator owns one source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileIdSource {
    next: u64,
}

impl TileIdSource {
    pub const fn new() -> Self {
        Self { next: 0 }
    }

    pub fn next_id(&mut self) -> TileId {
        let id = TileId(self.next);
        self.next += 1;
        id
    }
}

/// One face-down card on the board.
///
/// Identity and appearance are fixed when the tile is dealt; only the engine flips the
/// `selected` and `matched` flags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    id: TileId,
    image_key: String,
    is_matched: bool,
    is_selected: bool,
    occlusion: f64,
    rotation_degrees: f64,
}

impl Tile {
    pub fn new(id: TileId, image_key: impl Into<String>) -> Self {
        Self {
            id,
            image_key: image_key.into(),
            is_matched: false,
            is_selected: false,
            occlusion: 0.0,
            rotation_degrees: 0.0,
        }
    }

    pub fn with_appearance(mut self, occlusion: f64, rotation_degrees: f64) -> Self {
        self.occlusion = occlusion.clamp(0.0, 1.0);
        self.rotation_degrees = rotation_degrees;
        self
    }

    pub fn id(&self) -> TileId {
        self.id
    }

    pub fn image_key(&self) -> &str {
        &self.image_key
    }

    pub fn is_matched(&self) -> bool {
        self.is_matched
    }

    pub fn is_selected(&self) -> bool {
        self.is_selected
    }

    /// Share of the face hidden from the player, in `[0, 1]`.
    pub fn occlusion(&self) -> f64 {
        self.occlusion
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation_degrees
    }

    pub fn category(&self) -> &str {
        image_category(&self.image_key)
    }

    pub fn number(&self) -> u32 {
        image_number(&self.image_key)
    }

    /// Rough 0-100 rating of how hard the face is to recognise.
    pub fn difficulty_score(&self) -> f64 {
        let score = self.occlusion * 100.0 + self.rotation_degrees.abs() / 30.0 * 20.0;
        score.min(100.0)
    }

    pub fn is_high_difficulty(&self) -> bool {
        self.difficulty_score() >= HIGH_DIFFICULTY_SCORE
    }

    /// Whether the tile can still take part in a selection.
    pub fn is_available(&self) -> bool {
        !self.is_matched && !self.is_selected
    }

    pub(crate) fn select(&mut self) {
        debug_assert!(!self.is_matched, "matched tiles never re-enter selection");
        self.is_selected = true;
    }

    pub(crate) fn deselect(&mut self) {
        self.is_selected = false;
    }

    pub(crate) fn mark_matched(&mut self) {
        self.is_matched = true;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CompletionStatus {
    JustStarted,
    GettingStarted,
    Halfway,
    AlmostThere,
    Complete,
}

impl CompletionStatus {
    pub fn from_percentage(percentage: f64) -> Self {
        match percentage {
            p if p >= 100.0 => Self::Complete,
            p if p >= 75.0 => Self::AlmostThere,
            p if p >= 50.0 => Self::Halfway,
            p if p >= 25.0 => Self::GettingStarted,
            _ => Self::JustStarted,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::JustStarted => "Just Started",
            Self::GettingStarted => "Getting Started",
            Self::Halfway => "Halfway",
            Self::AlmostThere => "Almost There",
            Self::Complete => "Complete",
        }
    }
}

/// Snapshot summary of a tile set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardStatistics {
    pub total_tiles: TileCount,
    pub matched_tiles: TileCount,
    pub unmatched_tiles: TileCount,
    pub average_difficulty: f64,
    pub high_difficulty_count: TileCount,
    pub categories: BTreeMap<String, TileCount>,
}

impl BoardStatistics {
    pub fn from_tiles(tiles: &[Tile]) -> Self {
        let matched_tiles = tiles.iter().filter(|tile| tile.is_matched()).count();
        let average_difficulty = if tiles.is_empty() {
            0.0
        } else {
            tiles.iter().map(Tile::difficulty_score).sum::<f64>() / tiles.len() as f64
        };

        let mut categories = BTreeMap::new();
        for tile in tiles {
            *categories.entry(tile.category().to_owned()).or_insert(0) += 1;
        }

        Self {
            total_tiles: tiles.len(),
            matched_tiles,
            unmatched_tiles: tiles.len() - matched_tiles,
            average_difficulty,
            high_difficulty_count: tiles.iter().filter(|tile| tile.is_high_difficulty()).count(),
            categories,
        }
    }

    pub fn match_percentage(&self) -> f64 {
        if self.total_tiles == 0 {
            return 0.0;
        }
        self.matched_tiles as f64 / self.total_tiles as f64 * 100.0
    }

    pub fn completion_status(&self) -> CompletionStatus {
        CompletionStatus::from_percentage(self.match_percentage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: u64, key: &str) -> Tile {
        Tile::new(TileId::new(id), key)
    }

    #[test]
    fn id_source_never_repeats() {
        let mut ids = TileIdSource::new();
        let first = ids.next_id();
        let second = ids.next_id();

        assert_ne!(first, second);
        assert_eq!(second.get(), first.get() + 1);
    }

    #[test]
    fn difficulty_combines_occlusion_and_rotation() {
        let flat = tile(0, "tu_a 1").with_appearance(0.5, 0.0);
        let rotated = tile(1, "tu_a 1").with_appearance(0.5, -30.0);
        let extreme = tile(2, "tu_a 1").with_appearance(0.9, 30.0);

        assert_eq!(flat.difficulty_score(), 50.0);
        assert_eq!(rotated.difficulty_score(), 70.0);
        assert!(rotated.is_high_difficulty());
        assert!(!flat.is_high_difficulty());
        assert_eq!(extreme.difficulty_score(), 100.0);
    }

    #[test]
    fn statistics_count_matches_and_categories() {
        let mut tiles = vec![
            tile(0, "tu_a 1"),
            tile(1, "tu_a 1"),
            tile(2, "tu_b 2"),
            tile(3, "tu_b 2"),
        ];
        tiles[0].mark_matched();
        tiles[1].mark_matched();

        let stats = BoardStatistics::from_tiles(&tiles);

        assert_eq!(stats.matched_tiles, 2);
        assert_eq!(stats.unmatched_tiles, 2);
        assert_eq!(stats.categories.get("tu_a"), Some(&2));
        assert_eq!(stats.categories.get("tu_b"), Some(&2));
        assert_eq!(stats.match_percentage(), 50.0);
        assert_eq!(stats.completion_status(), CompletionStatus::Halfway);
    }

    #[test]
    fn empty_board_statistics() {
        let stats = BoardStatistics::from_tiles(&[]);

        assert_eq!(stats.match_percentage(), 0.0);
        assert_eq!(stats.average_difficulty, 0.0);
        assert_eq!(stats.completion_status(), CompletionStatus::JustStarted);
    }
}
