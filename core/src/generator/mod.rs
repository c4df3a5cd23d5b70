use core::ops::RangeInclusive;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::*;
pub use preset::*;
pub use standard::*;
pub use weighted::*;

mod preset;
mod standard;
mod weighted;

/// Image keys shipped with the game: three visual families of nine faces each.
pub const REFERENCE_IMAGE_KEYS: [&str; 27] = [
    "tu_a 1", "tu_a 2", "tu_a 3", "tu_a 4", "tu_a 5", "tu_a 6", "tu_a 7", "tu_a 8", "tu_a 9",
    "tu_b 1", "tu_b 2", "tu_b 3", "tu_b 4", "tu_b 5", "tu_b 6", "tu_b 7", "tu_b 8", "tu_b 9",
    "tu_c 1", "tu_c 2", "tu_c 3", "tu_c 4", "tu_c 5", "tu_c 6", "tu_c 7", "tu_c 8", "tu_c 9",
];

pub trait TileGenerator {
    fn generate(&mut self, request: &GenerationRequest) -> Vec<Tile>;
}

/// What a round asks the generator for.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub count: TileCount,
    pub mode: GameMode,
    pub occlusion_range: RangeInclusive<f64>,
    pub rotation_range: RangeInclusive<f64>,
}

impl GenerationRequest {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            count: config.tiles_count,
            mode: config.mode,
            occlusion_range: config.occlusion_range.clone(),
            rotation_range: config.rotation_range.clone(),
        }
    }
}

/// Distinct faces a generator may deal from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePool {
    keys: Vec<String>,
}

impl ImagePool {
    pub fn new<S: Into<String>>(keys: impl IntoIterator<Item = S>) -> Result<Self> {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        if keys.is_empty() {
            return Err(GameError::EmptyImagePool);
        }

        let mut seen = BTreeSet::new();
        for key in &keys {
            if !seen.insert(key.as_str()) {
                return Err(GameError::DuplicateImageKey(key.clone()));
            }
        }

        Ok(Self { keys })
    }

    pub fn reference() -> Self {
        Self {
            keys: REFERENCE_IMAGE_KEYS.iter().map(|&key| key.to_owned()).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys grouped by their visual family, in pool order within each family.
    pub fn grouped(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for key in &self.keys {
            groups.entry(image_category(key)).or_default().push(key);
        }
        groups
    }
}

impl Default for ImagePool {
    fn default() -> Self {
        Self::reference()
    }
}

/// Serializable choice of generation policy, turned into a [`Generator`] by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GenerationStrategy {
    Standard,
    Weighted { difficulty: f64 },
    Preset(Vec<String>),
}

impl Default for GenerationStrategy {
    fn default() -> Self {
        Self::Standard
    }
}

impl GenerationStrategy {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Weighted { .. } => "weighted",
            Self::Preset(_) => "preset",
        }
    }
}

/// Closed set of generation policies.
#[derive(Clone, Debug)]
pub enum Generator {
    Standard(StandardTileGenerator),
    Weighted(WeightedTileGenerator),
    Preset(PresetTileGenerator),
}

impl Generator {
    pub fn from_strategy(strategy: &GenerationStrategy, pool: ImagePool, seed: u64) -> Self {
        match strategy {
            GenerationStrategy::Standard => Self::Standard(StandardTileGenerator::new(pool, seed)),
            GenerationStrategy::Weighted { difficulty } => {
                Self::Weighted(WeightedTileGenerator::new(pool, seed, *difficulty))
            }
            GenerationStrategy::Preset(keys) => {
                Self::Preset(PresetTileGenerator::new(keys.iter().cloned()))
            }
        }
    }
}

impl TileGenerator for Generator {
    fn generate(&mut self, request: &GenerationRequest) -> Vec<Tile> {
        match self {
            Self::Standard(generator) => generator.generate(request),
            Self::Weighted(generator) => generator.generate(request),
            Self::Preset(generator) => generator.generate(request),
        }
    }
}

/// Uniform draw from an inclusive range, tolerating degenerate ranges.
pub(crate) fn sample_range(rng: &mut SmallRng, range: &RangeInclusive<f64>) -> f64 {
    use rand::Rng;

    let (min, max) = (*range.start(), *range.end());
    if min < max {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Deals two tiles per key, cuts the set down to `count` and shuffles it.
///
/// When `count` is odd the last pair loses one tile, leaving an orphan that can never match.
pub(crate) fn deal_pairs(
    keys: &[String],
    count: TileCount,
    ids: &mut TileIdSource,
    rng: &mut SmallRng,
    mut appearance: impl FnMut(&mut SmallRng) -> (f64, f64),
) -> Vec<Tile> {
    use rand::seq::SliceRandom;

    if keys.len() < pairs_for(count) {
        log::warn!(
            "Image pool too small, requested {} pairs but only {} available",
            pairs_for(count),
            keys.len()
        );
    }
    if count % 2 == 1 {
        log::warn!("Odd tile count {}, one tile will be left without a partner", count);
    }

    let mut tiles = Vec::with_capacity(keys.len() * 2);
    for key in keys {
        for _ in 0..2 {
            let (occlusion, rotation) = appearance(rng);
            tiles.push(Tile::new(ids.next_id(), key.as_str()).with_appearance(occlusion, rotation));
        }
    }

    tiles.truncate(count);
    tiles.shuffle(rng);
    tiles
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use crate::*;

    pub fn key_counts(tiles: &[Tile]) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for tile in tiles {
            *counts.entry(tile.image_key()).or_insert(0) += 1;
        }
        counts
    }

    pub fn request(mode: GameMode, count: TileCount) -> GenerationRequest {
        GenerationRequest::from_config(&GameConfig::new_unchecked(mode, count))
    }
}
