use partial_pair_core::{Tile, TileIndex};
use rand::rngs::SmallRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;

/// Scripted player: finds a true pair with probability `accuracy`, otherwise guesses wrong on
/// purpose when it can.
#[derive(Clone, Debug)]
pub struct Bot {
    rng: SmallRng,
    accuracy: f64,
}

impl Bot {
    pub fn new(seed: u64, accuracy: f64) -> Self {
        let accuracy = if accuracy.is_nan() {
            1.0
        } else {
            accuracy.clamp(0.0, 1.0)
        };
        Self {
            rng: SmallRng::seed_from_u64(seed),
            accuracy,
        }
    }

    /// Two unmatched tiles to pick next, `None` when fewer than two are left.
    pub fn next_pair(&mut self, tiles: &[Tile]) -> Option<(TileIndex, TileIndex)> {
        let mut by_key: BTreeMap<&str, Vec<TileIndex>> = BTreeMap::new();
        for (index, tile) in tiles.iter().enumerate().filter(|(_, tile)| !tile.is_matched()) {
            by_key.entry(tile.image_key()).or_default().push(index);
        }

        let pairs: Vec<(TileIndex, TileIndex)> = by_key
            .values()
            .filter_map(|indices| match indices[..] {
                [first, second, ..] => Some((first, second)),
                _ => None,
            })
            .collect();
        let singles: Vec<TileIndex> = by_key.values().map(|indices| indices[0]).collect();

        let wants_match = self.rng.random_bool(self.accuracy);
        if (wants_match || singles.len() < 2) && !pairs.is_empty() {
            return pairs.choose(&mut self.rng).copied();
        }
        if singles.len() < 2 {
            return None;
        }

        let mut guess: Vec<TileIndex> = singles.choose_multiple(&mut self.rng, 2).copied().collect();
        guess.shuffle(&mut self.rng);
        Some((guess[0], guess[1]))
    }
}
