use core::ops::RangeInclusive;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

pub const DIFFICULTY_RANGE: RangeInclusive<f64> = 0.5..=2.0;

/// Faces drawn from one family before moving to the next.
pub const PICKS_PER_CATEGORY: usize = 3;

/// Occlusion never goes past this, whatever the difficulty.
pub const MAX_WEIGHTED_OCCLUSION: f64 = 0.75;

/// Harder dealing: clusters faces from the same visual family and scales how much of each tile
/// is hidden or turned.
#[derive(Clone, Debug)]
pub struct WeightedTileGenerator {
    pool: ImagePool,
    rng: SmallRng,
    ids: TileIdSource,
    difficulty: f64,
}

impl WeightedTileGenerator {
    pub fn new(pool: ImagePool, seed: u64, difficulty: f64) -> Self {
        let difficulty = if difficulty.is_nan() {
            1.0
        } else {
            difficulty.clamp(*DIFFICULTY_RANGE.start(), *DIFFICULTY_RANGE.end())
        };
        Self {
            pool,
            rng: SmallRng::seed_from_u64(seed),
            ids: TileIdSource::new(),
            difficulty,
        }
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Walks the families in random order, taking up to [`PICKS_PER_CATEGORY`] faces from each
    /// visit, and keeps cycling until `wanted` faces are picked or the pool runs dry.
    fn select_keys(&mut self, wanted: usize) -> Vec<String> {
        use rand::seq::SliceRandom;

        let mut groups: Vec<Vec<String>> = self
            .pool
            .grouped()
            .into_values()
            .map(|keys| keys.into_iter().map(str::to_owned).collect())
            .collect();
        groups.shuffle(&mut self.rng);
        for group in &mut groups {
            group.shuffle(&mut self.rng);
        }

        let mut selected = Vec::with_capacity(wanted);
        while selected.len() < wanted && groups.iter().any(|group| !group.is_empty()) {
            for group in &mut groups {
                if selected.len() >= wanted {
                    break;
                }
                let take = PICKS_PER_CATEGORY
                    .min(wanted - selected.len())
                    .min(group.len());
                selected.extend(group.drain(..take));
            }
        }
        selected
    }
}

impl TileGenerator for WeightedTileGenerator {
    fn generate(&mut self, request: &GenerationRequest) -> Vec<Tile> {
        let keys = self.select_keys(pairs_for(request.count));

        let difficulty = self.difficulty;
        let rotates = request.mode.has_rotation();
        deal_pairs(&keys, request.count, &mut self.ids, &mut self.rng, |rng| {
            let occlusion = sample_range(rng, &request.occlusion_range) * difficulty;
            let rotation = if rotates {
                sample_range(rng, &request.rotation_range) * difficulty
            } else {
                0.0
            };
            (occlusion.min(MAX_WEIGHTED_OCCLUSION), rotation)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn difficulty_is_clamped() {
        let pool = ImagePool::reference();

        assert_eq!(WeightedTileGenerator::new(pool.clone(), 0, 5.0).difficulty(), 2.0);
        assert_eq!(WeightedTileGenerator::new(pool.clone(), 0, 0.1).difficulty(), 0.5);
        assert_eq!(WeightedTileGenerator::new(pool, 0, 1.25).difficulty(), 1.25);
    }

    #[test]
    fn keys_cluster_by_family() {
        let mut generator = WeightedTileGenerator::new(ImagePool::reference(), 9, 1.0);

        let tiles = generator.generate(&request(GameMode::Classic, 10));
        let stats = BoardStatistics::from_tiles(&tiles);

        // five pairs: three faces from one family, two from the next
        let mut per_family: Vec<_> = stats.categories.values().copied().collect();
        per_family.sort();
        assert_eq!(per_family, vec![4, 6]);
    }

    #[test]
    fn large_rounds_cycle_through_families() {
        let mut generator = WeightedTileGenerator::new(ImagePool::reference(), 4, 1.0);

        let tiles = generator.generate(&request(GameMode::Classic, 25));
        let counts = key_counts(&tiles);

        assert_eq!(tiles.len(), 25);
        assert_eq!(counts.len(), 13);
        assert_eq!(counts.values().filter(|&&count| count == 1).count(), 1);
    }

    #[test]
    fn hard_difficulty_caps_occlusion() {
        let mut generator = WeightedTileGenerator::new(ImagePool::reference(), 2, 2.0);

        let tiles = generator.generate(&request(GameMode::Challenge, 20));

        for tile in &tiles {
            assert!(tile.occlusion() <= MAX_WEIGHTED_OCCLUSION);
            assert!(tile.occlusion() >= 0.4 - f64::EPSILON);
            assert!(tile.rotation_degrees().abs() <= 60.0);
        }
    }

    #[test]
    fn classic_mode_never_rotates() {
        let mut generator = WeightedTileGenerator::new(ImagePool::reference(), 8, 2.0);

        let tiles = generator.generate(&request(GameMode::Classic, 14));

        assert!(tiles.iter().all(|tile| tile.rotation_degrees() == 0.0));
    }
}
