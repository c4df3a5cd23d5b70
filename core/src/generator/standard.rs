use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::*;

/// Picks faces uniformly from the whole pool.
#[derive(Clone, Debug)]
pub struct StandardTileGenerator {
    pool: ImagePool,
    rng: SmallRng,
    ids: TileIdSource,
}

impl StandardTileGenerator {
    pub fn new(pool: ImagePool, seed: u64) -> Self {
        Self {
            pool,
            rng: SmallRng::seed_from_u64(seed),
            ids: TileIdSource::new(),
        }
    }
}

impl TileGenerator for StandardTileGenerator {
    fn generate(&mut self, request: &GenerationRequest) -> Vec<Tile> {
        use rand::seq::SliceRandom;

        let mut keys = self.pool.keys().to_vec();
        keys.shuffle(&mut self.rng);
        keys.truncate(pairs_for(request.count));

        let rotates = request.mode.has_rotation();
        deal_pairs(&keys, request.count, &mut self.ids, &mut self.rng, |rng| {
            let occlusion = sample_range(rng, &request.occlusion_range);
            let rotation = if rotates {
                sample_range(rng, &request.rotation_range)
            } else {
                0.0
            };
            (occlusion, rotation)
        })
    }
}
