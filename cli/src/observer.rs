use partial_pair_core::{GameObserver, GameState, Score, Tile, TileCount, TileIndex, combo_label};

/// Narrates engine events through the logger and counts deadlocked rounds.
#[derive(Debug, Default)]
pub struct LogObserver {
    pub deadlocks: u32,
}

impl GameObserver for LogObserver {
    fn tiles_generated(&mut self, tiles: &[Tile]) {
        log::info!("dealt {} tiles", tiles.len());
        for (index, tile) in tiles.iter().enumerate() {
            log::trace!(
                "  {:>2}: {} occluded {:.0}% rotated {:.0}",
                index,
                tile.image_key(),
                tile.occlusion() * 100.0,
                tile.rotation_degrees()
            );
        }
    }

    fn tile_selected(&mut self, index: TileIndex) {
        log::trace!("selected {}", index);
    }

    fn match_found(&mut self, first: TileIndex, second: TileIndex) {
        log::debug!("match {} / {}", first, second);
    }

    fn mismatch_found(&mut self, first: TileIndex, second: TileIndex) {
        log::debug!("miss {} / {}", first, second);
    }

    fn score_updated(&mut self, total_score: Score, combo_count: u32) {
        let label = combo_label(combo_count);
        if label.is_empty() {
            log::debug!("score {}", total_score);
        } else {
            log::info!("score {} {}", total_score, label);
        }
    }

    fn round_complete(&mut self, round: u32) {
        log::info!("round {} complete", round);
    }

    fn progress_updated(&mut self, matched: TileCount, total: TileCount) {
        log::debug!("{}/{} pairs", matched, total);
    }

    fn state_changed(&mut self, state: GameState) {
        log::trace!("state {:?}", state);
    }

    fn no_matches_available(&mut self) {
        log::info!("no matches left on the board");
        self.deadlocks += 1;
    }

    fn game_ended(&mut self) {
        log::info!("game over");
    }
}
