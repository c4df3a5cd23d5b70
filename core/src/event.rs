use serde::{Deserialize, Serialize};

use crate::*;

/// Everything the engine tells the outside world, in the order it happened.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    TilesGenerated(Vec<Tile>),
    TileSelected(TileIndex),
    MatchFound(TileIndex, TileIndex),
    MismatchFound(TileIndex, TileIndex),
    ScoreUpdated { total_score: Score, combo_count: u32 },
    /// Both tiles of a resolved attempt were released.
    SelectionReset(TileIndex, TileIndex),
    RoundComplete(u32),
    ProgressUpdated { matched: TileCount, total: TileCount },
    StateChanged(GameState),
    NoMatchesAvailable,
    GameEnded,
}

impl GameEvent {
    pub fn deliver_to<O: GameObserver + ?Sized>(&self, observer: &mut O) {
        use GameEvent::*;
        match self {
            TilesGenerated(tiles) => observer.tiles_generated(tiles),
            &TileSelected(index) => observer.tile_selected(index),
            &MatchFound(first, second) => observer.match_found(first, second),
            &MismatchFound(first, second) => observer.mismatch_found(first, second),
            &ScoreUpdated {
                total_score,
                combo_count,
            } => observer.score_updated(total_score, combo_count),
            &SelectionReset(first, second) => observer.selection_reset(first, second),
            &RoundComplete(round) => observer.round_complete(round),
            &ProgressUpdated { matched, total } => observer.progress_updated(matched, total),
            &StateChanged(state) => observer.state_changed(state),
            NoMatchesAvailable => observer.no_matches_available(),
            GameEnded => observer.game_ended(),
        }
    }
}

/// Delegate-style listener; implement only what you care about.
pub trait GameObserver {
    fn tiles_generated(&mut self, _tiles: &[Tile]) {}
    fn tile_selected(&mut self, _index: TileIndex) {}
    fn match_found(&mut self, _first: TileIndex, _second: TileIndex) {}
    fn mismatch_found(&mut self, _first: TileIndex, _second: TileIndex) {}
    fn score_updated(&mut self, _total_score: Score, _combo_count: u32) {}
    fn selection_reset(&mut self, _first: TileIndex, _second: TileIndex) {}
    fn round_complete(&mut self, _round: u32) {}
    fn progress_updated(&mut self, _matched: TileCount, _total: TileCount) {}
    fn state_changed(&mut self, _state: GameState) {}
    fn no_matches_available(&mut self) {}
    fn game_ended(&mut self) {}
}

impl GameObserver for Vec<GameEvent> {
    fn tiles_generated(&mut self, tiles: &[Tile]) {
        self.push(GameEvent::TilesGenerated(tiles.to_vec()));
    }

    fn tile_selected(&mut self, index: TileIndex) {
        self.push(GameEvent::TileSelected(index));
    }

    fn match_found(&mut self, first: TileIndex, second: TileIndex) {
        self.push(GameEvent::MatchFound(first, second));
    }

    fn mismatch_found(&mut self, first: TileIndex, second: TileIndex) {
        self.push(GameEvent::MismatchFound(first, second));
    }

    fn score_updated(&mut self, total_score: Score, combo_count: u32) {
        self.push(GameEvent::ScoreUpdated {
            total_score,
            combo_count,
        });
    }

    fn selection_reset(&mut self, first: TileIndex, second: TileIndex) {
        self.push(GameEvent::SelectionReset(first, second));
    }

    fn round_complete(&mut self, round: u32) {
        self.push(GameEvent::RoundComplete(round));
    }

    fn progress_updated(&mut self, matched: TileCount, total: TileCount) {
        self.push(GameEvent::ProgressUpdated { matched, total });
    }

    fn state_changed(&mut self, state: GameState) {
        self.push(GameEvent::StateChanged(state));
    }

    fn no_matches_available(&mut self) {
        self.push(GameEvent::NoMatchesAvailable);
    }

    fn game_ended(&mut self) {
        self.push(GameEvent::GameEnded);
    }
}
