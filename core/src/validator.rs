use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::*;

/// How many validator verdicts the engine remembers.
pub const VALIDATION_HISTORY_LIMIT: usize = 100;

/// Two distinct tiles showing the same face.
pub fn is_match(first: &Tile, second: &Tile) -> bool {
    first.image_key() == second.image_key() && first.id() != second.id()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchRule {
    Standard,
    /// Also refuses tiles that were already cleared.
    Strict,
}

impl MatchRule {
    pub fn is_match(self, first: &Tile, second: &Tile) -> bool {
        match self {
            Self::Standard => is_match(first, second),
            Self::Strict => is_match(first, second) && !first.is_matched() && !second.is_matched(),
        }
    }
}

impl Default for MatchRule {
    fn default() -> Self {
        Self::Standard
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub first: TileId,
    pub second: TileId,
    pub matched: bool,
    pub at: Duration,
}

/// Rolling log of the most recent match checks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationHistory {
    entries: VecDeque<Validation>,
}

impl ValidationHistory {
    pub fn record(&mut self, validation: Validation) {
        if self.entries.len() == VALIDATION_HISTORY_LIMIT {
            self.entries.pop_front();
        }
        self.entries.push_back(validation);
    }

    pub fn entries(&self) -> impl Iterator<Item = &Validation> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Share of recorded checks that matched, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        let matched = self.entries.iter().filter(|entry| entry.matched).count();
        matched as f64 / self.entries.len() as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile(id: u64, key: &str) -> Tile {
        Tile::new(TileId::new(id), key)
    }

    #[test]
    fn same_face_different_tiles_match() {
        assert!(is_match(&tile(0, "tu_a 1"), &tile(1, "tu_a 1")));
        assert!(!is_match(&tile(0, "tu_a 1"), &tile(1, "tu_a 2")));
    }

    #[test]
    fn tile_never_matches_itself() {
        let tile = tile(3, "tu_c 9");

        assert!(!is_match(&tile, &tile));
        assert!(!MatchRule::Strict.is_match(&tile, &tile));
    }

    #[test]
    fn strict_rule_only_narrows() {
        let mut cleared = tile(0, "tu_b 5");
        cleared.mark_matched();
        let fresh = tile(1, "tu_b 5");
        let other = tile(2, "tu_b 6");

        assert!(MatchRule::Standard.is_match(&cleared, &fresh));
        assert!(!MatchRule::Strict.is_match(&cleared, &fresh));
        for (a, b) in [(&cleared, &fresh), (&fresh, &other), (&cleared, &other)] {
            if MatchRule::Strict.is_match(a, b) {
                assert!(MatchRule::Standard.is_match(a, b));
            }
        }
    }

    #[test]
    fn history_keeps_latest_entries_only() {
        let mut history = ValidationHistory::default();
        for i in 0..(VALIDATION_HISTORY_LIMIT as u64 + 20) {
            history.record(Validation {
                first: TileId::new(i),
                second: TileId::new(i + 1),
                matched: i % 4 == 0,
                at: Duration::ZERO,
            });
        }

        assert_eq!(history.len(), VALIDATION_HISTORY_LIMIT);
        assert_eq!(history.entries().next().map(|entry| entry.first), Some(TileId::new(20)));
        assert_eq!(history.success_rate(), 25.0);
    }

    #[test]
    fn empty_history_has_zero_success_rate() {
        assert_eq!(ValidationHistory::default().success_rate(), 0.0);
    }
}
