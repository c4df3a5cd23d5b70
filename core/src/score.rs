use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::*;

/// Numeric knobs of a scoring profile; the rules themselves never change.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreConfig {
    pub base_match_score: u32,
    pub mismatch_penalty: u32,
    pub combo_multiplier_base: u32,
    pub max_combo_multiplier: u32,
    pub time_bonus: bool,
    pub time_bonus_threshold: Duration,
    pub time_bonus_amount: u32,
}

impl ScoreConfig {
    pub const STANDARD: Self = Self {
        base_match_score: 10,
        mismatch_penalty: 2,
        combo_multiplier_base: 2,
        max_combo_multiplier: 10,
        time_bonus: false,
        time_bonus_threshold: Duration::from_secs(3),
        time_bonus_amount: 5,
    };

    pub const COMPETITIVE: Self = Self {
        base_match_score: 15,
        mismatch_penalty: 5,
        combo_multiplier_base: 3,
        max_combo_multiplier: 15,
        time_bonus: true,
        time_bonus_threshold: Duration::from_secs(2),
        time_bonus_amount: 10,
    };

    pub const CASUAL: Self = Self {
        base_match_score: 10,
        mismatch_penalty: 0,
        combo_multiplier_base: 1,
        max_combo_multiplier: 5,
        time_bonus: false,
        time_bonus_threshold: Duration::from_secs(5),
        time_bonus_amount: 2,
    };

    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::STANDARD),
            "competitive" => Some(Self::COMPETITIVE),
            "casual" => Some(Self::CASUAL),
            _ => None,
        }
    }

    /// Bonus on top of the base score for the given streak length.
    pub fn combo_bonus(&self, streak: u32) -> u32 {
        if streak <= 1 {
            return 0;
        }
        (streak - 1)
            .saturating_mul(self.combo_multiplier_base)
            .min(self.max_combo_multiplier)
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Result of recording one match or mismatch.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreUpdate {
    pub total_score: Score,
    pub score_change: i64,
    pub combo_count: u32,
    pub combo_bonus: u32,
    pub is_combo_active: bool,
}

impl fmt::Display for ScoreUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_combo_active && self.combo_count > 1 {
            write!(
                f,
                "{:+} (Combo x{}: +{})",
                self.score_change, self.combo_count, self.combo_bonus
            )
        } else {
            write!(f, "{:+}", self.score_change)
        }
    }
}

/// Session-wide score and streak bookkeeping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreManager {
    config: ScoreConfig,
    current_score: Score,
    consecutive_matches: u32,
    total_matches: u32,
    total_mismatches: u32,
    highest_combo: u32,
}

impl ScoreManager {
    pub fn new(config: ScoreConfig) -> Self {
        Self {
            config,
            current_score: 0,
            consecutive_matches: 0,
            total_matches: 0,
            total_mismatches: 0,
            highest_combo: 0,
        }
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    pub fn current_score(&self) -> Score {
        self.current_score
    }

    pub fn consecutive_matches(&self) -> u32 {
        self.consecutive_matches
    }

    pub fn total_matches(&self) -> u32 {
        self.total_matches
    }

    pub fn total_mismatches(&self) -> u32 {
        self.total_mismatches
    }

    pub fn highest_combo(&self) -> u32 {
        self.highest_combo
    }

    pub fn is_combo_active(&self) -> bool {
        self.consecutive_matches >= 2
    }

    pub fn current_combo_bonus(&self) -> u32 {
        self.config.combo_bonus(self.consecutive_matches)
    }

    /// Matches over attempts in percent, zero before the first attempt.
    pub fn accuracy(&self) -> f64 {
        let attempts = self.total_matches + self.total_mismatches;
        if attempts == 0 {
            return 0.0;
        }
        f64::from(self.total_matches) / f64::from(attempts) * 100.0
    }

    pub fn record_match(&mut self) -> ScoreUpdate {
        self.record_match_with_elapsed(None)
    }

    /// Records a match, adding the time bonus when the profile enables it and the match came
    /// within the threshold of the previous one. The bonus is reported as part of `combo_bonus`.
    pub fn record_match_with_elapsed(&mut self, elapsed: Option<Duration>) -> ScoreUpdate {
        self.consecutive_matches += 1;
        self.total_matches += 1;
        self.highest_combo = self.highest_combo.max(self.consecutive_matches);

        let combo_bonus = self.current_combo_bonus();
        let time_bonus = match elapsed {
            Some(elapsed)
                if self.config.time_bonus && elapsed <= self.config.time_bonus_threshold =>
            {
                self.config.time_bonus_amount
            }
            _ => 0,
        };

        let gained = self.config.base_match_score + combo_bonus + time_bonus;
        self.current_score = self.current_score.saturating_add(gained);

        ScoreUpdate {
            total_score: self.current_score,
            score_change: i64::from(gained),
            combo_count: self.consecutive_matches,
            combo_bonus: combo_bonus + time_bonus,
            is_combo_active: self.is_combo_active(),
        }
    }

    pub fn record_mismatch(&mut self) -> ScoreUpdate {
        self.consecutive_matches = 0;
        self.total_mismatches += 1;
        self.current_score = self
            .current_score
            .saturating_sub(self.config.mismatch_penalty);

        ScoreUpdate {
            total_score: self.current_score,
            score_change: -i64::from(self.config.mismatch_penalty),
            combo_count: 0,
            combo_bonus: 0,
            is_combo_active: false,
        }
    }
}

impl Default for ScoreManager {
    fn default() -> Self {
        Self::new(ScoreConfig::STANDARD)
    }
}

/// End-of-session summary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreStatistics {
    pub final_score: Score,
    pub total_matches: u32,
    pub total_mismatches: u32,
    pub accuracy: f64,
    pub highest_combo: u32,
    pub rounds_completed: u32,
    pub total_time: Duration,
}

impl ScoreStatistics {
    pub fn from_manager(manager: &ScoreManager, rounds_completed: u32, total_time: Duration) -> Self {
        Self {
            final_score: manager.current_score(),
            total_matches: manager.total_matches(),
            total_mismatches: manager.total_mismatches(),
            accuracy: manager.accuracy(),
            highest_combo: manager.highest_combo(),
            rounds_completed,
            total_time,
        }
    }

    pub fn average_score_per_match(&self) -> f64 {
        if self.total_matches == 0 {
            return 0.0;
        }
        f64::from(self.final_score) / f64::from(self.total_matches)
    }

    pub fn matches_per_minute(&self) -> f64 {
        let minutes = self.total_time.as_secs_f64() / 60.0;
        if minutes <= 0.0 {
            return 0.0;
        }
        f64::from(self.total_matches) / minutes
    }
}

pub fn format_accuracy(accuracy: f64) -> String {
    format!("{accuracy:.1}%")
}

/// Banner text for a streak, empty below two.
pub fn combo_label(combo: u32) -> String {
    match combo {
        10.. => format!("MEGA COMBO x{combo}!"),
        5.. => format!("SUPER COMBO x{combo}!"),
        2.. => format!("COMBO x{combo}!"),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_has_no_combo_bonus() {
        let mut score = ScoreManager::default();

        let update = score.record_match();

        assert_eq!(update.total_score, 10);
        assert_eq!(update.score_change, 10);
        assert_eq!(update.combo_count, 1);
        assert_eq!(update.combo_bonus, 0);
        assert!(!update.is_combo_active);
    }

    #[test]
    fn streak_adds_combo_bonus_and_mismatch_penalises() {
        let mut score = ScoreManager::default();

        score.record_match();
        let second = score.record_match();
        let miss = score.record_mismatch();

        assert_eq!(second.total_score, 22);
        assert_eq!(second.combo_bonus, 2);
        assert!(second.is_combo_active);
        assert_eq!(miss.total_score, 20);
        assert_eq!(miss.score_change, -2);
        assert_eq!(miss.combo_count, 0);
        assert_eq!(score.consecutive_matches(), 0);
    }

    #[test]
    fn combo_bonus_caps_at_profile_maximum() {
        let mut score = ScoreManager::default();

        let bonuses: Vec<_> = (0..100).map(|_| score.record_match().combo_bonus).collect();

        assert!(bonuses.iter().all(|&bonus| bonus <= 10));
        assert_eq!(bonuses[5], 10);
        assert_eq!(bonuses[99], 10);
        assert_eq!(score.highest_combo(), 100);
    }

    #[test]
    fn score_never_goes_negative() {
        let mut score = ScoreManager::new(ScoreConfig::COMPETITIVE);
        score.record_match();

        for _ in 0..10 {
            score.record_mismatch();
        }

        assert_eq!(score.current_score(), 0);
        assert_eq!(score.total_mismatches(), 10);
    }

    #[test]
    fn mismatch_resets_any_streak() {
        let mut score = ScoreManager::default();
        for _ in 0..7 {
            score.record_match();
        }

        score.record_mismatch();

        assert_eq!(score.consecutive_matches(), 0);
        assert_eq!(score.highest_combo(), 7);
        assert_eq!(score.current_combo_bonus(), 0);
    }

    #[test]
    fn time_bonus_needs_enabled_profile_and_quick_match() {
        let mut competitive = ScoreManager::new(ScoreConfig::COMPETITIVE);
        let quick = competitive.record_match_with_elapsed(Some(Duration::from_millis(1500)));
        let slow = competitive.record_match_with_elapsed(Some(Duration::from_secs(4)));

        assert_eq!(quick.score_change, 25);
        assert_eq!(quick.combo_bonus, 10);
        // two-match streak, too slow for the time bonus
        assert_eq!(slow.score_change, 18);

        let mut standard = ScoreManager::default();
        let update = standard.record_match_with_elapsed(Some(Duration::ZERO));
        assert_eq!(update.score_change, 10);
    }

    #[test]
    fn accuracy_and_reset() {
        let mut score = ScoreManager::default();
        assert_eq!(score.accuracy(), 0.0);

        score.record_match();
        score.record_match();
        score.record_match();
        score.record_mismatch();
        assert_eq!(score.accuracy(), 75.0);

        score.reset();
        assert_eq!(score, ScoreManager::default());
    }

    #[test]
    fn casual_profile_has_no_penalty() {
        let mut score = ScoreManager::new(ScoreConfig::CASUAL);
        score.record_match();

        let miss = score.record_mismatch();

        assert_eq!(miss.total_score, 10);
        assert_eq!(miss.score_change, 0);
    }

    #[test]
    fn update_description() {
        let mut score = ScoreManager::default();

        assert_eq!(score.record_match().to_string(), "+10");
        assert_eq!(score.record_match().to_string(), "+12 (Combo x2: +2)");
        assert_eq!(score.record_mismatch().to_string(), "-2");
    }

    #[test]
    fn statistics_rates() {
        let mut score = ScoreManager::default();
        score.record_match();
        score.record_match();

        let stats = ScoreStatistics::from_manager(&score, 1, Duration::from_secs(30));

        assert_eq!(stats.final_score, 22);
        assert_eq!(stats.average_score_per_match(), 11.0);
        assert_eq!(stats.matches_per_minute(), 4.0);
        assert_eq!(
            ScoreStatistics::from_manager(&ScoreManager::default(), 0, Duration::ZERO)
                .matches_per_minute(),
            0.0
        );
    }

    #[test]
    fn labels() {
        assert_eq!(combo_label(1), "");
        assert_eq!(combo_label(3), "COMBO x3!");
        assert_eq!(combo_label(5), "SUPER COMBO x5!");
        assert_eq!(combo_label(12), "MEGA COMBO x12!");
        assert_eq!(format_accuracy(85.0), "85.0%");
    }
}
