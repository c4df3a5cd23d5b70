use anyhow::{Result, bail};
use partial_pair_core::*;
use std::time::Duration;

use crate::bot::Bot;
use crate::observer::LogObserver;
use crate::{ModeArg, parse_scoring};

#[derive(clap::Args, Debug)]
pub struct PlayArgs {
    #[arg(short, long, value_enum, default_value_t = ModeArg::Classic)]
    pub mode: ModeArg,

    /// Rounds to play before ending the session
    #[arg(long, default_value_t = 3)]
    pub rounds: u32,

    /// Chance the bot finds a true pair on each attempt
    #[arg(long, default_value_t = 0.8)]
    pub accuracy: f64,

    /// Force a seed instead of random
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Scoring profile: standard, competitive or casual [default: the mode's own]
    #[arg(long, value_parser = parse_scoring)]
    pub scoring: Option<ScoreConfig>,

    /// Override the configured tiles per round
    #[arg(long)]
    pub tiles: Option<TileCount>,

    /// Simulated time the bot spends on each attempt, in milliseconds
    #[arg(long, default_value_t = 1500)]
    pub think_ms: u64,

    /// Give up after this many attempts
    #[arg(long, default_value_t = 1000)]
    pub max_attempts: u32,
}

/// What a played session produced.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub record: SessionRecord,
    pub score: ScoreStatistics,
    pub time: SessionTimeStatistics,
    pub deadlocks: u32,
    pub attempts: u32,
}

/// Plays one bot session on the simulated clock and returns its summary.
pub fn play_session(
    args: &PlayArgs,
    settings: &impl SettingsSource,
    sink: impl RecordSink + Send + 'static,
) -> Result<Summary> {
    let seed = args.seed.unwrap_or_else(rand::random);
    log::debug!("seed: {}", seed);

    let mode = GameMode::from(args.mode);
    let mut options = EngineOptions::for_mode(mode).with_seed(seed);
    if let Some(scoring) = args.scoring {
        options = options.with_scoring(scoring);
    }
    let clock = ManualClock::new();
    let mut engine = PairEngine::with_clock(options, clock.clone()).with_record_sink(sink);
    let mut bot = Bot::new(seed, args.accuracy);
    let mut observer = LogObserver::default();
    let think = Duration::from_millis(args.think_ms);

    let started = match args.tiles {
        Some(tiles) => engine.start_new_game(mode, tiles),
        None => engine.start_new_game_with_settings(mode, settings),
    };
    if !started.has_update() {
        bail!("Could not start a game: {:?}", started);
    }
    engine.dispatch(&mut observer);

    let mut attempts = 0;
    loop {
        match engine.state() {
            GameState::Playing if attempts < args.max_attempts => {
                let Some((first, second)) = bot.next_pair(engine.tiles()) else {
                    log::warn!("bot found nothing to pick in round {}", engine.current_round());
                    break;
                };
                clock.advance(think);
                attempts += 1;
                engine.select_tile(first);
                if let Some(resolution) = engine.select_tile(second).resolution() {
                    log::debug!("attempt {}: {}", attempts, resolution.score);
                }
            }
            GameState::RoundComplete if engine.rounds_completed() < args.rounds => {
                engine.start_new_round();
            }
            GameState::Playing => {
                log::warn!("giving up after {} attempts", attempts);
                break;
            }
            _ => break,
        }
        engine.dispatch(&mut observer);
    }

    engine.end_game();
    engine.dispatch(&mut observer);

    let Some(record) = engine.session_record() else {
        bail!("Session ended without a game");
    };
    Ok(Summary {
        record,
        score: engine.score_statistics(),
        time: engine.time_statistics(),
        deadlocks: observer.deadlocks,
        attempts,
    })
}

pub fn run(
    args: &PlayArgs,
    settings: &impl SettingsSource,
    sink: impl RecordSink + Send + 'static,
) -> Result<()> {
    let summary = play_session(args, settings, sink)?;
    let Summary {
        record,
        score,
        time,
        deadlocks,
        attempts,
    } = &summary;

    println!("{} game over", record.mode.name());
    println!("  score        {}", record.final_score);
    println!("  rounds       {} ({} deadlocked)", record.rounds_completed, deadlocks);
    println!("  attempts     {}", attempts);
    println!(
        "  matches      {} / misses {}",
        score.total_matches, score.total_mismatches
    );
    println!("  accuracy     {}", format_accuracy(score.accuracy));
    println!("  best combo   {}", score.highest_combo);
    println!("  per match    {:.1}", score.average_score_per_match());
    println!("  total time   {}", format_duration(time.total_time));
    if let (Some(fastest), Some(slowest)) = (time.fastest_round, time.slowest_round) {
        println!(
            "  rounds       avg {} fastest {} slowest {}",
            format_duration(time.average_round_time),
            format_duration(fastest),
            format_duration(slowest)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn args(accuracy: f64, rounds: u32) -> PlayArgs {
        PlayArgs {
            mode: ModeArg::Classic,
            rounds,
            accuracy,
            seed: Some(21),
            scoring: None,
            tiles: None,
            think_ms: 1000,
            max_attempts: 1000,
        }
    }

    fn settings(tiles: TileCount) -> Settings {
        let mut settings = Settings::default();
        settings.set_tiles_per_game(tiles);
        settings
    }

    #[test]
    fn perfect_bot_clears_every_round() {
        let store = Arc::new(Mutex::new(Vec::<SessionRecord>::new()));

        let summary = play_session(&args(1.0, 2), &settings(10), store.clone()).unwrap();

        assert_eq!(summary.record.rounds_completed, 2);
        assert_eq!(summary.attempts, 10);
        assert_eq!(summary.deadlocks, 0);
        assert_eq!(summary.score.total_mismatches, 0);
        assert_eq!(summary.record.total_elapsed, Duration::from_secs(10));
        assert_eq!(store.lock().unwrap().as_slice(), &[summary.record.clone()]);
    }

    #[test]
    fn attempt_budget_ends_a_hopeless_session() {
        let mut hopeless = args(0.0, 1);
        hopeless.max_attempts = 5;

        let summary = play_session(&hopeless, &settings(10), Vec::<SessionRecord>::new()).unwrap();

        assert_eq!(summary.attempts, 5);
        assert_eq!(summary.record.rounds_completed, 0);
        assert_eq!(summary.record.final_score, 0);
        assert_eq!(summary.score.total_mismatches, 5);
    }

    #[test]
    fn tiles_flag_overrides_settings() {
        let mut custom = args(1.0, 1);
        custom.tiles = Some(14);

        let summary = play_session(&custom, &settings(10), Vec::<SessionRecord>::new()).unwrap();

        assert_eq!(summary.score.total_matches, 7);
    }

    #[test]
    fn odd_rounds_count_as_deadlocks() {
        let summary = play_session(&args(1.0, 1), &settings(11), Vec::<SessionRecord>::new()).unwrap();

        assert_eq!(summary.record.rounds_completed, 1);
        assert_eq!(summary.deadlocks, 1);
        assert_eq!(summary.score.total_matches, 5);
    }
}
