use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::time::Duration;

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Idle,
    Playing,
    Paused,
    ProcessingMatch,
    RoundComplete,
    GameOver,
}

impl GameState {
    /// Only a round in play accepts tile selections.
    pub const fn is_interaction_enabled(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::Idle
    }
}

/// How the round stands after a pair attempt was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RoundStatus {
    Continues,
    Cleared,
    /// Tiles remain but no two of them share a face.
    Deadlocked,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PairResolution {
    pub first: TileIndex,
    pub second: TileIndex,
    pub score: ScoreUpdate,
    pub round: RoundStatus,
}

/// Outcome of selecting a tile
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    Ignored(Rejection),
    Selected,
    Matched(PairResolution),
    Mismatched(PairResolution),
}

impl SelectOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::Ignored(_))
    }

    pub const fn resolution(self) -> Option<PairResolution> {
        match self {
            Self::Matched(resolution) | Self::Mismatched(resolution) => Some(resolution),
            Self::Ignored(_) | Self::Selected => None,
        }
    }
}

/// Outcome of a round or session control call
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlOutcome {
    Ignored(Rejection),
    Changed,
}

impl ControlOutcome {
    pub const fn has_update(self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// Weighted difficulty used by Challenge mode.
pub const CHALLENGE_DIFFICULTY: f64 = 1.2;

/// Everything chosen once, when the engine is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineOptions {
    pub generation: GenerationStrategy,
    pub match_rule: MatchRule,
    pub scoring: ScoreConfig,
    pub pool: ImagePool,
    /// Fixed seed for reproducible boards, random when unset.
    pub seed: Option<u64>,
}

impl EngineOptions {
    /// Classic deals uniformly with standard scoring. Challenge leans on look-alike faces at
    /// [`CHALLENGE_DIFFICULTY`] and scores competitively, time bonus included.
    pub fn for_mode(mode: GameMode) -> Self {
        let (generation, scoring) = match mode {
            GameMode::Classic => (GenerationStrategy::Standard, ScoreConfig::STANDARD),
            GameMode::Challenge => (
                GenerationStrategy::Weighted {
                    difficulty: CHALLENGE_DIFFICULTY,
                },
                ScoreConfig::COMPETITIVE,
            ),
        };
        Self {
            generation,
            scoring,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_generation(mut self, generation: GenerationStrategy) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoreConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_match_rule(mut self, match_rule: MatchRule) -> Self {
        self.match_rule = match_rule;
        self
    }
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            generation: GenerationStrategy::Standard,
            match_rule: MatchRule::Standard,
            scoring: ScoreConfig::STANDARD,
            pool: ImagePool::reference(),
            seed: None,
        }
    }
}

/// Round and session state machine.
///
/// All calls are synchronous: selecting the second tile of an attempt resolves it on the spot,
/// scores it and settles the round before returning. Events pile up in order until the caller
/// drains them or dispatches them to a [`GameObserver`]. The queue is never trimmed, and every
/// deal pushes a full copy of the board, so callers that only look at the returned outcomes
/// should still drain it now and then. The engine is meant to be driven from a single place;
/// wrap it in one lock if it has to be shared.
pub struct PairEngine {
    generator: Generator,
    generation: GenerationStrategy,
    match_rule: MatchRule,
    score: ScoreManager,
    config: Option<GameConfig>,
    tiles: Vec<Tile>,
    selection: SmallVec<[TileIndex; 2]>,
    matched_pairs: TileCount,
    current_round: u32,
    rounds_completed: u32,
    state: GameState,
    events: VecDeque<GameEvent>,
    history: ValidationHistory,
    clock: Box<dyn Clock + Send>,
    session: SessionTimer,
    round_timer: RoundTimer,
    last_match_at: Option<Duration>,
    record_sink: Option<Box<dyn RecordSink + Send>>,
}

impl PairEngine {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_clock(options, SystemClock::new())
    }

    pub fn with_clock(options: EngineOptions, clock: impl Clock + Send + 'static) -> Self {
        let seed = options.seed.unwrap_or_else(rand::random);
        Self {
            generator: Generator::from_strategy(&options.generation, options.pool, seed),
            generation: options.generation,
            match_rule: options.match_rule,
            score: ScoreManager::new(options.scoring),
            config: None,
            tiles: Vec::new(),
            selection: SmallVec::new(),
            matched_pairs: 0,
            current_round: 0,
            rounds_completed: 0,
            state: GameState::Idle,
            events: VecDeque::new(),
            history: ValidationHistory::default(),
            clock: Box::new(clock),
            session: SessionTimer::default(),
            round_timer: RoundTimer::default(),
            last_match_at: None,
            record_sink: None,
        }
    }

    pub fn with_record_sink(mut self, sink: impl RecordSink + Send + 'static) -> Self {
        self.set_record_sink(sink);
        self
    }

    pub fn set_record_sink(&mut self, sink: impl RecordSink + Send + 'static) {
        self.record_sink = Some(Box::new(sink));
    }

    // ---- accessors ----

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_finished()
    }

    pub fn config(&self) -> Option<&GameConfig> {
        self.config.as_ref()
    }

    pub fn mode(&self) -> Option<GameMode> {
        self.config.as_ref().map(|config| config.mode)
    }

    pub fn generation_strategy(&self) -> &GenerationStrategy {
        &self.generation
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile(&self, index: TileIndex) -> Option<&Tile> {
        self.tiles.get(index)
    }

    pub fn selection(&self) -> &[TileIndex] {
        &self.selection
    }

    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    pub fn rounds_completed(&self) -> u32 {
        self.rounds_completed
    }

    pub fn matched_pairs(&self) -> TileCount {
        self.matched_pairs
    }

    pub fn total_pairs(&self) -> TileCount {
        self.config.as_ref().map_or(0, GameConfig::total_pairs)
    }

    pub fn score(&self) -> &ScoreManager {
        &self.score
    }

    pub fn validation_history(&self) -> &ValidationHistory {
        &self.history
    }

    pub fn session_timer(&self) -> &SessionTimer {
        &self.session
    }

    pub fn elapsed(&self) -> Duration {
        self.session.total_time(self.clock.now())
    }

    pub fn current_round_time(&self) -> Duration {
        self.round_timer.current(self.clock.now())
    }

    pub fn board_statistics(&self) -> BoardStatistics {
        BoardStatistics::from_tiles(&self.tiles)
    }

    pub fn score_statistics(&self) -> ScoreStatistics {
        ScoreStatistics::from_manager(&self.score, self.rounds_completed, self.elapsed())
    }

    pub fn time_statistics(&self) -> SessionTimeStatistics {
        self.session.statistics(self.clock.now())
    }

    /// Record describing the session so far, `None` before the first game starts.
    pub fn session_record(&self) -> Option<SessionRecord> {
        let config = self.config.as_ref()?;
        Some(SessionRecord {
            mode: config.mode,
            final_score: self.score.current_score(),
            rounds_completed: self.rounds_completed,
            total_elapsed: self.elapsed(),
        })
    }

    /// Whether two unmatched tiles still share a face.
    pub fn has_available_matches(&self) -> bool {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for tile in self.tiles.iter().filter(|tile| !tile.is_matched()) {
            let count = counts.entry(tile.image_key()).or_insert(0);
            *count += 1;
            if *count >= 2 {
                return true;
            }
        }
        false
    }

    // ---- events ----

    pub fn pending_events(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    /// Hands every pending event to `observer`, oldest first.
    pub fn dispatch<O: GameObserver + ?Sized>(&mut self, observer: &mut O) {
        while let Some(event) = self.events.pop_front() {
            event.deliver_to(observer);
        }
    }

    // ---- session control ----

    pub fn start_new_game(&mut self, mode: GameMode, tiles_count: TileCount) -> ControlOutcome {
        self.start_game(GameConfig::new(mode, tiles_count))
    }

    /// Starts a game with the tile count the settings ask for.
    pub fn start_new_game_with_settings(
        &mut self,
        mode: GameMode,
        settings: &impl SettingsSource,
    ) -> ControlOutcome {
        self.start_new_game(mode, settings.tiles_per_round())
    }

    /// Starts a fresh session with an explicit config, resetting score and round counters.
    pub fn start_game(&mut self, config: GameConfig) -> ControlOutcome {
        if let Err(rejection) = self.check_not_finished() {
            return self.ignore_control("start_game", rejection);
        }

        log::debug!(
            "new {} game, {} tiles per round, {} dealing",
            config.mode.name(),
            config.tiles_count,
            self.generation.name()
        );
        self.config = Some(config);
        self.score.reset();
        self.history.clear();
        self.current_round = 0;
        self.rounds_completed = 0;
        self.session.start(self.clock.now());
        self.begin_round();
        ControlOutcome::Changed
    }

    /// Deals the next round; only valid once the previous round is complete.
    pub fn start_new_round(&mut self) -> ControlOutcome {
        if let Err(rejection) = self.check_not_finished() {
            return self.ignore_control("start_new_round", rejection);
        }
        if self.config.is_none() {
            return self.ignore_control("start_new_round", Rejection::NotConfigured);
        }
        if self.state != GameState::RoundComplete {
            return self.ignore_control("start_new_round", Rejection::WrongState);
        }

        self.begin_round();
        ControlOutcome::Changed
    }

    /// Pauses the session clock only. Round time and the time-bonus window keep running.
    pub fn pause_game(&mut self) -> ControlOutcome {
        if let Err(rejection) = self.check_not_finished() {
            return self.ignore_control("pause_game", rejection);
        }
        if self.state != GameState::Playing {
            return self.ignore_control("pause_game", Rejection::WrongState);
        }

        self.session.pause(self.clock.now());
        self.set_state(GameState::Paused);
        ControlOutcome::Changed
    }

    pub fn resume_game(&mut self) -> ControlOutcome {
        if let Err(rejection) = self.check_not_finished() {
            return self.ignore_control("resume_game", rejection);
        }
        if self.state != GameState::Paused {
            return self.ignore_control("resume_game", Rejection::WrongState);
        }

        self.session.resume(self.clock.now());
        self.set_state(GameState::Playing);
        ControlOutcome::Changed
    }

    /// Ends the session from any state. Terminal: every later mutating call is ignored.
    pub fn end_game(&mut self) -> ControlOutcome {
        if let Err(rejection) = self.check_not_finished() {
            return self.ignore_control("end_game", rejection);
        }

        self.session.end(self.clock.now());
        self.set_state(GameState::GameOver);
        self.emit(GameEvent::GameEnded);

        if let Some(record) = self.session_record() {
            log::debug!(
                "game over: {} points over {} rounds in {:.1}s",
                record.final_score,
                record.rounds_completed,
                record.total_elapsed_seconds()
            );
            if let Some(sink) = self.record_sink.as_mut() {
                sink.save_record(&record);
            }
        }
        ControlOutcome::Changed
    }

    // ---- play ----

    pub fn select_tile(&mut self, index: TileIndex) -> SelectOutcome {
        if let Err(rejection) = self.check_selectable(index) {
            log::trace!("select {} ignored: {}", index, rejection);
            return SelectOutcome::Ignored(rejection);
        }

        self.tiles[index].select();
        self.selection.push(index);
        log::trace!("selected {} ({})", index, self.tiles[index].image_key());
        self.emit(GameEvent::TileSelected(index));

        if self.selection.len() == 2 {
            self.resolve_selection()
        } else {
            SelectOutcome::Selected
        }
    }

    fn check_selectable(&self, index: TileIndex) -> core::result::Result<(), Rejection> {
        self.check_not_finished()?;
        if !self.state.is_interaction_enabled() {
            return Err(Rejection::NotInteractive);
        }
        let tile = self.tiles.get(index).ok_or(Rejection::OutOfBounds)?;
        if tile.is_matched() {
            return Err(Rejection::AlreadyMatched);
        }
        if tile.is_selected() {
            return Err(Rejection::AlreadySelected);
        }
        Ok(())
    }

    fn resolve_selection(&mut self) -> SelectOutcome {
        self.set_state(GameState::ProcessingMatch);

        let (first, second) = (self.selection[0], self.selection[1]);
        let matched = self
            .match_rule
            .is_match(&self.tiles[first], &self.tiles[second]);
        let now = self.clock.now();
        self.history.record(Validation {
            first: self.tiles[first].id(),
            second: self.tiles[second].id(),
            matched,
            at: now,
        });

        if matched {
            self.tiles[first].mark_matched();
            self.tiles[second].mark_matched();
            self.matched_pairs += 1;

            let elapsed = self.last_match_at.map(|at| now.saturating_sub(at));
            let score = self.score.record_match_with_elapsed(elapsed);
            self.last_match_at = Some(now);
            log::debug!("match {} / {}: {}", first, second, score);

            self.emit(GameEvent::MatchFound(first, second));
            self.emit(GameEvent::ScoreUpdated {
                total_score: score.total_score,
                combo_count: score.combo_count,
            });
            self.emit_progress();

            let round = self.settle_round();
            SelectOutcome::Matched(PairResolution {
                first,
                second,
                score,
                round,
            })
        } else {
            let score = self.score.record_mismatch();
            log::debug!("mismatch {} / {}: {}", first, second, score);

            self.emit(GameEvent::MismatchFound(first, second));
            self.emit(GameEvent::ScoreUpdated {
                total_score: score.total_score,
                combo_count: 0,
            });

            let round = self.settle_round();
            SelectOutcome::Mismatched(PairResolution {
                first,
                second,
                score,
                round,
            })
        }
    }

    /// Releases the current selection and decides whether the round goes on.
    fn settle_round(&mut self) -> RoundStatus {
        if let &[first, second] = self.selection.as_slice() {
            self.emit(GameEvent::SelectionReset(first, second));
        }
        for index in self.selection.drain(..) {
            self.tiles[index].deselect();
        }

        if self.tiles.iter().all(Tile::is_matched) {
            self.complete_round();
            RoundStatus::Cleared
        } else if !self.has_available_matches() {
            log::debug!(
                "round {} deadlocked with {} tiles left",
                self.current_round,
                self.tiles.iter().filter(|tile| !tile.is_matched()).count()
            );
            self.emit(GameEvent::NoMatchesAvailable);
            self.complete_round();
            RoundStatus::Deadlocked
        } else {
            self.set_state(GameState::Playing);
            RoundStatus::Continues
        }
    }

    fn begin_round(&mut self) {
        let Some(config) = self.config.as_ref() else {
            return;
        };
        let request = GenerationRequest::from_config(config);

        self.current_round += 1;
        self.matched_pairs = 0;
        self.selection.clear();
        self.tiles = self.generator.generate(&request);

        let now = self.clock.now();
        self.round_timer.start(now);
        self.last_match_at = Some(now);
        log::debug!(
            "round {} dealt {} tiles",
            self.current_round,
            self.tiles.len()
        );

        self.set_state(GameState::Playing);
        self.emit(GameEvent::TilesGenerated(self.tiles.clone()));
        self.emit_progress();

        // nothing to pair on the fresh board, e.g. a lone tile or a hand-built layout
        if !self.has_available_matches() {
            self.settle_round();
        }
    }

    fn complete_round(&mut self) {
        let round_time = self.round_timer.end(self.clock.now());
        self.session.record_round(round_time);
        self.rounds_completed += 1;
        log::debug!(
            "round {} complete in {}",
            self.current_round,
            format_duration(round_time)
        );

        self.set_state(GameState::RoundComplete);
        self.emit(GameEvent::RoundComplete(self.current_round));
    }

    fn emit_progress(&mut self) {
        if self.config.is_some() {
            self.emit(GameEvent::ProgressUpdated {
                matched: self.matched_pairs,
                total: self.total_pairs(),
            });
        }
    }

    fn set_state(&mut self, state: GameState) {
        if self.state != state {
            self.state = state;
            self.emit(GameEvent::StateChanged(state));
        }
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push_back(event);
    }

    fn check_not_finished(&self) -> core::result::Result<(), Rejection> {
        if self.state.is_finished() {
            Err(Rejection::GameOver)
        } else {
            Ok(())
        }
    }

    fn ignore_control(&self, call: &str, rejection: Rejection) -> ControlOutcome {
        log::trace!("{} ignored in {:?}: {}", call, self.state, rejection);
        ControlOutcome::Ignored(rejection)
    }
}

impl fmt::Debug for PairEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PairEngine")
            .field("state", &self.state)
            .field("config", &self.config)
            .field("current_round", &self.current_round)
            .field("matched_pairs", &self.matched_pairs)
            .field("selection", &self.selection)
            .field("score", &self.score)
            .finish_non_exhaustive()
    }
}
