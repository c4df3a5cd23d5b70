use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use web_time::Instant;

/// Monotonic time source, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock, counted from when it was created.
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.nanos.fetch_add(duration_nanos(by), Ordering::Relaxed);
    }

    pub fn set(&self, at: Duration) {
        self.nanos.store(duration_nanos(at), Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

fn duration_nanos(duration: Duration) -> u64 {
    duration.as_nanos().try_into().unwrap_or(u64::MAX)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionTimeStatistics {
    pub total_time: Duration,
    pub round_times: Vec<Duration>,
    pub average_round_time: Duration,
    pub fastest_round: Option<Duration>,
    pub slowest_round: Option<Duration>,
    pub total_pause_duration: Duration,
}

impl SessionTimeStatistics {
    pub fn round_count(&self) -> usize {
        self.round_times.len()
    }
}

/// Tracks a whole game session: wall time minus pauses, plus the time of each finished round.
///
/// All methods take the current time explicitly so the timer itself never reads a clock.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionTimer {
    started_at: Option<Duration>,
    ended_at: Option<Duration>,
    paused_at: Option<Duration>,
    pause_total: Duration,
    round_times: Vec<Duration>,
}

impl SessionTimer {
    pub fn start(&mut self, now: Duration) {
        *self = Self {
            started_at: Some(now),
            ..Self::default()
        };
    }

    pub fn end(&mut self, now: Duration) {
        if self.started_at.is_none() || self.ended_at.is_some() {
            return;
        }
        self.resume(now);
        self.ended_at = Some(now);
    }

    pub fn pause(&mut self, now: Duration) {
        if self.is_active() && self.paused_at.is_none() {
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Duration) {
        if let Some(paused_at) = self.paused_at.take() {
            self.pause_total += now.saturating_sub(paused_at);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn record_round(&mut self, time: Duration) {
        self.round_times.push(time);
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some() && self.ended_at.is_none()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    pub fn pause_duration(&self, now: Duration) -> Duration {
        let ongoing = self
            .paused_at
            .map_or(Duration::ZERO, |paused_at| now.saturating_sub(paused_at));
        self.pause_total + ongoing
    }

    /// Time spent playing, not counting pauses.
    pub fn total_time(&self, now: Duration) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let end = self.ended_at.unwrap_or(now);
        end.saturating_sub(started_at)
            .saturating_sub(self.pause_duration(end))
    }

    pub fn round_times(&self) -> &[Duration] {
        &self.round_times
    }

    pub fn average_round_time(&self) -> Duration {
        match u32::try_from(self.round_times.len()) {
            Ok(0) | Err(_) => Duration::ZERO,
            Ok(count) => self.round_times.iter().sum::<Duration>() / count,
        }
    }

    pub fn fastest_round(&self) -> Option<Duration> {
        self.round_times.iter().min().copied()
    }

    pub fn slowest_round(&self) -> Option<Duration> {
        self.round_times.iter().max().copied()
    }

    pub fn statistics(&self, now: Duration) -> SessionTimeStatistics {
        SessionTimeStatistics {
            total_time: self.total_time(now),
            round_times: self.round_times.clone(),
            average_round_time: self.average_round_time(),
            fastest_round: self.fastest_round(),
            slowest_round: self.slowest_round(),
            total_pause_duration: self.pause_duration(self.ended_at.unwrap_or(now)),
        }
    }
}

/// Times a single round.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTimer {
    started_at: Option<Duration>,
    last_round: Duration,
}

impl RoundTimer {
    pub fn start(&mut self, now: Duration) {
        self.started_at = Some(now);
        self.last_round = Duration::ZERO;
    }

    /// Stops the timer and returns the round's length, zero if it was not running.
    pub fn end(&mut self, now: Duration) -> Duration {
        let Some(started_at) = self.started_at.take() else {
            return Duration::ZERO;
        };
        self.last_round = now.saturating_sub(started_at);
        self.last_round
    }

    pub fn current(&self, now: Duration) -> Duration {
        self.started_at
            .map_or(self.last_round, |started_at| now.saturating_sub(started_at))
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// `m:ss`, or `h:mm:ss` from one hour on.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let (hours, minutes, seconds) = (total / 3600, total / 60 % 60, total % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
