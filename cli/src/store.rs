use anyhow::{Context, Result};
use partial_pair_core::{GameMode, RecordSink, Score, SessionRecord, format_duration};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A finished session as written to disk.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// RFC 3339, UTC.
    pub played_at: String,
    pub mode_id: u8,
    pub final_score: Score,
    pub rounds_completed: u32,
    pub total_elapsed_secs: f64,
}

impl StoredRecord {
    pub fn new(record: &SessionRecord, played_at: OffsetDateTime) -> Result<Self> {
        Ok(Self {
            played_at: played_at
                .format(&Rfc3339)
                .context("Could not format timestamp")?,
            mode_id: record.mode.id(),
            final_score: record.final_score,
            rounds_completed: record.rounds_completed,
            total_elapsed_secs: record.total_elapsed_seconds(),
        })
    }

    pub fn mode(&self) -> Option<GameMode> {
        GameMode::from_id(self.mode_id)
    }

    pub fn played_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.played_at, &Rfc3339).ok()
    }
}

impl fmt::Display for StoredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = self.mode().map_or("Unknown", GameMode::name);
        let elapsed = Duration::try_from_secs_f64(self.total_elapsed_secs).unwrap_or_default();
        write!(
            f,
            "{} {:<9} {:>6} pts {:>3} rounds {:>8}",
            self.played_at,
            mode,
            self.final_score,
            self.rounds_completed,
            format_duration(elapsed)
        )
    }
}

/// Session records kept in a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Records in file order, oldest first.
    pub fn load(&self) -> Result<Vec<StoredRecord>> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("Could not read {}", self.path.display()));
            }
        };
        serde_json::from_str(&text)
            .with_context(|| format!("Corrupt record store {}", self.path.display()))
    }

    fn store(&self, records: &[StoredRecord]) -> Result<()> {
        let text = serde_json::to_string_pretty(records).context("Could not encode records")?;
        fs::write(&self.path, text)
            .with_context(|| format!("Could not write {}", self.path.display()))
    }

    pub fn append(&self, record: &SessionRecord, played_at: OffsetDateTime) -> Result<()> {
        let mut records = self.load()?;
        records.push(StoredRecord::new(record, played_at)?);
        self.store(&records)
    }

    pub fn newest_first(&self) -> Result<Vec<StoredRecord>> {
        let mut records = self.load()?;
        records.sort_by_key(|record| std::cmp::Reverse(record.played_at()));
        Ok(records)
    }

    /// Best `count` sessions, ties broken by recency.
    pub fn top_scores(&self, count: usize) -> Result<Vec<StoredRecord>> {
        let mut records = self.newest_first()?;
        records.sort_by_key(|record| std::cmp::Reverse(record.final_score));
        records.truncate(count);
        Ok(records)
    }

    /// Deletes the record at `index` in [`Self::newest_first`] order.
    pub fn delete(&self, index: usize) -> Result<Option<StoredRecord>> {
        let mut records = self.newest_first()?;
        if index >= records.len() {
            return Ok(None);
        }
        let removed = records.remove(index);
        records.reverse();
        self.store(&records)?;
        Ok(Some(removed))
    }

    /// Deletes everything and returns how many records there were.
    pub fn clear(&self) -> Result<usize> {
        let count = self.load()?.len();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(count),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(err) => Err(err).with_context(|| format!("Could not remove {}", self.path.display())),
        }
    }
}

impl RecordSink for JsonRecordStore {
    fn save_record(&mut self, record: &SessionRecord) {
        let now = OffsetDateTime::now_utc();
        match self.append(record, now) {
            Ok(()) => log::info!("session saved to {}", self.path.display()),
            Err(err) => log::error!("Could not save session: {:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::scratch_path;
    use time::macros::datetime;

    fn record(mode: GameMode, final_score: Score) -> SessionRecord {
        SessionRecord {
            mode,
            final_score,
            rounds_completed: 2,
            total_elapsed: Duration::from_secs(95),
        }
    }

    fn filled_store(name: &str) -> JsonRecordStore {
        let store = JsonRecordStore::new(scratch_path(name));
        store.clear().unwrap();
        store
            .append(&record(GameMode::Classic, 40), datetime!(2026-03-01 10:00 UTC))
            .unwrap();
        store
            .append(&record(GameMode::Challenge, 95), datetime!(2026-03-03 10:00 UTC))
            .unwrap();
        store
            .append(&record(GameMode::Classic, 70), datetime!(2026-03-02 10:00 UTC))
            .unwrap();
        store
    }

    #[test]
    fn empty_store_lists_nothing() {
        let store = JsonRecordStore::new(scratch_path("empty.json"));

        assert!(store.newest_first().unwrap().is_empty());
        assert_eq!(store.clear().unwrap(), 0);
    }

    #[test]
    fn lists_newest_first_and_ranks_by_score() {
        let store = filled_store("ordering.json");

        let newest: Vec<_> = store
            .newest_first()
            .unwrap()
            .iter()
            .map(|r| r.final_score)
            .collect();
        let top: Vec<_> = store
            .top_scores(2)
            .unwrap()
            .iter()
            .map(|r| r.final_score)
            .collect();
        store.clear().unwrap();

        assert_eq!(newest, [95, 70, 40]);
        assert_eq!(top, [95, 70]);
    }

    #[test]
    fn stores_mode_id_and_timestamp() {
        let store = filled_store("fields.json");

        let newest = store.newest_first().unwrap();
        store.clear().unwrap();

        assert_eq!(newest[0].mode(), Some(GameMode::Challenge));
        assert_eq!(newest[0].mode_id, 2);
        assert_eq!(newest[0].played_at(), Some(datetime!(2026-03-03 10:00 UTC)));
        assert_eq!(newest[0].total_elapsed_secs, 95.0);
    }

    #[test]
    fn deletes_one_record() {
        let store = filled_store("delete.json");

        let removed = store.delete(1).unwrap();
        let missing = store.delete(5).unwrap();
        let remaining = store.newest_first().unwrap();
        assert_eq!(store.clear().unwrap(), 2);

        assert_eq!(removed.map(|r| r.final_score), Some(70));
        assert_eq!(missing, None);
        assert_eq!(
            remaining.iter().map(|r| r.final_score).collect::<Vec<_>>(),
            [95, 40]
        );
    }

    #[test]
    fn sink_appends_records() {
        let mut store = JsonRecordStore::new(scratch_path("sink.json"));
        store.clear().unwrap();

        store.save_record(&record(GameMode::Classic, 12));
        store.save_record(&record(GameMode::Classic, 30));
        let saved = store.load().unwrap();
        store.clear().unwrap();

        assert_eq!(saved.len(), 2);
        assert_eq!(saved[1].final_score, 30);
    }

    #[test]
    fn formats_a_listing_line() {
        let stored =
            StoredRecord::new(&record(GameMode::Challenge, 95), datetime!(2026-03-03 10:00 UTC))
                .unwrap();

        let line = stored.to_string();

        assert!(line.starts_with("2026-03-03T10:00:00Z Challenge"));
        assert!(line.contains("95 pts"));
        assert!(line.ends_with("1:35"));
    }
}
