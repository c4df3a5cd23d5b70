use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::*;

/// What gets stored when a session ends.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub mode: GameMode,
    pub final_score: Score,
    pub rounds_completed: u32,
    pub total_elapsed: Duration,
}

impl SessionRecord {
    pub fn total_elapsed_seconds(&self) -> f64 {
        self.total_elapsed.as_secs_f64()
    }
}

/// Destination for finished sessions. Saving is fire-and-forget: a sink reports its own
/// failures and the engine never looks at the outcome.
pub trait RecordSink {
    fn save_record(&mut self, record: &SessionRecord);
}

impl RecordSink for Vec<SessionRecord> {
    fn save_record(&mut self, record: &SessionRecord) {
        self.push(record.clone());
    }
}

impl<S: RecordSink> RecordSink for Arc<Mutex<S>> {
    fn save_record(&mut self, record: &SessionRecord) {
        match self.lock() {
            Ok(mut sink) => sink.save_record(record),
            Err(err) => log::error!("Could not save session record: {}", err),
        }
    }
}
