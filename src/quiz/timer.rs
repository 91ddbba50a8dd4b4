//! Countdown state that survives restarts.
//!
//! Remaining time is always derived from the persisted start time and the
//! wall clock, never from an in-memory counter, so a restarted client picks
//! the countdown up where it really is.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::clock::Clock;
use super::store::KeyValueStore;

/// Key under which the running countdown is stored.
pub const TIMER_KEY: &str = "quizTimer";

/// Length of the answer window for a question.
pub const QUESTION_SECONDS: u64 = 20;

/// Persisted countdown for the active question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    /// Epoch milliseconds at which the countdown started.
    pub start_time: u64,
    /// Countdown length in seconds.
    pub duration: u64,
}

impl TimerRecord {
    /// Whole seconds left at `now_ms`, clamped at zero.
    pub fn remaining_at(&self, now_ms: u64) -> u64 {
        let elapsed = now_ms.saturating_sub(self.start_time) / 1000;
        self.duration.saturating_sub(elapsed)
    }
}

pub struct TimerPersistence {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl TimerPersistence {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Start a countdown of `duration` seconds from now, replacing any record.
    pub fn start(&self, duration: u64) -> TimerRecord {
        let record = TimerRecord {
            start_time: self.clock.now_ms(),
            duration,
        };

        match serde_json::to_string(&record) {
            Ok(json) => {
                if let Err(e) = self.store.set(TIMER_KEY, &json) {
                    warn!("Failed to persist countdown: {}", e);
                }
            }
            Err(e) => warn!("Failed to encode countdown: {}", e),
        }

        record
    }

    /// The persisted record, if one exists and is readable.
    pub fn record(&self) -> Option<TimerRecord> {
        let raw = match self.store.get(TIMER_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!("Failed to read countdown: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Ignoring corrupt countdown record: {}", e);
                None
            }
        }
    }

    /// Seconds left on the countdown, or the full window if none is running.
    pub fn read(&self) -> u64 {
        self.record()
            .map(|record| record.remaining_at(self.clock.now_ms()))
            .unwrap_or(QUESTION_SECONDS)
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(TIMER_KEY) {
            warn!("Failed to clear countdown: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::clock::ManualClock;
    use crate::quiz::store::MemoryStore;

    fn timer() -> (TimerPersistence, ManualClock, Arc<MemoryStore>) {
        let clock = ManualClock::new(1_700_000_000_000);
        let store = Arc::new(MemoryStore::new());
        let timer = TimerPersistence::new(store.clone(), Arc::new(clock.clone()));
        (timer, clock, store)
    }

    #[test]
    fn test_default_without_record() {
        let (timer, _, _) = timer();
        assert_eq!(timer.read(), QUESTION_SECONDS);
        assert!(timer.record().is_none());
    }

    #[test]
    fn test_remaining_floors_elapsed_seconds() {
        let (timer, clock, _) = timer();
        timer.start(20);
        clock.advance_ms(4_999);
        assert_eq!(timer.read(), 16);
        clock.advance_ms(1);
        assert_eq!(timer.read(), 15);
    }

    #[test]
    fn test_remaining_clamps_at_zero() {
        let (timer, clock, _) = timer();
        timer.start(20);
        clock.advance_secs(25);
        assert_eq!(timer.read(), 0);
    }

    #[test]
    fn test_resumes_from_persisted_record() {
        let (_, clock, store) = timer();
        let record = TimerRecord {
            start_time: clock.now_ms() - 5_000,
            duration: 20,
        };
        store
            .set(TIMER_KEY, &serde_json::to_string(&record).unwrap())
            .unwrap();

        // A fresh instance over the same store sees the same countdown.
        let reloaded = TimerPersistence::new(store, Arc::new(clock));
        assert_eq!(reloaded.read(), 15);
    }

    #[test]
    fn test_wire_format() {
        let (timer, _, store) = timer();
        timer.start(20);
        let raw = store.get(TIMER_KEY).unwrap().unwrap();
        assert!(raw.contains("\"startTime\":1700000000000"));
        assert!(raw.contains("\"duration\":20"));
    }

    #[test]
    fn test_corrupt_record_is_ignored() {
        let (timer, _, store) = timer();
        store.set(TIMER_KEY, "not json").unwrap();
        assert!(timer.record().is_none());
        assert_eq!(timer.read(), QUESTION_SECONDS);
    }

    #[test]
    fn test_clear() {
        let (timer, _, _) = timer();
        timer.start(20);
        timer.clear();
        assert!(timer.record().is_none());
    }
}
