//! Watch progress per video, kept for the lifetime of the session.

use std::collections::HashMap;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ProgressRecord {
    /// Seconds, never negative.
    pub current_time: f64,
    /// Seconds, always positive.
    pub duration: f64,
    /// `100 * current_time / duration`, clamped to `0..=100`.
    pub percentage: f64,
}

/// Last known position of every video played this session, keyed by
/// identifying path. Records are overwritten and never removed.
#[derive(Debug, Default)]
pub struct ProgressStore {
    records: HashMap<String, ProgressRecord>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the position of `path`. Ignored unless `duration` is a positive
    /// number and `current_time` is finite.
    pub fn record(&mut self, path: &str, current_time: f64, duration: f64) {
        if !duration.is_finite() || duration <= 0.0 || !current_time.is_finite() {
            return;
        }
        let current_time = current_time.max(0.0);
        let percentage = (100.0 * current_time / duration).clamp(0.0, 100.0);
        self.records.insert(
            path.to_string(),
            ProgressRecord {
                current_time,
                duration,
                percentage,
            },
        );
    }

    pub fn get(&self, path: &str) -> Option<&ProgressRecord> {
        self.records.get(path)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
