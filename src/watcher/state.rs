//! Modification-time state machine for the watcher

use std::time::{Duration, Instant, SystemTime};

/// What a poll observed, relative to the recorded state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// No baseline existed; the observed time became the baseline
    Baseline,
    /// Same modification time as the baseline
    Unchanged,
    /// Changed, but within the debounce window after our own write
    OwnEcho,
    /// Changed by someone else
    Changed,
}

/// Watcher state kept for the lifetime of the watcher task
#[derive(Debug, Clone, Default)]
pub struct WatchState {
    last_mtime: Option<SystemTime>,
    last_self_write: Option<Instant>,
}

impl WatchState {
    /// Start with an optional baseline modification time
    pub fn new(baseline: Option<SystemTime>) -> Self {
        Self {
            last_mtime: baseline,
            last_self_write: None,
        }
    }

    /// Classify a newly observed modification time and update the baseline.
    pub fn observe(&mut self, mtime: SystemTime, now: Instant, debounce: Duration) -> Observation {
        let Some(last) = self.last_mtime else {
            self.last_mtime = Some(mtime);
            return Observation::Baseline;
        };

        if mtime == last {
            return Observation::Unchanged;
        }

        self.last_mtime = Some(mtime);

        let within_debounce =
            self.last_self_write.is_some_and(|at| now.saturating_duration_since(at) < debounce);

        if within_debounce { Observation::OwnEcho } else { Observation::Changed }
    }

    /// Record a write made by the watcher itself.
    ///
    /// `mtime` is the modification time read back after the write; when
    /// known it becomes the baseline so the write is not observed as a change.
    pub fn record_self_write(&mut self, at: Instant, mtime: Option<SystemTime>) {
        self.last_self_write = Some(at);
        if let Some(mtime) = mtime {
            self.last_mtime = Some(mtime);
        }
    }

    /// The current baseline modification time
    pub fn last_mtime(&self) -> Option<SystemTime> {
        self.last_mtime
    }

    /// When the watcher last wrote the file
    pub fn last_self_write(&self) -> Option<Instant> {
        self.last_self_write
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::UNIX_EPOCH;

    const DEBOUNCE: Duration = Duration::from_secs(1);

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_first_observation_sets_baseline() {
        let mut state = WatchState::new(None);
        assert_eq!(state.observe(at(10), Instant::now(), DEBOUNCE), Observation::Baseline);
        assert_eq!(state.last_mtime(), Some(at(10)));
        assert_eq!(state.observe(at(10), Instant::now(), DEBOUNCE), Observation::Unchanged);
    }

    #[test]
    fn test_external_change_without_self_write() {
        let mut state = WatchState::new(Some(at(10)));
        assert_eq!(state.observe(at(11), Instant::now(), DEBOUNCE), Observation::Changed);
        assert_eq!(state.last_mtime(), Some(at(11)));
        assert_eq!(state.observe(at(11), Instant::now(), DEBOUNCE), Observation::Unchanged);
    }

    #[test]
    fn test_change_within_debounce_is_own_echo() {
        let start = Instant::now();
        let mut state = WatchState::new(Some(at(10)));
        state.record_self_write(start, None);

        for offset_ms in [0, 1, 500, 999] {
            let mtime = at(20 + offset_ms);
            let now = start + Duration::from_millis(offset_ms);
            assert_eq!(state.observe(mtime, now, DEBOUNCE), Observation::OwnEcho);
            assert_eq!(state.last_mtime(), Some(mtime));
        }
    }

    #[test]
    fn test_change_after_debounce_is_external() {
        let start = Instant::now();
        let mut state = WatchState::new(Some(at(10)));
        state.record_self_write(start, None);

        let now = start + DEBOUNCE;
        assert_eq!(state.observe(at(12), now, DEBOUNCE), Observation::Changed);
    }

    #[test]
    fn test_self_write_mtime_becomes_baseline() {
        let start = Instant::now();
        let mut state = WatchState::new(Some(at(10)));
        state.record_self_write(start, Some(at(15)));

        assert_eq!(state.last_self_write(), Some(start));
        assert_eq!(
            state.observe(at(15), start + Duration::from_secs(60), DEBOUNCE),
            Observation::Unchanged
        );
    }

    #[test]
    fn test_zero_debounce_never_echoes() {
        let start = Instant::now();
        let mut state = WatchState::new(Some(at(10)));
        state.record_self_write(start, None);
        assert_eq!(state.observe(at(11), start, Duration::ZERO), Observation::Changed);
    }
}
