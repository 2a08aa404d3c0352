use crate::models::StabilizerConfig;
use log::{debug, trace};
use std::collections::HashMap;

/// One distinct value observed by the stabilizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedCandidate {
    pub value: String,
    pub last_seen: i64,
    /// Sightings while the candidate has stayed inside the window.
    pub count: i64,
}

/// Turns per-frame guesses into one value that several frames agree on.
///
/// Not thread-safe by itself; the reader keeps it behind a mutex so frame
/// results are applied one at a time.
#[derive(Debug)]
pub struct TemporalStabilizer {
    config: StabilizerConfig,
    frame_index: i64,
    candidates: HashMap<String, TrackedCandidate>,
    best_value: String,
    best_count: i64,
}

impl TemporalStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        TemporalStabilizer {
            config,
            frame_index: 0,
            candidates: HashMap::new(),
            best_value: String::new(),
            best_count: 0,
        }
    }

    pub fn frame_index(&self) -> i64 {
        self.frame_index
    }

    pub fn best_count(&self) -> i64 {
        self.best_count
    }

    pub fn candidate(&self, value: &str) -> Option<&TrackedCandidate> {
        self.candidates.get(value)
    }

    pub fn tracked(&self) -> usize {
        self.candidates.len()
    }

    /// Records one frame's values at the current tick and advances the tick.
    pub fn log_frame<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let frame_index = self.frame_index;
        self.log_frame_at(frame_index, values);
    }

    /// Records values at an explicit tick. Ticks never move backwards; gaps
    /// left by dropped frames only age candidates.
    pub fn log_frame_at<I, S>(&mut self, frame_index: i64, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let now = frame_index.max(self.frame_index);

        for value in values {
            let value = value.as_ref();
            match self.candidates.get_mut(value) {
                // A value repeated inside one frame counts once.
                Some(seen) if seen.last_seen == now => {}
                Some(seen) => {
                    seen.last_seen = now;
                    seen.count += 1;
                }
                None => {
                    self.candidates.insert(
                        value.to_string(),
                        TrackedCandidate {
                            value: value.to_string(),
                            last_seen: now,
                            count: 1,
                        },
                    );
                }
            }
        }

        let horizon = now - self.config.stale_after;
        self.candidates.retain(|value, seen| {
            let keep = seen.last_seen >= horizon;
            if !keep {
                trace!("Evicting stale candidate {:?} (last seen {})", value, seen.last_seen);
            }
            keep
        });

        let best = self.candidates.values().max_by(|a, b| {
            a.count
                .cmp(&b.count)
                .then(a.last_seen.cmp(&b.last_seen))
                .then(b.value.cmp(&a.value))
        });
        match best {
            Some(best) => {
                self.best_value = best.value.clone();
                self.best_count = best.count;
            }
            None => {
                self.best_value.clear();
                self.best_count = 0;
            }
        }

        self.frame_index = now + 1;
    }

    pub fn stable_value(&self) -> Option<&str> {
        if self.best_count >= self.config.stable_count {
            Some(&self.best_value)
        } else {
            None
        }
    }

    /// Forgets one value's history and clears the best candidate; other
    /// candidates keep their counts.
    pub fn reset(&mut self, value: &str) {
        self.candidates.remove(value);
        self.best_value.clear();
        self.best_count = 0;
    }

    /// Returns the stable value once and resets it.
    pub fn take_stable(&mut self) -> Option<String> {
        let value = self.stable_value()?.to_string();
        debug!(
            "Stable value after {} sightings at frame {}",
            self.best_count,
            self.frame_index - 1
        );
        self.reset(&value);
        Some(value)
    }
}
