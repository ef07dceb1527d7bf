//! Login attempt throttle.
//!
//! Counts attempts per key (client address) inside a fixed window. The number
//! of tracked keys is capped: expired windows are swept on insert, and if the
//! map is still full the entry with the oldest window is evicted.

use log::debug;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::common::config::ThrottleConfig;
use crate::common::error::LoginError;

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    attempts: u32,
}

#[derive(Debug)]
pub struct AttemptThrottle {
    max_attempts: u32,
    window: Duration,
    max_keys: usize,
    entries: HashMap<String, Window>,
}

impl AttemptThrottle {
    pub fn new(config: &ThrottleConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            window: Duration::from_secs(config.window_secs),
            max_keys: config.max_tracked_keys.max(1),
            entries: HashMap::new(),
        }
    }

    /// Record an attempt for `key` at `now`.
    ///
    /// Returns [`LoginError::TooManyAttempts`] once the key has used up its
    /// attempts for the current window; rejected attempts are not counted.
    pub fn check(&mut self, key: &str, now: Instant) -> Result<(), LoginError> {
        if let Some(entry) = self.entries.get_mut(key) {
            let elapsed = now.saturating_duration_since(entry.started);
            if elapsed >= self.window {
                *entry = Window { started: now, attempts: 1 };
                return Ok(());
            }
            if entry.attempts >= self.max_attempts {
                let remaining = self.window - elapsed;
                // Round up so a client never retries a moment too early.
                let retry_after_secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
                return Err(LoginError::TooManyAttempts {
                    retry_after_secs: retry_after_secs.max(1),
                });
            }
            entry.attempts += 1;
            return Ok(());
        }

        if self.entries.len() >= self.max_keys {
            self.sweep(now);
        }
        if self.entries.len() >= self.max_keys {
            self.evict_oldest();
        }
        self.entries.insert(key.to_string(), Window { started: now, attempts: 1 });
        Ok(())
    }

    /// Forget `key`, e.g. after a successful login.
    pub fn reset(&mut self, key: &str) {
        self.entries.remove(key);
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    fn sweep(&mut self, now: Instant) {
        let window = self.window;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.started) < window);
        debug!("Throttle sweep dropped {} expired entries", before - self.entries.len());
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.started)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}
