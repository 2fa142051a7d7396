//! Per-user cooldown ledger.
//!
//! Stores the timestamp of every user's last accepted poke. Entries live as
//! long as the tracker; nothing is evicted unless [`CooldownTracker::sweep`]
//! is called explicitly.

use std::collections::HashMap;

/// Outcome of a combined check-and-record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownDecision {
    /// Trigger accepted; the ledger now holds its timestamp.
    Accepted,
    /// Trigger suppressed; the ledger is unchanged.
    Suppressed {
        /// Milliseconds until the user may trigger again
        remaining_ms: u64,
    },
}

impl CooldownDecision {
    /// Whether the trigger was accepted
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Last-trigger ledger with a fixed-interval policy.
#[derive(Debug, Clone, Default)]
pub struct CooldownTracker {
    last_trigger: HashMap<String, u64>,
}

impl CooldownTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds left before `user_id` may trigger again, if any.
    pub fn remaining(&self, user_id: &str, now: u64, cooldown_ms: u64) -> Option<u64> {
        if cooldown_ms == 0 {
            return None;
        }
        let last = *self.last_trigger.get(user_id)?;
        let elapsed = now.saturating_sub(last);
        (elapsed < cooldown_ms).then(|| cooldown_ms - elapsed)
    }

    /// Whether a trigger from `user_id` at `now` falls inside the cooldown.
    pub fn should_suppress(&self, user_id: &str, now: u64, cooldown_ms: u64) -> bool {
        self.remaining(user_id, now, cooldown_ms).is_some()
    }

    /// Record an accepted trigger, overwriting any previous entry.
    pub fn record(&mut self, user_id: &str, now: u64) {
        self.last_trigger.insert(user_id.to_string(), now);
    }

    /// Check and, when accepted, record in one step.
    ///
    /// Suppressed triggers leave the ledger untouched so they never extend
    /// the cooldown window.
    pub fn check_and_record(&mut self, user_id: &str, now: u64, cooldown_ms: u64) -> CooldownDecision {
        if let Some(remaining_ms) = self.remaining(user_id, now, cooldown_ms) {
            return CooldownDecision::Suppressed { remaining_ms };
        }
        self.record(user_id, now);
        CooldownDecision::Accepted
    }

    /// Timestamp of the user's last accepted trigger.
    pub fn last_trigger(&self, user_id: &str) -> Option<u64> {
        self.last_trigger.get(user_id).copied()
    }

    /// Number of users in the ledger.
    pub fn len(&self) -> usize {
        self.last_trigger.len()
    }

    /// Whether the ledger is empty.
    pub fn is_empty(&self) -> bool {
        self.last_trigger.is_empty()
    }

    /// Drop entries whose last trigger is at least `max_age_ms` old.
    ///
    /// Opt-in only: the reactor never calls this on its own, so by default
    /// the ledger keeps every user it has seen. Returns the number removed.
    pub fn sweep(&mut self, now: u64, max_age_ms: u64) -> usize {
        let before = self.last_trigger.len();
        self.last_trigger
            .retain(|_, last| now.saturating_sub(*last) < max_age_ms);
        before - self.last_trigger.len()
    }
}
