//! Delayed-wakeup facility owned by the engine.
//!
//! Plays the role of `after(ms, fn) -> cancel token`: instead of closures
//! the queue stores plain [`Wakeup`] values, which the engine validates
//! against current state when they come due.

use std::collections::{BTreeMap, HashMap};

use crate::toast::ToastId;

/// Cancel token returned by [`TimerQueue::after`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle(u64);

/// Snapshot of the record state an expiry wakeup was armed against.
///
/// On fire the engine compares every marker with the current record; a
/// mismatch means the record moved on and the wakeup is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerToken {
    pub id: ToastId,
    pub started_at: u64,
    pub update_count: u32,
    pub deadline: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// Auto-dismiss countdown reached zero.
    Expire(TimerToken),
    /// Grace delay after removal elapsed; drop the record.
    Delete { id: ToastId, resume_next: bool },
}

/// Wakeups ordered by deadline, then by arming order.
#[derive(Debug, Default)]
pub struct TimerQueue {
    entries: BTreeMap<(u64, u64), Wakeup>,
    deadlines: HashMap<u64, u64>,
    next_seq: u64,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms `wakeup` to come due `delay_ms` after `now`.
    pub fn after(&mut self, now: u64, delay_ms: u64, wakeup: Wakeup) -> TimerHandle {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = now.saturating_add(delay_ms);
        self.entries.insert((deadline, seq), wakeup);
        self.deadlines.insert(seq, deadline);
        TimerHandle(seq)
    }

    /// Idempotent. Returns `true` if the wakeup was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle.0) {
            Some(deadline) => self.entries.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.entries.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest wakeup due at `now`, if any.
    ///
    /// Returned one at a time so handling a wakeup can cancel later ones.
    pub fn pop_due(&mut self, now: u64) -> Option<Wakeup> {
        let (&(deadline, seq), _) = self.entries.iter().next()?;
        if deadline > now {
            return None;
        }
        self.deadlines.remove(&seq);
        self.entries.remove(&(deadline, seq))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.deadlines.clear();
    }
}
