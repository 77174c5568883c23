//! Toast scheduling engine.
//!
//! The engine is a synchronous state machine over an ordered record store.
//! It does not spawn threads or sleep: expiry and deletion are wakeups in an
//! internal [`TimerQueue`], and the host calls [`ToastEngine::run_due`]
//! whenever [`ToastEngine::next_deadline`] has passed.
//!
//! ## Record lifecycle
//!
//! ```text
//! request -> visible <-> suspended
//!               |            |
//!               +-> removed <+ -> (grace delay) -> deleted
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = ToastEngine::new(Config::default());
//! let id = engine.request(ToastRequest::success("Saved").at(Position::Top));
//! // In the host loop:
//! engine.run_due();
//! for event in engine.drain_events() { /* ... */ }
//! ```

mod request;
mod slots;
mod timing;


use std::collections::HashMap;
use std::panic::AssertUnwindSafe;

use indexmap::IndexMap;

use crate::events::ToastEvent;
use crate::storage::Config;
use crate::timer::{Clock, ManualClock, MonotonicClock, TimerHandle, TimerQueue, TimerToken, Wakeup};
use crate::toast::{Callback, Position, Toast, ToastId, ToastView};

/// Owns every toast record and every pending wakeup.
pub struct ToastEngine<C: Clock = MonotonicClock> {
    clock: C,
    config: Config,
    /// Insertion order is creation order.
    records: IndexMap<ToastId, Toast>,
    expiry: HashMap<ToastId, TimerHandle>,
    deletions: HashMap<ToastId, TimerHandle>,
    queue: TimerQueue,
    next_id: u64,
    document_visible: bool,
    events: Vec<ToastEvent>,
}

impl ToastEngine<MonotonicClock> {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> ToastEngine<C> {
    pub fn with_clock(config: Config, clock: C) -> Self {
        Self {
            clock,
            config,
            records: IndexMap::new(),
            expiry: HashMap::new(),
            deletions: HashMap::new(),
            queue: TimerQueue::new(),
            next_id: 1,
            document_visible: true,
            events: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get(&self, id: ToastId) -> Option<&Toast> {
        self.records.get(&id)
    }

    /// Number of records not yet physically deleted.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_document_visible(&self) -> bool {
        self.document_visible
    }

    /// The record occupying the active slot at `position`.
    pub fn active(&self, position: Position) -> Option<&Toast> {
        self.records
            .values()
            .find(|t| t.position == position && t.is_active())
    }

    /// Non-deleted records at `position`, oldest-created first.
    pub fn snapshot(&self, position: Position) -> Vec<ToastView> {
        let now = self.now();
        self.records
            .values()
            .filter(|t| t.position == position)
            .map(|t| t.view(now))
            .collect()
    }

    /// Non-deleted records at every position, oldest-created first.
    pub fn snapshot_all(&self) -> Vec<ToastView> {
        let now = self.now();
        self.records.values().map(|t| t.view(now)).collect()
    }

    /// Token the pending expiry wakeup of `id` was armed with.
    pub fn timer_token(&self, id: ToastId) -> Option<TimerToken> {
        let toast = self.records.get(&id)?;
        Some(TimerToken {
            id,
            started_at: toast.timer_started_at?,
            update_count: toast.update_count,
            deadline: toast.deadline()?,
        })
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.queue.next_deadline()
    }

    pub fn pending_wakeups(&self) -> usize {
        self.queue.len()
    }

    /// Hands buffered events to the host.
    pub fn drain_events(&mut self) -> Vec<ToastEvent> {
        std::mem::take(&mut self.events)
    }

    // ── Driving ──────────────────────────────────────────────────────

    /// Fires every wakeup due at the current clock time.
    ///
    /// Returns the number of wakeups processed, stale ones included.
    pub fn run_due(&mut self) -> usize {
        let mut fired = 0;
        loop {
            let now = self.now();
            match self.queue.pop_due(now) {
                Some(wakeup) => {
                    self.handle_wakeup(wakeup);
                    fired += 1;
                }
                None => break,
            }
        }
        fired
    }

    /// Delivers one wakeup. Safe to call with an outdated wakeup: expiry
    /// tokens are validated against the record and deletions against its
    /// removal state.
    pub fn handle_wakeup(&mut self, wakeup: Wakeup) {
        let now = self.now();
        match wakeup {
            Wakeup::Expire(token) => self.expire(token, now),
            Wakeup::Delete { id, resume_next } => self.delete(id, resume_next, now),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn allocate_id(&mut self) -> ToastId {
        let id = ToastId::new(self.next_id);
        self.next_id += 1;
        id
    }

    fn emit(&mut self, event: ToastEvent) {
        self.events.push(event);
    }

    /// Whether a backgrounded document freezes countdowns right now.
    fn hidden_pauses(&self) -> bool {
        !self.document_visible && self.config.behaviour.pause_while_hidden
    }
}

impl ToastEngine<ManualClock> {
    /// Moves the manual clock to `target`, stopping at every intermediate
    /// deadline so wakeups observe the time they were due at.
    pub fn advance_to(&mut self, target: u64) -> usize {
        let mut fired = 0;
        while let Some(deadline) = self.queue.next_deadline() {
            if deadline > target {
                break;
            }
            self.clock.set(deadline);
            fired += self.run_due();
        }
        self.clock.set(target);
        fired + self.run_due()
    }

    pub fn advance_by(&mut self, ms: u64) -> usize {
        let target = self.now().saturating_add(ms);
        self.advance_to(target)
    }
}

/// Runs a caller callback without letting a panic escape into the engine.
fn invoke_guarded(callback: Option<Callback>, id: ToastId, what: &'static str) {
    let Some(callback) = callback else {
        return;
    };
    if std::panic::catch_unwind(AssertUnwindSafe(|| callback.call(id))).is_err() {
        tracing::warn!(toast = %id, callback = what, "toast callback panicked");
    }
}
