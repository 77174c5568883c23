//! Countdowns: arming, freezing, pause reasons and expiry.
//!
//! A record's countdown runs only while it is visible, not removed, timed,
//! and has no pause reason. `remaining` holds the budget as of
//! `timer_started_at`; freezing folds the elapsed interval into it.

use super::{invoke_guarded, ToastEngine};
use crate::events::{DismissReason, ToastEvent};
use crate::timer::{Clock, TimerToken, Wakeup};
use crate::toast::{PauseReason, ToastId};

impl<C: Clock> ToastEngine<C> {
    /// Interaction pause (pointer hover or press). Idempotent.
    ///
    /// Returns `true` if the interaction reason was newly added.
    pub fn pause(&mut self, id: ToastId) -> bool {
        if !self.config.behaviour.pause_on_hover {
            return false;
        }
        self.add_pause_reason(id, PauseReason::Interaction)
    }

    /// Ends an interaction pause. Idempotent. The countdown only continues
    /// if no other reason, such as a hidden document, still holds it.
    pub fn resume(&mut self, id: ToastId) -> bool {
        self.remove_pause_reason(id, PauseReason::Interaction)
    }

    /// Document visibility signal. Going to the background freezes every
    /// visible timed toast; coming back releases the background reason.
    pub fn set_document_visible(&mut self, visible: bool) {
        if self.document_visible == visible {
            return;
        }
        let now = self.now();
        self.document_visible = visible;
        tracing::debug!(visible, "document visibility changed");
        self.emit(ToastEvent::DocumentVisibility { visible, at: now });
        if !self.config.behaviour.pause_while_hidden {
            return;
        }

        if visible {
            let held: Vec<ToastId> = self
                .records
                .values()
                .filter(|t| t.pause_reasons.contains(PauseReason::Background))
                .map(|t| t.id)
                .collect();
            for id in held {
                self.remove_pause_reason(id, PauseReason::Background);
            }
        } else {
            let running: Vec<ToastId> = self
                .records
                .values()
                .filter(|t| t.is_active() && t.is_timed())
                .map(|t| t.id)
                .collect();
            for id in running {
                self.add_pause_reason(id, PauseReason::Background);
            }
        }
    }

    fn add_pause_reason(&mut self, id: ToastId, reason: PauseReason) -> bool {
        let now = self.now();
        let Some(toast) = self.records.get(&id) else {
            return false;
        };
        if !toast.is_active() || toast.pause_reasons.contains(reason) {
            return false;
        }
        let first = toast.pause_reasons.is_empty();
        if first {
            self.pause_timer(id, now);
        }
        let Some(toast) = self.records.get_mut(&id) else {
            return false;
        };
        toast.pause_reasons.insert(reason);
        if first {
            toast.paused_at = Some(now);
        }
        let remaining = toast.remaining;

        tracing::debug!(toast = %id, ?reason, remaining, "toast paused");
        self.emit(ToastEvent::Paused {
            id,
            reason,
            remaining,
            at: now,
        });
        true
    }

    fn remove_pause_reason(&mut self, id: ToastId, reason: PauseReason) -> bool {
        let now = self.now();
        let Some(toast) = self.records.get_mut(&id) else {
            return false;
        };
        if !toast.pause_reasons.remove(reason) {
            return false;
        }
        if toast.pause_reasons.is_empty() && toast.is_active() {
            let remaining = toast.remaining;
            tracing::debug!(toast = %id, remaining, "toast resumed");
            self.emit(ToastEvent::Resumed {
                id,
                remaining,
                at: now,
            });
            self.resume_timer(id, now);
        }
        true
    }

    /// Arms the expiry wakeup for the record's remaining budget.
    ///
    /// No-op for sticky records and for records that are hidden, removed or
    /// held by a pause reason. A timed record with nothing left expires on
    /// the next run.
    pub(super) fn start_timer(&mut self, id: ToastId, now: u64) {
        let Some(toast) = self.records.get_mut(&id) else {
            return;
        };
        if !toast.is_active() || !toast.pause_reasons.is_empty() || !toast.is_timed() {
            return;
        }
        toast.timer_started_at = Some(now);
        toast.paused_at = None;
        let token = TimerToken {
            id,
            started_at: now,
            update_count: toast.update_count,
            deadline: now.saturating_add(toast.remaining),
        };
        let handle = self
            .queue
            .after(now, toast.remaining, Wakeup::Expire(token));
        if let Some(previous) = self.expiry.insert(id, handle) {
            self.queue.cancel(previous);
        }
    }

    /// Cancels the wakeup and folds the elapsed running time into `remaining`.
    pub(super) fn pause_timer(&mut self, id: ToastId, now: u64) {
        self.clear_timer(id);
        if let Some(toast) = self.records.get_mut(&id) {
            if let Some(started) = toast.timer_started_at.take() {
                toast.remaining = toast
                    .remaining
                    .saturating_sub(now.saturating_sub(started));
            }
        }
    }

    /// Continues from the frozen budget with a fresh start time.
    pub(super) fn resume_timer(&mut self, id: ToastId, now: u64) {
        if let Some(toast) = self.records.get_mut(&id) {
            toast.paused_at = None;
        }
        self.start_timer(id, now);
    }

    /// Unconditional, idempotent cancel of the expiry wakeup.
    pub(super) fn clear_timer(&mut self, id: ToastId) {
        if let Some(handle) = self.expiry.remove(&id) {
            self.queue.cancel(handle);
        }
    }

    /// Replaces the budget and starts counting it down from `now`, subject to
    /// the usual visibility and pause conditions.
    pub(super) fn restart_countdown(&mut self, id: ToastId, budget: u64, now: u64) {
        self.clear_timer(id);
        let hidden = self.hidden_pauses();
        let Some(toast) = self.records.get_mut(&id) else {
            return;
        };
        toast.configured_duration = budget;
        toast.remaining = budget;
        toast.timer_started_at = None;
        if hidden && budget > 0 && toast.is_active() && toast.pause_reasons.is_empty() {
            toast.pause_reasons.insert(PauseReason::Background);
            toast.paused_at = Some(now);
        }
        self.start_timer(id, now);
    }

    /// Expiry wakeup. Acts only if the token still describes the record's
    /// running interval; anything else means a merge, pause or removal
    /// happened after arming.
    pub(super) fn expire(&mut self, token: TimerToken, now: u64) {
        let id = token.id;
        let current = self.records.get(&id).is_some_and(|t| {
            t.is_active()
                && t.timer_started_at == Some(token.started_at)
                && t.update_count == token.update_count
                && t.deadline() == Some(token.deadline)
        });
        if !current {
            tracing::debug!(toast = %id, "ignoring stale expiry");
            self.emit(ToastEvent::StaleTimerIgnored { id, at: now });
            return;
        }

        self.expiry.remove(&id);
        let on_auto_close = self.records.get_mut(&id).and_then(|toast| {
            toast.remaining = 0;
            toast.timer_started_at = None;
            toast.on_auto_close.take()
        });
        invoke_guarded(on_auto_close, id, "on_auto_close");
        self.dismiss_with(id, DismissReason::Expired);
    }
}
