//! Slot allocation, dismissal and the suspend/revive chain.
//!
//! Each position has one active slot. A newer toast of a different variant
//! displaces the occupant into the suspended state; when the active record
//! is deleted after its grace delay, the most recently created suspended
//! record at that position comes back.

use super::{invoke_guarded, ToastEngine};
use crate::events::{DismissReason, ToastEvent};
use crate::timer::{Clock, Wakeup};
use crate::toast::{PauseReason, PauseReasons, Position, ToastId};

impl<C: Clock> ToastEngine<C> {
    /// Removes a toast regardless of `dismissible`.
    ///
    /// Unknown ids and records already being removed are a no-op returning
    /// `false`.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        self.dismiss_with(id, DismissReason::Manual)
    }

    /// Click or swipe. Refused for non-dismissible toasts.
    pub fn dismiss_by_user(&mut self, id: ToastId) -> bool {
        match self.records.get(&id) {
            Some(toast) if toast.dismissible => self.dismiss_with(id, DismissReason::User),
            _ => false,
        }
    }

    /// Marks every record removed and cancels every countdown. Suspended
    /// records are removed too, so nothing comes back afterwards.
    ///
    /// Callbacks are not invoked. Returns the number of records cleared.
    pub fn clear_all(&mut self) -> usize {
        let now = self.now();
        let grace = self.config.timing.grace_delay_ms;
        let ids: Vec<ToastId> = self
            .records
            .values()
            .filter(|t| !t.removed)
            .map(|t| t.id)
            .collect();

        for &id in &ids {
            self.pause_timer(id, now);
            if let Some(toast) = self.records.get_mut(&id) {
                toast.visible = false;
                toast.removed = true;
                toast.paused_at = None;
                toast.pause_reasons = PauseReasons::default();
                toast.on_dismiss = None;
                toast.on_auto_close = None;
            }
            self.schedule_deletion(id, grace, false, now);
        }

        // Records already in their grace period must not revive anything either.
        let pending: Vec<ToastId> = self
            .deletions
            .keys()
            .copied()
            .filter(|id| !ids.contains(id))
            .collect();
        for id in pending {
            if let Some(handle) = self.deletions.remove(&id) {
                self.queue.cancel(handle);
            }
            self.schedule_deletion(id, grace, false, now);
        }

        tracing::debug!(count = ids.len(), "toasts cleared");
        self.emit(ToastEvent::Cleared {
            count: ids.len(),
            at: now,
        });
        ids.len()
    }

    /// Standard dismissal: cancel the countdown, mark removed, schedule the
    /// physical deletion after the grace delay.
    pub(super) fn dismiss_with(&mut self, id: ToastId, reason: DismissReason) -> bool {
        let now = self.now();
        self.pause_timer(id, now);
        let Some(toast) = self.records.get_mut(&id) else {
            return false;
        };
        if toast.removed {
            return false;
        }
        toast.visible = false;
        toast.removed = true;
        toast.paused_at = None;
        toast.pause_reasons = PauseReasons::default();
        toast.on_auto_close = None;
        let on_dismiss = toast.on_dismiss.take();

        tracing::debug!(toast = %id, ?reason, "toast dismissed");
        self.emit(ToastEvent::Dismissed { id, reason, at: now });
        let grace = self.config.timing.grace_delay_ms;
        self.schedule_deletion(id, grace, true, now);

        // Expiry already ran the auto-close callback, and an exhausted record
        // was never dismissed by a caller.
        if !matches!(reason, DismissReason::Expired | DismissReason::Exhausted) {
            invoke_guarded(on_dismiss, id, "on_dismiss");
        }
        true
    }

    /// Grace delay elapsed: drop the record, then offer the slot to the
    /// most recent suspended record at the same position.
    pub(super) fn delete(&mut self, id: ToastId, resume_next: bool, now: u64) {
        self.deletions.remove(&id);
        let position = match self.records.get(&id) {
            Some(toast) if toast.removed => toast.position,
            _ => return,
        };
        self.records.shift_remove(&id);
        self.pause_timer(id, now);
        tracing::debug!(toast = %id, "toast deleted");
        self.emit(ToastEvent::Deleted { id, at: now });

        if resume_next {
            self.revive_next(position, now);
        }
    }

    /// Suspends whatever holds the active slot at `position`.
    pub(super) fn suspend_occupant(&mut self, position: Position, by: ToastId, now: u64) {
        let Some(id) = self.active(position).map(|t| t.id) else {
            return;
        };
        self.pause_timer(id, now);
        let Some(toast) = self.records.get_mut(&id) else {
            return;
        };
        toast.visible = false;
        toast.pause_reasons = PauseReasons::default();
        toast.paused_at = Some(now);
        let remaining = toast.remaining;

        tracing::debug!(toast = %id, by = %by, remaining, "toast suspended");
        self.emit(ToastEvent::Suspended {
            id,
            by,
            remaining,
            at: now,
        });
    }

    /// Latest-created suspended record at `position`; ties go to the higher id.
    fn revival_candidate(&self, position: Position) -> Option<ToastId> {
        self.records
            .values()
            .filter(|t| t.position == position && t.is_suspended())
            .max_by_key(|t| (t.created_at, t.id))
            .map(|t| t.id)
    }

    /// A candidate with no budget left is retired as `Exhausted` instead:
    /// removed and deleted after the grace delay without running
    /// `on_dismiss`, after which the next candidate gets its turn.
    fn revive_next(&mut self, position: Position, now: u64) {
        if self.active(position).is_some() {
            return;
        }
        let Some(id) = self.revival_candidate(position) else {
            return;
        };
        let hidden = self.hidden_pauses();
        let Some(toast) = self.records.get_mut(&id) else {
            return;
        };
        if toast.remaining == 0 {
            // Nothing left to show for: a sticky record or an exhausted budget.
            self.dismiss_with(id, DismissReason::Exhausted);
            return;
        }

        toast.visible = true;
        toast.paused_at = None;
        if hidden {
            toast.pause_reasons.insert(PauseReason::Background);
            toast.paused_at = Some(now);
        }
        let remaining = toast.remaining;

        tracing::debug!(toast = %id, remaining, "toast revived");
        self.emit(ToastEvent::Revived {
            id,
            remaining,
            at: now,
        });
        self.start_timer(id, now);
    }

    fn schedule_deletion(&mut self, id: ToastId, grace: u64, resume_next: bool, now: u64) {
        let handle = self.queue.after(now, grace, Wakeup::Delete { id, resume_next });
        if let Some(previous) = self.deletions.insert(id, handle) {
            self.queue.cancel(previous);
        }
    }
}
