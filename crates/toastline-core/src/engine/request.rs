//! Request handling: dedup merge, record creation and in-place updates.

use super::ToastEngine;
use crate::events::ToastEvent;
use crate::timer::Clock;
use crate::toast::{PauseReason, PauseReasons, Position, Toast, ToastId, ToastPatch, ToastRequest};

impl<C: Clock> ToastEngine<C> {
    /// Enqueues a toast, or merges it into the visible record of the same
    /// variant at the same position. Returns the id of the record that now
    /// carries the request.
    pub fn request(&mut self, input: ToastRequest) -> ToastId {
        let now = self.now();
        let position = input
            .position
            .unwrap_or(self.config.slots.default_position);
        let key = input.variant_key(position);
        let duration = input
            .duration
            .unwrap_or_else(|| self.config.duration_for(input.kind));

        if let Some(id) = self.find_active_variant(&key, position) {
            self.merge(id, input, duration, now);
            return id;
        }

        let id = self.allocate_id();
        self.suspend_occupant(position, id, now);

        let mut pause_reasons = PauseReasons::default();
        let born_paused = duration > 0 && self.hidden_pauses();
        if born_paused {
            pause_reasons.insert(PauseReason::Background);
        }
        let toast = Toast {
            id,
            variant_key: key,
            position,
            kind: input.kind,
            message: input.message,
            created_at: now,
            configured_duration: duration,
            remaining: duration,
            timer_started_at: None,
            paused_at: born_paused.then_some(now),
            pause_reasons,
            visible: true,
            removed: false,
            update_count: 0,
            dismissible: input.dismissible.unwrap_or(true),
            on_dismiss: input.on_dismiss,
            on_auto_close: input.on_auto_close,
        };
        tracing::debug!(toast = %id, %position, kind = %toast.kind, duration, "toast created");
        self.records.insert(id, toast);
        self.emit(ToastEvent::Created {
            id,
            position,
            kind: input.kind,
            duration,
            at: now,
        });
        self.start_timer(id, now);
        id
    }

    /// Changes a live record in place. A new duration, or a kind change
    /// without one, restarts the countdown with the new budget.
    ///
    /// Returns `false` for unknown or already removed ids.
    pub fn update(&mut self, id: ToastId, patch: ToastPatch) -> bool {
        let now = self.now();
        let Some(toast) = self.records.get_mut(&id) else {
            return false;
        };
        if toast.removed {
            return false;
        }

        let kind_changed = patch.kind.is_some_and(|kind| kind != toast.kind);
        if let Some(message) = patch.message {
            toast.message = Some(message);
        }
        if let Some(kind) = patch.kind {
            toast.kind = kind;
        }
        if let Some(dismissible) = patch.dismissible {
            toast.dismissible = dismissible;
        }
        let budget = patch
            .duration
            .or_else(|| kind_changed.then(|| self.config.duration_for(toast.kind)));

        self.emit(ToastEvent::Updated { id, at: now });
        if let Some(budget) = budget {
            self.restart_countdown(id, budget, now);
        }
        true
    }

    fn find_active_variant(&self, key: &str, position: Position) -> Option<ToastId> {
        self.records
            .values()
            .find(|t| t.position == position && t.is_active() && t.variant_key == key)
            .map(|t| t.id)
    }

    fn merge(&mut self, id: ToastId, input: ToastRequest, duration: u64, now: u64) {
        let Some(toast) = self.records.get_mut(&id) else {
            return;
        };
        if input.message.is_some() {
            toast.message = input.message;
        }
        toast.kind = input.kind;
        if let Some(dismissible) = input.dismissible {
            toast.dismissible = dismissible;
        }
        if input.on_dismiss.is_some() {
            toast.on_dismiss = input.on_dismiss;
        }
        if input.on_auto_close.is_some() {
            toast.on_auto_close = input.on_auto_close;
        }
        toast.update_count += 1;
        let update_count = toast.update_count;

        tracing::debug!(toast = %id, update_count, "toast merged");
        self.emit(ToastEvent::Merged {
            id,
            update_count,
            duration,
            at: now,
        });
        self.restart_countdown(id, duration, now);
    }
}
