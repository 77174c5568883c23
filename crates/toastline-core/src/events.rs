use serde::{Deserialize, Serialize};

use crate::toast::{PauseReason, Position, ToastId, ToastKind};

/// Why a record left its slot for good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// Countdown reached zero.
    Expired,
    /// Programmatic `dismiss(id)`.
    Manual,
    /// Click or swipe on a dismissible toast.
    User,
    /// Came up for revival with no budget left.
    Exhausted,
}

/// Every state change in the engine produces an Event.
/// The host drains them after each operation; `at` is engine clock ms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToastEvent {
    Created {
        id: ToastId,
        position: Position,
        kind: ToastKind,
        duration: u64,
        at: u64,
    },
    /// Same variant requested again while visible.
    Merged {
        id: ToastId,
        update_count: u32,
        duration: u64,
        at: u64,
    },
    Updated {
        id: ToastId,
        at: u64,
    },
    /// Displaced from its slot by a newer toast.
    Suspended {
        id: ToastId,
        by: ToastId,
        remaining: u64,
        at: u64,
    },
    /// Brought back after the displacing toast went away.
    Revived {
        id: ToastId,
        remaining: u64,
        at: u64,
    },
    Paused {
        id: ToastId,
        reason: PauseReason,
        remaining: u64,
        at: u64,
    },
    Resumed {
        id: ToastId,
        remaining: u64,
        at: u64,
    },
    Dismissed {
        id: ToastId,
        reason: DismissReason,
        at: u64,
    },
    Cleared {
        count: usize,
        at: u64,
    },
    /// Record physically dropped after the grace delay.
    Deleted {
        id: ToastId,
        at: u64,
    },
    StaleTimerIgnored {
        id: ToastId,
        at: u64,
    },
    DocumentVisibility {
        visible: bool,
        at: u64,
    },
}

impl ToastEvent {
    pub fn at(&self) -> u64 {
        match self {
            ToastEvent::Created { at, .. }
            | ToastEvent::Merged { at, .. }
            | ToastEvent::Updated { at, .. }
            | ToastEvent::Suspended { at, .. }
            | ToastEvent::Revived { at, .. }
            | ToastEvent::Paused { at, .. }
            | ToastEvent::Resumed { at, .. }
            | ToastEvent::Dismissed { at, .. }
            | ToastEvent::Cleared { at, .. }
            | ToastEvent::Deleted { at, .. }
            | ToastEvent::StaleTimerIgnored { at, .. }
            | ToastEvent::DocumentVisibility { at, .. } => *at,
        }
    }

    pub fn toast_id(&self) -> Option<ToastId> {
        match self {
            ToastEvent::Created { id, .. }
            | ToastEvent::Merged { id, .. }
            | ToastEvent::Updated { id, .. }
            | ToastEvent::Suspended { id, .. }
            | ToastEvent::Revived { id, .. }
            | ToastEvent::Paused { id, .. }
            | ToastEvent::Resumed { id, .. }
            | ToastEvent::Dismissed { id, .. }
            | ToastEvent::Deleted { id, .. }
            | ToastEvent::StaleTimerIgnored { id, .. } => Some(*id),
            ToastEvent::Cleared { .. } | ToastEvent::DocumentVisibility { .. } => None,
        }
    }
}
