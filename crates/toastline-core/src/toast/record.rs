//! Toast record and the small closed sets it is built from.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Identifier assigned by the engine when a record is created.
///
/// Sequential per engine and displayed as `t1`, `t2`, ...
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}", self.0)
    }
}

impl FromStr for ToastId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix('t')
            .and_then(|n| n.parse::<u64>().ok())
            .map(ToastId)
            .ok_or_else(|| ValidationError::UnknownVariant {
                kind: "toast id",
                value: s.to_string(),
            })
    }
}

impl Serialize for ToastId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ToastId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Screen slot. Each position has its own single active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Top,
    #[default]
    Bottom,
}

impl Position {
    pub const ALL: [Position; 2] = [Position::Top, Position::Bottom];

    pub fn as_str(self) -> &'static str {
        match self {
            Position::Top => "top",
            Position::Bottom => "bottom",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            other => Err(ValidationError::UnknownVariant {
                kind: "position",
                value: other.to_string(),
            }),
        }
    }
}

/// Presentational kind of a toast.
///
/// Only `Loading` affects scheduling: it never auto-dismisses unless the
/// caller gives an explicit duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    #[default]
    Success,
    Error,
    Warning,
    Info,
    Loading,
    Custom,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastKind::Success => "success",
            ToastKind::Error => "error",
            ToastKind::Warning => "warning",
            ToastKind::Info => "info",
            ToastKind::Loading => "loading",
            ToastKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ToastKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(ToastKind::Success),
            "error" => Ok(ToastKind::Error),
            "warning" => Ok(ToastKind::Warning),
            "info" => Ok(ToastKind::Info),
            "loading" => Ok(ToastKind::Loading),
            "custom" => Ok(ToastKind::Custom),
            other => Err(ValidationError::UnknownVariant {
                kind: "toast kind",
                value: other.to_string(),
            }),
        }
    }
}

/// Why a record's countdown is frozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PauseReason {
    /// Pointer hover or press on the toast.
    Interaction,
    /// The document went to the background.
    Background,
}

/// Set of active pause reasons. The countdown only runs while it is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PauseReasons {
    interaction: bool,
    background: bool,
}

impl PauseReasons {
    fn slot(&mut self, reason: PauseReason) -> &mut bool {
        match reason {
            PauseReason::Interaction => &mut self.interaction,
            PauseReason::Background => &mut self.background,
        }
    }

    /// Returns `true` if the reason was not already present.
    pub fn insert(&mut self, reason: PauseReason) -> bool {
        !std::mem::replace(self.slot(reason), true)
    }

    /// Returns `true` if the reason was present.
    pub fn remove(&mut self, reason: PauseReason) -> bool {
        std::mem::replace(self.slot(reason), false)
    }

    pub fn contains(&self, reason: PauseReason) -> bool {
        match reason {
            PauseReason::Interaction => self.interaction,
            PauseReason::Background => self.background,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.interaction && !self.background
    }
}

/// Caller-supplied callback, invoked at most once.
pub struct Callback(Box<dyn FnOnce(ToastId) + Send + 'static>);

impl Callback {
    pub fn new(f: impl FnOnce(ToastId) + Send + 'static) -> Self {
        Self(Box::new(f))
    }

    pub(crate) fn call(self, id: ToastId) {
        (self.0)(id)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// The unit of scheduling.
///
/// Timing fields are only mutated by the engine's pause, resume, dismiss and
/// merge paths. `timer_started_at` and `paused_at` are never both `Some`.
#[derive(Debug)]
pub struct Toast {
    pub(crate) id: ToastId,
    pub(crate) variant_key: String,
    pub(crate) position: Position,
    pub(crate) kind: ToastKind,
    pub(crate) message: Option<String>,
    pub(crate) created_at: u64,
    /// 0 means sticky.
    pub(crate) configured_duration: u64,
    /// Budget left as of the start of the current running interval.
    pub(crate) remaining: u64,
    pub(crate) timer_started_at: Option<u64>,
    pub(crate) paused_at: Option<u64>,
    pub(crate) pause_reasons: PauseReasons,
    pub(crate) visible: bool,
    pub(crate) removed: bool,
    pub(crate) update_count: u32,
    pub(crate) dismissible: bool,
    pub(crate) on_dismiss: Option<Callback>,
    pub(crate) on_auto_close: Option<Callback>,
}

impl Toast {
    pub fn id(&self) -> ToastId {
        self.id
    }

    pub fn variant_key(&self) -> &str {
        &self.variant_key
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn kind(&self) -> ToastKind {
        self.kind
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn created_at(&self) -> u64 {
        self.created_at
    }

    pub fn configured_duration(&self) -> u64 {
        self.configured_duration
    }

    pub fn timer_started_at(&self) -> Option<u64> {
        self.timer_started_at
    }

    pub fn paused_at(&self) -> Option<u64> {
        self.paused_at
    }

    pub fn pause_reasons(&self) -> PauseReasons {
        self.pause_reasons
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn update_count(&self) -> u32 {
        self.update_count
    }

    pub fn is_dismissible(&self) -> bool {
        self.dismissible
    }

    /// Visible and not yet dismissed.
    pub fn is_active(&self) -> bool {
        self.visible && !self.removed
    }

    /// Displaced by a newer toast and waiting to come back.
    pub fn is_suspended(&self) -> bool {
        !self.visible && !self.removed
    }

    pub fn is_timed(&self) -> bool {
        self.configured_duration > 0
    }

    /// Remaining budget at `now`, counting the running interval if any.
    pub fn remaining_at(&self, now: u64) -> u64 {
        match self.timer_started_at {
            Some(started) => self.remaining.saturating_sub(now.saturating_sub(started)),
            None => self.remaining,
        }
    }

    /// Absolute expiry time of the running interval.
    pub fn deadline(&self) -> Option<u64> {
        self.timer_started_at
            .map(|started| started.saturating_add(self.remaining))
    }

    pub fn view(&self, now: u64) -> ToastView {
        ToastView {
            id: self.id,
            variant_key: self.variant_key.clone(),
            position: self.position,
            kind: self.kind,
            message: self.message.clone(),
            created_at: self.created_at,
            configured_duration: self.configured_duration,
            remaining: self.remaining_at(now),
            visible: self.visible,
            removed: self.removed,
            paused: self.paused_at.is_some(),
            update_count: self.update_count,
            dismissible: self.dismissible,
        }
    }
}

/// Read-only copy of a record handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastView {
    pub id: ToastId,
    pub variant_key: String,
    pub position: Position,
    pub kind: ToastKind,
    pub message: Option<String>,
    pub created_at: u64,
    pub configured_duration: u64,
    pub remaining: u64,
    pub visible: bool,
    pub removed: bool,
    pub paused: bool,
    pub update_count: u32,
    pub dismissible: bool,
}

impl ToastView {
    /// Message with the repeat suffix, e.g. `Saved (3x)`.
    pub fn label(&self) -> String {
        let message = self.message.as_deref().unwrap_or_default();
        if self.update_count == 0 {
            message.to_string()
        } else {
            format!("{message} ({}x)", self.update_count + 1)
        }
    }

    /// Opaque and interactive in the rendering layer.
    pub fn is_interactive(&self) -> bool {
        self.visible && !self.removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_id_display_and_parse() {
        let id = ToastId::new(7);
        assert_eq!(id.to_string(), "t7");
        assert_eq!("t7".parse::<ToastId>().unwrap(), id);
        assert!("7".parse::<ToastId>().is_err());
        assert!("tx".parse::<ToastId>().is_err());
    }

    #[test]
    fn toast_id_serializes_as_string() {
        let json = serde_json::to_string(&ToastId::new(3)).unwrap();
        assert_eq!(json, "\"t3\"");
        let back: ToastId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ToastId::new(3));
    }

    #[test]
    fn position_defaults_to_bottom() {
        assert_eq!(Position::default(), Position::Bottom);
        assert_eq!("top".parse::<Position>().unwrap(), Position::Top);
        assert!("middle".parse::<Position>().is_err());
    }

    #[test]
    fn pause_reasons_compose() {
        let mut reasons = PauseReasons::default();
        assert!(reasons.is_empty());
        assert!(reasons.insert(PauseReason::Interaction));
        assert!(!reasons.insert(PauseReason::Interaction));
        assert!(reasons.insert(PauseReason::Background));
        assert!(reasons.remove(PauseReason::Interaction));
        assert!(!reasons.is_empty());
        assert!(reasons.contains(PauseReason::Background));
        assert!(reasons.remove(PauseReason::Background));
        assert!(!reasons.remove(PauseReason::Background));
        assert!(reasons.is_empty());
    }

    #[test]
    fn label_adds_repeat_suffix() {
        let mut view = ToastView {
            id: ToastId::new(1),
            variant_key: "k".into(),
            position: Position::Top,
            kind: ToastKind::Success,
            message: Some("Saved".into()),
            created_at: 0,
            configured_duration: 1000,
            remaining: 1000,
            visible: true,
            removed: false,
            paused: false,
            update_count: 0,
            dismissible: true,
        };
        assert_eq!(view.label(), "Saved");
        view.update_count = 2;
        assert_eq!(view.label(), "Saved (3x)");
    }
}
