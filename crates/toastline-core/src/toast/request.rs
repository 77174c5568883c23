//! Caller-facing request and patch types.

use serde::{Deserialize, Serialize};

use super::record::{Callback, Position, ToastId, ToastKind};

/// Input to `ToastEngine::request`.
///
/// Only `kind` is always present. Everything else falls back to the engine
/// configuration when absent.
#[derive(Debug, Default)]
pub struct ToastRequest {
    pub message: Option<String>,
    pub kind: ToastKind,
    pub position: Option<Position>,
    /// Auto-dismiss delay in ms; `Some(0)` means sticky.
    pub duration: Option<u64>,
    /// Explicit dedup key, overrides the derived one.
    pub variant_id: Option<String>,
    pub dismissible: Option<bool>,
    pub on_dismiss: Option<Callback>,
    pub on_auto_close: Option<Callback>,
}

impl ToastRequest {
    pub fn new(kind: ToastKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Warning, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Info, message)
    }

    pub fn loading(message: impl Into<String>) -> Self {
        Self::new(ToastKind::Loading, message)
    }

    /// A toast whose body is rendered externally; it has no message.
    pub fn custom(variant_id: impl Into<String>) -> Self {
        Self {
            kind: ToastKind::Custom,
            variant_id: Some(variant_id.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn at(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    #[must_use]
    pub fn duration(mut self, ms: u64) -> Self {
        self.duration = Some(ms);
        self
    }

    #[must_use]
    pub fn sticky(self) -> Self {
        self.duration(0)
    }

    #[must_use]
    pub fn variant(mut self, key: impl Into<String>) -> Self {
        self.variant_id = Some(key.into());
        self
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = Some(dismissible);
        self
    }

    #[must_use]
    pub fn on_dismiss(mut self, f: impl FnOnce(ToastId) + Send + 'static) -> Self {
        self.on_dismiss = Some(Callback::new(f));
        self
    }

    #[must_use]
    pub fn on_auto_close(mut self, f: impl FnOnce(ToastId) + Send + 'static) -> Self {
        self.on_auto_close = Some(Callback::new(f));
        self
    }

    /// Dedup identity: the explicit variant id, else `message-kind-position`.
    pub fn variant_key(&self, position: Position) -> String {
        match &self.variant_id {
            Some(key) => key.clone(),
            None => derive_variant_key(self.message.as_deref().unwrap_or_default(), self.kind, position),
        }
    }
}

pub fn derive_variant_key(message: &str, kind: ToastKind, position: Position) -> String {
    format!("{message}-{kind}-{position}")
}

/// In-place change to a live record, addressed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastPatch {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub kind: Option<ToastKind>,
    /// New budget; restarts the countdown.
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub dismissible: Option<bool>,
}

impl ToastPatch {
    pub fn is_empty(&self) -> bool {
        self.message.is_none()
            && self.kind.is_none()
            && self.duration.is_none()
            && self.dismissible.is_none()
    }
}
