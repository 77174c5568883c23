mod record;
mod request;

pub use record::{
    Callback, PauseReason, PauseReasons, Position, Toast, ToastId, ToastKind, ToastView,
};
pub use request::{derive_variant_key, ToastPatch, ToastRequest};
