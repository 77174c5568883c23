//! # Toastline Core Library
//!
//! This library provides the scheduling logic behind Toastline toast
//! notifications: which toast is on screen at each position, how long it
//! stays there, and what comes back when it leaves.
//!
//! ## Architecture
//!
//! - **Engine**: A synchronous state machine over an ordered record store.
//!   The host drives it by calling `run_due()` once the next wakeup deadline
//!   has passed
//! - **Timer**: Clock abstraction and the wakeup queue behind every countdown
//! - **Service**: A tokio task hosting the engine behind a cloneable handle
//! - **Storage**: TOML-based configuration
//! - **Scenario**: Scripted replay of toast traffic on a manual clock
//!
//! ## Key Components
//!
//! - [`ToastEngine`]: Record store, slot allocation, merge and countdowns
//! - [`ToastService`] / [`ToastHandle`]: Async host for the engine
//! - [`Config`]: Application configuration management
//! - [`ToastEvent`]: Lifecycle events emitted by the engine

pub mod engine;
pub mod error;
pub mod events;
pub mod scenario;
pub mod service;
pub mod storage;
pub mod timer;
pub mod toast;

pub use engine::ToastEngine;
pub use error::{ConfigError, CoreError, ScenarioError, ValidationError};
pub use events::{DismissReason, ToastEvent};
pub use scenario::{Scenario, ScenarioReport, Step, StepAction, StepOutcome};
pub use service::{ToastHandle, ToastService, TokioClock};
pub use storage::{BehaviourConfig, Config, SlotsConfig, TimingConfig};
pub use timer::{Clock, ManualClock, MonotonicClock, TimerToken, Wakeup};
pub use toast::{
    Callback, PauseReason, Position, Toast, ToastId, ToastKind, ToastPatch, ToastRequest,
    ToastView,
};
