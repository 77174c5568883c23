//! Async host for the engine.
//!
//! [`ToastService::spawn`] moves a [`ToastEngine`] into a tokio task that
//! serves commands and sleeps until the next wakeup deadline. The
//! application creates the service once at its root and passes clones of
//! the [`ToastHandle`] to whatever needs to raise toasts.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::engine::ToastEngine;
use crate::error::{CoreError, Result};
use crate::events::ToastEvent;
use crate::storage::Config;
use crate::timer::Clock;
use crate::toast::{Position, ToastId, ToastPatch, ToastRequest, ToastView};

const EVENT_BUFFER: usize = 256;

/// Clock on tokio's time source, so paused test time drives the engine too.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    fn instant_at(&self, ms: u64) -> Instant {
        self.origin + Duration::from_millis(ms)
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

enum Command {
    Request(ToastRequest, oneshot::Sender<ToastId>),
    Dismiss {
        id: ToastId,
        by_user: bool,
        reply: oneshot::Sender<bool>,
    },
    Pause(ToastId, oneshot::Sender<bool>),
    Resume(ToastId, oneshot::Sender<bool>),
    Update(ToastId, ToastPatch, oneshot::Sender<bool>),
    ClearAll(oneshot::Sender<usize>),
    DocumentVisible(bool),
    Snapshot(Option<Position>, oneshot::Sender<Vec<ToastView>>),
    Shutdown,
}

/// Cloneable reference to a running [`ToastService`].
#[derive(Clone)]
pub struct ToastHandle {
    commands: mpsc::UnboundedSender<Command>,
    views: watch::Receiver<Vec<ToastView>>,
    events: broadcast::Sender<ToastEvent>,
}

impl ToastHandle {
    async fn call<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.commands.send(build(reply))?;
        Ok(rx.await?)
    }

    pub async fn request(&self, request: ToastRequest) -> Result<ToastId> {
        self.call(|reply| Command::Request(request, reply)).await
    }

    pub async fn success(&self, message: impl Into<String>) -> Result<ToastId> {
        self.request(ToastRequest::success(message)).await
    }

    pub async fn error(&self, message: impl Into<String>) -> Result<ToastId> {
        self.request(ToastRequest::error(message)).await
    }

    pub async fn warning(&self, message: impl Into<String>) -> Result<ToastId> {
        self.request(ToastRequest::warning(message)).await
    }

    pub async fn info(&self, message: impl Into<String>) -> Result<ToastId> {
        self.request(ToastRequest::info(message)).await
    }

    pub async fn loading(&self, message: impl Into<String>) -> Result<ToastId> {
        self.request(ToastRequest::loading(message)).await
    }

    pub async fn dismiss(&self, id: ToastId) -> Result<bool> {
        self.call(|reply| Command::Dismiss {
            id,
            by_user: false,
            reply,
        })
        .await
    }

    pub async fn dismiss_by_user(&self, id: ToastId) -> Result<bool> {
        self.call(|reply| Command::Dismiss {
            id,
            by_user: true,
            reply,
        })
        .await
    }

    pub async fn pause(&self, id: ToastId) -> Result<bool> {
        self.call(|reply| Command::Pause(id, reply)).await
    }

    pub async fn resume(&self, id: ToastId) -> Result<bool> {
        self.call(|reply| Command::Resume(id, reply)).await
    }

    pub async fn update(&self, id: ToastId, patch: ToastPatch) -> Result<bool> {
        self.call(|reply| Command::Update(id, patch, reply)).await
    }

    pub async fn clear_all(&self) -> Result<usize> {
        self.call(Command::ClearAll).await
    }

    /// Forwards the document visibility signal. Fire-and-forget.
    pub fn set_document_visible(&self, visible: bool) -> Result<()> {
        self.commands.send(Command::DocumentVisible(visible))?;
        Ok(())
    }

    /// Current records at `position`, oldest-created first.
    pub async fn snapshot(&self, position: Position) -> Result<Vec<ToastView>> {
        self.call(|reply| Command::Snapshot(Some(position), reply)).await
    }

    pub async fn snapshot_all(&self) -> Result<Vec<ToastView>> {
        self.call(|reply| Command::Snapshot(None, reply)).await
    }

    /// Record list republished after every command and wakeup.
    pub fn subscribe(&self) -> watch::Receiver<Vec<ToastView>> {
        self.views.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<ToastEvent> {
        self.events.subscribe()
    }
}

/// Running engine task plus the handle used to talk to it.
pub struct ToastService {
    handle: ToastHandle,
    task: JoinHandle<()>,
}

impl ToastService {
    /// Spawns the engine task on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(config: Config) -> Self {
        let clock = TokioClock::new();
        let engine = ToastEngine::with_clock(config, clock);
        let (commands, rx) = mpsc::unbounded_channel();
        let (views_tx, views) = watch::channel(Vec::new());
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        let task = tokio::spawn(run(engine, clock, rx, views_tx, events.clone()));
        Self {
            handle: ToastHandle {
                commands,
                views,
                events,
            },
            task,
        }
    }

    pub fn handle(&self) -> ToastHandle {
        self.handle.clone()
    }

    /// Stops the task and waits for it. Pending toasts are dropped.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::ServiceClosed` if the task already stopped or
    /// panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.handle.commands.send(Command::Shutdown)?;
        self.task.await.map_err(|_| CoreError::ServiceClosed)
    }
}

async fn run(
    mut engine: ToastEngine<TokioClock>,
    clock: TokioClock,
    mut commands: mpsc::UnboundedReceiver<Command>,
    views: watch::Sender<Vec<ToastView>>,
    events: broadcast::Sender<ToastEvent>,
) {
    loop {
        let wake_at = engine.next_deadline().map(|ms| clock.instant_at(ms));
        let sleep = tokio::time::sleep_until(
            wake_at.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600)),
        );

        tokio::select! {
            command = commands.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => apply(&mut engine, command),
            },
            _ = sleep, if wake_at.is_some() => {
                engine.run_due();
            }
        }

        publish(&mut engine, &views, &events);
    }
    tracing::debug!("toast service stopped");
}

fn apply(engine: &mut ToastEngine<TokioClock>, command: Command) {
    // Replies fail only when the caller stopped waiting; nothing to do then.
    match command {
        Command::Request(request, reply) => {
            let _ = reply.send(engine.request(request));
        }
        Command::Dismiss { id, by_user, reply } => {
            let dismissed = if by_user {
                engine.dismiss_by_user(id)
            } else {
                engine.dismiss(id)
            };
            let _ = reply.send(dismissed);
        }
        Command::Pause(id, reply) => {
            let _ = reply.send(engine.pause(id));
        }
        Command::Resume(id, reply) => {
            let _ = reply.send(engine.resume(id));
        }
        Command::Update(id, patch, reply) => {
            let _ = reply.send(engine.update(id, patch));
        }
        Command::ClearAll(reply) => {
            let _ = reply.send(engine.clear_all());
        }
        Command::DocumentVisible(visible) => engine.set_document_visible(visible),
        Command::Snapshot(position, reply) => {
            let views = match position {
                Some(position) => engine.snapshot(position),
                None => engine.snapshot_all(),
            };
            let _ = reply.send(views);
        }
        Command::Shutdown => {}
    }
}

fn publish(
    engine: &mut ToastEngine<TokioClock>,
    views: &watch::Sender<Vec<ToastView>>,
    events: &broadcast::Sender<ToastEvent>,
) {
    let drained = engine.drain_events();
    if drained.is_empty() {
        return;
    }
    let current = engine.snapshot_all();
    views.send_replace(current);
    for event in drained {
        // No subscribers is fine.
        let _ = events.send(event);
    }
}
