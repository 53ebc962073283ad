// SPDX-License-Identifier: Apache-2.0 OR MIT
// Logger handle: the public entry points producers use

use super::channels::{channel_set, EmitError, Senders};
use super::mediator::{LineFormatter, Mediator};
use super::shutdown::{
    Control, ExitHandler, Lifecycle, MediatorState, ProcessExit, ShutdownReport,
};
use super::signals;
use super::tracker::{WorkGuard, WorkTracker};
use super::{LogPayload, LogSink, Severity};
use crate::config::{ConfigError, LoggerConfig};
use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Errors from [`Logger::start`]
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid logger configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("logger must be started from within a tokio runtime")]
    NoRuntime,

    #[error("failed to install signal handlers: {0}")]
    Signal(#[source] std::io::Error),
}

struct Shared {
    senders: Senders,
    control: mpsc::Sender<Control>,
    lifecycle: Arc<Lifecycle>,
    tracker: WorkTracker,
    done: CancellationToken,
    verbose: bool,
    started: Instant,
    started_at: DateTime<Local>,
    report: watch::Receiver<Option<ShutdownReport>>,
    /// Stops the signal listener once the last handle is gone
    listener: CancellationToken,
}

impl Drop for Shared {
    fn drop(&mut self) {
        self.listener.cancel();
    }
}

/// Handle to a running logger
///
/// Cheap to clone; every clone feeds the same mediator task. Emitting
/// blocks (asynchronously) while the target severity queue is full.
#[derive(Clone)]
pub struct Logger {
    shared: Arc<Shared>,
}

impl Logger {
    /// Start a logger writing to the configured output.
    ///
    /// The process exits once the logger shuts down.
    pub fn start(config: LoggerConfig) -> Result<Self, StartError> {
        config.validate()?;
        let sink = config.output.open_sink()?;
        Self::start_with(config, sink, Arc::new(ProcessExit))
    }

    /// Start a logger with an explicit sink and exit handler
    pub fn start_with(
        config: LoggerConfig,
        sink: Box<dyn LogSink>,
        exit: Arc<dyn ExitHandler>,
    ) -> Result<Self, StartError> {
        config.validate()?;
        tokio::runtime::Handle::try_current().map_err(|_| StartError::NoRuntime)?;

        let (senders, receivers) = channel_set(config.capacity);
        // Only the trigger that wins the lifecycle gate ever sends
        let (control_tx, control_rx) = mpsc::channel(1);
        let (report_tx, report_rx) = watch::channel(None);
        let lifecycle = Arc::new(Lifecycle::new());
        let tracker = WorkTracker::new();
        let done = CancellationToken::new();
        let started = Instant::now();
        let listener = done.child_token();

        if config.install_signal_handlers {
            signals::install(Arc::clone(&lifecycle), control_tx.clone(), listener.clone())
                .map_err(StartError::Signal)?;
        }

        let mediator = Mediator {
            receivers,
            control: control_rx,
            sink,
            formatter: LineFormatter::new(config.color),
            lifecycle: Arc::clone(&lifecycle),
            tracker: tracker.clone(),
            done: done.clone(),
            started,
            drain_timeout: config.drain_timeout(),
            exit,
            report_tx,
            discarded: 0,
        };
        tokio::spawn(mediator.run());

        Ok(Self {
            shared: Arc::new(Shared {
                senders,
                control: control_tx,
                lifecycle,
                tracker,
                done,
                verbose: config.verbose,
                started,
                started_at: Local::now(),
                report: report_rx,
                listener,
            }),
        })
    }

    /// Whether a message at `severity` would be queued at all
    ///
    /// A graceful shutdown keeps accepting messages until the mediator
    /// closes the queues; the channel itself rejects anything later.
    fn accepts(&self, severity: Severity) -> Result<bool, EmitError> {
        if self.shared.lifecycle.rejects_messages() {
            return Err(EmitError::Closed(severity));
        }
        Ok(severity != Severity::Debug || self.shared.verbose)
    }

    /// Queue a payload at `severity`, waiting while the queue is full
    pub async fn emit(
        &self,
        severity: Severity,
        payload: impl Into<LogPayload>,
    ) -> Result<(), EmitError> {
        if !self.accepts(severity)? {
            return Ok(());
        }
        self.shared.senders.enqueue(severity, payload.into()).await
    }

    /// Queue a payload without waiting; fails with `Full` at capacity
    pub fn try_emit(
        &self,
        severity: Severity,
        payload: impl Into<LogPayload>,
    ) -> Result<(), EmitError> {
        if !self.accepts(severity)? {
            return Ok(());
        }
        self.shared.senders.try_enqueue(severity, payload.into())
    }

    /// Queue a payload, waiting at most `timeout` for space
    pub async fn emit_timeout(
        &self,
        severity: Severity,
        payload: impl Into<LogPayload>,
        timeout: Duration,
    ) -> Result<(), EmitError> {
        if !self.accepts(severity)? {
            return Ok(());
        }
        self.shared
            .senders
            .enqueue_timeout(severity, payload.into(), timeout)
            .await
    }

    /// Queue a payload from a non-async thread, blocking it while the queue is full
    ///
    /// # Panics
    ///
    /// Panics if called from within an async execution context.
    pub fn blocking_emit(
        &self,
        severity: Severity,
        payload: impl Into<LogPayload>,
    ) -> Result<(), EmitError> {
        if !self.accepts(severity)? {
            return Ok(());
        }
        self.shared.senders.blocking_enqueue(severity, payload.into())
    }

    /// Log with debug severity (no-op unless verbose)
    pub async fn debug(&self, payload: impl Into<LogPayload>) -> Result<(), EmitError> {
        self.emit(Severity::Debug, payload).await
    }

    /// Log with info severity
    pub async fn info(&self, payload: impl Into<LogPayload>) -> Result<(), EmitError> {
        self.emit(Severity::Info, payload).await
    }

    /// Log with warning severity
    pub async fn warning(&self, payload: impl Into<LogPayload>) -> Result<(), EmitError> {
        self.emit(Severity::Warning, payload).await
    }

    /// Log with error severity
    pub async fn error(&self, payload: impl Into<LogPayload>) -> Result<(), EmitError> {
        self.emit(Severity::Error, payload).await
    }

    /// Log with critical severity
    ///
    /// Once the mediator dequeues the message it is written and the logger
    /// shuts down with exit status 1, unless another trigger got there first.
    pub async fn critical(&self, payload: impl Into<LogPayload>) -> Result<(), EmitError> {
        self.emit(Severity::Critical, payload).await
    }

    /// Ask for a graceful shutdown, optionally with a terminal error
    ///
    /// Returns `false` if a shutdown or quit was already under way, in which
    /// case this call has no effect.
    pub fn request_shutdown(&self, error: Option<LogPayload>) -> bool {
        if !self.shared.lifecycle.claim() {
            return false;
        }
        let _ = self.shared.control.try_send(Control::Shutdown(error));
        true
    }

    /// Stop the mediator immediately, discarding buffered messages
    ///
    /// The exit handler then runs with status 0. Returns `false` if a
    /// shutdown was already under way.
    pub fn force_quit(&self) -> bool {
        if !self.shared.lifecycle.claim_quit() {
            return false;
        }
        let _ = self.shared.control.try_send(Control::Quit);
        true
    }

    /// Register a unit of background work; shutdown waits for the guard to drop
    pub fn begin_work(&self) -> WorkGuard {
        self.shared.tracker.begin()
    }

    /// Spawn a tracked background task
    pub fn spawn_work<F>(&self, future: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.shared.tracker.spawn(future)
    }

    pub fn tracker(&self) -> &WorkTracker {
        &self.shared.tracker
    }

    /// Token cancelled as the first step of any shutdown
    pub fn done_token(&self) -> CancellationToken {
        self.shared.done.clone()
    }

    /// Wall-clock time the logger was started
    pub fn start_time(&self) -> DateTime<Local> {
        self.shared.started_at
    }

    pub fn uptime(&self) -> Duration {
        self.shared.started.elapsed()
    }

    pub fn state(&self) -> MediatorState {
        self.shared.lifecycle.state()
    }

    pub fn is_verbose(&self) -> bool {
        self.shared.verbose
    }

    /// Wait for the mediator to stop
    ///
    /// With the default exit handler the process exits first, so this only
    /// returns with a custom handler.
    pub async fn stopped(&self) -> Option<ShutdownReport> {
        let mut report = self.shared.report.clone();
        loop {
            let current = report.borrow_and_update().clone();
            if current.is_some() {
                return current;
            }
            if report.changed().await.is_err() {
                return report.borrow().clone();
            }
        }
    }
}
