// SPDX-License-Identifier: Apache-2.0 OR MIT
// Per-severity bounded queues between producers and the mediator

use super::{LogPayload, Severity};
use futures::Stream;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::SendTimeoutError, error::TrySendError};

/// Default capacity of each severity queue
pub const DEFAULT_CAPACITY: usize = 100;

/// Reasons a payload could not be queued
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EmitError {
    /// The logger has shut down (or force-quit) and no longer accepts messages
    #[error("{0} queue is closed")]
    Closed(Severity),
    /// Non-blocking emit found the queue at capacity
    #[error("{0} queue is full")]
    Full(Severity),
    /// Bounded emit gave up waiting for queue space
    #[error("timed out waiting for space on the {0} queue")]
    Timeout(Severity),
}

/// Producer side: one sender per severity
#[derive(Clone)]
pub(crate) struct Senders {
    queues: [mpsc::Sender<LogPayload>; 5],
}

/// Consumer side, owned exclusively by the mediator
pub(crate) struct Receivers {
    queues: [mpsc::Receiver<LogPayload>; 5],
}

/// Create the channel set with `capacity` slots per severity
pub(crate) fn channel_set(capacity: usize) -> (Senders, Receivers) {
    let (critical_tx, critical_rx) = mpsc::channel(capacity);
    let (error_tx, error_rx) = mpsc::channel(capacity);
    let (warning_tx, warning_rx) = mpsc::channel(capacity);
    let (info_tx, info_rx) = mpsc::channel(capacity);
    let (debug_tx, debug_rx) = mpsc::channel(capacity);

    // Array order must follow Severity::queue_index
    (
        Senders {
            queues: [critical_tx, error_tx, warning_tx, info_tx, debug_tx],
        },
        Receivers {
            queues: [critical_rx, error_rx, warning_rx, info_rx, debug_rx],
        },
    )
}

impl Senders {
    fn queue(&self, severity: Severity) -> &mpsc::Sender<LogPayload> {
        &self.queues[severity.queue_index()]
    }

    /// Queue a payload, waiting while the queue is full
    pub(crate) async fn enqueue(
        &self,
        severity: Severity,
        payload: LogPayload,
    ) -> Result<(), EmitError> {
        self.queue(severity)
            .send(payload)
            .await
            .map_err(|_| EmitError::Closed(severity))
    }

    /// Queue a payload without waiting
    pub(crate) fn try_enqueue(
        &self,
        severity: Severity,
        payload: LogPayload,
    ) -> Result<(), EmitError> {
        self.queue(severity).try_send(payload).map_err(|e| match e {
            TrySendError::Full(_) => EmitError::Full(severity),
            TrySendError::Closed(_) => EmitError::Closed(severity),
        })
    }

    /// Queue a payload, waiting at most `timeout` for space
    pub(crate) async fn enqueue_timeout(
        &self,
        severity: Severity,
        payload: LogPayload,
        timeout: Duration,
    ) -> Result<(), EmitError> {
        self.queue(severity)
            .send_timeout(payload, timeout)
            .await
            .map_err(|e| match e {
                SendTimeoutError::Timeout(_) => EmitError::Timeout(severity),
                SendTimeoutError::Closed(_) => EmitError::Closed(severity),
            })
    }

    /// Queue a payload from a plain OS thread, blocking it while the queue is full
    ///
    /// Panics if called from within an async execution context.
    pub(crate) fn blocking_enqueue(
        &self,
        severity: Severity,
        payload: LogPayload,
    ) -> Result<(), EmitError> {
        self.queue(severity)
            .blocking_send(payload)
            .map_err(|_| EmitError::Closed(severity))
    }
}

impl Receivers {
    /// Wait for the next payload on any queue
    ///
    /// No queue takes precedence, so only per-severity FIFO order holds.
    /// Returns `None` once every queue is closed and empty.
    pub(crate) async fn recv_any(&mut self) -> Option<(Severity, LogPayload)> {
        let [critical, error, warning, info, debug] = &mut self.queues;
        tokio::select! {
            Some(p) = critical.recv() => Some((Severity::Critical, p)),
            Some(p) = error.recv() => Some((Severity::Error, p)),
            Some(p) = warning.recv() => Some((Severity::Warning, p)),
            Some(p) = info.recv() => Some((Severity::Info, p)),
            Some(p) = debug.recv() => Some((Severity::Debug, p)),
            else => None,
        }
    }

    /// Reject further sends on every queue; buffered payloads stay readable
    pub(crate) fn close_all(&mut self) {
        for queue in &mut self.queues {
            queue.close();
        }
    }

    /// Remaining payloads of one queue
    ///
    /// The stream ends once the queue is closed and empty, so call
    /// [`Receivers::close_all`] first. Sends that already hold a permit are
    /// still awaited, so nothing accepted before the close is lost.
    pub(crate) fn drain(
        &mut self,
        severity: Severity,
    ) -> impl Stream<Item = LogPayload> + Unpin + '_ {
        let queue = &mut self.queues[severity.queue_index()];
        futures::stream::poll_fn(move |cx| queue.poll_recv(cx))
    }

    /// Number of payloads currently buffered across all queues
    pub(crate) fn buffered(&self) -> usize {
        self.queues.iter().map(|q| q.len()).sum()
    }
}
