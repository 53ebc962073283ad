// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Shutdown sequencing.
//!
//! Three independent sources can ask the logger to stop: an explicit
//! request, an OS signal, or a CRITICAL message. A fourth, force-quit, stops
//! without draining. [`Lifecycle::claim`] is the single gate all of them pass
//! through, so exactly one trigger ever reaches the sequencer.

use super::mediator::Mediator;
use super::{LogPayload, Severity};
use futures::StreamExt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Mediator lifecycle
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediatorState {
    /// Accepting and writing messages
    Running = 0,
    /// Graceful shutdown in progress; emits are accepted until the queues close
    ShuttingDown = 1,
    /// Force-quit requested; new and buffered messages are discarded
    Quitting = 2,
    /// Mediator has exited
    Stopped = 3,
}

impl MediatorState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => MediatorState::Running,
            1 => MediatorState::ShuttingDown,
            2 => MediatorState::Quitting,
            _ => MediatorState::Stopped,
        }
    }
}

/// One-shot lifecycle gate shared by the facade, the signal listener and the mediator
pub(crate) struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    pub(crate) fn new() -> Self {
        Self {
            state: AtomicU8::new(MediatorState::Running as u8),
        }
    }

    pub(crate) fn state(&self) -> MediatorState {
        MediatorState::from_u8(self.state.load(Ordering::SeqCst))
    }

    fn transition(&self, to: MediatorState) -> bool {
        self.state
            .compare_exchange(
                MediatorState::Running as u8,
                to as u8,
                Ordering::SeqCst,
                Ordering::SeqCst,
            )
            .is_ok()
    }

    /// Claim the right to run the graceful sequence. Only the first caller wins.
    pub(crate) fn claim(&self) -> bool {
        self.transition(MediatorState::ShuttingDown)
    }

    /// Claim the right to force-quit. Loses against any earlier trigger.
    pub(crate) fn claim_quit(&self) -> bool {
        self.transition(MediatorState::Quitting)
    }

    pub(crate) fn is_quitting(&self) -> bool {
        self.state() == MediatorState::Quitting
    }

    /// True once messages can no longer be accepted
    pub(crate) fn rejects_messages(&self) -> bool {
        matches!(
            self.state(),
            MediatorState::Quitting | MediatorState::Stopped
        )
    }

    pub(crate) fn mark_stopped(&self) {
        self.state
            .store(MediatorState::Stopped as u8, Ordering::SeqCst);
    }
}

/// What stopped the logger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// `Logger::request_shutdown`
    Requested,
    /// SIGINT/SIGTERM (or Ctrl-C), carrying the signal name
    Signal(&'static str),
    /// A CRITICAL message was dequeued
    Critical,
    /// `Logger::force_quit`
    Quit,
}

/// Control messages delivered to the mediator alongside the severity queues
#[derive(Debug)]
pub(crate) enum Control {
    Shutdown(Option<LogPayload>),
    Interrupt(&'static str),
    Quit,
}

/// Outcome of a finished logger, handed to the exit handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub trigger: Trigger,
    /// 0 on a clean stop, 1 when a terminal error was supplied
    pub exit_code: i32,
    pub uptime: Duration,
    /// Messages written by the final drain pass
    pub drained: usize,
    /// Messages thrown away by a force-quit
    pub discarded: usize,
    /// False if the drain timeout expired with background work still registered
    pub work_finished: bool,
}

/// Terminates the process once the logger has stopped
pub trait ExitHandler: Send + Sync {
    fn exit(&self, report: &ShutdownReport);
}

/// Default exit handler: `std::process::exit` with the report's exit code
pub struct ProcessExit;

impl ExitHandler for ProcessExit {
    fn exit(&self, report: &ShutdownReport) {
        std::process::exit(report.exit_code);
    }
}

impl Mediator {
    /// Graceful shutdown. The caller must have won [`Lifecycle::claim`].
    pub(super) async fn shutdown(&mut self, trigger: Trigger, error: Option<LogPayload>) {
        // Anyone holding the done token now sees the stop request
        self.done.cancel();

        let work_finished = self.await_work().await;
        if !work_finished {
            let pending = self.tracker.active();
            self.report(&format!(
                "gave up waiting for {} background task(s)",
                pending
            ));
        }

        let uptime = self.started.elapsed();
        self.report("stopped");
        self.report(&format!("ran for {:?}", uptime));

        let exit_code = match &error {
            Some(err) => {
                self.report(&format!("error: {}", err));
                1
            }
            None => 0,
        };

        self.receivers.close_all();
        let drained = self.drain_all().await;
        self.sink.flush();
        self.lifecycle.mark_stopped();

        let report = ShutdownReport {
            trigger,
            exit_code,
            uptime,
            drained,
            discarded: 0,
            work_finished,
        };
        self.report_tx.send_replace(Some(report.clone()));
        self.exit.exit(&report);
    }

    /// Stop without draining, then exit with status 0
    pub(super) fn quit(&mut self) {
        self.done.cancel();
        let discarded = self.discarded + self.receivers.buffered();
        self.sink.flush();
        self.lifecycle.mark_stopped();

        let report = ShutdownReport {
            trigger: Trigger::Quit,
            exit_code: 0,
            uptime: self.started.elapsed(),
            drained: 0,
            discarded,
            work_finished: self.tracker.active() == 0,
        };
        self.report_tx.send_replace(Some(report.clone()));
        self.exit.exit(&report);
    }

    /// Wait for tracked work to finish while still writing what it logs,
    /// so a producer blocked on a full queue cannot stall the wait.
    async fn await_work(&mut self) -> bool {
        let tracker = self.tracker.clone();
        let limit = self.drain_timeout;
        let idle = async move {
            match limit {
                Some(limit) => tracker.await_zero_timeout(limit).await,
                None => {
                    tracker.await_zero().await;
                    true
                }
            }
        };
        tokio::pin!(idle);

        loop {
            let (severity, payload) = tokio::select! {
                finished = &mut idle => return finished,
                Some(message) = self.receivers.recv_any() => message,
            };
            self.write_message(severity, &payload);
        }
    }

    /// Close-then-drain every queue, most urgent first
    async fn drain_all(&mut self) -> usize {
        let mut drained = 0;
        for severity in Severity::ALL {
            let mut queue = self.receivers.drain(severity);
            while let Some(payload) = queue.next().await {
                let line = self.formatter.message(severity, &payload);
                self.sink.write_line(&line);
                drained += 1;
            }
        }
        drained
    }
}
