// SPDX-License-Identifier: Apache-2.0 OR MIT
// Mediator task - sole consumer of the severity queues and sole writer to the sink

use super::channels::Receivers;
use super::shutdown::{Control, ExitHandler, Lifecycle, ShutdownReport, Trigger};
use super::tracker::WorkTracker;
use super::{LogPayload, LogSink, Severity};
use chrono::Local;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

/// Renders payloads into timestamped, labelled lines
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineFormatter {
    color: bool,
}

impl LineFormatter {
    pub(crate) fn new(color: bool) -> Self {
        Self { color }
    }

    fn timestamp() -> String {
        Local::now().format(TIMESTAMP_FORMAT).to_string()
    }

    /// `<timestamp> <LABEL> <payload>`, label colored if enabled
    pub(crate) fn message(&self, severity: Severity, payload: &LogPayload) -> String {
        let label = if self.color {
            severity.color().wrap(severity.as_str())
        } else {
            severity.as_str().to_string()
        };
        format!("{} {} {}", Self::timestamp(), label, payload.render())
    }

    /// Unlabelled line for the logger's own lifecycle events
    pub(crate) fn notice(&self, text: &str) -> String {
        format!("{} {}", Self::timestamp(), text)
    }
}

enum Event {
    Message(Severity, LogPayload),
    Control(Control),
    /// Every producer handle is gone
    Detached,
}

pub(crate) struct Mediator {
    pub(super) receivers: Receivers,
    pub(super) control: mpsc::Receiver<Control>,
    pub(super) sink: Box<dyn LogSink>,
    pub(super) formatter: LineFormatter,
    pub(super) lifecycle: Arc<Lifecycle>,
    pub(super) tracker: WorkTracker,
    pub(super) done: CancellationToken,
    pub(super) started: Instant,
    pub(super) drain_timeout: Option<Duration>,
    pub(super) exit: Arc<dyn ExitHandler>,
    pub(super) report_tx: watch::Sender<Option<ShutdownReport>>,
    /// Messages skipped because a force-quit was pending
    pub(super) discarded: usize,
}

impl Mediator {
    /// Run until a trigger stops the logger
    pub(crate) async fn run(mut self) {
        loop {
            let event = tokio::select! {
                Some((severity, payload)) = self.receivers.recv_any() => {
                    Event::Message(severity, payload)
                }
                Some(control) = self.control.recv() => Event::Control(control),
                else => Event::Detached,
            };

            match event {
                Event::Message(_, _) if self.lifecycle.is_quitting() => {
                    self.discarded += 1;
                }
                Event::Message(Severity::Critical, payload) => {
                    self.write_message(Severity::Critical, &payload);
                    // Another trigger already won; its control message is on the way
                    if self.lifecycle.claim() {
                        self.shutdown(Trigger::Critical, Some(payload)).await;
                        return;
                    }
                }
                Event::Message(severity, payload) => {
                    self.write_message(severity, &payload);
                }
                Event::Control(Control::Shutdown(error)) => {
                    self.shutdown(Trigger::Requested, error).await;
                    return;
                }
                Event::Control(Control::Interrupt(signal)) => {
                    self.report(&format!("received {} signal", signal));
                    self.shutdown(Trigger::Signal(signal), None).await;
                    return;
                }
                Event::Control(Control::Quit) => {
                    self.quit();
                    return;
                }
                Event::Detached => {
                    self.sink.flush();
                    self.lifecycle.mark_stopped();
                    return;
                }
            }
        }
    }

    pub(super) fn write_message(&mut self, severity: Severity, payload: &LogPayload) {
        let line = self.formatter.message(severity, payload);
        self.sink.write_line(&line);
        // Batch flushes while more output is already queued
        if self.receivers.buffered() == 0 {
            self.sink.flush();
        }
    }

    pub(super) fn report(&mut self, text: &str) {
        let line = self.formatter.notice(text);
        self.sink.write_line(&line);
    }
}
