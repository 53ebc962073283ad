//! Shared fixtures: a capturing sink and an exit handler that records
//! instead of terminating the test process.
#![allow(dead_code)]

use graceful_log::logging::ExitHandler;
use graceful_log::{LogSink, Logger, LoggerConfig, ShutdownReport};
use std::sync::{Arc, Mutex};

pub type Lines = Arc<Mutex<Vec<String>>>;

pub struct CaptureSink {
    lines: Lines,
}

impl LogSink for CaptureSink {
    fn write_line(&mut self, line: &str) {
        self.lines.lock().unwrap().push(line.to_string());
    }

    fn flush(&mut self) {}
}

/// Records each exit together with how many lines the sink held at that moment
pub struct RecordingExit {
    lines: Lines,
    pub exits: Mutex<Vec<(ShutdownReport, usize)>>,
}

impl ExitHandler for RecordingExit {
    fn exit(&self, report: &ShutdownReport) {
        let written = self.lines.lock().unwrap().len();
        self.exits.lock().unwrap().push((report.clone(), written));
    }
}

pub struct Harness {
    pub logger: Logger,
    pub lines: Lines,
    pub exit: Arc<RecordingExit>,
}

impl Harness {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Number of lines whose text after the label equals `body`
    pub fn count_body(&self, body: &str) -> usize {
        self.lines()
            .iter()
            .filter_map(|l| split_line(l).map(|(_, b)| b.to_string()))
            .filter(|b| b == body)
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    pub fn exits(&self) -> Vec<(ShutdownReport, usize)> {
        self.exit.exits.lock().unwrap().clone()
    }
}

/// Split "YYYY/MM/DD HH:MM:SS LABEL body" into (label, body)
pub fn split_line(line: &str) -> Option<(&str, &str)> {
    let mut parts = line.splitn(4, ' ');
    let _date = parts.next()?;
    let _time = parts.next()?;
    let label = parts.next()?;
    let body = parts.next().unwrap_or("");
    Some((label, body))
}

pub fn test_config() -> LoggerConfig {
    LoggerConfig {
        color: false,
        install_signal_handlers: false,
        ..Default::default()
    }
}

pub fn start(config: LoggerConfig) -> Harness {
    let lines: Lines = Arc::new(Mutex::new(Vec::new()));
    let exit = Arc::new(RecordingExit {
        lines: Arc::clone(&lines),
        exits: Mutex::new(Vec::new()),
    });
    let sink = CaptureSink {
        lines: Arc::clone(&lines),
    };
    let logger = Logger::start_with(config, Box::new(sink), exit.clone()).unwrap();
    Harness {
        logger,
        lines,
        exit,
    }
}
