// SPDX-License-Identifier: Apache-2.0 OR MIT
// Output sinks for rendered log lines

use std::io::Write;

/// Output sink for rendered log lines
///
/// Only the mediator task ever holds the sink, so implementations need no
/// internal locking. Writes are best-effort: I/O errors are swallowed.
pub trait LogSink: Send {
    /// Write one fully rendered line (without trailing newline)
    fn write_line(&mut self, line: &str);

    /// Flush any buffered output
    fn flush(&mut self);
}

/// Standard output sink (writes to stdout)
pub struct StdoutSink {
    stdout: std::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
        }
    }
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StdoutSink {
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.stdout, "{}", line);
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }
}

/// Standard error sink (writes to stderr)
pub struct StderrSink {
    stderr: std::io::Stderr,
}

impl StderrSink {
    pub fn new() -> Self {
        Self {
            stderr: std::io::stderr(),
        }
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.stderr, "{}", line);
    }

    fn flush(&mut self) {
        let _ = self.stderr.flush();
    }
}

/// Sink over any writer, typically a buffered log file
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> LogSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) {
        let _ = writeln!(self.writer, "{}", line);
    }

    fn flush(&mut self) {
        let _ = self.writer.flush();
    }
}
