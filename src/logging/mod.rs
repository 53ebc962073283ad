// Severity-leveled logging with a single mediator task and coordinated shutdown
//
// Producers queue payloads on one bounded channel per severity. A single
// mediator task owns every receiver, renders lines and writes them to the
// sink. Shutdown waits for tracked background work, drains what is left and
// terminates the process.

mod channels;
mod color;
mod logger;
mod mediator;
mod payload;
mod severity;
mod shutdown;
mod signals;
mod sink;
mod tracker;

// Public exports
pub use channels::{EmitError, DEFAULT_CAPACITY};
pub use color::Color;
pub use logger::{Logger, StartError};
pub use payload::LogPayload;
pub use severity::Severity;
pub use shutdown::{ExitHandler, MediatorState, ProcessExit, ShutdownReport, Trigger};
pub use sink::{LogSink, StderrSink, StdoutSink, WriterSink};
pub use tracker::{WorkGuard, WorkTracker};
