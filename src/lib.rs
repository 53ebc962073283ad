//! Severity-leveled logging with coordinated process shutdown.
//!
//! Producers hand payloads to a [`Logger`]; a single mediator task writes
//! them to the sink. Shutdown (explicit, SIGINT/SIGTERM, or a CRITICAL
//! message) waits for tracked background work, drains every queue and then
//! exits the process.
//!
//! ```ignore
//! let logger = Logger::start(LoggerConfig::default())?;
//! logger.info("service starting").await?;
//! let worker = logger.spawn_work(async { /* ... */ });
//! logger.request_shutdown(None);
//! ```

pub mod config;
pub mod logging;

pub use config::{ConfigError, LoggerConfig, Output};
pub use logging::{
    EmitError, LogPayload, LogSink, Logger, Severity, ShutdownReport, StartError, Trigger,
    WorkGuard, WorkTracker,
};
