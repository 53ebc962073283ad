// SPDX-License-Identifier: Apache-2.0 OR MIT
//! Logger configuration and parsing.
//!
//! JSON5 configuration format supporting:
//! - Queue capacity and verbose (debug) output
//! - Output destination: stdout, stderr or an append-only file
//! - Comments and trailing commas

use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::logging::{LogSink, StderrSink, StdoutSink, WriterSink, DEFAULT_CAPACITY};

/// Where rendered lines go
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    #[default]
    Stdout,
    Stderr,
    /// Append to a file, creating it if needed
    File(PathBuf),
}

impl Output {
    /// Open the sink for this destination
    pub fn open_sink(&self) -> Result<Box<dyn LogSink>, ConfigError> {
        match self {
            Output::Stdout => Ok(Box::new(StdoutSink::new())),
            Output::Stderr => Ok(Box::new(StderrSink::new())),
            Output::File(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .map_err(|e| ConfigError::IoError(path.clone(), e.to_string()))?;
                Ok(Box::new(WriterSink::new(BufWriter::new(file))))
            }
        }
    }
}

/// Logger configuration (JSON5 file format)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggerConfig {
    /// Slots per severity queue
    pub capacity: usize,

    /// Emit DEBUG messages (dropped at the call site otherwise)
    pub verbose: bool,

    /// Decorate severity labels with ANSI colors
    pub color: bool,

    pub output: Output,

    /// Upper bound on how long shutdown waits for background work.
    /// Unset means wait indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drain_timeout_ms: Option<u64>,

    /// Route SIGINT/SIGTERM into a graceful shutdown
    pub install_signal_handlers: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            verbose: false,
            color: true,
            output: Output::Stdout,
            drain_timeout_ms: None,
            install_signal_handlers: true,
        }
    }
}

impl LoggerConfig {
    /// Load configuration from a JSON5 file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(path.to_path_buf(), e.to_string()))?;
        Self::parse(&content)
    }

    /// Parse configuration from a JSON5 string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize configuration (pretty JSON, which is valid JSON5)
    pub fn to_json5(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity(self.capacity));
        }
        if let Output::File(path) = &self.output {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::EmptyPath);
            }
        }
        if self.drain_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidDrainTimeout);
        }
        Ok(())
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_ms.map(Duration::from_millis)
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    IoError(PathBuf, String),
    ParseError(String),
    InvalidCapacity(usize),
    EmptyPath,
    InvalidDrainTimeout,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(path, msg) => {
                write!(f, "failed to access '{}': {}", path.display(), msg)
            }
            ConfigError::ParseError(msg) => write!(f, "failed to parse config: {}", msg),
            ConfigError::InvalidCapacity(capacity) => {
                write!(f, "queue capacity must be at least 1 (got {})", capacity)
            }
            ConfigError::EmptyPath => write!(f, "output file path is empty"),
            ConfigError::InvalidDrainTimeout => {
                write!(f, "drain_timeout_ms must be positive when set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_config() {
        let config = LoggerConfig::parse("{}").unwrap();
        assert_eq!(config, LoggerConfig::default());
        assert_eq!(config.capacity, 100);
        assert!(!config.verbose);
        assert_eq!(config.output, Output::Stdout);
        assert!(config.install_signal_handlers);
    }

    #[test]
    fn test_parse_config_with_comments() {
        let config = LoggerConfig::parse(
            r#"{
                // bigger queues for bursty producers
                capacity: 512,
                verbose: true,
                color: false,
                output: "stderr",
                drain_timeout_ms: 2500,
            }"#,
        )
        .unwrap();
        assert_eq!(config.capacity, 512);
        assert!(config.verbose);
        assert!(!config.color);
        assert_eq!(config.output, Output::Stderr);
        assert_eq!(config.drain_timeout(), Some(Duration::from_millis(2500)));
    }

    #[test]
    fn test_parse_file_output() {
        let config = LoggerConfig::parse(r#"{ output: { file: "/var/log/app.log" } }"#).unwrap();
        assert_eq!(config.output, Output::File(PathBuf::from("/var/log/app.log")));
    }

    #[test]
    fn test_parse_error() {
        let err = LoggerConfig::parse("{ capacity: ").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = LoggerConfig {
            capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidCapacity(0)));
    }

    #[test]
    fn test_validate_empty_path() {
        let config = LoggerConfig {
            output: Output::File(PathBuf::new()),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPath));
    }

    #[test]
    fn test_validate_zero_drain_timeout() {
        let config = LoggerConfig {
            drain_timeout_ms: Some(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidDrainTimeout));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ capacity: 8, verbose: true }}").unwrap();

        let config = LoggerConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.capacity, 8);
        assert!(config.verbose);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LoggerConfig::load_from_file(Path::new("/nonexistent/logger.json5")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_, _)));
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "existing\n").unwrap();

        let mut sink = Output::File(path.clone()).open_sink().unwrap();
        sink.write_line("appended");
        sink.flush();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "existing\nappended\n");
    }

    #[test]
    fn test_config_roundtrip() {
        let config = LoggerConfig {
            capacity: 16,
            verbose: true,
            color: false,
            output: Output::File(PathBuf::from("/tmp/out.log")),
            drain_timeout_ms: Some(100),
            install_signal_handlers: false,
        };
        let parsed = LoggerConfig::parse(&config.to_json5()).unwrap();
        assert_eq!(parsed, config);
    }
}
