// Severity levels and their display attributes

use super::color::Color;
use serde::{Deserialize, Serialize};

/// Log severity levels (0-4, lower is more urgent)
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unrecoverable condition; shuts the process down once dequeued
    Critical = 0,
    /// Error conditions
    Error = 1,
    /// Warning conditions
    Warning = 2,
    /// Informational
    Info = 3,
    /// Verbose diagnostics, only emitted in verbose mode
    Debug = 4,
}

impl Severity {
    /// Every severity, most urgent first. This is also the final drain order.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Debug,
    ];

    /// Index of this severity's queue in the channel set
    #[inline]
    pub const fn queue_index(self) -> usize {
        self as usize
    }

    /// Prefix label printed in front of every line
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "CRITICAL",
            Severity::Error => "ERROR",
            Severity::Warning => "WARNING",
            Severity::Info => "INFO",
            Severity::Debug => "DEBUG",
        }
    }

    /// Display color of the prefix label
    pub const fn color(self) -> Color {
        match self {
            Severity::Critical => Color::Purple,
            Severity::Error => Color::Red,
            Severity::Warning => Color::Yellow,
            Severity::Info => Color::White,
            Severity::Debug => Color::Blue,
        }
    }

    /// Create from u8 value (returns Info if out of range)
    pub const fn from_u8(value: u8) -> Self {
        match value {
            0 => Severity::Critical,
            1 => Severity::Error,
            2 => Severity::Warning,
            3 => Severity::Info,
            4 => Severity::Debug,
            _ => Severity::Info,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
