// SPDX-License-Identifier: Apache-2.0 OR MIT
// ANSI terminal colors used to decorate severity labels

const RESET: &str = "\x1b[0m";

/// Terminal color for a severity label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Red,
    White,
    Yellow,
    Purple,
    Blue,
}

impl Color {
    /// ANSI escape sequence that switches to this color
    pub const fn code(self) -> &'static str {
        match self {
            Color::Red => "\x1b[31m",
            Color::White => "\x1b[97m",
            Color::Yellow => "\x1b[33m",
            Color::Purple => "\x1b[35m",
            Color::Blue => "\x1b[34m",
        }
    }

    /// Wrap `text` in this color, resetting afterwards
    pub fn wrap(self, text: &str) -> String {
        format!("{}{}{}", self.code(), text, RESET)
    }
}
