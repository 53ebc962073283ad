// SPDX-License-Identifier: Apache-2.0 OR MIT
// Log payloads: an error or a plain message, normalized to a display string

use std::any::Any;
use std::error::Error as StdError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// A value queued for logging
///
/// Producers may hand over either an error or a message. Anything else that
/// reaches the logger type-erased (see [`LogPayload::from_any`]) collapses to
/// [`LogPayload::Empty`] instead of failing.
#[derive(Debug)]
pub enum LogPayload {
    Error(BoxError),
    Message(String),
    Empty,
}

impl LogPayload {
    /// Wrap any error type
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        LogPayload::Error(Box::new(err))
    }

    /// Normalize a type-erased value
    ///
    /// Strings and errors are kept; other shapes become `Empty`. Panic
    /// payloads from `JoinError::into_panic` are the typical input.
    pub fn from_any(value: Box<dyn Any + Send>) -> Self {
        let value = match value.downcast::<String>() {
            Ok(s) => return LogPayload::Message(*s),
            Err(v) => v,
        };
        let value = match value.downcast::<&'static str>() {
            Ok(s) => return LogPayload::Message((*s).to_string()),
            Err(v) => v,
        };
        let value = match value.downcast::<BoxError>() {
            Ok(e) => return LogPayload::Error(*e),
            Err(v) => v,
        };
        let value = match value.downcast::<anyhow::Error>() {
            Ok(e) => return LogPayload::Error((*e).into()),
            Err(v) => v,
        };
        match value.downcast::<std::io::Error>() {
            Ok(e) => LogPayload::Error(e),
            Err(_) => LogPayload::Empty,
        }
    }

    /// Text written after the severity label
    pub fn render(&self) -> String {
        match self {
            LogPayload::Error(e) => e.to_string(),
            LogPayload::Message(m) => m.clone(),
            LogPayload::Empty => String::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LogPayload::Empty)
    }
}

impl std::fmt::Display for LogPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogPayload::Error(e) => write!(f, "{}", e),
            LogPayload::Message(m) => f.write_str(m),
            LogPayload::Empty => Ok(()),
        }
    }
}

impl From<&str> for LogPayload {
    fn from(value: &str) -> Self {
        LogPayload::Message(value.to_string())
    }
}

impl From<String> for LogPayload {
    fn from(value: String) -> Self {
        LogPayload::Message(value)
    }
}

impl From<&String> for LogPayload {
    fn from(value: &String) -> Self {
        LogPayload::Message(value.clone())
    }
}

impl From<BoxError> for LogPayload {
    fn from(value: BoxError) -> Self {
        LogPayload::Error(value)
    }
}

impl From<std::io::Error> for LogPayload {
    fn from(value: std::io::Error) -> Self {
        LogPayload::Error(Box::new(value))
    }
}

impl From<anyhow::Error> for LogPayload {
    fn from(value: anyhow::Error) -> Self {
        LogPayload::Error(value.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_renders_verbatim() {
        assert_eq!(LogPayload::from("disk almost full").render(), "disk almost full");
        assert_eq!(
            LogPayload::from(String::from("owned")).render(),
            "owned"
        );
    }

    #[test]
    fn test_error_renders_display() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "config missing");
        assert_eq!(LogPayload::from(err).render(), "config missing");

        let err = anyhow::anyhow!("bind failed");
        assert_eq!(LogPayload::from(err).render(), "bind failed");
    }

    #[test]
    fn test_from_any_keeps_strings_and_errors() {
        let p = LogPayload::from_any(Box::new(String::from("owned")));
        assert_eq!(p.render(), "owned");

        let p = LogPayload::from_any(Box::new("static"));
        assert_eq!(p.render(), "static");

        let err: BoxError = "boxed".into();
        let p = LogPayload::from_any(Box::new(err));
        assert!(matches!(p, LogPayload::Error(_)));
        assert_eq!(p.render(), "boxed");
    }

    #[test]
    fn test_from_any_normalizes_other_shapes_to_empty() {
        let p = LogPayload::from_any(Box::new(42u32));
        assert!(p.is_empty());
        assert_eq!(p.render(), "");

        let p = LogPayload::from_any(Box::new(vec![1, 2, 3]));
        assert!(p.is_empty());
    }

    #[test]
    fn test_display_matches_render() {
        let p = LogPayload::from("same");
        assert_eq!(format!("{}", p), p.render());
        assert_eq!(format!("{}", LogPayload::Empty), "");
    }
}
