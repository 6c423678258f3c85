use std::fmt;

use serde::{Deserialize, Serialize};

/// A line/column location inside the input text, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Malformed input text, raised by a codec before any pass runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", render_parse_error(.message, .position))]
pub struct ParseError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
}

fn render_parse_error(message: &str, position: &Option<Position>) -> String {
    match position {
        Some(pos) => format!("{}: {}", pos, message),
        None => message.to_owned(),
    }
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            position: None,
        }
    }

    pub fn at(line: u32, column: u32, message: impl Into<String>) -> Self {
        ParseError {
            message: message.into(),
            position: Some(Position { line, column }),
        }
    }
}

/// A pass rejected the IR it was handed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct PassError {
    pub message: String,
}

impl PassError {
    pub fn new(message: impl Into<String>) -> Self {
        PassError {
            message: message.into(),
        }
    }
}

/// A run was superseded before it finished. Never shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("run cancelled")]
pub struct Cancelled;

/// The session actor has shut down and no longer accepts commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("session is closed")]
pub struct SessionClosed;

/// Configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_display_includes_position() {
        let err = ParseError::at(3, 7, "expected operand");
        assert_eq!(err.to_string(), "3:7: expected operand");
        assert_eq!(ParseError::new("empty").to_string(), "empty");
    }

    #[test]
    fn parse_error_json_omits_missing_position() {
        let json = serde_json::to_value(ParseError::new("bad")).unwrap();
        assert_eq!(json, serde_json::json!({ "message": "bad" }));
    }
}
