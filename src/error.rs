use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, TspError>;

#[derive(Debug, Error)]
pub enum TspError {
    #[error("invalid input{}: {message}", .line.map(|l| format!(" (L{l})")).unwrap_or_default())]
    InvalidInput {
        line: Option<usize>,
        message: String,
    },

    #[error("invalid value for {parameter} ({value}): {reason}")]
    Config {
        parameter: &'static str,
        value: String,
        reason: String,
    },

    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TspError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        TspError::InvalidInput {
            line: None,
            message: message.into(),
        }
    }

    pub fn invalid_line(line: usize, message: impl Into<String>) -> Self {
        TspError::InvalidInput {
            line: Some(line),
            message: message.into(),
        }
    }

    pub fn config(parameter: &'static str, value: impl ToString, reason: impl Into<String>) -> Self {
        TspError::Config {
            parameter,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TspError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_parameter_and_value() {
        let err = TspError::config("population", 0, "must be positive");
        assert_eq!(
            err.to_string(),
            "invalid value for population (0): must be positive"
        );
    }

    #[test]
    fn invalid_input_mentions_line_when_known() {
        let with_line = TspError::invalid_line(3, "bad x");
        assert_eq!(with_line.to_string(), "invalid input (L3): bad x");
        let without = TspError::invalid_input("too few nodes");
        assert_eq!(without.to_string(), "invalid input: too few nodes");
    }
}
