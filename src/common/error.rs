//! Error types for the LDAP tool wizard
//!
//! Error messages are meant to be read by an installer operator, so most of
//! them say what to fix. A failing test sequence is *not* an error: the
//! extensions tool exiting non-zero is reported inline by the wizard.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the wizard
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    #[error("Aborted by user")]
    AbortedByUser,

    // === Extensions Tool Errors ===
    #[error("Failed to start extensions tool '{path}': {source}")]
    ToolSpawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Extensions tool '{path}' exited with code {code}")]
    ToolFailed { path: PathBuf, code: i32 },

    // === Layout Errors ===
    #[error("Failed to prepare configuration layout at '{path}': {source}")]
    Layout {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Artifact path '{0}' must be relative and stay inside the configuration directory")]
    UnsafeArtifactPath(PathBuf),

    // === Settings Errors ===
    #[error("Missing setting '{0}' in setup state")]
    MissingSetting(String),

    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    // === Prompt Errors ===
    #[error("Input closed while waiting for '{0}'")]
    PromptClosed(String),

    #[error("Invalid answer '{value}' for '{name}'. Valid values: {valid}")]
    InvalidAnswer {
        name: String,
        value: String,
        valid: String,
    },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an invalid setting error
    pub fn invalid_setting(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidSetting {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// Wrap an IO error raised while building the layout at `path`
    pub fn layout(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Layout {
            path: path.into(),
            source,
        }
    }

    /// Create an invalid answer error
    pub fn invalid_answer(name: &str, value: &str, valid: &[String]) -> Self {
        Self::InvalidAnswer {
            name: name.to_string(),
            value: value.to_string(),
            valid: valid.join(", "),
        }
    }

    /// Whether this error was caused by the operator choosing to abort
    pub fn is_user_abort(&self) -> bool {
        matches!(self, Self::AbortedByUser)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_answer_lists_values() {
        let err = Error::invalid_answer("Q", "maybe", &["Yes".to_string(), "No".to_string()]);
        assert_eq!(
            err.to_string(),
            "Invalid answer 'maybe' for 'Q'. Valid values: Yes, No"
        );
    }

    #[test]
    fn test_abort_is_distinguishable() {
        assert!(Error::AbortedByUser.is_user_abort());
        assert!(!Error::PromptClosed("Q".to_string()).is_user_abort());
        assert_eq!(Error::AbortedByUser.to_string(), "Aborted by user");
    }
}
