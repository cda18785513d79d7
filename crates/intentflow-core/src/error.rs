//! Error types for intentflow core
//!
//! Provides the failure vocabulary for:
//! - Stage collaborators (`StageError`) and their recoverable/fatal split
//! - Caller-facing failures (`ProcessingError`), always returned inside a
//!   `PipelineResult`, never thrown
//! - Configuration loading (`ConfigError`)

use crate::types::StageKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Failure raised by a stage collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    /// Input is structurally invalid
    #[error("validation failed: {0}")]
    Validation(String),

    /// Input could not be interpreted
    #[error("parse failed: {0}")]
    Parse(String),

    /// Short-lived failure expected to clear on retry
    #[error("transient failure: {0}")]
    Transient(String),

    /// Collaborator unavailable (I/O, backend down)
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    /// Attempt exceeded its deadline
    #[error("stage timed out after {after_ms}ms")]
    Timeout {
        /// Deadline that elapsed
        after_ms: u64,
    },

    /// Unclassified runtime failure
    #[error("runtime failure: {0}")]
    Runtime(String),

    /// Invariant broken inside a collaborator; retrying will not help
    #[error("internal failure: {0}")]
    Internal(String),
}

/// Outcome of classifying a stage failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Substitute a fallback and continue
    Recoverable,
    /// Halt the pipeline
    Fatal,
}

impl StageError {
    /// Classify per the fixed rule table: validation and parse failures are
    /// fatal, everything else is recoverable
    #[inline]
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(_) | Self::Parse(_) => ErrorClass::Fatal,
            Self::Transient(_)
            | Self::Unavailable(_)
            | Self::Timeout { .. }
            | Self::Runtime(_)
            | Self::Internal(_) => ErrorClass::Recoverable,
        }
    }

    /// Check if error is fatal
    #[inline]
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        self.class() == ErrorClass::Fatal
    }

    /// Check if error is worth another attempt
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::Unavailable(_) | Self::Timeout { .. }
        )
    }
}

/// Caller-facing failure category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingErrorKind {
    /// Raw input rejected before any stage ran
    Validation,
    /// A stage could not interpret its input
    Parse,
    /// A stage failed in a way no fallback covers
    StageFailure,
}

impl fmt::Display for ProcessingErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Validation => "validation",
            Self::Parse => "parse",
            Self::StageFailure => "stage_failure",
        })
    }
}

/// Fatal pipeline failure, serialized straight back to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
#[error("{stage} stage failed ({kind}): {message}")]
pub struct ProcessingError {
    /// Stage that failed
    pub stage: StageKind,
    /// Failure category
    #[serde(rename = "type")]
    pub kind: ProcessingErrorKind,
    /// Human-readable description
    pub message: String,
    /// What the caller can change to succeed
    pub suggested_action: String,
    /// Whether the stage has a fallback at all
    pub fallback_available: bool,
}

impl ProcessingError {
    /// Create processing error
    #[inline]
    pub fn new(
        stage: StageKind,
        kind: ProcessingErrorKind,
        message: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
            suggested_action: suggested_action.into(),
            fallback_available: false,
        }
    }

    /// Input validation failure for `stage`
    #[inline]
    pub fn validation(stage: StageKind, message: impl Into<String>) -> Self {
        let message = message.into();
        let action = suggested_action(stage, ProcessingErrorKind::Validation);
        Self::new(stage, ProcessingErrorKind::Validation, message, action)
    }

    /// Build from a fatal stage error
    #[must_use]
    pub fn from_stage(stage: StageKind, error: &StageError, fallback_available: bool) -> Self {
        let kind = match error {
            StageError::Validation(_) => ProcessingErrorKind::Validation,
            StageError::Parse(_) => ProcessingErrorKind::Parse,
            _ => ProcessingErrorKind::StageFailure,
        };
        Self {
            stage,
            kind,
            message: error.to_string(),
            suggested_action: suggested_action(stage, kind).to_string(),
            fallback_available,
        }
    }
}

fn suggested_action(stage: StageKind, kind: ProcessingErrorKind) -> &'static str {
    match (stage, kind) {
        (StageKind::Intent, ProcessingErrorKind::Validation) => {
            "Describe the business goal in at least one full sentence, e.g. who the users are and what outcome they need"
        }
        (StageKind::Intent, ProcessingErrorKind::Parse) => {
            "Rephrase the intent in plain language without markup or code"
        }
        (_, ProcessingErrorKind::Validation) => {
            "Check the request parameters against the documented options and retry"
        }
        (_, ProcessingErrorKind::Parse) => "Simplify the input for this stage and retry",
        (_, ProcessingErrorKind::StageFailure) => {
            "Retry the request; if it keeps failing, run the stage directly to isolate the failure"
        }
    }
}

/// Configuration loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error during config read
    #[error("io error reading {path}: {source}")]
    Io {
        /// File that could not be read
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax or type error
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Value out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_table() {
        assert!(StageError::Validation("x".into()).is_fatal());
        assert!(StageError::Parse("x".into()).is_fatal());
        assert!(!StageError::Runtime("x".into()).is_fatal());
        assert!(!StageError::Internal("x".into()).is_fatal());
        assert!(!StageError::Timeout { after_ms: 10 }.is_fatal());
    }

    #[test]
    fn retryable_errors() {
        assert!(StageError::Transient("x".into()).is_retryable());
        assert!(StageError::Timeout { after_ms: 10 }.is_retryable());
        assert!(StageError::Unavailable("x".into()).is_retryable());
        assert!(!StageError::Runtime("x".into()).is_retryable());
        assert!(!StageError::Internal("x".into()).is_retryable());
        assert!(!StageError::Validation("x".into()).is_retryable());
    }

    #[test]
    fn processing_error_from_parse() {
        let err = ProcessingError::from_stage(
            StageKind::Intent,
            &StageError::Parse("gibberish".into()),
            true,
        );
        assert_eq!(err.kind, ProcessingErrorKind::Parse);
        assert_eq!(err.stage, StageKind::Intent);
        assert!(err.fallback_available);
        assert!(!err.suggested_action.is_empty());
    }

    #[test]
    fn processing_error_serializes_for_callers() {
        let err = ProcessingError::validation(StageKind::Intent, "intent is empty");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["stage"], "intent");
        assert_eq!(json["type"], "validation");
        assert_eq!(json["fallbackAvailable"], false);
        assert!(json["suggestedAction"].as_str().unwrap().len() > 10);
    }

    #[test]
    fn processing_error_display() {
        let err = ProcessingError::validation(StageKind::Intent, "intent is empty");
        assert_eq!(
            err.to_string(),
            "intent stage failed (validation): intent is empty"
        );
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::Invalid("max_concurrency must be at least 1".into());
        assert!(err.to_string().contains("max_concurrency"));
    }
}
