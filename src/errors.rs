//! Error types for the bordereau lifecycle engine
//!
//! Every rejection carries a stable machine-readable code and a human message.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bordereau operations
pub type Result<T> = std::result::Result<T, BsdError>;

/// A single missing or invalid field found by the completeness validator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Dotted path of the offending field (e.g. `destination.operation.code`)
    pub path: String,

    /// Human readable explanation
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationIssue {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

fn render_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(|issue| issue.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for all bordereau operations
#[derive(Debug, Error)]
pub enum BsdError {
    /// Document id does not exist (or was soft-deleted)
    #[error("Bordereau not found: {0}")]
    NotFound(String),

    /// Required fields are missing or invalid for the target stage
    #[error("Validation failed ({} issue(s)): {}", issues.len(), render_issues(issues))]
    ValidationFailed { issues: Vec<ValidationIssue> },

    /// Caller does not belong to the organization expected for the stage
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// Delegated signing attempted with a non-matching secret code
    #[error("Invalid signing code for organization {0}")]
    InvalidSigningCode(String),

    /// The document is not yet (or no longer) at this stage
    #[error("Wrong stage order: {0}")]
    WrongStageOrder(String),

    /// The stage already carries a signature
    #[error("Already signed: {0}")]
    AlreadySigned(String),

    /// The document family, subtype or state forbids this stage
    #[error("Invalid document state for stage: {0}")]
    InvalidDocumentStateForStage(String),

    /// Opaque infrastructure failure; nothing was committed
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Workspace not found - no .bordereaux directory
    #[error("Workspace not found: {0}")]
    WorkspaceNotFound(String),

    /// Invalid JSON format
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// IO error wrapper
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error with context
    #[error("{context}: {message}")]
    Wrapped { context: String, message: String },
}

impl BsdError {
    /// Get the error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            BsdError::NotFound(_) => "NOT_FOUND",
            BsdError::ValidationFailed { .. } => "VALIDATION_FAILED",
            BsdError::NotAuthorized(_) => "NOT_AUTHORIZED",
            BsdError::InvalidSigningCode(_) => "INVALID_SIGNING_CODE",
            BsdError::WrongStageOrder(_) => "WRONG_STAGE_ORDER",
            BsdError::AlreadySigned(_) => "ALREADY_SIGNED",
            BsdError::InvalidDocumentStateForStage(_) => "INVALID_DOCUMENT_STATE_FOR_STAGE",
            BsdError::TransactionFailed(_) => "TRANSACTION_FAILED",
            BsdError::WorkspaceNotFound(_) => "WORKSPACE_NOT_FOUND",
            BsdError::InvalidJson(_) => "INVALID_JSON",
            BsdError::FileNotFound(_) => "FILE_NOT_FOUND",
            BsdError::ConfigError(_) => "CONFIG_ERROR",
            BsdError::Io(_) => "IO_ERROR",
            BsdError::Wrapped { .. } => "WRAPPED_ERROR",
        }
    }

    /// Whether this is a typed, user-facing rejection of the request
    /// (as opposed to an infrastructure failure).
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            BsdError::NotFound(_)
                | BsdError::ValidationFailed { .. }
                | BsdError::NotAuthorized(_)
                | BsdError::InvalidSigningCode(_)
                | BsdError::WrongStageOrder(_)
                | BsdError::AlreadySigned(_)
                | BsdError::InvalidDocumentStateForStage(_)
        )
    }

    /// Issues attached to a validation failure (empty for other errors)
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            BsdError::ValidationFailed { issues } => issues,
            _ => &[],
        }
    }

    /// Wrap an error with additional context
    pub fn wrap<E: std::fmt::Display>(error: E, context: impl Into<String>) -> Self {
        BsdError::Wrapped {
            context: context.into(),
            message: error.to_string(),
        }
    }
}

/// Convert an error to an appropriate exit code
pub fn to_exit_code(error: &BsdError) -> i32 {
    if error.is_rejection() {
        2
    } else {
        1
    }
}
