//! Error types for the service.
//!
//! Nothing here is fatal to the process: validation and credential errors
//! are surfaced to the caller next to the action that triggered them, and
//! artifact failures during export are logged and skipped.

use serde::Serialize;

/// A single failed form field, reported alongside its siblings.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> FieldError {
        FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// One or more form fields failed validation. All failures are
    /// collected before reporting, never just the first.
    #[error("validation failed for {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("an account with this email already exists")]
    DuplicateEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account store error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("password hashing error: {0}")]
    Hashing(String),

    #[error("internal error: {0}")]
    Internal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("PDF generation failed: {0}")]
    Pdf(#[from] printpdf::Error),

    #[error("report worker failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
