//! Submission validation errors

use signup_common::FormId;
use thiserror::Error;

/// Why a submission was rejected
///
/// All variants are visitor-correctable except `InactiveForm`, which means
/// the caller handed over a form that should never have been rendered.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Required field missing, empty or malformed
    #[error("missing required field: {0}")]
    MissingRequiredField(String),

    /// No usable email address
    #[error("missing email address")]
    MissingEmail,

    /// Required grouping has no selection
    #[error("missing required group selection: {0}")]
    MissingRequiredGroup(String),

    /// Form is disabled or has no list
    #[error("form {0} is not accepting submissions")]
    InactiveForm(FormId),
}

/// Result type for coercion
pub type ValidationResult<T> = Result<T, ValidationError>;
