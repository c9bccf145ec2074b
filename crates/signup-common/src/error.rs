//! Error types for the signup engine

use thiserror::Error;

/// Settings and configuration errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file is not valid TOML or has unknown values
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A setting holds a value outside its allowed range
    #[error("invalid setting {setting}: {reason}")]
    Invalid {
        /// Dotted setting name
        setting: String,
        /// Human readable reason
        reason: String,
    },
}

impl SettingsError {
    pub(crate) fn invalid(setting: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            setting: setting.into(),
            reason: reason.into(),
        }
    }
}

/// Value object construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Form ids start at 1
    #[error("invalid form id: {0}")]
    InvalidFormId(String),

    /// Date format index outside 0..=17
    #[error("unknown date format: {0}")]
    UnknownDateFormat(u8),

    /// Birthday format index outside 0..=5
    #[error("unknown birthday format: {0}")]
    UnknownBirthdayFormat(u8),
}

/// Result type for settings operations
pub type SettingsResult<T> = Result<T, SettingsError>;
