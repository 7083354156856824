//! Error types for lingo operations.
//!
//! This module provides the error hierarchy shared by the engines and the
//! stores, with structured error codes for programmatic handling.

use std::collections::HashMap;
use thiserror::Error;

/// Result type alias for lingo operations.
pub type LingoResult<T> = Result<T, LingoError>;

/// Main error type for all lingo operations.
#[derive(Error, Debug)]
pub enum LingoError {
    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        details: HashMap<String, String>,
        suggestion: Option<String>,
    },

    /// Entity not found (or owned by another user).
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        entity_id: Option<String>,
    },

    /// Test markup could not be parsed.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// Database operation failed.
    #[error("Database error: {message}")]
    Database {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,
    ValDuplicateWord,
    ValTileOrderMismatch,

    // Not found (NF_xxx)
    NfWord,
    NfTest,
    NfActivity,
    NfPage,

    // Parse (PARSE_xxx)
    ParseUnterminatedBlank,
    ParseEmptyBlank,
    ParseBadDropdown,

    // Database (DB_xxx)
    DbConnectionFailed,
    DbOperationFailed,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::ValDuplicateWord => "VAL_003",
            ErrorCode::ValTileOrderMismatch => "VAL_004",
            ErrorCode::NfWord => "NF_001",
            ErrorCode::NfTest => "NF_002",
            ErrorCode::NfActivity => "NF_003",
            ErrorCode::NfPage => "NF_004",
            ErrorCode::ParseUnterminatedBlank => "PARSE_001",
            ErrorCode::ParseEmptyBlank => "PARSE_002",
            ErrorCode::ParseBadDropdown => "PARSE_003",
            ErrorCode::DbConnectionFailed => "DB_001",
            ErrorCode::DbOperationFailed => "DB_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl LingoError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with a specific code.
    pub fn validation_with_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Validation {
            message: message.into(),
            code,
            details: HashMap::new(),
            suggestion: None,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            details: HashMap::new(),
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a not-found error for a vocabulary word.
    pub fn word_not_found(word_id: i64) -> Self {
        Self::NotFound {
            message: format!("Vocabulary word with id '{}' not found", word_id),
            code: ErrorCode::NfWord,
            entity_id: Some(word_id.to_string()),
        }
    }

    /// Create a not-found error for a test.
    pub fn test_not_found(test_id: i64) -> Self {
        Self::NotFound {
            message: format!("Test with id '{}' not found", test_id),
            code: ErrorCode::NfTest,
            entity_id: Some(test_id.to_string()),
        }
    }

    /// Create a not-found error for a reading activity.
    pub fn activity_not_found(activity_id: i64) -> Self {
        Self::NotFound {
            message: format!("Reading activity with id '{}' not found", activity_id),
            code: ErrorCode::NfActivity,
            entity_id: Some(activity_id.to_string()),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>, code: ErrorCode) -> Self {
        Self::Parse {
            message: message.into(),
            code,
        }
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
            code: ErrorCode::DbOperationFailed,
            source: None,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Database { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::NotFound { .. } => Some("Please check the id and ensure it belongs to you"),
            Self::Parse { .. } => Some("Please check the test markup for unbalanced brackets"),
            Self::Database { .. } => Some("Please try again"),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for LingoError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database {
            message: err.to_string(),
            code: ErrorCode::DbOperationFailed,
            source: Some(Box::new(err)),
        }
    }
}
