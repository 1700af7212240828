// src/error.rs
// Standardized error types for Museo

use std::fmt;
use thiserror::Error;

/// Remote services the pipeline talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Completion,
    Speech,
    VideoSearch,
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Completion => write!(f, "completion"),
            Self::Speech => write!(f, "speech"),
            Self::VideoSearch => write!(f, "video search"),
        }
    }
}

/// Main error type for the Museo library
#[derive(Error, Debug)]
pub enum MuseoError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("{service} service error{}: {message}", .status.map(|s| format!(" ({s})")).unwrap_or_default())]
    RemoteService {
        service: Service,
        status: Option<u16>,
        message: String,
    },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unknown error: {0}")]
    Other(String),
}

/// Convenience type alias for Result using MuseoError
pub type Result<T> = std::result::Result<T, MuseoError>;

impl MuseoError {
    pub fn remote(service: Service, status: Option<u16>, message: impl Into<String>) -> Self {
        MuseoError::RemoteService {
            service,
            status,
            message: message.into(),
        }
    }

    /// Convert to user-facing string for the presentation boundary
    pub fn to_user_string(&self) -> String {
        self.to_string()
    }

    /// HTTP status the web layer reports for this error
    pub fn status_code(&self) -> u16 {
        match self {
            MuseoError::Validation(_) => 400,
            MuseoError::Configuration(_) => 503,
            MuseoError::RemoteService { .. } | MuseoError::Http(_) => 502,
            _ => 500,
        }
    }
}

impl From<String> for MuseoError {
    fn from(s: String) -> Self {
        MuseoError::Other(s)
    }
}

impl From<tokio::task::JoinError> for MuseoError {
    fn from(err: tokio::task::JoinError) -> Self {
        MuseoError::Other(err.to_string())
    }
}

impl From<MuseoError> for String {
    fn from(err: MuseoError) -> Self {
        err.to_string()
    }
}
