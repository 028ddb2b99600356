//! Error types used throughout the application

use lutem_common::error::{ClassifiedError, ErrorClass, ErrorClassification};
use thiserror::Error;

/// Main error type for Lutem
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LutemError {
    /// A remote call failed; carries the normalized request-client error
    #[error(transparent)]
    Api(#[from] ClassifiedError),

    #[error("No external library is connected")]
    NotConnected,

    #[error("A classification batch is already running")]
    ClassificationInFlight,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Lutem operations
pub type Result<T> = std::result::Result<T, LutemError>;

impl LutemError {
    /// Message suitable for showing to the user.
    ///
    /// For API errors the server's `message` (or `error`) field is preferred
    /// when the body is a JSON object carrying one; otherwise the status line
    /// is used.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(err) => server_message(err)
                .unwrap_or_else(|| format!("{} {}", err.status_code(), err.status_text())),
            other => other.to_string(),
        }
    }

    /// The underlying request-client error, if any.
    pub fn as_api(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

fn server_message(err: &ClassifiedError) -> Option<String> {
    let body: serde_json::Value = serde_json::from_str(err.body()?).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| body.get(*key)?.as_str())
        .find(|msg| !msg.trim().is_empty())
        .map(str::to_owned)
}

impl ErrorClassification for LutemError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Api(err) => err.class(),
            _ => ErrorClass::Application,
        }
    }
}

impl From<serde_json::Error> for LutemError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
