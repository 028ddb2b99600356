//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use lutem_common::error::ClassifiedError;
use lutem_domain::LutemError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub LutemError);

impl From<InfraError> for LutemError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<LutemError> for InfraError {
    fn from(value: LutemError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoLutemError {
    fn into_lutem(self) -> LutemError;
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → LutemError */
/* -------------------------------------------------------------------------- */

impl IntoLutemError for IoError {
    fn into_lutem(self) -> LutemError {
        match self.kind() {
            ErrorKind::NotFound => LutemError::Storage(format!("file not found: {self}")),
            ErrorKind::PermissionDenied => LutemError::Storage(format!("permission denied: {self}")),
            _ => LutemError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_lutem())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json / toml → LutemError */
/* -------------------------------------------------------------------------- */

impl IntoLutemError for JsonError {
    fn into_lutem(self) -> LutemError {
        LutemError::Serialization(format!("invalid JSON at line {}: {self}", self.line()))
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_lutem())
    }
}

impl IntoLutemError for TomlError {
    fn into_lutem(self) -> LutemError {
        LutemError::Config(format!("Invalid TOML format: {self}"))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_lutem())
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → LutemError / ClassifiedError */
/* -------------------------------------------------------------------------- */

impl IntoLutemError for HttpError {
    fn into_lutem(self) -> LutemError {
        if self.is_builder() {
            return LutemError::Config(format!("failed to build HTTP client: {self}"));
        }
        LutemError::Api(classify_transport_error(&self))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_lutem())
    }
}

/// Map a reqwest failure that produced no response to a network error.
///
/// The detail distinguishes timeouts and connection failures; the status is
/// always `0`.
pub fn classify_transport_error(err: &HttpError) -> ClassifiedError {
    if err.is_timeout() {
        return ClassifiedError::network("HTTP request timed out");
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return ClassifiedError::network("Failed to connect to server");
    }

    ClassifiedError::network(err.to_string())
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
