use std::{fmt, io};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError as UrlParseError;

use serde_json::Error as JsonError;

/// Crate-wide error type.
///
/// Only genuinely fatal conditions surface as a `DtsError`: filesystem
/// failures on the output side, malformed configuration, or internal
/// invariant violations. Recoverable load conditions (missing references,
/// malformed taxonomy documents, dangling XLink arcs) are reported as
/// [`LoadDiagnostic`](crate::codec::LoadDiagnostic)s instead and never
/// abort a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum DtsError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    #[error("XML parse error: {0}")]
    Xml(String),
}

impl From<toml::de::Error> for DtsError {
    fn from(src: toml::de::Error) -> DtsError {
        DtsError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for DtsError {
    fn from(src: toml::ser::Error) -> DtsError {
        DtsError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for DtsError {
    fn from(src: JsonError) -> DtsError {
        DtsError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<UrlParseError> for DtsError {
    fn from(src: UrlParseError) -> DtsError {
        DtsError::Serialization(format!("Invalid URL: {src}"))
    }
}

impl From<roxmltree::Error> for DtsError {
    fn from(src: roxmltree::Error) -> DtsError {
        DtsError::Xml(format!("{src}"))
    }
}

impl From<io::Error> for DtsError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => DtsError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => DtsError::PermissionDenied,
            _ => DtsError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for DtsError {
    fn from(x: fmt::Error) -> Self {
        DtsError::Io(format!("{x}"))
    }
}
