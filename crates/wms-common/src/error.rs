//! Error types for the mapbook WMS crates.

use thiserror::Error;

/// Result type alias using WmsError.
pub type WmsResult<T> = Result<T, WmsError>;

/// Primary error type for mapbook and WMS operations.
///
/// Layer operations themselves degrade to defaults instead of failing;
/// these errors come from loading mapbooks, settings and source types.
#[derive(Debug, Error)]
pub enum WmsError {
    // === Request Value Errors ===
    #[error("Invalid CRS: {0}")]
    InvalidCrs(String),

    #[error("Invalid BBOX: {0}")]
    InvalidBbox(String),

    // === Mapbook Errors ===
    #[error("Malformed mapbook: {0}")]
    MapbookError(String),

    #[error("Unknown map source type: {0}")]
    UnknownSourceType(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

// Conversion from common error types
impl From<std::io::Error> for WmsError {
    fn from(err: std::io::Error) -> Self {
        WmsError::InternalError(err.to_string())
    }
}

impl From<serde_yaml::Error> for WmsError {
    fn from(err: serde_yaml::Error) -> Self {
        WmsError::ConfigError(format!("YAML error: {}", err))
    }
}

impl From<crate::bbox::BboxParseError> for WmsError {
    fn from(err: crate::bbox::BboxParseError) -> Self {
        WmsError::InvalidBbox(err.to_string())
    }
}

impl From<crate::crs::CrsParseError> for WmsError {
    fn from(err: crate::crs::CrsParseError) -> Self {
        WmsError::InvalidCrs(err.to_string())
    }
}
