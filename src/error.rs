//! Error types for harvest operations

use thiserror::Error;

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Main error type for harvest operations
#[derive(Error, Debug)]
pub enum HarvestError {
    /// HTTP transport error while talking to the SPARQL endpoint
    #[error("HTTP error: {0}")]
    Http(String),

    /// The endpoint answered with a non-success status
    #[error("Endpoint error: query failed with status {status}: {body}")]
    Endpoint { status: u16, body: String },

    /// Result set could not be deserialized
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// A bound value did not parse under its declared datatype
    #[error("Conversion error: cannot parse {value:?} as {datatype}")]
    Conversion { datatype: String, value: String },

    /// Table construction or composition error
    #[error("Table error: {0}")]
    Table(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Other error
    #[error("Error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for HarvestError {
    fn from(err: reqwest::Error) -> Self {
        HarvestError::Http(err.to_string())
    }
}

impl From<serde_json::Error> for HarvestError {
    fn from(err: serde_json::Error) -> Self {
        HarvestError::Deserialization(err.to_string())
    }
}

impl From<polars::prelude::PolarsError> for HarvestError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        HarvestError::Table(err.to_string())
    }
}

impl From<std::io::Error> for HarvestError {
    fn from(err: std::io::Error) -> Self {
        HarvestError::Io(err.to_string())
    }
}

impl From<regex::Error> for HarvestError {
    fn from(err: regex::Error) -> Self {
        HarvestError::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HarvestError::Conversion {
            datatype: "http://www.w3.org/2001/XMLSchema#integer".to_string(),
            value: "abc".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Conversion error: cannot parse \"abc\" as http://www.w3.org/2001/XMLSchema#integer"
        );
    }

    #[test]
    fn test_endpoint_error_display() {
        let err = HarvestError::Endpoint {
            status: 503,
            body: "service unavailable".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("service unavailable"));
    }
}
