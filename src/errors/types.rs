//! Error type definitions
//!
//! `SourceError` carries only owned strings so that a failure can be stored in
//! the per-source status report and cloned into run summaries.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// File system errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output document generation errors
    #[error("Output error: {message}")]
    Output { message: String },

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Errors raised while loading the channel catalog input
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The catalog file does not exist
    #[error("Catalog not found: {path}")]
    NotFound { path: PathBuf },

    /// The catalog file exists but could not be read
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The catalog file is not a valid catalog document
    #[error("Malformed catalog {path}: {message}")]
    Malformed { path: PathBuf, message: String },
}

/// Failure of a single feed source
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network level failure while fetching
    #[error("Fetch failed: {url} - {message}")]
    Fetch { url: String, message: String },

    /// The fetch did not complete within the configured timeout
    #[error("Connection timeout: {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status
    #[error("HTTP error: {status} - {url}")]
    HttpStatus { url: String, status: u16 },

    /// The payload could not be decompressed
    #[error("Decompression failed: {url} - {message}")]
    Decompress { url: String, message: String },

    /// The payload is not a well-formed guide document
    #[error("Parse error: {url} - {message}")]
    Parse { url: String, message: String },
}

/// Coarse classification of a source failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Fetch,
    Decompress,
    Parse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Fetch => "fetch",
            FailureKind::Decompress => "decompress",
            FailureKind::Parse => "parse",
        };
        f.write_str(label)
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an output generation error
    pub fn output<S: Into<String>>(message: S) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

impl SourceError {
    pub fn fetch<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn decompress<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Decompress {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn parse<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Parse {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Which pipeline step produced this failure
    pub fn kind(&self) -> FailureKind {
        match self {
            SourceError::Fetch { .. }
            | SourceError::Timeout { .. }
            | SourceError::HttpStatus { .. } => FailureKind::Fetch,
            SourceError::Decompress { .. } => FailureKind::Decompress,
            SourceError::Parse { .. } => FailureKind::Parse,
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::configuration(format!("Invalid configuration file: {err}"))
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::configuration(format!("Failed to serialize configuration: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_kind() {
        assert_eq!(
            SourceError::Timeout { url: "http://a".into() }.kind(),
            FailureKind::Fetch
        );
        assert_eq!(
            SourceError::HttpStatus { url: "http://a".into(), status: 404 }.kind(),
            FailureKind::Fetch
        );
        assert_eq!(
            SourceError::decompress("http://a", "bad header").kind(),
            FailureKind::Decompress
        );
        assert_eq!(
            SourceError::parse("http://a", "unexpected eof").kind(),
            FailureKind::Parse
        );
    }

    #[test]
    fn test_error_display() {
        let err = SourceError::HttpStatus {
            url: "http://example.com/epg.xml".into(),
            status: 503,
        };
        assert_eq!(err.to_string(), "HTTP error: 503 - http://example.com/epg.xml");
        assert_eq!(
            AppError::configuration("bad value").to_string(),
            "Configuration error: bad value"
        );
        assert_eq!(FailureKind::Decompress.to_string(), "decompress");
    }
}
