//! Error types for query execution.

use puppetdb_query::QueryError;
use thiserror::Error;

/// Errors that can occur while executing a query against PuppetDB.
#[derive(Error, Debug)]
pub enum ExecutorError {
    /// The query could not be compiled.
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    /// The base URL or endpoint path does not form a valid URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL text.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// Connection or I/O failure from the HTTP client.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        /// Response status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The response body is not a JSON array of objects.
    #[error("invalid response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// A response entry lacks a string host identity field.
    #[error("response entry {index} has no string '{key}' field")]
    MissingHostKey {
        /// Position of the entry in the response array.
        index: usize,
        /// Expected host identity field.
        key: String,
    },
}

impl ExecutorError {
    /// Returns true for errors raised by the transport (connection or status).
    pub fn is_transport(&self) -> bool {
        matches!(self, ExecutorError::Http(_) | ExecutorError::HttpStatus { .. })
    }

    /// Returns true for errors caused by an unexpected response shape.
    pub fn is_parse(&self) -> bool {
        matches!(
            self,
            ExecutorError::Parse(_) | ExecutorError::MissingHostKey { .. }
        )
    }
}

/// Result type for executor operations.
pub type ExecResult<T> = std::result::Result<T, ExecutorError>;
