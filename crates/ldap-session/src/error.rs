//! Directory client error types
//!
//! Error definitions with transient/permanent classification.

use thiserror::Error;

/// Error that can occur during directory operations.
#[derive(Debug, Error)]
pub enum DirectoryError {
    // Connection errors (transient)
    /// Failed to establish or use the connection to the directory server.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // Authentication errors
    /// The server rejected the bind credentials. Absorbed by the session
    /// (logged, connection stays open unauthenticated); only surfaced when
    /// a caller binds explicitly.
    #[error("bind failed: {message}")]
    BindFailed { message: String },

    // Search errors (fatal to the one search call)
    /// The search aborted on the client or transport side before the server
    /// signalled end-of-results.
    #[error("search failed: {message}")]
    SearchFailed {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server rejected or aborted the search with a non-zero result code
    /// (bad filter, insufficient access, base not found, ...).
    #[error("search rejected by server (code {rc}): {message}")]
    SearchRejected { rc: u32, message: String },

    // Data errors
    /// An objectGUID value was not exactly 16 bytes long.
    #[error("invalid objectGUID: expected 16 bytes, got {length}")]
    InvalidGuid { length: usize },

    // Configuration errors (permanent)
    /// Session configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },
}

impl DirectoryError {
    /// Check if this error is transient and the operation may succeed when
    /// reissued. The session reconnects lazily, so a retried search after a
    /// transient failure gets a fresh connection.
    pub fn is_transient(&self) -> bool {
        matches!(self, DirectoryError::ConnectionFailed { .. })
    }

    /// Check if this error is permanent and a plain retry won't help.
    pub fn is_permanent(&self) -> bool {
        !self.is_transient()
    }

    /// Get an error code for classification.
    pub fn error_code(&self) -> &'static str {
        match self {
            DirectoryError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            DirectoryError::BindFailed { .. } => "BIND_FAILED",
            DirectoryError::SearchFailed { .. } => "SEARCH_FAILED",
            DirectoryError::SearchRejected { .. } => "SEARCH_REJECTED",
            DirectoryError::InvalidGuid { .. } => "INVALID_GUID",
            DirectoryError::InvalidConfiguration { .. } => "INVALID_CONFIG",
        }
    }

    // Convenience constructors

    /// Create a connection failed error.
    pub fn connection_failed(message: impl Into<String>) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection failed error with source.
    pub fn connection_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::ConnectionFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a bind failed error.
    pub fn bind_failed(message: impl Into<String>) -> Self {
        DirectoryError::BindFailed {
            message: message.into(),
        }
    }

    /// Create a search failed error.
    pub fn search_failed(message: impl Into<String>) -> Self {
        DirectoryError::SearchFailed {
            message: message.into(),
            source: None,
        }
    }

    /// Create a search failed error with source.
    pub fn search_failed_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        DirectoryError::SearchFailed {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a server-rejected search error.
    pub fn search_rejected(rc: u32, message: impl Into<String>) -> Self {
        DirectoryError::SearchRejected {
            rc,
            message: message.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        DirectoryError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Result type for directory operations.
pub type DirectoryResult<T> = Result<T, DirectoryError>;
