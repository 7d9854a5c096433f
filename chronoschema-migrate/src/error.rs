//! Error types for schema extraction and migration execution.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrationError>;

/// Errors that can occur during extraction, reconciliation or execution.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File system error tied to a specific path.
    #[error("I/O error at '{}': {source}", path.display())]
    Path {
        /// Path that was being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Could not open a connection to the server.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected a statement batch.
    #[error("Database error: {0}")]
    Database(String),

    /// Malformed `[server].[database]` address.
    #[error("Invalid target address '{0}': expected [server].[database]")]
    InvalidTarget(String),

    /// The external scripting engine failed.
    #[error("Script extraction failed: {0}")]
    Extraction(String),

    /// Migration file not found.
    #[error("Migration '{0}' not found")]
    NotFound(String),

    /// Invalid glob or regex pattern.
    #[error("Invalid pattern: {0}")]
    Pattern(String),

    /// General migration error.
    #[error("Migration error: {0}")]
    Other(String),
}

impl MigrationError {
    /// Attach a path to an I/O error.
    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a database error.
    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    /// Create an extraction error.
    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    /// Create a pattern error.
    pub fn pattern(msg: impl Into<String>) -> Self {
        Self::Pattern(msg.into())
    }

    /// Create an other error.
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Check if this error means the server could not be reached.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrationError::NotFound("20240101120000-init".to_string());
        assert!(err.to_string().contains("20240101120000-init"));
    }

    #[test]
    fn test_path_error_display() {
        let err = MigrationError::path(
            "schema/a.sql",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("schema/a.sql"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_is_connection_error() {
        assert!(MigrationError::connection("refused").is_connection_error());
        assert!(!MigrationError::database("syntax").is_connection_error());
    }
}
