//! Error types for Microsoft SQL Server operations.

use chronoschema_migrate::MigrationError;
use thiserror::Error;

/// Result type for MSSQL operations.
pub type MssqlResult<T> = Result<T, MssqlError>;

/// Errors that can occur during MSSQL operations.
#[derive(Error, Debug)]
pub enum MssqlError {
    /// Tiberius/SQL Server error.
    #[error("sql server error: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Timeout error.
    #[error("operation timed out after {0}ms")]
    Timeout(u64),

    /// The scripting program failed.
    #[error("scripter error: {0}")]
    Scripter(String),
}

impl MssqlError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a scripter error.
    pub fn scripter(message: impl Into<String>) -> Self {
        Self::Scripter(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }
}

impl From<MssqlError> for MigrationError {
    fn from(err: MssqlError) -> Self {
        match err {
            MssqlError::SqlServer(e) => MigrationError::database(e.to_string()),
            MssqlError::Scripter(msg) => MigrationError::extraction(msg),
            e @ (MssqlError::Config(_) | MssqlError::Connection(_) | MssqlError::Timeout(_)) => {
                MigrationError::connection(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = MssqlError::config("invalid server address");
        assert!(matches!(err, MssqlError::Config(_)));

        let err = MssqlError::connection("connection refused");
        assert!(err.is_connection_error());

        let err = MssqlError::Timeout(5000);
        assert!(err.is_timeout());
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_into_migration_error() {
        let err: MigrationError = MssqlError::Timeout(1000).into();
        assert!(err.is_connection_error());

        let err: MigrationError = MssqlError::scripter("exit status 1").into();
        assert!(matches!(err, MigrationError::Extraction(_)));
    }

    #[test]
    fn test_error_display() {
        let err = MssqlError::config("test error");
        assert_eq!(err.to_string(), "configuration error: test error");

        let err = MssqlError::Timeout(30000);
        assert_eq!(err.to_string(), "operation timed out after 30000ms");
    }
}
