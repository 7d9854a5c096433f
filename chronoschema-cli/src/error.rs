//! CLI error types and result alias.

use chronoschema_migrate::MigrationError;
use chronoschema_mssql::MssqlError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(chronoschema::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(chronoschema::config))]
    Config(String),

    /// Malformed command-line argument
    #[error("Invalid argument: {0}")]
    #[diagnostic(
        code(chronoschema::argument),
        help("database addresses are written as [server].[database]")
    )]
    Argument(String),

    /// Migration error
    #[error("Migration error: {0}")]
    #[diagnostic(code(chronoschema::migration))]
    Migration(String),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(chronoschema::database))]
    Database(String),

    /// Command error
    #[error("Command error: {0}")]
    #[diagnostic(code(chronoschema::command))]
    Command(String),
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<MigrationError> for CliError {
    fn from(err: MigrationError) -> Self {
        match err {
            MigrationError::InvalidTarget(_) => CliError::Argument(err.to_string()),
            MigrationError::Connection(_) | MigrationError::Database(_) => {
                CliError::Database(err.to_string())
            }
            other => CliError::Migration(other.to_string()),
        }
    }
}

impl From<MssqlError> for CliError {
    fn from(err: MssqlError) -> Self {
        match err {
            MssqlError::Config(msg) => CliError::Config(msg),
            other => CliError::Database(other.to_string()),
        }
    }
}
