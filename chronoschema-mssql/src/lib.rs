//! # chronoschema-mssql
//!
//! Microsoft SQL Server backend for chronoschema.
//!
//! This crate provides:
//! - [`MssqlConnector`], opening `tiberius` connections for batch execution
//! - [`MssqlScripter`], scripting databases with the `mssql-scripter` program
//! - [`MssqlConfig`], the connection settings shared by both
//!
//! ## Example
//!
//! ```rust,ignore
//! use chronoschema_migrate::{MigrationRunner, ProjectLayout};
//! use chronoschema_mssql::{MssqlConfig, MssqlConnector};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = MssqlConfig::builder()
//!         .username("sa")
//!         .password("YourPassword123!")
//!         .trust_cert(true)
//!         .build()?;
//!
//!     let runner = MigrationRunner::new(MssqlConnector::new(config), ProjectLayout::new("."));
//!     let report = runner.run("localhost", &["20240309140507-add-orders".into()]).await;
//!     println!("{} failed batches", report.failed_batches());
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod scripter;

pub use config::{EncryptionMode, MssqlConfig, MssqlConfigBuilder, ServerAddress};
pub use connection::{MssqlConnection, MssqlConnector};
pub use error::{MssqlError, MssqlResult};
pub use scripter::MssqlScripter;
