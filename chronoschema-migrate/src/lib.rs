//! # chronoschema-migrate
//!
//! Schema-as-files engine for SQL Server databases.
//!
//! This crate provides functionality for:
//! - Splitting scripts into batches on `GO` separator lines
//! - Executing batches over a connection, recording failures without stopping
//! - Scripting databases through a staging tree and merging the result into
//!   the project tree
//! - Running named migration scripts, in the order given, against a server
//! - Replaying a scripted schema tree onto target databases
//! - Scaffolding blank migrations and cleaning up scripted files
//!
//! ## Architecture
//!
//! The database itself is reached only through two capability traits,
//! [`Connector`] and [`ScriptExtractor`]. Drivers implement them in their own
//! crates.
//!
//! ```text
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Source DB    │────▶│ ScriptExtractor│────▶│ .stg/<slug> │
//! └──────────────┘     └────────────────┘     └─────────────┘
//!                                                    │ reconcile
//!                                                    ▼
//! ┌──────────────┐     ┌────────────────┐     ┌─────────────┐
//! │ Target DB    │◀────│ Batch executor │◀────│ schema/     │
//! └──────────────┘     └────────────────┘     │ migrations/ │
//!                                             └─────────────┘
//! ```
//!
//! ## Project Layout
//!
//! ```text
//! <base>/
//! ├── migrations/
//! │   └── 20240309140507-add-orders.sql
//! └── schema/
//!     └── <server>/
//!         └── <database>/
//!             └── dbo.Orders.Table.sql
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use chronoschema_migrate::{MigrationRunner, ProjectLayout};
//!
//! let runner = MigrationRunner::new(connector, ProjectLayout::new("."));
//! let report = runner
//!     .run("localhost", &["20240309140507-add-orders".to_string()])
//!     .await;
//! println!("{} failed batches", report.failed_batches());
//! ```

pub mod batch;
pub mod cleanup;
pub mod connection;
pub mod deploy;
pub mod error;
pub mod executor;
pub mod extract;
pub mod layout;
pub mod reconcile;
pub mod runner;
pub mod scaffold;
pub mod slug;
pub mod stage;
pub mod target;

#[cfg(test)]
mod testing;

// Re-exports
pub use batch::{Batch, Script, split};
pub use cleanup::{CleanupOptions, CleanupReport, cleanup};
pub use connection::{Connector, SqlConnection};
pub use deploy::{DeployReport, SchemaDeployer, TargetOutcome, quote_ident};
pub use error::{MigrateResult, MigrationError};
pub use executor::{BatchOutcome, ExecutionReport, execute};
pub use extract::{OutputSpec, ScriptExtractor, ScriptMode};
pub use layout::ProjectLayout;
pub use reconcile::{PruneRoot, ReconcileReport, prune_empty_dirs, reconcile, walk_files};
pub use runner::{DEFAULT_ADMIN_DATABASE, MigrationRunner, RunReport, ScriptOutcome};
pub use scaffold::{migration_stem, new_blank};
pub use slug::slugify;
pub use stage::{SchemaStager, SourceOutcome, StageOptions, StageReport};
pub use target::TargetDescriptor;
