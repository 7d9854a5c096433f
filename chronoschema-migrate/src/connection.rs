//! Database capability traits.
//!
//! The core only needs to open a connection to a server and submit SQL text
//! over it. Driver-specific implementations live in their own crates.

use crate::error::MigrateResult;
use crate::target::TargetDescriptor;

/// An open connection that can run statement batches.
#[async_trait::async_trait]
pub trait SqlConnection: Send {
    /// Execute one batch of SQL text, draining any results.
    async fn execute(&mut self, sql: &str) -> MigrateResult<()>;

    /// Close the connection gracefully.
    async fn close(self: Box<Self>) -> MigrateResult<()>;
}

/// Opens connections to a server.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Open a connection to `target.server`, using `target.database` as the
    /// initial database.
    async fn connect(&self, target: &TargetDescriptor) -> MigrateResult<Box<dyn SqlConnection>>;
}
