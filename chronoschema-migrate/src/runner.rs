//! Running named migrations against a server.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::batch::Script;
use crate::connection::Connector;
use crate::error::{MigrateResult, MigrationError};
use crate::executor::{ExecutionReport, execute};
use crate::layout::ProjectLayout;
use crate::target::TargetDescriptor;

/// Database used when a script is not bound to a specific one.
pub const DEFAULT_ADMIN_DATABASE: &str = "master";

/// Outcome of running one script file.
#[derive(Debug)]
pub struct ScriptOutcome {
    /// The script file.
    pub path: PathBuf,
    /// Batch outcomes, or the error that prevented execution.
    pub result: MigrateResult<ExecutionReport>,
}

impl ScriptOutcome {
    /// Check if the script ran and every batch succeeded.
    pub fn is_success(&self) -> bool {
        self.result.as_ref().is_ok_and(ExecutionReport::is_success)
    }
}

/// Outcome of a migration run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per requested migration, in request order.
    pub outcomes: Vec<ScriptOutcome>,
}

impl RunReport {
    /// Number of migrations that could not be executed at all.
    pub fn fatal_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Total number of failed batches across executed migrations.
    pub fn failed_batches(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(ExecutionReport::failure_count)
            .sum()
    }
}

/// Runs migration scripts from `<base>/migrations`.
pub struct MigrationRunner<C> {
    connector: C,
    layout: ProjectLayout,
    admin_database: String,
}

impl<C: Connector> MigrationRunner<C> {
    /// Create a runner.
    pub fn new(connector: C, layout: ProjectLayout) -> Self {
        Self {
            connector,
            layout,
            admin_database: DEFAULT_ADMIN_DATABASE.to_string(),
        }
    }

    /// Use another database as the connection's initial database.
    pub fn with_admin_database(mut self, database: impl Into<String>) -> Self {
        self.admin_database = database.into();
        self
    }

    /// Run `migrations` against `server`, in exactly the order given.
    ///
    /// Each migration gets its own connection. A migration that cannot be
    /// read or connected for is reported and the run moves on.
    pub async fn run(&self, server: &str, migrations: &[String]) -> RunReport {
        let target = TargetDescriptor::new(server, self.admin_database.clone());
        let mut report = RunReport::default();

        for name in migrations {
            let path = self.layout.migration_path(name);
            let result = run_script(&self.connector, &target, &path).await;
            match &result {
                Ok(execution) => info!(migration = %name, "{}", execution.summary()),
                Err(e) => error!(migration = %name, error = %e, "Migration not executed"),
            }
            report.outcomes.push(ScriptOutcome { path, result });
        }

        report
    }
}

/// Read, split and execute one script over a fresh connection to `target`.
///
/// The connection is closed whether or not individual batches failed.
pub(crate) async fn run_script(
    connector: &dyn Connector,
    target: &TargetDescriptor,
    path: &Path,
) -> MigrateResult<ExecutionReport> {
    let script = Script::read(path).await.map_err(|e| match e {
        MigrationError::Path { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
            MigrationError::NotFound(path.display().to_string())
        }
        other => other,
    })?;
    let batches = script.batches();

    info!(server = %target.server, script = %path.display(), "Connecting");
    let mut conn = connector.connect(target).await?;

    info!(batches = batches.len(), "Executing batches");
    let execution = execute(&mut *conn, &batches).await;

    if let Err(e) = conn.close().await {
        warn!(error = %e, "Failed to close connection cleanly");
    }

    Ok(execution)
}
