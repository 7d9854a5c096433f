//! Deploying a scripted schema tree to target databases.
//!
//! Scripts are executed in directory-walk order. No attempt is made to order
//! object creation by dependency, so a script may fail because an object it
//! references is created by a later file.

use tracing::{error, info, warn};

use crate::connection::Connector;
use crate::error::{MigrateResult, MigrationError};
use crate::layout::{ProjectLayout, is_script};
use crate::reconcile::walk_files;
use crate::runner::{DEFAULT_ADMIN_DATABASE, ScriptOutcome, run_script};
use crate::target::TargetDescriptor;

/// Outcome for one deployment target.
#[derive(Debug)]
pub struct TargetOutcome {
    /// The target database.
    pub target: TargetDescriptor,
    /// Whether the database was dropped first.
    pub dropped: bool,
    /// One entry per executed script file.
    pub scripts: Vec<ScriptOutcome>,
    /// Error that stopped processing of this target.
    pub error: Option<MigrationError>,
}

impl TargetOutcome {
    fn new(target: &TargetDescriptor) -> Self {
        Self {
            target: target.clone(),
            dropped: false,
            scripts: Vec::new(),
            error: None,
        }
    }

    /// Check if every script ran and every batch succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.scripts.iter().all(ScriptOutcome::is_success)
    }
}

/// Outcome of a deployment.
#[derive(Debug, Default)]
pub struct DeployReport {
    /// One entry per target, in request order.
    pub targets: Vec<TargetOutcome>,
}

impl DeployReport {
    /// Number of targets whose processing was aborted.
    pub fn fatal_count(&self) -> usize {
        self.targets.iter().filter(|t| t.error.is_some()).count()
    }
}

/// Quote a SQL Server identifier with brackets.
pub fn quote_ident(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Replays `<base>/schema/<server>/<database>` onto live servers.
pub struct SchemaDeployer<C> {
    connector: C,
    layout: ProjectLayout,
    admin_database: String,
}

impl<C: Connector> SchemaDeployer<C> {
    /// Create a deployer.
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

    /// Deploy every target in turn.
    ///
    /// With `overwrite`, the target database is dropped before any script
    /// runs. A target whose server cannot be reached is abandoned and the
    /// next target is processed.
    pub async fn deploy(&self, targets: &[TargetDescriptor], overwrite: bool) -> DeployReport {
        let mut report = DeployReport::default();

        for target in targets {
            let mut outcome = TargetOutcome::new(target);
            if let Err(e) = self.deploy_target(target, overwrite, &mut outcome).await {
                error!(target = %target, error = %e, "Deployment aborted");
                outcome.error = Some(e);
            }
            report.targets.push(outcome);
        }

        report
    }

    async fn deploy_target(
        &self,
        target: &TargetDescriptor,
        overwrite: bool,
        outcome: &mut TargetOutcome,
    ) -> MigrateResult<()> {
        let schema_dir = self.layout.schema_dir(target);
        let scripts: Vec<_> = walk_files(&schema_dir)
            .await?
            .into_iter()
            .filter(|p| is_script(p))
            .collect();

        if scripts.is_empty() {
            return Err(MigrationError::other(format!(
                "no schema scripts under {}",
                schema_dir.display()
            )));
        }

        let admin = target.with_database(self.admin_database.clone());

        if overwrite {
            self.drop_database(&admin, &target.database).await?;
            outcome.dropped = true;
        }

        info!(target = %target, scripts = scripts.len(), "Deploying schema");
        for path in scripts {
            let result = match run_script(&self.connector, &admin, &path).await {
                Err(e) if e.is_connection_error() => return Err(e),
                result => result,
            };
            match &result {
                Ok(execution) => info!(script = %path.display(), "{}", execution.summary()),
                Err(e) => warn!(script = %path.display(), error = %e, "Script not executed"),
            }
            outcome.scripts.push(ScriptOutcome { path, result });
        }

        Ok(())
    }

    async fn drop_database(&self, admin: &TargetDescriptor, database: &str) -> MigrateResult<()> {
        info!(database = %database, "Dropping database if it exists");
        let mut conn = self.connector.connect(admin).await?;
        let result = conn
            .execute(&format!("DROP DATABASE IF EXISTS {};", quote_ident(database)))
            .await;
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close connection cleanly");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Event, MockConnector};
    use tempfile::TempDir;

    fn write_schema(layout: &ProjectLayout, target: &TargetDescriptor, files: &[(&str, &str)]) {
        let dir = layout.schema_dir(target);
        for (name, sql) in files {
            let path = dir.join(name);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, sql).unwrap();
        }
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("Sales"), "[Sales]");
        assert_eq!(quote_ident("odd]name"), "[odd]]name]");
    }

    #[tokio::test]
    async fn test_overwrite_drops_before_creation_batches() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let target = TargetDescriptor::new("srv", "Sales");
        write_schema(
            &layout,
            &target,
            &[
                ("Sales.Database.sql", "CREATE DATABASE [Sales]\nGO\n"),
                ("tables/dbo.T.Table.sql", "USE [Sales]\nGO\nCREATE TABLE T (id INT)\nGO\n"),
            ],
        );

        let deployer = SchemaDeployer::new(MockConnector::new(), layout);
        let report = deployer.deploy(&[target], true).await;

        assert_eq!(report.fatal_count(), 0);
        assert!(report.targets[0].dropped);
        let executed = deployer.connector.log.executed();
        assert_eq!(executed[0], "DROP DATABASE IF EXISTS [Sales];");
        assert_eq!(executed.len(), 4);
        assert_eq!(
            deployer.connector.log.count(|e| matches!(e, Event::Close)),
            3
        );
    }

    #[tokio::test]
    async fn test_without_overwrite_nothing_is_dropped() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let target = TargetDescriptor::new("srv", "Sales");
        write_schema(&layout, &target, &[("a.sql", "SELECT 1\nGO\n")]);

        let deployer = SchemaDeployer::new(MockConnector::new(), layout);
        let report = deployer.deploy(&[target], false).await;

        assert!(report.targets[0].is_success());
        assert!(!report.targets[0].dropped);
        assert!(
            deployer
                .connector
                .log
                .executed()
                .iter()
                .all(|sql| !sql.starts_with("DROP DATABASE"))
        );
    }

    #[tokio::test]
    async fn test_one_connection_per_file_on_admin_database() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let target = TargetDescriptor::new("srv", "Sales");
        write_schema(
            &layout,
            &target,
            &[
                ("a.sql", "A\nGO\n"),
                ("b.sql", "B\nGO\n"),
                ("readme.txt", "ignored"),
            ],
        );

        let deployer = SchemaDeployer::new(MockConnector::new(), layout);
        let report = deployer.deploy(&[target], false).await;

        assert_eq!(report.targets[0].scripts.len(), 2);
        let connects: Vec<_> = deployer
            .connector
            .log
            .events()
            .into_iter()
            .filter(|e| matches!(e, Event::Connect(_)))
            .collect();
        assert_eq!(
            connects,
            vec![
                Event::Connect(TargetDescriptor::new("srv", "master")),
                Event::Connect(TargetDescriptor::new("srv", "master")),
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_batches_do_not_abort_target() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let target = TargetDescriptor::new("srv", "Sales");
        write_schema(
            &layout,
            &target,
            &[("a.sql", "BAD\nGO\n"), ("b.sql", "GOOD\nGO\n")],
        );

        let deployer = SchemaDeployer::new(MockConnector::new().failing_on("BAD"), layout);
        let report = deployer.deploy(&[target], false).await;

        let outcome = &report.targets[0];
        assert!(outcome.error.is_none());
        assert_eq!(outcome.scripts.len(), 2);
        assert!(!outcome.scripts[0].is_success());
        assert!(outcome.scripts[1].is_success());
    }

    #[tokio::test]
    async fn test_unreachable_target_moves_to_next() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let down = TargetDescriptor::new("down", "Sales");
        let up = TargetDescriptor::new("up", "Sales");
        write_schema(&layout, &down, &[("a.sql", "A\nGO\n"), ("b.sql", "B\nGO\n")]);
        write_schema(&layout, &up, &[("a.sql", "A\nGO\n")]);

        let deployer = SchemaDeployer::new(MockConnector::new().unreachable("down"), layout);
        let report = deployer.deploy(&[down, up], false).await;

        assert_eq!(report.fatal_count(), 1);
        assert!(matches!(
            report.targets[0].error,
            Some(MigrationError::Connection(_))
        ));
        assert!(report.targets[0].scripts.is_empty());
        assert!(report.targets[1].is_success());
    }

    #[tokio::test]
    async fn test_missing_schema_tree_never_drops() {
        let temp = TempDir::new().unwrap();
        let layout = ProjectLayout::new(temp.path());
        let target = TargetDescriptor::new("srv", "Ghost");

        let deployer = SchemaDeployer::new(MockConnector::new(), layout);
        let report = deployer.deploy(&[target], true).await;

        assert_eq!(report.fatal_count(), 1);
        assert!(!report.targets[0].dropped);
        assert!(deployer.connector.log.events().is_empty());
    }
}
