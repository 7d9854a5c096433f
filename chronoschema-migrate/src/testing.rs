//! In-memory doubles for the capability traits.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::connection::{Connector, SqlConnection};
use crate::error::{MigrateResult, MigrationError};
use crate::extract::{OutputSpec, ScriptExtractor, ScriptMode};
use crate::target::TargetDescriptor;

/// Something a mock connection observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connect(TargetDescriptor),
    Execute(String),
    Close,
}

/// Shared, ordered record of everything the mocks saw.
#[derive(Debug, Clone, Default)]
pub struct SqlLog(Arc<Mutex<Vec<Event>>>);

impl SqlLog {
    fn push(&self, event: Event) {
        self.0.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.lock().clone()
    }

    pub fn executed(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Execute(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: fn(&Event) -> bool) -> usize {
        self.0.lock().iter().filter(|e| wanted(e)).count()
    }
}

pub struct MockConnection {
    log: SqlLog,
    fail_on: Vec<String>,
    drop_after: Option<usize>,
    executed: usize,
}

impl MockConnection {
    /// A connection that rejects any batch containing one of `markers`.
    pub fn failing_on(markers: &[&str]) -> (Self, SqlLog) {
        let log = SqlLog::default();
        let conn = Self::with_log(log.clone(), markers.iter().map(|m| m.to_string()).collect());
        (conn, log)
    }

    /// A connection that is lost after `n` batches.
    pub fn dropping_after(n: usize) -> (Self, SqlLog) {
        let (mut conn, log) = Self::failing_on(&[]);
        conn.drop_after = Some(n);
        (conn, log)
    }

    fn with_log(log: SqlLog, fail_on: Vec<String>) -> Self {
        Self {
            log,
            fail_on,
            drop_after: None,
            executed: 0,
        }
    }
}

#[async_trait::async_trait]
impl SqlConnection for MockConnection {
    async fn execute(&mut self, sql: &str) -> MigrateResult<()> {
        self.log.push(Event::Execute(sql.to_string()));
        self.executed += 1;

        if self.drop_after.is_some_and(|n| self.executed > n) {
            return Err(MigrationError::connection("connection reset by peer"));
        }
        if self.fail_on.iter().any(|m| sql.contains(m.as_str())) {
            return Err(MigrationError::database(format!("rejected: {}", sql.trim())));
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> MigrateResult<()> {
        self.log.push(Event::Close);
        Ok(())
    }
}

/// Connector handing out [`MockConnection`]s that share one log.
#[derive(Default)]
pub struct MockConnector {
    pub log: SqlLog,
    fail_on: Vec<String>,
    unreachable: HashSet<String>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_on.push(marker.to_string());
        self
    }

    pub fn unreachable(mut self, server: &str) -> Self {
        self.unreachable.insert(server.to_string());
        self
    }
}

#[async_trait::async_trait]
impl Connector for MockConnector {
    async fn connect(&self, target: &TargetDescriptor) -> MigrateResult<Box<dyn SqlConnection>> {
        if self.unreachable.contains(&target.server) {
            return Err(MigrationError::connection(format!(
                "cannot reach {}",
                target.server
            )));
        }
        self.log.push(Event::Connect(target.clone()));
        Ok(Box::new(MockConnection::with_log(
            self.log.clone(),
            self.fail_on.clone(),
        )))
    }
}

/// Extractor writing canned files instead of talking to a server.
#[derive(Default)]
pub struct StubExtractor {
    /// Relative path -> contents, written in file-per-object mode.
    pub objects: BTreeMap<String, String>,
    /// Contents written in single-file mode.
    pub creation_script: String,
    /// Databases whose extraction fails.
    pub failing: HashSet<String>,
    pub calls: Mutex<Vec<(TargetDescriptor, OutputSpec)>>,
}

impl StubExtractor {
    pub fn with_objects(objects: &[(&str, &str)]) -> Self {
        Self {
            objects: objects
                .iter()
                .map(|(p, c)| (p.to_string(), c.to_string()))
                .collect(),
            creation_script: "CREATE DATABASE [x]\nGO\n".to_string(),
            ..Self::default()
        }
    }

    pub fn failing_for(mut self, database: &str) -> Self {
        self.failing.insert(database.to_string());
        self
    }
}

#[async_trait::async_trait]
impl ScriptExtractor for StubExtractor {
    async fn extract(&self, source: &TargetDescriptor, output: &OutputSpec) -> MigrateResult<()> {
        self.calls.lock().push((source.clone(), output.clone()));

        if self.failing.contains(&source.database) {
            return Err(MigrationError::extraction("scripter exited with status 1"));
        }

        match output.mode {
            ScriptMode::SingleFile => {
                if let Some(parent) = output.path.parent() {
                    tokio::fs::create_dir_all(parent).await?;
                }
                tokio::fs::write(&output.path, &self.creation_script).await?;
            }
            ScriptMode::FilePerObject => {
                for (relative, contents) in &self.objects {
                    let path = output.path.join(relative);
                    if let Some(parent) = path.parent() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                    tokio::fs::write(&path, contents).await?;
                }
            }
        }
        Ok(())
    }
}
