//! Microsoft SQL Server connections.
//!
//! Each connection is opened for a single script and closed afterwards.
//! Statements run in autocommit mode; no transaction is opened.

use async_trait::async_trait;
use chronoschema_migrate::{Connector, MigrateResult, SqlConnection, TargetDescriptor};
use tiberius::{Client, Config, SqlBrowser};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};
use tracing::{debug, info};

use crate::config::MssqlConfig;
use crate::error::{MssqlError, MssqlResult};

/// A wrapper around a SQL Server connection.
pub struct MssqlConnection {
    client: Client<Compat<TcpStream>>,
}

impl MssqlConnection {
    /// Connect using a Tiberius config, following one server redirect.
    pub async fn connect(config: Config) -> MssqlResult<Self> {
        let tcp = open_tcp(&config).await?;

        let client = match Client::connect(config.clone(), tcp.compat_write()).await {
            Ok(client) => client,
            // Azure SQL may route the login to another node.
            Err(tiberius::error::Error::Routing { host, port }) => {
                info!(host = %host, port, "Following server redirect");
                let mut config = config;
                config.host(&host);
                config.port(port);
                let tcp = open_tcp(&config).await?;
                Client::connect(config, tcp.compat_write()).await?
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self { client })
    }

    /// Execute a batch of statements and drain every result set.
    pub async fn batch_execute(&mut self, sql: &str) -> MssqlResult<()> {
        debug!(sql = %sql, "Executing batch");
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }

    /// Close the connection gracefully.
    pub async fn close_client(self) -> MssqlResult<()> {
        self.client.close().await?;
        Ok(())
    }
}

/// Open the TCP stream, asking SQL Browser for the port of a named instance.
async fn open_tcp(config: &Config) -> MssqlResult<TcpStream> {
    let tcp = TcpStream::connect_named(config)
        .await
        .map_err(|e| MssqlError::connection(format!("{}: {}", config.get_addr(), e)))?;
    tcp.set_nodelay(true).ok();
    Ok(tcp)
}

#[async_trait]
impl SqlConnection for MssqlConnection {
    async fn execute(&mut self, sql: &str) -> MigrateResult<()> {
        Ok(self.batch_execute(sql).await?)
    }

    async fn close(self: Box<Self>) -> MigrateResult<()> {
        Ok(self.close_client().await?)
    }
}

/// Opens [`MssqlConnection`]s with a shared [`MssqlConfig`].
#[derive(Debug, Clone)]
pub struct MssqlConnector {
    config: MssqlConfig,
}

impl MssqlConnector {
    /// Create a connector.
    pub fn new(config: MssqlConfig) -> Self {
        Self { config }
    }

    /// Get the connection configuration.
    pub fn config(&self) -> &MssqlConfig {
        &self.config
    }

    /// Open a connection to `target`, bounded by the configured timeout.
    pub async fn open(&self, target: &TargetDescriptor) -> MssqlResult<MssqlConnection> {
        let config = self.config.to_tiberius_config(target)?;
        let timeout = self.config.connect_timeout;

        debug!(server = %target.server, database = %target.database, "Opening connection");
        tokio::time::timeout(timeout, MssqlConnection::connect(config))
            .await
            .map_err(|_| MssqlError::Timeout(timeout.as_millis() as u64))?
    }
}

#[async_trait]
impl Connector for MssqlConnector {
    async fn connect(&self, target: &TargetDescriptor) -> MigrateResult<Box<dyn SqlConnection>> {
        let conn = self.open(target).await.map_err(|e| match e {
            // A login failure means the server was never usable.
            MssqlError::SqlServer(e) => MssqlError::connection(e.to_string()),
            other => other,
        })?;
        Ok(Box::new(conn))
    }
}
