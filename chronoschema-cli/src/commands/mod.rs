//! CLI command implementations.

pub mod cleanup;
pub mod from_db;
pub mod migration_to_db;
pub mod new_blank;
pub mod schema_to_db;
pub mod version;

use std::path::{Path, PathBuf};

use chronoschema_migrate::{ProjectLayout, TargetDescriptor};
use chronoschema_mssql::MssqlConfig;
use tracing::debug;

use crate::cli::GlobalArgs;
use crate::config::Config;
use crate::error::CliResult;

/// Configuration and project location resolved for one command.
pub struct Context {
    /// Loaded configuration
    pub config: Config,
    /// Project base directory
    pub base_dir: PathBuf,
    global: GlobalArgs,
}

impl Context {
    /// Resolve the configuration and base directory.
    ///
    /// The config file is looked up in `--base-dir` when given, else in the
    /// current directory. The base directory is `--base-dir`, else
    /// `paths.base_dir`, else the current directory.
    pub fn load(global: &GlobalArgs, base_dir: Option<PathBuf>) -> CliResult<Self> {
        let cwd = std::env::current_dir()?;
        let search_dir = base_dir.clone().unwrap_or_else(|| cwd.clone());
        let config = Config::discover(global.config.as_deref(), &search_dir)?;

        let base_dir = base_dir
            .or_else(|| config.paths.base_dir.clone())
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| absolute(&cwd, p))
            .unwrap_or(cwd);
        debug!(base_dir = %base_dir.display(), "Resolved project base directory");

        Ok(Self {
            config,
            base_dir,
            global: global.clone(),
        })
    }

    /// Project layout under the base directory.
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.base_dir)
    }

    /// Driver configuration from the file and command-line flags.
    pub fn mssql_config(&self) -> CliResult<MssqlConfig> {
        self.config.connection.to_mssql_config(&self.global)
    }
}

fn absolute(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

/// Parse every `[server].[database]` address before any work starts.
pub fn parse_targets(addresses: &[String]) -> CliResult<Vec<TargetDescriptor>> {
    addresses
        .iter()
        .map(|a| a.parse::<TargetDescriptor>().map_err(Into::into))
        .collect()
}
