//! CLI configuration handling.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chronoschema_mssql::{EncryptionMode, MssqlConfig};

use crate::cli::GlobalArgs;
use crate::error::{CliError, CliResult};

/// Default config file name (lives in the project base directory)
pub const CONFIG_FILE_NAME: &str = "chronoschema.toml";

/// chronoschema configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQL Server connection settings
    pub connection: ConnectionConfig,

    /// Schema scripter settings
    pub scripter: ScripterConfig,

    /// Project paths
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load `explicit` if given, else `<dir>/chronoschema.toml` if present,
    /// else the defaults.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> CliResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            Self::load(&config_path)
        } else {
            Ok(Self::default())
        }
    }
}

/// Connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// SQL Server login name
    pub username: Option<String>,

    /// SQL Server login password
    pub password: Option<String>,

    /// Use Windows Authentication (defaults to true without a username)
    pub windows_auth: Option<bool>,

    /// Port used when a server address does not name one
    pub port: u16,

    /// Encryption mode (on, off, required, not_supported)
    pub encrypt: String,

    /// Trust the server certificate without validation
    pub trust_cert: bool,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Application name reported to the server
    pub application_name: String,

    /// Database each migration and deployment connection starts in
    pub admin_database: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            windows_auth: None,
            port: 1433,
            encrypt: "on".to_string(),
            trust_cert: false,
            connect_timeout_secs: 30,
            application_name: "chronoschema".to_string(),
            admin_database: chronoschema_migrate::DEFAULT_ADMIN_DATABASE.to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Build the driver configuration, letting command-line flags win.
    pub fn to_mssql_config(&self, global: &GlobalArgs) -> CliResult<MssqlConfig> {
        let mut builder = MssqlConfig::builder()
            .port(self.port)
            .encryption(EncryptionMode::parse(&self.encrypt)?)
            .trust_cert(self.trust_cert || global.trust_cert)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .application_name(&self.application_name);

        let username = global.username.as_ref().or(self.username.as_ref());
        let password = global.password.as_ref().or(self.password.as_ref());

        if let Some(username) = username {
            builder = builder.username(username);
        }
        if let Some(password) = password {
            builder = builder.password(password);
        }
        // An explicit login on the command line beats a configured windows_auth.
        if let (Some(windows_auth), None) = (self.windows_auth, &global.username) {
            builder = builder.windows_auth(windows_auth);
        }

        Ok(builder.build()?)
    }
}

/// Scripter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScripterConfig {
    /// Scripter executable
    pub program: String,

    /// Extra arguments appended to every scripter invocation
    pub extra_args: Vec<String>,
}

impl Default for ScripterConfig {
    fn default() -> Self {
        Self {
            program: chronoschema_mssql::scripter::DEFAULT_PROGRAM.to_string(),
            extra_args: Vec::new(),
        }
    }
}

/// Path configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Project base directory (empty means the current directory)
    pub base_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.connection.port, 1433);
        assert_eq!(config.connection.admin_database, "master");
        assert_eq!(config.scripter.program, "mssql-scripter");
        assert!(config.paths.base_dir.is_none());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str(
            r#"
            [connection]
            username = "deploy"
            trust_cert = true

            [scripter]
            extra_args = ["--display-progress"]
            "#,
        )
        .unwrap();

        assert_eq!(config.connection.username.as_deref(), Some("deploy"));
        assert!(config.connection.trust_cert);
        assert_eq!(config.connection.connect_timeout_secs, 30);
        assert_eq!(config.scripter.program, "mssql-scripter");
        assert_eq!(config.scripter.extra_args, vec!["--display-progress"]);
    }

    #[test]
    fn test_flags_override_file() {
        let connection = ConnectionConfig {
            username: Some("file".to_string()),
            password: Some("file-pass".to_string()),
            ..ConnectionConfig::default()
        };
        let global = GlobalArgs {
            username: Some("flag".to_string()),
            password: Some("flag-pass".to_string()),
            trust_cert: true,
            ..GlobalArgs::default()
        };

        let mssql = connection.to_mssql_config(&global).unwrap();
        assert_eq!(mssql.username.as_deref(), Some("flag"));
        assert_eq!(mssql.password.as_deref(), Some("flag-pass"));
        assert!(mssql.trust_cert);
        assert!(!mssql.windows_auth);
    }

    #[test]
    fn test_windows_auth_without_credentials() {
        let mssql = ConnectionConfig::default()
            .to_mssql_config(&GlobalArgs::default())
            .unwrap();
        assert!(mssql.windows_auth);
        assert!(mssql.username.is_none());
    }

    #[test]
    fn test_unknown_encryption_is_rejected() {
        let connection = ConnectionConfig {
            encrypt: "sometimes".to_string(),
            ..ConnectionConfig::default()
        };
        assert!(connection.to_mssql_config(&GlobalArgs::default()).is_err());
    }

    #[test]
    fn test_discover_missing_file_uses_defaults() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::discover(None, temp.path()).unwrap();
        assert_eq!(config.connection.port, 1433);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let missing = temp.path().join("nope.toml");
        assert!(Config::discover(Some(&missing), temp.path()).is_err());
    }
}
