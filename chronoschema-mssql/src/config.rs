//! Microsoft SQL Server connection configuration.
//!
//! The settings here apply to every server a command talks to. The server
//! and database come from the [`TargetDescriptor`] of each connection.

use std::time::Duration;

use chronoschema_migrate::TargetDescriptor;
use tiberius::{AuthMethod, Config, EncryptionLevel};

use crate::error::{MssqlError, MssqlResult};

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Microsoft SQL Server connection configuration.
#[derive(Debug, Clone)]
pub struct MssqlConfig {
    /// Server port used when the address does not name one (default: 1433).
    pub port: u16,
    /// Username for SQL Server authentication.
    pub username: Option<String>,
    /// Password for SQL Server authentication.
    pub password: Option<String>,
    /// Use Windows Authentication (Integrated Security).
    pub windows_auth: bool,
    /// Encryption level.
    pub encryption: EncryptionMode,
    /// Trust server certificate.
    pub trust_cert: bool,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Application name (shown in sys.dm_exec_sessions).
    pub application_name: Option<String>,
}

/// Encryption mode for connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncryptionMode {
    /// Encryption is off.
    Off,
    /// Encryption is on.
    #[default]
    On,
    /// Encryption is required.
    Required,
    /// Don't use encryption.
    NotSupported,
}

impl EncryptionMode {
    /// Parse a configuration value such as `on`, `off` or `required`.
    pub fn parse(value: &str) -> MssqlResult<Self> {
        match value.to_lowercase().as_str() {
            "true" | "yes" | "on" | "mandatory" => Ok(Self::On),
            "false" | "no" | "off" | "optional" => Ok(Self::Off),
            "required" | "strict" => Ok(Self::Required),
            "not_supported" | "notsupported" => Ok(Self::NotSupported),
            other => Err(MssqlError::config(format!(
                "unknown encryption mode '{}'",
                other
            ))),
        }
    }
}

impl From<EncryptionMode> for EncryptionLevel {
    fn from(mode: EncryptionMode) -> Self {
        match mode {
            EncryptionMode::Off => EncryptionLevel::Off,
            EncryptionMode::On => EncryptionLevel::On,
            EncryptionMode::Required => EncryptionLevel::Required,
            EncryptionMode::NotSupported => EncryptionLevel::NotSupported,
        }
    }
}

impl Default for MssqlConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            username: None,
            password: None,
            windows_auth: true,
            encryption: EncryptionMode::On,
            trust_cert: false,
            connect_timeout: Duration::from_secs(30),
            application_name: Some("chronoschema".to_string()),
        }
    }
}

/// A server address as written in a target: `host`, `host,port` or
/// `host\instance`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress {
    /// Host name or IP address.
    pub host: String,
    /// Explicit port, if the address names one.
    pub port: Option<u16>,
    /// Named instance, resolved through the SQL Browser service.
    pub instance: Option<String>,
}

impl ServerAddress {
    /// Parse a server address.
    pub fn parse(value: &str) -> MssqlResult<Self> {
        let value = value.trim();

        let (host, port, instance) = if let Some((host, instance)) = value.split_once('\\') {
            (host, None, Some(instance.to_string()))
        } else if let Some((host, port)) = value.split_once(',') {
            let port = port
                .trim()
                .parse()
                .map_err(|_| MssqlError::config(format!("invalid port in '{}'", value)))?;
            (host, Some(port), None)
        } else {
            (value, None, None)
        };

        let host = host.trim();
        if host.is_empty() {
            return Err(MssqlError::config(format!(
                "missing host in server address '{}'",
                value
            )));
        }

        Ok(Self {
            host: host.to_string(),
            port,
            instance,
        })
    }
}

impl MssqlConfig {
    /// Create a builder for configuration.
    pub fn builder() -> MssqlConfigBuilder {
        MssqlConfigBuilder::new()
    }

    /// Convert to a Tiberius Config for `target`.
    pub fn to_tiberius_config(&self, target: &TargetDescriptor) -> MssqlResult<Config> {
        let address = ServerAddress::parse(&target.server)?;
        let mut config = Config::new();

        config.host(&address.host);
        config.port(address.port.unwrap_or(self.port));
        config.database(&target.database);

        if let Some(ref app_name) = self.application_name {
            config.application_name(app_name);
        }

        if let Some(ref instance) = address.instance {
            config.instance_name(instance);
        }

        // Set authentication method
        if let (Some(user), Some(pass)) = (&self.username, &self.password) {
            config.authentication(AuthMethod::sql_server(user, pass));
        } else if self.windows_auth {
            #[cfg(windows)]
            {
                config.authentication(AuthMethod::Integrated);
            }
            #[cfg(not(windows))]
            {
                return Err(MssqlError::config(
                    "Windows Authentication is only supported on Windows",
                ));
            }
        } else {
            return Err(MssqlError::config(
                "either username/password or Windows Authentication is required",
            ));
        }

        // Set encryption
        config.encryption(self.encryption.into());

        if self.trust_cert {
            config.trust_cert();
        }

        Ok(config)
    }

    /// Generate an ADO.NET style connection string for `target`.
    pub fn to_connection_string(&self, target: &TargetDescriptor) -> String {
        let mut parts = vec![
            format!("Server={}", target.server),
            format!("Database={}", target.database),
        ];

        if self.port != DEFAULT_PORT && !target.server.contains([',', '\\']) {
            parts[0] = format!("Server={},{}", target.server, self.port);
        }

        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => {
                parts.push(format!("User Id={}", user));
                parts.push(format!("Password={}", pass));
            }
            _ => parts.push("Trusted_Connection=yes".to_string()),
        }

        match self.encryption {
            EncryptionMode::On => parts.push("Encrypt=True".to_string()),
            EncryptionMode::Off | EncryptionMode::NotSupported => {
                parts.push("Encrypt=False".to_string())
            }
            EncryptionMode::Required => parts.push("Encrypt=Strict".to_string()),
        }

        if self.trust_cert {
            parts.push("TrustServerCertificate=True".to_string());
        }

        if let Some(ref app_name) = self.application_name {
            parts.push(format!("Application Name={}", app_name));
        }

        let mut conn_str = parts.join(";");
        conn_str.push(';');
        conn_str
    }
}

/// Builder for Microsoft SQL Server configuration.
#[derive(Debug, Default)]
pub struct MssqlConfigBuilder {
    port: Option<u16>,
    username: Option<String>,
    password: Option<String>,
    windows_auth: Option<bool>,
    encryption: Option<EncryptionMode>,
    trust_cert: bool,
    connect_timeout: Option<Duration>,
    application_name: Option<String>,
}

impl MssqlConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default server port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the username for SQL Server authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set the password for SQL Server authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Use Windows Authentication (Integrated Security).
    pub fn windows_auth(mut self, enabled: bool) -> Self {
        self.windows_auth = Some(enabled);
        self
    }

    /// Set the encryption mode.
    pub fn encryption(mut self, mode: EncryptionMode) -> Self {
        self.encryption = Some(mode);
        self
    }

    /// Trust the server certificate.
    pub fn trust_cert(mut self, trust: bool) -> Self {
        self.trust_cert = trust;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the application name.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// Windows Authentication is used unless a username is given.
    pub fn build(self) -> MssqlResult<MssqlConfig> {
        let windows_auth = self.windows_auth.unwrap_or(self.username.is_none());

        if !windows_auth && (self.username.is_none() || self.password.is_none()) {
            return Err(MssqlError::config(
                "username and password are required for SQL Server authentication",
            ));
        }

        Ok(MssqlConfig {
            port: self.port.unwrap_or(DEFAULT_PORT),
            username: self.username,
            password: self.password,
            windows_auth,
            encryption: self.encryption.unwrap_or_default(),
            trust_cert: self.trust_cert,
            connect_timeout: self.connect_timeout.unwrap_or(Duration::from_secs(30)),
            application_name: self
                .application_name
                .or(Some("chronoschema".to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sql_login() -> MssqlConfig {
        MssqlConfig::builder()
            .username("sa")
            .password("Password123!")
            .build()
            .unwrap()
    }

    #[test]
    fn test_server_address_plain() {
        let addr = ServerAddress::parse("localhost").unwrap();
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.port, None);
        assert_eq!(addr.instance, None);
    }

    #[test]
    fn test_server_address_with_instance() {
        let addr = ServerAddress::parse("localhost\\SQLEXPRESS").unwrap();
        assert_eq!(addr.host, "localhost");
        assert_eq!(addr.instance, Some("SQLEXPRESS".to_string()));
    }

    #[test]
    fn test_server_address_with_port() {
        let addr = ServerAddress::parse("db.internal,1434").unwrap();
        assert_eq!(addr.host, "db.internal");
        assert_eq!(addr.port, Some(1434));
    }

    #[test]
    fn test_server_address_errors() {
        assert!(ServerAddress::parse("host,notaport").is_err());
        assert!(ServerAddress::parse(",1433").is_err());
    }

    #[test]
    fn test_config_builder_defaults_to_windows_auth() {
        let config = MssqlConfig::builder().build().unwrap();
        assert!(config.windows_auth);
        assert_eq!(config.port, 1433);
        assert_eq!(config.application_name, Some("chronoschema".to_string()));
    }

    #[test]
    fn test_config_builder_requires_password_for_sql_login() {
        let result = MssqlConfig::builder().username("sa").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = MssqlConfig::builder()
            .port(1434)
            .username("sa")
            .password("Password123!")
            .trust_cert(true)
            .build()
            .unwrap();

        assert_eq!(config.port, 1434);
        assert!(!config.windows_auth);
        assert!(config.trust_cert);
    }

    #[test]
    fn test_tiberius_config_uses_target() {
        let target = TargetDescriptor::new("localhost,1500", "master");
        let config = sql_login().to_tiberius_config(&target).unwrap();
        assert_eq!(config.get_addr(), "localhost:1500");
    }

    #[test]
    fn test_tiberius_config_default_port() {
        let target = TargetDescriptor::new("localhost", "master");
        let config = sql_login().to_tiberius_config(&target).unwrap();
        assert_eq!(config.get_addr(), "localhost:1433");
    }

    #[test]
    fn test_connection_string_trusted() {
        let config = MssqlConfig::default();
        let target = TargetDescriptor::new("localhost", "Sales");

        let conn_str = config.to_connection_string(&target);
        assert!(conn_str.starts_with("Server=localhost;Database=Sales;"));
        assert!(conn_str.contains("Trusted_Connection=yes"));
        assert!(conn_str.ends_with(';'));
    }

    #[test]
    fn test_connection_string_sql_login() {
        let target = TargetDescriptor::new("localhost", "Sales");
        let conn_str = sql_login().to_connection_string(&target);
        assert!(conn_str.contains("User Id=sa"));
        assert!(conn_str.contains("Password=Password123!"));
        assert!(!conn_str.contains("Trusted_Connection"));
    }

    #[test]
    fn test_connection_string_port() {
        let config = MssqlConfig::builder().port(1500).build().unwrap();

        let conn_str = config.to_connection_string(&TargetDescriptor::new("db", "Sales"));
        assert!(conn_str.starts_with("Server=db,1500;"));

        let conn_str = config.to_connection_string(&TargetDescriptor::new("db\\EXPRESS", "Sales"));
        assert!(conn_str.starts_with("Server=db\\EXPRESS;"));
    }

    #[test]
    fn test_encryption_mode_parse() {
        assert_eq!(EncryptionMode::parse("ON").unwrap(), EncryptionMode::On);
        assert_eq!(EncryptionMode::parse("off").unwrap(), EncryptionMode::Off);
        assert_eq!(
            EncryptionMode::parse("required").unwrap(),
            EncryptionMode::Required
        );
        assert!(EncryptionMode::parse("sometimes").is_err());
    }

    #[test]
    fn test_encryption_mode_conversion() {
        assert_eq!(
            EncryptionLevel::from(EncryptionMode::On),
            EncryptionLevel::On
        );
        assert_eq!(
            EncryptionLevel::from(EncryptionMode::Off),
            EncryptionLevel::Off
        );
        assert_eq!(
            EncryptionLevel::from(EncryptionMode::Required),
            EncryptionLevel::Required
        );
    }
}
