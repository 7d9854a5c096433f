//! `[server].[database]` target addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::MigrationError;

/// Separator between the server and database parts of an address.
const ADDRESS_SEPARATOR: &str = "].[";

/// A `(server, database)` pair identifying where a schema comes from or goes to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetDescriptor {
    /// Server name, possibly with `\instance` or `,port`.
    pub server: String,
    /// Database name.
    pub database: String,
}

impl TargetDescriptor {
    /// Create a new target.
    pub fn new(server: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            server: server.into(),
            database: database.into(),
        }
    }

    /// The same server, addressed through another database.
    pub fn with_database(&self, database: impl Into<String>) -> Self {
        Self::new(self.server.clone(), database)
    }
}

impl FromStr for TargetDescriptor {
    type Err = MigrationError;

    fn from_str(address: &str) -> Result<Self, Self::Err> {
        let inner = address
            .trim()
            .trim_start_matches('[')
            .trim_end_matches(']');

        let (server, database) = inner
            .split_once(ADDRESS_SEPARATOR)
            .ok_or_else(|| MigrationError::InvalidTarget(address.to_string()))?;

        if server.is_empty() || database.is_empty() || database.contains(ADDRESS_SEPARATOR) {
            return Err(MigrationError::InvalidTarget(address.to_string()));
        }

        Ok(Self::new(server, database))
    }
}

impl fmt::Display for TargetDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}].[{}]", self.server, self.database)
    }
}
