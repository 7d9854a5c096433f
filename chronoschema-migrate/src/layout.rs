//! On-disk project layout.

use std::path::{Path, PathBuf};

use crate::slug::slugify;
use crate::target::TargetDescriptor;

/// Directory holding one subtree per `<server>/<database>`.
pub const SCHEMA_DIR: &str = "schema";

/// Directory holding timestamp-prefixed migration scripts.
pub const MIGRATIONS_DIR: &str = "migrations";

/// Directory holding per-source staging trees during extraction.
pub const STAGING_DIR: &str = ".stg";

/// Extension of script files.
pub const SCRIPT_EXTENSION: &str = "sql";

/// Resolves paths below a project base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectLayout {
    base_dir: PathBuf,
}

impl ProjectLayout {
    /// Create a layout rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// The project base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// `<base>/schema/<server>/<database>`
    pub fn schema_dir(&self, target: &TargetDescriptor) -> PathBuf {
        self.base_dir
            .join(SCHEMA_DIR)
            .join(&target.server)
            .join(&target.database)
    }

    /// `<base>/migrations`
    pub fn migrations_dir(&self) -> PathBuf {
        self.base_dir.join(MIGRATIONS_DIR)
    }

    /// Path of the migration called `name`, with or without its extension.
    pub fn migration_path(&self, name: &str) -> PathBuf {
        let path = self.migrations_dir().join(name);
        if path.extension().is_some_and(|e| e == SCRIPT_EXTENSION) {
            path
        } else {
            self.migrations_dir().join(format!("{name}.{SCRIPT_EXTENSION}"))
        }
    }

    /// `<base>/.stg`
    pub fn staging_root(&self) -> PathBuf {
        self.base_dir.join(STAGING_DIR)
    }

    /// `<base>/.stg/<slug(source)>`, mirroring the base layout.
    pub fn staging_dir(&self, source: &TargetDescriptor) -> PathBuf {
        self.staging_root()
            .join(slugify(&source.to_string(), false))
    }
}

/// Check if `path` names a script file.
pub fn is_script(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(SCRIPT_EXTENSION))
}
