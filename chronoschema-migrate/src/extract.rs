//! Schema scripting capability.

use std::path::PathBuf;

use crate::error::MigrateResult;
use crate::target::TargetDescriptor;

/// How scripted objects are laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// One creation script for the whole database, written to a file.
    SingleFile,
    /// One file per scripted object, written under a directory.
    FilePerObject,
}

/// Where and how to write scripted DDL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputSpec {
    /// File path for [`ScriptMode::SingleFile`], directory otherwise.
    pub path: PathBuf,
    /// Output layout.
    pub mode: ScriptMode,
}

impl OutputSpec {
    /// Script everything into one file.
    pub fn single_file(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            mode: ScriptMode::SingleFile,
        }
    }

    /// Script one file per object under a directory.
    pub fn file_per_object(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into(),
            mode: ScriptMode::FilePerObject,
        }
    }
}

/// Produces create-only DDL scripts for a database.
///
/// Implementations script object creation only, without headers or default
/// options, and must leave the output at `output.path` when they return `Ok`.
#[async_trait::async_trait]
pub trait ScriptExtractor: Send + Sync {
    /// Script `source` into `output`.
    async fn extract(&self, source: &TargetDescriptor, output: &OutputSpec) -> MigrateResult<()>;
}
