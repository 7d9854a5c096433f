//! Script files and `GO`-separated batches.
//!
//! A script is split on lines that consist of exactly `GO`. The splitter is
//! purely textual: a `GO` line inside a string literal or block comment is
//! still treated as a separator.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex_lite::Regex;
use tracing::warn;

use crate::error::{MigrateResult, MigrationError};

/// Batch separator: a line holding only `GO`, tolerant of CRLF endings.
static SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^GO\r?\n").expect("valid batch separator pattern"));

/// A contiguous slice of a script submitted to the server in one round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch(String);

impl Batch {
    /// Create a batch from SQL text.
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    /// The SQL text of this batch.
    pub fn sql(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Batch {
    fn from(sql: &str) -> Self {
        Self::new(sql)
    }
}

/// Split script text into its ordered batches.
///
/// The element after the last separator is always discarded, so text without
/// any separator yields no batches. When the discarded remainder holds more
/// than whitespace it is logged, since that usually means the script is
/// missing its final `GO`.
pub fn split(text: &str) -> Vec<Batch> {
    let mut parts: Vec<&str> = SEPARATOR.split(text).collect();
    let remainder = parts.pop().unwrap_or_default();

    if !remainder.trim().is_empty() {
        warn!(
            chars = remainder.len(),
            "Discarding trailing script text not terminated by a GO line"
        );
    }

    parts.into_iter().map(Batch::from).collect()
}

/// A script read from disk.
#[derive(Debug, Clone)]
pub struct Script {
    /// Where the script was read from.
    pub path: PathBuf,
    /// Full text of the file.
    pub text: String,
}

impl Script {
    /// Create a script from in-memory text.
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Read a script file as UTF-8.
    pub async fn read(path: impl AsRef<Path>) -> MigrateResult<Self> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| MigrationError::path(path, e))?;
        Ok(Self::new(path, text))
    }

    /// Split this script into batches.
    pub fn batches(&self) -> Vec<Batch> {
        split(&self.text)
    }
}
