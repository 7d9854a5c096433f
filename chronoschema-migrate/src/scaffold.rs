//! Blank migration scaffolding.

use std::path::PathBuf;

use chrono::{DateTime, TimeZone};
use tokio::io::AsyncWriteExt;
use tracing::info;

use crate::error::{MigrateResult, MigrationError};
use crate::layout::{ProjectLayout, SCRIPT_EXTENSION};
use crate::slug::slugify;

/// File stem for a migration: `slug(<YYYYmmddHHMMSS>-<description>)`.
///
/// The timestamp prefix makes lexical order chronological.
pub fn migration_stem<Tz: TimeZone>(now: &DateTime<Tz>, description: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    slugify(
        &format!("{}-{}", now.format("%Y%m%d%H%M%S"), description),
        false,
    )
}

/// Create an empty migration script named after `name`.
///
/// The file holds a single comment line with the creation time and the
/// unmodified name. An existing file is never overwritten.
pub async fn new_blank<Tz: TimeZone>(
    layout: &ProjectLayout,
    name: &str,
    now: &DateTime<Tz>,
) -> MigrateResult<PathBuf>
where
    Tz::Offset: std::fmt::Display,
{
    let dir = layout.migrations_dir();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| MigrationError::path(&dir, e))?;

    let path = dir.join(format!("{}.{}", migration_stem(now, name), SCRIPT_EXTENSION));
    let header = format!("-- {} - {}", now.format("%Y-%m-%d %H:%M:%S"), name);

    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .await
        .map_err(|e| MigrationError::path(&path, e))?;
    file.write_all(header.as_bytes())
        .await
        .map_err(|e| MigrationError::path(&path, e))?;
    file.flush()
        .await
        .map_err(|e| MigrationError::path(&path, e))?;

    info!(path = %path.display(), "Created blank migration");
    Ok(path)
}
