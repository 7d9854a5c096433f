//! Moving staged files into the schema tree and pruning empty directories.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{MigrateResult, MigrationError};

/// Whether pruning may remove the root directory itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PruneRoot {
    /// Remove the root too when it ends up empty.
    Remove,
    /// Never remove the root.
    Keep,
}

/// What a reconciliation did.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// Destination paths of moved files.
    pub moved: Vec<PathBuf>,
    /// Directories removed because they were empty.
    pub pruned: BTreeSet<PathBuf>,
}

/// A directory listing captured before any pruning happens.
struct DirListing {
    path: PathBuf,
    has_files: bool,
    subdirs: Vec<PathBuf>,
}

/// Move every file under `staging_root` to the same relative path under
/// `destination_root`, then prune empty directories from both trees.
///
/// Existing destination files are replaced without checking.
pub async fn reconcile(
    staging_root: &Path,
    destination_root: &Path,
) -> MigrateResult<ReconcileReport> {
    let mut report = ReconcileReport::default();

    for file in walk_files(staging_root).await? {
        let relative = file
            .strip_prefix(staging_root)
            .map_err(|e| MigrationError::other(format!("{}: {}", file.display(), e)))?;
        let target = destination_root.join(relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| MigrationError::path(parent, e))?;
        }

        move_file(&file, &target).await?;
        debug!(from = %file.display(), to = %target.display(), "Moved staged file");
        report.moved.push(target);
    }

    report
        .pruned
        .extend(prune_empty_dirs(staging_root, PruneRoot::Remove).await?);
    report
        .pruned
        .extend(prune_empty_dirs(destination_root, PruneRoot::Keep).await?);

    info!(
        moved = report.moved.len(),
        pruned = report.pruned.len(),
        "Reconciled staging tree"
    );

    Ok(report)
}

/// Recursively list the files below `root`, directories sorted by name.
///
/// A missing root yields an empty list.
pub async fn walk_files(root: &Path) -> MigrateResult<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !tokio::fs::try_exists(root)
        .await
        .map_err(|e| MigrationError::path(root, e))?
    {
        return Ok(files);
    }

    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let (dir_files, subdirs) = read_dir_sorted(&dir).await?;
        files.extend(dir_files);
        // Reverse so the alphabetically first subdirectory is walked first.
        stack.extend(subdirs.into_iter().rev());
    }

    Ok(files)
}

/// Remove every directory below `root` that holds no files and no surviving
/// subdirectories, deepest first.
///
/// Hidden directories (such as `.git`) are never entered or removed, and they
/// keep their parent alive.
pub async fn prune_empty_dirs(
    root: &Path,
    prune_root: PruneRoot,
) -> MigrateResult<BTreeSet<PathBuf>> {
    let mut deleted = BTreeSet::new();
    if !tokio::fs::metadata(root).await.is_ok_and(|m| m.is_dir()) {
        return Ok(deleted);
    }

    // Pre-order listing; walking it backwards visits children before parents.
    let mut listings = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let (files, subdirs) = read_dir_sorted(&dir).await?;
        stack.extend(subdirs.iter().filter(|d| !is_hidden(d)).cloned());
        listings.push(DirListing {
            path: dir,
            has_files: !files.is_empty(),
            subdirs,
        });
    }

    for listing in listings.into_iter().rev() {
        if listing.path == root && prune_root == PruneRoot::Keep {
            continue;
        }

        let still_has_subdirs = listing.subdirs.iter().any(|d| !deleted.contains(d));
        if listing.has_files || still_has_subdirs {
            continue;
        }

        tokio::fs::remove_dir(&listing.path)
            .await
            .map_err(|e| MigrationError::path(&listing.path, e))?;
        debug!(dir = %listing.path.display(), "Removed empty directory");
        deleted.insert(listing.path);
    }

    Ok(deleted)
}

/// List `dir` as (files, subdirectories), each sorted by path.
async fn read_dir_sorted(dir: &Path) -> MigrateResult<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| MigrationError::path(dir, e))?;

    let mut files = Vec::new();
    let mut subdirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MigrationError::path(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| MigrationError::path(entry.path(), e))?;
        if file_type.is_dir() {
            subdirs.push(entry.path());
        } else {
            files.push(entry.path());
        }
    }

    files.sort();
    subdirs.sort();
    Ok((files, subdirs))
}

/// Move a file, falling back to copy-and-delete across file systems.
async fn move_file(from: &Path, to: &Path) -> MigrateResult<()> {
    if tokio::fs::rename(from, to).await.is_ok() {
        return Ok(());
    }

    tokio::fs::copy(from, to)
        .await
        .map_err(|e| MigrationError::path(from, e))?;
    tokio::fs::remove_file(from)
        .await
        .map_err(|e| MigrationError::path(from, e))?;
    Ok(())
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}
