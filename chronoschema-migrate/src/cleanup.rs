//! Text and filename normalization sweep over project files.
//!
//! Unlike extraction and deployment, a cleanup stops at the first file it
//! cannot read, write or rename. Files processed before that point keep
//! their changes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use regex_lite::Regex;
use tracing::{debug, error, info};

use crate::error::{MigrateResult, MigrationError};
use crate::reconcile::{PruneRoot, prune_empty_dirs};

/// Options for a cleanup sweep.
#[derive(Debug, Clone)]
pub struct CleanupOptions {
    /// Project base directory.
    pub base_dir: PathBuf,
    /// Glob selecting files, relative to `base_dir` unless absolute.
    pub pattern: String,
    /// Literal `(from, to)` substitutions, applied in order.
    pub name_swaps: Vec<(String, String)>,
    /// Multi-line regex whose matches are deleted from file contents.
    pub regex_remove: Option<String>,
    /// Apply `name_swaps` to paths below `base_dir` as well.
    pub swap_filenames: bool,
    /// Prune empty directories under `base_dir` afterwards.
    pub remove_empty_dirs: bool,
    /// Replace an existing file at a rename destination.
    pub overwrite: bool,
}

impl CleanupOptions {
    /// Options with the defaults of the `cleanup` command.
    pub fn new(base_dir: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            pattern: pattern.into(),
            name_swaps: Vec::new(),
            regex_remove: None,
            swap_filenames: true,
            remove_empty_dirs: true,
            overwrite: false,
        }
    }

    /// Add a literal substitution.
    pub fn swap(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.name_swaps.push((from.into(), to.into()));
        self
    }

    /// Delete matches of `pattern` from file contents.
    pub fn regex_remove(mut self, pattern: impl Into<String>) -> Self {
        self.regex_remove = Some(pattern.into());
        self
    }

    /// Resolve the glob against the base directory.
    fn resolved_pattern(&self) -> String {
        let pattern = self.pattern.trim_matches('\\');
        if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            self.base_dir.join(pattern).to_string_lossy().into_owned()
        }
    }
}

/// What a cleanup did.
#[derive(Debug, Clone, Default)]
pub struct CleanupReport {
    /// Files matched by the glob.
    pub matched: usize,
    /// Files whose contents were rewritten.
    pub rewritten: Vec<PathBuf>,
    /// `(old, new)` paths of renamed files.
    pub renamed: Vec<(PathBuf, PathBuf)>,
    /// Directories removed because they were empty.
    pub pruned: BTreeSet<PathBuf>,
}

/// Run a cleanup sweep.
pub async fn cleanup(options: &CleanupOptions) -> MigrateResult<CleanupReport> {
    let remover = options
        .regex_remove
        .as_deref()
        .filter(|p| !p.is_empty())
        .map(|p| Regex::new(&format!("(?m){p}")))
        .transpose()
        .map_err(|e| MigrationError::pattern(e.to_string()))?;

    let pattern = options.resolved_pattern();
    let files = glob_files(&pattern)?;
    let total = files.len();
    info!(files = total, pattern = %pattern, "Cleaning up files");

    let mut report = CleanupReport {
        matched: total,
        ..CleanupReport::default()
    };

    for (i, file) in files.into_iter().enumerate() {
        let original = tokio::fs::read_to_string(&file).await.map_err(|e| {
            error!(file = %file.display(), index = i + 1, total, "Cleanup aborted");
            MigrationError::path(&file, e)
        })?;

        let mut text = match &remover {
            Some(re) => re.replace_all(&original, "").into_owned(),
            None => original.clone(),
        };
        for (from, to) in &options.name_swaps {
            text = text.replace(from.as_str(), to);
        }

        if text != original {
            tokio::fs::write(&file, &text)
                .await
                .map_err(|e| MigrationError::path(&file, e))?;
            debug!(file = %file.display(), "Rewrote contents");
            report.rewritten.push(file.clone());
        }

        if options.swap_filenames {
            let renamed = swapped_path(&file, &options.base_dir, &options.name_swaps);
            if renamed != file {
                rename(&file, &renamed, options.overwrite).await?;
                report.renamed.push((file, renamed));
            }
        }
    }

    if options.remove_empty_dirs {
        report.pruned = prune_empty_dirs(&options.base_dir, PruneRoot::Keep).await?;
    }

    Ok(report)
}

/// Expand a glob into the regular files it matches.
fn glob_files(pattern: &str) -> MigrateResult<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|e| MigrationError::pattern(e.to_string()))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(|e| MigrationError::path(e.path().to_path_buf(), e.into_error()))?;
        if path.is_file() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Apply `swaps` to the part of `file` below `base_dir`, or to its file
/// name when it lives elsewhere.
fn swapped_path(file: &Path, base_dir: &Path, swaps: &[(String, String)]) -> PathBuf {
    let apply = |s: &str| {
        swaps
            .iter()
            .fold(s.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
    };

    match file.strip_prefix(base_dir) {
        Ok(relative) => base_dir.join(apply(&relative.to_string_lossy())),
        Err(_) => {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            file.with_file_name(apply(&name))
        }
    }
}

async fn rename(from: &Path, to: &Path, overwrite: bool) -> MigrateResult<()> {
    if let Some(parent) = to.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| MigrationError::path(parent, e))?;
    }

    if tokio::fs::metadata(to).await.is_ok_and(|m| m.is_file()) {
        if !overwrite {
            return Err(MigrationError::other(format!(
                "cannot rename {} to {}: destination exists",
                from.display(),
                to.display()
            )));
        }
        tokio::fs::remove_file(to)
            .await
            .map_err(|e| MigrationError::path(to, e))?;
    }

    tokio::fs::rename(from, to)
        .await
        .map_err(|e| MigrationError::path(from, e))?;
    debug!(from = %from.display(), to = %to.display(), "Renamed file");
    Ok(())
}
