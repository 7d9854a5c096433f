//! Schema extraction through a staging tree.
//!
//! Each source is scripted into `<base>/.stg/<slug(source)>`, which mirrors
//! the project layout, and then reconciled into the project tree:
//!
//! ```text
//! .stg/<slug>/migrations/<ts>-<db>-creation-script.sql ──▶ migrations/
//! .stg/<slug>/schema/<server>/<database>/**.sql        ──▶ schema/<server>/<database>/
//! ```

use std::path::PathBuf;

use chrono::Local;
use tracing::{debug, error, info};

use crate::error::{MigrateResult, MigrationError};
use crate::extract::{OutputSpec, ScriptExtractor};
use crate::layout::{MIGRATIONS_DIR, ProjectLayout, SCHEMA_DIR, SCRIPT_EXTENSION, is_script};
use crate::reconcile::{reconcile, walk_files};
use crate::scaffold::migration_stem;
use crate::target::TargetDescriptor;

/// Options for a staging run.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageOptions {
    /// Also script a single creation migration into `migrations/`.
    pub generate_creation_migrations: bool,
    /// Delete existing `.sql` files of the target's schema tree before merging.
    pub overwrite: bool,
}

/// What staging one source did.
#[derive(Debug, Clone, Default)]
pub struct StageReport {
    /// Creation migration written to `migrations/`, if requested.
    pub creation_migration: Option<PathBuf>,
    /// Number of files moved into the project tree.
    pub files_committed: usize,
    /// Number of stale schema files deleted by `overwrite`.
    pub stale_removed: usize,
}

/// Outcome for one source of a multi-source run.
#[derive(Debug)]
pub struct SourceOutcome {
    /// The source database.
    pub source: TargetDescriptor,
    /// Report, or the error that stopped this source.
    pub result: MigrateResult<StageReport>,
}

/// Scripts databases into the project's schema tree.
pub struct SchemaStager<E> {
    extractor: E,
    layout: ProjectLayout,
}

impl<E: ScriptExtractor> SchemaStager<E> {
    /// Create a stager writing below `layout`.
    pub fn new(extractor: E, layout: ProjectLayout) -> Self {
        Self { extractor, layout }
    }

    /// Get the project layout.
    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Stage every source in turn. A failing source does not stop the others.
    pub async fn stage_all(
        &self,
        sources: &[TargetDescriptor],
        options: &StageOptions,
    ) -> Vec<SourceOutcome> {
        let mut outcomes = Vec::with_capacity(sources.len());

        for source in sources {
            let result = self.stage_and_commit(source, options).await;
            if let Err(e) = &result {
                error!(source = %source, error = %e, "Schema extraction failed");
            }
            outcomes.push(SourceOutcome {
                source: source.clone(),
                result,
            });
        }

        outcomes
    }

    /// Script `source` into a fresh staging tree and move the result into
    /// the project tree.
    pub async fn stage_and_commit(
        &self,
        source: &TargetDescriptor,
        options: &StageOptions,
    ) -> MigrateResult<StageReport> {
        let mut report = StageReport::default();
        let staging = self.layout.staging_dir(source);

        // Leftovers from a crashed run must not leak into this one.
        if tokio::fs::try_exists(&staging)
            .await
            .map_err(|e| MigrationError::path(&staging, e))?
        {
            info!(dir = %staging.display(), "Removing stale staging directory");
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| MigrationError::path(&staging, e))?;
        }

        let staged_migrations = staging.join(MIGRATIONS_DIR);
        tokio::fs::create_dir_all(&staged_migrations)
            .await
            .map_err(|e| MigrationError::path(&staged_migrations, e))?;

        if options.generate_creation_migrations {
            let stem = migration_stem(
                &Local::now(),
                &format!("{} creation script", source.database),
            );
            let file_name = format!("{stem}.{SCRIPT_EXTENSION}");

            info!(source = %source, "Scripting initial schema creation");
            self.extractor
                .extract(
                    source,
                    &OutputSpec::single_file(staged_migrations.join(&file_name)),
                )
                .await?;
            report.creation_migration = Some(self.layout.migrations_dir().join(file_name));
        }

        info!(source = %source, "Scripting schema layout");
        let staged_schema = staging
            .join(SCHEMA_DIR)
            .join(&source.server)
            .join(&source.database);
        self.extractor
            .extract(source, &OutputSpec::file_per_object(staged_schema.clone()))
            .await?;

        if options.overwrite {
            report.stale_removed = self.remove_existing_scripts(source).await?;
        }

        // Only the trees this source wrote into are reconciled and pruned.
        let schema = reconcile(&staged_schema, &self.layout.schema_dir(source)).await?;
        let migrations = reconcile(&staged_migrations, &self.layout.migrations_dir()).await?;
        report.files_committed = schema.moved.len() + migrations.moved.len();

        if tokio::fs::try_exists(&staging)
            .await
            .map_err(|e| MigrationError::path(&staging, e))?
        {
            tokio::fs::remove_dir_all(&staging)
                .await
                .map_err(|e| MigrationError::path(&staging, e))?;
        }
        // Only succeeds once no other source is staged.
        let staging_root = self.layout.staging_root();
        match tokio::fs::remove_dir(&staging_root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::DirectoryNotEmpty => {}
            Err(e) => {
                debug!(dir = %staging_root.display(), error = %e, "Could not remove staging root");
            }
        }

        info!(
            source = %source,
            files = report.files_committed,
            stale = report.stale_removed,
            "Schema committed"
        );
        Ok(report)
    }

    /// Delete every `.sql` file under the target's schema tree.
    async fn remove_existing_scripts(&self, target: &TargetDescriptor) -> MigrateResult<usize> {
        let schema_dir = self.layout.schema_dir(target);
        info!(dir = %schema_dir.display(), "Overwriting existing schema files");

        let mut removed = 0;
        for file in walk_files(&schema_dir).await? {
            if is_script(&file) {
                tokio::fs::remove_file(&file)
                    .await
                    .map_err(|e| MigrationError::path(&file, e))?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
