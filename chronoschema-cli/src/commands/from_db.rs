//! `chronoschema from-db` command - Script databases into the schema tree.

use chronoschema_migrate::{SchemaStager, StageOptions};
use chronoschema_mssql::MssqlScripter;

use crate::cli::{FromDbArgs, GlobalArgs};
use crate::commands::{Context, parse_targets};
use crate::error::{CliError, CliResult};
use crate::output::{self, success, warn};

/// Run the from-db command
pub async fn run(args: FromDbArgs, global: &GlobalArgs) -> CliResult<()> {
    output::header("From DB");

    let sources = parse_targets(&args.sources)?;
    let ctx = Context::load(global, args.base_dir)?;

    let scripter = MssqlScripter::new(ctx.mssql_config()?)
        .program(&ctx.config.scripter.program)
        .extra_args(ctx.config.scripter.extra_args.clone());
    let stager = SchemaStager::new(scripter, ctx.layout());
    let options = StageOptions {
        generate_creation_migrations: args.generate_creation_migrations,
        overwrite: args.overwrite,
    };

    output::kv("Base", &ctx.base_dir.display().to_string());
    output::kv("Scripter", &ctx.config.scripter.program);
    output::kv("Sources", &sources.len().to_string());
    output::newline();

    let outcomes = stager.stage_all(&sources, &options).await;

    let total = outcomes.len();
    let mut failed = 0;
    for (i, outcome) in outcomes.iter().enumerate() {
        output::step(i + 1, total, &outcome.source.to_string());
        match &outcome.result {
            Ok(report) => {
                if let Some(migration) = &report.creation_migration {
                    output::list_item(&format!("Creation script: {}", migration.display()));
                }
                if report.stale_removed > 0 {
                    output::list_item(&format!("Removed {} stale files", report.stale_removed));
                }
                output::list_item(&format!("Committed {} files", report.files_committed));
            }
            Err(e) => {
                failed += 1;
                warn(&format!("Skipped: {}", e));
            }
        }
    }

    output::newline();
    if failed == total {
        return Err(CliError::Command(format!(
            "no database could be scripted ({} failed)",
            failed
        )));
    }
    if failed > 0 {
        warn(&format!("{} of {} sources failed", failed, total));
    } else {
        success(&format!("Scripted {} databases", total));
    }

    Ok(())
}
