//! `chronoschema migration-to-db` command - Run migration scripts on a server.

use chronoschema_migrate::{MigrationRunner, ScriptOutcome};
use chronoschema_mssql::MssqlConnector;

use crate::cli::{GlobalArgs, MigrationToDbArgs};
use crate::commands::Context;
use crate::error::{CliError, CliResult};
use crate::output::{self, success, warn};

/// Run the migration-to-db command
pub async fn run(args: MigrationToDbArgs, global: &GlobalArgs) -> CliResult<()> {
    output::header("Migration To DB");

    let ctx = Context::load(global, args.base_dir)?;
    let runner = MigrationRunner::new(MssqlConnector::new(ctx.mssql_config()?), ctx.layout())
        .with_admin_database(&ctx.config.connection.admin_database);

    output::kv("Server", &args.server);
    output::kv(
        "Migrations",
        &ctx.layout().migrations_dir().display().to_string(),
    );
    output::newline();

    let report = runner.run(&args.server, &args.migrations).await;

    let total = report.outcomes.len();
    for (i, (name, outcome)) in args.migrations.iter().zip(&report.outcomes).enumerate() {
        output::step(i + 1, total, name);
        print_script_outcome(outcome);
    }

    output::newline();
    if report.fatal_count() == total {
        return Err(CliError::Command(format!(
            "no migration could be executed on {}",
            args.server
        )));
    }
    if report.fatal_count() > 0 || report.failed_batches() > 0 {
        warn(&format!(
            "{} migrations not executed, {} failed batches",
            report.fatal_count(),
            report.failed_batches()
        ));
    } else {
        success(&format!("Ran {} migrations", total));
    }

    Ok(())
}

/// Print the batch results of one script.
pub(crate) fn print_script_outcome(outcome: &ScriptOutcome) {
    match &outcome.result {
        Ok(execution) => {
            for failure in execution.failures() {
                warn(&format!(
                    "Batch {} failed: {}",
                    failure.index,
                    failure.error.as_deref().unwrap_or_default()
                ));
            }
            output::list_item(&execution.summary());
        }
        Err(e) => warn(&format!("Not executed: {}", e)),
    }
}
