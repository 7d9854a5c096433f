//! `chronoschema schema-to-db` command - Deploy the schema tree to databases.

use chronoschema_migrate::SchemaDeployer;
use chronoschema_mssql::MssqlConnector;

use crate::cli::{GlobalArgs, SchemaToDbArgs};
use crate::commands::migration_to_db::print_script_outcome;
use crate::commands::{Context, parse_targets};
use crate::error::{CliError, CliResult};
use crate::output::{self, success, warn};

/// Run the schema-to-db command
pub async fn run(args: SchemaToDbArgs, global: &GlobalArgs) -> CliResult<()> {
    output::header("Schema To DB");

    let targets = parse_targets(&args.addresses)?;
    let ctx = Context::load(global, args.base_dir)?;

    output::kv("Base", &ctx.base_dir.display().to_string());
    output::kv("Targets", &targets.len().to_string());
    output::kv("Overwrite", if args.overwrite { "yes" } else { "no" });
    output::newline();

    if args.overwrite && !args.yes {
        warn("The following databases will be dropped and recreated:");
        for target in &targets {
            output::list_item(&target.to_string());
        }
        output::newline();
        if !output::confirm("Are you sure you want to continue?") {
            output::newline();
            output::info("Deployment cancelled.");
            return Ok(());
        }
        output::newline();
    }

    let deployer = SchemaDeployer::new(MssqlConnector::new(ctx.mssql_config()?), ctx.layout())
        .with_admin_database(&ctx.config.connection.admin_database);
    let report = deployer.deploy(&targets, args.overwrite).await;

    let total = report.targets.len();
    for (i, outcome) in report.targets.iter().enumerate() {
        output::step(i + 1, total, &outcome.target.to_string());
        if outcome.dropped {
            output::list_item("Dropped existing database");
        }
        for script in &outcome.scripts {
            output::dim(&format!("  {}", script.path.display()));
            print_script_outcome(script);
        }
        if let Some(e) = &outcome.error {
            warn(&format!("Aborted: {}", e));
        }
    }

    output::newline();
    if report.fatal_count() == total {
        return Err(CliError::Command(
            "no target could be deployed".to_string(),
        ));
    }
    let failed = report.targets.iter().filter(|t| !t.is_success()).count();
    if failed > 0 {
        warn(&format!("{} of {} targets had failures", failed, total));
    } else {
        success(&format!("Deployed {} targets", total));
    }

    Ok(())
}
