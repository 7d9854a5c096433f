//! chronoschema - Script SQL Server schemas to files and replay them.

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use chronoschema_cli::cli::{Cli, Command};
use chronoschema_cli::commands;
use chronoschema_cli::error::CliResult;
use chronoschema_cli::output;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    // Run the CLI and handle errors
    if let Err(e) = run(cli).await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "chronoschema={level},chronoschema_cli={level},chronoschema_migrate={level},chronoschema_mssql={level}"
            ))
        }))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: Cli) -> CliResult<()> {
    let global = cli.global;

    // Run the appropriate command
    match cli.command {
        Command::FromDb(args) => commands::from_db::run(args, &global).await,
        Command::MigrationToDb(args) => commands::migration_to_db::run(args, &global).await,
        Command::SchemaToDb(args) => commands::schema_to_db::run(args, &global).await,
        Command::NewBlank(args) => commands::new_blank::run(args, &global).await,
        Command::Cleanup(args) => commands::cleanup::run(args, &global).await,
        Command::Version => commands::version::run().await,
    }
}
