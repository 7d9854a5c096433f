//! `chronoschema new-blank` command - Create an empty migration.

use chrono::Local;

use crate::cli::{GlobalArgs, NewBlankArgs};
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the new-blank command
pub async fn run(args: NewBlankArgs, global: &GlobalArgs) -> CliResult<()> {
    output::header("New Blank Migration");

    let ctx = Context::load(global, args.base_dir)?;
    let path = chronoschema_migrate::new_blank(&ctx.layout(), &args.name, &Local::now()).await?;

    success(&format!("Created {}", path.display()));
    Ok(())
}
