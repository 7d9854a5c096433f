//! `chronoschema cleanup` command - Rewrite and rename scripted files.

use chronoschema_migrate::CleanupOptions;

use crate::cli::{CleanupArgs, GlobalArgs};
use crate::commands::Context;
use crate::error::CliResult;
use crate::output::{self, success};

/// Run the cleanup command
pub async fn run(args: CleanupArgs, global: &GlobalArgs) -> CliResult<()> {
    output::header("Cleanup");

    let swaps = args.swap_pairs();
    let ctx = Context::load(global, args.base_dir.clone())?;

    let options = CleanupOptions {
        base_dir: ctx.base_dir.clone(),
        pattern: args.files,
        name_swaps: swaps,
        regex_remove: args.regex_remove,
        swap_filenames: !args.no_swap_filenames,
        remove_empty_dirs: !args.keep_empty_dirs,
        overwrite: args.overwrite,
    };

    output::kv("Base", &ctx.base_dir.display().to_string());
    output::kv("Files", &options.pattern);
    output::newline();

    let report = chronoschema_migrate::cleanup(&options).await?;

    output::section("Summary");
    output::kv("Matched", &report.matched.to_string());
    output::kv("Rewritten", &report.rewritten.len().to_string());
    output::kv("Renamed", &report.renamed.len().to_string());
    output::kv("Pruned", &report.pruned.len().to_string());
    output::newline();

    success("Cleanup complete");
    Ok(())
}
