//! CLI argument definitions using clap.

use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// chronoschema - SQL Server schemas as files
#[derive(Parser, Debug)]
#[command(name = "chronoschema")]
#[command(author = "Pegasus Heavy Industries LLC")]
#[command(version)]
#[command(
    about = "chronoschema - Script SQL Server schemas to files and replay them",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Options shared by every command
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted before or after any subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration file (defaults to <base dir>/chronoschema.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// SQL Server login name (Windows Authentication when omitted)
    #[arg(short = 'U', long, global = true)]
    pub username: Option<String>,

    /// SQL Server login password
    #[arg(
        short = 'P',
        long,
        env = "CHRONOSCHEMA_PASSWORD",
        hide_env_values = true,
        global = true
    )]
    pub password: Option<String>,

    /// Trust the server certificate without validation
    #[arg(long, global = true)]
    pub trust_cert: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Script databases into the schema tree
    FromDb(FromDbArgs),

    /// Run migration scripts against a server
    MigrationToDb(MigrationToDbArgs),

    /// Deploy the schema tree to databases
    SchemaToDb(SchemaToDbArgs),

    /// Create an empty, timestamped migration
    NewBlank(NewBlankArgs),

    /// Rewrite and rename scripted files
    Cleanup(CleanupArgs),

    /// Display version information
    Version,
}

// =============================================================================
// From DB Command
// =============================================================================

/// Arguments for the `from-db` command
#[derive(Args, Debug)]
pub struct FromDbArgs {
    /// Source databases as [server].[database]
    #[arg(short, long = "source", value_name = "ADDRESS", num_args = 1.., required = true)]
    pub sources: Vec<String>,

    /// Also script a creation migration per database
    #[arg(short = 'g', long)]
    pub generate_creation_migrations: bool,

    /// Remove existing schema scripts before merging
    #[arg(short, long)]
    pub overwrite: bool,

    /// Project base directory (defaults to the current directory)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

// =============================================================================
// Migration To DB Command
// =============================================================================

/// Arguments for the `migration-to-db` command
#[derive(Args, Debug)]
pub struct MigrationToDbArgs {
    /// Server to run the migrations on
    #[arg(short, long)]
    pub server: String,

    /// Migration names, run in the order given
    #[arg(short, long = "migration", value_name = "NAME", num_args = 1.., required = true)]
    pub migrations: Vec<String>,

    /// Project base directory (defaults to the current directory)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

// =============================================================================
// Schema To DB Command
// =============================================================================

/// Arguments for the `schema-to-db` command
#[derive(Args, Debug)]
pub struct SchemaToDbArgs {
    /// Target databases as [server].[database]
    #[arg(short, long = "address", value_name = "ADDRESS", num_args = 1.., required = true)]
    pub addresses: Vec<String>,

    /// Drop each target database before deploying
    #[arg(short, long)]
    pub overwrite: bool,

    /// Skip the confirmation prompt for --overwrite
    #[arg(short, long)]
    pub yes: bool,

    /// Project base directory (defaults to the current directory)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

// =============================================================================
// New Blank Command
// =============================================================================

/// Arguments for the `new-blank` command
#[derive(Args, Debug)]
pub struct NewBlankArgs {
    /// Description of the migration
    #[arg(short, long)]
    pub name: String,

    /// Project base directory (defaults to the current directory)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

// =============================================================================
// Cleanup Command
// =============================================================================

/// Arguments for the `cleanup` command
#[derive(Args, Debug)]
pub struct CleanupArgs {
    /// Glob selecting files, relative to the base directory
    #[arg(short, long, value_name = "GLOB")]
    pub files: String,

    /// Replace FROM with TO in contents and paths (repeatable)
    #[arg(short, long = "swap", num_args = 2, value_names = ["FROM", "TO"])]
    pub swaps: Vec<String>,

    /// Remove every match of a multi-line regex from contents
    #[arg(long, value_name = "REGEX")]
    pub regex_remove: Option<String>,

    /// Leave file and directory names untouched
    #[arg(long)]
    pub no_swap_filenames: bool,

    /// Keep directories left empty by renames
    #[arg(long)]
    pub keep_empty_dirs: bool,

    /// Replace existing files when a rename collides
    #[arg(short, long)]
    pub overwrite: bool,

    /// Project base directory (defaults to the current directory)
    #[arg(short = 'd', long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,
}

impl CleanupArgs {
    /// Swap pairs in command-line order.
    pub fn swap_pairs(&self) -> Vec<(String, String)> {
        self.swaps
            .chunks_exact(2)
            .map(|pair| (pair[0].clone(), pair[1].clone()))
            .collect()
    }
}
