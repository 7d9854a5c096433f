//! Schema scripting through the external `mssql-scripter` program.

use std::ffi::OsString;

use async_trait::async_trait;
use chronoschema_migrate::{
    MigrateResult, MigrationError, OutputSpec, ScriptExtractor, ScriptMode, TargetDescriptor,
};
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::MssqlConfig;
use crate::error::MssqlError;

/// Default scripter program, looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "mssql-scripter";

/// Scripts databases by running `mssql-scripter`.
///
/// The connection string is passed on the command line. With a SQL login it
/// carries the password, which other local users can read from the process
/// list. Prefer Windows Authentication for extraction on shared machines.
#[derive(Debug, Clone)]
pub struct MssqlScripter {
    program: String,
    extra_args: Vec<String>,
    config: MssqlConfig,
}

impl MssqlScripter {
    /// Create a scripter using the default program.
    pub fn new(config: MssqlConfig) -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            extra_args: Vec::new(),
            config,
        }
    }

    /// Use another scripter executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Append arguments after the generated ones.
    pub fn extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Build the argument list for one extraction.
    pub fn args(&self, source: &TargetDescriptor, output: &OutputSpec) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "--connection-string".into(),
            self.config.to_connection_string(source).into(),
            "-f".into(),
            output.path.clone().into_os_string(),
        ];
        if output.mode == ScriptMode::FilePerObject {
            args.push("--file-per-object".into());
        }
        args.extend(
            ["--script-create", "--exclude-headers", "--exclude-defaults"]
                .into_iter()
                .map(OsString::from),
        );
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }
}

#[async_trait]
impl ScriptExtractor for MssqlScripter {
    async fn extract(&self, source: &TargetDescriptor, output: &OutputSpec) -> MigrateResult<()> {
        let dir = match output.mode {
            ScriptMode::SingleFile => output.path.parent().map(|p| p.to_path_buf()),
            ScriptMode::FilePerObject => Some(output.path.clone()),
        };
        if let Some(dir) = dir {
            tokio::fs::create_dir_all(&dir)
                .await
                .map_err(|e| MigrationError::path(&dir, e))?;
        }

        info!(source = %source, output = %output.path.display(), "Running {}", self.program);
        let result = Command::new(&self.program)
            .args(self.args(source, output))
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| MssqlError::scripter(format!("failed to run {}: {}", self.program, e)))?;

        let stdout = String::from_utf8_lossy(&result.stdout);
        if !stdout.trim().is_empty() {
            debug!(output = %stdout.trim(), "Scripter output");
        }

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(MssqlError::scripter(format!(
                "{} exited with {}: {}",
                self.program,
                result.status,
                stderr.trim()
            ))
            .into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_single_file_args() {
        let scripter = MssqlScripter::new(MssqlConfig::default());
        let source = TargetDescriptor::new("localhost", "Sales");
        let args = strings(scripter.args(&source, &OutputSpec::single_file("out/create.sql")));

        assert_eq!(args[0], "--connection-string");
        assert!(args[1].starts_with("Server=localhost;Database=Sales;Trusted_Connection=yes;"));
        assert_eq!(
            &args[2..],
            &[
                "-f",
                "out/create.sql",
                "--script-create",
                "--exclude-headers",
                "--exclude-defaults",
            ]
        );
    }

    #[test]
    fn test_file_per_object_args() {
        let scripter = MssqlScripter::new(MssqlConfig::default()).extra_args(["--display-progress"]);
        let source = TargetDescriptor::new("localhost", "Sales");
        let args = strings(scripter.args(&source, &OutputSpec::file_per_object("schema")));

        assert_eq!(args[3], "schema");
        assert_eq!(args[4], "--file-per-object");
        assert_eq!(args.last().map(String::as_str), Some("--display-progress"));
    }

    #[test]
    fn test_password_only_in_args_with_sql_login() {
        let source = TargetDescriptor::new("localhost", "Sales");
        let output = OutputSpec::single_file("create.sql");

        let trusted = strings(MssqlScripter::new(MssqlConfig::default()).args(&source, &output));
        assert!(!trusted[1].contains("Password="));

        let config = MssqlConfig::builder()
            .username("sa")
            .password("s3cret")
            .build()
            .unwrap();
        let login = strings(MssqlScripter::new(config).args(&source, &output));
        assert!(login[1].contains("Password=s3cret;"));
        assert!(!login[1].contains("Trusted_Connection"));
    }

    #[tokio::test]
    async fn test_missing_program_is_extraction_error() {
        let temp = tempfile::TempDir::new().unwrap();
        let scripter =
            MssqlScripter::new(MssqlConfig::default()).program("chronoschema-no-such-scripter");
        let output = OutputSpec::file_per_object(temp.path().join("schema"));

        let err = scripter
            .extract(&TargetDescriptor::new("localhost", "Sales"), &output)
            .await
            .unwrap_err();
        assert!(matches!(err, MigrationError::Extraction(_)));
    }
}
