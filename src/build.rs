//! External build-command invocation.
//!
//! The site build is an external command (typically `npm run build`) run in
//! the project directory with the target API base URL injected and CI
//! warnings-as-errors disabled. Output is captured; on a nonzero exit the
//! captured text travels inside the error so the caller's diagnostic shows
//! what the build printed.

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

use crate::config::BuildCommand;

/// Errors from the build step.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("build command exited with status {status}\n{output}")]
    Failed { status: i32, output: String },

    #[error("build output not found: {}", .0.display())]
    MissingOutput(PathBuf),
}

/// Runs the site build in a project directory.
pub struct SiteBuilder {
    project_dir: PathBuf,
    api_url: String,
    command: BuildCommand,
}

impl SiteBuilder {
    pub fn new(project_dir: &Path, api_url: &str) -> Self {
        Self {
            project_dir: project_dir.to_path_buf(),
            api_url: api_url.to_string(),
            command: BuildCommand {
                program: "npm".into(),
                args: vec!["run".into(), "build".into()],
            },
        }
    }

    /// Override the build command.
    pub fn with_command(mut self, command: BuildCommand) -> Self {
        self.command = command;
        self
    }

    /// Run the build to completion, capturing stdout and stderr.
    ///
    /// `CI=false` keeps CI-style toolchains from promoting build warnings
    /// to errors.
    pub fn build(&self) -> Result<(), BuildError> {
        tracing::debug!(
            project = %self.project_dir.display(),
            command = %self.command,
            api_url = %self.api_url,
            "running site build"
        );

        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .current_dir(&self.project_dir)
            .env("REACT_APP_API_URL", &self.api_url)
            .env("CI", "false")
            .output()
            .map_err(|source| BuildError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            let captured = if stderr.trim().is_empty() {
                stdout
            } else {
                stderr
            };
            return Err(BuildError::Failed {
                status: output.status.code().unwrap_or(-1),
                output: captured.trim_end().to_string(),
            });
        }

        tracing::debug!("site build succeeded");
        Ok(())
    }
}
