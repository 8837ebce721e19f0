//! Build a static website and mirror it to shared hosting over FTP.
//!
//! The deploy is a one-shot, fully sequential pipeline:
//! resolve configuration → run the site build → mirror the build output
//! tree over a single FTP session. Every knob is an explicit [`cli::Cli`]
//! flag with a default, so a bare `pagelift` invocation from the project
//! directory performs the whole deploy.

pub mod build;
pub mod cli;
pub mod config;
pub mod deploy;

use colored::Colorize;
use thiserror::Error;

use crate::build::{BuildError, SiteBuilder};
use crate::cli::Cli;
use crate::config::{ConfigError, DeployConfig};
use crate::deploy::{FtpTransport, TransferError, Uploader, plan_tree};

/// Top-level error for a deploy run; each variant is one pipeline concern.
#[derive(Debug, Error)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Transfer(#[from] TransferError),
}

/// Run the whole deploy pipeline for the given CLI invocation.
pub fn run(cli: Cli) -> Result<(), DeployError> {
    let config = DeployConfig::resolve(&cli)?;

    if !config.project_dir.is_dir() {
        return Err(ConfigError::MissingProjectDir(config.project_dir.clone()).into());
    }

    if cli.skip_build {
        tracing::debug!("build step skipped");
    } else {
        println!(
            "{} building site (REACT_APP_API_URL={})",
            "==>".bold(),
            config.api_url
        );
        SiteBuilder::new(&config.project_dir, &config.api_url)
            .with_command(config.build_command.clone())
            .build()?;
        println!("    build OK");
    }

    if !config.build_dir.is_dir() {
        return Err(BuildError::MissingOutput(config.build_dir.clone()).into());
    }

    if cli.dry_run {
        let planned = plan_tree(
            &config.build_dir,
            &config.remote_base,
            &config.allowed_dotfiles,
        )?;
        for path in &planned {
            println!("  would upload {path}");
        }
        println!("{} dry run: {} files to upload", "==>".bold(), planned.len());
        return Ok(());
    }

    println!(
        "{} deploying {} to {}",
        "==>".bold(),
        config.build_dir.display(),
        config.credentials.host
    );

    let transport = FtpTransport::connect(&config.credentials)?;
    let mut uploader =
        Uploader::new(transport).with_allowed_dotfiles(config.allowed_dotfiles.clone());
    let report = uploader.mirror_tree(&config.build_dir, &config.remote_base)?;
    // Session is only closed on the success path; on error the stream is
    // dropped when the process exits.
    uploader.close()?;

    println!(
        "{} deployment complete: {} files, {} bytes in {}ms",
        "==>".green().bold(),
        report.files_uploaded,
        report.bytes_uploaded,
        report.duration_ms
    );
    Ok(())
}
