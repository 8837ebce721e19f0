//! Command-line interface for the deploy pipeline.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{DEFAULT_API_URL, DEFAULT_BUILD_COMMAND};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "pagelift",
    version,
    about = "Build a static website and mirror it to shared hosting over FTP"
)]
pub struct Cli {
    /// Website project directory (where the build command runs).
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub project_dir: PathBuf,

    /// Build output directory to mirror [default: <project-dir>/build].
    #[arg(long, value_name = "DIR")]
    pub build_dir: Option<PathBuf>,

    /// Remote directory the tree is mirrored under (document-root offset
    /// from the FTP home; empty if the FTP home is already the web root).
    #[arg(long, value_name = "PATH")]
    pub remote_base: Option<String>,

    /// API base URL injected into the build environment.
    #[arg(long, env = "REACT_APP_API_URL", default_value = DEFAULT_API_URL, value_name = "URL")]
    pub api_url: String,

    /// Build command run inside the project directory.
    #[arg(long, value_name = "CMD", default_value = DEFAULT_BUILD_COMMAND)]
    pub build_command: String,

    /// Read credentials from this env file instead of the default candidates.
    #[arg(long, value_name = "FILE")]
    pub env_file: Option<PathBuf>,

    /// Dot-file names uploaded despite the hidden-file filter.
    #[arg(long = "allow-dotfile", value_name = "NAME")]
    pub allow_dotfiles: Vec<String>,

    /// Skip the build step and upload the existing output as-is.
    #[arg(long)]
    pub skip_build: bool,

    /// List what would be uploaded without opening an FTP session.
    #[arg(long)]
    pub dry_run: bool,
}
