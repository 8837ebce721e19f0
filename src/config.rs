//! Deploy configuration: credentials and pipeline settings.
//!
//! Credentials come from the first existing env file among an ordered
//! candidate list (`<project>/.env`, then `<project>/../.env`), with
//! process environment variables as a per-key fallback. Everything else is
//! resolved from CLI flags with defaults, so the orchestration receives one
//! explicit [`DeployConfig`] value and no module-level state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::{env, fmt, fs};

use thiserror::Error;

use crate::cli::Cli;

/// Remote directory the tree is mirrored under by default. Shared hosting
/// accounts commonly expose the FTP home one level above the web root.
pub const DEFAULT_REMOTE_BASE: &str = "www";

/// API base URL injected into the build when none is configured.
pub const DEFAULT_API_URL: &str = "https://api.pagelift.dev/api";

/// Build command run in the project directory when none is configured.
pub const DEFAULT_BUILD_COMMAND: &str = "npm run build";

/// Env keys that must resolve for the upload phase to start.
pub const CREDENTIAL_KEYS: [&str; 3] = ["FTP_HOST", "FTP_USER", "FTP_PASSWORD"];

/// Dot-files uploaded despite the hidden-file filter when no
/// `--allow-dotfile` override is given.
pub const DEFAULT_ALLOWED_DOTFILES: [&str; 1] = [".htaccess"];

/// Errors raised while resolving the deploy configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "missing FTP credentials; set FTP_HOST, FTP_USER and FTP_PASSWORD in an env file or the environment (tried: {})",
        format_candidates(.tried)
    )]
    MissingCredentials { tried: Vec<PathBuf> },

    #[error("failed to read {}: {}", .path.display(), .source)]
    ReadEnvFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("website project directory not found: {}", .0.display())]
    MissingProjectDir(PathBuf),

    #[error("invalid build command {command:?}: {message}")]
    InvalidBuildCommand { command: String, message: String },
}

fn format_candidates(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// FTP account credentials.
#[derive(Clone)]
pub struct Credentials {
    pub host: String,
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// External build command, split into program and arguments.
#[derive(Debug, Clone)]
pub struct BuildCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl BuildCommand {
    /// Parse a shell-style command line (e.g. `npm run build`).
    pub fn parse(command: &str) -> Result<Self, ConfigError> {
        let words = shell_words::split(command).map_err(|e| ConfigError::InvalidBuildCommand {
            command: command.to_string(),
            message: e.to_string(),
        })?;
        let mut words = words.into_iter();
        let Some(program) = words.next() else {
            return Err(ConfigError::InvalidBuildCommand {
                command: command.to_string(),
                message: "empty command".to_string(),
            });
        };
        Ok(Self {
            program,
            args: words.collect(),
        })
    }
}

impl fmt::Display for BuildCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut words = vec![self.program.clone()];
        words.extend(self.args.iter().cloned());
        write!(f, "{}", shell_words::join(words))
    }
}

/// Fully resolved settings for one deploy run.
#[derive(Debug, Clone)]
pub struct DeployConfig {
    pub project_dir: PathBuf,
    pub build_dir: PathBuf,
    pub remote_base: String,
    pub api_url: String,
    pub build_command: BuildCommand,
    pub allowed_dotfiles: Vec<String>,
    pub credentials: Credentials,
}

impl DeployConfig {
    /// Resolve the configuration for a CLI invocation.
    ///
    /// Credential precedence per key: env file, then process environment.
    /// Empty values count as unset.
    pub fn resolve(cli: &Cli) -> Result<Self, ConfigError> {
        let project_dir = cli.project_dir.clone();
        let candidates = match &cli.env_file {
            Some(path) => vec![path.clone()],
            None => vec![
                project_dir.join(".env"),
                project_dir.join("..").join(".env"),
            ],
        };

        let file_vars = load_first_env_file(&candidates)?;
        let lookup = |key: &str| {
            file_vars
                .get(key)
                .cloned()
                .filter(|v| !v.is_empty())
                .or_else(|| env::var(key).ok().filter(|v| !v.is_empty()))
        };

        let [host, user, password] = CREDENTIAL_KEYS.map(|key| lookup(key));
        let (Some(host), Some(user), Some(password)) = (host, user, password) else {
            return Err(ConfigError::MissingCredentials { tried: candidates });
        };

        let remote_base = cli
            .remote_base
            .clone()
            .or_else(|| lookup("REMOTE_BASE"))
            .unwrap_or_else(|| DEFAULT_REMOTE_BASE.to_string());
        let remote_base = remote_base.trim_matches('/').to_string();

        let build_dir = cli
            .build_dir
            .clone()
            .unwrap_or_else(|| project_dir.join("build"));

        let allowed_dotfiles = if cli.allow_dotfiles.is_empty() {
            DEFAULT_ALLOWED_DOTFILES
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            cli.allow_dotfiles.clone()
        };

        Ok(Self {
            project_dir,
            build_dir,
            remote_base,
            api_url: cli.api_url.clone(),
            build_command: BuildCommand::parse(&cli.build_command)?,
            allowed_dotfiles,
            credentials: Credentials {
                host,
                user,
                password,
            },
        })
    }
}

/// Read and parse the first existing candidate env file.
///
/// Returns an empty map when no candidate exists; credential resolution
/// then falls through to the process environment.
fn load_first_env_file(candidates: &[PathBuf]) -> Result<HashMap<String, String>, ConfigError> {
    for path in candidates {
        if path.exists() {
            let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadEnvFile {
                path: path.clone(),
                source,
            })?;
            tracing::debug!(path = %path.display(), "loaded env file");
            return Ok(parse_env_str(&content));
        }
    }
    Ok(HashMap::new())
}

/// Parse simple `KEY=VALUE` lines.
///
/// Blank lines, `#` comments and lines without `=` are ignored; keys and
/// values are trimmed and surrounding single/double quotes are stripped
/// from values.
fn parse_env_str(content: &str) -> HashMap<String, String> {
    let mut vars = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        vars.insert(key.trim().to_string(), value.to_string());
    }
    vars
}
