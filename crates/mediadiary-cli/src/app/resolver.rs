//! Path resolution for config and store files.

use std::path::{Path, PathBuf};

use crate::cli::Cli;
use crate::config::default_config_path;
use crate::errors::CliError;

/// Resolve the config file path; `--config` / `MEDIADIARY_CONFIG` win.
pub fn resolve_config_path(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(value) = cli.config.as_deref() {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value));
        }
    }
    default_config_path()
}

/// Error when the config file is missing and no store path was given.
pub fn missing_config_error(config_path: &Path) -> CliError {
    CliError::not_found(
        format!("No config found at {}", config_path.display()),
        "Hint: Run `mediadiary init`, or pass a store path with --store / MEDIADIARY_STORE.",
    )
}
