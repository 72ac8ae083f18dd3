//! Application context for the Media Diary CLI.
//!
//! Bundles CLI arguments with the lazily-loaded config and knows how to open
//! the store for the signed-in user.

use std::path::PathBuf;

use once_cell::unsync::OnceCell;

use mediadiary_core::{GlobalStore, SqliteDocumentStore, User, TOP_LIMIT};

use crate::cli::Cli;
use crate::config::{default_session_path, read_config, DiaryConfig};
use crate::errors::CliError;
use crate::session::FileIdentityProvider;

use super::resolver::{missing_config_error, resolve_config_path};

/// The store as the CLI wires it.
pub type DiaryStore = GlobalStore<SqliteDocumentStore, FileIdentityProvider>;

pub struct AppContext<'a> {
    cli: &'a Cli,
    config: OnceCell<Option<DiaryConfig>>,
}

impl<'a> AppContext<'a> {
    pub fn new(cli: &'a Cli) -> Self {
        Self {
            cli,
            config: OnceCell::new(),
        }
    }

    pub fn cli(&self) -> &Cli {
        self.cli
    }

    pub fn quiet(&self) -> bool {
        self.cli.quiet
    }

    /// The config file, if one exists. A present but unreadable file is an error.
    pub fn config(&self) -> anyhow::Result<Option<&DiaryConfig>> {
        let config = self.config.get_or_try_init(|| {
            let path = resolve_config_path(self.cli)?;
            if !path.exists() {
                return Ok::<_, anyhow::Error>(None);
            }
            read_config(&path).map(Some)
        })?;
        Ok(config.as_ref())
    }

    /// Logging filter from the config, ignoring config errors.
    pub fn logging_filter(&self) -> Option<String> {
        self.config()
            .ok()
            .flatten()
            .and_then(|config| config.logging.filter.clone())
    }

    pub fn top_limit(&self) -> anyhow::Result<usize> {
        Ok(self
            .config()?
            .map_or(TOP_LIMIT, |config| config.chart.top_limit))
    }

    /// Store path from `--store` / `MEDIADIARY_STORE`, else the config.
    pub fn store_path(&self) -> anyhow::Result<PathBuf> {
        if let Some(path) = self.cli.store.as_deref() {
            return Ok(PathBuf::from(path));
        }
        match self.config()? {
            Some(config) => Ok(PathBuf::from(&config.store.path)),
            None => Err(missing_config_error(&resolve_config_path(self.cli)?).into()),
        }
    }

    pub fn identity(&self) -> anyhow::Result<FileIdentityProvider> {
        Ok(FileIdentityProvider::new(default_session_path()?))
    }

    /// Open the store with nobody signed in.
    pub fn open_store(&self) -> anyhow::Result<DiaryStore> {
        let path = self.store_path()?;
        let remote = SqliteDocumentStore::open(&path)?;
        tracing::debug!(path = %path.display(), "store opened");
        Ok(GlobalStore::new(remote, self.identity()?))
    }

    /// Open the store and sign in the session user, hydrating preferences.
    pub async fn signed_in_store(&self) -> anyhow::Result<(DiaryStore, User)> {
        let store = self.open_store()?;
        let user = store
            .identity()
            .current_user()?
            .ok_or(CliError::NotSignedIn)?;
        store.load_preferences_for_user(user.clone()).await?;
        Ok((store, user))
    }
}
