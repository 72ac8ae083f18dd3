use std::path::PathBuf;

use mediadiary_core::{SqliteDocumentStore, TOP_LIMIT};

use crate::app::{resolve_config_path, AppContext};
use crate::cli::InitArgs;
use crate::config::{default_store_path, write_config, DiaryConfig};
use crate::errors::CliError;

pub fn handle_init(ctx: &AppContext<'_>, args: &InitArgs) -> anyhow::Result<()> {
    let config_path = resolve_config_path(ctx.cli())?;
    if config_path.exists() && !args.force {
        return Err(CliError::invalid_input(format!(
            "Config already exists at {}\nHint: Pass --force to overwrite it.",
            config_path.display()
        ))
        .into());
    }

    let store_path = match args.path.as_deref().or(ctx.cli().store.as_deref()) {
        Some(path) => PathBuf::from(path),
        None => default_store_path()?,
    };
    let top_limit = args.top_limit.unwrap_or(TOP_LIMIT);
    if top_limit == 0 {
        return Err(CliError::invalid_input("--top-limit must be at least 1").into());
    }

    // Opening creates the file and schema.
    SqliteDocumentStore::open(&store_path)?;
    write_config(&config_path, &DiaryConfig::new(store_path.clone(), top_limit))?;
    tracing::info!(
        store = %store_path.display(),
        config = %config_path.display(),
        "initialized"
    );

    if !ctx.quiet() {
        println!("Initialized media diary at {}", store_path.display());
        println!("Config written to {}", config_path.display());
    }
    Ok(())
}
