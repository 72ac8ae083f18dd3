//! Media Diary CLI - log films, TV and albums, then slice the diary by facet
//!
//! This is the command-line interface for Media Diary. It is a thin display
//! layer over the core library: every state change goes through the core's
//! global store.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;
mod output;
mod session;

use clap::{CommandFactory, Parser};

use crate::app::AppContext;
use crate::cli::{Cli, Commands, PrefsSubcommand};
use crate::commands::{auth, browse, chart, diary, facets, init, misc, prefs};
use crate::errors::exit_code_for;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);
    logging::init(ctx.logging_filter().as_deref());

    if let Err(e) = run(&ctx, &cli).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(exit_code_for(&e));
    }
}

async fn run(ctx: &AppContext<'_>, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Init(args)) => init::handle_init(ctx, args)?,
        Some(Commands::Login(args)) => auth::handle_login(ctx, args).await?,
        Some(Commands::Logout) => auth::handle_logout(ctx).await?,
        Some(Commands::Add(args)) => diary::handle_add(ctx, args).await?,
        Some(Commands::List(args)) => diary::handle_list(ctx, args).await?,
        Some(Commands::Facets(args)) => facets::handle_facets(ctx, args).await?,
        Some(Commands::Top(args)) => chart::handle_top(ctx, args).await?,
        Some(Commands::Chart(args)) => chart::handle_chart(ctx, args).await?,
        Some(Commands::Browse) => browse::handle_browse(ctx).await?,
        Some(Commands::Prefs(PrefsSubcommand::Show { json })) => {
            prefs::handle_show(ctx, *json).await?
        }
        Some(Commands::Prefs(PrefsSubcommand::Set(args))) => prefs::handle_set(ctx, args).await?,
        Some(Commands::Completions { shell }) => misc::handle_completions(*shell),
        None => Cli::command().print_help()?,
    }
    Ok(())
}
