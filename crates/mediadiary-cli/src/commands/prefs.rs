use std::collections::BTreeSet;

use mediadiary_core::Theme;

use crate::app::AppContext;
use crate::cli::PrefsSetArgs;
use crate::errors::CliError;
use crate::helpers::parse_media_types;
use crate::output::preferences_table;

pub async fn handle_show(ctx: &AppContext<'_>, json: bool) -> anyhow::Result<()> {
    let (store, _user) = ctx.signed_in_store().await?;
    let state = store.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&state.preferences)?);
    } else {
        println!("{}", preferences_table(&state.preferences));
    }
    Ok(())
}

pub async fn handle_set(ctx: &AppContext<'_>, args: &PrefsSetArgs) -> anyhow::Result<()> {
    let theme = args
        .theme
        .as_deref()
        .map(|value| {
            value
                .parse::<Theme>()
                .map_err(|e| CliError::invalid_input(e.to_string()))
        })
        .transpose()?;
    let year = args.year.as_deref().map(parse_year).transpose()?;
    let tracked: Option<BTreeSet<_>> = args
        .track
        .as_deref()
        .map(parse_media_types)
        .transpose()?
        .map(|types| types.into_iter().collect());

    if theme.is_none() && year.is_none() && args.years.is_none() && tracked.is_none() {
        return Err(CliError::invalid_input(
            "Nothing to change\nHint: Pass --theme, --year, --years or --track.",
        )
        .into());
    }

    let (store, _user) = ctx.signed_in_store().await?;
    store
        .set_preference(|prefs| {
            if let Some(theme) = theme {
                prefs.theme = theme;
            }
            if let Some(year) = year {
                prefs.year = year;
            }
            if let Some(years) = args.years.clone() {
                prefs.years = years;
            }
            if let Some(tracked) = tracked {
                prefs.media_types = tracked;
            }
        })
        .await?;

    if !ctx.quiet() {
        println!("Preferences saved.");
    }
    Ok(())
}

/// `none` clears the current year.
fn parse_year(value: &str) -> anyhow::Result<Option<String>> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map_err(|_| CliError::invalid_input(format!("Invalid year '{}'", value)))?;
    Ok(Some(trimmed.to_string()))
}
