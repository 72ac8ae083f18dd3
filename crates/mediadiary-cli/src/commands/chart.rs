use std::collections::BTreeSet;

use mediadiary_core::{ChartService, FacetDimension, FilterComposer};

use crate::app::AppContext;
use crate::cli::{ChartArgs, TopArgs};
use crate::errors::CliError;
use crate::helpers::{parse_media_types, parse_rating_option, require_candidate};
use crate::output::print_records;

pub async fn handle_top(ctx: &AppContext<'_>, args: &TopArgs) -> anyhow::Result<()> {
    let limit = match args.limit {
        Some(0) => return Err(CliError::invalid_input("--limit must be at least 1").into()),
        Some(limit) => limit,
        None => ctx.top_limit()?,
    };
    let (store, user) = ctx.signed_in_store().await?;
    let records = ChartService::new(store.remote())
        .query_top(&user.uid, limit)
        .await?;
    print_records(&records, args.json, ctx.quiet())
}

/// Compose a filter from flags, commit it, then chart the committed filter.
pub async fn handle_chart(ctx: &AppContext<'_>, args: &ChartArgs) -> anyhow::Result<()> {
    let media_types: BTreeSet<_> = parse_media_types(&args.media_types)?.into_iter().collect();
    let rating = args
        .rating
        .as_deref()
        .map(parse_rating_option)
        .transpose()?;

    let (store, user) = ctx.signed_in_store().await?;
    let data = store.filter_data_or_empty().await;

    let mut composer = FilterComposer::new();
    composer.open(&store)?;

    // Year first: changing it clears the other facets.
    if let Some(year) = args.year {
        require_candidate(&data, FacetDimension::DiaryYear, None, &year.to_string())?;
        composer.set_diary_year(Some(year))?;
    }
    for media_type in &media_types {
        require_candidate(&data, FacetDimension::MediaType, args.year, media_type.as_str())?;
        composer.toggle_media_type(*media_type)?;
    }
    if let Some(option) = rating {
        if let Some(rating) = option.to_filter()? {
            require_candidate(
                &data,
                FacetDimension::Rating,
                args.year,
                &rating.half_stars().to_string(),
            )?;
        }
        composer.set_rating(option)?;
    }
    if let Some(decade) = args.decade {
        require_candidate(&data, FacetDimension::ReleasedDecade, args.year, &decade.to_string())?;
        composer.set_released_decade(Some(decade))?;
    }
    if let Some(logged_before) = args.logged_before {
        require_candidate(
            &data,
            FacetDimension::LoggedBefore,
            args.year,
            &logged_before.to_string(),
        )?;
        composer.set_logged_before(Some(logged_before))?;
    }
    if let Some(genre) = args.genre.as_deref() {
        require_candidate(&data, FacetDimension::Genre, args.year, genre)?;
        composer.set_genre(Some(genre.to_string()))?;
    }

    composer.save(&store)?;
    let committed = store.snapshot().filter.clone();
    tracing::debug!(active = committed.active_count(), "charting committed filter");

    let records = ChartService::new(store.remote())
        .query_selection(&user.uid, &committed)
        .await?;
    print_records(&records, args.json, ctx.quiet())
}

