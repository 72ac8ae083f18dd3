use chrono::Local;
use uuid::Uuid;

use mediadiary_core::diary::{rebuild_filter_data, save_record};
use mediadiary_core::{DiaryRecord, Rating};

use crate::app::AppContext;
use crate::cli::{AddArgs, ListArgs};
use crate::helpers::{parse_date, parse_media_type, parse_stars};
use crate::output::print_records;

pub async fn handle_add(ctx: &AppContext<'_>, args: &AddArgs) -> anyhow::Result<()> {
    let media_type = parse_media_type(&args.media_type)?;
    let date = match args.date.as_deref() {
        Some(value) => parse_date(value)?,
        None => Local::now().date_naive(),
    };
    let rating = match args.rating {
        Some(stars) => parse_stars(stars)?,
        None => Rating::UNRATED,
    };

    let (store, user) = ctx.signed_in_store().await?;
    let mut record = DiaryRecord::new(Uuid::now_v7().to_string(), media_type, args.title.trim(), date)
        .with_rating(rating)
        .with_logged_before(args.logged_before);
    if let Some(year) = args.released {
        record = record.with_release_year(year);
    }
    if let Some(genre) = args.genre.as_deref().map(str::trim).filter(|g| !g.is_empty()) {
        record = record.with_genre(genre);
    }

    save_record(store.remote(), &user.uid, &record).await?;
    rebuild_filter_data(store.remote(), &user.uid).await?;

    if ctx.quiet() {
        println!("{}", record.id);
    } else {
        println!("Logged {} {} ({})", record.media_type.label(), record.title, record.id);
    }
    Ok(())
}

pub async fn handle_list(ctx: &AppContext<'_>, args: &ListArgs) -> anyhow::Result<()> {
    let (store, _user) = ctx.signed_in_store().await?;
    let state = store.load_diary().await?;
    let records: Vec<DiaryRecord> = state
        .diary
        .newest_first()
        .take(args.limit.unwrap_or(usize::MAX))
        .cloned()
        .collect();
    print_records(&records, args.json, ctx.quiet())
}
